pub mod auth;
pub mod config;
pub mod events;
pub mod identity;
pub mod oauth;
pub mod password;
pub mod session;
pub mod token;

pub use crate::auth::{
    AuthError, AuthErrorCategory, AuthService, SignupRequest, SocialLoginOutcome,
    SocialSignupRequest, TokenPair,
};
pub use crate::config::{Config, ConfigError};
pub use crate::events::{EventPublisher, IdentityCreatedEvent, LogEventPublisher};
pub use crate::identity::{AccountKind, Identity, IdentityGateway, MemoryIdentityGateway};
pub use crate::oauth::{AdapterError, Provider, ProviderProfile, profile_from_attributes};
pub use crate::password::{Argon2CredentialHasher, CredentialHasher};
pub use crate::session::{InMemorySessionStore, SessionStore};
pub use crate::token::{TokenCodec, TokenKind, TokenValidation};
