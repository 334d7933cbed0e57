use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::events::{EventPublisher, IdentityCreatedEvent};
use crate::identity::{AccountKind, Identity, IdentityGateway, NewIdentity};
use crate::oauth::{Provider, ProviderProfile};
use crate::password::CredentialHasher;
use crate::session::SessionStore;
use crate::token::{TokenCodec, TokenValidation};

const RESERVED_USER_IDS: [&str; 3] = ["admin", "root", "system"];
const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*()-_=+{};:,<.>";
const USER_ID_MAX_LEN: usize = 16;
const PASSWORD_MIN_LEN: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("User ID must be alphanumeric and up to 16 characters")]
    InvalidUserIdFormat,
    #[error("This user ID is not allowed")]
    ReservedUserId,
    #[error("Password must be at least 8 characters and contain a special character")]
    WeakPassword,
    #[error("Email is already registered")]
    EmailAlreadyRegistered,
    #[error("User ID is already in use")]
    UserIdAlreadyRegistered,
    // Unknown email and wrong password collapse into this one kind so a
    // login probe cannot tell which of the two it hit.
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("This email is registered as a social login account")]
    PasswordLoginUnavailable,
    #[error("This email is registered as a general login account")]
    ProviderKindMismatch,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Invalid token")]
    TokenInvalid,
    #[error("Invalid refresh token")]
    RefreshTokenNotRecognized,
    #[error("User not found")]
    IdentityNotFound,
    #[error("internal failure: {message}")]
    Internal { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCategory {
    InvalidInput,
    Conflict,
    Credential,
    AccountKind,
    Token,
    NotFound,
    Internal,
}

impl AuthError {
    pub fn category(&self) -> AuthErrorCategory {
        match self {
            Self::InvalidUserIdFormat | Self::ReservedUserId | Self::WeakPassword => {
                AuthErrorCategory::InvalidInput
            }
            Self::EmailAlreadyRegistered | Self::UserIdAlreadyRegistered => {
                AuthErrorCategory::Conflict
            }
            Self::InvalidCredentials => AuthErrorCategory::Credential,
            Self::PasswordLoginUnavailable | Self::ProviderKindMismatch => {
                AuthErrorCategory::AccountKind
            }
            Self::TokenExpired | Self::TokenInvalid | Self::RefreshTokenNotRecognized => {
                AuthErrorCategory::Token
            }
            Self::IdentityNotFound => AuthErrorCategory::NotFound,
            Self::Internal { .. } => AuthErrorCategory::Internal,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidUserIdFormat => "invalid_user_id_format",
            Self::ReservedUserId => "reserved_user_id",
            Self::WeakPassword => "weak_password",
            Self::EmailAlreadyRegistered => "email_already_registered",
            Self::UserIdAlreadyRegistered => "user_id_already_registered",
            Self::InvalidCredentials => "invalid_credentials",
            Self::PasswordLoginUnavailable => "password_login_unavailable",
            Self::ProviderKindMismatch => "provider_kind_mismatch",
            Self::TokenExpired => "token_expired",
            Self::TokenInvalid => "token_invalid",
            Self::RefreshTokenNotRecognized => "refresh_token_not_recognized",
            Self::IdentityNotFound => "identity_not_found",
            Self::Internal { .. } => "internal_error",
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            Self::InvalidUserIdFormat | Self::ReservedUserId | Self::WeakPassword => 400,
            Self::EmailAlreadyRegistered | Self::UserIdAlreadyRegistered => 409,
            Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::RefreshTokenNotRecognized => 401,
            Self::PasswordLoginUnavailable | Self::ProviderKindMismatch => 403,
            Self::IdentityNotFound => 404,
            Self::Internal { .. } => 500,
        }
    }
}

impl From<crate::identity::GatewayError> for AuthError {
    fn from(error: crate::identity::GatewayError) -> Self {
        Self::Internal {
            message: error.to_string(),
        }
    }
}

impl From<crate::session::StoreError> for AuthError {
    fn from(error: crate::session::StoreError) -> Self {
        Self::Internal {
            message: error.to_string(),
        }
    }
}

impl From<crate::token::TokenError> for AuthError {
    fn from(error: crate::token::TokenError) -> Self {
        Self::Internal {
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub user_id: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub profile_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SocialSignupRequest {
    pub user_id: String,
    pub email: String,
    pub provider: Provider,
    #[serde(default)]
    pub profile_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Clone)]
pub enum SocialLoginOutcome {
    Authenticated(TokenPair),
    // Unknown email: no tokens are issued; the caller completes signup with
    // the canonical profile and comes back through `social_signup`.
    RegistrationRequired(ProviderProfile),
}

#[derive(Clone)]
pub struct AuthService {
    identities: Arc<dyn IdentityGateway>,
    sessions: Arc<dyn SessionStore>,
    hasher: Arc<dyn CredentialHasher>,
    events: Arc<dyn EventPublisher>,
    codec: Arc<TokenCodec>,
}

impl AuthService {
    pub fn new(
        identities: Arc<dyn IdentityGateway>,
        sessions: Arc<dyn SessionStore>,
        hasher: Arc<dyn CredentialHasher>,
        events: Arc<dyn EventPublisher>,
        codec: Arc<TokenCodec>,
    ) -> Self {
        Self {
            identities,
            sessions,
            hasher,
            events,
            codec,
        }
    }

    pub async fn signup(&self, request: SignupRequest) -> Result<TokenPair, AuthError> {
        validate_user_id(&request.user_id)?;
        validate_password(&request.password)?;

        if self.identities.exists_by_email(&request.email).await? {
            return Err(AuthError::EmailAlreadyRegistered);
        }
        if self.identities.exists_by_user_id(&request.user_id).await? {
            return Err(AuthError::UserIdAlreadyRegistered);
        }

        let digest = self
            .hasher
            .hash(&request.password)
            .map_err(|error| AuthError::Internal {
                message: error.to_string(),
            })?;

        let identity = self
            .identities
            .save(NewIdentity::general(
                &request.user_id,
                &request.email,
                digest,
            ))
            .await?;

        self.publish_identity_created(&identity, request.profile_name, request.bio)
            .await;
        self.issue_and_store(&identity.user_id).await
    }

    pub async fn social_signup(
        &self,
        request: SocialSignupRequest,
    ) -> Result<TokenPair, AuthError> {
        validate_user_id(&request.user_id)?;

        if self.identities.exists_by_email(&request.email).await? {
            return Err(AuthError::EmailAlreadyRegistered);
        }
        if self.identities.exists_by_user_id(&request.user_id).await? {
            return Err(AuthError::UserIdAlreadyRegistered);
        }

        let identity = self
            .identities
            .save(NewIdentity::social(
                &request.user_id,
                &request.email,
                request.provider.account_kind(),
            ))
            .await?;

        self.publish_identity_created(&identity, request.profile_name, request.bio)
            .await;
        self.issue_and_store(&identity.user_id).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let identity = self
            .identities
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if identity.account_kind != AccountKind::General {
            return Err(AuthError::PasswordLoginUnavailable);
        }

        let digest = identity
            .password_digest
            .as_deref()
            .ok_or_else(|| AuthError::Internal {
                message: format!(
                    "general account '{}' has no password digest",
                    identity.user_id
                ),
            })?;
        if !self.hasher.matches(password, digest) {
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_and_store(&identity.user_id).await
    }

    pub async fn social_login(
        &self,
        profile: ProviderProfile,
    ) -> Result<SocialLoginOutcome, AuthError> {
        match self.identities.find_by_email(&profile.email).await? {
            Some(identity) => {
                if identity.account_kind != profile.provider.account_kind() {
                    return Err(AuthError::ProviderKindMismatch);
                }
                let pair = self.issue_and_store(&identity.user_id).await?;
                Ok(SocialLoginOutcome::Authenticated(pair))
            }
            None => Ok(SocialLoginOutcome::RegistrationRequired(profile)),
        }
    }

    // Cuts the refresh path only: access tokens already in flight stay
    // cryptographically valid until their natural expiry.
    pub async fn logout(&self, user_id: &str) -> Result<(), AuthError> {
        if self.identities.find_by_user_id(user_id).await?.is_none() {
            return Err(AuthError::IdentityNotFound);
        }
        self.sessions.delete(user_id).await?;
        Ok(())
    }

    pub async fn reissue(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        match self.codec.verify(refresh_token) {
            TokenValidation::Expired => return Err(AuthError::TokenExpired),
            TokenValidation::Invalid => return Err(AuthError::TokenInvalid),
            TokenValidation::Valid => {}
        }

        let subject = self
            .codec
            .subject_of(refresh_token)
            .map_err(|_| AuthError::TokenInvalid)?;

        if self.identities.find_by_user_id(&subject).await?.is_none() {
            return Err(AuthError::IdentityNotFound);
        }

        // Covers logged-out, rotated-away, and never-issued tokens; a
        // superseded token fails here even though its signature still checks.
        if !self.sessions.matches(&subject, refresh_token).await? {
            return Err(AuthError::RefreshTokenNotRecognized);
        }

        self.issue_and_store(&subject).await
    }

    pub async fn delete_identity(&self, user_id: &str) -> Result<(), AuthError> {
        if self.identities.find_by_user_id(user_id).await?.is_none() {
            return Err(AuthError::IdentityNotFound);
        }

        self.identities.delete(user_id).await?;
        self.sessions.delete(user_id).await?;
        tracing::info!(target: "auth.service", user_id = %user_id, "identity deleted");
        Ok(())
    }

    async fn issue_and_store(&self, user_id: &str) -> Result<TokenPair, AuthError> {
        let access_token = self.codec.issue_access(user_id)?;
        let refresh_token = self.codec.issue_refresh(user_id)?;

        // Identity writes and session writes are separate stores with no
        // shared transaction; a failure here leaves any identity created
        // above in place, recoverable through a normal login.
        if let Err(error) = self
            .sessions
            .put(user_id, &refresh_token, self.codec.refresh_ttl())
            .await
        {
            tracing::warn!(
                target: "auth.service",
                user_id = %user_id,
                error = %error,
                "session write failed after token issuance",
            );
            return Err(error.into());
        }

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    async fn publish_identity_created(
        &self,
        identity: &Identity,
        profile_name: Option<String>,
        bio: Option<String>,
    ) {
        let event = IdentityCreatedEvent {
            user_id: identity.user_id.clone(),
            email: identity.email.clone(),
            profile_name,
            bio,
        };

        if let Err(error) = self.events.publish(event).await {
            tracing::warn!(
                target: "auth.service",
                user_id = %identity.user_id,
                error = %error,
                "identity created event was not published",
            );
        }
    }
}

fn validate_user_id(user_id: &str) -> Result<(), AuthError> {
    if user_id.is_empty()
        || user_id.len() > USER_ID_MAX_LEN
        || !user_id.bytes().all(|byte| byte.is_ascii_alphanumeric())
    {
        return Err(AuthError::InvalidUserIdFormat);
    }
    if RESERVED_USER_IDS.contains(&user_id.to_ascii_lowercase().as_str()) {
        return Err(AuthError::ReservedUserId);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < PASSWORD_MIN_LEN
        || !password
            .chars()
            .any(|character| PASSWORD_SPECIAL_CHARS.contains(character))
    {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}
