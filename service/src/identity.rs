use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountKind {
    General,
    Kakao,
}

impl AccountKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::General => "GENERAL",
            Self::Kakao => "KAKAO",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub user_id: String,
    pub email: String,
    pub password_digest: Option<String>,
    pub account_kind: AccountKind,
}

// Identities are immutable once saved: the constructors below are the only
// way to build one, which keeps the digest-iff-GENERAL invariant out of
// callers' hands.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub user_id: String,
    pub email: String,
    pub password_digest: Option<String>,
    pub account_kind: AccountKind,
}

impl NewIdentity {
    pub fn general(user_id: &str, email: &str, password_digest: String) -> Self {
        Self {
            user_id: user_id.to_string(),
            email: email.to_string(),
            password_digest: Some(password_digest),
            account_kind: AccountKind::General,
        }
    }

    pub fn social(user_id: &str, email: &str, account_kind: AccountKind) -> Self {
        Self {
            user_id: user_id.to_string(),
            email: email.to_string(),
            password_digest: None,
            account_kind,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("identity storage backend failure: {message}")]
    Backend { message: String },
}

#[async_trait]
pub trait IdentityGateway: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, GatewayError>;

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Identity>, GatewayError>;

    async fn exists_by_email(&self, email: &str) -> Result<bool, GatewayError>;

    async fn exists_by_user_id(&self, user_id: &str) -> Result<bool, GatewayError>;

    async fn save(&self, identity: NewIdentity) -> Result<Identity, GatewayError>;

    async fn delete(&self, user_id: &str) -> Result<(), GatewayError>;
}

#[derive(Debug, Default)]
pub struct MemoryIdentityGateway {
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i64,
    identities: Vec<Identity>,
}

impl MemoryIdentityGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityGateway for MemoryIdentityGateway {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, GatewayError> {
        let state = self.state.read().await;
        Ok(state
            .identities
            .iter()
            .find(|identity| identity.email == email)
            .cloned())
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Identity>, GatewayError> {
        let state = self.state.read().await;
        Ok(state
            .identities
            .iter()
            .find(|identity| identity.user_id == user_id)
            .cloned())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, GatewayError> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn exists_by_user_id(&self, user_id: &str) -> Result<bool, GatewayError> {
        Ok(self.find_by_user_id(user_id).await?.is_some())
    }

    async fn save(&self, identity: NewIdentity) -> Result<Identity, GatewayError> {
        let mut state = self.state.write().await;

        // Mirrors the unique constraints a persistent backend would enforce.
        let collision = state.identities.iter().any(|existing| {
            existing.email == identity.email || existing.user_id == identity.user_id
        });
        if collision {
            return Err(GatewayError::Backend {
                message: format!(
                    "unique constraint violated for user id '{}'",
                    identity.user_id
                ),
            });
        }

        state.next_id += 1;
        let saved = Identity {
            id: state.next_id,
            user_id: identity.user_id,
            email: identity.email,
            password_digest: identity.password_digest,
            account_kind: identity.account_kind,
        };
        state.identities.push(saved.clone());
        Ok(saved)
    }

    async fn delete(&self, user_id: &str) -> Result<(), GatewayError> {
        let mut state = self.state.write().await;
        state.identities.retain(|identity| identity.user_id != user_id);
        Ok(())
    }
}
