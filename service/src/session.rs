use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session store backend failure: {message}")]
    Backend { message: String },
}

// One record per user id; `put` is an unconditional overwrite, last writer
// wins. Stored values are compared by exact string equality, which is what
// makes logout and rotation real invalidation events for refresh tokens.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put(
        &self,
        user_id: &str,
        refresh_token: &str,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    async fn get(&self, user_id: &str) -> Result<Option<String>, StoreError>;

    async fn delete(&self, user_id: &str) -> Result<(), StoreError>;

    async fn matches(&self, user_id: &str, candidate: &str) -> Result<bool, StoreError> {
        Ok(self
            .get(user_id)
            .await?
            .is_some_and(|stored| stored == candidate))
    }
}

#[derive(Debug, Clone)]
struct SessionRecord {
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    records: RwLock<HashMap<String, SessionRecord>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn put(
        &self,
        user_id: &str,
        refresh_token: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let record = SessionRecord {
            refresh_token: refresh_token.to_string(),
            expires_at: Utc::now() + ttl,
        };
        self.records
            .write()
            .await
            .insert(user_id.to_string(), record);
        Ok(())
    }

    async fn get(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        let mut records = self.records.write().await;
        match records.get(user_id) {
            // Expiry is enforced lazily; a stale record behaves as absent.
            Some(record) if record.expires_at <= Utc::now() => {
                records.remove(user_id);
                Ok(None)
            }
            Some(record) => Ok(Some(record.refresh_token.clone())),
            None => Ok(None),
        }
    }

    async fn delete(&self, user_id: &str) -> Result<(), StoreError> {
        self.records.write().await.remove(user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_returns_stored_token() {
        let store = InMemorySessionStore::new();
        store
            .put("hong123", "refresh-1", Duration::seconds(60))
            .await
            .expect("put should succeed");

        assert_eq!(
            store.get("hong123").await.expect("get should succeed"),
            Some("refresh-1".to_string())
        );
    }

    #[tokio::test]
    async fn put_overwrites_previous_record() {
        let store = InMemorySessionStore::new();
        store
            .put("hong123", "refresh-1", Duration::seconds(60))
            .await
            .expect("first put should succeed");
        store
            .put("hong123", "refresh-2", Duration::seconds(60))
            .await
            .expect("second put should succeed");

        assert!(
            store
                .matches("hong123", "refresh-2")
                .await
                .expect("matches should succeed")
        );
        assert!(
            !store
                .matches("hong123", "refresh-1")
                .await
                .expect("matches should succeed")
        );
    }

    #[tokio::test]
    async fn expired_record_behaves_as_absent() {
        let store = InMemorySessionStore::new();
        store
            .put("hong123", "refresh-1", Duration::seconds(-1))
            .await
            .expect("put should succeed");

        assert_eq!(store.get("hong123").await.expect("get should succeed"), None);
        assert!(
            !store
                .matches("hong123", "refresh-1")
                .await
                .expect("matches should succeed")
        );
    }

    #[tokio::test]
    async fn matches_requires_exact_equality() {
        let store = InMemorySessionStore::new();
        store
            .put("hong123", "refresh-1", Duration::seconds(60))
            .await
            .expect("put should succeed");

        assert!(
            !store
                .matches("hong123", "refresh-1 ")
                .await
                .expect("matches should succeed")
        );
        assert!(
            !store
                .matches("other", "refresh-1")
                .await
                .expect("matches should succeed")
        );
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let store = InMemorySessionStore::new();
        store
            .put("hong123", "refresh-1", Duration::seconds(60))
            .await
            .expect("put should succeed");
        store
            .delete("hong123")
            .await
            .expect("delete should succeed");

        assert_eq!(store.get("hong123").await.expect("get should succeed"), None);
    }
}
