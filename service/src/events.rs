use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityCreatedEvent {
    pub user_id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("failed to publish identity event: {message}")]
pub struct PublishError {
    pub message: String,
}

// Fire-and-forget: the orchestrator logs a publish failure and moves on.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: IdentityCreatedEvent) -> Result<(), PublishError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventPublisher;

impl LogEventPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventPublisher for LogEventPublisher {
    async fn publish(&self, event: IdentityCreatedEvent) -> Result<(), PublishError> {
        tracing::info!(
            target: "auth.events",
            user_id = %event.user_id,
            email = %event.email,
            "identity created",
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_without_empty_profile_fields() {
        let event = IdentityCreatedEvent {
            user_id: "hong123".to_string(),
            email: "hong@example.com".to_string(),
            profile_name: None,
            bio: None,
        };

        let value = serde_json::to_value(&event).expect("event should serialize");
        assert_eq!(value["user_id"], "hong123");
        assert!(value.get("profile_name").is_none());
        assert!(value.get("bio").is_none());
    }

    #[tokio::test]
    async fn log_publisher_accepts_events() {
        let publisher = LogEventPublisher::new();
        let event = IdentityCreatedEvent {
            user_id: "hong123".to_string(),
            email: "hong@example.com".to_string(),
            profile_name: Some("Hong Gildong".to_string()),
            bio: None,
        };

        publisher
            .publish(event)
            .await
            .expect("log publisher should not fail");
    }
}
