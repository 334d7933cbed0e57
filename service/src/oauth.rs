use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identity::AccountKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Kakao,
}

impl Provider {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kakao => "kakao",
        }
    }

    pub const fn account_kind(self) -> AccountKind {
        match self {
            Self::Kakao => AccountKind::Kakao,
        }
    }
}

// Canonical shape every supported provider's attribute bag is normalized
// into before it reaches the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderProfile {
    pub provider: Provider,
    pub external_user_id: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("unsupported identity provider: {registration_id}")]
    UnsupportedProvider { registration_id: String },
    #[error("provider response is missing {attribute}")]
    MissingAttribute { attribute: &'static str },
}

pub fn profile_from_attributes(
    registration_id: &str,
    attributes: &Value,
) -> Result<ProviderProfile, AdapterError> {
    match registration_id {
        "kakao" => kakao_profile(attributes),
        _ => Err(AdapterError::UnsupportedProvider {
            registration_id: registration_id.to_string(),
        }),
    }
}

fn kakao_profile(attributes: &Value) -> Result<ProviderProfile, AdapterError> {
    let email = string_at(attributes, &["kakao_account", "email"], "kakao_account.email")?;
    let display_name = string_at(attributes, &["properties", "nickname"], "properties.nickname")?;
    let avatar_url = string_at(
        attributes,
        &["properties", "profile_image"],
        "properties.profile_image",
    )?;

    // Kakao has no stable handle of its own here; the email local part is the
    // suggested user id handed back for two-phase registration.
    let external_user_id = email
        .split('@')
        .next()
        .unwrap_or(email.as_str())
        .to_string();

    Ok(ProviderProfile {
        provider: Provider::Kakao,
        external_user_id,
        email,
        display_name,
        avatar_url,
    })
}

fn string_at(
    attributes: &Value,
    path: &[&str],
    attribute: &'static str,
) -> Result<String, AdapterError> {
    let mut cursor = attributes;
    for key in path {
        cursor = &cursor[*key];
    }
    cursor
        .as_str()
        .map(ToString::to_string)
        .ok_or(AdapterError::MissingAttribute { attribute })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kakao_attributes() -> Value {
        json!({
            "id": 4_242_424_242u64,
            "kakao_account": {
                "email": "hong@example.com",
            },
            "properties": {
                "nickname": "Hong Gildong",
                "profile_image": "https://img.example.com/hong.png",
            },
        })
    }

    #[test]
    fn kakao_attributes_normalize_to_canonical_profile() {
        let profile = profile_from_attributes("kakao", &kakao_attributes())
            .expect("kakao profile should normalize");

        assert_eq!(profile.provider, Provider::Kakao);
        assert_eq!(profile.email, "hong@example.com");
        assert_eq!(profile.external_user_id, "hong");
        assert_eq!(profile.display_name, "Hong Gildong");
        assert_eq!(profile.avatar_url, "https://img.example.com/hong.png");
    }

    #[test]
    fn unknown_registration_id_is_unsupported() {
        let result = profile_from_attributes("google", &kakao_attributes());
        assert!(matches!(
            result,
            Err(AdapterError::UnsupportedProvider { registration_id }) if registration_id == "google"
        ));
    }

    #[test]
    fn missing_email_is_a_typed_failure() {
        let mut attributes = kakao_attributes();
        attributes["kakao_account"] = json!({});

        let result = profile_from_attributes("kakao", &attributes);
        assert!(matches!(
            result,
            Err(AdapterError::MissingAttribute { attribute }) if attribute == "kakao_account.email"
        ));
    }

    #[test]
    fn provider_maps_to_account_kind() {
        assert_eq!(Provider::Kakao.account_kind(), AccountKind::Kakao);
        assert_eq!(Provider::Kakao.as_str(), "kakao");
    }
}
