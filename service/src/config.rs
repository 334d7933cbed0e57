use std::env;

use thiserror::Error;

const DEFAULT_LOG_FILTER: &str = "info";
const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: u64 = 900;
const DEFAULT_REFRESH_TOKEN_TTL_SECONDS: u64 = 604_800;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_filter: String,
    pub jwt_private_key_pem: String,
    pub jwt_public_key_pem: String,
    pub access_token_ttl_seconds: u64,
    pub refresh_token_ttl_seconds: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {name}")]
    MissingVar { name: &'static str },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let log_filter = env::var("AUTH_LOG_FILTER")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        let jwt_private_key_pem = required_var("AUTH_JWT_PRIVATE_KEY_PEM")?;
        let jwt_public_key_pem = required_var("AUTH_JWT_PUBLIC_KEY_PEM")?;

        let access_token_ttl_seconds = env::var("AUTH_ACCESS_TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_ACCESS_TOKEN_TTL_SECONDS);

        let refresh_token_ttl_seconds = env::var("AUTH_REFRESH_TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REFRESH_TOKEN_TTL_SECONDS);

        Ok(Self {
            log_filter,
            jwt_private_key_pem,
            jwt_public_key_pem,
            access_token_ttl_seconds,
            refresh_token_ttl_seconds,
        })
    }
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingVar { name })
}

#[cfg(test)]
impl Config {
    #[must_use]
    pub fn for_tests(private_key_pem: &str, public_key_pem: &str) -> Self {
        Self {
            log_filter: "debug".to_string(),
            jwt_private_key_pem: private_key_pem.to_string(),
            jwt_public_key_pem: public_key_pem.to_string(),
            access_token_ttl_seconds: DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
            refresh_token_ttl_seconds: 86_400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use crate::token::TokenCodec;
    use crate::token::test_keys::{RSA_PRIVATE_KEY_PEM, RSA_PUBLIC_KEY_PEM};

    #[test]
    fn test_fixture_builds_a_working_codec() {
        let config = Config::for_tests(RSA_PRIVATE_KEY_PEM, RSA_PUBLIC_KEY_PEM);
        assert_eq!(config.access_token_ttl_seconds, 900);
        assert!(config.refresh_token_ttl_seconds > config.access_token_ttl_seconds);
        assert!(TokenCodec::from_config(&config).is_ok());
    }
}
