use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};

#[derive(Debug, thiserror::Error)]
#[error("credential hashing failed: {message}")]
pub struct HashError {
    pub message: String,
}

pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, HashError>;

    fn matches(&self, plain: &str, digest: &str) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2CredentialHasher;

impl Argon2CredentialHasher {
    pub fn new() -> Self {
        Self
    }
}

impl CredentialHasher for Argon2CredentialHasher {
    fn hash(&self, plain: &str) -> Result<String, HashError> {
        let mut salt_bytes = [0u8; 16];
        getrandom::getrandom(&mut salt_bytes).map_err(|error| HashError {
            message: error.to_string(),
        })?;
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|error| HashError {
            message: error.to_string(),
        })?;

        let digest = Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|error| HashError {
                message: error.to_string(),
            })?
            .to_string();
        Ok(digest)
    }

    fn matches(&self, plain: &str, digest: &str) -> bool {
        match PasswordHash::new(digest) {
            Ok(parsed) => Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_round_trips_with_matches() {
        let hasher = Argon2CredentialHasher::new();
        let digest = hasher.hash("password@123").expect("hash should succeed");

        assert!(hasher.matches("password@123", &digest));
        assert!(!hasher.matches("password@124", &digest));
    }

    #[test]
    fn digests_are_salted() {
        let hasher = Argon2CredentialHasher::new();
        let first = hasher.hash("password@123").expect("hash should succeed");
        let second = hasher.hash("password@123").expect("hash should succeed");

        assert_ne!(first, second);
    }

    #[test]
    fn unparsable_digest_never_matches() {
        let hasher = Argon2CredentialHasher::new();
        assert!(!hasher.matches("password@123", "not-a-phc-string"));
        assert!(!hasher.matches("password@123", ""));
    }
}
