//! Password digests and generated secrets

use crate::constants::ACTIVATION_CODE_LENGTH;
use sha2::{Digest, Sha256};

/// Salted SHA-256 password digest
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    salt: String,
    digest: String,
}

impl PasswordDigest {
    /// Digest `password` under a fresh random salt
    pub fn new(password: &str) -> Self {
        let salt = uuid::Uuid::new_v4().simple().to_string();
        let digest = Self::compute(&salt, password);
        Self { salt, digest }
    }

    /// Whether `password` matches this digest
    pub fn verify(&self, password: &str) -> bool {
        Self::compute(&self.salt, password) == self.digest
    }

    fn compute(salt: &str, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl std::fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}

/// Opaque random token
pub fn generate_token(prefix: &str) -> String {
    format!("{prefix}_{}", uuid::Uuid::new_v4().simple())
}

/// Numeric activation code
pub fn generate_activation_code() -> String {
    let modulus = 10u128.pow(ACTIVATION_CODE_LENGTH as u32);
    let value = uuid::Uuid::new_v4().as_u128() % modulus;
    format!("{value:0width$}", width = ACTIVATION_CODE_LENGTH)
}
