//! In-memory breached password lookup

use aegis_domain::error::Result;
use aegis_domain::ports::BreachedPasswordSource;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

const COMMON_BREACHED_PASSWORDS: &[&str] = &[
    "123456",
    "123456789",
    "12345678",
    "password",
    "Password1",
    "Password123",
    "qwerty",
    "qwerty123",
    "111111",
    "abc123",
    "letmein",
    "iloveyou",
    "admin",
    "welcome",
    "monkey",
    "dragon",
];

/// Breach corpus held as SHA-256 digests
#[derive(Debug, Clone)]
pub struct InMemoryBreachedPasswordSource {
    digests: HashSet<String>,
}

impl InMemoryBreachedPasswordSource {
    /// Corpus of commonly breached passwords
    pub fn new() -> Self {
        Self::with_passwords(COMMON_BREACHED_PASSWORDS.iter().copied())
    }

    /// Empty corpus
    pub fn empty() -> Self {
        Self {
            digests: HashSet::new(),
        }
    }

    /// Corpus made of `passwords`
    pub fn with_passwords<'a, I: IntoIterator<Item = &'a str>>(passwords: I) -> Self {
        Self {
            digests: passwords.into_iter().map(digest).collect(),
        }
    }

    /// Add a password to the corpus
    pub fn insert(&mut self, password: &str) {
        self.digests.insert(digest(password));
    }

    /// Corpus size
    pub fn len(&self) -> usize {
        self.digests.len()
    }

    /// Whether the corpus is empty
    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}

impl Default for InMemoryBreachedPasswordSource {
    fn default() -> Self {
        Self::new()
    }
}

fn digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

#[async_trait]
impl BreachedPasswordSource for InMemoryBreachedPasswordSource {
    async fn is_breached(&self, password: &str) -> Result<bool> {
        Ok(self.digests.contains(&digest(password)))
    }
}
