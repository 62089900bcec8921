use std::sync::Arc;

use anyhow::Context;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::{error, warn};

use crate::config::HashConfig;

/// Argon2id hasher with a configurable work factor.
#[derive(Clone)]
pub struct Hasher {
    argon2: Argon2<'static>,
    dummy_hash: Arc<str>,
}

impl Hasher {
    pub fn new(cfg: &HashConfig) -> anyhow::Result<Self> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 params: {e}"))?;
        let mut hasher = Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            dummy_hash: Arc::from(""),
        };
        // Random plaintext, so no submitted password ever matches it.
        let unguessable = SaltString::generate(&mut OsRng);
        hasher.dummy_hash = Arc::from(hasher.hash(unguessable.as_str())?);
        Ok(hasher)
    }

    /// Hash with the configured params, verified against when there is no
    /// stored hash so both login failure paths cost the same.
    pub fn dummy_hash(&self) -> &str {
        &self.dummy_hash
    }

    /// Produces a PHC string with a fresh random salt.
    pub fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                anyhow::anyhow!(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// Returns false for a mismatch and for a malformed hash.
    pub fn verify(&self, plain: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "stored password hash is malformed");
                return false;
            }
        };
        self.argon2
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }

    pub async fn hash_blocking(&self, plain: String) -> anyhow::Result<String> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .context("hash task panicked")?
    }

    pub async fn verify_blocking(&self, plain: String, hash: String) -> anyhow::Result<bool> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&plain, &hash))
            .await
            .context("verify task panicked")
    }
}
