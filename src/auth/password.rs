use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use thiserror::Error;
use tracing::{error, warn};

use crate::config::PasswordConfig;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("argon2 hash_password error: {0}")]
    Hash(String),
    #[error("hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Argon2id hasher with fixed cost parameters.
///
/// Each hash carries its own salt and parameters in the PHC string, so
/// verification needs nothing but the stored hash.
#[derive(Clone)]
pub struct Passwords {
    params: Params,
    decoy: Arc<str>,
}

impl Passwords {
    pub fn new(cfg: &PasswordConfig) -> anyhow::Result<Self> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 parameters: {e}"))?;
        let secret = SaltString::generate(&mut OsRng);
        let decoy = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone())
            .hash_password(secret.as_str().as_bytes(), &SaltString::generate(&mut OsRng))
            .map_err(|e| anyhow::anyhow!("argon2 decoy hash: {e}"))?
            .to_string();
        Ok(Self {
            params,
            decoy: decoy.into(),
        })
    }

    /// Hash with the configured cost that no submitted password matches.
    /// Verifying against it costs the same as a real account.
    pub fn decoy(&self) -> &str {
        &self.decoy
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, plain: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                PasswordError::Hash(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// Returns `false` for a mismatch and for a hash that cannot be parsed.
    pub fn verify(&self, plain: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "stored password hash is malformed");
                return false;
            }
        };
        self.argon2()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }

    pub async fn hash_blocking(&self, plain: String) -> Result<String, PasswordError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.hash(&plain)).await?
    }

    pub async fn verify_blocking(&self, plain: String, hash: String) -> bool {
        let this = self.clone();
        match tokio::task::spawn_blocking(move || this.verify(&plain, &hash)).await {
            Ok(ok) => ok,
            Err(e) => {
                error!(error = %e, "verify task failed");
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn cheap() -> Passwords {
    Passwords::new(&PasswordConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
        min_length: 8,
    })
    .expect("cheap params are valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let passwords = cheap();
        let password = "Secur3P@ssw0rd!";
        let hash = passwords.hash(password).expect("hashing should succeed");
        assert_ne!(hash, password);
        assert!(hash.starts_with("$argon2id$"));
        assert!(passwords.verify(password, &hash));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let passwords = cheap();
        let hash = passwords.hash("correct-horse-battery-staple").expect("hash");
        assert!(!passwords.verify("wrong-password", &hash));
    }

    #[test]
    fn verify_returns_false_on_malformed_hash() {
        let passwords = cheap();
        assert!(!passwords.verify("anything", "not-a-valid-hash"));
        assert!(!passwords.verify("anything", ""));
    }

    #[test]
    fn same_password_hashes_differently_with_equal_length() {
        let passwords = cheap();
        let a = passwords.hash("secret123").expect("hash");
        let b = passwords.hash("secret123").expect("hash");
        assert_ne!(a, b, "salt must differ per call");
        assert_eq!(a.len(), b.len());
    }

    #[test]
    fn verify_uses_parameters_embedded_in_hash() {
        let hash = cheap().hash("secret123").expect("hash");
        let other = Passwords::new(&PasswordConfig {
            memory_kib: 2048,
            iterations: 2,
            parallelism: 1,
            min_length: 8,
        })
        .expect("params");
        assert!(other.verify("secret123", &hash));
    }

    #[test]
    fn decoy_is_a_well_formed_hash_with_configured_cost() {
        let passwords = cheap();
        let decoy = passwords.decoy();
        assert!(PasswordHash::new(decoy).is_ok());
        assert!(decoy.contains("m=1024,t=1,p=1"));
        assert!(!passwords.verify("secret123", decoy));
        assert!(!passwords.verify("", decoy));
    }

    #[test]
    fn invalid_params_are_rejected() {
        let cfg = PasswordConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
            min_length: 8,
        };
        assert!(Passwords::new(&cfg).is_err());
    }

    #[tokio::test]
    async fn blocking_wrappers_agree_with_sync_versions() {
        let passwords = cheap();
        let hash = passwords
            .hash_blocking("secret123".into())
            .await
            .expect("hash");
        assert!(passwords.verify_blocking("secret123".into(), hash.clone()).await);
        assert!(!passwords.verify_blocking("nope".into(), hash).await);
    }
}
