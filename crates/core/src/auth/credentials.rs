/// Shared admin password, stored as an argon2 PHC hash in the local cache.
use std::sync::{Arc, RwLock};

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use tracing::warn;

use crate::cache::{CacheKey, LocalCache};
use crate::error::AuthError;

/// Used only until an admin sets a real password.
pub const DEFAULT_ADMIN_PASSWORD: &str = "change-me-now";
pub const MIN_PASSWORD_LEN: usize = 8;

pub struct AdminCredentials {
    hash: RwLock<String>,
    cache: Arc<dyn LocalCache>,
}

impl AdminCredentials {
    /// Load the stored hash. `override_password` (from the environment)
    /// replaces it; with neither, the default password is hashed and stored.
    pub async fn load(
        cache: Arc<dyn LocalCache>,
        override_password: Option<&str>,
    ) -> Result<Self, AuthError> {
        let hash = match override_password {
            Some(password) => {
                let hash = hash_password(password)?;
                store_hash(cache.as_ref(), &hash).await;
                hash
            }
            None => match cache.read(CacheKey::AdminPasswordHash).await? {
                Some(stored) if PasswordHash::new(stored.trim()).is_ok() => stored.trim().to_string(),
                stored => {
                    if stored.is_some() {
                        warn!("stored admin password hash is malformed; resetting to default");
                    }
                    warn!("admin password is the built-in default; change it before going live");
                    let hash = hash_password(DEFAULT_ADMIN_PASSWORD)?;
                    store_hash(cache.as_ref(), &hash).await;
                    hash
                }
            },
        };

        Ok(Self {
            hash: RwLock::new(hash),
            cache,
        })
    }

    pub fn verify(&self, candidate: &str) -> bool {
        let hash = self
            .hash
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        verify_password(&hash, candidate)
    }

    pub async fn change(&self, current: &str, new: &str) -> Result<(), AuthError> {
        if !self.verify(current) {
            return Err(AuthError::InvalidPassword);
        }
        if new.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort(MIN_PASSWORD_LEN));
        }
        let hash = hash_password(new)?;
        self.cache.write(CacheKey::AdminPasswordHash, &hash).await?;
        *self
            .hash
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = hash;
        Ok(())
    }
}

async fn store_hash(cache: &dyn LocalCache, hash: &str) {
    if let Err(e) = cache.write(CacheKey::AdminPasswordHash, hash).await {
        warn!(error = %e, "could not persist admin password hash; it will not survive a restart");
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

fn verify_password(hash: &str, candidate: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryLocalCache;

    #[tokio::test]
    async fn falls_back_to_hashed_default() {
        let cache = Arc::new(MemoryLocalCache::new());
        let creds = AdminCredentials::load(cache.clone(), None).await.unwrap();

        assert!(creds.verify(DEFAULT_ADMIN_PASSWORD));
        assert!(!creds.verify("wrong"));
        let stored = cache.get(CacheKey::AdminPasswordHash).unwrap();
        assert!(stored.starts_with("$argon2"));
        assert!(!stored.contains(DEFAULT_ADMIN_PASSWORD));
    }

    #[tokio::test]
    async fn override_and_change_password() {
        let cache = Arc::new(MemoryLocalCache::new());
        let creds = AdminCredentials::load(cache.clone(), Some("from-the-env"))
            .await
            .unwrap();
        assert!(creds.verify("from-the-env"));

        assert!(matches!(
            creds.change("nope", "long enough").await,
            Err(AuthError::InvalidPassword)
        ));
        assert!(matches!(
            creds.change("from-the-env", "short").await,
            Err(AuthError::PasswordTooShort(MIN_PASSWORD_LEN))
        ));

        creds.change("from-the-env", "a much better one").await.unwrap();
        assert!(creds.verify("a much better one"));

        let reloaded = AdminCredentials::load(cache, None).await.unwrap();
        assert!(reloaded.verify("a much better one"));
        assert!(!reloaded.verify(DEFAULT_ADMIN_PASSWORD));
    }

    #[tokio::test]
    async fn malformed_stored_hash_resets_to_default() {
        let cache = Arc::new(MemoryLocalCache::new());
        cache.insert(CacheKey::AdminPasswordHash, "plaintext-password");
        let creds = AdminCredentials::load(cache, None).await.unwrap();
        assert!(creds.verify(DEFAULT_ADMIN_PASSWORD));
        assert!(!creds.verify("plaintext-password"));
    }
}
