use std::{future::Future, sync::Arc, time::Duration};

use tracing::debug;

use super::{
    password::Passwords,
    repo::{StoreError, UserRepo},
    repo_types::User,
};

/// Credential storage: a users table plus the hasher applied before every write.
#[derive(Clone)]
pub struct CredentialStore {
    repo: Arc<dyn UserRepo>,
    passwords: Passwords,
    timeout: Option<Duration>,
}

impl CredentialStore {
    pub fn new(repo: Arc<dyn UserRepo>, passwords: Passwords, timeout: Option<Duration>) -> Self {
        Self {
            repo,
            passwords,
            timeout,
        }
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                StoreError::Connectivity(format!("store call exceeded {}ms", limit.as_millis()))
            })?,
            None => call.await,
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.bounded(self.repo.find_by_email(email)).await
    }

    /// Hashes `password` and inserts the user; the plaintext never reaches the repo.
    pub async fn create(&self, name: &str, email: &str, password: &str) -> Result<User, StoreError> {
        let hash = self.passwords.hash_blocking(password.to_owned()).await?;
        let user = self.bounded(self.repo.insert(name, email, &hash)).await?;
        debug!(user_id = user.id, "user row inserted");
        Ok(user)
    }
}
