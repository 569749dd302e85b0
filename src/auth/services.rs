use std::sync::Arc;

use tracing::{error, info, warn};

use super::{
    dto::{AuthResponse, LoginRequest, LogoutResponse, PublicUser, RegisterRequest},
    errors::AuthError,
    jwt::JwtKeys,
    password::Passwords,
    repo::{StoreError, UserRepo},
    repo_types::User,
    store::CredentialStore,
    validation::{validate_login, validate_register},
};
use crate::config::AppConfig;

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => AuthError::AlreadyRegistered,
            StoreError::Connectivity(detail) => {
                error!(error = %detail, "credential store unreachable");
                AuthError::Connectivity(detail)
            }
            other => {
                error!(error = %other, "credential store failure");
                AuthError::Unexpected(other.to_string())
            }
        }
    }
}

/// Register, login and logout over a credential store.
///
/// Holds no per-request state; clones share the same store and keys.
#[derive(Clone)]
pub struct AuthService {
    store: CredentialStore,
    passwords: Passwords,
    keys: JwtKeys,
    min_password_len: usize,
}

impl AuthService {
    pub fn new(config: &AppConfig, repo: Arc<dyn UserRepo>) -> anyhow::Result<Self> {
        let passwords = Passwords::new(&config.password)?;
        Ok(Self::from_parts(
            CredentialStore::new(repo, passwords.clone(), config.store_timeout()),
            passwords,
            JwtKeys::new(&config.jwt),
            config.password.min_length,
        ))
    }

    pub fn from_parts(
        store: CredentialStore,
        passwords: Passwords,
        keys: JwtKeys,
        min_password_len: usize,
    ) -> Self {
        Self {
            store,
            passwords,
            keys,
            min_password_len,
        }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    fn issue(&self, user: &User, message: &str) -> Result<AuthResponse, AuthError> {
        let token = self.keys.sign(user.id, &user.email).map_err(|e| {
            error!(error = %e, user_id = user.id, "jwt sign failed");
            AuthError::Unexpected(e.to_string())
        })?;
        Ok(AuthResponse {
            message: message.to_string(),
            token,
            user: PublicUser::from(user),
        })
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, AuthError> {
        validate_register(&req, self.min_password_len)?;

        if self.store.find_by_email(&req.email).await?.is_some() {
            warn!("registration for existing email");
            return Err(AuthError::AlreadyRegistered);
        }

        let user = match self
            .store
            .create(req.name.trim(), &req.email, &req.password)
            .await
        {
            Ok(u) => u,
            Err(StoreError::DuplicateEmail) => {
                warn!("registration lost race on email uniqueness");
                return Err(AuthError::AlreadyRegistered);
            }
            Err(e) => return Err(e.into()),
        };

        info!(user_id = user.id, "user registered");
        self.issue(&user, "Registration successful")
    }

    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AuthError> {
        validate_login(&req)?;

        let Some(user) = self.store.find_by_email(&req.email).await? else {
            // Same argon2 work as the wrong-password path.
            self.passwords
                .verify_blocking(req.password, self.passwords.decoy().to_owned())
                .await;
            warn!("login unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let ok = self
            .passwords
            .verify_blocking(req.password, user.password_hash.clone())
            .await;
        if !ok {
            warn!(user_id = user.id, "login invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = user.id, "user logged in");
        self.issue(&user, "Login successful")
    }

    /// Always succeeds. Tokens already issued stay valid until they expire;
    /// the transport only tells the client to drop its copy.
    pub fn logout(&self) -> LogoutResponse {
        info!("user logged out");
        LogoutResponse {
            message: "Logout successful".to_string(),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::auth::{jwt, password, repo::memory::MemoryUserRepo};

    pub(crate) fn service() -> (AuthService, Arc<MemoryUserRepo>) {
        let repo = Arc::new(MemoryUserRepo::default());
        let passwords = password::cheap();
        let svc = AuthService::from_parts(
            CredentialStore::new(repo.clone(), passwords.clone(), None),
            passwords,
            jwt::test_keys("test-secret", "test-issuer", "test-aud"),
            8,
        );
        (svc, repo)
    }

    pub(crate) fn register_req(name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    pub(crate) fn login_req(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }
}
