//! Session lifecycle: login, registration, logout, and identity restore.
//!
//! [`SessionManager`] owns the durable [`TokenPair`] through an injected
//! [`TokenStore`] and reaches the remote service through the
//! [`AuthBackend`] seam, so tests run against fakes without a network or a
//! keyring. The original client collapsed every failure into one generic
//! alert; here the taxonomy is kept distinct even though the CLI may still
//! render the variants similarly.

pub mod store;
pub mod token;

use crate::api::{ApiClient, ApiError};
use crate::auth::store::{StoreError, TokenStore};
use crate::auth::token::{decode_identity, IdentityError, TokenPair, UserIdentity};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Seam between the session manager and the remote auth endpoints.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ApiError>;
    async fn register(&self, username: &str, email: &str, password: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl AuthBackend for ApiClient {
    async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ApiError> {
        ApiClient::login(self, username, password).await
    }

    async fn register(&self, username: &str, email: &str, password: &str) -> Result<(), ApiError> {
        ApiClient::register(self, username, email, password).await
    }
}

/// Authentication failures, kept distinct rather than collapsed.
#[derive(Debug)]
pub enum AuthError {
    /// The server rejected the credentials.
    InvalidCredentials,
    /// The server rejected the submitted fields (e.g. username taken).
    ValidationError { detail: String },
    /// The request never reached the server.
    NetworkUnavailable(reqwest::Error),
    /// The server answered with an unexpected status.
    ServerError { status: StatusCode },
    /// The issued access token could not be decoded or has expired.
    Identity(IdentityError),
    /// The local token store could not be read or written.
    Store(StoreError),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "incorrect username or password"),
            AuthError::ValidationError { detail } => {
                if detail.is_empty() {
                    write!(f, "the server rejected the submitted details")
                } else {
                    write!(f, "the server rejected the submitted details: {detail}")
                }
            }
            AuthError::NetworkUnavailable(err) => write!(f, "could not reach the server: {err}"),
            AuthError::ServerError { status } => write!(f, "server error ({status})"),
            AuthError::Identity(err) => write!(f, "{err}"),
            AuthError::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AuthError::NetworkUnavailable(err) => Some(err),
            AuthError::Identity(err) => Some(err),
            AuthError::Store(err) => Some(err),
            _ => None,
        }
    }
}

fn classify_login_error(err: ApiError) -> AuthError {
    match err {
        ApiError::Transport(err) => AuthError::NetworkUnavailable(err),
        ApiError::Status { status, .. } if status.is_client_error() => {
            AuthError::InvalidCredentials
        }
        ApiError::Status { status, .. } => AuthError::ServerError { status },
    }
}

fn classify_register_error(err: ApiError) -> AuthError {
    match err {
        ApiError::Transport(err) => AuthError::NetworkUnavailable(err),
        ApiError::Status { status, body } if status == StatusCode::BAD_REQUEST => {
            AuthError::ValidationError { detail: body }
        }
        ApiError::Status { status, .. } => AuthError::ServerError { status },
    }
}

/// Owns the authentication lifecycle and the current user identity.
pub struct SessionManager {
    backend: Arc<dyn AuthBackend>,
    tokens: Arc<TokenStore>,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn AuthBackend>, tokens: Arc<TokenStore>) -> Self {
        Self { backend, tokens }
    }

    /// Authenticate, persist the issued pair, and return the identity
    /// decoded from the access token. On any failure the stored state is
    /// left untouched.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserIdentity, AuthError> {
        let pair = self
            .backend
            .login(username, password)
            .await
            .map_err(classify_login_error)?;
        let identity = decode_identity(&pair.access, Utc::now()).map_err(AuthError::Identity)?;
        self.tokens.save(&pair).map_err(AuthError::Store)?;
        tracing::info!(username = %identity.username, "logged in");
        Ok(identity)
    }

    /// Create an account. Never touches the stored session either way;
    /// callers direct the user to log in afterwards.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        self.backend
            .register(username, email, password)
            .await
            .map_err(classify_register_error)
    }

    /// Drop the stored pair. Unconditional and idempotent; there is no
    /// revocation call to the remote service.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.tokens.clear().map_err(AuthError::Store)?;
        tracing::info!("logged out");
        Ok(())
    }

    /// Recover the identity from a previously stored pair, if any. A
    /// stale or malformed token surfaces as an error instead of a
    /// plausible-looking identity.
    pub fn restore(&self) -> Result<Option<UserIdentity>, AuthError> {
        let Some(pair) = self.tokens.load().map_err(AuthError::Store)? else {
            return Ok(None);
        };
        decode_identity(&pair.access, Utc::now())
            .map(Some)
            .map_err(AuthError::Identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::encode_test_token;
    use std::sync::Mutex;

    struct FakeAuth {
        login_result: Mutex<Option<Result<TokenPair, ApiError>>>,
        register_result: Mutex<Option<Result<(), ApiError>>>,
    }

    impl FakeAuth {
        fn logins_with(result: Result<TokenPair, ApiError>) -> Arc<Self> {
            Arc::new(Self {
                login_result: Mutex::new(Some(result)),
                register_result: Mutex::new(None),
            })
        }

        fn registers_with(result: Result<(), ApiError>) -> Arc<Self> {
            Arc::new(Self {
                login_result: Mutex::new(None),
                register_result: Mutex::new(Some(result)),
            })
        }
    }

    #[async_trait]
    impl AuthBackend for FakeAuth {
        async fn login(&self, _username: &str, _password: &str) -> Result<TokenPair, ApiError> {
            self.login_result.lock().unwrap().take().expect("unexpected login call")
        }

        async fn register(
            &self,
            _username: &str,
            _email: &str,
            _password: &str,
        ) -> Result<(), ApiError> {
            self.register_result
                .lock()
                .unwrap()
                .take()
                .expect("unexpected register call")
        }
    }

    fn future_exp() -> i64 {
        Utc::now().timestamp() + 3600
    }

    fn issued_pair() -> TokenPair {
        TokenPair {
            access: encode_test_token("marisol", 7, future_exp()),
            refresh: "refresh-token".to_string(),
        }
    }

    fn rejected(status: StatusCode) -> ApiError {
        ApiError::Status {
            status,
            body: String::new(),
        }
    }

    #[tokio::test]
    async fn login_persists_the_pair_and_decodes_identity() {
        let pair = issued_pair();
        let store = Arc::new(TokenStore::in_memory());
        let manager =
            SessionManager::new(FakeAuth::logins_with(Ok(pair.clone())), Arc::clone(&store));

        let identity = manager.login("marisol", "secreta").await.unwrap();
        assert_eq!(identity.username, "marisol");
        assert_eq!(identity.user_id, Some(7));
        assert_eq!(store.load().unwrap(), Some(pair));
    }

    #[tokio::test]
    async fn rejected_login_leaves_stored_state_untouched() {
        let store = Arc::new(TokenStore::in_memory());
        let previous = TokenPair {
            access: "old-access".to_string(),
            refresh: "old-refresh".to_string(),
        };
        store.save(&previous).unwrap();

        let manager = SessionManager::new(
            FakeAuth::logins_with(Err(rejected(StatusCode::UNAUTHORIZED))),
            Arc::clone(&store),
        );
        let err = manager.login("marisol", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(store.load().unwrap(), Some(previous));
    }

    #[tokio::test]
    async fn server_side_login_failure_keeps_its_status() {
        let store = Arc::new(TokenStore::in_memory());
        let manager = SessionManager::new(
            FakeAuth::logins_with(Err(rejected(StatusCode::INTERNAL_SERVER_ERROR))),
            store,
        );
        let err = manager.login("marisol", "secreta").await.unwrap_err();
        match err {
            AuthError::ServerError { status } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR)
            }
            other => panic!("expected ServerError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn register_maps_bad_request_to_validation_error() {
        let store = Arc::new(TokenStore::in_memory());
        let manager = SessionManager::new(
            FakeAuth::registers_with(Err(ApiError::Status {
                status: StatusCode::BAD_REQUEST,
                body: r#"{"username":["already exists"]}"#.to_string(),
            })),
            store,
        );
        let err = manager.register("marisol", "m@example.com", "x").await.unwrap_err();
        match err {
            AuthError::ValidationError { detail } => assert!(detail.contains("already exists")),
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn register_success_stores_nothing() {
        let store = Arc::new(TokenStore::in_memory());
        let manager =
            SessionManager::new(FakeAuth::registers_with(Ok(())), Arc::clone(&store));
        manager.register("marisol", "m@example.com", "x").await.unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn logout_clears_state_and_repeats_safely() {
        let store = Arc::new(TokenStore::in_memory());
        store.save(&issued_pair()).unwrap();
        let manager = SessionManager::new(
            FakeAuth::logins_with(Err(rejected(StatusCode::UNAUTHORIZED))),
            Arc::clone(&store),
        );

        manager.logout().unwrap();
        assert_eq!(store.load().unwrap(), None);
        assert!(manager.restore().unwrap().is_none());

        manager.logout().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn restore_rejects_an_expired_token() {
        let store = Arc::new(TokenStore::in_memory());
        store
            .save(&TokenPair {
                access: encode_test_token("marisol", 7, Utc::now().timestamp() - 60),
                refresh: "refresh-token".to_string(),
            })
            .unwrap();
        let manager = SessionManager::new(
            FakeAuth::logins_with(Err(rejected(StatusCode::UNAUTHORIZED))),
            store,
        );
        let err = manager.restore().unwrap_err();
        assert!(matches!(err, AuthError::Identity(IdentityError::Expired)));
    }

    #[test]
    fn restore_without_a_stored_pair_is_unauthenticated() {
        let manager = SessionManager::new(
            FakeAuth::logins_with(Err(rejected(StatusCode::UNAUTHORIZED))),
            Arc::new(TokenStore::in_memory()),
        );
        assert!(manager.restore().unwrap().is_none());
    }
}
