//! HTTP gateway to the remote tutoring service.
//!
//! [`ApiClient`] is the single chokepoint for outbound calls: every request
//! reads the stored token pair and, when one exists, carries it as a bearer
//! credential. Register and login do not need the header; pre-login there
//! is simply no pair to attach. The client never retries and applies no
//! timeout beyond the transport default.

pub mod models;

use crate::auth::store::TokenStore;
use crate::auth::token::TokenPair;
use crate::core::chat::TutorBackend;
use crate::utils::url::join_endpoint;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use self::models::{ChatReply, ChatRequest, LoginRequest, ProgressEntry, RegisterRequest};

/// Failure of a remote call. Network breakage and rejected requests are
/// deliberately the same kind; callers map them to user-facing notices.
#[derive(Debug)]
pub enum ApiError {
    /// The request never completed: connection refused, DNS, TLS, or a
    /// response body that could not be read or decoded.
    Transport(reqwest::Error),
    /// The server answered with a non-success status.
    Status { status: StatusCode, body: String },
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Transport(_) => None,
            ApiError::Status { status, .. } => Some(*status),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(err) => write!(f, "request failed: {err}"),
            ApiError::Status { status, body } => {
                if body.is_empty() {
                    write!(f, "server responded with {status}")
                } else {
                    write!(f, "server responded with {status}: {body}")
                }
            }
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiError::Transport(err) => Some(err),
            ApiError::Status { .. } => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err)
    }
}

/// Client for the tutoring API. Holds the normalized base URL and a shared
/// [`TokenStore`] handle; the store is injected so tests can substitute an
/// in-memory session without touching the platform keyring.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, tokens: Arc<TokenStore>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: crate::utils::url::normalize_base_url(base_url),
            tokens,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request against `endpoint`, attaching the stored access
    /// token as a bearer credential when one exists. Attachment is
    /// unconditional across endpoints.
    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = join_endpoint(&self.base_url, endpoint);
        tracing::debug!(%method, %url, "api request");
        let mut builder = self.client.request(method, url);
        match self.tokens.load() {
            Ok(Some(TokenPair { access, .. })) => {
                builder = builder.bearer_auth(access);
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = %err, "token store unreadable; sending unauthenticated");
            }
        }
        builder
    }

    async fn expect_status(response: Response, expected: StatusCode) -> Result<Response, ApiError> {
        let status = response.status();
        if status != expected {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(%status, "api request rejected");
            return Err(ApiError::Status { status, body });
        }
        Ok(response)
    }

    /// `POST /register/`. Success is exactly 201 CREATED.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        let response = self
            .request(Method::POST, "register/")
            .json(&RegisterRequest {
                username,
                email,
                password,
            })
            .send()
            .await?;
        Self::expect_status(response, StatusCode::CREATED).await?;
        Ok(())
    }

    /// `POST /login/`. Success is 200 OK with an `{access, refresh}` body.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ApiError> {
        let response = self
            .request(Method::POST, "login/")
            .json(&LoginRequest { username, password })
            .send()
            .await?;
        let response = Self::expect_status(response, StatusCode::OK).await?;
        Ok(response.json::<TokenPair>().await?)
    }

    /// `POST /tutor/chat/`. Returns the assistant's reply text.
    pub async fn send_chat_message(&self, text: &str) -> Result<String, ApiError> {
        let response = self
            .request(Method::POST, "tutor/chat/")
            .json(&ChatRequest { message: text })
            .send()
            .await?;
        let response = Self::expect_status(response, StatusCode::OK).await?;
        Ok(response.json::<ChatReply>().await?.reply)
    }

    /// `GET /progress/`. Returns the user's stored corrections, newest first.
    pub async fn fetch_progress(&self) -> Result<Vec<ProgressEntry>, ApiError> {
        let response = self.request(Method::GET, "progress/").send().await?;
        let response = Self::expect_status(response, StatusCode::OK).await?;
        Ok(response.json::<Vec<ProgressEntry>>().await?)
    }
}

#[async_trait]
impl TutorBackend for ApiClient {
    async fn send_message(&self, text: &str) -> Result<String, ApiError> {
        self.send_chat_message(text).await
    }
}
