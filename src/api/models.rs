use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

#[derive(Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

/// One stored correction from `GET /progress/`, newest first.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressEntry {
    pub id: i64,
    pub user: String,
    pub original_text: String,
    pub corrected_text: Option<String>,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}
