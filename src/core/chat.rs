//! Chat session state and the send round trip.
//!
//! [`ChatSession`] owns the append-only transcript and the pending gate.
//! Each send is a strict sequence: the user message is appended
//! synchronously, the single in-flight request runs to completion, and
//! exactly one assistant message (reply or apology) follows it. While a
//! request is outstanding new submissions are rejected, not queued; there
//! is no cancellation and no client-side timeout.

use crate::api::ApiError;
use crate::core::constants::{CONNECTION_APOLOGY, GREETING_MESSAGE_ID, GREETING_TEXT};
use crate::core::message::ChatMessage;
use crate::utils::logging::LoggingState;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

/// Seam between the session controller and the remote tutor. Implemented
/// by [`crate::api::ApiClient`]; tests substitute fakes.
#[async_trait]
pub trait TutorBackend: Send + Sync {
    async fn send_message(&self, text: &str) -> Result<String, ApiError>;
}

/// Result of [`ChatSession::send`].
#[derive(Debug)]
pub enum SendOutcome {
    /// The tutor replied; the reply was appended to the transcript.
    Replied,
    /// The round trip failed; the apology message was appended.
    Failed(ApiError),
    /// Empty input or a request already outstanding. Nothing changed.
    NotSent,
}

pub struct ChatSession {
    backend: Arc<dyn TutorBackend>,
    messages: Vec<ChatMessage>,
    /// Id of the user message whose reply is outstanding. `Some` doubles
    /// as the pending flag gating new submissions.
    in_flight: Option<i64>,
    logging: LoggingState,
}

impl ChatSession {
    /// Fresh session seeded with the assistant greeting. The transcript is
    /// not persisted; a new process starts over, as the product intends.
    pub fn new(backend: Arc<dyn TutorBackend>, logging: LoggingState) -> Self {
        Self {
            backend,
            messages: vec![ChatMessage::assistant(GREETING_MESSAGE_ID, GREETING_TEXT)],
            in_flight: None,
            logging,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Accept user input: trim it, reject empty input and input submitted
    /// while a request is outstanding, otherwise append the user message
    /// and raise the pending gate. Returns the new message's id.
    pub fn submit(&mut self, text: &str) -> Option<i64> {
        let trimmed = text.trim();
        if trimmed.is_empty() || self.in_flight.is_some() {
            return None;
        }

        let id = Utc::now().timestamp_millis();
        self.log_line(&format!("Tú: {trimmed}"));
        self.messages.push(ChatMessage::user(id, trimmed));
        self.in_flight = Some(id);
        Some(id)
    }

    /// Record the tutor's reply for the outstanding request and lower the
    /// pending gate. The reply id is the user message id plus one, keeping
    /// the pair adjacent even under timestamp collisions.
    pub fn complete(&mut self, reply: &str) {
        let Some(user_id) = self.in_flight.take() else {
            return;
        };
        self.log_line(&format!("Chipi: {reply}"));
        self.messages.push(ChatMessage::assistant(user_id + 1, reply));
    }

    /// Record the fixed apology for a failed round trip and lower the
    /// pending gate.
    pub fn fail(&mut self) {
        let Some(user_id) = self.in_flight.take() else {
            return;
        };
        self.log_line(&format!("Chipi: {CONNECTION_APOLOGY}"));
        self.messages
            .push(ChatMessage::assistant(user_id + 1, CONNECTION_APOLOGY));
    }

    /// Full round trip: submit, await the backend, append the outcome.
    /// Holding `&mut self` across the await is what serializes sends; the
    /// pending gate additionally rejects input at the boundary.
    pub async fn send(&mut self, text: &str) -> SendOutcome {
        if self.submit(text).is_none() {
            return SendOutcome::NotSent;
        }
        // The trimmed text just appended is what goes over the wire.
        let outbound = self
            .messages
            .last()
            .map(|m| m.text.clone())
            .unwrap_or_default();

        match self.backend.send_message(&outbound).await {
            Ok(reply) => {
                self.complete(&reply);
                SendOutcome::Replied
            }
            Err(err) => {
                tracing::warn!(error = %err, "chat round trip failed");
                self.fail();
                SendOutcome::Failed(err)
            }
        }
    }

    fn log_line(&self, line: &str) {
        if let Err(e) = self.logging.log_message(line) {
            eprintln!("Failed to log message: {e}");
        }
    }
}
