use serde::{Deserialize, Serialize};

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    pub fn as_str(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
        }
    }

    pub fn is_user(self) -> bool {
        self == Sender::User
    }

    pub fn is_assistant(self) -> bool {
        self == Sender::Assistant
    }
}

impl AsRef<str> for Sender {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for Sender {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Sender::User),
            "assistant" => Ok(Sender::Assistant),
            _ => Err(format!("invalid sender: {value}")),
        }
    }
}

impl TryFrom<String> for Sender {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Sender> for String {
    fn from(value: Sender) -> Self {
        value.as_str().to_string()
    }
}

/// One entry in the conversation transcript. Immutable once appended.
///
/// Ids are Unix millisecond timestamps assigned at creation; an assistant
/// reply is stamped with its triggering user message's id plus one, so the
/// pair stays adjacent and ordered even when timestamps collide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    pub fn new(id: i64, sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id,
            sender,
            text: text.into(),
        }
    }

    pub fn user(id: i64, text: impl Into<String>) -> Self {
        Self::new(id, Sender::User, text)
    }

    pub fn assistant(id: i64, text: impl Into<String>) -> Self {
        Self::new(id, Sender::Assistant, text)
    }

    pub fn is_user(&self) -> bool {
        self.sender.is_user()
    }

    pub fn is_assistant(&self) -> bool {
        self.sender.is_assistant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_round_trips_through_strings() {
        assert_eq!(Sender::try_from("user"), Ok(Sender::User));
        assert_eq!(Sender::try_from("assistant"), Ok(Sender::Assistant));
        assert_eq!(String::from(Sender::User), "user");
    }

    #[test]
    fn invalid_sender_strings_are_rejected() {
        assert!(Sender::try_from("system").is_err());
    }

    #[test]
    fn constructors_set_sender() {
        assert!(ChatMessage::user(1, "hola").is_user());
        assert!(ChatMessage::assistant(2, "hola").is_assistant());
    }
}
