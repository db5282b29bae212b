//! Shared constants used across the application

/// Default address of the tutoring API when neither `--server`, the
/// `CHIPI_BASE_URL` environment variable, nor the config file names one.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Assistant greeting seeded into every fresh chat session.
pub const GREETING_TEXT: &str =
    "¡Hola! Soy Chipi, tu tutor de español. Escribe una frase y la corregiré para ti.";

/// Fixed id of the seeded greeting message. User message ids are Unix
/// millisecond timestamps, so the greeting always sorts first.
pub const GREETING_MESSAGE_ID: i64 = 1;

/// Assistant-voiced notice appended to the transcript when a chat round
/// trip fails for any reason.
pub const CONNECTION_APOLOGY: &str =
    "Lo siento, tuve un problema para conectarme. Inténtalo de nuevo.";
