//! Plain-text transcript logging for chat sessions.
//!
//! Distinct from diagnostic tracing: this writes the conversation itself,
//! one message per block, to a user-chosen file passed via `--log`.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};

pub struct LoggingState {
    file_path: Option<String>,
    is_active: bool,
}

impl LoggingState {
    /// Create the logging state. When a path is given, write access is
    /// verified up front and logging starts active.
    pub fn new(log_file: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        if let Some(path) = &log_file {
            test_file_access(path)?;
        }
        let is_active = log_file.is_some();
        Ok(LoggingState {
            file_path: log_file,
            is_active,
        })
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn log_message(&self, content: &str) -> Result<(), Box<dyn std::error::Error>> {
        let Some(file_path) = self.file_path.as_ref().filter(|_| self.is_active) else {
            return Ok(());
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let mut writer = BufWriter::new(file);

        for line in content.lines() {
            writeln!(writer, "{line}")?;
        }
        // Blank line between messages, matching the on-screen spacing.
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

fn test_file_access(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_logging_is_a_no_op() {
        let logging = LoggingState::new(None).unwrap();
        assert!(!logging.is_active());
        logging.log_message("Tú: hola").unwrap();
    }

    #[test]
    fn messages_are_appended_with_spacing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.log");
        let logging = LoggingState::new(Some(path.to_string_lossy().into_owned())).unwrap();
        assert!(logging.is_active());

        logging.log_message("Tú: hola").unwrap();
        logging.log_message("Chipi: ¡hola!").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "Tú: hola\n\nChipi: ¡hola!\n\n");
    }
}
