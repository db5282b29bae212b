//! Line-oriented interactive chat loop.
//!
//! Sends are serialized by construction: the loop awaits each round trip
//! before reading the next line, so the session's pending gate never sees
//! overlapping submissions from here. Failures print the session's apology
//! message and the loop keeps running.

use std::error::Error;
use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::ApiClient;
use crate::auth::token::UserIdentity;
use crate::auth::SessionManager;
use crate::cli::{prompt_line, prompt_password};
use crate::core::chat::{ChatSession, SendOutcome, TutorBackend};
use crate::utils::logging::LoggingState;

pub async fn run_chat(
    api: Arc<ApiClient>,
    session: SessionManager,
    log_file: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let identity = match session.restore() {
        Ok(Some(identity)) => identity,
        Ok(None) => interactive_login(&session).await?,
        Err(err) => {
            // A stale or malformed stored token: drop it and start over.
            eprintln!("La sesión guardada no es válida ({err}).");
            session.logout()?;
            interactive_login(&session).await?
        }
    };
    println!("Hola, {}. Escribe /quit para salir.", identity.username);
    println!();

    let logging = LoggingState::new(log_file)?;
    let mut chat = ChatSession::new(Arc::clone(&api) as Arc<dyn TutorBackend>, logging);

    // The seeded greeting opens the conversation.
    if let Some(greeting) = chat.messages().first() {
        println!("Chipi: {}", greeting.text);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if matches!(line.trim(), "/quit" | "/salir") {
            break;
        }

        match chat.send(&line).await {
            SendOutcome::Replied | SendOutcome::Failed(_) => {
                if let Some(reply) = chat.messages().last() {
                    println!("Chipi: {}", reply.text);
                }
            }
            SendOutcome::NotSent => {}
        }
    }

    Ok(())
}

async fn interactive_login(session: &SessionManager) -> Result<UserIdentity, Box<dyn Error>> {
    println!("Inicia sesión para hablar con Chipi.");
    loop {
        let username = prompt_line("Usuario: ")?;
        if username.is_empty() {
            continue;
        }
        let password = prompt_password()?;
        match session.login(&username, &password).await {
            Ok(identity) => return Ok(identity),
            Err(err) => eprintln!("No se pudo iniciar sesión: {err}"),
        }
    }
}
