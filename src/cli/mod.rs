//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the
//! appropriate commands. With no subcommand, the interactive chat loop runs.

pub mod chat_loop;

use std::error::Error;
use std::io::Write;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::api::ApiClient;
use crate::auth::store::TokenStore;
use crate::auth::{AuthBackend, SessionManager};
use crate::cli::chat_loop::run_chat;
use crate::core::config::Config;

#[derive(Parser)]
#[command(name = "chipi")]
#[command(about = "A terminal chat client for the Chipi language-tutoring API")]
#[command(
    long_about = "Chipi is a terminal chat client for a language-tutoring API. Write a \
sentence and the remote tutor corrects it.\n\n\
Authentication:\n\
  Use 'chipi register' and 'chipi login' to create an account and store a\n\
  session token securely in your system keyring.\n\n\
Environment Variables:\n\
  CHIPI_BASE_URL    Tutoring server base URL (overrides the config file)\n\
  RUST_LOG          Diagnostic log filter (e.g. chipi=debug)\n\n\
Controls:\n\
  Type              Enter a sentence and press Enter to send it\n\
  /quit             Leave the chat"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Tutoring server base URL (overrides CHIPI_BASE_URL and the config file)
    #[arg(short, long, global = true, value_name = "URL")]
    pub server: Option<String>,

    /// Append the chat transcript to this file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub log: Option<String>,

    /// Keep the session token in memory instead of the system keyring
    #[arg(long, global = true)]
    pub no_keyring: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account on the tutoring server
    Register { username: String, email: String },
    /// Log in and store the issued session token
    Login { username: String },
    /// Drop the stored session token
    Logout,
    /// Show who is currently logged in
    Whoami,
    /// List your stored corrections
    Progress,
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;
    let base_url = config.resolve_base_url(args.server.as_deref());

    let tokens = Arc::new(if args.no_keyring {
        TokenStore::in_memory()
    } else {
        TokenStore::new()
    });
    let api = Arc::new(ApiClient::new(&base_url, Arc::clone(&tokens)));
    let session = SessionManager::new(Arc::clone(&api) as Arc<dyn AuthBackend>, tokens);

    match args.command {
        Some(Commands::Register { username, email }) => {
            let password = prompt_password()?;
            session.register(&username, &email, &password).await?;
            println!("Usuario registrado con éxito. Por favor, inicia sesión.");
            Ok(())
        }
        Some(Commands::Login { username }) => {
            let password = prompt_password()?;
            let identity = session.login(&username, &password).await?;
            println!("Hola, {}", identity.username);
            Ok(())
        }
        Some(Commands::Logout) => {
            session.logout()?;
            println!("Sesión cerrada.");
            Ok(())
        }
        Some(Commands::Whoami) => {
            match session.restore()? {
                Some(identity) => println!("{}", identity.username),
                None => println!("No has iniciado sesión."),
            }
            Ok(())
        }
        Some(Commands::Progress) => {
            let entries = api.fetch_progress().await?;
            if entries.is_empty() {
                println!("Todavía no hay correcciones guardadas.");
            }
            for entry in entries {
                println!(
                    "[{}] {}",
                    entry.created_at.format("%Y-%m-%d %H:%M"),
                    entry.original_text
                );
                if let Some(corrected) = entry.corrected_text {
                    println!("  → {corrected}");
                }
                if let Some(feedback) = entry.feedback {
                    println!("  {feedback}");
                }
            }
            Ok(())
        }
        None => run_chat(api, session, args.log).await,
    }
}

pub(crate) fn prompt_line(prompt: &str) -> Result<String, Box<dyn Error>> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    let read = std::io::stdin().read_line(&mut line)?;
    if read == 0 {
        return Err("aborted".into());
    }
    Ok(line.trim().to_string())
}

pub(crate) fn prompt_password() -> Result<String, Box<dyn Error>> {
    prompt_line("Contraseña: ")
}
