//! Chipi is a terminal chat client for a remote language-tutoring API.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`api`] wraps every outbound HTTP call to the tutoring service and
//!   attaches the stored bearer credential uniformly.
//! - [`auth`] owns the session lifecycle: the durable token pair, the
//!   identity decoded from it, and the login/register/logout flows.
//! - [`core`] holds runtime state: the chat session controller with its
//!   append-only transcript and pending gate, plus configuration.
//! - [`cli`] parses arguments and runs either an auth subcommand or the
//!   interactive chat loop.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`cli::run`].

pub mod api;
pub mod auth;
pub mod cli;
pub mod core;
pub mod utils;
