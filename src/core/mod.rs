pub mod chat;
pub mod config;
pub mod constants;
pub mod message;
