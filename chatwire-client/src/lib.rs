//! chatwire-client: connection engine and terminal client for chatwire
//!
//! The [`connection`] module is usable on its own: connect to a server,
//! send frames, observe inbound frames through a [`MessageHandler`], and
//! wait for replies with [`Connection::wait_response`] or
//! [`Connection::request`].

pub mod cli;
pub mod commands;
pub mod config;
pub mod connection;
pub mod terminal;

pub use commands::{is_command, parse_command, parse_input, Command, ParseError};
pub use config::ClientConfig;
pub use connection::{
    CallbackHandler, Connection, ConnectionConfig, ConnectionState, MessageHandler, ResponseSignal,
    WaitOutcome,
};
pub use terminal::TerminalHandler;
