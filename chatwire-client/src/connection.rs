//! Client-server connection management
//!
//! Provides the TCP connection to a chatwire server with frame decoding,
//! in-order dispatch and single-slot response correlation.

mod client;
mod handler;
mod signal;

pub use client::{Connection, ConnectionConfig, ConnectionState, DEFAULT_CONNECT_TIMEOUT, DEFAULT_PORT};
pub use handler::{CallbackHandler, MessageHandler};
pub use signal::{ResponseSignal, WaitOutcome};
