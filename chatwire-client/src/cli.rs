//! Command-line argument parsing for the chatwire client
//!
//! Uses clap for argument parsing with derive macros.

use std::time::Duration;

use clap::Parser;

use chatwire_utils::Result;

use crate::config::ClientConfig;
use crate::connection::ConnectionConfig;

/// chatwire - terminal chat client for LLM agents
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Server host (overrides the config file)
    #[arg(long, env = "CHATWIRE_HOST")]
    pub host: Option<String>,

    /// Server port (overrides the config file)
    #[arg(long, short = 'p', env = "CHATWIRE_PORT")]
    pub port: Option<u16>,

    /// Connection address (tcp://host:port) or a remote alias from the config
    ///
    /// Takes precedence over --host and --port.
    /// Example: tcp://127.0.0.1:7878 or gpu-box
    #[arg(long, env = "CHATWIRE_ADDR")]
    pub addr: Option<String>,

    /// Seconds to wait for a reply before giving up
    #[arg(long, short = 't')]
    pub timeout: Option<u64>,

    /// Switch to this model right after connecting
    #[arg(long, short = 'm')]
    pub model: Option<String>,

    /// Don't wait for the server's welcome message when connecting
    #[arg(long, default_value_t = false)]
    pub no_welcome: bool,

    /// Send this message, print the reply and exit
    ///
    /// Example: chatwire what is a monad
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub message: Vec<String>,
}

impl Args {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the one-shot message if provided
    pub fn message_string(&self) -> Option<String> {
        if self.message.is_empty() {
            None
        } else {
            Some(self.message.join(" "))
        }
    }

    /// Combine config file settings with command-line overrides
    pub fn connection_config(&self, config: &ClientConfig) -> Result<ConnectionConfig> {
        let mut conn = config.connection_config();

        if let Some(addr) = &self.addr {
            let resolved = config.resolve_remote(addr).unwrap_or(addr);
            let target = ConnectionConfig::from_addr(resolved)?;
            conn.host = target.host;
            conn.port = target.port;
        } else {
            if let Some(host) = &self.host {
                conn.host = host.clone();
            }
            if let Some(port) = self.port {
                conn.port = port;
            }
        }

        if self.no_welcome {
            conn.await_welcome = false;
        }

        Ok(conn)
    }

    /// Reply timeout from the command line or the config file
    pub fn response_timeout(&self, config: &ClientConfig) -> Duration {
        self.timeout
            .map(Duration::from_secs)
            .unwrap_or_else(|| config.response_timeout())
    }
}
