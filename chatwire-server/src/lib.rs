//! chatwire-server: reference server for the chatwire protocol
//!
//! Accepts TCP clients, keeps chat sessions in memory, and answers chat
//! frames through an [`LlmProvider`].

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

pub mod handler;
pub mod provider;
pub mod session;
pub mod tcp;

pub use handler::{handle_client, ClientSession};
pub use provider::{EchoProvider, LlmProvider};
pub use session::{Session, SessionManager};
pub use tcp::{run_tcp_accept_loop, serve};

/// State shared by every client task
#[derive(Clone)]
pub struct SharedState {
    pub sessions: Arc<RwLock<SessionManager>>,
    pub provider: Arc<dyn LlmProvider>,
    pub shutdown_tx: broadcast::Sender<()>,
}

impl SharedState {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            sessions: Arc::new(RwLock::new(SessionManager::new())),
            provider,
            shutdown_tx,
        }
    }

    /// Receiver that fires once when the server shuts down
    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Tell the accept loop and every client task to stop
    pub fn shutdown(&self) {
        // No receivers just means nothing is running yet
        let _ = self.shutdown_tx.send(());
    }
}
