//! TCP listener

use tokio::net::TcpListener;
use tracing::{debug, error, info};

use chatwire_utils::{ChatwireError, Result};

use crate::handle_client;
use crate::SharedState;

/// Bind `addr` and run the accept loop until shutdown
pub async fn run_tcp_accept_loop(addr: &str, shared_state: SharedState) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ChatwireError::connection(format!("Failed to bind TCP listener to {}: {}", addr, e)))?;

    info!("TCP listener bound to {}", listener.local_addr()?);
    serve(listener, shared_state).await;
    Ok(())
}

/// Accept clients on an already bound listener until shutdown
pub async fn serve(listener: TcpListener, shared_state: SharedState) {
    let mut shutdown_rx = shared_state.subscribe_shutdown();

    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, peer_addr)) => {
                        debug!("New TCP connection from {}", peer_addr);
                        if let Err(e) = stream.set_nodelay(true) {
                            debug!("Failed to set TCP_NODELAY for {}: {}", peer_addr, e);
                        }
                        let state_clone = shared_state.clone();
                        tokio::spawn(async move {
                            let (reader, writer) = stream.into_split();
                            handle_client(reader, writer, state_clone).await;
                            debug!("Connection from {} closed", peer_addr);
                        });
                    }
                    Err(e) => {
                        error!("TCP accept error: {}", e);
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                info!("Shutdown signal received, stopping TCP accept loop");
                break;
            }
        }
    }
}
