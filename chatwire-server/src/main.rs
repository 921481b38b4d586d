//! chatwire-server - reference server for the chatwire protocol

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use chatwire_server::{run_tcp_accept_loop, EchoProvider, LlmProvider, SharedState};
use chatwire_utils::{init_logging_with_config, LogConfig, Result};

/// chatwire-server - serve chat sessions over TCP
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, short = 'l', env = "CHATWIRE_LISTEN", default_value = "127.0.0.1:7878")]
    listen: String,

    /// Model selected at startup
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Log filter (overrides CHATWIRE_LOG), e.g. "debug" or "chatwire_server=trace"
    #[arg(long)]
    log: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut log_config = LogConfig::server();
    if let Some(filter) = &args.log {
        log_config = log_config.with_filter(filter.clone());
    }
    init_logging_with_config(log_config)?;

    info!("chatwire server starting");

    if let Err(e) = run(args).await {
        error!("chatwire server error: {}", e);
        return Err(e);
    }

    info!("chatwire server stopped");
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let provider = match &args.model {
        Some(model) => EchoProvider::with_model(model)?,
        None => EchoProvider::new(),
    };
    if !provider.validate_api_key().await {
        return Err(chatwire_utils::ChatwireError::provider(format!(
            "{} provider rejected its credentials",
            provider.name()
        )));
    }
    info!(provider = provider.name(), model = %provider.model(), "provider ready");

    let state = SharedState::new(Arc::new(provider));

    let shutdown_state = state.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, shutting down");
                shutdown_state.shutdown();
            }
            Err(e) => error!("Failed to listen for interrupt: {}", e),
        }
    });

    run_tcp_accept_loop(&args.listen, state).await
}
