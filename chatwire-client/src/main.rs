//! chatwire client - terminal chat with a chatwire server

use chatwire_client::cli::Args;
use chatwire_client::commands::Command;
use chatwire_client::terminal::{execute, run_once, run_repl};
use chatwire_client::{ClientConfig, Connection, TerminalHandler};
use chatwire_utils::{init_logging_with_config, ChatwireError, LogConfig, Result};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    init_logging_with_config(LogConfig::client())?;
    tracing::debug!("CLI args: {:?}", args);

    match run_app(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::error!("chatwire client error: {}", e);
            eprintln!("Error: {}", e);
            Err(e)
        }
    }
}

async fn run_app(args: Args) -> Result<()> {
    let config = ClientConfig::load();
    let conn_config = args.connection_config(&config)?;
    let timeout = args.response_timeout(&config);
    let addr = conn_config.addr();

    let mut conn = Connection::new(conn_config);
    conn.set_handler(TerminalHandler::stdout());

    if !conn.connect().await? {
        return Err(ChatwireError::connection(format!(
            "could not reach a chatwire server at {}",
            addr
        )));
    }

    let result = session(&conn, &args, timeout).await;
    conn.close().await;
    result
}

async fn session(conn: &Connection, args: &Args, timeout: std::time::Duration) -> Result<()> {
    if let Some(model) = &args.model {
        execute(conn, &Command::Model(model.clone()), timeout).await?;
    }

    match args.message_string() {
        Some(message) => run_once(conn, &message, timeout).await,
        None => run_repl(conn, timeout).await,
    }
}
