//! Line-oriented terminal front end
//!
//! [`TerminalHandler`] prints inbound frames as they arrive; [`run_repl`]
//! reads user input, sends it, and waits for the server to answer before
//! prompting again.

use std::io::Write;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;
use tracing::{debug, warn};

use chatwire_protocol::{
    DownloadOffer, FileMetadata, Frame, HistoryEntry, MessageType, ModelSwitch, Role,
    SessionDelete, SessionInfo, SessionList,
};
use chatwire_utils::{ChatwireError, Result};

use crate::commands::{parse_input, Command, ParseError, HELP};
use crate::connection::{Connection, ConnectionState, MessageHandler, WaitOutcome};

/// Prints every inbound frame to a writer
pub struct TerminalHandler {
    out: Box<dyn Write + Send>,
}

impl TerminalHandler {
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self { out: Box::new(out) }
    }

    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl MessageHandler for TerminalHandler {
    fn handle(&mut self, frame: &Frame) {
        let line = format_frame(frame);
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            warn!("Failed to write to terminal: {}", e);
        }
    }

    fn on_disconnected(&mut self) {
        let _ = writeln!(self.out, "[disconnected]");
        let _ = self.out.flush();
    }
}

/// Render a frame for display
pub fn format_frame(frame: &Frame) -> String {
    match frame.msg_type() {
        MessageType::ChatText => frame.text().into_owned(),
        MessageType::AgentThought => format!("[thinking] {}", frame.text()),
        MessageType::DownloadOffer => match frame.json::<DownloadOffer>() {
            Ok(offer) => format!(
                "[offer] {} ({} bytes{}) id {}",
                offer.filename,
                offer.size,
                offer
                    .mime_type
                    .map(|m| format!(", {}", m))
                    .unwrap_or_default(),
                offer.file_id
            ),
            Err(_) => format!("[offer] {}", frame.text()),
        },
        MessageType::FileData => format!("[file data] {} bytes", frame.data().len()),
        MessageType::FileMetadata => match frame.json::<FileMetadata>() {
            Ok(meta) => format!("[file] {} ({} bytes)", meta.filename, meta.size),
            Err(_) => format!("[file] {}", frame.text()),
        },
        MessageType::ModelSwitch => match frame.json::<ModelSwitch>() {
            Ok(switch) => format!("[model] now using {}", switch.model),
            Err(_) => format!("[model] {}", frame.text()),
        },
        MessageType::HistoryRequest => match frame.json::<Vec<HistoryEntry>>() {
            Ok(entries) if entries.is_empty() => "[history] empty".to_string(),
            Ok(entries) => entries
                .iter()
                .map(|entry| format!("{}: {}", role_label(entry.role), entry.content))
                .collect::<Vec<_>>()
                .join("\n"),
            Err(_) => format!("[history] {}", frame.text()),
        },
        MessageType::ClearRequest => "[cleared]".to_string(),
        MessageType::SessionList => match frame.json::<SessionList>() {
            Ok(list) => format_sessions(&list),
            Err(_) => format!("[sessions] {}", frame.text()),
        },
        MessageType::SessionSwitch => match frame.json::<SessionInfo>() {
            Ok(info) => format!("[session] switched to {} ({})", info.name, info.id),
            Err(_) => format!("[session] {}", frame.text()),
        },
        MessageType::SessionNew => match frame.json::<SessionInfo>() {
            Ok(info) => format!("[session] created {} ({})", info.name, info.id),
            Err(_) => format!("[session] {}", frame.text()),
        },
        MessageType::SessionDelete => match frame.json::<SessionDelete>() {
            Ok(deleted) => format!("[session] deleted {}", deleted.session_id),
            Err(_) => format!("[session] {}", frame.text()),
        },
    }
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "you",
        Role::Assistant => "assistant",
    }
}

fn format_sessions(list: &SessionList) -> String {
    if list.sessions.is_empty() {
        return "[sessions] none".to_string();
    }

    list.sessions
        .iter()
        .map(|session| {
            let marker = if list.active == Some(session.id) { '*' } else { ' ' };
            format!(
                "{} {} {} ({} messages)",
                marker, session.id, session.name, session.message_count
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wait for the server's answer to the last request
///
/// Agent thoughts are intermediate output; this keeps waiting until some
/// other frame arrives. The caller must have cleared the response signal
/// before sending.
pub async fn await_reply(conn: &Connection, timeout: Duration) -> Result<Frame> {
    let deadline = Instant::now() + timeout;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match conn.wait_response(remaining).await? {
            WaitOutcome::TimedOut => {
                return Err(ChatwireError::ResponseTimeout {
                    millis: timeout.as_millis() as u64,
                })
            }
            WaitOutcome::Woken => {
                // Clear before reading so a frame landing in between re-raises the signal
                conn.clear_response();
                if let Some(frame) = conn.last_frame() {
                    if frame.msg_type() != MessageType::AgentThought {
                        return Ok(frame);
                    }
                    debug!("agent still thinking");
                }
            }
        }
    }
}

/// Send one command's request and wait for its answer
pub async fn execute(conn: &Connection, command: &Command, timeout: Duration) -> Result<Option<Frame>> {
    let Some((msg_type, data)) = command.to_request()? else {
        return Ok(None);
    };

    conn.clear_response();
    conn.send(msg_type, data).await?;
    await_reply(conn, timeout).await.map(Some)
}

/// Send a single chat message and wait for the reply
pub async fn run_once(conn: &Connection, message: &str, timeout: Duration) -> Result<()> {
    execute(conn, &Command::Chat(message.to_string()), timeout).await?;
    Ok(())
}

/// Interactive loop reading commands from stdin until `/quit` or EOF
pub async fn run_repl(conn: &Connection, timeout: Duration) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut state = conn.subscribe_state();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = state.wait_for(|s| *s == ConnectionState::Disconnected) => {
                return Err(ChatwireError::ConnectionClosed);
            }
        };

        let Some(line) = line else {
            // EOF
            println!();
            return Ok(());
        };

        let command = match parse_input(&line) {
            Ok(command) => command,
            Err(ParseError::Empty) => continue,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        match command {
            Command::Quit => return Ok(()),
            Command::Help => println!("{}", HELP),
            Command::Unknown(name) => eprintln!("unknown command /{}, try /help", name),
            command => match execute(conn, &command, timeout).await {
                Ok(_) => {}
                Err(ChatwireError::ResponseTimeout { millis }) => {
                    eprintln!("no reply within {}ms", millis);
                }
                Err(e @ (ChatwireError::NotConnected | ChatwireError::ConnectionClosed)) => {
                    return Err(e);
                }
                Err(e) => eprintln!("{}", e),
            },
        }
    }
}
