//! Client command parsing
//!
//! Parses user input like `/switch <id>` or plain chat text and converts
//! it into protocol frames.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::Serialize;
use uuid::Uuid;

use chatwire_protocol::{
    FileMetadata, HistoryRequest, MessageType, ModelSwitch, SessionDelete, SessionNew,
    SessionSwitch,
};
use chatwire_utils::{ChatwireError, Result};

/// Parsed user input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Plain chat message
    Chat(String),
    /// Switch the server to another model
    Model(String),
    /// Show chat history, optionally only the last `n` entries
    History(Option<usize>),
    /// Clear the active session's history
    Clear,
    /// List sessions
    Sessions,
    /// Start a new session
    New(Option<String>),
    /// Make another session active
    Switch(Uuid),
    /// Delete a session
    Delete(Uuid),
    /// Describe a local file to the server
    Offer(PathBuf),
    /// Print the command list
    Help,
    /// Leave the client
    Quit,
    /// Unknown command name
    Unknown(String),
}

/// Error parsing a command
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Empty input
    Empty,
    /// Required argument not given
    MissingArgument(&'static str),
    /// Argument present but malformed
    InvalidArgument(String),
    /// Invalid syntax
    InvalidSyntax(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Empty => write!(f, "empty command"),
            ParseError::MissingArgument(name) => write!(f, "missing {}", name),
            ParseError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            ParseError::InvalidSyntax(msg) => write!(f, "invalid syntax: {}", msg),
        }
    }
}

impl std::error::Error for ParseError {}

/// Usage text for `/help`
pub const HELP: &str = "\
Commands:
  /model <name>     switch model
  /history [n]      show history (last n entries)
  /clear            clear the current session
  /sessions         list sessions
  /new [name]       start a new session
  /switch <id>      switch to a session
  /delete <id>      delete a session
  /offer <path>     describe a local file to the server
  /help             show this help
  /quit             exit
Anything else is sent as a chat message.";

/// Parse a line of user input
///
/// Lines starting with `/` are commands, everything else is chat text.
pub fn parse_input(input: &str) -> std::result::Result<Command, ParseError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    if is_command(trimmed) {
        parse_command(trimmed)
    } else {
        Ok(Command::Chat(trimmed.to_string()))
    }
}

/// Parse a command string into a Command
///
/// # Examples
///
/// ```
/// use chatwire_client::commands::{parse_command, Command};
///
/// assert_eq!(parse_command("/model echo-large").unwrap(), Command::Model("echo-large".into()));
/// assert_eq!(parse_command("/history 5").unwrap(), Command::History(Some(5)));
/// ```
pub fn parse_command(input: &str) -> std::result::Result<Command, ParseError> {
    let input = input.trim();

    if input.is_empty() {
        return Err(ParseError::Empty);
    }

    let Some(body) = input.strip_prefix('/') else {
        return Err(ParseError::InvalidSyntax(
            "command must start with /".to_string(),
        ));
    };

    let (name, rest) = split_first_token(body);
    let name = name.to_lowercase();
    let args = rest.trim();

    match name.as_str() {
        "model" => {
            if args.is_empty() {
                Err(ParseError::MissingArgument("model name"))
            } else {
                Ok(Command::Model(args.to_string()))
            }
        }
        "history" => {
            if args.is_empty() {
                Ok(Command::History(None))
            } else {
                args.parse::<usize>()
                    .map(|n| Command::History(Some(n)))
                    .map_err(|_| ParseError::InvalidArgument(format!("'{}' is not a count", args)))
            }
        }
        "clear" => Ok(Command::Clear),
        "sessions" => Ok(Command::Sessions),
        "new" => Ok(Command::New(if args.is_empty() {
            None
        } else {
            Some(args.to_string())
        })),
        "switch" => parse_session_id(args).map(Command::Switch),
        "delete" => parse_session_id(args).map(Command::Delete),
        "offer" => {
            if args.is_empty() {
                Err(ParseError::MissingArgument("file path"))
            } else {
                Ok(Command::Offer(PathBuf::from(unquote(args)?)))
            }
        }
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        _ => Ok(Command::Unknown(name)),
    }
}

fn parse_session_id(args: &str) -> std::result::Result<Uuid, ParseError> {
    if args.is_empty() {
        return Err(ParseError::MissingArgument("session id"));
    }
    Uuid::parse_str(args)
        .map_err(|_| ParseError::InvalidArgument(format!("'{}' is not a session id", args)))
}

/// Strip one level of matching quotes
fn unquote(input: &str) -> std::result::Result<&str, ParseError> {
    for quote in ['"', '\''] {
        if let Some(stripped) = input.strip_prefix(quote) {
            return stripped
                .strip_suffix(quote)
                .ok_or_else(|| ParseError::InvalidSyntax("unclosed quote".to_string()));
        }
    }
    Ok(input)
}

/// Split the first whitespace-delimited token from a string
fn split_first_token(input: &str) -> (&str, &str) {
    if let Some(pos) = input.find(char::is_whitespace) {
        (&input[..pos], &input[pos..])
    } else {
        (input, "")
    }
}

/// Check if input looks like a command (starts with /)
pub fn is_command(input: &str) -> bool {
    input.trim().starts_with('/')
}

impl Command {
    /// The frame this command sends, if it talks to the server
    ///
    /// `Help`, `Quit` and `Unknown` are handled locally and yield `None`.
    pub fn to_request(&self) -> Result<Option<(MessageType, Bytes)>> {
        let request = match self {
            Command::Chat(text) => (MessageType::ChatText, Bytes::copy_from_slice(text.as_bytes())),
            Command::Model(model) => json(
                MessageType::ModelSwitch,
                &ModelSwitch {
                    model: model.clone(),
                },
            )?,
            Command::History(limit) => json(
                MessageType::HistoryRequest,
                &HistoryRequest {
                    session_id: None,
                    limit: *limit,
                },
            )?,
            Command::Clear => (MessageType::ClearRequest, Bytes::new()),
            Command::Sessions => (MessageType::SessionList, Bytes::from_static(b"{}")),
            Command::New(name) => json(MessageType::SessionNew, &SessionNew { name: name.clone() })?,
            Command::Switch(session_id) => json(
                MessageType::SessionSwitch,
                &SessionSwitch {
                    session_id: *session_id,
                },
            )?,
            Command::Delete(session_id) => json(
                MessageType::SessionDelete,
                &SessionDelete {
                    session_id: *session_id,
                },
            )?,
            Command::Offer(path) => json(MessageType::FileMetadata, &file_metadata(path)?)?,
            Command::Help | Command::Quit | Command::Unknown(_) => return Ok(None),
        };
        Ok(Some(request))
    }
}

fn json<T: Serialize>(msg_type: MessageType, value: &T) -> Result<(MessageType, Bytes)> {
    let data = serde_json::to_vec(value)
        .map_err(|e| ChatwireError::InvalidMessage(format!("Failed to encode {}: {}", msg_type, e)))?;
    Ok((msg_type, Bytes::from(data)))
}

/// Describe a local file without reading its content
pub fn file_metadata(path: &Path) -> Result<FileMetadata> {
    let meta = std::fs::metadata(path).map_err(|source| ChatwireError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    if !meta.is_file() {
        return Err(ChatwireError::InvalidMessage(format!(
            "{} is not a regular file",
            path.display()
        )));
    }

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(FileMetadata {
        mime_type: mime_type(path).map(str::to_string),
        filename,
        size: meta.len(),
        checksum: None,
    })
}

fn mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "txt" | "log" => "text/plain",
        "md" => "text/markdown",
        "json" => "application/json",
        "toml" => "application/toml",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "csv" => "text/csv",
        _ => return None,
    };
    Some(mime)
}
