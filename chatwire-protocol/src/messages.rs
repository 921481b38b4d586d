//! Message type registry
//!
//! The closed set of frame types and the payload convention each one uses.
//! Payload conventions are informational: the codec moves raw bytes and
//! never checks that a text frame holds valid UTF-8.

use std::fmt;

use crate::codec::CodecError;

/// How a message type's payload is meant to be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// UTF-8 text
    Text,
    /// A JSON document
    Json,
    /// Opaque bytes
    Binary,
    /// No payload
    Empty,
}

/// Frame type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    /// Chat message text (either direction)
    ChatText = 0x01,
    /// Intermediate reasoning emitted by the agent
    AgentThought = 0x0A,
    /// Server offers a file for download
    DownloadOffer = 0x0C,
    /// Raw file content
    FileData = 0x0D,
    /// Description of a file about to be transferred
    FileMetadata = 0x0E,
    /// Select the model used for chat
    ModelSwitch = 0x0F,
    /// Ask for the active session's history
    HistoryRequest = 0x10,
    /// Clear the active session's history
    ClearRequest = 0x11,
    /// List sessions (request and response share the code)
    SessionList = 0x14,
    /// Make another session active
    SessionSwitch = 0x15,
    /// Create a session
    SessionNew = 0x16,
    /// Delete a session
    SessionDelete = 0x17,
}

impl MessageType {
    /// Every registered message type, in code order
    pub const ALL: [MessageType; 12] = [
        MessageType::ChatText,
        MessageType::AgentThought,
        MessageType::DownloadOffer,
        MessageType::FileData,
        MessageType::FileMetadata,
        MessageType::ModelSwitch,
        MessageType::HistoryRequest,
        MessageType::ClearRequest,
        MessageType::SessionList,
        MessageType::SessionSwitch,
        MessageType::SessionNew,
        MessageType::SessionDelete,
    ];

    /// Look up a message type by its wire code
    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(MessageType::ChatText),
            0x0A => Some(MessageType::AgentThought),
            0x0C => Some(MessageType::DownloadOffer),
            0x0D => Some(MessageType::FileData),
            0x0E => Some(MessageType::FileMetadata),
            0x0F => Some(MessageType::ModelSwitch),
            0x10 => Some(MessageType::HistoryRequest),
            0x11 => Some(MessageType::ClearRequest),
            0x14 => Some(MessageType::SessionList),
            0x15 => Some(MessageType::SessionSwitch),
            0x16 => Some(MessageType::SessionNew),
            0x17 => Some(MessageType::SessionDelete),
            _ => None,
        }
    }

    /// The wire code
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Payload convention for this type
    pub fn payload_kind(self) -> PayloadKind {
        match self {
            MessageType::ChatText | MessageType::AgentThought => PayloadKind::Text,
            MessageType::FileData => PayloadKind::Binary,
            MessageType::ClearRequest => PayloadKind::Empty,
            MessageType::DownloadOffer
            | MessageType::FileMetadata
            | MessageType::ModelSwitch
            | MessageType::HistoryRequest
            | MessageType::SessionList
            | MessageType::SessionSwitch
            | MessageType::SessionNew
            | MessageType::SessionDelete => PayloadKind::Json,
        }
    }

    /// Protocol name, e.g. `CHAT_TEXT`
    pub fn name(self) -> &'static str {
        match self {
            MessageType::ChatText => "CHAT_TEXT",
            MessageType::AgentThought => "AGENT_THOUGHT",
            MessageType::DownloadOffer => "DOWNLOAD_OFFER",
            MessageType::FileData => "FILE_DATA",
            MessageType::FileMetadata => "FILE_METADATA",
            MessageType::ModelSwitch => "MODEL_SWITCH",
            MessageType::HistoryRequest => "HISTORY_REQUEST",
            MessageType::ClearRequest => "CLEAR_REQUEST",
            MessageType::SessionList => "SESSION_LIST",
            MessageType::SessionSwitch => "SESSION_SWITCH",
            MessageType::SessionNew => "SESSION_NEW",
            MessageType::SessionDelete => "SESSION_DELETE",
        }
    }
}

impl TryFrom<u8> for MessageType {
    type Error = CodecError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        MessageType::from_u8(code).ok_or(CodecError::UnknownMessageType(code))
    }
}

impl From<MessageType> for u8 {
    fn from(msg_type: MessageType) -> u8 {
        msg_type.as_u8()
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
