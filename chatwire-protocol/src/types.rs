//! JSON payload types
//!
//! Frames whose [`PayloadKind`](crate::PayloadKind) is `Json` carry one of
//! these documents. Optional fields are omitted when unset so small
//! requests stay small on the wire.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `MODEL_SWITCH` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSwitch {
    pub model: String,
}

/// `DOWNLOAD_OFFER` payload: a file the server is willing to send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadOffer {
    pub file_id: Uuid,
    pub filename: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// `FILE_METADATA` payload: describes a file before its content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub filename: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Hex digest of the content, when the sender computed one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

/// `HISTORY_REQUEST` payload
///
/// An empty object asks for the full history of the active session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    /// Only the most recent `limit` entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// Author of a chat history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One entry of a session's chat history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

impl HistoryEntry {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Summary of a chat session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: Uuid,
    pub name: String,
    /// Unix timestamp (seconds)
    pub created_at: i64,
    pub message_count: usize,
}

/// `SESSION_LIST` response payload
///
/// Requests send an empty object; the server answers with this document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionList {
    #[serde(default)]
    pub sessions: Vec<SessionInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<Uuid>,
}

/// `SESSION_SWITCH` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSwitch {
    pub session_id: Uuid,
}

/// `SESSION_NEW` payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionNew {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// `SESSION_DELETE` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDelete {
    pub session_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_switch_shape() {
        let json = serde_json::to_string(&ModelSwitch {
            model: "echo-small".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"model":"echo-small"}"#);
    }

    #[test]
    fn test_history_request_empty_object() {
        let req: HistoryRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req, HistoryRequest::default());
        assert_eq!(serde_json::to_string(&req).unwrap(), "{}");
    }

    #[test]
    fn test_session_list_request_is_empty_object() {
        let list: SessionList = serde_json::from_str("{}").unwrap();
        assert!(list.sessions.is_empty());
        assert!(list.active.is_none());
    }

    #[test]
    fn test_role_lowercase() {
        let entry = HistoryEntry::new(Role::Assistant, "hi");
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn test_file_metadata_optional_fields() {
        let meta: FileMetadata =
            serde_json::from_str(r#"{"filename":"notes.txt","size":12}"#).unwrap();
        assert_eq!(meta.filename, "notes.txt");
        assert_eq!(meta.size, 12);
        assert!(meta.mime_type.is_none());
        assert!(meta.checksum.is_none());
    }

    #[test]
    fn test_session_switch_requires_id() {
        let result: Result<SessionSwitch, _> = serde_json::from_str("{}");
        assert!(result.is_err());
    }

    #[test]
    fn test_download_offer_roundtrip() {
        let offer = DownloadOffer {
            file_id: Uuid::new_v4(),
            filename: "report.pdf".into(),
            size: 2048,
            mime_type: Some("application/pdf".into()),
        };
        let json = serde_json::to_vec(&offer).unwrap();
        let parsed: DownloadOffer = serde_json::from_slice(&json).unwrap();
        assert_eq!(parsed, offer);
    }
}
