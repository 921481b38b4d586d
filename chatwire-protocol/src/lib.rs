//! chatwire-protocol: Wire definitions shared by client and server
//!
//! Every message on the wire is a [`Frame`]: a 5-byte big-endian header
//! followed by the payload.
//!
//! ```text
//! offset 0      : type    (1 byte, see MessageType)
//! offset 1-2    : seq     (u16)
//! offset 3-4    : length  (u16, 0..=65535)
//! offset 5..    : data    (length bytes)
//! ```
//!
//! # Example
//!
//! ```rust
//! use chatwire_protocol::{decode, encode, MessageType};
//!
//! let bytes = encode(MessageType::ChatText, 1, b"Hello, World!").unwrap();
//! assert_eq!(&bytes[..5], &[0x01, 0x00, 0x01, 0x00, 0x0D]);
//!
//! let (frame, consumed) = decode(&bytes).unwrap();
//! assert_eq!(consumed, bytes.len());
//! assert_eq!(frame.data(), b"Hello, World!");
//! ```

pub mod codec;
pub mod messages;
pub mod types;

// Re-export main types at crate root
pub use codec::{decode, encode, encode_into, CodecError, Frame, FrameCodec};
pub use messages::{MessageType, PayloadKind};
pub use types::{
    DownloadOffer, FileMetadata, HistoryEntry, HistoryRequest, ModelSwitch, Role,
    SessionDelete, SessionInfo, SessionList, SessionNew, SessionSwitch,
};

/// Size of the frame header in bytes
pub const HEADER_LEN: usize = 5;

/// Largest payload a single frame can carry
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize;
