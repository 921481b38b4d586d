//! Frame codec for the chatwire wire format

use std::borrow::Cow;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{de::DeserializeOwned, Serialize};
use tokio_util::codec::{Decoder, Encoder};

use crate::messages::MessageType;
use crate::{HEADER_LEN, MAX_PAYLOAD_LEN};

/// Protocol codec error
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON payload error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Frame too short: {len} bytes, header needs 5")]
    FrameTooShort { len: usize },

    #[error("Length mismatch: header declares {declared} bytes, {available} available")]
    LengthMismatch { declared: usize, available: usize },

    #[error("Unknown message type: {0:#04x}")]
    UnknownMessageType(u8),
}

impl CodecError {
    /// True when more bytes could still complete the frame
    pub fn is_incomplete(&self) -> bool {
        matches!(
            self,
            CodecError::FrameTooShort { .. } | CodecError::LengthMismatch { .. }
        )
    }
}

/// A single message on the wire
///
/// Construction validates the payload size, so any `Frame` can be encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    msg_type: MessageType,
    seq: u16,
    data: Bytes,
}

impl Frame {
    /// Create a frame, rejecting payloads over [`MAX_PAYLOAD_LEN`]
    pub fn new(msg_type: MessageType, seq: u16, data: impl Into<Bytes>) -> Result<Self, CodecError> {
        let data = data.into();
        check_payload_len(data.len())?;
        Ok(Self {
            msg_type,
            seq,
            data,
        })
    }

    /// Create a frame with no payload
    pub fn empty(msg_type: MessageType, seq: u16) -> Self {
        Self {
            msg_type,
            seq,
            data: Bytes::new(),
        }
    }

    /// Create a frame carrying UTF-8 text
    pub fn from_text(msg_type: MessageType, seq: u16, text: &str) -> Result<Self, CodecError> {
        Self::new(msg_type, seq, Bytes::copy_from_slice(text.as_bytes()))
    }

    /// Create a frame carrying a JSON document
    pub fn from_json<T: Serialize + ?Sized>(
        msg_type: MessageType,
        seq: u16,
        value: &T,
    ) -> Result<Self, CodecError> {
        let json = serde_json::to_vec(value)?;
        Self::new(msg_type, seq, json)
    }

    pub fn msg_type(&self) -> MessageType {
        self.msg_type
    }

    pub fn seq(&self) -> u16 {
        self.seq
    }

    /// Raw payload bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Payload as a cheaply clonable buffer
    pub fn payload(&self) -> Bytes {
        self.data.clone()
    }

    /// Payload interpreted as text; invalid UTF-8 is replaced, not rejected
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }

    /// Payload parsed as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, CodecError> {
        Ok(serde_json::from_slice(&self.data)?)
    }

    /// Size of this frame once encoded
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + self.data.len()
    }

    /// Encode to a standalone buffer
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        put_frame(self.msg_type, self.seq, &self.data, &mut buf);
        buf.freeze()
    }
}

fn check_payload_len(len: usize) -> Result<(), CodecError> {
    if len > MAX_PAYLOAD_LEN {
        return Err(CodecError::PayloadTooLarge {
            size: len,
            max: MAX_PAYLOAD_LEN,
        });
    }
    Ok(())
}

fn put_frame(msg_type: MessageType, seq: u16, data: &[u8], dst: &mut BytesMut) {
    dst.reserve(HEADER_LEN + data.len());
    dst.put_u8(msg_type.as_u8());
    dst.put_u16(seq);
    dst.put_u16(data.len() as u16);
    dst.put_slice(data);
}

/// Encode a frame into a new buffer
///
/// Fails with [`CodecError::PayloadTooLarge`] before producing any bytes
/// when `data` exceeds 65535 bytes.
pub fn encode(msg_type: MessageType, seq: u16, data: &[u8]) -> Result<Bytes, CodecError> {
    let mut buf = BytesMut::new();
    encode_into(msg_type, seq, data, &mut buf)?;
    Ok(buf.freeze())
}

/// Append an encoded frame to `dst`
pub fn encode_into(
    msg_type: MessageType,
    seq: u16,
    data: &[u8],
    dst: &mut BytesMut,
) -> Result<(), CodecError> {
    check_payload_len(data.len())?;
    put_frame(msg_type, seq, data, dst);
    Ok(())
}

/// Validate the header at the start of `buf`
///
/// Returns the type, sequence number and payload length once the whole
/// frame is present.
fn parse_header(buf: &[u8]) -> Result<(MessageType, u16, usize), CodecError> {
    if buf.len() < HEADER_LEN {
        return Err(CodecError::FrameTooShort { len: buf.len() });
    }

    let code = buf[0];
    let seq = u16::from_be_bytes([buf[1], buf[2]]);
    let len = u16::from_be_bytes([buf[3], buf[4]]) as usize;

    let available = buf.len() - HEADER_LEN;
    if available < len {
        return Err(CodecError::LengthMismatch {
            declared: len,
            available,
        });
    }

    let msg_type = MessageType::try_from(code)?;
    Ok((msg_type, seq, len))
}

/// Decode the first frame in `buf`
///
/// Returns the frame and the number of bytes it occupied. Bytes past the
/// first frame are left untouched, so concatenated frames can be decoded
/// by slicing off `consumed` bytes and calling again.
pub fn decode(buf: &[u8]) -> Result<(Frame, usize), CodecError> {
    let (msg_type, seq, len) = parse_header(buf)?;
    let consumed = HEADER_LEN + len;
    let frame = Frame {
        msg_type,
        seq,
        data: Bytes::copy_from_slice(&buf[HEADER_LEN..consumed]),
    };
    Ok((frame, consumed))
}

/// Streaming codec for use with `Framed`, `FramedRead` and `FramedWrite`
///
/// Incomplete input yields `Ok(None)` so the transport keeps reading; an
/// unknown type code is an error and the stream cannot be resynchronized.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameCodec;

impl FrameCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match parse_header(src) {
            Ok((msg_type, seq, len)) => {
                src.advance(HEADER_LEN);
                let data = src.split_to(len).freeze();
                Ok(Some(Frame {
                    msg_type,
                    seq,
                    data,
                }))
            }
            Err(CodecError::FrameTooShort { .. }) => Ok(None),
            Err(CodecError::LengthMismatch { declared, .. }) => {
                // Reserve space for the rest of the frame
                src.reserve(HEADER_LEN + declared - src.len());
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_into(item.msg_type, item.seq, &item.data, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ModelSwitch;

    #[test]
    fn test_hello_world_bytes() {
        let bytes = encode(MessageType::ChatText, 1, b"Hello, World!").unwrap();

        let mut expected = vec![0x01, 0x00, 0x01, 0x00, 0x0D];
        expected.extend_from_slice(b"Hello, World!");
        assert_eq!(&bytes[..], &expected[..]);
    }

    #[test]
    fn test_roundtrip() {
        let bytes = encode(MessageType::AgentThought, 4242, b"considering options").unwrap();
        let (frame, consumed) = decode(&bytes).unwrap();

        assert_eq!(consumed, bytes.len());
        assert_eq!(frame.msg_type(), MessageType::AgentThought);
        assert_eq!(frame.seq(), 4242);
        assert_eq!(frame.data(), b"considering options");
    }

    #[test]
    fn test_roundtrip_every_type() {
        for (i, msg_type) in MessageType::ALL.into_iter().enumerate() {
            let payload = vec![i as u8; i * 3];
            let bytes = encode(msg_type, i as u16, &payload).unwrap();
            let (frame, _) = decode(&bytes).unwrap();
            assert_eq!(frame.msg_type(), msg_type);
            assert_eq!(frame.data(), &payload[..]);
        }
    }

    #[test]
    fn test_empty_payload_is_header_only() {
        let bytes = encode(MessageType::ClearRequest, 9, b"").unwrap();
        assert_eq!(bytes.len(), HEADER_LEN);

        let (frame, consumed) = decode(&bytes).unwrap();
        assert_eq!(consumed, HEADER_LEN);
        assert!(frame.data().is_empty());
        assert_eq!(frame, Frame::empty(MessageType::ClearRequest, 9));
    }

    #[test]
    fn test_max_payload_boundary() {
        let data = vec![0xAB; MAX_PAYLOAD_LEN];
        let bytes = encode(MessageType::FileData, 0, &data).unwrap();
        assert_eq!(bytes.len(), HEADER_LEN + MAX_PAYLOAD_LEN);
        assert_eq!(&bytes[3..5], &[0xFF, 0xFF]);

        let (frame, consumed) = decode(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(frame.data().len(), MAX_PAYLOAD_LEN);
    }

    #[test]
    fn test_payload_too_large() {
        let data = vec![0u8; MAX_PAYLOAD_LEN + 1];
        let result = encode(MessageType::FileData, 0, &data);
        assert!(matches!(
            result,
            Err(CodecError::PayloadTooLarge { size: 65536, max: 65535 })
        ));

        let mut dst = BytesMut::new();
        assert!(encode_into(MessageType::FileData, 0, &data, &mut dst).is_err());
        assert!(dst.is_empty(), "nothing may be written for an oversized payload");

        assert!(Frame::new(MessageType::FileData, 0, data).is_err());
    }

    #[test]
    fn test_short_buffer() {
        for len in 0..HEADER_LEN {
            let buf = vec![0x01; len];
            assert!(matches!(
                decode(&buf),
                Err(CodecError::FrameTooShort { len: l }) if l == len
            ));
        }
    }

    #[test]
    fn test_length_mismatch() {
        let mut buf = vec![0x01, 0x00, 0x01, 0x00, 0x0A];
        buf.extend_from_slice(b"12345");

        let result = decode(&buf);
        assert!(matches!(
            result,
            Err(CodecError::LengthMismatch {
                declared: 10,
                available: 5
            })
        ));
        assert!(result.unwrap_err().is_incomplete());
    }

    #[test]
    fn test_unknown_message_type() {
        let buf = [0x02, 0x00, 0x00, 0x00, 0x00];
        let result = decode(&buf);
        assert!(matches!(result, Err(CodecError::UnknownMessageType(0x02))));
        assert!(!result.unwrap_err().is_incomplete());
    }

    #[test]
    fn test_sequence_wraparound() {
        let mut seq = u16::MAX;
        for expected in [u16::MAX, 0, 1] {
            let bytes = encode(MessageType::ChatText, seq, b"x").unwrap();
            let (frame, _) = decode(&bytes).unwrap();
            assert_eq!(frame.seq(), expected);
            seq = seq.wrapping_add(1);
        }
    }

    #[test]
    fn test_invalid_utf8_preserved() {
        let data = [0xFF, 0xFE, b'o', b'k', 0xC3];
        let bytes = encode(MessageType::ChatText, 3, &data).unwrap();
        let (frame, _) = decode(&bytes).unwrap();
        assert_eq!(frame.data(), &data[..]);
        assert!(frame.text().contains("ok"));
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let mut buf = encode(MessageType::ChatText, 1, b"first").unwrap().to_vec();
        buf.extend_from_slice(&encode(MessageType::ChatText, 2, b"second").unwrap());

        let (first, consumed) = decode(&buf).unwrap();
        assert_eq!(first.data(), b"first");
        assert_eq!(consumed, HEADER_LEN + 5);

        let (second, consumed2) = decode(&buf[consumed..]).unwrap();
        assert_eq!(second.data(), b"second");
        assert_eq!(consumed + consumed2, buf.len());
    }

    #[test]
    fn test_frame_json_helpers() {
        let frame = Frame::from_json(
            MessageType::ModelSwitch,
            5,
            &ModelSwitch {
                model: "echo-large".into(),
            },
        )
        .unwrap();

        assert_eq!(frame.text(), r#"{"model":"echo-large"}"#);
        let parsed: ModelSwitch = frame.json().unwrap();
        assert_eq!(parsed.model, "echo-large");

        let bad = Frame::from_text(MessageType::ModelSwitch, 6, "not json").unwrap();
        assert!(matches!(bad.json::<ModelSwitch>(), Err(CodecError::Json(_))));
    }

    #[test]
    fn test_frame_to_bytes_matches_encode() {
        let frame = Frame::from_text(MessageType::ChatText, 77, "hi").unwrap();
        assert_eq!(frame.to_bytes(), encode(MessageType::ChatText, 77, b"hi").unwrap());
        assert_eq!(frame.encoded_len(), 7);
    }

    #[test]
    fn test_codec_roundtrip() {
        let mut codec = FrameCodec::new();
        let frame = Frame::from_text(MessageType::ChatText, 12, "hello").unwrap();

        let mut buf = BytesMut::new();
        codec.encode(frame.clone(), &mut buf).unwrap();

        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, frame);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_codec_partial_frame() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();
        codec
            .encode(Frame::from_text(MessageType::ChatText, 1, "streamed").unwrap(), &mut buf)
            .unwrap();

        // Header only partially present
        let mut partial = buf.split_to(3);
        assert!(codec.decode(&mut partial).unwrap().is_none());

        // Header complete, payload missing
        partial.unsplit(buf.split_to(4));
        assert!(codec.decode(&mut partial).unwrap().is_none());
        assert_eq!(partial.len(), 7, "incomplete input must not be consumed");

        partial.unsplit(buf);
        let frame = codec.decode(&mut partial).unwrap().unwrap();
        assert_eq!(frame.data(), b"streamed");
    }

    #[test]
    fn test_codec_byte_at_a_time() {
        let mut codec = FrameCodec::new();
        let encoded = encode(MessageType::AgentThought, 300, b"one byte at a time").unwrap();

        let mut buf = BytesMut::new();
        let mut decoded = None;
        for (i, byte) in encoded.iter().enumerate() {
            buf.put_u8(*byte);
            let result = codec.decode(&mut buf).unwrap();
            if i + 1 < encoded.len() {
                assert!(result.is_none(), "frame delivered early at byte {}", i);
            } else {
                decoded = result;
            }
        }

        let frame = decoded.unwrap();
        assert_eq!(frame.seq(), 300);
        assert_eq!(frame.data(), b"one byte at a time");
    }

    #[test]
    fn test_codec_multiple_frames_in_buffer() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();

        let frames = vec![
            Frame::from_text(MessageType::AgentThought, 1, "thinking").unwrap(),
            Frame::from_text(MessageType::ChatText, 2, "answer").unwrap(),
            Frame::empty(MessageType::ClearRequest, 3),
        ];
        for frame in &frames {
            codec.encode(frame.clone(), &mut buf).unwrap();
        }

        for expected in &frames {
            let decoded = codec.decode(&mut buf).unwrap().unwrap();
            assert_eq!(&decoded, expected);
        }

        // Buffer should be empty now
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_codec_unknown_type_is_fatal() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::from(&[0x99, 0x00, 0x01, 0x00, 0x00][..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(CodecError::UnknownMessageType(0x99))
        ));
    }
}
