//! Per-client frame handling
//!
//! Every inbound frame gets at least one reply carrying the same sequence
//! number. Failures are reported to the client as `CHAT_TEXT` starting
//! with `Error:` and never close the connection; only a broken stream does.

use std::collections::HashMap;

use futures::{Sink, SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, warn};
use uuid::Uuid;

use chatwire_protocol::{
    CodecError, DownloadOffer, FileMetadata, Frame, FrameCodec, HistoryEntry, HistoryRequest,
    MessageType, ModelSwitch, Role, SessionDelete, SessionList, SessionNew, SessionSwitch,
    MAX_PAYLOAD_LEN,
};
use chatwire_utils::{ChatwireError, Result};

use crate::SharedState;

/// A file the client announced with `FILE_METADATA`
#[derive(Debug)]
struct PendingFile {
    metadata: FileMetadata,
    received: u64,
}

/// Protocol state of one connected client
pub struct ClientSession {
    state: SharedState,
    /// Session chat frames go to
    active: Uuid,
    offers: HashMap<Uuid, PendingFile>,
    /// Offer that incoming `FILE_DATA` is counted against
    current_offer: Option<Uuid>,
}

impl ClientSession {
    /// Attach to the most recent session, creating one if there are none
    pub async fn new(state: SharedState) -> Self {
        let active = state.sessions.write().await.resolve_active(None);
        Self {
            state,
            active,
            offers: HashMap::new(),
            current_offer: None,
        }
    }

    pub fn active_session(&self) -> Uuid {
        self.active
    }

    /// Greeting sent before anything else
    pub async fn welcome(&self) -> Result<Frame> {
        let sessions = self.state.sessions.read().await;
        let session = sessions.require(self.active)?;
        let text = format!(
            "Welcome to chatwire (model {}, session {})",
            self.state.provider.model(),
            session.name()
        );
        text_frame(MessageType::ChatText, 0, &text)
    }

    /// Answer one frame, writing replies to `sink`
    ///
    /// Only sink errors are returned; request failures become error replies.
    pub async fn dispatch<S>(&mut self, frame: &Frame, sink: &mut S) -> std::result::Result<(), CodecError>
    where
        S: Sink<Frame, Error = CodecError> + Unpin,
    {
        let seq = frame.seq();

        // Let the client know work has started before the provider answers
        if frame.msg_type() == MessageType::ChatText && !frame.text().trim().is_empty() {
            let thought = format!("Thinking with {}...", self.state.provider.model());
            if let Ok(thought) = text_frame(MessageType::AgentThought, seq, &thought) {
                sink.send(thought).await?;
            }
        }

        let replies = match self.process(frame).await {
            Ok(replies) => replies,
            Err(e) => {
                warn!(msg_type = %frame.msg_type(), seq, "request failed: {}", e);
                vec![error_frame(seq, &e)]
            }
        };

        for reply in replies {
            sink.send(reply).await?;
        }
        Ok(())
    }

    async fn process(&mut self, frame: &Frame) -> Result<Vec<Frame>> {
        let seq = frame.seq();

        match frame.msg_type() {
            MessageType::ChatText => self.chat(frame).await,
            MessageType::ModelSwitch => {
                let request: ModelSwitch = parse(frame)?;
                self.switch_model(seq, &request.model)
            }
            MessageType::HistoryRequest => {
                let request: HistoryRequest = parse_or_default(frame)?;
                let session_id = request.session_id.unwrap_or(self.active);
                let sessions = self.state.sessions.read().await;
                let entries = sessions.require(session_id)?.recent(request.limit);
                Ok(vec![history_frame(seq, entries)?])
            }
            MessageType::ClearRequest => {
                let mut sessions = self.state.sessions.write().await;
                self.active = sessions.resolve_active(Some(self.active));
                sessions.require_mut(self.active)?.clear();
                info!(session = %self.active, "history cleared");
                Ok(vec![Frame::empty(MessageType::ClearRequest, seq)])
            }
            MessageType::SessionList => {
                let mut sessions = self.state.sessions.write().await;
                self.active = sessions.resolve_active(Some(self.active));
                let list = SessionList {
                    sessions: sessions.list_sessions().iter().map(|s| s.info()).collect(),
                    active: Some(self.active),
                };
                Ok(vec![json_frame(MessageType::SessionList, seq, &list)?])
            }
            MessageType::SessionSwitch => {
                let request: SessionSwitch = parse(frame)?;
                let info = self.state.sessions.read().await.require(request.session_id)?.info();
                self.active = info.id;
                info!(session = %info.id, "switched session");
                Ok(vec![json_frame(MessageType::SessionSwitch, seq, &info)?])
            }
            MessageType::SessionNew => {
                let request: SessionNew = parse_or_default(frame)?;
                let info = self.state.sessions.write().await.create_session(request.name).info();
                self.active = info.id;
                info!(session = %info.id, name = %info.name, "created session");
                Ok(vec![json_frame(MessageType::SessionNew, seq, &info)?])
            }
            MessageType::SessionDelete => {
                let request: SessionDelete = parse(frame)?;
                let mut sessions = self.state.sessions.write().await;
                sessions.remove_session(request.session_id)?;
                self.active = sessions.resolve_active(Some(self.active));
                info!(session = %request.session_id, "deleted session");
                Ok(vec![json_frame(MessageType::SessionDelete, seq, &request)?])
            }
            MessageType::FileMetadata => {
                let metadata: FileMetadata = parse(frame)?;
                let offer = DownloadOffer {
                    file_id: Uuid::new_v4(),
                    filename: metadata.filename.clone(),
                    size: metadata.size,
                    mime_type: metadata.mime_type.clone(),
                };
                info!(file_id = %offer.file_id, filename = %offer.filename, size = offer.size, "registered file");
                self.offers.insert(offer.file_id, PendingFile { metadata, received: 0 });
                self.current_offer = Some(offer.file_id);
                Ok(vec![json_frame(MessageType::DownloadOffer, seq, &offer)?])
            }
            MessageType::FileData => {
                let len = frame.data().len();
                let text = match self.current_offer.and_then(|id| self.offers.get_mut(&id)) {
                    Some(pending) => {
                        pending.received += len as u64;
                        format!(
                            "Received {} bytes for {} ({}/{})",
                            len, pending.metadata.filename, pending.received, pending.metadata.size
                        )
                    }
                    None => format!("Received {} bytes", len),
                };
                Ok(vec![text_frame(MessageType::ChatText, seq, &text)?])
            }
            MessageType::AgentThought | MessageType::DownloadOffer => Err(ChatwireError::InvalidMessage(
                format!("{} is only sent by the server", frame.msg_type()),
            )),
        }
    }

    async fn chat(&mut self, frame: &Frame) -> Result<Vec<Frame>> {
        let text = frame.text();
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatwireError::InvalidMessage("empty chat message".into()));
        }

        let history = {
            let mut sessions = self.state.sessions.write().await;
            self.active = sessions.resolve_active(Some(self.active));
            let session = sessions.require_mut(self.active)?;
            session.push(HistoryEntry::new(Role::User, text));
            session.history().to_vec()
        };

        let model = self.state.provider.model();
        let reply = self.state.provider.chat(&history, &model, false).await?;
        debug!(model = %model, len = reply.len(), "provider replied");

        // The session may have been deleted while the provider was busy
        if let Some(session) = self.state.sessions.write().await.get_session_mut(self.active) {
            session.push(HistoryEntry::new(Role::Assistant, reply.clone()));
        }

        Ok(vec![text_frame(MessageType::ChatText, frame.seq(), &reply)?])
    }

    fn switch_model(&self, seq: u16, model: &str) -> Result<Vec<Frame>> {
        let provider = &self.state.provider;
        let available = provider.available_models();

        if !available.iter().any(|m| m == model) {
            let text = format!(
                "Unknown model '{}'. Available: {}",
                model,
                available.join(", ")
            );
            return Ok(vec![text_frame(MessageType::ChatText, seq, &text)?]);
        }

        provider.set_model(model)?;
        info!(provider = provider.name(), model, "model switched");
        Ok(vec![json_frame(
            MessageType::ModelSwitch,
            seq,
            &ModelSwitch {
                model: model.to_string(),
            },
        )?])
    }
}

/// Serve one client until it disconnects, breaks framing, or the server stops
pub async fn handle_client<R, W>(reader: R, writer: W, state: SharedState)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut frames = FramedRead::new(reader, FrameCodec::new());
    let mut sink = FramedWrite::new(writer, FrameCodec::new());
    let mut shutdown_rx = state.subscribe_shutdown();
    let mut client = ClientSession::new(state).await;

    match client.welcome().await {
        Ok(welcome) => {
            if let Err(e) = sink.send(welcome).await {
                warn!("Failed to send welcome: {}", e);
                return;
            }
        }
        Err(e) => {
            warn!("Failed to build welcome: {}", e);
            return;
        }
    }

    loop {
        tokio::select! {
            next = frames.next() => match next {
                Some(Ok(frame)) => {
                    debug!(msg_type = %frame.msg_type(), seq = frame.seq(), len = frame.data().len(), "received frame");
                    if let Err(e) = client.dispatch(&frame, &mut sink).await {
                        warn!("Failed to send reply: {}", e);
                        break;
                    }
                }
                Some(Err(e)) => {
                    warn!("Closing client after protocol error: {}", e);
                    break;
                }
                None => {
                    debug!("Client disconnected");
                    break;
                }
            },
            _ = shutdown_rx.recv() => {
                debug!("Shutdown signal received, closing client");
                break;
            }
        }
    }
}

fn codec_error(e: CodecError) -> ChatwireError {
    match e {
        CodecError::PayloadTooLarge { size, max } => ChatwireError::PayloadTooLarge { size, max },
        other => ChatwireError::protocol(other.to_string()),
    }
}

fn parse<T: DeserializeOwned>(frame: &Frame) -> Result<T> {
    frame.json().map_err(|e| {
        ChatwireError::InvalidMessage(format!("bad {} payload: {}", frame.msg_type(), e))
    })
}

/// Like [`parse`], but an empty payload means "all defaults"
fn parse_or_default<T: DeserializeOwned + Default>(frame: &Frame) -> Result<T> {
    if frame.data().is_empty() {
        Ok(T::default())
    } else {
        parse(frame)
    }
}

fn json_frame<T: Serialize>(msg_type: MessageType, seq: u16, value: &T) -> Result<Frame> {
    Frame::from_json(msg_type, seq, value).map_err(codec_error)
}

/// Text frame, cut at a character boundary if it would not fit
fn text_frame(msg_type: MessageType, seq: u16, text: &str) -> Result<Frame> {
    let mut end = text.len().min(MAX_PAYLOAD_LEN);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    Frame::from_text(msg_type, seq, &text[..end]).map_err(codec_error)
}

/// History reply, dropping the oldest entries until it fits in one frame
fn history_frame(seq: u16, entries: &[HistoryEntry]) -> Result<Frame> {
    let mut start = 0;
    loop {
        match Frame::from_json(MessageType::HistoryRequest, seq, &entries[start..]) {
            Err(CodecError::PayloadTooLarge { .. }) if start < entries.len() => {
                start += ((entries.len() - start) / 8).max(1);
            }
            result => return result.map_err(codec_error),
        }
    }
}

fn error_frame(seq: u16, err: &ChatwireError) -> Frame {
    text_frame(MessageType::ChatText, seq, &format!("Error: {}", err))
        .unwrap_or_else(|_| Frame::empty(MessageType::ChatText, seq))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::EchoProvider;
    use chatwire_protocol::{SessionInfo, HEADER_LEN};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::{AsyncWriteExt, DuplexStream, ReadHalf, WriteHalf};

    struct TestClient {
        reader: FramedRead<ReadHalf<DuplexStream>, FrameCodec>,
        writer: FramedWrite<WriteHalf<DuplexStream>, FrameCodec>,
        seq: u16,
    }

    impl TestClient {
        async fn send(&mut self, msg_type: MessageType, data: impl Into<bytes::Bytes>) -> u16 {
            self.seq += 1;
            let frame = Frame::new(msg_type, self.seq, data).unwrap();
            self.writer.send(frame).await.unwrap();
            self.seq
        }

        async fn send_json<T: Serialize>(&mut self, msg_type: MessageType, value: &T) -> u16 {
            self.send(msg_type, serde_json::to_vec(value).unwrap()).await
        }

        async fn recv(&mut self) -> Frame {
            tokio::time::timeout(Duration::from_secs(2), self.reader.next())
                .await
                .expect("timed out waiting for frame")
                .expect("stream ended")
                .expect("decode failed")
        }
    }

    fn test_state() -> SharedState {
        SharedState::new(Arc::new(EchoProvider::new()))
    }

    /// Spawn a client handler and return the peer end, past the welcome frame
    async fn connect(state: &SharedState) -> (TestClient, tokio::task::JoinHandle<()>) {
        let (client, server) = tokio::io::duplex(4 * MAX_PAYLOAD_LEN);
        let (server_read, server_write) = tokio::io::split(server);
        let handle = tokio::spawn(handle_client(server_read, server_write, state.clone()));

        let (client_read, client_write) = tokio::io::split(client);
        let mut client = TestClient {
            reader: FramedRead::new(client_read, FrameCodec::new()),
            writer: FramedWrite::new(client_write, FrameCodec::new()),
            seq: 0,
        };

        let welcome = client.recv().await;
        assert_eq!(welcome.msg_type(), MessageType::ChatText);
        assert!(welcome.text().starts_with("Welcome to chatwire"));
        (client, handle)
    }

    #[tokio::test]
    async fn test_welcome_names_model_and_session() {
        let state = test_state();
        let (client, server) = tokio::io::duplex(1024);
        let (r, w) = tokio::io::split(server);
        tokio::spawn(handle_client(r, w, state.clone()));

        let mut reader = FramedRead::new(client, FrameCodec::new());
        let welcome = reader.next().await.unwrap().unwrap();
        assert_eq!(welcome.seq(), 0);
        assert_eq!(
            welcome.text(),
            "Welcome to chatwire (model echo-small, session session-1)"
        );
        assert_eq!(state.sessions.read().await.session_count(), 1);
    }

    #[tokio::test]
    async fn test_chat_sends_thought_then_reply() {
        let state = test_state();
        let (mut client, _handle) = connect(&state).await;

        let seq = client.send(MessageType::ChatText, "hello there").await;

        let thought = client.recv().await;
        assert_eq!(thought.msg_type(), MessageType::AgentThought);
        assert_eq!(thought.seq(), seq);
        assert_eq!(thought.text(), "Thinking with echo-small...");

        let reply = client.recv().await;
        assert_eq!(reply.msg_type(), MessageType::ChatText);
        assert_eq!(reply.seq(), seq);
        assert_eq!(reply.text(), "hello there");
    }

    #[tokio::test]
    async fn test_empty_chat_is_rejected_without_thought() {
        let state = test_state();
        let (mut client, _handle) = connect(&state).await;

        client.send(MessageType::ChatText, "   ").await;
        let reply = client.recv().await;
        assert_eq!(reply.msg_type(), MessageType::ChatText);
        assert!(reply.text().starts_with("Error: "));
    }

    #[tokio::test]
    async fn test_history_records_both_sides() {
        let state = test_state();
        let (mut client, _handle) = connect(&state).await;

        client.send(MessageType::ChatText, "one").await;
        client.recv().await;
        client.recv().await;

        client.send(MessageType::HistoryRequest, "{}").await;
        let reply = client.recv().await;
        assert_eq!(reply.msg_type(), MessageType::HistoryRequest);
        let entries: Vec<HistoryEntry> = reply.json().unwrap();
        assert_eq!(
            entries,
            vec![
                HistoryEntry::new(Role::User, "one"),
                HistoryEntry::new(Role::Assistant, "one"),
            ]
        );

        client
            .send_json(MessageType::HistoryRequest, &HistoryRequest { session_id: None, limit: Some(1) })
            .await;
        let entries: Vec<HistoryEntry> = client.recv().await.json().unwrap();
        assert_eq!(entries, vec![HistoryEntry::new(Role::Assistant, "one")]);
    }

    #[tokio::test]
    async fn test_clear_request() {
        let state = test_state();
        let (mut client, _handle) = connect(&state).await;

        client.send(MessageType::ChatText, "remember me").await;
        client.recv().await;
        client.recv().await;

        let seq = client.send(MessageType::ClearRequest, bytes::Bytes::new()).await;
        let ack = client.recv().await;
        assert_eq!(ack.msg_type(), MessageType::ClearRequest);
        assert_eq!(ack.seq(), seq);
        assert!(ack.data().is_empty());

        client.send(MessageType::HistoryRequest, bytes::Bytes::new()).await;
        let entries: Vec<HistoryEntry> = client.recv().await.json().unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_model_switch() {
        let state = test_state();
        let (mut client, _handle) = connect(&state).await;

        client
            .send_json(MessageType::ModelSwitch, &ModelSwitch { model: "echo-large".into() })
            .await;
        let reply = client.recv().await;
        assert_eq!(reply.msg_type(), MessageType::ModelSwitch);
        assert_eq!(reply.json::<ModelSwitch>().unwrap().model, "echo-large");
        assert_eq!(state.provider.model(), "echo-large");

        client.send(MessageType::ChatText, "hi").await;
        assert_eq!(client.recv().await.text(), "Thinking with echo-large...");
    }

    #[tokio::test]
    async fn test_model_switch_unknown_lists_models() {
        let state = test_state();
        let (mut client, _handle) = connect(&state).await;

        client
            .send_json(MessageType::ModelSwitch, &ModelSwitch { model: "gpt-imaginary".into() })
            .await;
        let reply = client.recv().await;
        assert_eq!(reply.msg_type(), MessageType::ChatText);
        assert_eq!(
            reply.text(),
            "Unknown model 'gpt-imaginary'. Available: echo-small, echo-large"
        );
        assert_eq!(state.provider.model(), "echo-small");
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let state = test_state();
        let (mut client, _handle) = connect(&state).await;

        client
            .send_json(MessageType::SessionNew, &SessionNew { name: Some("scratch".into()) })
            .await;
        let created: SessionInfo = client.recv().await.json().unwrap();
        assert_eq!(created.name, "scratch");
        assert_eq!(created.message_count, 0);

        client.send(MessageType::SessionList, "{}").await;
        let list: SessionList = client.recv().await.json().unwrap();
        assert_eq!(list.sessions.len(), 2);
        assert_eq!(list.active, Some(created.id));
        let first = list.sessions[0].id;

        client
            .send_json(MessageType::SessionSwitch, &SessionSwitch { session_id: first })
            .await;
        let switched: SessionInfo = client.recv().await.json().unwrap();
        assert_eq!(switched.id, first);

        client
            .send_json(MessageType::SessionDelete, &SessionDelete { session_id: first })
            .await;
        let deleted: SessionDelete = client.recv().await.json().unwrap();
        assert_eq!(deleted.session_id, first);

        // Deleting the active session falls back to the remaining one
        client.send(MessageType::SessionList, "{}").await;
        let list: SessionList = client.recv().await.json().unwrap();
        assert_eq!(list.sessions.len(), 1);
        assert_eq!(list.active, Some(created.id));
    }

    #[tokio::test]
    async fn test_switch_to_missing_session() {
        let state = test_state();
        let (mut client, _handle) = connect(&state).await;

        client
            .send_json(MessageType::SessionSwitch, &SessionSwitch { session_id: Uuid::new_v4() })
            .await;
        let reply = client.recv().await;
        assert_eq!(reply.msg_type(), MessageType::ChatText);
        assert!(reply.text().starts_with("Error: Session not found"));
    }

    #[tokio::test]
    async fn test_file_metadata_and_data() {
        let state = test_state();
        let (mut client, _handle) = connect(&state).await;

        client
            .send_json(
                MessageType::FileMetadata,
                &FileMetadata {
                    filename: "notes.txt".into(),
                    size: 15,
                    mime_type: Some("text/plain".into()),
                    checksum: None,
                },
            )
            .await;
        let offer: DownloadOffer = client.recv().await.json().unwrap();
        assert_eq!(offer.filename, "notes.txt");
        assert_eq!(offer.size, 15);
        assert_eq!(offer.mime_type.as_deref(), Some("text/plain"));

        client.send(MessageType::FileData, vec![0u8; 10]).await;
        assert_eq!(client.recv().await.text(), "Received 10 bytes for notes.txt (10/15)");

        client.send(MessageType::FileData, vec![0u8; 5]).await;
        assert_eq!(client.recv().await.text(), "Received 5 bytes for notes.txt (15/15)");
    }

    #[tokio::test]
    async fn test_file_data_without_offer() {
        let state = test_state();
        let (mut client, _handle) = connect(&state).await;

        client.send(MessageType::FileData, vec![1u8; 3]).await;
        assert_eq!(client.recv().await.text(), "Received 3 bytes");
    }

    #[tokio::test]
    async fn test_invalid_json_reports_error() {
        let state = test_state();
        let (mut client, _handle) = connect(&state).await;

        let seq = client.send(MessageType::SessionSwitch, "not json").await;
        let reply = client.recv().await;
        assert_eq!(reply.seq(), seq);
        assert!(reply.text().starts_with("Error: Invalid message: bad SESSION_SWITCH payload"));

        // Connection still usable
        client.send(MessageType::ChatText, "still here").await;
        client.recv().await;
        assert_eq!(client.recv().await.text(), "still here");
    }

    #[tokio::test]
    async fn test_server_only_types_rejected() {
        let state = test_state();
        let (mut client, _handle) = connect(&state).await;

        client.send(MessageType::AgentThought, "sneaky").await;
        let reply = client.recv().await;
        assert_eq!(
            reply.text(),
            "Error: Invalid message: AGENT_THOUGHT is only sent by the server"
        );
    }

    #[tokio::test]
    async fn test_unknown_type_closes_client() {
        let state = test_state();
        let (client, server) = tokio::io::duplex(1024);
        let (r, w) = tokio::io::split(server);
        let handle = tokio::spawn(handle_client(r, w, state.clone()));

        let (client_read, mut client_write) = tokio::io::split(client);
        let mut reader = FramedRead::new(client_read, FrameCodec::new());
        reader.next().await.unwrap().unwrap();

        let bad: [u8; HEADER_LEN] = [0x42, 0, 1, 0, 0];
        client_write.write_all(&bad).await.unwrap();

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("handler did not exit")
            .unwrap();
        assert!(reader.next().await.is_none());
    }

    #[tokio::test]
    async fn test_shutdown_closes_client() {
        let state = test_state();
        let (_client, handle) = connect(&state).await;

        state.shutdown();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("handler did not exit")
            .unwrap();
    }

    #[tokio::test]
    async fn test_clients_share_sessions() {
        let state = test_state();
        let (mut first, _h1) = connect(&state).await;
        let (mut second, _h2) = connect(&state).await;

        first.send(MessageType::ChatText, "from first").await;
        first.recv().await;
        first.recv().await;

        second.send(MessageType::HistoryRequest, "{}").await;
        let entries: Vec<HistoryEntry> = second.recv().await.json().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].content, "from first");
    }

    #[test]
    fn test_text_frame_truncates_at_char_boundary() {
        let long = "é".repeat(MAX_PAYLOAD_LEN);
        let frame = text_frame(MessageType::ChatText, 1, &long).unwrap();
        assert!(frame.data().len() <= MAX_PAYLOAD_LEN);
        assert_eq!(frame.data().len() % 2, 0);
        assert!(std::str::from_utf8(frame.data()).is_ok());
    }

    #[test]
    fn test_history_frame_drops_oldest_to_fit() {
        let entries: Vec<HistoryEntry> = (0..100)
            .map(|i| HistoryEntry::new(Role::User, format!("{}{}", i, "x".repeat(1000))))
            .collect();

        let frame = history_frame(3, &entries).unwrap();
        let kept: Vec<HistoryEntry> = frame.json().unwrap();
        assert!(kept.len() < entries.len());
        assert_eq!(kept.last(), entries.last());
    }

    #[test]
    fn test_error_frame_text() {
        let frame = error_frame(9, &ChatwireError::UnknownModel("x".into()));
        assert_eq!(frame.seq(), 9);
        assert_eq!(frame.text(), "Error: Unknown model: x");
    }
}
