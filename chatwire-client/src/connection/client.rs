//! Connection engine for a chatwire server

use std::io::ErrorKind;
use std::sync::atomic::{AtomicU16, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info, warn};
use url::Url;

use chatwire_protocol::{CodecError, Frame, FrameCodec, MessageType, MAX_PAYLOAD_LEN};
use chatwire_utils::{ChatwireError, Result};

use super::handler::MessageHandler;
use super::signal::{ResponseSignal, WaitOutcome};

/// Default port of a chatwire server
pub const DEFAULT_PORT: u16 = 7878;

/// Default TCP connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Where and how to connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    /// Overall bound on `connect`, covering the TCP handshake and the welcome wait
    pub connect_timeout: Duration,
    /// Stay `Connecting` until the server's first frame arrives
    pub await_welcome: bool,
    /// Sequence number of the first frame sent
    pub initial_seq: u16,
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            await_welcome: true,
            initial_seq: 0,
        }
    }

    /// Parse a `tcp://host:port` URL or a bare `host:port`
    pub fn from_addr(addr: &str) -> Result<Self> {
        let url_str = if addr.contains("://") {
            addr.to_string()
        } else {
            format!("tcp://{}", addr)
        };

        let url = Url::parse(&url_str)
            .map_err(|e| ChatwireError::config(format!("Invalid address '{}': {}", addr, e)))?;

        if url.scheme() != "tcp" {
            return Err(ChatwireError::config(format!(
                "Unsupported scheme '{}' in '{}', expected tcp://",
                url.scheme(),
                addr
            )));
        }

        let host = url
            .host_str()
            .ok_or_else(|| ChatwireError::config(format!("Missing host in '{}'", addr)))?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();
        let port = url.port().unwrap_or(DEFAULT_PORT);

        Ok(Self::new(host, port))
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_await_welcome(mut self, await_welcome: bool) -> Self {
        self.await_welcome = await_welcome;
        self
    }

    pub fn with_initial_seq(mut self, seq: u16) -> Self {
        self.initial_seq = seq;
        self
    }

    /// `host:port` string suitable for `TcpStream::connect`
    pub fn addr(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new("127.0.0.1", DEFAULT_PORT)
    }
}

type FrameWriter = FramedWrite<OwnedWriteHalf, FrameCodec>;
type HandlerSlot = Mutex<Option<Box<dyn MessageHandler>>>;

/// State shared between the connection and its receive loop
struct Shared {
    state: watch::Sender<ConnectionState>,
    signal: ResponseSignal,
    handler: HandlerSlot,
    last_frame: Mutex<Option<Frame>>,
    /// Frames received on the current socket
    received: AtomicU64,
    writer: tokio::sync::Mutex<Option<FrameWriter>>,
}

impl Shared {
    fn handler(&self) -> MutexGuard<'_, Option<Box<dyn MessageHandler>>> {
        self.handler.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn last_frame(&self) -> MutexGuard<'_, Option<Frame>> {
        self.last_frame.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Move to `Disconnected`, notifying the handler if we were connected
    fn mark_disconnected(&self) {
        let previous = self.state.send_replace(ConnectionState::Disconnected);
        self.signal.close();
        if previous == ConnectionState::Connected {
            if let Some(handler) = self.handler().as_mut() {
                handler.on_disconnected();
            }
        }
    }
}

/// Client connection to a chatwire server
///
/// One TCP socket, one background receive loop. Sends and the receive
/// loop use separate halves of the socket.
pub struct Connection {
    config: ConnectionConfig,
    shared: Arc<Shared>,
    next_seq: AtomicU16,
    task_handle: Option<JoinHandle<()>>,
}

impl Connection {
    /// Create a new connection (not yet connected)
    pub fn new(config: ConnectionConfig) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let next_seq = AtomicU16::new(config.initial_seq);

        Self {
            config,
            shared: Arc::new(Shared {
                state,
                signal: ResponseSignal::new(),
                handler: Mutex::new(None),
                last_frame: Mutex::new(None),
                received: AtomicU64::new(0),
                writer: tokio::sync::Mutex::new(None),
            }),
            next_seq,
            task_handle: None,
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Get current connection state
    pub fn state(&self) -> ConnectionState {
        *self.shared.state.borrow()
    }

    /// True only while `Connected`
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Watch state transitions, including ones made by the receive loop
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state.subscribe()
    }

    /// Install the dispatch hook, replacing any previous one
    pub fn set_handler(&self, handler: impl MessageHandler + 'static) {
        *self.shared.handler() = Some(Box::new(handler));
    }

    /// Remove the dispatch hook
    pub fn clear_handler(&self) {
        *self.shared.handler() = None;
    }

    /// Sequence number the next `send` will use
    pub fn next_seq(&self) -> u16 {
        self.next_seq.load(Ordering::SeqCst)
    }

    /// Connect to the server
    ///
    /// Returns `Ok(false)` when the server is unreachable (refused, timed
    /// out, name resolution failed, or no welcome frame in time). Other I/O
    /// faults are returned as errors. Either way a failed attempt leaves the
    /// connection `Disconnected`.
    pub async fn connect(&mut self) -> Result<bool> {
        if self.is_connected() {
            return Ok(true);
        }

        // Drop whatever a previous, dead connection left behind
        self.release().await;
        self.shared.state.send_replace(ConnectionState::Connecting);

        let addr = self.config.addr();
        let timeout = self.config.connect_timeout;
        let deadline = tokio::time::Instant::now() + timeout;
        debug!(addr = %addr, timeout_ms = timeout.as_millis() as u64, "connecting");

        let stream = match tokio::time::timeout_at(deadline, open_stream(&addr)).await {
            Err(_) => {
                let err = ChatwireError::ConnectTimeout {
                    addr,
                    millis: timeout.as_millis() as u64,
                };
                warn!("{}", err);
                self.shared.state.send_replace(ConnectionState::Disconnected);
                return Ok(false);
            }
            Ok(Err(e)) if is_unavailable(&e) => {
                let err = match e.kind() {
                    ErrorKind::ConnectionRefused => ChatwireError::ConnectionRefused { addr },
                    _ => ChatwireError::connection(format!("Failed to connect to {}: {}", addr, e)),
                };
                warn!("{}", err);
                self.shared.state.send_replace(ConnectionState::Disconnected);
                return Ok(false);
            }
            Ok(Err(e)) => {
                error!("Unexpected error connecting to {}: {}", addr, e);
                self.shared.state.send_replace(ConnectionState::Disconnected);
                return Err(e.into());
            }
            Ok(Ok(stream)) => stream,
        };

        if let Err(e) = stream.set_nodelay(true) {
            debug!("Failed to set TCP_NODELAY: {}", e);
        }

        let (reader, writer) = stream.into_split();
        *self.shared.writer.lock().await = Some(FramedWrite::new(writer, FrameCodec::new()));
        *self.shared.last_frame() = None;
        self.shared.received.store(0, Ordering::SeqCst);
        self.shared.signal.reset();

        let reader = FramedRead::new(reader, FrameCodec::new());
        self.task_handle = Some(tokio::spawn(receive_loop(reader, Arc::clone(&self.shared))));

        if self.config.await_welcome {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            match self.shared.signal.wait(remaining).await {
                Ok(WaitOutcome::Woken) => {
                    // Consume the welcome only; frames that followed it stay signaled
                    self.shared.signal.clear();
                    if self.shared.received.load(Ordering::SeqCst) > 1 {
                        self.shared.signal.signal();
                    }
                }
                Ok(WaitOutcome::TimedOut) => {
                    warn!(addr = %addr, "no welcome frame within {}ms", timeout.as_millis());
                    self.close().await;
                    return Ok(false);
                }
                Err(e) => {
                    warn!(addr = %addr, "connection lost during handshake: {}", e);
                    self.close().await;
                    return Ok(false);
                }
            }
        }

        // The receive loop may already have seen the peer hang up
        let promoted = self.shared.state.send_if_modified(|state| {
            if *state == ConnectionState::Connecting {
                *state = ConnectionState::Connected;
                true
            } else {
                false
            }
        });
        if !promoted {
            self.close().await;
            return Ok(false);
        }

        if let Some(handler) = self.shared.handler().as_mut() {
            handler.on_connected();
        }

        info!(addr = %addr, "connected");
        Ok(true)
    }

    /// Close the connection
    ///
    /// Idempotent: closing a closed connection does nothing.
    pub async fn close(&mut self) {
        let was_open = self.state() != ConnectionState::Disconnected;
        self.release().await;
        self.shared.mark_disconnected();
        if was_open {
            info!(addr = %self.config.addr(), "connection closed");
        }
    }

    /// Stop the receive loop and shut down the write half
    async fn release(&mut self) {
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
            // The task must be gone before its shared state is reused
            let _ = handle.await;
        }

        let writer = self.shared.writer.lock().await.take();
        if let Some(mut writer) = writer {
            if let Err(e) = writer.get_mut().shutdown().await {
                debug!("Error shutting down write half: {}", e);
            }
        }
    }

    /// Send a frame, returning the sequence number it was given
    ///
    /// Fails with [`ChatwireError::NotConnected`] unless `Connected`, and
    /// with [`ChatwireError::PayloadTooLarge`] before touching the socket
    /// if `data` exceeds 65535 bytes.
    pub async fn send(&self, msg_type: MessageType, data: impl Into<Bytes>) -> Result<u16> {
        if !self.is_connected() {
            return Err(ChatwireError::NotConnected);
        }

        let data = data.into();
        if data.len() > MAX_PAYLOAD_LEN {
            return Err(ChatwireError::PayloadTooLarge {
                size: data.len(),
                max: MAX_PAYLOAD_LEN,
            });
        }

        let mut guard = self.shared.writer.lock().await;
        let writer = guard.as_mut().ok_or(ChatwireError::NotConnected)?;

        // Allocated under the writer lock so frames leave in sequence order
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let frame = Frame::new(msg_type, seq, data).map_err(codec_error)?;

        if let Err(e) = writer.send(frame).await {
            error!("Failed to send {} frame: {}", msg_type, e);
            guard.take();
            drop(guard);
            self.shared.mark_disconnected();
            return Err(codec_error(e));
        }

        debug!(msg_type = %msg_type, seq, "sent frame");
        Ok(seq)
    }

    /// Send a UTF-8 text payload
    pub async fn send_text(&self, msg_type: MessageType, text: &str) -> Result<u16> {
        self.send(msg_type, Bytes::copy_from_slice(text.as_bytes())).await
    }

    /// Send a JSON payload
    pub async fn send_json<T: Serialize>(&self, msg_type: MessageType, value: &T) -> Result<u16> {
        let json = serde_json::to_vec(value)
            .map_err(|e| ChatwireError::InvalidMessage(format!("Failed to encode JSON: {}", e)))?;
        self.send(msg_type, json).await
    }

    /// Wait until a frame arrives or `timeout` elapses
    pub async fn wait_response(&self, timeout: Duration) -> Result<WaitOutcome> {
        self.shared.signal.wait(timeout).await
    }

    /// Forget frames that arrived before now
    pub fn clear_response(&self) {
        self.shared.signal.clear();
    }

    /// The most recently received frame
    pub fn last_frame(&self) -> Option<Frame> {
        self.shared.last_frame().clone()
    }

    /// Send a frame and wait for the next inbound frame
    ///
    /// There is one response slot per connection: the frame returned is
    /// whatever arrived after the send, not necessarily a reply to it.
    /// Callers must not have several requests outstanding at once.
    pub async fn request(
        &self,
        msg_type: MessageType,
        data: impl Into<Bytes>,
        timeout: Duration,
    ) -> Result<Frame> {
        self.clear_response();
        self.send(msg_type, data).await?;

        match self.wait_response(timeout).await? {
            WaitOutcome::Woken => self
                .last_frame()
                .ok_or_else(|| ChatwireError::internal("woken without a frame")),
            WaitOutcome::TimedOut => Err(ChatwireError::ResponseTimeout {
                millis: timeout.as_millis() as u64,
            }),
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
    }
}

/// Resolve `addr` and connect to the first address that accepts
async fn open_stream(addr: &str) -> std::io::Result<TcpStream> {
    let addrs: Vec<_> = tokio::net::lookup_host(addr)
        .await
        .map_err(|e| std::io::Error::new(ErrorKind::NotFound, e))?
        .collect();

    if addrs.is_empty() {
        return Err(std::io::Error::new(
            ErrorKind::NotFound,
            format!("no addresses for {}", addr),
        ));
    }

    TcpStream::connect(&addrs[..]).await
}

/// Errors that mean "server not reachable" rather than a local fault
fn is_unavailable(e: &std::io::Error) -> bool {
    !matches!(
        e.kind(),
        ErrorKind::PermissionDenied | ErrorKind::InvalidInput | ErrorKind::Unsupported | ErrorKind::OutOfMemory
    )
}

fn codec_error(e: CodecError) -> ChatwireError {
    match e {
        CodecError::PayloadTooLarge { size, max } => ChatwireError::PayloadTooLarge { size, max },
        CodecError::Io(e) => ChatwireError::Io(e),
        other => ChatwireError::protocol(other.to_string()),
    }
}

/// Background task reading frames until the socket closes
async fn receive_loop(mut reader: FramedRead<OwnedReadHalf, FrameCodec>, shared: Arc<Shared>) {
    loop {
        match reader.next().await {
            Some(Ok(frame)) => {
                debug!(
                    msg_type = %frame.msg_type(),
                    seq = frame.seq(),
                    len = frame.data().len(),
                    "received frame"
                );

                if let Some(handler) = shared.handler().as_mut() {
                    handler.handle(&frame);
                }
                *shared.last_frame() = Some(frame);
                shared.received.fetch_add(1, Ordering::SeqCst);
                shared.signal.signal();
            }
            Some(Err(e)) => {
                // Framing is lost; nothing after this point can be trusted
                error!("Failed to receive frame: {}", e);
                break;
            }
            None => {
                info!("Server closed connection");
                break;
            }
        }
    }

    shared.writer.lock().await.take();
    shared.mark_disconnected();
}
