//! Transport layer abstraction for the sync client.

use crate::error::{ReceiveError, SendError};
use crate::state::{ConnectionState, ConnectionStatus};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// One discrete message exchanged over the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A UTF-8 text message.
    Text(String),
    /// A binary message.
    Binary(Vec<u8>),
}

impl Frame {
    /// Returns the frame payload.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Frame::Text(text) => text.as_bytes(),
            Frame::Binary(bytes) => bytes,
        }
    }

    /// Returns the payload length in bytes.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Returns true if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<String> for Frame {
    fn from(text: String) -> Self {
        Frame::Text(text)
    }
}

impl From<&str> for Frame {
    fn from(text: &str) -> Self {
        Frame::Text(text.to_string())
    }
}

/// A transport session owns one logical connection to the server.
///
/// Sends and receives may run concurrently from different tasks, so every
/// method takes `&self`. Once the state is `Closed` every operation fails
/// fast without side effects.
pub trait Transport: Send + Sync {
    /// Returns the current connection state.
    fn state(&self) -> ConnectionState;

    /// Sends one complete message as a single frame.
    ///
    /// Fails with `SendError::NotConnected` unless the state is `Open`.
    fn send(&self, frame: Frame) -> impl Future<Output = Result<(), SendError>> + Send;

    /// Suspends until the next data frame, a peer close, or a transport error.
    fn receive_next(&self) -> impl Future<Output = Result<Frame, ReceiveError>> + Send;

    /// Replies to a peer close with a close frame and moves to `Closed`.
    ///
    /// Bounded in time and idempotent.
    fn close_courteous(&self) -> impl Future<Output = ()> + Send;

    /// Aborts the connection. Idempotent and never blocks.
    fn close(&self);

    /// Returns true if the connection is open.
    fn is_connected(&self) -> bool {
        self.state().is_open()
    }
}

/// A scripted transport for testing.
///
/// Inbound results are queued with [`push_frame`](Self::push_frame) and
/// [`push_error`](Self::push_error); `receive_next` suspends while the
/// queue is empty, exactly like a quiet socket.
#[derive(Debug)]
pub struct MockTransport {
    status: ConnectionStatus,
    inbound_tx: mpsc::UnboundedSender<Result<Frame, ReceiveError>>,
    inbound_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Result<Frame, ReceiveError>>>,
    sent: Mutex<Vec<Frame>>,
    fail_sends: AtomicBool,
    receive_calls: AtomicUsize,
    courteous_closes: AtomicUsize,
    aborts: AtomicUsize,
}

impl MockTransport {
    /// Creates a new mock transport in the `Open` state.
    pub fn new() -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        Self {
            status: ConnectionStatus::open(),
            inbound_tx,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            sent: Mutex::new(Vec::new()),
            fail_sends: AtomicBool::new(false),
            receive_calls: AtomicUsize::new(0),
            courteous_closes: AtomicUsize::new(0),
            aborts: AtomicUsize::new(0),
        }
    }

    /// Queues an inbound frame.
    pub fn push_frame(&self, frame: impl Into<Frame>) {
        let _ = self.inbound_tx.send(Ok(frame.into()));
    }

    /// Queues an inbound error.
    pub fn push_error(&self, error: ReceiveError) {
        let _ = self.inbound_tx.send(Err(error));
    }

    /// Makes subsequent sends fail with a transport error.
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Returns every frame sent so far.
    pub fn sent_frames(&self) -> Vec<Frame> {
        self.sent.lock().clone()
    }

    /// Returns how many times `receive_next` was called.
    pub fn receive_calls(&self) -> usize {
        self.receive_calls.load(Ordering::SeqCst)
    }

    /// Returns how many times `close_courteous` was called.
    pub fn courteous_closes(&self) -> usize {
        self.courteous_closes.load(Ordering::SeqCst)
    }

    /// Returns how many times `close` was called.
    pub fn aborts(&self) -> usize {
        self.aborts.load(Ordering::SeqCst)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    fn state(&self) -> ConnectionState {
        self.status.state()
    }

    async fn send(&self, frame: Frame) -> Result<(), SendError> {
        if !self.status.is_open() {
            return Err(SendError::NotConnected);
        }
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(SendError::Transport("injected send failure".into()));
        }
        self.sent.lock().push(frame);
        Ok(())
    }

    async fn receive_next(&self) -> Result<Frame, ReceiveError> {
        self.receive_calls.fetch_add(1, Ordering::SeqCst);
        if !self.status.is_open() {
            return Err(ReceiveError::NotConnected);
        }

        let mut inbound = self.inbound_rx.lock().await;
        let next = tokio::select! {
            _ = self.status.closed() => return Err(ReceiveError::NotConnected),
            next = inbound.recv() => next,
        };

        match next {
            Some(Ok(frame)) => Ok(frame),
            Some(Err(ReceiveError::PeerClosed)) | None => {
                self.status.begin_closing();
                Err(ReceiveError::PeerClosed)
            }
            Some(Err(error)) => {
                self.status.mark_closed();
                Err(error)
            }
        }
    }

    async fn close_courteous(&self) {
        self.courteous_closes.fetch_add(1, Ordering::SeqCst);
        self.status.begin_closing();
        self.status.mark_closed();
    }

    fn close(&self) {
        self.aborts.fetch_add(1, Ordering::SeqCst);
        self.status.mark_closed();
    }
}
