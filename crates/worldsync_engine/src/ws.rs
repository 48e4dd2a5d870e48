//! WebSocket transport implementation.
//!
//! Frames are carried as WebSocket text messages. The stream is split so
//! the publisher can write while the pump is suspended in a read; each half
//! sits behind its own async lock. Closing fires the shared status token,
//! which wakes any suspended read or write.

use crate::config::ClientConfig;
use crate::error::{ConnectError, ReceiveError, SendError};
use crate::state::{ConnectionState, ConnectionStatus};
use crate::transport::{Frame, Transport};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use url::Url;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket-based transport session.
pub struct WsTransport {
    url: Url,
    status: ConnectionStatus,
    sink: Mutex<Option<SplitSink<WsStream, Message>>>,
    stream: Mutex<Option<SplitStream<WsStream>>>,
    close_timeout: Duration,
}

impl WsTransport {
    /// Connects to the server named in `config`.
    ///
    /// Suspends until the WebSocket handshake completes, fails, or the
    /// connect timeout elapses.
    pub async fn connect(config: &ClientConfig) -> Result<Self, ConnectError> {
        let url = parse_address(&config.server_url)?;
        let status = ConnectionStatus::new();

        info!(url = %url, "connecting");
        let connected =
            tokio::time::timeout(config.connect_timeout, tokio_tungstenite::connect_async(url.as_str()))
                .await;

        let (socket, response) = match connected {
            Err(_) => {
                status.mark_closed();
                return Err(ConnectError::Timeout);
            }
            Ok(Err(e)) => {
                status.mark_closed();
                return Err(classify_connect_error(&url, e));
            }
            Ok(Ok(pair)) => pair,
        };

        debug!(status = %response.status(), "handshake response");
        let (sink, stream) = socket.split();
        let _ = status.transition(ConnectionState::Open);
        info!(url = %url, "connected");

        Ok(Self {
            url,
            status,
            sink: Mutex::new(Some(sink)),
            stream: Mutex::new(Some(stream)),
            close_timeout: config.close_timeout,
        })
    }

    /// Returns the server URL.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl Transport for WsTransport {
    fn state(&self) -> ConnectionState {
        self.status.state()
    }

    async fn send(&self, frame: Frame) -> Result<(), SendError> {
        if !self.status.is_open() {
            return Err(SendError::NotConnected);
        }

        let mut guard = self.sink.lock().await;
        let sink = guard.as_mut().ok_or(SendError::NotConnected)?;

        let message = match frame {
            Frame::Text(text) => Message::Text(text),
            Frame::Binary(bytes) => Message::Binary(bytes),
        };

        let result = tokio::select! {
            _ = self.status.closed() => return Err(SendError::NotConnected),
            result = sink.send(message) => result,
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) => {
                if is_fatal(&e) {
                    warn!(error = %e, "send failed, closing connection");
                    self.status.mark_closed();
                    *guard = None;
                }
                Err(SendError::Transport(e.to_string()))
            }
        }
    }

    async fn receive_next(&self) -> Result<Frame, ReceiveError> {
        if !self.status.is_open() {
            return Err(ReceiveError::NotConnected);
        }

        let mut guard = self.stream.lock().await;
        loop {
            let stream = guard.as_mut().ok_or(ReceiveError::NotConnected)?;

            let next = tokio::select! {
                _ = self.status.closed() => None,
                next = stream.next() => Some(next),
            };
            let Some(next) = next else {
                *guard = None;
                return Err(ReceiveError::NotConnected);
            };

            match next {
                Some(Ok(Message::Text(text))) => return Ok(Frame::Text(text)),
                Some(Ok(Message::Binary(bytes))) => return Ok(Frame::Binary(bytes)),
                Some(Ok(Message::Close(close))) => {
                    debug!(frame = ?close, "close frame received");
                    self.status.begin_closing();
                    return Err(ReceiveError::PeerClosed);
                }
                // Pings are answered by tungstenite on the next write.
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => continue,
                Some(Err(tungstenite::Error::ConnectionClosed)) | None => {
                    self.status.begin_closing();
                    return Err(ReceiveError::PeerClosed);
                }
                Some(Err(e)) => {
                    self.status.mark_closed();
                    *guard = None;
                    return Err(ReceiveError::TransportFailure(e.to_string()));
                }
            }
        }
    }

    async fn close_courteous(&self) {
        if self.status.is_closed() {
            return;
        }
        self.status.begin_closing();

        let reply = async {
            let mut guard = self.sink.lock().await;
            if let Some(sink) = guard.as_mut() {
                if let Err(e) = sink.send(Message::Close(None)).await {
                    debug!(error = %e, "close reply not delivered");
                }
                let _ = sink.close().await;
            }
            *guard = None;
        };

        if tokio::time::timeout(self.close_timeout, reply).await.is_err() {
            warn!(timeout = ?self.close_timeout, "courteous close timed out");
        }
        self.status.mark_closed();
        info!(url = %self.url, "connection closed");
    }

    fn close(&self) {
        if !self.status.mark_closed() {
            return;
        }
        // Drop whichever halves are idle; a busy half drops itself once it
        // observes the closed token.
        if let Ok(mut sink) = self.sink.try_lock() {
            *sink = None;
        }
        if let Ok(mut stream) = self.stream.try_lock() {
            *stream = None;
        }
        info!(url = %self.url, "connection aborted");
    }
}

/// Validates a server address.
pub(crate) fn parse_address(address: &str) -> Result<Url, ConnectError> {
    let url = Url::parse(address.trim()).map_err(|e| ConnectError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "ws" | "wss" => {}
        other => {
            return Err(ConnectError::InvalidAddress {
                address: address.to_string(),
                reason: format!("unsupported scheme {other:?}, expected ws or wss"),
            })
        }
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConnectError::InvalidAddress {
            address: address.to_string(),
            reason: "missing host".into(),
        });
    }

    Ok(url)
}

fn classify_connect_error(url: &Url, error: tungstenite::Error) -> ConnectError {
    match error {
        tungstenite::Error::Io(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
            ConnectError::Refused(format!("{url}: {e}"))
        }
        tungstenite::Error::Url(e) => ConnectError::InvalidAddress {
            address: url.to_string(),
            reason: e.to_string(),
        },
        tungstenite::Error::Http(response) => {
            ConnectError::Handshake(format!("server answered {}", response.status()))
        }
        other => ConnectError::Handshake(other.to_string()),
    }
}

fn is_fatal(error: &tungstenite::Error) -> bool {
    matches!(
        error,
        tungstenite::Error::ConnectionClosed
            | tungstenite::Error::AlreadyClosed
            | tungstenite::Error::Io(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_addresses() {
        assert_eq!(
            parse_address("ws://127.0.0.1:9001").unwrap().as_str(),
            "ws://127.0.0.1:9001/"
        );
        assert!(parse_address("wss://websocket-server-kutx.onrender.com").is_ok());
        assert!(parse_address("  ws://localhost/game  ").is_ok());
    }

    #[test]
    fn parse_rejects_bad_addresses() {
        for address in ["", "not a url", "http://example.com", "ftp://x", "ws://"] {
            let err = parse_address(address).unwrap_err();
            assert!(
                matches!(err, ConnectError::InvalidAddress { .. }),
                "{address:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn connect_rejects_malformed_address() {
        let config = ClientConfig::new("p1").with_server_url("nonsense");
        let err = WsTransport::connect(&config).await.err().unwrap();
        assert!(matches!(err, ConnectError::InvalidAddress { .. }));
    }

    #[tokio::test]
    async fn connect_refused() {
        // Bind then drop to find a port with nothing listening.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = ClientConfig::new("p1").with_server_url(format!("ws://127.0.0.1:{port}"));
        let err = WsTransport::connect(&config).await.err().unwrap();
        assert!(matches!(err, ConnectError::Refused(_)), "got {err:?}");
    }
}
