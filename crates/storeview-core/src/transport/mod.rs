//! Transport: SSE and WebSocket event streams
//!
//! One connection per session, owned by a background task. Lifecycle and
//! message events are forwarded over an unbounded channel in arrival order;
//! ordering within a connection is the transport's native guarantee and is
//! never re-sorted here.
//!
//! Both transports reconnect after a fixed delay when the connection drops.
//! Browser EventSource reconnects natively; the WebSocket side mirrors that
//! behavior so the two have symmetric lifecycles.

mod sse;
mod ws;

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::Config;

pub use ws::derive_ws_url;

/// Delay between reconnect attempts
pub const RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Which transport carries store updates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Server-Sent Events over HTTP
    Sse,
    /// WebSocket at the server's `/ws` path
    WebSocket,
}

impl FromStr for TransportKind {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sse" => Ok(TransportKind::Sse),
            "websocket" | "ws" => Ok(TransportKind::WebSocket),
            other => Err(TransportError::Unsupported(other.to_string())),
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Sse => f.write_str("sse"),
            TransportKind::WebSocket => f.write_str("websocket"),
        }
    }
}

/// Observable events of one transport connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Connection established
    Opened,
    /// One UTF-8 JSON store payload
    Message(String),
    /// Connection ended cleanly
    Closed,
    /// Connection ended with an error
    Error(String),
}

/// Errors raised while setting up or driving a transport
#[derive(Error, Debug)]
pub enum TransportError {
    /// The configured transport name is not one this build recognizes.
    /// Terminal: the caller renders a fallback message instead of retrying.
    #[error("transport '{0}' is not supported; expected 'sse' or 'websocket'")]
    Unsupported(String),

    /// The server URL could not be parsed
    #[error("invalid server URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The server URL has a scheme no transport can be derived from
    #[error("cannot derive a WebSocket URL from '{0}'")]
    InvalidScheme(String),

    /// HTTP-level failure on the SSE stream
    #[error("event stream error: {0}")]
    Http(#[from] reqwest::Error),

    /// WebSocket-level failure
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Spawn the configured transport and return its event stream
///
/// The background task runs until the receiver is dropped. URL problems are
/// reported before anything is spawned.
pub fn spawn(
    config: &Config,
) -> Result<mpsc::UnboundedReceiver<TransportEvent>, TransportError> {
    let kind = config.transport_kind()?;
    let (tx, rx) = mpsc::unbounded_channel();

    match kind {
        TransportKind::Sse => {
            let url = config.events_url();
            let channel = config.event_channel.clone();
            tokio::spawn(sse::run(url, channel, tx));
        }
        TransportKind::WebSocket => {
            let url = ws::derive_ws_url(&config.server_url)?;
            tokio::spawn(ws::run(url, tx));
        }
    }

    Ok(rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_kind_from_str() {
        assert_eq!("sse".parse::<TransportKind>().unwrap(), TransportKind::Sse);
        assert_eq!(
            "websocket".parse::<TransportKind>().unwrap(),
            TransportKind::WebSocket
        );
        assert_eq!(
            "ws".parse::<TransportKind>().unwrap(),
            TransportKind::WebSocket
        );
        assert_eq!("SSE".parse::<TransportKind>().unwrap(), TransportKind::Sse);
    }

    #[test]
    fn test_unsupported_transport_is_terminal() {
        let err = "smoke-signals".parse::<TransportKind>().unwrap_err();
        assert!(matches!(err, TransportError::Unsupported(_)));
        assert!(err.to_string().contains("smoke-signals"));
    }

    #[tokio::test]
    async fn test_spawn_rejects_bad_url_before_spawning() {
        let config = Config {
            server_url: "not a url".to_string(),
            transport: "websocket".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            spawn(&config),
            Err(TransportError::InvalidUrl { .. })
        ));
    }
}
