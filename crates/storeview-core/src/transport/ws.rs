//! WebSocket transport
//!
//! Connects to the server's `/ws` endpoint, derived from the HTTP base URL
//! the way a browser page derives it from its own location: `https` becomes
//! `wss`, everything else becomes `ws`. Text frames carry store payloads.
//!
//! Reconnects on close with the same fixed delay as the SSE side, so both
//! transports behave symmetrically.

use futures_util::StreamExt;
use tokio::sync::mpsc::UnboundedSender;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use url::Url;

use super::{TransportError, TransportEvent, RECONNECT_DELAY};
use crate::config::WS_PATH;

/// Derive the WebSocket URL from the HTTP base URL
///
/// Scheme maps `https`/`wss` to `wss` and everything else to `ws`; the fixed
/// `ws` path segment is appended to the base path.
pub fn derive_ws_url(server_url: &str) -> Result<Url, TransportError> {
    let mut url = Url::parse(server_url).map_err(|source| TransportError::InvalidUrl {
        url: server_url.to_string(),
        source,
    })?;

    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        _ => "ws",
    };
    url.set_scheme(scheme)
        .map_err(|_| TransportError::InvalidScheme(server_url.to_string()))?;

    url.path_segments_mut()
        .map_err(|_| TransportError::InvalidScheme(server_url.to_string()))?
        .pop_if_empty()
        .push(WS_PATH);

    Ok(url)
}

/// Drive the WebSocket connection until the receiver side is dropped
pub(super) async fn run(url: Url, tx: UnboundedSender<TransportEvent>) {
    loop {
        match connect_and_stream(&url, &tx).await {
            Ok(()) => {
                info!("websocket closed");
                let _ = tx.send(TransportEvent::Closed);
            }
            Err(e) => {
                warn!("websocket failed: {}", e);
                let _ = tx.send(TransportEvent::Error(e.to_string()));
            }
        }

        if tx.is_closed() {
            return;
        }

        debug!("reconnecting to {} in {:?}", url, RECONNECT_DELAY);
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

/// One connection: read frames and forward text payloads
async fn connect_and_stream(
    url: &Url,
    tx: &UnboundedSender<TransportEvent>,
) -> Result<(), TransportError> {
    debug!("connecting to {}", url);
    let (ws_stream, _response) = connect_async(url.as_str()).await?;

    let _ = tx.send(TransportEvent::Opened);

    // The write half is unused: commands travel over HTTP POST, not the socket
    let (_write, mut read) = ws_stream.split();

    while let Some(frame) = read.next().await {
        match frame? {
            Message::Text(text) => {
                if tx.send(TransportEvent::Message(text)).is_err() {
                    return Ok(());
                }
            }
            Message::Close(_) => return Ok(()),
            // Ping/Pong are answered by the library; binary frames are not
            // part of the contract
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_becomes_ws() {
        let url = derive_ws_url("http://localhost:3410").unwrap();
        assert_eq!(url.as_str(), "ws://localhost:3410/ws");
    }

    #[test]
    fn test_https_becomes_wss() {
        let url = derive_ws_url("https://store.example.com").unwrap();
        assert_eq!(url.as_str(), "wss://store.example.com/ws");
    }

    #[test]
    fn test_base_path_preserved() {
        let url = derive_ws_url("http://example.com/demo").unwrap();
        assert_eq!(url.as_str(), "ws://example.com/demo/ws");

        // Trailing slash must not produce an empty segment
        let url = derive_ws_url("http://example.com/demo/").unwrap();
        assert_eq!(url.as_str(), "ws://example.com/demo/ws");
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(matches!(
            derive_ws_url("not a url"),
            Err(TransportError::InvalidUrl { .. })
        ));
    }
}
