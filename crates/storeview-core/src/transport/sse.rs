//! Server-Sent Events transport
//!
//! Streams the server's events endpoint and surfaces frames whose event name
//! matches the configured channel. Reconnects with a fixed delay, preserving
//! the auto-reconnect behavior native to browser EventSource.

use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use super::{TransportError, TransportEvent, RECONNECT_DELAY};

/// Event name the SSE spec assigns to frames without an `event:` field
const DEFAULT_EVENT_NAME: &str = "message";

/// Drive the SSE connection until the receiver side is dropped
pub(super) async fn run(url: String, channel: String, tx: UnboundedSender<TransportEvent>) {
    let client = reqwest::Client::new();

    loop {
        match connect_and_stream(&client, &url, &channel, &tx).await {
            Ok(()) => {
                info!("event stream ended");
                let _ = tx.send(TransportEvent::Closed);
            }
            Err(e) => {
                warn!("event stream failed: {}", e);
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

/// One connection: open the stream and forward matching frames
async fn connect_and_stream(
    client: &reqwest::Client,
    url: &str,
    channel: &str,
    tx: &UnboundedSender<TransportEvent>,
) -> Result<(), TransportError> {
    debug!("connecting to event stream {}", url);
    let response = client
        .get(url)
        .header(ACCEPT, "text/event-stream")
        .send()
        .await?
        .error_for_status()?;

    let _ = tx.send(TransportEvent::Opened);

    let mut parser = SseParser::new(channel);
    let mut body = response.bytes_stream();

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        for data in parser.feed(&chunk) {
            if tx.send(TransportEvent::Message(data)).is_err() {
                return Ok(());
            }
        }
    }

    Ok(())
}

/// Incremental parser for the SSE wire format
///
/// Fed raw body chunks (which may split lines, or even UTF-8 sequences,
/// arbitrarily); yields the `data` payloads of frames whose event name
/// matches the channel. Per the wire format: `event:` names the frame,
/// `data:` lines accumulate and join with newlines, a lone `:` prefix is a
/// comment, a blank line dispatches, and both LF and CRLF line endings are
/// accepted. `id:` and `retry:` fields are ignored; the reconnect delay here
/// is fixed.
pub(crate) struct SseParser {
    channel: String,
    buf: Vec<u8>,
    event_name: String,
    data: Vec<String>,
}

impl SseParser {
    pub(crate) fn new(channel: &str) -> Self {
        Self {
            channel: channel.to_string(),
            buf: Vec::new(),
            event_name: String::new(),
            data: Vec::new(),
        }
    }

    /// Feed one body chunk; returns payloads of completed, matching frames
    pub(crate) fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut out = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
            line.pop(); // trailing \n
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line).into_owned();
            if let Some(payload) = self.process_line(&line) {
                out.push(payload);
            }
        }
        out
    }

    /// Handle one complete line; returns a payload on dispatch
    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None; // comment
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event_name = value.to_string(),
            "data" => self.data.push(value.to_string()),
            // id and retry are not tracked
            _ => {}
        }
        None
    }

    /// Complete the pending frame, surfacing it only on a channel match
    fn dispatch(&mut self) -> Option<String> {
        if self.data.is_empty() {
            self.event_name.clear();
            return None;
        }

        let name = if self.event_name.is_empty() {
            DEFAULT_EVENT_NAME
        } else {
            self.event_name.as_str()
        };
        let matched = name == self.channel;
        let name = name.to_string();

        let payload = self.data.join("\n");
        self.data.clear();
        self.event_name.clear();

        if matched {
            Some(payload)
        } else {
            debug!("ignoring frame on channel '{}'", name);
            None
        }
    }
}
