//! Outbound intents and the callback sender
//!
//! User interactions become `Command` values POSTed to the server's callback
//! endpoint. Sends are fire-and-forget: no retry, no acknowledgment tracked
//! here. The server echoes the resulting store over the transport, which is
//! the de facto acknowledgment.

use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;

/// A client-originated request to mutate server state
///
/// Wire shape is serde's externally tagged form, e.g. `{"SetName":"Bob"}` or
/// `{"SetIsRecording":true}`. This envelope is a compatibility-critical
/// contract with the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Set the store's `name` field
    SetName(String),
    /// Set the store's `is_recording` field
    SetIsRecording(bool),
}

impl Command {
    /// Encode the command to its JSON wire form
    pub fn encode(&self) -> String {
        serde_json::to_string(self).expect("JSON encoding failed")
    }
}

/// Fire-and-forget sender for the callback endpoint
///
/// Cheap to clone; clones share the underlying HTTP connection pool.
#[derive(Debug, Clone)]
pub struct CommandSender {
    client: reqwest::Client,
    callback_url: String,
}

impl CommandSender {
    /// Create a sender targeting the configured callback endpoint
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            callback_url: config.callback_url(),
        }
    }

    /// The endpoint commands are POSTed to
    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }

    /// POST one command, once
    ///
    /// A failed send is logged and otherwise unobserved. No response body is
    /// consumed.
    pub async fn send(&self, command: &Command) {
        let body = command.encode();
        debug!("sending callback: {}", body);

        let result = self
            .client
            .post(&self.callback_url)
            .header(CONTENT_TYPE, "application/json;charset=UTF-8")
            .header(CACHE_CONTROL, "no-cache, no-store, max-age=0")
            .body(body)
            .send()
            .await;

        match result {
            Ok(response) => debug!("callback response: {}", response.status()),
            Err(e) => debug!("callback send failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_name_wire_shape() {
        let cmd = Command::SetName("Bob".to_string());
        assert_eq!(cmd.encode(), r#"{"SetName":"Bob"}"#);
    }

    #[test]
    fn test_set_is_recording_wire_shape() {
        assert_eq!(
            Command::SetIsRecording(true).encode(),
            r#"{"SetIsRecording":true}"#
        );
        assert_eq!(
            Command::SetIsRecording(false).encode(),
            r#"{"SetIsRecording":false}"#
        );
    }

    #[test]
    fn test_command_roundtrip() {
        let cmd = Command::SetName("Alice".to_string());
        let decoded: Command = serde_json::from_str(&cmd.encode()).unwrap();
        assert_eq!(decoded, cmd);
    }

    #[test]
    fn test_sender_targets_callback_endpoint() {
        let sender = CommandSender::new(&Config::default());
        assert_eq!(sender.callback_url(), "http://localhost:3410/callback");
    }
}
