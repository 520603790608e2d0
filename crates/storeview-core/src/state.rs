//! Connection state and the client state holder
//!
//! One `ClientState` exists per session. It is a plain value holder:
//! last-write-wins, no validation, mutated only from the single task that
//! drains transport events.

use std::fmt;

use tracing::{debug, warn};

use crate::store::ServerStore;
use crate::transport::TransportEvent;

/// Phase of the transport connection
///
/// Recomputed on every transport lifecycle event, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not yet connected (or between reconnect attempts)
    Connecting,
    /// Connected and receiving events
    Open,
    /// Closed or errored
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
        };
        f.write_str(label)
    }
}

/// Last known connection state and store snapshot
#[derive(Debug, Clone)]
pub struct ClientState {
    connection_state: ConnectionState,
    store: Option<ServerStore>,
}

impl Default for ClientState {
    fn default() -> Self {
        Self {
            connection_state: ConnectionState::Connecting,
            store: None,
        }
    }
}

impl ClientState {
    /// Create a state holder in the initial `Connecting` phase with no store
    pub fn new() -> Self {
        Self::default()
    }

    /// The current connection state
    pub fn connection_state(&self) -> ConnectionState {
        self.connection_state
    }

    /// The last received store snapshot, if any
    pub fn store(&self) -> Option<&ServerStore> {
        self.store.as_ref()
    }

    /// Overwrite the connection state
    pub fn set_connection_state(&mut self, state: ConnectionState) {
        self.connection_state = state;
    }

    /// Replace the store snapshot wholesale
    pub fn set_store(&mut self, store: ServerStore) {
        self.store = Some(store);
    }

    /// Fold one transport event into the holder
    ///
    /// A message that fails to decode is logged and dropped; the previously
    /// rendered snapshot persists until the next push arrives.
    pub fn apply(&mut self, event: &TransportEvent) {
        match event {
            TransportEvent::Opened => {
                debug!("transport open");
                self.set_connection_state(ConnectionState::Open);
            }
            TransportEvent::Closed => {
                debug!("transport closed");
                self.set_connection_state(ConnectionState::Closed);
            }
            TransportEvent::Error(message) => {
                warn!("transport error: {}", message);
                self.set_connection_state(ConnectionState::Closed);
            }
            TransportEvent::Message(text) => match ServerStore::parse(text) {
                Ok(store) => self.set_store(store),
                Err(e) => warn!("discarding undecodable store push: {}", e),
            },
        }
    }
}
