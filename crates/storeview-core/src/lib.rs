//! Storeview Core Library
//!
//! This crate provides the core functionality for storeview, a client that
//! mirrors a server-authoritative JSON store into local UI controls.
//!
//! # Architecture
//!
//! - **Transport**: a background task holding one SSE or WebSocket connection
//!   to the server, forwarding lifecycle and message events in arrival order
//! - **State holder**: the last known connection state and the last store
//!   snapshot received, replaced wholesale on every push
//! - **Renderer**: projects the state holder into a view model idempotently
//! - **Command sender**: fire-and-forget JSON POSTs carrying user intents
//!
//! The server is the single source of truth. User edits never mutate local
//! state directly; the next store push is the de facto acknowledgment.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut events = transport::spawn(&config)?;
//! let mut state = ClientState::new();
//! let mut view = ViewModel::new();
//!
//! while let Some(event) = events.recv().await {
//!     state.apply(&event);
//!     render(&state, &mut view);
//! }
//! ```
//!
//! # Modules
//!
//! - `config`: Application configuration
//! - `store`: The mirrored server store snapshot
//! - `state`: Connection state and the client state holder
//! - `render`: View model and the render pass
//! - `command`: Outbound intents and the callback sender
//! - `transport`: SSE and WebSocket event streams

pub mod command;
pub mod config;
pub mod render;
pub mod state;
pub mod store;
pub mod transport;

pub use command::{Command, CommandSender};
pub use config::Config;
pub use render::{render, NameField, ToggleControl, ViewModel};
pub use state::{ClientState, ConnectionState};
pub use store::ServerStore;
pub use transport::{TransportError, TransportEvent, TransportKind};
