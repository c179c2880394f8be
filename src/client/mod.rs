//! Plugin client: connection, handshake, and message dispatch.
//!
//! The client owns the full connection lifecycle:
//!
//! ```text
//! Disconnected --connect--> Connecting --pair ok--> Paired (listening)
//!       ^                                               |
//!       +----------- disconnect / error / close --------+
//! ```
//!
//! Once paired it blocks on the inbound stream, routing each message to
//! exactly one handler. Disconnects of any cause end the loop and fire
//! [`PluginEventHandler::on_disconnected`] once.

mod connection;
mod dispatch;
mod error;
mod handler;
mod plugin;

pub use connection::{Connection, DEFAULT_HOST_ADDRESS};
pub use dispatch::{ActionCallback, ActionRegistry, CallbackExecutor};
pub use error::{ClientError, ClientResult};
pub use handler::{ActionContext, NoopHandler, PluginEventHandler};
pub use plugin::{ConnectionState, HeldActions, PluginClient, SettingsCache};
