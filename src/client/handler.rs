//! Handler surface for inbound messages.

use serde_json::Value;

use crate::protocol::{
    BroadcastMessage, InfoMessage, ListChangeMessage, NotificationOptionClickedMessage,
    SettingsMessage,
};

use super::error::ClientError;

/// Callbacks invoked by the receive loop.
///
/// Every method has a no-op default; implement only what the plugin cares
/// about. When the client is configured for parallel action dispatch the
/// action callbacks run off-thread, but these lifecycle methods always run
/// on the listening thread itself.
pub trait PluginEventHandler: Send {
    /// The host confirmed pairing. The client has already absorbed the
    /// settings carried by the message into its settings cache.
    fn on_info(&mut self, _info: &InfoMessage) {}

    /// A choice list changed in the host UI.
    fn on_list_changed(&mut self, _change: &ListChangeMessage) {}

    /// A host-wide event was broadcast.
    fn on_broadcast(&mut self, _broadcast: &BroadcastMessage) {}

    /// The user edited the plugin's settings. The client's settings cache
    /// is already updated when this fires.
    fn on_settings(&mut self, _settings: &SettingsMessage) {}

    /// The user clicked an option on a notification shown by this plugin.
    fn on_notification_option_clicked(&mut self, _clicked: &NotificationOptionClickedMessage) {}

    /// A recognized message addressed to this plugin had no registered
    /// callback (e.g. an action without one). Raw JSON is passed through.
    fn on_received(&mut self, _message: &Value) {}

    /// The connection ended. `cause` is `None` for a clean close (EOF or a
    /// close request from the host) and the underlying error otherwise.
    fn on_disconnected(&mut self, _cause: Option<&ClientError>) {}
}

/// A handler that ignores everything. Useful for plugins that only react
/// to action callbacks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandler;

impl PluginEventHandler for NoopHandler {}

/// Context passed to an action callback.
#[derive(Debug, Clone)]
pub struct ActionContext {
    /// Identifier of the invoked action.
    pub action_id: String,
    /// Runtime data values as `(id, value)` pairs, in declaration order.
    pub data: Vec<(String, String)>,
    /// `None` when triggered by a press, `Some(true)` on hold down,
    /// `Some(false)` on hold release.
    pub held: Option<bool>,
}

impl ActionContext {
    /// Raw string value of a data field by id.
    pub fn data_value(&self, data_id: &str) -> Option<&str> {
        self.data.iter().find(|(id, _)| id == data_id).map(|(_, value)| value.as_str())
    }
}
