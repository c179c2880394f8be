//! Outbound wire messages.
//!
//! Everything the plugin writes on the socket, starting with the pairing
//! message. Serialized as single-line JSON with a `type` discriminator.

use serde::Serialize;

/// A message sent to the host.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OutboundMessage {
    /// Pairing handshake; carries the declared plugin id.
    Pair {
        /// Plugin identifier.
        id: String,
    },
    /// Update the value of a declared or created state.
    StateUpdate {
        /// State identifier.
        id: String,
        /// New value.
        value: String,
    },
    /// Replace the values of a choice list, optionally for one UI instance.
    ChoiceUpdate {
        /// List identifier.
        id: String,
        /// Specific action instance, when targeting one widget only.
        #[serde(skip_serializing_if = "Option::is_none")]
        instance_id: Option<String>,
        /// New list values.
        value: Vec<String>,
    },
    /// Create a state at runtime.
    CreateState {
        /// State identifier.
        id: String,
        /// Display description shown in the host UI.
        desc: String,
        /// Initial value.
        default_value: String,
        /// Optional grouping in the host UI.
        #[serde(skip_serializing_if = "Option::is_none")]
        parent_group: Option<String>,
    },
    /// Remove a previously created state.
    RemoveState {
        /// State identifier.
        id: String,
    },
    /// Update one of the plugin's own settings.
    SettingUpdate {
        /// Setting name.
        name: String,
        /// New value.
        value: String,
    },
    /// Show a notification in the host UI.
    ShowNotification {
        /// Notification identifier.
        notification_id: String,
        /// Notification title.
        title: String,
        /// Notification body.
        msg: String,
        /// Clickable options; the host requires at least one.
        options: Vec<NotificationOption>,
    },
}

impl OutboundMessage {
    /// Serialize to the single-line JSON form the host expects.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A clickable option on a notification.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationOption {
    /// Option identifier, reported back via `notificationOptionClicked`.
    pub id: String,
    /// Option label.
    pub title: String,
}
