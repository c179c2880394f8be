//! Inbound wire messages.
//!
//! Every line the host writes on the socket is a JSON object carrying a
//! `type` discriminator. Recognized kinds deserialize into typed structs;
//! anything else lands on the `Unknown` variant so a newer host cannot
//! break an older plugin.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A message received from the host.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum InboundMessage {
    /// An action was invoked from the host UI.
    #[serde(rename = "action")]
    Action(ActionMessage),
    /// A holdable action was pressed down.
    #[serde(rename = "down")]
    HoldDown(ActionMessage),
    /// A holdable action was released.
    #[serde(rename = "up")]
    HoldUp(ActionMessage),
    /// A choice list selection changed in the host UI.
    #[serde(rename = "listChange")]
    ListChange(ListChangeMessage),
    /// Pairing confirmation with host metadata and current settings.
    #[serde(rename = "info")]
    Info(InfoMessage),
    /// A host-wide event (e.g. page change).
    #[serde(rename = "broadcast")]
    Broadcast(BroadcastMessage),
    /// The user changed one or more plugin settings.
    #[serde(rename = "settings")]
    Settings(SettingsMessage),
    /// The user clicked an option on a notification shown by this plugin.
    #[serde(rename = "notificationOptionClicked")]
    NotificationOptionClicked(NotificationOptionClickedMessage),
    /// The host asks the plugin to shut down.
    #[serde(rename = "closePlugin")]
    ClosePlugin(ClosePluginMessage),
    /// Any message kind this SDK does not recognize.
    #[serde(other)]
    Unknown,
}

impl InboundMessage {
    /// Parse a single line received from the host.
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    /// Short name of the message kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Action(_) => "action",
            Self::HoldDown(_) => "down",
            Self::HoldUp(_) => "up",
            Self::ListChange(_) => "listChange",
            Self::Info(_) => "info",
            Self::Broadcast(_) => "broadcast",
            Self::Settings(_) => "settings",
            Self::NotificationOptionClicked(_) => "notificationOptionClicked",
            Self::ClosePlugin(_) => "closePlugin",
            Self::Unknown => "unknown",
        }
    }
}

/// An action invocation, including the runtime values of its data fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionMessage {
    /// Identifier of the plugin the action belongs to.
    #[serde(default)]
    pub plugin_id: Option<String>,
    /// Identifier of the invoked action.
    pub action_id: String,
    /// Runtime values for the action's data fields, in declaration order.
    #[serde(default)]
    pub data: Vec<ActionDatum>,
}

impl ActionMessage {
    /// Raw string value of a data field by id.
    pub fn data_value(&self, data_id: &str) -> Option<&str> {
        self.data.iter().find(|d| d.id == data_id).map(|d| d.value.as_str())
    }

    /// Data field value parsed as a boolean ("true"/"On" and "false"/"Off").
    pub fn data_value_bool(&self, data_id: &str) -> Option<bool> {
        self.data_value(data_id).and_then(|value| {
            if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("on") {
                Some(true)
            } else if value.eq_ignore_ascii_case("false") || value.eq_ignore_ascii_case("off") {
                Some(false)
            } else {
                None
            }
        })
    }

    /// Data field value parsed as an integer.
    pub fn data_value_i64(&self, data_id: &str) -> Option<i64> {
        self.data_value(data_id).and_then(|value| value.parse().ok())
    }

    /// Data field value parsed as a float.
    pub fn data_value_f64(&self, data_id: &str) -> Option<f64> {
        self.data_value(data_id).and_then(|value| value.parse().ok())
    }
}

/// A single `{id, value}` pair attached to an action invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionDatum {
    /// Data field identifier.
    pub id: String,
    /// Runtime value, always transported as a string.
    #[serde(deserialize_with = "de_stringly", default)]
    pub value: String,
}

/// A choice list changed in the host UI.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListChangeMessage {
    /// Identifier of the plugin the list belongs to.
    #[serde(default)]
    pub plugin_id: Option<String>,
    /// Identifier of the action the list is attached to.
    #[serde(default)]
    pub action_id: Option<String>,
    /// Identifier of the changed list.
    pub list_id: String,
    /// Instance of the action in the host UI.
    #[serde(default)]
    pub instance_id: Option<String>,
    /// Newly selected value.
    #[serde(default)]
    pub value: String,
}

/// Host metadata sent once pairing succeeds.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoMessage {
    /// Protocol version spoken by the host.
    #[serde(default)]
    pub sdk_version: Option<i64>,
    /// Host application version, human readable.
    #[serde(default)]
    pub tp_version_string: Option<String>,
    /// Host application version code.
    #[serde(default)]
    pub tp_version_code: Option<i64>,
    /// Plugin version the host has on record.
    #[serde(default)]
    pub plugin_version: Option<i64>,
    /// Pairing status reported by the host.
    #[serde(default)]
    pub status: Option<String>,
    /// Current values of the plugin's declared settings.
    #[serde(default, deserialize_with = "de_settings")]
    pub settings: HashMap<String, String>,
}

/// A host-wide broadcast event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastMessage {
    /// Event name (e.g. `pageChange`).
    pub event: String,
    /// Page the user navigated to, when the event carries one.
    #[serde(default)]
    pub page_name: Option<String>,
}

/// Updated plugin settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsMessage {
    /// New setting values, keyed by setting name.
    #[serde(default, alias = "settings", deserialize_with = "de_settings")]
    pub values: HashMap<String, String>,
}

/// The user clicked an option on a plugin notification.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOptionClickedMessage {
    /// Identifier of the notification.
    pub notification_id: String,
    /// Identifier of the clicked option.
    pub option_id: String,
}

/// Shutdown request from the host.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosePluginMessage {
    /// Identifier of the plugin being closed.
    #[serde(default)]
    pub plugin_id: Option<String>,
}

/// Accept any JSON scalar where the protocol nominally carries a string.
///
/// Hosts serialize numeric data values either way depending on version.
fn de_stringly<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(&value))
}

/// Settings arrive as an array of single-entry objects: `[{"IP": "localhost"},
/// {"Delay": 10}]`. Flatten them into one map with stringified values.
fn de_settings<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<HashMap<String, Value>>>::deserialize(deserializer)?;
    let mut settings = HashMap::new();
    for entry in entries.unwrap_or_default() {
        for (name, value) in entry {
            settings.insert(name, scalar_to_string(&value));
        }
    }
    Ok(settings)
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
