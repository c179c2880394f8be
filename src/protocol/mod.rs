//! Wire protocol types for talking to the host.
//!
//! The host speaks newline-delimited JSON over a local socket. Inbound and
//! outbound message sets are disjoint and both carry a `type` discriminator.

mod inbound;
mod outbound;

pub use inbound::{
    ActionDatum, ActionMessage, BroadcastMessage, ClosePluginMessage, InboundMessage, InfoMessage,
    ListChangeMessage, NotificationOptionClickedMessage, SettingsMessage,
};
pub use outbound::{NotificationOption, OutboundMessage};
