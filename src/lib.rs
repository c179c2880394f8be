//! # Hostlink
//!
//! Plugin client SDK for socket-driven desktop automation hosts.
//!
//! A plugin declares its categories, actions, and settings through an
//! explicit builder, then connects to the locally running host over a
//! socket, pairs, and dispatches the inbound JSON message stream to its
//! handlers.
//!
//! ## Quick Start
//!
//! ```no_run
//! use hostlink::{Action, Category, DataField, NoopHandler, PluginClient, PluginDescriptor};
//!
//! let descriptor = PluginDescriptor::builder("com.example.sample", "Sample Plugin")
//!     .category(
//!         Category::new("base", "Base Category").with_action(
//!             Action::new("action_with_text", "Action With Text")
//!                 .with_format("Set text to {$text$}")
//!                 .with_data(DataField::text("text", "Text")),
//!         ),
//!     )
//!     .build()?;
//!
//! let mut client = PluginClient::new(descriptor, false);
//! client.on_action("action_with_text", |ctx| {
//!     println!("text = {:?}", ctx.data_value("text"));
//! })?;
//! client.connect_pair_and_listen(&mut NoopHandler)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::significant_drop_tightening)]

pub mod client;
pub mod config;
pub mod descriptor;
pub mod protocol;

pub use client::{
    ActionContext, ClientError, ClientResult, ConnectionState, HeldActions, NoopHandler,
    PluginClient, PluginEventHandler, SettingsCache, DEFAULT_HOST_ADDRESS,
};
pub use config::{ConfigError, PluginConfig};
pub use descriptor::{
    Action, Category, DataField, DataKind, DescriptorBuilder, DescriptorError, PluginDescriptor,
    Setting,
};
pub use protocol::{InboundMessage, NotificationOption, OutboundMessage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "hostlink";

/// Argv token the host passes when launching a plugin.
pub const COMMAND_START: &str = "start";
