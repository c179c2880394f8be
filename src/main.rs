//! Sample plugin built on the hostlink SDK.
//!
//! Declares one category with two actions, connects to the host when
//! launched with the `start` token, logs a timestamp whenever an action
//! fires, and exits with code 0 on any disconnect.

use std::process;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hostlink::protocol::{
    BroadcastMessage, InfoMessage, ListChangeMessage, NotificationOptionClickedMessage,
    SettingsMessage,
};
use hostlink::{
    Action, Category, ClientError, DataField, PluginClient, PluginConfig, PluginDescriptor,
    PluginEventHandler, Setting, COMMAND_START, DEFAULT_HOST_ADDRESS,
};

/// Sample plugin for socket-driven automation hosts
#[derive(Parser)]
#[command(name = "hostlink-sample")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Arguments passed by the host; only the exact `start` token connects
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Lifecycle handler for the sample plugin.
struct SampleHandler;

impl PluginEventHandler for SampleHandler {
    fn on_info(&mut self, info: &InfoMessage) {
        tracing::info!(
            status = ?info.status,
            host_version = ?info.tp_version_string,
            "paired with host"
        );
    }

    fn on_list_changed(&mut self, change: &ListChangeMessage) {
        tracing::debug!(list = %change.list_id, value = %change.value, "list changed");
    }

    fn on_broadcast(&mut self, broadcast: &BroadcastMessage) {
        tracing::debug!(event = %broadcast.event, page = ?broadcast.page_name, "broadcast");
    }

    fn on_settings(&mut self, settings: &SettingsMessage) {
        tracing::info!(count = settings.values.len(), "settings changed");
    }

    fn on_notification_option_clicked(&mut self, clicked: &NotificationOptionClickedMessage) {
        tracing::info!(option = %clicked.option_id, "notification option clicked");
    }

    fn on_disconnected(&mut self, cause: Option<&ClientError>) {
        match cause {
            Some(cause) => tracing::warn!("disconnected from host: {}", cause),
            None => tracing::info!("disconnected from host"),
        }
        // The host owns the plugin lifecycle; any disconnect means we are
        // done, whatever the cause.
        process::exit(0);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry().with(fmt::layer().with_target(false)).with(filter).init();

    // The host launches plugins with a single `start` argument. Any other
    // argv shape means we were not started by the host: do nothing.
    if cli.args.len() != 1 || cli.args[0] != COMMAND_START {
        tracing::debug!("not launched with the start token; exiting");
        return Ok(());
    }

    run()
}

fn run() -> Result<()> {
    let mut config = PluginConfig::load("plugin.config")?;
    tracing::info!(samplekey = ?config.get("samplekey"), "loaded plugin.config");
    config.set("samplekey", "Value set from plugin");
    config.store()?;

    let address = match (config.get("host"), config.get("port")) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        _ => DEFAULT_HOST_ADDRESS.to_string(),
    };

    let descriptor = PluginDescriptor::builder("com.hostlink.sample", "Hostlink Sample Plugin")
        .version(100)
        .colors("#203060", "#4070F0")
        .category(
            Category::new("base", "Sample Base Category")
                .with_image("images/icon-24.png")
                .with_action(
                    Action::new("action_simple", "Simple Action")
                        .with_description("Long description of the simple action")
                        .with_format("Do a simple action"),
                )
                .with_action(
                    Action::new("action_with_text", "Action With Text")
                        .with_description("Long description of the action with a text field")
                        .with_format("Set text to {$text$}")
                        .with_data(DataField::text("text", "Text")),
                ),
        )
        .setting(Setting::new("IP", "localhost"))
        .build()?;

    let mut client = PluginClient::new(descriptor, true).with_address(address);

    client.on_action("action_simple", |_ctx| {
        tracing::info!("action_simple received at {}", timestamp());
    })?;
    client.on_action("action_with_text", |ctx| {
        tracing::info!(
            "action_with_text received at {}: {:?}",
            timestamp(),
            ctx.data_value("text")
        );
    })?;

    client.connect_and_pair()?;

    // Runtime state demo: create, update, remove.
    client.send_create_state("created_state", "Created State 01", timestamp(), None)?;
    client.send_state_update("created_state", "2")?;
    client.send_remove_state("created_state")?;

    client.listen(&mut SampleHandler)?;
    Ok(())
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}
