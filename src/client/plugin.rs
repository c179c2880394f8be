//! The plugin client.
//!
//! Bridges a built [`PluginDescriptor`] to the host process: opens the
//! socket, performs the pairing handshake, then consumes the inbound
//! message stream on the calling thread, dispatching each recognized
//! message to exactly one handler.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::descriptor::PluginDescriptor;
use crate::protocol::{InboundMessage, NotificationOption, OutboundMessage};

use super::connection::{Connection, DEFAULT_HOST_ADDRESS};
use super::dispatch::{ActionCallback, ActionRegistry, CallbackExecutor};
use super::error::{ClientError, ClientResult};
use super::handler::{ActionContext, PluginEventHandler};

/// Lifecycle of the connection to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection.
    Disconnected,
    /// Socket opening / handshake in flight.
    Connecting,
    /// Handshake sent; receive loop consuming messages.
    Paired,
}

/// Cloneable read handle on the plugin's current setting values.
///
/// Values update as info and settings messages arrive; callbacks can hold
/// a clone while the client itself is busy in the receive loop.
#[derive(Clone)]
pub struct SettingsCache {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl SettingsCache {
    /// Current value of a setting by name.
    pub fn get(&self, name: &str) -> Option<String> {
        self.inner.lock().get(name).cloned()
    }

    /// Copy of all current setting values.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.inner.lock().clone()
    }
}

/// Cloneable read handle on per-action hold state.
///
/// `None` means the action is not currently invoked via hold; `Some(true)`
/// while held down, `Some(false)` once released (until the callback for
/// the release completes).
#[derive(Clone)]
pub struct HeldActions {
    inner: Arc<Mutex<HashMap<String, bool>>>,
}

impl HeldActions {
    /// Hold state of an action by id.
    pub fn is_held(&self, action_id: &str) -> Option<bool> {
        self.inner.lock().get(action_id).copied()
    }
}

/// Outcome of handling one inbound line.
enum LoopControl {
    Continue,
    Close,
}

/// Client connecting a declared plugin to its host.
pub struct PluginClient {
    descriptor: Arc<PluginDescriptor>,
    registry: ActionRegistry,
    executor: CallbackExecutor,
    address: String,
    connection: Option<Connection>,
    state: ConnectionState,
    host_info: Option<crate::protocol::InfoMessage>,
    settings: Arc<Mutex<HashMap<String, String>>>,
    held_actions: Arc<Mutex<HashMap<String, bool>>>,
    current_states: HashMap<String, String>,
    current_choices: HashMap<String, Vec<String>>,
}

impl PluginClient {
    /// Create a client for a built descriptor.
    ///
    /// `parallelize_actions` runs action callbacks on a pool of workers
    /// instead of strictly one at a time; callbacks must then synchronize
    /// any state they share.
    pub fn new(descriptor: PluginDescriptor, parallelize_actions: bool) -> Self {
        let descriptor = Arc::new(descriptor);
        let settings = Arc::new(Mutex::new(descriptor.default_settings()));
        Self {
            registry: ActionRegistry::new(Arc::clone(&descriptor)),
            executor: CallbackExecutor::new(parallelize_actions),
            descriptor,
            address: DEFAULT_HOST_ADDRESS.to_string(),
            connection: None,
            state: ConnectionState::Disconnected,
            host_info: None,
            settings,
            held_actions: Arc::new(Mutex::new(HashMap::new())),
            current_states: HashMap::new(),
            current_choices: HashMap::new(),
        }
    }

    /// Override the host address. The default follows the host's
    /// invocation convention (`127.0.0.1:12136`).
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// The declared descriptor.
    pub fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether the socket is open.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Whether the client is paired and consuming messages.
    pub fn is_listening(&self) -> bool {
        self.state == ConnectionState::Paired
    }

    /// Host metadata from the info message, once received.
    pub fn host_info(&self) -> Option<&crate::protocol::InfoMessage> {
        self.host_info.as_ref()
    }

    /// Read handle on current setting values.
    pub fn settings(&self) -> SettingsCache {
        SettingsCache { inner: Arc::clone(&self.settings) }
    }

    /// Read handle on per-action hold state.
    pub fn held_actions(&self) -> HeldActions {
        HeldActions { inner: Arc::clone(&self.held_actions) }
    }

    /// Hold state of an action by id. `None` when not invoked via hold.
    pub fn is_action_held(&self, action_id: &str) -> Option<bool> {
        self.held_actions.lock().get(action_id).copied()
    }

    /// Register a callback for a declared action id.
    pub fn on_action<F>(&mut self, action_id: &str, callback: F) -> ClientResult<()>
    where
        F: Fn(ActionContext) + Send + Sync + 'static,
    {
        self.registry.register(action_id, callback)
    }

    /// Connect, send the pairing handshake, and consume inbound messages
    /// on the calling thread until the connection ends.
    ///
    /// Returns `Err` only when connecting or pairing fails; once paired,
    /// the end of the stream is reported through
    /// [`PluginEventHandler::on_disconnected`] and the call returns `Ok`.
    pub fn connect_pair_and_listen(
        &mut self,
        handler: &mut dyn PluginEventHandler,
    ) -> ClientResult<()> {
        self.connect_and_pair()?;
        self.listen(handler)
    }

    /// Open the transport and send the pairing handshake.
    ///
    /// On success the client is paired; send operations work from here
    /// on, and [`listen`](Self::listen) consumes the inbound stream.
    pub fn connect_and_pair(&mut self) -> ClientResult<()> {
        self.state = ConnectionState::Connecting;
        tracing::info!("connecting to host at {}", self.address);

        let mut connection = match Connection::open(&self.address) {
            Ok(connection) => connection,
            Err(error) => {
                self.state = ConnectionState::Disconnected;
                return Err(error);
            }
        };

        let pair = OutboundMessage::Pair { id: self.descriptor.id.clone() };
        if let Err(error) = connection.send(&pair) {
            self.state = ConnectionState::Disconnected;
            return Err(ClientError::HandshakeFailed(error.to_string()));
        }
        tracing::info!("pairing message sent");

        self.connection = Some(connection);
        self.state = ConnectionState::Paired;
        Ok(())
    }

    /// Block on the inbound stream until the connection ends, then fire
    /// [`PluginEventHandler::on_disconnected`] exactly once.
    pub fn listen(&mut self, handler: &mut dyn PluginEventHandler) -> ClientResult<()> {
        if self.connection.is_none() {
            return Err(ClientError::NotConnected);
        }
        let cause = self.receive_loop(handler);
        self.disconnect();
        self.executor.shutdown();
        handler.on_disconnected(cause.as_ref());
        Ok(())
    }

    /// Receive loop. Returns the error that ended it, or `None` for a
    /// clean close (EOF or a close request from the host).
    fn receive_loop(&mut self, handler: &mut dyn PluginEventHandler) -> Option<ClientError> {
        loop {
            let line = match self.connection.as_mut() {
                Some(connection) => connection.read_line(),
                None => return None,
            };
            match line {
                Ok(Some(line)) => {
                    if let LoopControl::Close = self.handle_line(&line, handler) {
                        tracing::info!("close requested by host");
                        return None;
                    }
                }
                Ok(None) => {
                    tracing::info!("host closed the connection");
                    return None;
                }
                Err(error) => {
                    tracing::warn!("transport error: {}", error);
                    return Some(error);
                }
            }
        }
    }

    /// Route one inbound line. Exactly one handler fires per recognized
    /// message; malformed or unknown input is dropped silently.
    fn handle_line(&mut self, line: &str, handler: &mut dyn PluginEventHandler) -> LoopControl {
        if line.is_empty() {
            return LoopControl::Continue;
        }
        let message = match InboundMessage::parse(line) {
            Ok(message) => message,
            Err(error) => {
                tracing::trace!("dropping malformed message: {}", error);
                return LoopControl::Continue;
            }
        };

        match message {
            InboundMessage::ClosePlugin(_) => return LoopControl::Close,
            InboundMessage::Info(info) => {
                self.settings.lock().extend(info.settings.clone());
                self.host_info = Some(info.clone());
                handler.on_info(&info);
            }
            InboundMessage::Settings(settings) => {
                self.settings.lock().extend(settings.values.clone());
                handler.on_settings(&settings);
            }
            InboundMessage::ListChange(change) => handler.on_list_changed(&change),
            InboundMessage::Broadcast(broadcast) => handler.on_broadcast(&broadcast),
            InboundMessage::NotificationOptionClicked(clicked) => {
                handler.on_notification_option_clicked(&clicked);
            }
            InboundMessage::Action(action) => self.handle_action(line, action, None, handler),
            InboundMessage::HoldDown(action) => {
                self.handle_action(line, action, Some(true), handler);
            }
            InboundMessage::HoldUp(action) => {
                self.handle_action(line, action, Some(false), handler);
            }
            InboundMessage::Unknown => {
                tracing::trace!("ignoring unrecognized message kind");
            }
        }
        LoopControl::Continue
    }

    /// Dispatch an action invocation to its registered callback, or fall
    /// back to `on_received` when none is registered.
    fn handle_action(
        &mut self,
        line: &str,
        action: crate::protocol::ActionMessage,
        held: Option<bool>,
        handler: &mut dyn PluginEventHandler,
    ) {
        // Action messages addressed to a different plugin are not ours.
        if let Some(ref plugin_id) = action.plugin_id {
            if plugin_id != &self.descriptor.id {
                tracing::trace!("ignoring action for plugin {}", plugin_id);
                return;
            }
        }

        match self.registry.resolve(&action, held) {
            Some((callback, context)) => {
                if let Some(down) = held {
                    self.held_actions.lock().insert(action.action_id.clone(), down);
                }
                let wrapped = self.wrap_with_hold_cleanup(callback, held);
                self.executor.execute(wrapped, context);
            }
            None => {
                if let Ok(raw) = serde_json::from_str::<Value>(line) {
                    handler.on_received(&raw);
                }
            }
        }
    }

    /// Clear the hold entry once a press or release callback finishes, so
    /// `is_held` goes back to `None`.
    fn wrap_with_hold_cleanup(
        &self,
        callback: ActionCallback,
        held: Option<bool>,
    ) -> ActionCallback {
        let held_actions = Arc::clone(&self.held_actions);
        Arc::new(move |context: ActionContext| {
            let action_id = context.action_id.clone();
            callback(context);
            if held != Some(true) {
                held_actions.lock().remove(&action_id);
            }
        })
    }

    /// Tear down the socket and reset the state machine.
    fn disconnect(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            connection.shutdown();
        }
        self.state = ConnectionState::Disconnected;
    }

    // ------------------------------------------------------------------
    // Send-side operations
    // ------------------------------------------------------------------

    fn send(&mut self, message: &OutboundMessage) -> ClientResult<()> {
        let connection = self.connection.as_mut().ok_or(ClientError::NotConnected)?;
        connection.send(message)
    }

    /// Update a state value. Skipped (returns `Ok(false)`) when the value
    /// is unchanged since the last send.
    pub fn send_state_update(
        &mut self,
        state_id: &str,
        value: impl Into<String>,
    ) -> ClientResult<bool> {
        let value = value.into();
        if self.current_states.get(state_id) == Some(&value) {
            return Ok(false);
        }
        self.send(&OutboundMessage::StateUpdate {
            id: state_id.to_string(),
            value: value.clone(),
        })?;
        self.current_states.insert(state_id.to_string(), value);
        Ok(true)
    }

    /// Create a state at runtime. Falls back to a plain state update when
    /// the state already exists.
    pub fn send_create_state(
        &mut self,
        state_id: &str,
        description: &str,
        default_value: impl Into<String>,
        parent_group: Option<&str>,
    ) -> ClientResult<bool> {
        let value = default_value.into();
        if self.current_states.contains_key(state_id) {
            return self.send_state_update(state_id, value);
        }
        self.send(&OutboundMessage::CreateState {
            id: state_id.to_string(),
            desc: description.to_string(),
            default_value: value.clone(),
            parent_group: parent_group.map(str::to_string),
        })?;
        self.current_states.insert(state_id.to_string(), value);
        Ok(true)
    }

    /// Remove a previously created state.
    pub fn send_remove_state(&mut self, state_id: &str) -> ClientResult<()> {
        self.send(&OutboundMessage::RemoveState { id: state_id.to_string() })?;
        self.current_states.remove(state_id);
        Ok(())
    }

    /// Replace the values of a choice list. Skipped when unchanged.
    pub fn send_choice_update(
        &mut self,
        list_id: &str,
        values: Vec<String>,
    ) -> ClientResult<bool> {
        if self.current_choices.get(list_id) == Some(&values) {
            return Ok(false);
        }
        self.send(&OutboundMessage::ChoiceUpdate {
            id: list_id.to_string(),
            instance_id: None,
            value: values.clone(),
        })?;
        self.current_choices.insert(list_id.to_string(), values);
        Ok(true)
    }

    /// Replace the values of a choice list for one specific UI instance.
    pub fn send_specific_choice_update(
        &mut self,
        list_id: &str,
        instance_id: &str,
        values: Vec<String>,
    ) -> ClientResult<bool> {
        let key = format!("{list_id}:{instance_id}");
        if self.current_choices.get(&key) == Some(&values) {
            return Ok(false);
        }
        self.send(&OutboundMessage::ChoiceUpdate {
            id: list_id.to_string(),
            instance_id: Some(instance_id.to_string()),
            value: values.clone(),
        })?;
        self.current_choices.insert(key, values);
        Ok(true)
    }

    /// Update one of the plugin's own settings. Only settings the host
    /// knows about are sent, and only when the value actually changes.
    pub fn send_setting_update(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> ClientResult<bool> {
        let value = value.into();
        {
            let settings = self.settings.lock();
            match settings.get(name) {
                Some(current) if current != &value => {}
                _ => return Ok(false),
            }
        }
        self.send(&OutboundMessage::SettingUpdate {
            name: name.to_string(),
            value: value.clone(),
        })?;
        self.settings.lock().insert(name.to_string(), value);
        Ok(true)
    }

    /// Show a notification in the host UI. The host requires at least one
    /// clickable option.
    pub fn send_show_notification(
        &mut self,
        notification_id: &str,
        title: &str,
        msg: &str,
        options: Vec<NotificationOption>,
    ) -> ClientResult<bool> {
        if options.is_empty() {
            return Ok(false);
        }
        self.send(&OutboundMessage::ShowNotification {
            notification_id: notification_id.to_string(),
            title: title.to_string(),
            msg: msg.to_string(),
            options,
        })?;
        Ok(true)
    }
}
