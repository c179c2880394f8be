//! Client Integration Tests
//!
//! Runs the plugin client against a scripted in-process host socket and
//! verifies the handshake, dispatch, and disconnect behavior.

use std::io::{BufRead, BufReader, Write};
use std::net::{Shutdown, TcpListener};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use hostlink::{
    Action, Category, ClientError, DataField, NoopHandler, PluginClient, PluginDescriptor,
    PluginEventHandler, Setting,
};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Scripted host: accepts one connection, reads the pairing line, writes the
/// given lines, then closes. Returns every line the plugin sent.
fn scripted_host(lines: Vec<String>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap().to_string();

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut received = Vec::new();

        let mut pair_line = String::new();
        reader.read_line(&mut pair_line).unwrap();
        received.push(pair_line.trim_end().to_string());

        let mut writer = stream;
        for line in lines {
            writeln!(writer, "{line}").unwrap();
        }
        writer.flush().unwrap();
        // Half-close so the plugin sees EOF while we can still read what
        // it sends back.
        writer.shutdown(Shutdown::Write).unwrap();

        for line in reader.lines() {
            match line {
                Ok(line) => received.push(line),
                Err(_) => break,
            }
        }
        received
    });

    (address, handle)
}

fn descriptor() -> PluginDescriptor {
    PluginDescriptor::builder("com.example.sample", "Sample Plugin")
        .category(
            Category::new("base", "Base")
                .with_action(Action::new("action_simple", "Simple"))
                .with_action(
                    Action::new("action_with_text", "With Text")
                        .with_data(DataField::text("text", "Text")),
                )
                .with_action(Action::new("action_hold", "Hold").holdable()),
        )
        .setting(Setting::new("IP", "localhost"))
        .build()
        .unwrap()
}

/// Handler that records every lifecycle event it sees.
#[derive(Default)]
struct RecordingHandler {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingHandler {
    fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

impl PluginEventHandler for RecordingHandler {
    fn on_info(&mut self, info: &hostlink::protocol::InfoMessage) {
        self.events.lock().push(format!("info:{}", info.status.clone().unwrap_or_default()));
    }

    fn on_list_changed(&mut self, change: &hostlink::protocol::ListChangeMessage) {
        self.events.lock().push(format!("list:{}={}", change.list_id, change.value));
    }

    fn on_broadcast(&mut self, broadcast: &hostlink::protocol::BroadcastMessage) {
        self.events.lock().push(format!("broadcast:{}", broadcast.event));
    }

    fn on_settings(&mut self, settings: &hostlink::protocol::SettingsMessage) {
        let mut names: Vec<_> = settings.values.keys().cloned().collect();
        names.sort();
        self.events.lock().push(format!("settings:{}", names.join(",")));
    }

    fn on_notification_option_clicked(
        &mut self,
        clicked: &hostlink::protocol::NotificationOptionClickedMessage,
    ) {
        self.events.lock().push(format!("clicked:{}", clicked.option_id));
    }

    fn on_received(&mut self, message: &serde_json::Value) {
        let kind = message.get("type").and_then(|t| t.as_str()).unwrap_or("?");
        self.events.lock().push(format!("received:{kind}"));
    }

    fn on_disconnected(&mut self, cause: Option<&ClientError>) {
        match cause {
            Some(cause) => self.events.lock().push(format!("disconnected:{cause}")),
            None => self.events.lock().push("disconnected:clean".to_string()),
        }
    }
}

// ============================================================================
// Handshake Tests
// ============================================================================

#[test]
fn test_pairing_line_is_sent_on_connect() {
    let (address, host) = scripted_host(vec![]);

    let mut client = PluginClient::new(descriptor(), false).with_address(address);
    client.connect_pair_and_listen(&mut NoopHandler).unwrap();

    let received = host.join().unwrap();
    assert_eq!(received[0], r#"{"type":"pair","id":"com.example.sample"}"#);
}

#[test]
fn test_connect_to_unreachable_host_fails() {
    let mut client = PluginClient::new(descriptor(), false).with_address("127.0.0.1:1");
    let error = client.connect_pair_and_listen(&mut NoopHandler).unwrap_err();
    assert!(matches!(error, ClientError::ConnectFailed { .. }));
}

#[test]
fn test_listen_without_connection_fails() {
    let mut client = PluginClient::new(descriptor(), false);
    assert!(matches!(
        client.listen(&mut NoopHandler),
        Err(ClientError::NotConnected)
    ));
}

// ============================================================================
// Dispatch Tests
// ============================================================================

#[test]
fn test_action_callback_receives_data() {
    let (address, host) = scripted_host(vec![
        r#"{"type":"action","pluginId":"com.example.sample","actionId":"action_with_text","data":[{"id":"text","value":"hello"}]}"#.to_string(),
    ]);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut client = PluginClient::new(descriptor(), false).with_address(address);
    {
        let seen = Arc::clone(&seen);
        client
            .on_action("action_with_text", move |ctx| {
                seen.lock().push(ctx.data_value("text").unwrap_or("").to_string());
            })
            .unwrap();
    }

    // listen() joins the callback workers before returning, so everything
    // dispatched has run by the time it comes back.
    client.connect_pair_and_listen(&mut NoopHandler).unwrap();
    host.join().unwrap();

    assert_eq!(seen.lock().clone(), vec!["hello".to_string()]);
}

#[test]
fn test_action_for_another_plugin_is_ignored() {
    let (address, host) = scripted_host(vec![
        r#"{"type":"action","pluginId":"com.other.plugin","actionId":"action_simple"}"#.to_string(),
    ]);

    let seen = Arc::new(Mutex::new(0usize));
    let mut client = PluginClient::new(descriptor(), false).with_address(address);
    {
        let seen = Arc::clone(&seen);
        client
            .on_action("action_simple", move |_| {
                *seen.lock() += 1;
            })
            .unwrap();
    }

    let mut handler = RecordingHandler::default();
    client.connect_pair_and_listen(&mut handler).unwrap();
    host.join().unwrap();

    assert_eq!(*seen.lock(), 0);
    assert_eq!(handler.events(), vec!["disconnected:clean".to_string()]);
}

#[test]
fn test_action_without_callback_falls_back_to_on_received() {
    let (address, host) = scripted_host(vec![
        r#"{"type":"action","actionId":"action_simple"}"#.to_string(),
    ]);

    let mut client = PluginClient::new(descriptor(), false).with_address(address);
    let mut handler = RecordingHandler::default();
    client.connect_pair_and_listen(&mut handler).unwrap();
    host.join().unwrap();

    assert_eq!(
        handler.events(),
        vec!["received:action".to_string(), "disconnected:clean".to_string()]
    );
}

#[test]
fn test_hold_down_and_up_reach_the_callback() {
    let (address, host) = scripted_host(vec![
        r#"{"type":"down","actionId":"action_hold"}"#.to_string(),
        r#"{"type":"up","actionId":"action_hold"}"#.to_string(),
    ]);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut client = PluginClient::new(descriptor(), false).with_address(address);
    {
        let seen = Arc::clone(&seen);
        client
            .on_action("action_hold", move |ctx| {
                seen.lock().push(ctx.held);
            })
            .unwrap();
    }

    client.connect_pair_and_listen(&mut NoopHandler).unwrap();
    host.join().unwrap();

    assert_eq!(seen.lock().clone(), vec![Some(true), Some(false)]);
    // The hold entry is cleared once the release callback completes.
    assert_eq!(client.held_actions().is_held("action_hold"), None);
}

#[test]
fn test_lifecycle_messages_reach_the_handler_in_order() {
    let (address, host) = scripted_host(vec![
        r#"{"type":"info","sdkVersion":6,"status":"paired","settings":[{"IP":"localhost"}]}"#.to_string(),
        r#"{"type":"listChange","listId":"choices","value":"b"}"#.to_string(),
        r#"{"type":"broadcast","event":"pageChange","pageName":"(main)"}"#.to_string(),
        r#"{"type":"settings","values":[{"IP":"10.0.0.2"}]}"#.to_string(),
        r#"{"type":"notificationOptionClicked","notificationId":"n1","optionId":"ok"}"#.to_string(),
    ]);

    let mut client = PluginClient::new(descriptor(), false).with_address(address);
    let mut handler = RecordingHandler::default();
    client.connect_pair_and_listen(&mut handler).unwrap();
    host.join().unwrap();

    assert_eq!(
        handler.events(),
        vec![
            "info:paired".to_string(),
            "list:choices=b".to_string(),
            "broadcast:pageChange".to_string(),
            "settings:IP".to_string(),
            "clicked:ok".to_string(),
            "disconnected:clean".to_string(),
        ]
    );
    // Settings carried by info and settings messages land in the cache.
    assert_eq!(client.settings().get("IP").as_deref(), Some("10.0.0.2"));
}

#[test]
fn test_unknown_and_malformed_lines_are_tolerated() {
    let (address, host) = scripted_host(vec![
        r#"{"type":"somethingNew","payload":1}"#.to_string(),
        "not json at all".to_string(),
        String::new(),
        r#"{"type":"broadcast","event":"pageChange"}"#.to_string(),
    ]);

    let mut client = PluginClient::new(descriptor(), false).with_address(address);
    let mut handler = RecordingHandler::default();
    client.connect_pair_and_listen(&mut handler).unwrap();
    host.join().unwrap();

    assert_eq!(
        handler.events(),
        vec!["broadcast:pageChange".to_string(), "disconnected:clean".to_string()]
    );
}

// ============================================================================
// Disconnect Tests
// ============================================================================

#[test]
fn test_close_request_is_a_clean_disconnect() {
    let (address, host) = scripted_host(vec![
        r#"{"type":"closePlugin","pluginId":"com.example.sample"}"#.to_string(),
    ]);

    let mut client = PluginClient::new(descriptor(), false).with_address(address);
    let mut handler = RecordingHandler::default();
    client.connect_pair_and_listen(&mut handler).unwrap();
    host.join().unwrap();

    assert_eq!(handler.events(), vec!["disconnected:clean".to_string()]);
    assert!(!client.is_connected());
}

#[test]
fn test_eof_is_a_clean_disconnect() {
    let (address, host) = scripted_host(vec![]);

    let mut client = PluginClient::new(descriptor(), false).with_address(address);
    let mut handler = RecordingHandler::default();
    client.connect_pair_and_listen(&mut handler).unwrap();
    host.join().unwrap();

    assert_eq!(handler.events(), vec!["disconnected:clean".to_string()]);
}

// ============================================================================
// Send Tests
// ============================================================================

#[test]
fn test_sends_are_deduplicated() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap().to_string();

    let host = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let reader = BufReader::new(stream);
        reader.lines().map_while(Result::ok).collect::<Vec<_>>()
    });

    let mut client = PluginClient::new(descriptor(), false).with_address(address);
    client.connect_and_pair().unwrap();

    assert!(client.send_state_update("counter", "1").unwrap());
    assert!(!client.send_state_update("counter", "1").unwrap());
    assert!(client.send_state_update("counter", "2").unwrap());

    assert!(client.send_choice_update("choices", vec!["a".to_string()]).unwrap());
    assert!(!client.send_choice_update("choices", vec!["a".to_string()]).unwrap());

    // Creating a state that exists degrades to an update of its value.
    assert!(client.send_create_state("counter", "Counter", "3", None).unwrap());

    // Only declared, changed settings go out.
    assert!(client.send_setting_update("IP", "10.0.0.2").unwrap());
    assert!(!client.send_setting_update("IP", "10.0.0.2").unwrap());
    assert!(!client.send_setting_update("Undeclared", "x").unwrap());

    // Dropping the client closes the socket, ending the host's read loop.
    drop(client);
    let lines = host.join().unwrap();
    let expected = vec![
        r#"{"type":"pair","id":"com.example.sample"}"#,
        r#"{"type":"stateUpdate","id":"counter","value":"1"}"#,
        r#"{"type":"stateUpdate","id":"counter","value":"2"}"#,
        r#"{"type":"choiceUpdate","id":"choices","value":["a"]}"#,
        r#"{"type":"stateUpdate","id":"counter","value":"3"}"#,
        r#"{"type":"settingUpdate","name":"IP","value":"10.0.0.2"}"#,
    ];
    assert_eq!(lines, expected);
}
