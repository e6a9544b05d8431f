use desk_chat::app::{App, ChatMessage, FetchOp, Role};

mod support;

use support::HostSpy;

fn app_with_active_session(session_id: &str) -> App {
    let mut app = App::new();
    app.active_session_id = Some(session_id.to_string());
    app
}

#[test]
fn optimistic_echo_is_visible_before_the_turn_resolves() {
    let mut app = app_with_active_session("s-1");
    let mut host = HostSpy::new();
    app.on_composer_replace("Restock X".to_string());

    app.on_submit(&mut host);

    // Echo appended and composer cleared, with the reply still outstanding.
    assert_eq!(app.composer, "");
    assert_eq!(app.messages.len(), 1);
    assert_eq!(app.messages[0], ChatMessage::echo("Restock X"));
    assert_eq!(app.pending_turn_count(), 1);
    assert!(host.render_requests > 0);
    assert_eq!(host.stop_requests, 0);
}

#[test]
fn successful_send_appends_exactly_user_then_assistant() {
    let mut app = app_with_active_session("s-1");
    let mut host = HostSpy::new();
    app.on_composer_replace("Restock X".to_string());

    app.on_submit(&mut host);
    let seq = host.last_seq();
    app.on_reply_received(&mut host, seq, "s-1", "Restocked by 10.");

    assert_eq!(app.messages.len(), 2);
    assert_eq!(app.messages[0].role, Role::User);
    assert_eq!(app.messages[0].content, "Restock X");
    assert!(!app.messages[0].pending);
    assert_eq!(app.messages[1].role, Role::Assistant);
    assert_eq!(app.messages[1].content, "Restocked by 10.");
    assert_eq!(app.composer, "");
    assert_eq!(app.pending_turn_count(), 0);
}

#[test]
fn blank_submit_is_a_noop_with_composer_preserved() {
    let mut app = app_with_active_session("s-1");
    let mut host = HostSpy::new();
    app.on_composer_replace("   ".to_string());

    app.on_submit(&mut host);

    assert_eq!(app.composer, "   ");
    assert!(app.messages.is_empty());
    assert!(host.calls.is_empty());
}

#[test]
fn submit_without_active_session_changes_nothing() {
    let mut app = App::new();
    let mut host = HostSpy::new();
    app.on_composer_replace("Restock X".to_string());

    let before = app.clone();
    app.on_submit(&mut host);

    assert_eq!(app, before);
    assert!(host.calls.is_empty());
}

#[test]
fn failed_turn_keeps_echo_appends_nothing_and_sets_notice() {
    let mut app = app_with_active_session("s-1");
    let mut host = HostSpy::new();
    app.on_composer_replace("Restock X".to_string());

    app.on_submit(&mut host);
    app.on_fetch_failed(host.last_seq(), FetchOp::ChatTurn, "connection refused");

    assert_eq!(app.messages.len(), 1);
    assert!(app.messages[0].pending);
    assert_eq!(app.composer, "");
    assert_eq!(app.pending_turn_count(), 0);
    assert_eq!(
        app.notice.as_deref(),
        Some("Chat turn failed: connection refused")
    );
}

#[test]
fn overlapping_sends_resolve_independently_in_arrival_order() {
    let mut app = app_with_active_session("s-1");
    let mut host = HostSpy::new();

    app.on_composer_replace("first".to_string());
    app.on_submit(&mut host);
    let first_seq = host.last_seq();

    app.on_composer_replace("second".to_string());
    app.on_submit(&mut host);
    let second_seq = host.last_seq();

    assert_eq!(app.pending_turn_count(), 2);

    // The second turn's reply lands first; nothing serializes them.
    app.on_reply_received(&mut host, second_seq, "s-1", "reply two");
    app.on_reply_received(&mut host, first_seq, "s-1", "reply one");

    let contents: Vec<&str> = app
        .messages
        .iter()
        .map(|message| message.content.as_str())
        .collect();
    assert_eq!(contents, vec!["first", "second", "reply two", "reply one"]);
    assert!(app.messages.iter().all(|message| !message.pending));
    assert_eq!(app.pending_turn_count(), 0);
}

#[test]
fn send_refreshes_roster_after_reply() {
    let mut app = app_with_active_session("s-1");
    let mut host = HostSpy::new();
    app.on_composer_replace("hello".to_string());

    app.on_submit(&mut host);
    let seq = host.last_seq();
    app.on_reply_received(&mut host, seq, "s-1", "hi");

    assert_eq!(
        host.calls,
        vec!["chat:s-1:hello".to_string(), "roster".to_string()]
    );
}

#[test]
fn send_with_visible_trace_also_refreshes_tool_calls() {
    let mut app = app_with_active_session("s-1");
    app.tool_trace_visible = true;
    let mut host = HostSpy::new();
    app.on_composer_replace("hello".to_string());

    app.on_submit(&mut host);
    app.on_reply_received(&mut host, 1, "s-1", "hi");

    assert_eq!(
        host.calls,
        vec![
            "chat:s-1:hello".to_string(),
            "roster".to_string(),
            "tool-calls:s-1".to_string(),
        ]
    );
}
