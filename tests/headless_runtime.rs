use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use desk_chat::app::{App, HostOps, Role};
use desk_chat::backends::MockTransport;
use desk_chat::runtime::SyncController;

fn controller_with_mock() -> Arc<SyncController> {
    let app = Arc::new(Mutex::new(App::new()));
    SyncController::new(app, Arc::new(MockTransport::default()))
}

fn dispatch(controller: &Arc<SyncController>, action: impl FnOnce(&mut App, &mut dyn HostOps)) {
    let mut host = Arc::clone(controller);
    let mut app = controller.lock_app();
    action(&mut app, &mut host);
}

/// Drives the controller's event pump until the predicate holds, the way
/// the UI loop would, bounded so a missed event fails fast.
fn wait_for(controller: &Arc<SyncController>, what: &str, predicate: impl Fn(&App) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);

    loop {
        controller.flush_pending_events();
        if predicate(&controller.snapshot()) {
            return;
        }

        if Instant::now() > deadline {
            panic!("timed out waiting for {what}");
        }

        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn create_select_flow_yields_active_session_with_empty_visible_log() {
    let controller = controller_with_mock();

    dispatch(&controller, |app, host| app.on_create_session(host));

    wait_for(&controller, "created session to settle", |app| {
        app.active_session_id.is_some() && !app.roster.is_empty() && !app.is_loading_messages()
    });

    let app = controller.snapshot();
    let active = app.active_session_id.expect("active session");
    assert_eq!(app.roster[0].session_id, active);
    // The mock seeds a system prompt; it must never reach the log.
    assert!(app.messages.is_empty());
}

#[test]
fn send_flow_confirms_echo_and_appends_reply() {
    let controller = controller_with_mock();

    dispatch(&controller, |app, host| app.on_create_session(host));
    wait_for(&controller, "session", |app| {
        app.active_session_id.is_some() && !app.is_loading_messages()
    });

    dispatch(&controller, |app, host| {
        app.on_composer_replace("Restock The Pragmatic Programmer by 10".to_string());
        app.on_submit(host);
    });

    {
        let app = controller.snapshot();
        assert_eq!(app.composer, "");
        assert_eq!(app.messages.len(), 1);
        assert!(app.messages[0].pending);
    }

    wait_for(&controller, "assistant reply", |app| app.messages.len() == 2);

    let app = controller.snapshot();
    assert_eq!(app.messages[0].role, Role::User);
    assert!(!app.messages[0].pending);
    assert_eq!(app.messages[1].role, Role::Assistant);
    assert!(!app.messages[1].content.is_empty());
    assert_eq!(app.pending_turn_count(), 0);

    wait_for(&controller, "roster refresh after reply", |app| {
        app.roster
            .first()
            .is_some_and(|session| session.last_time.is_some())
    });
}

#[test]
fn visible_trace_fills_after_a_turn() {
    let controller = controller_with_mock();

    dispatch(&controller, |app, host| {
        app.on_toggle_tool_trace(host);
        app.on_create_session(host);
    });
    wait_for(&controller, "session", |app| {
        app.active_session_id.is_some() && !app.is_loading_messages()
    });

    dispatch(&controller, |app, host| {
        app.on_composer_replace("check the catalog".to_string());
        app.on_submit(host);
    });

    wait_for(&controller, "tool trace", |app| !app.tool_trace.is_empty());

    let app = controller.snapshot();
    assert_eq!(app.tool_trace[0]["name"], "search_catalog");
}

#[test]
fn selecting_an_unknown_session_surfaces_a_notice() {
    let controller = controller_with_mock();

    dispatch(&controller, |app, host| app.on_select_session(host, "ghost"));

    wait_for(&controller, "failure notice", |app| {
        app.notice
            .as_deref()
            .is_some_and(|notice| notice.contains("unknown session 'ghost'"))
    });

    let app = controller.snapshot();
    assert_eq!(app.active_session_id.as_deref(), Some("ghost"));
    assert!(app.messages.is_empty());
}

#[test]
fn quit_requests_stop() {
    let controller = controller_with_mock();

    dispatch(&controller, |app, host| app.on_quit(host));

    let app = controller.snapshot();
    assert!(app.should_exit);
    assert!(controller.stop_requested());
}
