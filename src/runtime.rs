use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use desk_api::{MessageRecord, SessionRecord, ToolCallRecord};

use crate::app::{App, FetchOp, FetchSeq, HostOps};
use crate::backend::ChatTransport;

/// Completion of one fetch, delivered from a worker thread to the UI loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    RosterLoaded {
        seq: FetchSeq,
        sessions: Vec<SessionRecord>,
    },
    SessionCreated {
        seq: FetchSeq,
        session: SessionRecord,
    },
    MessagesLoaded {
        seq: FetchSeq,
        session_id: String,
        records: Vec<MessageRecord>,
    },
    ReplyReceived {
        seq: FetchSeq,
        session_id: String,
        reply: String,
    },
    ToolCallsLoaded {
        seq: FetchSeq,
        session_id: String,
        records: Vec<ToolCallRecord>,
    },
    FetchFailed {
        seq: FetchSeq,
        op: FetchOp,
        error: String,
    },
}

/// Runs transport calls off the UI thread and feeds completions back.
///
/// Workers are fire-and-forget: nothing joins them and nothing aborts them.
/// An in-flight call that has been superseded still completes; its event is
/// applied through `App`'s seq guards, which discard it. The UI thread is
/// the only mutator of `App`.
pub struct SyncController {
    app: Arc<Mutex<App>>,
    transport: Arc<dyn ChatTransport>,
    pending_events: Mutex<VecDeque<SyncEvent>>,
    next_seq: AtomicU64,
    render_needed: AtomicBool,
    stop_requested: AtomicBool,
}

impl SyncController {
    pub fn new(app: Arc<Mutex<App>>, transport: Arc<dyn ChatTransport>) -> Arc<Self> {
        Arc::new(Self {
            app,
            transport,
            pending_events: Mutex::new(VecDeque::new()),
            next_seq: AtomicU64::new(1),
            render_needed: AtomicBool::new(true),
            stop_requested: AtomicBool::new(false),
        })
    }

    pub fn lock_app(&self) -> MutexGuard<'_, App> {
        lock_unpoisoned(&self.app)
    }

    #[must_use]
    pub fn snapshot(&self) -> App {
        self.lock_app().clone()
    }

    #[must_use]
    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    /// Returns and clears the render request flag.
    pub fn take_render_request(&self) -> bool {
        self.render_needed.swap(false, Ordering::SeqCst)
    }

    /// Drains queued fetch completions into `App`.
    ///
    /// Call this from the UI loop every tick; workers only enqueue. Returns
    /// the number of events applied.
    pub fn flush_pending_events(self: &Arc<Self>) -> usize {
        let mut drained = 0usize;

        loop {
            let event = {
                let mut pending_events = lock_unpoisoned(&self.pending_events);
                pending_events.pop_front()
            };

            match event {
                Some(event) => {
                    self.apply_event(event);
                    drained += 1;
                }
                None => break,
            }
        }

        if drained > 0 {
            self.render_needed.store(true, Ordering::SeqCst);
        }

        drained
    }

    fn apply_event(self: &Arc<Self>, event: SyncEvent) {
        let mut host = Arc::clone(self);
        let mut app = lock_unpoisoned(&self.app);

        match event {
            SyncEvent::RosterLoaded { seq, sessions } => app.on_roster_loaded(seq, sessions),
            SyncEvent::SessionCreated { seq, session } => {
                app.on_session_created(&mut host, seq, session);
            }
            SyncEvent::MessagesLoaded {
                seq,
                session_id,
                records,
            } => app.on_messages_loaded(seq, &session_id, records),
            SyncEvent::ReplyReceived {
                seq,
                session_id,
                reply,
            } => app.on_reply_received(&mut host, seq, &session_id, &reply),
            SyncEvent::ToolCallsLoaded {
                seq,
                session_id,
                records,
            } => app.on_tool_calls_loaded(seq, &session_id, records),
            SyncEvent::FetchFailed { seq, op, error } => app.on_fetch_failed(seq, op, &error),
        }
    }

    fn enqueue_event(&self, event: SyncEvent) {
        let mut pending_events = lock_unpoisoned(&self.pending_events);
        pending_events.push_back(event);
    }

    fn start_worker(
        self: &Arc<Self>,
        op: FetchOp,
        job: impl FnOnce(&dyn ChatTransport, FetchSeq) -> SyncEvent + Send + 'static,
    ) -> Result<FetchSeq, String> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let controller = Arc::clone(self);

        thread::Builder::new()
            .name(format!("desk-chat-{}-{seq}", worker_name(op)))
            .spawn(move || {
                let event = job(controller.transport.as_ref(), seq);
                controller.enqueue_event(event);
            })
            .map_err(|error| format!("Failed to spawn fetch worker: {error}"))?;

        Ok(seq)
    }
}

impl HostOps for Arc<SyncController> {
    fn start_roster_fetch(&mut self) -> Result<FetchSeq, String> {
        self.start_worker(FetchOp::Roster, |transport, seq| {
            match transport.list_sessions() {
                Ok(sessions) => SyncEvent::RosterLoaded { seq, sessions },
                Err(error) => failure(seq, FetchOp::Roster, error),
            }
        })
    }

    fn start_session_create(&mut self) -> Result<FetchSeq, String> {
        self.start_worker(FetchOp::CreateSession, |transport, seq| {
            match transport.create_session() {
                Ok(session) => SyncEvent::SessionCreated { seq, session },
                Err(error) => failure(seq, FetchOp::CreateSession, error),
            }
        })
    }

    fn start_messages_fetch(&mut self, session_id: &str) -> Result<FetchSeq, String> {
        let session_id = session_id.to_string();
        self.start_worker(FetchOp::Messages, move |transport, seq| {
            match transport.fetch_messages(&session_id) {
                Ok(records) => SyncEvent::MessagesLoaded {
                    seq,
                    session_id,
                    records,
                },
                Err(error) => failure(seq, FetchOp::Messages, error),
            }
        })
    }

    fn start_chat_turn(&mut self, session_id: &str, text: &str) -> Result<FetchSeq, String> {
        let session_id = session_id.to_string();
        let text = text.to_string();
        self.start_worker(FetchOp::ChatTurn, move |transport, seq| {
            match transport.send_chat_turn(&session_id, &text) {
                Ok(reply) => SyncEvent::ReplyReceived {
                    seq,
                    session_id,
                    reply,
                },
                Err(error) => failure(seq, FetchOp::ChatTurn, error),
            }
        })
    }

    fn start_tool_calls_fetch(&mut self, session_id: &str) -> Result<FetchSeq, String> {
        let session_id = session_id.to_string();
        self.start_worker(FetchOp::ToolCalls, move |transport, seq| {
            match transport.fetch_tool_calls(&session_id) {
                Ok(records) => SyncEvent::ToolCallsLoaded {
                    seq,
                    session_id,
                    records,
                },
                Err(error) => failure(seq, FetchOp::ToolCalls, error),
            }
        })
    }

    fn request_render(&mut self) {
        self.render_needed.store(true, Ordering::SeqCst);
    }

    fn request_stop(&mut self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }
}

fn failure(seq: FetchSeq, op: FetchOp, error: String) -> SyncEvent {
    SyncEvent::FetchFailed { seq, op, error }
}

fn worker_name(op: FetchOp) -> &'static str {
    match op {
        FetchOp::Roster => "roster",
        FetchOp::CreateSession => "create",
        FetchOp::Messages => "messages",
        FetchOp::ChatTurn => "chat",
        FetchOp::ToolCalls => "tool-calls",
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
