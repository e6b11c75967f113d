//! Process-wide chat state (the user roster) and the single-task actor
//! that owns it.
//!
//! Every chat-state mutation has to happen on one serialized control
//! path, or two sessions racing a rename/report/ban could leave the
//! roster inconsistent. Rather than wrapping the roster in a `Mutex`
//! shared across connection tasks, we run it as a single actor task that owns
//! `Roster` outright and processes one [`ActorMessage`] at a time from an
//! mpsc queue — the idiomatic async-Rust rendition of "single-threaded
//! cooperative event loop". This generalizes the teacher crate's
//! `EventBus` (`src/events.rs`, a `tokio::sync::broadcast` fan-out) from
//! "one event type, many subscribers" into "one command queue, one
//! owner".

use std::collections::HashSet;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::cancel::CancelToken;
use crate::config::Config;
use crate::history::BoundedHistory;
use crate::session::{Session, SessionId};

/// Requests the connection layer (module G) sends into the roster actor.
pub enum ActorMessage {
    /// A new connection has been accepted; register it and reply with
    /// its assigned [`SessionId`].
    Connect {
        peer: String,
        outgoing: UnboundedSender<String>,
        reply: oneshot::Sender<SessionId>,
    },
    /// One inbound line from an already-connected session.
    Line { id: SessionId, line: String },
    /// The connection loop for `id` has ended; tear the session down.
    Disconnect { id: SessionId },
    /// A delayed SEND's timer has elapsed and hopped back onto the actor.
    DelayedFire {
        id: SessionId,
        token: CancelToken,
        message: String,
        recipient: Option<String>,
    },
}

/// A cloneable front door to the roster actor; connection tasks hold one
/// of these, never the `Roster` itself.
#[derive(Clone)]
pub struct RosterHandle {
    tx: UnboundedSender<ActorMessage>,
}

impl RosterHandle {
    pub async fn connect(&self, peer: String, outgoing: UnboundedSender<String>) -> SessionId {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(ActorMessage::Connect {
            peer,
            outgoing,
            reply,
        });
        rx.await.expect("roster actor dropped reply channel")
    }

    pub fn line(&self, id: SessionId, line: String) {
        let _ = self.tx.send(ActorMessage::Line { id, line });
    }

    pub fn disconnect(&self, id: SessionId) {
        let _ = self.tx.send(ActorMessage::Disconnect { id });
    }
}

/// Spawns the roster actor task and returns a handle to it.
pub fn spawn(config: Config) -> RosterHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = RosterHandle { tx: tx.clone() };
    tokio::spawn(run(Roster::new(config, tx), rx));
    handle
}

async fn run(mut roster: Roster, mut rx: UnboundedReceiver<ActorMessage>) {
    while let Some(msg) = rx.recv().await {
        match msg {
            ActorMessage::Connect {
                peer,
                outgoing,
                reply,
            } => {
                let id = roster.accept(peer, outgoing);
                let _ = reply.send(id);
            }
            ActorMessage::Line { id, line } => roster.handle_line(id, line),
            ActorMessage::Disconnect { id } => roster.teardown(id),
            ActorMessage::DelayedFire {
                id,
                token,
                message,
                recipient,
            } => roster.fire_delayed(id, token, message, recipient),
        }
    }
    warn!("roster actor channel closed, exiting");
}

/// Process-wide chat state: the user roster, room history, and the
/// default-name counter. Every field here is mutated only from the
/// actor task in `run` above.
pub struct Roster {
    pub(crate) config: Config,
    pub(crate) users: Vec<Session>,
    pub(crate) room_history: BoundedHistory,
    name_counter: u64,
    next_session_id: SessionId,
    pub(crate) self_tx: UnboundedSender<ActorMessage>,
}

impl Roster {
    fn new(config: Config, self_tx: UnboundedSender<ActorMessage>) -> Self {
        let history_size = config.history_size;
        Roster {
            config,
            users: Vec::new(),
            room_history: BoundedHistory::new(history_size),
            name_counter: 1,
            next_session_id: 1,
            self_tx,
        }
    }

    fn accept(&mut self, peer: String, outgoing: UnboundedSender<String>) -> SessionId {
        let id = self.next_session_id;
        self.next_session_id += 1;

        let name = format!("{}_{}", self.config.default_name, self.name_counter);
        self.name_counter += 1;

        let history_size = self.config.history_size;
        let mut history = BoundedHistory::new(history_size);
        for line in self.room_history.snapshot() {
            history.add(line);
        }

        info!(session = id, %peer, %name, "accepted connection");

        self.users.push(Session {
            id,
            peer,
            name,
            history,
            pending_delays: Vec::new(),
            reporters: HashSet::new(),
            ban_until: None,
            spam_window_end: None,
            spam_count: 0,
            outgoing,
        });
        id
    }

    /// Session teardown: cancels every pending delayed SEND, removes the
    /// session from the roster, scrubs it out of every other session's
    /// `reporters` so a disconnected user can never be counted toward a
    /// ban, and broadcasts the departure.
    fn teardown(&mut self, id: SessionId) {
        let Some(pos) = self.users.iter().position(|s| s.id == id) else {
            return;
        };
        let session = self.users.remove(pos);
        for token in &session.pending_delays {
            token.cancel();
        }
        for other in &mut self.users {
            other.reporters.remove(&id);
        }
        info!(session = id, name = %session.name, "disconnected");
        let line = self.timestamped(&format!("{} left the chat", session.name));
        self.broadcast_line(&line, None, false);
    }

    fn fire_delayed(
        &mut self,
        id: SessionId,
        token: CancelToken,
        message: String,
        recipient: Option<String>,
    ) {
        let Some(session) = self.session_mut(id) else {
            return;
        };
        session.pending_delays.retain(|t| t != &token);
        let was_active = token.is_active();
        token.complete();
        if was_active {
            self.handle_send(id, message, recipient, 0);
        }
    }

    pub(crate) fn session(&self, id: SessionId) -> Option<&Session> {
        self.users.iter().find(|s| s.id == id)
    }

    pub(crate) fn session_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.users.iter_mut().find(|s| s.id == id)
    }

    pub(crate) fn find_by_name(&self, name: &str) -> Option<SessionId> {
        self.users.iter().find(|s| s.name == name).map(|s| s.id)
    }

    pub(crate) fn timestamped(&self, text: &str) -> String {
        format!("{} {}", now_str(), text)
    }

    /// Writes `line` verbatim (no timestamp added) to every connected
    /// session except `exclude`, optionally appending it to each
    /// recipient's personal history. This is the roster's broadcast
    /// primitive.
    pub(crate) fn broadcast_line(
        &mut self,
        line: &str,
        exclude: Option<SessionId>,
        add_to_history: bool,
    ) {
        let ids: Vec<SessionId> = self.users.iter().map(|s| s.id).collect();
        for uid in ids {
            if Some(uid) == exclude {
                continue;
            }
            self.deliver_timestamped(uid, line, add_to_history);
        }
    }

    /// Writes a precomputed, already-framed `line` to a single session.
    pub(crate) fn deliver_timestamped(&mut self, id: SessionId, line: &str, add_to_history: bool) {
        if let Some(session) = self.session_mut(id) {
            if add_to_history {
                session.history.add(line.to_string());
            }
            let _ = session.outgoing.send(line.to_string());
        }
    }

    /// Sends `text` to `id` with a leading timestamp, matching
    /// `_send_message`'s default `show_time=True`.
    pub(crate) fn reply(&mut self, id: SessionId, text: impl Into<String>) {
        let line = self.timestamped(&text.into());
        self.deliver_timestamped(id, &line, false);
    }

    /// Sends `text` to `id` verbatim, matching `_send_message(...,
    /// show_time=False)` call sites (error replies that quote a
    /// user-supplied name, and history/system-block replays).
    pub(crate) fn reply_notime(&mut self, id: SessionId, text: impl Into<String>) {
        let text = text.into();
        self.deliver_timestamped(id, &text, false);
    }

    /// Formats a `*** NAME ***` system block, used by USERS and HISTORY.
    pub(crate) fn system_block(name: &str, items: &[String]) -> String {
        let mut body = format!("*** {name} ***\n");
        if items.is_empty() {
            body.push_str("EMPTY");
        } else {
            body.push_str(&items.join("\n"));
        }
        body
    }

    pub(crate) fn schedule_delayed_fire(
        &self,
        delay_secs: u64,
        id: SessionId,
        token: CancelToken,
        message: String,
        recipient: Option<String>,
    ) {
        let tx = self.self_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(delay_secs)).await;
            let _ = tx.send(ActorMessage::DelayedFire {
                id,
                token,
                message,
                recipient,
            });
        });
    }
}

/// Renders local time as `[YYYY-MM-DD HH:MM:SS]`, exact format confirmed
/// against `_time_to_str` in `examples/original_source/server.py`.
pub(crate) fn now_str() -> String {
    format_ts(chrono::Local::now())
}

pub(crate) fn format_ts(t: chrono::DateTime<chrono::Local>) -> String {
    format!("[{}]", t.format("%Y-%m-%d %H:%M:%S"))
}
