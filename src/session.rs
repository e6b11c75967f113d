//! Per-connection mutable state.
//!
//! Ported from `examples/original_source/server.py`'s `UserData`
//! dataclass. `writer` is generalized from a raw socket handle to an
//! unbounded mpsc sender: the actual socket write loop lives in
//! `connection.rs` and drains the other end, which keeps every mutation
//! of chat state on the single roster-actor task while still letting
//! each connection own its own I/O.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Local};
use tokio::sync::mpsc::UnboundedSender;

use crate::cancel::CancelToken;
use crate::history::BoundedHistory;

/// Stable per-connection identifier, assigned by the roster actor.
/// Used instead of object identity so that `reporters` and
/// `pending_delays` never keep a disconnected session's state alive.
pub type SessionId = u64;

pub struct Session {
    pub id: SessionId,
    /// Opaque display string for logs, e.g. `127.0.0.1:54213`.
    pub peer: String,
    pub name: String,
    pub history: BoundedHistory,
    /// Stack of delayed-SEND tokens; CANCEL pops the most recent one.
    pub pending_delays: Vec<CancelToken>,
    /// Sessions (by id) that have reported this one. Cleared on ban.
    pub reporters: HashSet<SessionId>,
    pub ban_until: Option<DateTime<Local>>,
    pub spam_window_end: Option<DateTime<Local>>,
    pub spam_count: u32,
    pub outgoing: UnboundedSender<String>,
}

impl Session {
    pub fn is_banned(&self, now: DateTime<Local>) -> bool {
        self.ban_until.is_some_and(|until| until > now)
    }

    /// Increments the spam counter, resetting the window first if it has
    /// elapsed. Returns whether this send exceeds the limit. The counter
    /// is incremented unconditionally before the comparison, so a
    /// rejected message still counts toward the next period — preserved
    /// verbatim from the original.
    pub fn register_send_and_check_spam(&mut self, spam_period_secs: i64, limit: u32) -> bool {
        let now = Local::now();
        let window_elapsed = match self.spam_window_end {
            None => true,
            Some(end) => now > end,
        };
        if window_elapsed {
            self.spam_count = 0;
            self.spam_window_end = Some(now + chrono::Duration::seconds(spam_period_secs));
        }
        self.spam_count += 1;
        self.spam_count > limit
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("peer", &self.peer)
            .field("name", &self.name)
            .finish()
    }
}
