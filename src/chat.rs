//! Chat semantics: INTRODUCE, RENAME, USERS, SEND, CANCEL, HISTORY,
//! REPORT, plus the ban/spam/name-validation policy they share. Ported
//! method-for-method from `examples/original_source/server.py`'s
//! `_introduce` / `_rename` / `_send` / `_cancel` / `_report` / `_ban` /
//! `_check_name`.

use std::panic::{self, AssertUnwindSafe};

use tracing::{info, warn};

use crate::cancel::CancelToken;
use crate::dispatch::{self, ParsedCommand};
use crate::roster::Roster;
use crate::session::SessionId;

impl Roster {
    /// Dispatcher entry point: parses the line, ignores it if empty or
    /// unrecognized, and otherwise runs the handler behind a panic
    /// boundary so one handler fault can never take down the shared
    /// actor or any other session.
    pub(crate) fn handle_line(&mut self, id: SessionId, line: String) {
        let Some(command) = dispatch::parse_line(&line) else {
            return;
        };

        info!(session = id, ?command, "dispatch command");

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.execute(id, command)));
        if let Err(payload) = result {
            let cause = crate::error::HandlerPanic::from_payload(payload);
            warn!(session = id, %line, %cause, "handler fault, sending Internal Server Error");
            self.reply_notime(id, "Internal Server Error");
        }
    }

    fn execute(&mut self, id: SessionId, command: ParsedCommand) {
        match command {
            ParsedCommand::Introduce(name) => self.handle_introduce(id, name),
            ParsedCommand::Rename(name) => self.handle_rename(id, name),
            ParsedCommand::Users => self.handle_users(id),
            ParsedCommand::Send {
                message,
                recipient,
                delay,
            } => self.handle_send(id, message, recipient, delay),
            ParsedCommand::Cancel => self.handle_cancel(id),
            ParsedCommand::History => self.handle_history(id),
            ParsedCommand::Report(name) => self.handle_report(id, name),
        }
    }

    /// INTRODUCE: silently renames on a valid name, replays the room
    /// history snapshot (no timestamp, it is already baked into each
    /// stored line), then announces the join and greets the joiner.
    fn handle_introduce(&mut self, id: SessionId, proposed_name: String) {
        let proposed_name = proposed_name.trim();
        if !proposed_name.is_empty() {
            // An invalid supplied name is silently ignored — the default
            // `Anonymous_N` name stays and no error is sent.
            if let Ok(valid) = self.check_name(proposed_name) {
                self.rename_silent(id, valid);
            }
        }

        for line in self.room_history.snapshot() {
            self.reply_notime(id, line);
        }

        let Some(name) = self.session(id).map(|s| s.name.clone()) else {
            return;
        };
        let joined = self.timestamped(&format!("{name} joined chat"));
        self.broadcast_line(&joined, Some(id), false);
        self.reply(id, format!("{name}, {}", self.config.greeting_message));
    }

    fn rename_silent(&mut self, id: SessionId, name: String) {
        if let Some(session) = self.session_mut(id) {
            session.name = name;
        }
    }

    /// RENAME: unlike INTRODUCE, a validation failure here *is* reported
    /// back to the sender, with a timestamp (it goes through `reply`,
    /// not `reply_notime` — `_rename`'s error path uses
    /// `_send_message`'s default `show_time=True`).
    fn handle_rename(&mut self, id: SessionId, proposed_name: String) {
        match self.check_name(&proposed_name) {
            Ok(valid) => {
                let Some(old_name) = self.session(id).map(|s| s.name.clone()) else {
                    return;
                };
                let changed = self.timestamped(&format!("{old_name} changed name to {valid}"));
                self.broadcast_line(&changed, Some(id), false);
                self.reply(id, format!("Your name was changed to {valid}"));
                // Name updated last, after the broadcast/confirmation read
                // the old name.
                self.rename_silent(id, valid);
            }
            Err(message) => self.reply(id, message),
        }
    }

    fn handle_users(&mut self, id: SessionId) {
        let names: Vec<String> = self.users.iter().map(|s| s.name.clone()).collect();
        let block = Self::system_block("USERS", &names);
        self.reply_notime(id, block);
    }

    fn handle_history(&mut self, id: SessionId) {
        let items = self.session(id).map(|s| s.history.snapshot()).unwrap_or_default();
        let block = Self::system_block("HISTORY", &items);
        self.reply_notime(id, block);
    }

    /// SEND: ban check, then delay scheduling, then the empty-message
    /// guard, then spam throttling, then broadcast/whisper delivery — in
    /// that exact order. A delayed message re-enters this same function
    /// with `delay=0` and is subject to whichever of these checks apply
    /// at fire time.
    fn handle_send(
        &mut self,
        id: SessionId,
        message: String,
        recipient: Option<String>,
        delay: u64,
    ) {
        let Some(session) = self.session(id) else {
            return;
        };
        if let Some(ban_until) = session.ban_until {
            if ban_until > chrono::Local::now() {
                self.reply(
                    id,
                    format!("You are banned till {}", crate::roster::format_ts(ban_until)),
                );
                return;
            }
        }

        if delay > 0 {
            let token = CancelToken::new();
            if let Some(session) = self.session_mut(id) {
                session.pending_delays.push(token.clone());
            }
            self.reply(id, format!("Your message will be send after {delay} seconds"));
            self.schedule_delayed_fire(delay, id, token, message, recipient);
            return;
        }

        if message.is_empty() {
            self.reply(id, "Empty messages are restricted");
            return;
        }

        let spam_period = self.config.spam_period_secs;
        let spam_limit = self.config.messages_limit_in_spam_period;
        let is_spam = match self.session_mut(id) {
            Some(session) => session.register_send_and_check_spam(spam_period, spam_limit),
            None => return,
        };
        if is_spam {
            let Some(window_end) = self.session(id).and_then(|s| s.spam_window_end) else {
                return;
            };
            self.reply(
                id,
                format!(
                    "You are spamming to much. Wait until {}",
                    crate::roster::format_ts(window_end)
                ),
            );
            return;
        }

        match recipient {
            None => {
                let Some(name) = self.session(id).map(|s| s.name.clone()) else {
                    return;
                };
                let line = self.timestamped(&format!("{name}: {message}"));
                self.broadcast_line(&line, None, true);
                self.room_history.add(line);
            }
            Some(target_name) => match self.find_by_name(&target_name) {
                None => self.reply_notime(id, format!("There is not user with name {target_name}")),
                Some(target_id) => {
                    let Some(sender_name) = self.session(id).map(|s| s.name.clone()) else {
                        return;
                    };
                    let Some(target_name) = self.session(target_id).map(|s| s.name.clone()) else {
                        return;
                    };
                    let line = self.timestamped(&format!("{sender_name}->{target_name}: {message}"));
                    self.deliver_timestamped(id, &line, true);
                    self.deliver_timestamped(target_id, &line, true);
                }
            },
        }
    }

    /// CANCEL: pops the most recently scheduled delayed SEND (LIFO) and
    /// cancels it; there is no way to target an earlier one.
    fn handle_cancel(&mut self, id: SessionId) {
        let Some(session) = self.session_mut(id) else {
            return;
        };
        match session.pending_delays.pop() {
            None => self.reply(id, "You have no delayed messages"),
            Some(token) => {
                token.cancel();
                self.reply(id, "You last delayed message was removed");
            }
        }
    }

    /// REPORT: accumulates reports against `target_name` and applies a
    /// ban once the threshold is reached.
    fn handle_report(&mut self, id: SessionId, target_name: String) {
        let Some(target_id) = self.find_by_name(&target_name) else {
            self.reply_notime(id, format!("There is not user with name {target_name}"));
            return;
        };
        if target_id == id {
            self.reply_notime(id, "You can't report yourself");
            return;
        }
        let Some(target) = self.session(target_id) else {
            return;
        };
        let already_reported = target.reporters.contains(&id);
        let is_banned = target.is_banned(chrono::Local::now());

        if already_reported {
            self.reply_notime(id, format!("{target_name} was already reported by you"));
            return;
        }
        if is_banned {
            self.reply_notime(id, format!("{target_name} is already banned"));
            return;
        }

        let count = {
            let target = self.session_mut(target_id).unwrap();
            target.reporters.insert(id);
            target.reporters.len()
        };
        let Some(sender_name) = self.session(id).map(|s| s.name.clone()) else {
            return;
        };
        let Some(target_current_name) = self.session(target_id).map(|s| s.name.clone()) else {
            return;
        };
        let reported = self.timestamped(&format!(
            "User {target_current_name} was reported by {sender_name}. Reports count: {count}"
        ));
        self.broadcast_line(&reported, None, false);

        if count >= self.config.reports_for_ban {
            self.apply_ban(target_id);
        }
    }

    /// Clears `target`'s reporters and sets its ban expiry, so a banned
    /// user's report count always starts fresh once the ban lapses.
    fn apply_ban(&mut self, target_id: SessionId) {
        let ban_until = chrono::Local::now() + chrono::Duration::seconds(self.config.ban_duration_secs);
        let Some(target) = self.session_mut(target_id) else {
            return;
        };
        target.reporters.clear();
        target.ban_until = Some(ban_until);
        let name = target.name.clone();

        let banned = self.timestamped(&format!(
            "User {name} was banned until {}",
            crate::roster::format_ts(ban_until)
        ));
        self.broadcast_line(&banned, None, false);
    }

    /// Name validation: strips surrounding whitespace, rejects empty or
    /// internally-spaced names, and rejects case-sensitive duplicates
    /// against the live roster.
    fn check_name(&self, proposed: &str) -> Result<String, &'static str> {
        let trimmed = proposed.trim();
        if trimmed.is_empty() {
            return Err("Empty names are restricted");
        }
        if trimmed.contains(' ') {
            return Err("Empty spaces are restricted in names");
        }
        if self.users.iter().any(|s| s.name == trimmed) {
            return Err("Already have user with that name");
        }
        Ok(trimmed.to_string())
    }
}
