//! Server configuration, loaded from the environment.
//!
//! Mirrors the teacher crate's `RateLimitConfig::from_env` pattern
//! (`src/rate_limit.rs` in the Humans-Not-Required chat app): every
//! tunable has a hardcoded default and is overridden only if its
//! environment variable parses cleanly, so a malformed value never
//! panics the process.

use std::env;

/// Tunables from `examples/original_source/settings.py`, unchanged in
/// name and default value.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub default_name: String,
    pub greeting_message: String,
    pub history_size: usize,
    pub reports_for_ban: usize,
    pub ban_duration_secs: i64,
    pub messages_limit_in_spam_period: u32,
    pub spam_period_secs: i64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 8888,
            default_name: "Anonymous".to_string(),
            greeting_message: "Welcome to Test Server".to_string(),
            history_size: 20,
            reports_for_ban: 2,
            ban_duration_secs: 600,
            messages_limit_in_spam_period: 5,
            spam_period_secs: 10,
        }
    }
}

impl Config {
    /// Builds a `Config` from `SERVER_HOST` / `SERVER_PORT` plus the
    /// tunables, falling back to defaults for anything unset or
    /// unparsable.
    pub fn from_env() -> Self {
        let mut config = Config::default();

        if let Ok(val) = env::var("SERVER_HOST") {
            config.host = val;
        }
        if let Ok(val) = env::var("SERVER_PORT")
            && let Ok(port) = val.parse::<u16>()
        {
            config.port = port;
        }
        if let Ok(val) = env::var("DEFAULT_NAME") {
            config.default_name = val;
        }
        if let Ok(val) = env::var("GREETING_MESSAGE") {
            config.greeting_message = val;
        }
        if let Ok(val) = env::var("HISTORY_SIZE")
            && let Ok(n) = val.parse::<usize>()
        {
            config.history_size = n;
        }
        if let Ok(val) = env::var("REPORTS_FOR_BAN")
            && let Ok(n) = val.parse::<usize>()
        {
            config.reports_for_ban = n;
        }
        if let Ok(val) = env::var("BAN_DURATION")
            && let Ok(n) = val.parse::<i64>()
        {
            config.ban_duration_secs = n;
        }
        if let Ok(val) = env::var("MESSAGES_LIMIT_IN_SPAM_PERIOD")
            && let Ok(n) = val.parse::<u32>()
        {
            config.messages_limit_in_spam_period = n;
        }
        if let Ok(val) = env::var("SPAM_PERIOD")
            && let Ok(n) = val.parse::<i64>()
        {
            config.spam_period_secs = n;
        }

        config
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
