//! Error taxonomy.
//!
//! Error shape borrowed from `slirc-proto`'s `thiserror`-based protocol
//! error enum (the closest pack example that models a line-protocol
//! server's error surface with `thiserror` rather than ad hoc tuples).

use std::fmt;

/// Fatal errors that abort the process at startup.
#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// Captures the panic payload from a handler fault so it can be logged
/// with a readable message. User-facing rejections never reach here —
/// they're sent as replies from inside the handler itself; this only
/// covers the handler faulting unexpectedly, which the dispatcher turns
/// into the literal `Internal Server Error` reply plus this logged cause.
pub struct HandlerPanic {
    message: String,
}

impl HandlerPanic {
    pub fn from_payload(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        HandlerPanic { message }
    }
}

impl fmt::Display for HandlerPanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
