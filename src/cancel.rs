//! Cancellable one-shot token.
//!
//! Ported from `examples/original_source/utils.py`'s `CancellationToken`:
//! registering a callback on an already-*completed* token is a no-op, it
//! is only fired immediately when the token is already *cancelled*. See
//! DESIGN.md's Open Question notes.

use std::sync::{Arc, Mutex};

type Callback = Box<dyn FnOnce() + Send + 'static>;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum State {
    Active,
    Cancelled,
    Completed,
}

struct Inner {
    state: State,
    next_id: u64,
    callbacks: Vec<(u64, Callback)>,
}

/// Opaque handle returned by [`CancelToken::on_cancel`], used to remove a
/// registration before it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallbackId(u64);

/// A cheaply-clonable handle to a shared cancel token. Clones refer to the
/// same underlying state; identity (for removing a token from a stack of
/// pending delays) is `Arc` pointer equality, not value equality.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<Mutex<Inner>>,
}

impl CancelToken {
    pub fn new() -> Self {
        CancelToken {
            inner: Arc::new(Mutex::new(Inner {
                state: State::Active,
                next_id: 0,
                callbacks: Vec::new(),
            })),
        }
    }

    /// Registers `callback` to run when the token is cancelled.
    ///
    /// If the token is already `cancelled`, `callback` runs immediately
    /// (synchronously, on the caller's thread). If the token is already
    /// `completed`, the callback is dropped without running. Otherwise it
    /// is queued and returned as a [`CallbackId`] for later removal.
    pub fn on_cancel<F>(&self, callback: F) -> Option<CallbackId>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match guard.state {
            State::Active => {
                let id = guard.next_id;
                guard.next_id += 1;
                guard.callbacks.push((id, Box::new(callback)));
                Some(CallbackId(id))
            }
            State::Cancelled => {
                drop(guard);
                callback();
                None
            }
            State::Completed => None,
        }
    }

    /// Removes a previously-registered callback; no-op if already fired or absent.
    pub fn remove_callback(&self, id: CallbackId) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.callbacks.retain(|(cb_id, _)| *cb_id != id.0);
    }

    /// Atomically transitions `active -> cancelled`, then invokes every
    /// registered callback exactly once, in registration order, outside
    /// the lock. No-op if the token is already terminal.
    pub fn cancel(&self) {
        let callbacks = {
            let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            if guard.state != State::Active {
                return;
            }
            guard.state = State::Cancelled;
            std::mem::take(&mut guard.callbacks)
        };
        for (_, cb) in callbacks {
            cb();
        }
    }

    /// Atomically transitions `active -> completed`. No callbacks fire.
    /// No-op if the token is already terminal.
    pub fn complete(&self) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if guard.state != State::Active {
            return;
        }
        guard.state = State::Completed;
    }

    pub fn is_active(&self) -> bool {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).state == State::Active
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).state == State::Cancelled
    }

    pub fn is_completed(&self) -> bool {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).state == State::Completed
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for CancelToken {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for CancelToken {}
