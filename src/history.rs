//! Bounded FIFO history buffer.
//!
//! Used both for each session's personal history and for the room-wide
//! broadcast history. Capacity `0` means unbounded, matching
//! `examples/original_source/utils.py`'s `MaxSizeList`.

/// Fixed-capacity FIFO; the oldest element is evicted on overflow.
#[derive(Debug, Clone)]
pub struct BoundedHistory {
    capacity: usize,
    data: Vec<String>,
}

impl BoundedHistory {
    pub fn new(capacity: usize) -> Self {
        BoundedHistory {
            capacity,
            data: Vec::new(),
        }
    }

    /// Appends `line`, evicting the oldest entry first if already at capacity.
    pub fn add(&mut self, line: String) {
        if self.capacity > 0 && self.data.len() == self.capacity {
            self.data.remove(0);
        }
        self.data.push(line);
    }

    /// Snapshot in insertion order (oldest first).
    pub fn snapshot(&self) -> Vec<String> {
        self.data.clone()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
