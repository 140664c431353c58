//! Bounded FIFO between the paginator and the sink writer.
//!
//! One sender, one receiver. `push` blocks while the queue is full, `pop` blocks while it is empty
//! and open, and returns `None` once it is closed and drained. Closing is idempotent and belongs to
//! the producer side.

use crossbeam_channel::{Receiver, Sender, bounded};
use thiserror::Error;

use crate::Record;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// `push` after `close`. A bug in the caller, not a runtime condition.
    #[error("push on a closed work queue")]
    Closed,
    /// The receiver was dropped; nothing will ever drain the queue.
    #[error("work queue receiver is gone")]
    Disconnected,
}

/// Create a queue holding at most `capacity` records.
pub fn work_queue(capacity: usize) -> (QueueSender, QueueReceiver) {
    let (tx, rx) = bounded::<Record>(capacity);
    (
        QueueSender {
            tx: Some(tx),
            capacity,
        },
        QueueReceiver { rx },
    )
}

/// Producer end.
pub struct QueueSender {
    tx: Option<Sender<Record>>,
    capacity: usize,
}

impl QueueSender {
    /// Enqueue `record`, blocking while the queue is full.
    pub fn push(&self, record: Record) -> Result<(), QueueError> {
        let tx = self.tx.as_ref().ok_or(QueueError::Closed)?;
        tx.send(record).map_err(|_| QueueError::Disconnected)
    }

    /// Mark end of input. The receiver still drains what is queued.
    pub fn close(&mut self) {
        self.tx.take();
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_none()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Consumer end.
pub struct QueueReceiver {
    rx: Receiver<Record>,
}

impl QueueReceiver {
    /// Next record in FIFO order. Blocks while empty and open; `None` means closed and drained.
    pub fn pop(&self) -> Option<Record> {
        self.rx.recv().ok()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
