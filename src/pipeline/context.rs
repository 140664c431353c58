//! Pagination state: window size, cursor, and counters. Owned by the paginator for the whole run;
//! the orchestrator reads it only after the paginator thread has been joined.

use crate::Cursor;

#[derive(Clone, Debug, Default)]
pub struct PipelineState {
    pub window_size: usize,
    /// Last sort key seen. `None` until the first hit with a sort annotation.
    pub cursor: Option<Cursor>,
    /// Records handed to the work queue.
    pub counter: u64,
    /// Search requests issued, including the final empty page.
    pub pages: u64,
}

impl PipelineState {
    pub fn new(window_size: usize) -> Self {
        PipelineState {
            window_size,
            ..Default::default()
        }
    }

    /// Move the cursor forward. Values come back in ascending `_id` order, so this never goes back.
    pub fn advance_cursor(&mut self, cursor: Cursor) {
        self.cursor = Some(cursor);
    }
}
