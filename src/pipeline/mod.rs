//! Pipeline components: pagination state, work queue, paginator, sink writer, orchestration.

pub mod context;
pub mod orchestrator;
pub mod paginator;
pub mod queue;
pub mod sink;

pub use context::PipelineState;
pub use orchestrator::run_dump;
pub use paginator::{Paginator, cursor_from_sort, parse_search_page, spawn_paginator};
pub use queue::{QueueError, QueueReceiver, QueueSender, work_queue};
pub use sink::{LatchedWriter, SinkWriter, spawn_sink_writer};
