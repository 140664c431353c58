//! Producer side: page through the index with `search_after` and push every hit into the work queue.

use anyhow::{Context, Result};
use log::{debug, warn};
use serde_json::Value;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::engine::query::build_search_query;
use crate::engine::transport::{Endpoints, SearchTransport, body_snippet};
use crate::error::DumpError;
use crate::{Cursor, Record};

use super::context::PipelineState;
use super::queue::{QueueError, QueueSender};

/// Cursor value from a hit's `sort` annotation: its first element, as text.
/// Empty strings and non-scalar values are ignored.
pub fn cursor_from_sort(sort: &Value) -> Option<Cursor> {
    match sort.as_array()?.first()? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse one `_search` response into records, in hit order. Strips each hit's `sort`, advancing
/// `state.cursor` with it when present. An empty result means end of data.
///
/// Does not touch `state.counter`; that counts records actually queued.
pub fn parse_search_page(body: &[u8], state: &mut PipelineState) -> Result<Vec<Record>> {
    let mut doc: Value = serde_json::from_slice(body).map_err(DumpError::Json)?;
    let Some(outer) = doc.get_mut("hits") else {
        return Err(DumpError::Protocol(format!(
            "response has no top-level \"hits\": {}",
            body_snippet(body)
        ))
        .into());
    };
    let hits = match outer.get_mut("hits").map(Value::take) {
        Some(Value::Array(hits)) => hits,
        _ => {
            warn!("Response has \"hits\" but no hits.hits array, treating as end of data");
            return Ok(Vec::new());
        }
    };

    let mut records = Vec::with_capacity(hits.len());
    for mut hit in hits {
        if !hit.is_object() {
            return Err(DumpError::Protocol(format!("hit is not an object: {hit}")).into());
        }
        if let Some(sort) = hit.as_object_mut().and_then(|fields| fields.shift_remove("sort"))
            && let Some(cursor) = cursor_from_sort(&sort)
        {
            state.advance_cursor(cursor);
        }
        records.push(Record::new(serde_json::to_vec(&hit)?));
    }
    Ok(records)
}

/// Drives pagination to the end of the index.
pub struct Paginator<T: SearchTransport + ?Sized> {
    transport: Arc<T>,
    endpoints: Endpoints,
    state: PipelineState,
}

impl<T: SearchTransport + ?Sized> Paginator<T> {
    pub fn new(transport: Arc<T>, endpoints: Endpoints, window_size: usize) -> Self {
        Paginator {
            transport,
            endpoints,
            state: PipelineState::new(window_size),
        }
    }

    /// Fetch one page with the current cursor.
    fn fetch_page(&mut self) -> Result<Vec<Record>> {
        let query = build_search_query(self.state.window_size, self.state.cursor.as_deref());
        let body = serde_json::to_vec(&query)?;
        let page = self.state.pages + 1;
        let response = self
            .transport
            .get(self.endpoints.search_url(), Some(body))
            .with_context(|| format!("fetch page {page}"))?;
        self.state.pages = page;
        parse_search_page(&response, &mut self.state).with_context(|| format!("parse page {page}"))
    }

    /// Page until an empty hits array, pushing each record as it is parsed. Returns the final state.
    /// Never closes the queue; that is the caller's job once this returns.
    pub fn run(mut self, queue: &QueueSender) -> Result<PipelineState> {
        loop {
            let records = self.fetch_page()?;
            if records.is_empty() {
                debug!("Nothing more to produce, breaking the loop");
                break;
            }
            debug!(
                "Page {}: {} hits, cursor now {:?}",
                self.state.pages,
                records.len(),
                self.state.cursor
            );
            for record in records {
                queue.push(record).map_err(|e| match e {
                    QueueError::Disconnected => anyhow::Error::from(DumpError::SinkGone),
                    QueueError::Closed => anyhow::Error::from(e),
                })?;
                self.state.counter += 1;
            }
        }
        debug!("Producer done");
        Ok(self.state)
    }
}

/// Run `paginator` on its own thread. The sender comes back with the outcome so the caller closes
/// the queue after the producer has stopped for good.
pub fn spawn_paginator<T: SearchTransport + ?Sized + 'static>(
    paginator: Paginator<T>,
    queue: QueueSender,
) -> JoinHandle<(Result<PipelineState>, QueueSender)> {
    thread::spawn(move || {
        let outcome = paginator.run(&queue);
        (outcome, queue)
    })
}
