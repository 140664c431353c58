//! End-to-end dump tests against an in-memory search service that implements `search_after`.

use osdump::engine::{Endpoints, SearchTransport};
use osdump::error::dump_error;
use osdump::pipeline::{Paginator, work_queue};
use osdump::{Compression, DumpError, DumpOpts, ErrorKind, dump_index_with};

use serde_json::{Value, json};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const BASE: &str = "http://search.test:9200";
const INDEX: &str = "graylog_0";

/// Fake search service: serves `_count` and `_search` over a fixed document set, sorted by `_id`.
struct FakeSearch {
    docs: Vec<Value>,
    /// Reported by `_count`; defaults to the real document count.
    count: Option<u64>,
    /// Fail the N-th search request (1-based) with HTTP 503.
    fail_search_at: Option<usize>,
    searches: AtomicUsize,
    requests: Mutex<Vec<(String, Option<Value>)>>,
}

impl FakeSearch {
    fn with_ids(ids: &[&str]) -> Self {
        let docs = ids
            .iter()
            .map(|id| {
                json!({
                    "_index": INDEX,
                    "_id": id,
                    "_score": null,
                    "_source": {"message": format!("msg {id}"), "level": 6}
                })
            })
            .collect();
        FakeSearch {
            docs,
            count: None,
            fail_search_at: None,
            searches: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn numbered(n: usize) -> Self {
        let ids: Vec<String> = (0..n).map(|i| format!("doc{i:05}")).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        Self::with_ids(&refs)
    }

    fn search_requests(&self) -> Vec<Option<Value>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(url, _)| url.contains("/_search"))
            .map(|(_, body)| body.clone())
            .collect()
    }

    fn sorted_docs(&self) -> Vec<&Value> {
        let mut docs: Vec<&Value> = self.docs.iter().collect();
        docs.sort_by(|a, b| a["_id"].as_str().cmp(&b["_id"].as_str()));
        docs
    }

    fn search(&self, query: &Value) -> Value {
        let size = query["size"].as_u64().unwrap() as usize;
        let after = query
            .get("search_after")
            .map(|a| a[0].as_str().unwrap().to_string());
        assert_eq!(query["sort"], json!([{"_id": "asc"}]));
        let hits: Vec<Value> = self
            .sorted_docs()
            .into_iter()
            .filter(|d| match &after {
                Some(a) => d["_id"].as_str().unwrap() > a.as_str(),
                None => true,
            })
            .take(size)
            .map(|d| {
                let mut hit = d.clone();
                let id = d["_id"].clone();
                hit["sort"] = json!([id]);
                hit
            })
            .collect();
        json!({"took": 1, "timed_out": false, "hits": {"hits": hits}})
    }
}

impl SearchTransport for FakeSearch {
    fn get(&self, url: &str, body: Option<Vec<u8>>) -> osdump::Result<Vec<u8>> {
        let query: Option<Value> = body.map(|b| serde_json::from_slice(&b).unwrap());
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), query.clone()));

        if url == format!("{BASE}/{INDEX}/_count") {
            let count = self.count.unwrap_or(self.docs.len() as u64);
            return Ok(serde_json::to_vec(&json!({"count": count})).unwrap());
        }
        assert_eq!(url, format!("{BASE}/{INDEX}/_search?request_cache=true"));
        let n = self.searches.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_search_at == Some(n) {
            return Err(DumpError::Status {
                url: url.to_string(),
                status: 503,
                body: "unavailable".into(),
            }
            .into());
        }
        Ok(serde_json::to_vec(&self.search(&query.unwrap())).unwrap())
    }
}

fn opts_for(output: &Path, window_size: usize) -> DumpOpts {
    DumpOpts {
        base_url: BASE.into(),
        index: INDEX.into(),
        window_size,
        output: output.to_path_buf(),
        ..DumpOpts::default()
    }
}

fn read_lines(path: &Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn ids(lines: &[Value]) -> Vec<String> {
    lines
        .iter()
        .map(|l| l["_id"].as_str().unwrap().to_string())
        .collect()
}

fn out_path(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

// --- worked example ---

#[test]
fn test_five_docs_window_two() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_path(&dir, "dump.json");
    let fake = Arc::new(FakeSearch::with_ids(&["a", "b", "c", "d", "e"]));

    let stats = dump_index_with(&opts_for(&out, 2), Arc::clone(&fake)).unwrap();
    assert_eq!(stats.records, 5);
    assert_eq!(stats.expected, 5);
    assert_eq!(stats.pages, 4);

    let requests = fake.search_requests();
    let cursors: Vec<Option<Value>> = requests
        .iter()
        .map(|q| q.as_ref().unwrap().get("search_after").cloned())
        .collect();
    assert_eq!(
        cursors,
        vec![None, Some(json!(["b"])), Some(json!(["d"])), Some(json!(["e"]))]
    );

    let raw = std::fs::read_to_string(&out).unwrap();
    assert!(raw.ends_with('\n'));
    assert_eq!(raw.lines().count(), 5);
    let lines = read_lines(&out);
    assert_eq!(ids(&lines), ["a", "b", "c", "d", "e"]);
    assert!(lines.iter().all(|l| l.get("sort").is_none()));
}

// --- page counts ---

#[test]
fn test_page_count_is_ceil_plus_one() {
    for (n, w) in [(1, 1), (4, 2), (5, 2), (10, 3), (7, 100), (100, 10)] {
        let dir = tempfile::tempdir().unwrap();
        let out = out_path(&dir, "dump.json");
        let fake = Arc::new(FakeSearch::numbered(n));
        let stats = dump_index_with(&opts_for(&out, w), Arc::clone(&fake)).unwrap();
        let expected_pages = n.div_ceil(w) as u64 + 1;
        assert_eq!(stats.pages, expected_pages, "n={n} w={w}");
        assert_eq!(fake.search_requests().len() as u64, expected_pages);
        assert_eq!(stats.records, n as u64);
        assert_eq!(read_lines(&out).len(), n);
    }
}

// --- ordering ---

#[test]
fn test_output_is_ascending_id_order_with_tiny_queue() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_path(&dir, "dump.json");
    let fake = Arc::new(FakeSearch::with_ids(&[
        "m", "c", "x", "a", "q", "b", "z", "k", "e", "d",
    ]));
    let opts = DumpOpts {
        queue_capacity: 1,
        ..opts_for(&out, 3)
    };
    dump_index_with(&opts, fake).unwrap();
    assert_eq!(
        ids(&read_lines(&out)),
        ["a", "b", "c", "d", "e", "k", "m", "q", "x", "z"]
    );
}

#[test]
fn test_large_export_through_small_queue() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_path(&dir, "dump.json");
    let fake = Arc::new(FakeSearch::numbered(2500));
    let opts = DumpOpts {
        queue_capacity: 16,
        ..opts_for(&out, 250)
    };
    let stats = dump_index_with(&opts, fake).unwrap();
    assert_eq!(stats.records, 2500);
    let got = ids(&read_lines(&out));
    let mut sorted = got.clone();
    sorted.sort();
    assert_eq!(got, sorted);
    assert_eq!(got.first().unwrap(), "doc00000");
    assert_eq!(got.last().unwrap(), "doc02499");
}

// --- round trip ---

#[test]
fn test_lines_match_source_minus_sort() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_path(&dir, "dump.json");
    let fake = Arc::new(FakeSearch::with_ids(&["a", "b", "c"]));
    dump_index_with(&opts_for(&out, 2), Arc::clone(&fake)).unwrap();
    let lines = read_lines(&out);
    let sources = fake.sorted_docs();
    assert_eq!(lines.len(), sources.len());
    for (line, source) in lines.iter().zip(sources) {
        assert_eq!(line, source);
    }
}

// --- failures ---

#[test]
fn test_second_run_fails_and_leaves_first_output_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_path(&dir, "dump.json");
    dump_index_with(&opts_for(&out, 2), Arc::new(FakeSearch::with_ids(&["a", "b", "c"]))).unwrap();
    let before = std::fs::read(&out).unwrap();

    let fake = Arc::new(FakeSearch::with_ids(&["x", "y"]));
    let err = dump_index_with(&opts_for(&out, 2), Arc::clone(&fake)).unwrap_err();
    let dump = dump_error(&err).unwrap();
    assert!(matches!(dump, DumpError::OutputExists(_)));
    assert_eq!(dump.kind(), ErrorKind::Resource);
    assert!(fake.search_requests().is_empty());
    assert_eq!(std::fs::read(&out).unwrap(), before);
}

#[test]
fn test_zero_count_aborts_before_fetching() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_path(&dir, "dump.json");
    let fake = Arc::new(FakeSearch {
        count: Some(0),
        ..FakeSearch::with_ids(&["a"])
    });
    let err = dump_index_with(&opts_for(&out, 2), Arc::clone(&fake)).unwrap_err();
    assert!(matches!(dump_error(&err), Some(DumpError::EmptyIndex(_))));
    assert!(fake.search_requests().is_empty());
    assert!(!out.exists());
}

#[test]
fn test_count_is_advisory_only() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_path(&dir, "dump.json");
    let fake = Arc::new(FakeSearch {
        count: Some(2),
        ..FakeSearch::with_ids(&["a", "b", "c", "d"])
    });
    let stats = dump_index_with(&opts_for(&out, 3), fake).unwrap();
    assert_eq!(stats.expected, 2);
    assert_eq!(stats.records, 4);
    assert_eq!(read_lines(&out).len(), 4);
}

#[test]
fn test_http_error_mid_dump_is_fatal_transport_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_path(&dir, "dump.json");
    let fake = Arc::new(FakeSearch {
        fail_search_at: Some(2),
        ..FakeSearch::with_ids(&["a", "b", "c", "d", "e"])
    });
    let err = dump_index_with(&opts_for(&out, 2), Arc::clone(&fake)).unwrap_err();
    let dump = dump_error(&err).unwrap();
    assert!(matches!(dump, DumpError::Status { status: 503, .. }));
    assert_eq!(dump.kind(), ErrorKind::Transport);
    assert_eq!(fake.search_requests().len(), 2, "no retry");
    // Partial output stays on disk.
    assert_eq!(ids(&read_lines(&out)), ["a", "b"]);
}

#[test]
fn test_invalid_opts_fail_before_any_request() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_path(&dir, "dump.json");
    let fake = Arc::new(FakeSearch::with_ids(&["a"]));
    let opts = DumpOpts {
        window_size: 0,
        ..opts_for(&out, 1)
    };
    let err = dump_index_with(&opts, Arc::clone(&fake)).unwrap_err();
    assert_eq!(dump_error(&err).unwrap().kind(), ErrorKind::Config);
    assert!(fake.requests.lock().unwrap().is_empty());
}

// --- paginator without a sink ---

#[test]
fn test_paginator_stops_when_receiver_is_gone() {
    let fake = Arc::new(FakeSearch::numbered(10));
    let paginator = Paginator::new(fake, Endpoints::new(BASE, INDEX), 4);
    let (tx, rx) = work_queue(2);
    drop(rx);
    let err = paginator.run(&tx).unwrap_err();
    assert!(matches!(dump_error(&err), Some(DumpError::SinkGone)));
}

#[test]
fn test_paginator_first_request_has_no_cursor() {
    let fake = Arc::new(FakeSearch::with_ids(&["a", "b"]));
    let paginator = Paginator::new(Arc::clone(&fake), Endpoints::new(BASE, INDEX), 10);
    let (tx, rx) = work_queue(10);
    let state = paginator.run(&tx).unwrap();
    assert_eq!(state.counter, 2);
    assert_eq!(state.pages, 2);
    assert_eq!(state.cursor.as_deref(), Some("b"));
    assert_eq!(rx.len(), 2);
    let first = fake.search_requests()[0].clone().unwrap();
    assert!(first.get("search_after").is_none());
    assert_eq!(first["size"], json!(10));
}

// --- compression ---

#[test]
fn test_brotli_output_decompresses_to_plain_output() {
    let dir = tempfile::tempdir().unwrap();
    let plain = out_path(&dir, "plain.json");
    let packed = out_path(&dir, "packed.json.br");
    let ids_in: Vec<String> = (0..300).map(|i| format!("id{i:04}")).collect();
    let refs: Vec<&str> = ids_in.iter().map(String::as_str).collect();

    dump_index_with(&opts_for(&plain, 7), Arc::new(FakeSearch::with_ids(&refs))).unwrap();
    let opts = DumpOpts {
        compression: Compression::Brotli { quality: 5 },
        ..opts_for(&packed, 7)
    };
    dump_index_with(&opts, Arc::new(FakeSearch::with_ids(&refs))).unwrap();

    let compressed = std::fs::read(&packed).unwrap();
    let mut decompressed = Vec::new();
    brotli::Decompressor::new(compressed.as_slice(), 4096)
        .read_to_end(&mut decompressed)
        .unwrap();
    let expected = std::fs::read(&plain).unwrap();
    assert_eq!(decompressed, expected);
    assert!(compressed.len() < expected.len());
}
