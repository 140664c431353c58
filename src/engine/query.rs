//! Pagination query document for `_search` with `search_after`.

use serde_json::{Value, json};

/// Build the page query: `size` hits, match-all, resume strictly after `cursor` when given,
/// sorted ascending on `_id` so every page boundary is a total order.
pub fn build_search_query(window_size: usize, cursor: Option<&str>) -> Value {
    let mut query = json!({
        "size": window_size,
        "query": {"bool": {"must": {"match_all": {}}}},
    });
    if let Some(after) = cursor {
        query["search_after"] = json!([after]);
    }
    query["sort"] = json!([{"_id": "asc"}]);
    query
}
