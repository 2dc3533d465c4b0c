//! Page envelope and cursor pagination
//!
//! Every LandView response wraps its rows in
//! `{ "header": { "query_rows", "data_rows", "next_page" }, "data": [...] }`.
//! `query_rows` is the size of the whole result set and `next_page` the
//! absolute URL of the following page. A full collection is rebuilt by
//! following `next_page` until `query_rows` rows have been seen.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use lv_connector::error::{ConnectorError, ConnectorResult};

/// Page metadata.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PageHeader {
    /// Total rows matched by the query, across all pages.
    #[serde(default)]
    pub query_rows: Option<u64>,

    /// Rows carried by this page.
    #[serde(default)]
    pub data_rows: Option<u64>,

    /// Absolute URL of the next page.
    #[serde(default)]
    pub next_page: Option<String>,
}

/// One response page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub header: PageHeader,
    #[serde(default)]
    pub data: Vec<Value>,
}

impl Page {
    /// Number of rows in this page, trusting the header when present.
    pub fn row_count(&self) -> u64 {
        self.header.data_rows.unwrap_or(self.data.len() as u64)
    }

    /// Whether the page carries no rows.
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// The first row, if any.
    pub fn first_row(&self) -> Option<&Value> {
        self.data.first()
    }

    /// Next page URL, ignoring blank values.
    pub fn next_page(&self) -> Option<&str> {
        self.header
            .next_page
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Anything that can fetch a page by absolute URL.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, url: &str) -> ConnectorResult<Page>;
}

/// Fetch the page at `first_url` and every page after it, returning all rows.
///
/// A page without `query_rows` is treated as the complete result. A result
/// set that ends (no `next_page`, or an empty follow-up page) before
/// `query_rows` rows have been seen is an error rather than a partial
/// collection.
pub async fn collect_all<S>(source: &S, first_url: &str) -> ConnectorResult<Vec<Value>>
where
    S: PageSource + ?Sized,
{
    let mut page = source.fetch_page(first_url).await?;
    let mut rows = std::mem::take(&mut page.data);

    let Some(total) = page.header.query_rows else {
        debug!(url = %first_url, rows = rows.len(), "Response carries no query_rows, single page");
        return Ok(rows);
    };

    let mut pages = 1u32;
    while (rows.len() as u64) < total {
        let Some(next) = page.next_page().map(str::to_string) else {
            warn!(
                url = %first_url,
                seen = rows.len(),
                total,
                "next_page missing before all rows were read"
            );
            return Err(ConnectorError::invalid_data(format!(
                "pagination of {first_url} stopped at {} of {total} rows: no next_page",
                rows.len()
            )));
        };

        page = source.fetch_page(&next).await?;
        pages += 1;

        if page.data.is_empty() {
            warn!(url = %next, seen = rows.len(), total, "Empty page before all rows were read");
            return Err(ConnectorError::invalid_data(format!(
                "pagination of {first_url} stopped at {} of {total} rows: page {next} was empty",
                rows.len()
            )));
        }

        rows.append(&mut page.data);
    }

    debug!(url = %first_url, rows = rows.len(), pages, "Collected all pages");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory page source keyed by URL that records every fetch.
    struct StaticPages {
        pages: HashMap<String, Value>,
        fetched: Mutex<Vec<String>>,
    }

    impl StaticPages {
        fn new(pages: Vec<(&str, Value)>) -> Self {
            Self {
                pages: pages
                    .into_iter()
                    .map(|(url, body)| (url.to_string(), body))
                    .collect(),
                fetched: Mutex::new(Vec::new()),
            }
        }

        fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageSource for StaticPages {
        async fn fetch_page(&self, url: &str) -> ConnectorResult<Page> {
            self.fetched.lock().unwrap().push(url.to_string());
            let body = self
                .pages
                .get(url)
                .cloned()
                .ok_or_else(|| ConnectorError::ObjectNotFound {
                    identifier: url.to_string(),
                })?;
            Ok(serde_json::from_value(body)?)
        }
    }

    #[test]
    fn test_page_deserialize() {
        let page: Page = serde_json::from_value(json!({
            "header": { "query_rows": 3, "data_rows": 2, "next_page": "https://lv/p2" },
            "data": [{ "user_id": 1 }, { "user_id": 2 }]
        }))
        .unwrap();

        assert_eq!(page.header.query_rows, Some(3));
        assert_eq!(page.row_count(), 2);
        assert_eq!(page.next_page(), Some("https://lv/p2"));
        assert_eq!(page.first_row().unwrap()["user_id"], 1);
    }

    #[test]
    fn test_row_count_falls_back_to_data_len() {
        let page: Page = serde_json::from_value(json!({
            "header": {},
            "data": [{ "rel_id": 9 }]
        }))
        .unwrap();
        assert_eq!(page.row_count(), 1);

        let blank: Page = serde_json::from_value(json!({
            "header": { "data_rows": 0, "next_page": "  " }
        }))
        .unwrap();
        assert!(blank.is_empty());
        assert_eq!(blank.next_page(), None);
    }

    #[tokio::test]
    async fn test_collect_all_follows_next_page() {
        let source = StaticPages::new(vec![
            (
                "p1",
                json!({
                    "header": { "query_rows": 5, "data_rows": 2, "next_page": "p2" },
                    "data": [{ "id": 1 }, { "id": 2 }]
                }),
            ),
            (
                "p2",
                json!({
                    "header": { "query_rows": 5, "data_rows": 2, "next_page": "p3" },
                    "data": [{ "id": 3 }, { "id": 4 }]
                }),
            ),
            (
                "p3",
                json!({
                    "header": { "query_rows": 5, "data_rows": 1 },
                    "data": [{ "id": 5 }]
                }),
            ),
        ]);

        let rows = collect_all(&source, "p1").await.unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(source.fetched(), vec!["p1", "p2", "p3"]);
    }

    #[tokio::test]
    async fn test_collect_all_single_page_when_complete() {
        let source = StaticPages::new(vec![(
            "p1",
            json!({
                "header": { "query_rows": 2, "next_page": "p2" },
                "data": [{ "id": 1 }, { "id": 2 }]
            }),
        )]);

        let rows = collect_all(&source, "p1").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(source.fetched(), vec!["p1"]);
    }

    #[tokio::test]
    async fn test_collect_all_without_query_rows() {
        let source = StaticPages::new(vec![(
            "p1",
            json!({ "data": [{ "id": 1 }] }),
        )]);

        let rows = collect_all(&source, "p1").await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_collect_all_empty_collection() {
        let source = StaticPages::new(vec![(
            "p1",
            json!({ "header": { "query_rows": 0 }, "data": [] }),
        )]);

        assert!(collect_all(&source, "p1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_collect_all_missing_next_page_is_error() {
        let source = StaticPages::new(vec![(
            "p1",
            json!({
                "header": { "query_rows": 4 },
                "data": [{ "id": 1 }, { "id": 2 }]
            }),
        )]);

        let err = collect_all(&source, "p1").await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_DATA");
        assert!(err.to_string().contains("2 of 4"));
    }

    #[tokio::test]
    async fn test_collect_all_empty_follow_up_page_is_error() {
        let source = StaticPages::new(vec![
            (
                "p1",
                json!({
                    "header": { "query_rows": 4, "next_page": "p2" },
                    "data": [{ "id": 1 }]
                }),
            ),
            (
                "p2",
                json!({
                    "header": { "query_rows": 4, "next_page": "p3" },
                    "data": []
                }),
            ),
        ]);

        let err = collect_all(&source, "p1").await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_DATA");
        assert_eq!(source.fetched(), vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn test_collect_all_propagates_fetch_errors() {
        let source = StaticPages::new(vec![(
            "p1",
            json!({
                "header": { "query_rows": 4, "next_page": "gone" },
                "data": [{ "id": 1 }]
            }),
        )]);

        let err = collect_all(&source, "p1").await.unwrap_err();
        assert_eq!(err.error_code(), "OBJECT_NOT_FOUND");
    }
}
