//! Read-only access to EOS contract tables.
//!
//! Table reads go through the `/v1/chain/get_table_rows` RPC. Every configured
//! node serves the same chain state, so each request is sent to all of them
//! and the first successful answer wins.

use std::sync::Arc;

use futures::future::{select_ok, BoxFuture};
use futures::FutureExt;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::MarketsError;
use crate::models::Exchange;
use crate::transport::HttpTransport;

/// A contract table, addressed by `code`, `scope` and `table`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableQuery<'a> {
    pub code: &'a str,
    pub scope: &'a str,
    pub table: &'a str,
}

/// `hasMore` flag. Older nodes send a bool, newer ones the next key as a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum More {
    Flag(bool),
    NextKey(String),
}

impl More {
    pub fn is_more(&self) -> bool {
        match self {
            More::Flag(more) => *more,
            More::NextKey(key) => !key.is_empty(),
        }
    }
}

impl Default for More {
    fn default() -> Self {
        More::Flag(false)
    }
}

/// One page of a `get_table_rows` response.
#[derive(Debug, Clone, Deserialize)]
pub struct TableRows {
    #[serde(default)]
    pub rows: Vec<Value>,
    #[serde(default)]
    pub more: More,
}

/// Reads EOS tables from a set of interchangeable API nodes.
#[derive(Clone)]
pub struct TableRowsClient {
    transport: Arc<dyn HttpTransport>,
    endpoints: Vec<String>,
}

impl TableRowsClient {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoints: Vec<String>) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    /// One page of `query`, starting at primary key `lower_bound`.
    ///
    /// Fails only when every endpoint fails, with the last error seen.
    pub async fn get_table_rows(
        &self,
        exchange: Exchange,
        query: TableQuery<'_>,
        lower_bound: Option<u64>,
    ) -> Result<TableRows, MarketsError> {
        if self.endpoints.is_empty() {
            return Err(MarketsError::upstream(exchange, "no EOS endpoints configured"));
        }

        let mut body = json!({
            "code": query.code,
            "scope": query.scope,
            "table": query.table,
            "json": true,
        });
        if let Some(lower_bound) = lower_bound {
            body["lower_bound"] = Value::String(lower_bound.to_string());
        }

        let requests: Vec<BoxFuture<'_, Result<TableRows, MarketsError>>> = self
            .endpoints
            .iter()
            .map(|endpoint| {
                let url = format!("{}/v1/chain/get_table_rows", endpoint);
                let body = &body;
                async move {
                    let value = self.transport.post_json(exchange, &url, body).await?;
                    serde_json::from_value::<TableRows>(value).map_err(|e| {
                        MarketsError::upstream(
                            exchange,
                            format!("Failed to parse table rows from {}: {}", url, e),
                        )
                    })
                }
                .boxed()
            })
            .collect();

        let (rows, _pending) = select_ok(requests).await?;
        Ok(rows)
    }

    /// Every row of `query`, following the `more` flag page by page.
    ///
    /// The next page starts one past the largest `key_field` value seen on
    /// the current page.
    pub async fn get_all_rows(
        &self,
        exchange: Exchange,
        query: TableQuery<'_>,
        key_field: &str,
    ) -> Result<Vec<Value>, MarketsError> {
        let mut rows = Vec::new();
        let mut lower_bound = 1u64;

        loop {
            let page = self
                .get_table_rows(exchange, query, Some(lower_bound))
                .await?;
            let more = page.more.is_more();

            let max_key = page
                .rows
                .iter()
                .map(|row| row.get(key_field).and_then(Value::as_u64))
                .collect::<Option<Vec<u64>>>()
                .ok_or_else(|| {
                    MarketsError::upstream(
                        exchange,
                        format!("{} row without numeric {}", query.table, key_field),
                    )
                })?
                .into_iter()
                .max();

            debug!(
                "{} {} page from {}: {} rows, more={}",
                exchange,
                query.table,
                lower_bound,
                page.rows.len(),
                more
            );
            rows.extend(page.rows);

            if !more {
                return Ok(rows);
            }
            match max_key {
                Some(key) => lower_bound = key + 1,
                None => {
                    return Err(MarketsError::upstream(
                        exchange,
                        format!("{} reported more rows but returned none", query.table),
                    ))
                }
            }
        }
    }
}
