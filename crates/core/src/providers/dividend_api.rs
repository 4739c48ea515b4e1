use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, warn};
use reqwest::Client;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use super::traits::{DividendProvider, DividendQuery};
use crate::errors::CoreError;
use crate::models::dividend::DividendRecord;

/// Above this many stock ids a single request would blow past URL and
/// server limits; the query is split into chunks instead.
pub const CHUNK_THRESHOLD: usize = 3000;

/// Stock ids per chunked request.
pub const CHUNK_SIZE: usize = 1200;

/// HTTP client for the hosted dividend-data API.
///
/// Endpoint: `GET {host}/get_dividend` with repeated query parameters
/// `year`, `country`, `stock_ids`, and `fields`.
pub struct HttpDividendProvider {
    host: String,
    client: Client,
}

impl HttpDividendProvider {
    pub fn new(host: impl Into<String>) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            host: host.into().trim_end_matches('/').to_string(),
            client: builder.build().unwrap_or_else(|_| Client::new()),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/get_dividend", self.host)
    }

    async fn fetch_once(
        &self,
        query: &DividendQuery,
        stock_ids: &[String],
    ) -> Result<Vec<DividendRecord>, CoreError> {
        let url = self.endpoint();
        let mut params: Vec<(&str, String)> = Vec::new();
        for year in &query.years {
            params.push(("year", year.to_string()));
        }
        for country in &query.countries {
            params.push(("country", country.clone()));
        }
        for stock_id in stock_ids {
            params.push(("stock_ids", stock_id.clone()));
        }
        for field in &query.fields {
            params.push(("fields", field.clone()));
        }

        debug!(
            "Fetching dividends: {} years, {} countries, {} stock ids",
            query.years.len(),
            query.countries.len(),
            stock_ids.len()
        );

        let payload: serde_json::Value = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                endpoint: "get_dividend".into(),
                message: format!("Failed to parse response: {e}"),
            })?;

        let records = normalize_payload(&payload);
        if records.is_empty() {
            warn!("Dividend API returned no usable items");
        }
        Ok(records)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl DividendProvider for HttpDividendProvider {
    fn name(&self) -> &str {
        "DividendAPI"
    }

    async fn fetch_dividends(&self, query: &DividendQuery) -> Result<Vec<DividendRecord>, CoreError> {
        let query = query.normalized();

        if query.stock_ids.len() <= CHUNK_THRESHOLD {
            return self.fetch_once(&query, &query.stock_ids).await;
        }

        let mut batches = Vec::new();
        for chunk in query.stock_ids.chunks(CHUNK_SIZE) {
            batches.push(self.fetch_once(&query, chunk).await?);
        }
        Ok(merge_records(batches))
    }
}

/// Accept the payload shapes the API has shipped over time: a bare array,
/// `{"data": [...]}` or `{"items": [...]}`. Anything else is an empty
/// list, never an error — stale gateways occasionally return HTML-ish
/// junk wrapped in JSON strings.
pub fn normalize_payload(payload: &serde_json::Value) -> Vec<DividendRecord> {
    let items = if let Some(array) = payload.as_array() {
        array
    } else if let Some(array) = payload.get("data").and_then(|v| v.as_array()) {
        array
    } else if let Some(array) = payload.get("items").and_then(|v| v.as_array()) {
        array
    } else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect()
}

/// Merge chunked responses: first occurrence wins per
/// `stock_id|dividend_date|payment_date`, then sort by reference date
/// with stock id as tie-break.
pub fn merge_records(batches: Vec<Vec<DividendRecord>>) -> Vec<DividendRecord> {
    let mut seen = std::collections::HashSet::new();
    let mut merged: Vec<DividendRecord> = Vec::new();
    for batch in batches {
        for record in batch {
            if seen.insert(record.merge_key()) {
                merged.push(record);
            }
        }
    }

    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    merged.sort_by(|a, b| {
        let date_a = a.reference_date().unwrap_or(epoch);
        let date_b = b.reference_date().unwrap_or(epoch);
        date_a.cmp(&date_b).then_with(|| a.stock_id.cmp(&b.stock_id))
    });
    merged
}
