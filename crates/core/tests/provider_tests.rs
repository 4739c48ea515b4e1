// ═══════════════════════════════════════════════════════════════════
// Provider Tests — DividendQuery normalization, payload shapes,
// chunk merging, and the DividendProvider trait boundary
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use serde_json::json;

use dividend_life_core::errors::CoreError;
use dividend_life_core::models::dividend::DividendRecord;
use dividend_life_core::providers::dividend_api::{
    merge_records, normalize_payload, CHUNK_SIZE, CHUNK_THRESHOLD,
};
use dividend_life_core::providers::traits::{DividendProvider, DividendQuery};

// ═══════════════════════════════════════════════════════════════════
// Mock Provider (for testing without real API calls)
// ═══════════════════════════════════════════════════════════════════

struct MockDividendProvider {
    records: Vec<DividendRecord>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl DividendProvider for MockDividendProvider {
    fn name(&self) -> &str {
        "MockProvider"
    }

    async fn fetch_dividends(
        &self,
        query: &DividendQuery,
    ) -> Result<Vec<DividendRecord>, CoreError> {
        let query = query.normalized();
        if query.stock_ids.is_empty() {
            return Ok(self.records.clone());
        }
        Ok(self
            .records
            .iter()
            .filter(|record| query.stock_ids.contains(&record.stock_id))
            .cloned()
            .collect())
    }
}

fn record(stock_id: &str, ex_date: &str) -> DividendRecord {
    DividendRecord {
        stock_id: stock_id.into(),
        dividend: 1.0,
        dividend_date: Some(ex_date.into()),
        ..DividendRecord::default()
    }
}

// ── Query normalization ─────────────────────────────────────────────

mod query {
    use super::*;

    #[test]
    fn countries_default_to_tw_and_us() {
        let query = DividendQuery::for_years([2024]).normalized();
        assert_eq!(query.countries, vec!["tw".to_string(), "us".to_string()]);
    }

    #[test]
    fn countries_are_lowercased_and_deduped() {
        let query = DividendQuery {
            countries: vec![" TW ".into(), "tw".into(), "US".into()],
            ..DividendQuery::default()
        }
        .normalized();
        assert_eq!(query.countries, vec!["tw".to_string(), "us".to_string()]);
    }

    #[test]
    fn years_are_deduped_keeping_order() {
        let query = DividendQuery::for_years([2024, 2023, 2024]).normalized();
        assert_eq!(query.years, vec![2024, 2023]);
    }

    #[test]
    fn stock_ids_drop_blanks() {
        let query = DividendQuery {
            stock_ids: vec!["0050".into(), "  ".into(), " 00878 ".into(), "0050".into()],
            ..DividendQuery::default()
        }
        .normalized();
        assert_eq!(query.stock_ids, vec!["0050".to_string(), "00878".to_string()]);
    }

    #[test]
    fn chunk_size_stays_below_threshold() {
        assert!(CHUNK_SIZE < CHUNK_THRESHOLD);
    }
}

// ── Payload normalization ───────────────────────────────────────────

mod payload {
    use super::*;

    #[test]
    fn bare_array_payload() {
        let payload = json!([{"stock_id": "0050", "dividend": 1.0}]);
        let records = normalize_payload(&payload);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].stock_id, "0050");
    }

    #[test]
    fn data_wrapped_payload() {
        let payload = json!({"data": [{"stock_id": "0050", "dividend": 1.0}]});
        assert_eq!(normalize_payload(&payload).len(), 1);
    }

    #[test]
    fn items_wrapped_payload() {
        let payload = json!({"items": [{"stock_id": "0050", "dividend": 1.0}]});
        assert_eq!(normalize_payload(&payload).len(), 1);
    }

    #[test]
    fn unknown_shapes_yield_empty() {
        assert!(normalize_payload(&json!({"rows": []})).is_empty());
        assert!(normalize_payload(&json!("not json data")).is_empty());
        assert!(normalize_payload(&json!(42)).is_empty());
        assert!(normalize_payload(&json!(null)).is_empty());
    }

    #[test]
    fn non_object_items_are_skipped() {
        let payload = json!([{"stock_id": "0050"}, "junk", 7, null]);
        let records = normalize_payload(&payload);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn extra_fields_are_tolerated() {
        let payload = json!([{
            "stock_id": "0050",
            "dividend": 1.5,
            "dividend_date": "2024-06-10",
            "yield_rate": 4.2,
            "announce_date": "2024-05-01"
        }]);
        let records = normalize_payload(&payload);
        assert_eq!(records[0].dividend, 1.5);
    }
}

// ── Chunk merging ───────────────────────────────────────────────────

mod merge {
    use super::*;

    #[test]
    fn duplicate_keys_keep_the_first_occurrence() {
        let mut duplicate = record("0050", "2024-06-10");
        duplicate.dividend = 9.9;
        let merged = merge_records(vec![
            vec![record("0050", "2024-06-10")],
            vec![duplicate],
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].dividend, 1.0);
    }

    #[test]
    fn merged_output_sorts_by_date_then_stock() {
        let merged = merge_records(vec![
            vec![record("2330", "2024-06-10"), record("0050", "2024-01-10")],
            vec![record("0050", "2024-06-10")],
        ]);
        let order: Vec<(&str, &str)> = merged
            .iter()
            .map(|r| (r.stock_id.as_str(), r.dividend_date.as_deref().unwrap()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("0050", "2024-01-10"),
                ("0050", "2024-06-10"),
                ("2330", "2024-06-10"),
            ]
        );
    }

    #[test]
    fn dateless_records_sort_first() {
        let dateless = DividendRecord {
            stock_id: "0050".into(),
            dividend: 1.0,
            ..DividendRecord::default()
        };
        let merged = merge_records(vec![vec![record("0050", "2024-06-10"), dateless]]);
        assert_eq!(merged[0].dividend_date, None);
    }

    #[test]
    fn distinct_dates_for_one_stock_are_kept() {
        let merged = merge_records(vec![
            vec![record("0050", "2024-01-10")],
            vec![record("0050", "2024-06-10")],
        ]);
        assert_eq!(merged.len(), 2);
    }
}

// ── Trait boundary ──────────────────────────────────────────────────

mod boundary {
    use super::*;
    use chrono::NaiveDate;
    use dividend_life_core::models::transaction::TradeKind;
    use dividend_life_core::DividendTracker;

    #[tokio::test]
    async fn mock_provider_feeds_the_tracker() {
        let provider = MockDividendProvider {
            records: vec![record("0050", "2024-06-10"), record("2330", "2024-06-13")],
        };
        let mut tracker = DividendTracker::create_new();
        tracker
            .add_transaction(
                "0050",
                None,
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                1000.0,
                Some(130.0),
                TradeKind::Buy,
            )
            .unwrap();

        let count = tracker
            .refresh_dividend_events(&provider, &DividendQuery::for_years([2024]))
            .await
            .unwrap();
        assert_eq!(count, 2);

        let summary = tracker.dividend_summary(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        // Only 0050 is held; 2330's dividend attributes nothing.
        assert!((summary.accumulated_total - 1000.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn provider_filters_by_stock_ids() {
        let provider = MockDividendProvider {
            records: vec![record("0050", "2024-06-10"), record("2330", "2024-06-13")],
        };
        let query = DividendQuery {
            stock_ids: vec!["2330".into()],
            ..DividendQuery::default()
        };
        let records = provider.fetch_dividends(&query).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].stock_id, "2330");
    }

    #[test]
    fn provider_name_is_stable() {
        let provider = MockDividendProvider { records: vec![] };
        assert_eq!(provider.name(), "MockProvider");
    }
}
