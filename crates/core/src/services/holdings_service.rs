use chrono::NaiveDate;
use std::collections::HashMap;

use crate::models::timeline::{HoldingsTimeline, TimelinePoint};
use crate::models::transaction::{TradeKind, TransactionEvent, TransactionRecord};

/// Reconstructs per-stock holdings over time from the append-only
/// transaction log.
///
/// Pure business logic — no I/O, no clock. Easy to test.
pub struct HoldingsService;

impl HoldingsService {
    pub fn new() -> Self {
        Self
    }

    /// Normalize raw rows into typed events, silently dropping unusable
    /// ones. Surviving events keep their source index for tie-breaking.
    pub fn normalize_events(&self, history: &[TransactionRecord]) -> Vec<TransactionEvent> {
        history
            .iter()
            .enumerate()
            .filter_map(|(index, record)| TransactionEvent::from_record(record, index))
            .collect()
    }

    /// Build one clamped cumulative-quantity timeline per stock.
    ///
    /// Returns `None` when the history produced no usable events at all —
    /// callers then fall back to the flat inventory snapshot. An empty
    /// map and "no history" are the same case.
    pub fn build_timelines(
        &self,
        history: &[TransactionRecord],
    ) -> Option<HashMap<String, HoldingsTimeline>> {
        let events = self.normalize_events(history);
        if events.is_empty() {
            return None;
        }

        let mut grouped: HashMap<String, Vec<TransactionEvent>> = HashMap::new();
        for event in events {
            grouped.entry(event.stock_id.clone()).or_default().push(event);
        }

        let mut timelines = HashMap::with_capacity(grouped.len());
        for (stock_id, mut events) in grouped {
            // Date ascending, source index as tie-break: replay order is
            // deterministic even when several events share a day.
            events.sort_by(|a, b| a.date.cmp(&b.date).then(a.index.cmp(&b.index)));

            let mut running = 0.0_f64;
            let points = events
                .iter()
                .map(|event| {
                    running += event.delta();
                    // Selling more than the recorded history holds (e.g.
                    // missing early buys) clamps to zero, never negative.
                    if running < 0.0 {
                        running = 0.0;
                    }
                    TimelinePoint {
                        date: event.date,
                        quantity: running,
                    }
                })
                .collect();

            timelines.insert(stock_id, HoldingsTimeline::new(points));
        }

        Some(timelines)
    }

    /// Quantity of `stock_id` held as of `date`, or 0 for unknown stocks.
    pub fn quantity_on(
        &self,
        timelines: &HashMap<String, HoldingsTimeline>,
        stock_id: &str,
        date: NaiveDate,
    ) -> f64 {
        timelines
            .get(stock_id)
            .map(|timeline| timeline.quantity_on(date))
            .unwrap_or(0.0)
    }

    /// Plain signed quantity sum per stock through `date`, without the
    /// clamp-at-zero rule. This is the alert path's point estimate; the
    /// attribution engine never uses it.
    pub fn signed_holdings_through(
        &self,
        history: &[TransactionRecord],
        date: NaiveDate,
    ) -> HashMap<String, f64> {
        let mut holdings: HashMap<String, f64> = HashMap::new();
        for record in history {
            let stock_id = record.stock_id.trim();
            if stock_id.is_empty() {
                continue;
            }
            let Some(event_date) = record.event_date() else {
                continue;
            };
            if event_date > date {
                continue;
            }
            let quantity = if record.quantity.is_finite() {
                record.quantity
            } else {
                0.0
            };
            let delta = match record.trade_kind() {
                TradeKind::Sell => -quantity,
                TradeKind::Buy => quantity,
            };
            *holdings.entry(stock_id.to_string()).or_insert(0.0) += delta;
        }
        holdings
    }
}

impl Default for HoldingsService {
    fn default() -> Self {
        Self::new()
    }
}
