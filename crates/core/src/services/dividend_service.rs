use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

use crate::models::dividend::{AlertKind, DividendAlert, DividendEvent, DividendRecord};
use crate::models::inventory::InventoryRow;
use crate::models::summary::{CurrencySummary, DividendSummary};
use crate::models::transaction::TransactionRecord;

use super::currency_service::{CurrencyService, DEFAULT_CURRENCY};
use super::holdings_service::HoldingsService;

/// Per-currency accumulation state while walking the dividend events.
#[derive(Debug, Default)]
struct CurrencyBucket {
    totals_by_year: HashMap<i32, f64>,
    monthly_totals: [f64; 12],
    accumulated_total: f64,
    /// Highest current-year month index with a payout, if any.
    max_month_index: Option<usize>,
}

/// Attributes each dividend payment to the holding size at its reference
/// date and rolls the cash up per currency and per month.
pub struct DividendService {
    holdings_service: HoldingsService,
    currency_service: CurrencyService,
}

impl DividendService {
    pub fn new() -> Self {
        Self {
            holdings_service: HoldingsService::new(),
            currency_service: CurrencyService::new(),
        }
    }

    /// Compute the full dividend summary as of `as_of`.
    ///
    /// Attribution prefers the transaction timeline; only when the
    /// history yields no usable events at all does the flat inventory
    /// snapshot stand in (not date-aware — it answers with the current
    /// quantity for every date).
    pub fn calculate_summary(
        &self,
        history: &[TransactionRecord],
        dividends: &[DividendRecord],
        inventory: &[InventoryRow],
        as_of: NaiveDate,
    ) -> DividendSummary {
        let current_year = as_of.year();

        let timelines = self.holdings_service.build_timelines(history);
        let fallback_holdings = if timelines.is_none() {
            Some(Self::build_inventory_holdings(inventory))
        } else {
            None
        };

        let mut buckets: HashMap<String, CurrencyBucket> = HashMap::new();
        // First-observed order; drives base-currency selection.
        let mut currency_order: Vec<String> = Vec::new();

        for record in dividends {
            let Some(event) = self.normalize_event(record) else {
                continue;
            };

            let quantity = match (&timelines, &fallback_holdings) {
                (Some(timelines), _) => {
                    self.holdings_service
                        .quantity_on(timelines, &event.stock_id, event.date)
                }
                (None, Some(holdings)) => holdings.get(&event.stock_id).copied().unwrap_or(0.0),
                (None, None) => 0.0,
            };
            if quantity == 0.0 {
                continue;
            }

            if !buckets.contains_key(&event.currency) {
                currency_order.push(event.currency.clone());
            }
            let bucket = buckets.entry(event.currency.clone()).or_default();

            let amount = event.per_share * quantity;
            let event_year = event.date.year();
            *bucket.totals_by_year.entry(event_year).or_insert(0.0) += amount;
            bucket.accumulated_total += amount;

            // Only current-year payouts feed the monthly series; other
            // years exist solely in totals_by_year / the accumulated sum.
            if event_year == current_year {
                let month_index = event.date.month0() as usize;
                bucket.monthly_totals[month_index] += amount;
                bucket.max_month_index = Some(
                    bucket
                        .max_month_index
                        .map_or(month_index, |max| max.max(month_index)),
                );
            }
        }

        let mut per_currency = HashMap::with_capacity(buckets.len());
        for currency in &currency_order {
            let bucket = &buckets[currency];
            per_currency.insert(
                currency.clone(),
                Self::summarize_bucket(bucket, current_year, as_of),
            );
        }

        let base_currency = if currency_order.iter().any(|c| c == DEFAULT_CURRENCY) {
            DEFAULT_CURRENCY.to_string()
        } else {
            currency_order
                .first()
                .cloned()
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
        };
        let base = per_currency
            .get(&base_currency)
            .copied()
            .unwrap_or_default();

        DividendSummary {
            accumulated_total: base.accumulated_total,
            annual_total: base.annual_total,
            annual_year: current_year,
            monthly_average: base.monthly_average,
            monthly_minimum: base.monthly_minimum,
            base_currency,
            per_currency,
            currency_order,
        }
    }

    /// Validate one raw record into a typed event: a non-blank stock id,
    /// a finite positive per-share amount, a usable reference date, and
    /// an alias-normalized currency. `None` means the row is skipped.
    pub fn normalize_event(&self, record: &DividendRecord) -> Option<DividendEvent> {
        let stock_id = record.stock_id.trim();
        if stock_id.is_empty() {
            return None;
        }
        if !record.dividend.is_finite() || record.dividend <= 0.0 {
            return None;
        }
        let date = record.reference_date()?;
        Some(DividendEvent {
            stock_id: stock_id.to_string(),
            per_share: record.dividend,
            currency: self.currency_service.normalize(record.raw_currency()),
            date,
        })
    }

    /// Reminder rows for dividends whose ex-date or payment date equals
    /// `date`. Holdings here are the plain signed sum through `date` —
    /// the historical alert behavior, not the clamped timeline.
    pub fn alerts_on(
        &self,
        dividends: &[DividendRecord],
        history: &[TransactionRecord],
        date: NaiveDate,
    ) -> Vec<DividendAlert> {
        if dividends.is_empty() {
            return Vec::new();
        }
        let holdings = self.holdings_service.signed_holdings_through(history, date);

        let mut alerts = Vec::new();
        for record in dividends {
            let quantity = holdings
                .get(record.stock_id.trim())
                .copied()
                .unwrap_or(0.0);
            if quantity == 0.0 {
                continue;
            }
            let per_share = if record.dividend.is_finite() {
                record.dividend
            } else {
                0.0
            };
            if record.ex_date() == Some(date) {
                alerts.push(Self::alert(record, AlertKind::Ex, per_share, quantity));
            }
            if record.pay_date() == Some(date) {
                alerts.push(Self::alert(record, AlertKind::Pay, per_share, quantity));
            }
        }
        alerts
    }

    fn alert(
        record: &DividendRecord,
        kind: AlertKind,
        per_share: f64,
        quantity: f64,
    ) -> DividendAlert {
        DividendAlert {
            stock_id: record.stock_id.trim().to_string(),
            stock_name: record.stock_name.clone(),
            kind,
            dividend_per_share: per_share,
            quantity,
            total: per_share * quantity,
        }
    }

    fn build_inventory_holdings(inventory: &[InventoryRow]) -> HashMap<String, f64> {
        let mut holdings = HashMap::new();
        for row in inventory {
            let stock_id = row.stock_id.trim();
            if stock_id.is_empty() {
                continue;
            }
            if !row.total_quantity.is_finite() || row.total_quantity <= 0.0 {
                continue;
            }
            holdings.insert(stock_id.to_string(), row.total_quantity);
        }
        holdings
    }

    fn summarize_bucket(
        bucket: &CurrencyBucket,
        current_year: i32,
        as_of: NaiveDate,
    ) -> CurrencySummary {
        let annual_total = bucket
            .totals_by_year
            .get(&current_year)
            .copied()
            .unwrap_or(0.0);

        let months_elapsed = match bucket.max_month_index {
            Some(max) => max + 1,
            None if as_of.year() == current_year => as_of.month0() as usize + 1,
            None => 0,
        };
        let monthly_average = if annual_total > 0.0 && months_elapsed > 0 {
            annual_total / months_elapsed as f64
        } else {
            0.0
        };

        // Months without a payout count as zero up to the as-of month;
        // that zero can be the minimum (historical behavior, kept).
        let current_month_index = if as_of.year() == current_year {
            Some(as_of.month0() as usize)
        } else {
            bucket.max_month_index
        };
        let monthly_minimum = match current_month_index {
            Some(last) => bucket.monthly_totals[..=last]
                .iter()
                .copied()
                .fold(f64::INFINITY, f64::min),
            None => f64::INFINITY,
        };
        let monthly_minimum = if monthly_minimum.is_finite() {
            monthly_minimum
        } else {
            0.0
        };

        CurrencySummary {
            accumulated_total: bucket.accumulated_total,
            annual_total,
            monthly_average,
            monthly_minimum,
        }
    }
}

impl Default for DividendService {
    fn default() -> Self {
        Self::new()
    }
}
