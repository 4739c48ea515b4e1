use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Aggregated dividend cash for one currency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrencySummary {
    /// Total dividends ever received in this currency, across all years.
    pub accumulated_total: f64,

    /// Current-year total.
    pub annual_total: f64,

    /// Current-year total divided by the number of elapsed months
    /// (through the last month with a payout, or the as-of month).
    pub monthly_average: f64,

    /// Minimum of the current year's monthly totals through the as-of
    /// month; months without a payout count as zero.
    pub monthly_minimum: f64,
}

/// The full dividend summary: headline figures in the base currency plus
/// the per-currency breakdown.
///
/// The headline block duplicates `per_currency[base_currency]` so view
/// code never has to re-derive which currency leads the display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DividendSummary {
    pub accumulated_total: f64,
    pub annual_total: f64,
    /// The year `annual_total` covers (the as-of date's year).
    pub annual_year: i32,
    pub monthly_average: f64,
    pub monthly_minimum: f64,

    /// `"TWD"` when TWD dividends were observed, otherwise the first
    /// currency encountered in the event stream.
    pub base_currency: String,

    pub per_currency: HashMap<String, CurrencySummary>,

    /// Currencies in the order they were first observed. Drives the
    /// base-currency choice and keeps display ordering stable.
    pub currency_order: Vec<String>,
}

impl DividendSummary {
    /// Per-currency figures, falling back to the headline block for the
    /// base currency and zeros for anything never observed.
    pub fn for_currency(&self, currency: &str) -> CurrencySummary {
        if let Some(summary) = self.per_currency.get(currency) {
            return *summary;
        }
        if currency == self.base_currency {
            return CurrencySummary {
                accumulated_total: self.accumulated_total,
                annual_total: self.annual_total,
                monthly_average: self.monthly_average,
                monthly_minimum: self.monthly_minimum,
            };
        }
        CurrencySummary::default()
    }
}
