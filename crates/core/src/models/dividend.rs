use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::transaction::parse_flexible_date;

/// A dividend announcement row as returned by the dividend-data API.
///
/// Like [`super::transaction::TransactionRecord`], this is the untrusted
/// external shape. The currency may arrive under three different field
/// names depending on the upstream data source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DividendRecord {
    #[serde(default)]
    pub stock_id: String,

    #[serde(default)]
    pub stock_name: Option<String>,

    /// Cash dividend per share.
    #[serde(default)]
    pub dividend: f64,

    /// Ex-dividend date (`YYYY-MM-DD`).
    #[serde(default)]
    pub dividend_date: Option<String>,

    /// Payment date (`YYYY-MM-DD`).
    #[serde(default)]
    pub payment_date: Option<String>,

    #[serde(default)]
    pub currency: Option<String>,

    #[serde(default)]
    pub dividend_currency: Option<String>,

    #[serde(default)]
    pub payment_currency: Option<String>,
}

impl DividendRecord {
    /// The date dividend attribution keys on: ex-date when parseable,
    /// payment date as fallback.
    pub fn reference_date(&self) -> Option<NaiveDate> {
        self.dividend_date
            .as_deref()
            .and_then(parse_flexible_date)
            .or_else(|| self.payment_date.as_deref().and_then(parse_flexible_date))
    }

    pub fn ex_date(&self) -> Option<NaiveDate> {
        self.dividend_date.as_deref().and_then(parse_flexible_date)
    }

    pub fn pay_date(&self) -> Option<NaiveDate> {
        self.payment_date.as_deref().and_then(parse_flexible_date)
    }

    /// First non-blank currency field, trimmed. Resolution order is
    /// `currency` → `dividend_currency` → `payment_currency`; alias
    /// normalization happens later in the currency service.
    pub fn raw_currency(&self) -> Option<&str> {
        [
            self.currency.as_deref(),
            self.dividend_currency.as_deref(),
            self.payment_currency.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
    }

    /// Dedup key used when merging chunked API responses.
    pub fn merge_key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.stock_id,
            self.dividend_date.as_deref().unwrap_or(""),
            self.payment_date.as_deref().unwrap_or("")
        )
    }
}

/// A validated dividend event: positive per-share amount, a usable
/// reference date, and a normalized currency code.
#[derive(Debug, Clone, PartialEq)]
pub struct DividendEvent {
    pub stock_id: String,
    pub per_share: f64,
    pub currency: String,
    pub date: NaiveDate,
}

/// Whether an alert fires on the ex-dividend date or the payment date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    /// Last chance to already hold the shares
    Ex,
    /// Cash lands in the account
    Pay,
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertKind::Ex => write!(f, "ex"),
            AlertKind::Pay => write!(f, "pay"),
        }
    }
}

/// A reminder row: "stock X goes ex / pays out on this date and you hold
/// N shares worth `total` in dividends".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendAlert {
    pub stock_id: String,
    pub stock_name: Option<String>,
    pub kind: AlertKind,
    pub dividend_per_share: f64,
    pub quantity: f64,
    pub total: f64,
}
