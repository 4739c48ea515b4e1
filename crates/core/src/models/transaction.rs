use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeKind {
    /// Buying / acquiring shares
    Buy,
    /// Selling / disposing of shares
    Sell,
}

impl std::fmt::Display for TradeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeKind::Buy => write!(f, "buy"),
            TradeKind::Sell => write!(f, "sell"),
        }
    }
}

/// A transaction row as persisted/synced by the apps.
///
/// This is the loose external shape: dates are strings, the price may be
/// absent (sells never carry one), and `type` is free text. Nothing here
/// is trusted — [`TransactionEvent::from_record`] is the only way rows
/// enter the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Row id; assigned on first save when the source omitted one.
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub stock_id: String,

    #[serde(default)]
    pub stock_name: Option<String>,

    /// Primary event date as a string (`YYYY-MM-DD`, possibly longer ISO).
    #[serde(default)]
    pub date: Option<String>,

    /// Legacy field name still present in old exports.
    #[serde(default)]
    pub purchased_date: Option<String>,

    #[serde(default)]
    pub quantity: f64,

    /// Purchase price per share. Always `None` on sells.
    #[serde(default)]
    pub price: Option<f64>,

    /// `"sell"` means sell; anything else (including missing) means buy.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl TransactionRecord {
    /// Coerce the free-text `type` field. Only the exact string `"sell"`
    /// is a sell; every other value is treated as a buy.
    pub fn trade_kind(&self) -> TradeKind {
        match self.kind.as_deref() {
            Some("sell") => TradeKind::Sell,
            _ => TradeKind::Buy,
        }
    }

    /// Resolve the event date: `date` with fallback `purchased_date`.
    pub fn event_date(&self) -> Option<NaiveDate> {
        self.date
            .as_deref()
            .and_then(parse_flexible_date)
            .or_else(|| self.purchased_date.as_deref().and_then(parse_flexible_date))
    }
}

/// A validated buy/sell event, ready for replay.
///
/// `index` is the row's position in the source array; it breaks ties
/// between events sharing a date so replay order is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionEvent {
    pub stock_id: String,
    pub date: NaiveDate,
    /// Always finite and non-zero; the sign of the holdings delta comes
    /// from `kind`, not from this value.
    pub quantity: f64,
    pub price: Option<f64>,
    pub kind: TradeKind,
    pub index: usize,
}

impl TransactionEvent {
    /// Normalize a raw row into a typed event, or `None` if the row is
    /// unusable (empty stock id, non-finite/zero quantity, no parseable
    /// date). Dropping a row is deliberate policy, not an error.
    pub fn from_record(record: &TransactionRecord, index: usize) -> Option<Self> {
        let stock_id = record.stock_id.trim();
        if stock_id.is_empty() {
            return None;
        }
        if !record.quantity.is_finite() || record.quantity == 0.0 {
            return None;
        }
        let date = record.event_date()?;
        let kind = record.trade_kind();
        let price = record.price.filter(|p| p.is_finite());

        Some(Self {
            stock_id: stock_id.to_string(),
            date,
            quantity: record.quantity,
            price,
            kind,
            index,
        })
    }

    /// Signed holdings delta: positive for buys, negative for sells.
    pub fn delta(&self) -> f64 {
        match self.kind {
            TradeKind::Buy => self.quantity,
            TradeKind::Sell => -self.quantity,
        }
    }
}

/// Parse the date strings the apps persist: `YYYY-MM-DD`, `YYYY/MM/DD`,
/// or a longer ISO timestamp whose first ten characters are the date.
pub(crate) fn parse_flexible_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y/%m/%d") {
        return Some(date);
    }
    if trimmed.len() > 10 {
        if let Ok(date) = NaiveDate::parse_from_str(&trimmed[..10], "%Y-%m-%d") {
            return Some(date);
        }
    }
    None
}
