use serde::{Deserialize, Serialize};

/// A flat inventory snapshot row, used only as the attribution fallback
/// when no usable transaction history exists. Not date-aware: it answers
/// every point-in-time question with the current quantity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryRow {
    #[serde(default)]
    pub stock_id: String,

    #[serde(default)]
    pub stock_name: Option<String>,

    #[serde(default)]
    pub total_quantity: f64,
}

/// Running weighted-average cost accounting for one stock.
///
/// Invariant: both fields are non-negative, and `total_quantity == 0`
/// implies `total_cost == 0` (enforced by clamping on sells).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CostState {
    pub total_quantity: f64,
    pub total_cost: f64,
}

impl CostState {
    /// Weighted average cost per share, or 0 when nothing is held.
    pub fn average_cost(&self) -> f64 {
        if self.total_quantity > 0.0 {
            self.total_cost / self.total_quantity
        } else {
            0.0
        }
    }
}

/// One stock's aggregated position after replaying the full history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryPosition {
    pub stock_id: String,
    pub stock_name: String,
    pub total_quantity: f64,
    pub total_cost: f64,
    /// `total_cost / total_quantity`
    pub avg_price: f64,
}

/// All currently held positions plus the cost sum across them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub positions: Vec<InventoryPosition>,
    pub total_investment: f64,
}
