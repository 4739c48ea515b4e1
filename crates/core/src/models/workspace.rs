use serde::{Deserialize, Serialize};

use super::settings::Settings;
use super::transaction::TransactionRecord;

/// The persisted data container. Everything in here gets serialized,
/// encrypted, and saved to the portable .dvlf file.
///
/// Dividend events and inventory snapshots are NOT part of the workspace:
/// they come from the dividend API / remote sync at call time and are
/// only session state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    /// Buy/sell transaction history, kept sorted by event date.
    pub transactions: Vec<TransactionRecord>,

    /// User settings (display currency, cash-flow goals).
    #[serde(default)]
    pub settings: Settings,
}
