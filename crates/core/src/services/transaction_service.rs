use chrono::NaiveDate;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::transaction::{TradeKind, TransactionRecord};
use crate::models::workspace::Workspace;

/// Manages the workspace transaction list: id assignment, date-sorted
/// insertion, validation, and export.
///
/// Pure business logic — no I/O. The engine's replay clamps over-sells,
/// so unlike a brokerage ledger there is no "can't sell more than you
/// own" rule here; only structurally broken rows are rejected.
pub struct TransactionService;

impl TransactionService {
    pub fn new() -> Self {
        Self
    }

    /// Canonicalize a row before it enters the workspace: assign an id
    /// when missing, pin `type` to exactly "buy"/"sell", clear prices on
    /// sells, and drop non-finite prices on buys.
    pub fn ensure_record(&self, mut record: TransactionRecord) -> TransactionRecord {
        let has_id = record
            .id
            .as_deref()
            .map(|id| !id.trim().is_empty())
            .unwrap_or(false);
        if !has_id {
            record.id = Some(Uuid::new_v4().to_string());
        }
        let kind = record.trade_kind();
        record.kind = Some(kind.to_string());
        record.price = match kind {
            TradeKind::Sell => None,
            TradeKind::Buy => record.price.filter(|p| p.is_finite()),
        };
        record
    }

    /// Add a transaction to the workspace.
    /// Returns the (possibly freshly assigned) row id.
    pub fn add_transaction(
        &self,
        workspace: &mut Workspace,
        record: TransactionRecord,
    ) -> Result<String, CoreError> {
        let date = self.validate(&record)?;
        let record = self.ensure_record(record);
        let id = record.id.clone().unwrap_or_default();
        Self::sorted_insert(&mut workspace.transactions, record, date);
        Ok(id)
    }

    /// Remove a transaction by id. Returns the removed row.
    pub fn remove_transaction(
        &self,
        workspace: &mut Workspace,
        id: &str,
    ) -> Result<TransactionRecord, CoreError> {
        let idx = workspace
            .transactions
            .iter()
            .position(|record| record.id.as_deref() == Some(id))
            .ok_or_else(|| CoreError::TransactionNotFound(id.to_string()))?;
        Ok(workspace.transactions.remove(idx))
    }

    /// Replace an existing transaction, keeping its id. Validates the
    /// new row before committing; on failure the old row stays.
    pub fn update_transaction(
        &self,
        workspace: &mut Workspace,
        id: &str,
        mut updated: TransactionRecord,
    ) -> Result<(), CoreError> {
        let date = self.validate(&updated)?;
        let old = self.remove_transaction(workspace, id)?;
        updated.id = old.id.clone();
        let updated = self.ensure_record(updated);
        Self::sorted_insert(&mut workspace.transactions, updated, date);
        Ok(())
    }

    /// All transactions, newest first (for display).
    pub fn get_transactions<'a>(&self, workspace: &'a Workspace) -> Vec<&'a TransactionRecord> {
        let mut records: Vec<&TransactionRecord> = workspace.transactions.iter().collect();
        records.reverse(); // internal storage is oldest-first
        records
    }

    /// Export the transaction list as a CSV string.
    /// Columns: id,stock_id,stock_name,date,quantity,price,type
    pub fn export_csv(&self, workspace: &Workspace) -> String {
        let mut csv = String::from("id,stock_id,stock_name,date,quantity,price,type\n");
        for record in &workspace.transactions {
            let price = record
                .price
                .map(|p| p.to_string())
                .unwrap_or_default();
            csv.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                record.id.as_deref().unwrap_or(""),
                escape_csv(&record.stock_id),
                escape_csv(record.stock_name.as_deref().unwrap_or("")),
                record.date.as_deref().unwrap_or(""),
                record.quantity,
                price,
                record.kind.as_deref().unwrap_or("buy"),
            ));
        }
        csv
    }

    /// Export the transaction list as pretty-printed JSON.
    pub fn export_json(&self, workspace: &Workspace) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&workspace.transactions).map_err(|e| {
            CoreError::Serialization(format!("Failed to serialize transactions to JSON: {e}"))
        })
    }

    /// Import transactions from a JSON array. All rows are validated
    /// first; if any row fails, none are added (all-or-nothing).
    /// Returns the number of rows imported.
    pub fn import_json(
        &self,
        workspace: &mut Workspace,
        json: &str,
    ) -> Result<usize, CoreError> {
        let records: Vec<TransactionRecord> = serde_json::from_str(json)?;
        let mut staged = workspace.clone();
        let count = records.len();
        for record in records {
            self.add_transaction(&mut staged, record)?;
        }
        *workspace = staged;
        Ok(count)
    }

    /// Rows entering through the facade must be structurally sound:
    /// a stock id, a positive finite quantity, and a parseable date.
    /// (Bulk-synced history is looser — the normalizer just skips its
    /// broken rows.)
    fn validate(&self, record: &TransactionRecord) -> Result<NaiveDate, CoreError> {
        if record.stock_id.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "Transaction stock_id must not be empty".into(),
            ));
        }
        if !record.quantity.is_finite() || record.quantity <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Transaction quantity must be a positive number, got {}",
                record.quantity
            )));
        }
        record.event_date().ok_or_else(|| {
            CoreError::ValidationError(format!(
                "Transaction date '{}' is not a valid date",
                record
                    .date
                    .as_deref()
                    .or(record.purchased_date.as_deref())
                    .unwrap_or("")
            ))
        })
    }

    /// Insert keeping date order; equal dates append after existing ones
    /// so insertion order is the tie-break.
    fn sorted_insert(records: &mut Vec<TransactionRecord>, record: TransactionRecord, date: NaiveDate) {
        let pos = records.partition_point(|existing| {
            existing.event_date().map(|d| d <= date).unwrap_or(true)
        });
        records.insert(pos, record);
    }
}

fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

impl Default for TransactionService {
    fn default() -> Self {
        Self::new()
    }
}
