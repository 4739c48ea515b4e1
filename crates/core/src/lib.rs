pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::NaiveDate;
use models::{
    cache::{SummaryCache, SummaryCacheKey},
    dividend::{DividendAlert, DividendRecord},
    goal::{GoalConfig, GoalViewModel},
    inventory::{CostState, InventoryRow, InventorySummary},
    settings::Settings,
    summary::DividendSummary,
    transaction::{TradeKind, TransactionRecord},
    workspace::Workspace,
};
use providers::traits::{DividendProvider, DividendQuery};
use services::{
    cost_basis_service::CostBasisService, dividend_service::DividendService,
    goal_service::GoalService, holdings_service::HoldingsService,
    transaction_service::TransactionService,
};
use storage::manager::WorkspaceStore;

use errors::CoreError;

/// Main entry point for the Dividend Life core library.
///
/// Owns the persisted workspace (transaction history + settings), the
/// session inputs fetched by collaborators (dividend events, inventory
/// snapshot), and the summary memo. Everything monetary is recomputed
/// from these inputs; the tracker holds no derived state besides the
/// cache.
#[must_use]
pub struct DividendTracker {
    workspace: Workspace,
    dividend_events: Vec<DividendRecord>,
    inventory: Vec<InventoryRow>,

    transaction_service: TransactionService,
    holdings_service: HoldingsService,
    cost_basis_service: CostBasisService,
    dividend_service: DividendService,
    goal_service: GoalService,

    summary_cache: SummaryCache,
    // Revision counters stand in for the JS array-identity cache keys:
    // any mutation of an input set invalidates dependent cache entries.
    history_rev: u64,
    dividends_rev: u64,
    inventory_rev: u64,

    /// Tracks whether any workspace mutation occurred since save/load.
    dirty: bool,
}

impl std::fmt::Debug for DividendTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DividendTracker")
            .field("transactions", &self.workspace.transactions.len())
            .field("dividend_events", &self.dividend_events.len())
            .field("inventory_rows", &self.inventory.len())
            .field("cached_summaries", &self.summary_cache.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl DividendTracker {
    /// Create a brand new empty workspace with default settings.
    pub fn create_new() -> Self {
        Self::build(Workspace::default())
    }

    /// Load an existing workspace from encrypted bytes (password required).
    /// Use this for WASM / Tauri where the frontend handles file I/O.
    pub fn load_from_bytes(encrypted: &[u8], password: &str) -> Result<Self, CoreError> {
        let workspace = WorkspaceStore::load_from_bytes(encrypted, password)?;
        Ok(Self::build(workspace))
    }

    /// Load a workspace, starting fresh when the bytes are absent or
    /// structurally unreadable. A wrong password still errors.
    pub fn load_or_default(encrypted: Option<&[u8]>, password: &str) -> Result<Self, CoreError> {
        let workspace = WorkspaceStore::load_or_default(encrypted, password)?;
        Ok(Self::build(workspace))
    }

    /// Save the current workspace to encrypted bytes.
    /// Clears the unsaved-changes flag on success.
    pub fn save_to_bytes(&mut self, password: &str) -> Result<Vec<u8>, CoreError> {
        let bytes = WorkspaceStore::save_to_bytes(&self.workspace, password)?;
        self.dirty = false;
        Ok(bytes)
    }

    /// Load from an encrypted file on disk (native only, not WASM).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: &str, password: &str) -> Result<Self, CoreError> {
        let workspace = WorkspaceStore::load_from_file(path, password)?;
        Ok(Self::build(workspace))
    }

    /// Save to an encrypted file on disk (native only).
    /// Clears the unsaved-changes flag on success.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(&mut self, path: &str, password: &str) -> Result<(), CoreError> {
        WorkspaceStore::save_to_file(&self.workspace, path, password)?;
        self.dirty = false;
        Ok(())
    }

    // ── Transaction Management ──────────────────────────────────────

    /// Add a buy/sell transaction. Returns the assigned row id.
    pub fn add_transaction(
        &mut self,
        stock_id: impl Into<String>,
        stock_name: Option<String>,
        date: NaiveDate,
        quantity: f64,
        price: Option<f64>,
        kind: TradeKind,
    ) -> Result<String, CoreError> {
        let record = TransactionRecord {
            id: None,
            stock_id: stock_id.into(),
            stock_name,
            date: Some(date.format("%Y-%m-%d").to_string()),
            purchased_date: None,
            quantity,
            price,
            kind: Some(kind.to_string()),
        };
        let id = self
            .transaction_service
            .add_transaction(&mut self.workspace, record)?;
        self.touch_history();
        Ok(id)
    }

    /// Remove a transaction by its id. Returns the removed row.
    pub fn remove_transaction(&mut self, id: &str) -> Result<TransactionRecord, CoreError> {
        let removed = self
            .transaction_service
            .remove_transaction(&mut self.workspace, id)?;
        self.touch_history();
        Ok(removed)
    }

    /// Replace an existing transaction, keeping its id.
    pub fn update_transaction(
        &mut self,
        id: &str,
        updated: TransactionRecord,
    ) -> Result<(), CoreError> {
        self.transaction_service
            .update_transaction(&mut self.workspace, id, updated)?;
        self.touch_history();
        Ok(())
    }

    /// Replace the whole history with rows synced from a remote store.
    ///
    /// The sync path is loose: rows get ids and canonical
    /// buy/sell types, but broken rows are kept verbatim — the engine's
    /// normalizer skips them at computation time.
    pub fn replace_transactions(&mut self, records: Vec<TransactionRecord>) {
        let mut transactions: Vec<TransactionRecord> = records
            .into_iter()
            .map(|record| self.transaction_service.ensure_record(record))
            .collect();
        transactions.sort_by_key(|record| record.event_date());
        self.workspace.transactions = transactions;
        self.touch_history();
    }

    /// All transactions, newest first (for display).
    #[must_use]
    pub fn get_transactions(&self) -> Vec<&TransactionRecord> {
        self.transaction_service.get_transactions(&self.workspace)
    }

    /// The raw oldest-first history slice (what the engine replays).
    #[must_use]
    pub fn transaction_history(&self) -> &[TransactionRecord] {
        &self.workspace.transactions
    }

    #[must_use]
    pub fn transaction_count(&self) -> usize {
        self.workspace.transactions.len()
    }

    // ── Session Inputs ──────────────────────────────────────────────

    /// Replace the dividend event set (normally fetched via a
    /// [`DividendProvider`]).
    pub fn set_dividend_events(&mut self, events: Vec<DividendRecord>) {
        self.dividend_events = events;
        self.dividends_rev += 1;
    }

    #[must_use]
    pub fn dividend_events(&self) -> &[DividendRecord] {
        &self.dividend_events
    }

    /// Replace the inventory snapshot used as the attribution fallback
    /// when no transaction history exists.
    pub fn set_inventory(&mut self, inventory: Vec<InventoryRow>) {
        self.inventory = inventory;
        self.inventory_rev += 1;
    }

    /// Fetch dividend events from a provider and install them.
    /// Returns the number of records received.
    pub async fn refresh_dividend_events(
        &mut self,
        provider: &dyn DividendProvider,
        query: &DividendQuery,
    ) -> Result<usize, CoreError> {
        let events = provider.fetch_dividends(query).await?;
        let count = events.len();
        self.set_dividend_events(events);
        Ok(count)
    }

    // ── Dividend Engine ─────────────────────────────────────────────

    /// The full dividend summary as of a date.
    ///
    /// Memoized per `(history, dividends, inventory, as-of day)`; any
    /// input mutation invalidates the memo via the revision counters.
    pub fn dividend_summary(&mut self, as_of: NaiveDate) -> DividendSummary {
        let key = SummaryCacheKey {
            history_rev: self.history_rev,
            dividends_rev: self.dividends_rev,
            inventory_rev: self.inventory_rev,
            as_of,
        };
        if let Some(cached) = self.summary_cache.get(&key) {
            return cached.clone();
        }
        let summary = self.dividend_service.calculate_summary(
            &self.workspace.transactions,
            &self.dividend_events,
            &self.inventory,
            as_of,
        );
        self.summary_cache.insert(key, summary.clone());
        summary
    }

    /// Convenience: the summary as of today (UTC).
    pub fn dividend_summary_now(&mut self) -> DividendSummary {
        self.dividend_summary(chrono::Utc::now().date_naive())
    }

    /// Goal progress view model against the summary as of a date.
    pub fn goal_view_model(&mut self, as_of: NaiveDate) -> GoalViewModel {
        let summary = self.dividend_summary(as_of);
        self.goal_service
            .build_view_model(&summary, &self.workspace.settings.goals)
    }

    /// Quantity of a stock held as of a date (clamped timeline lookup).
    #[must_use]
    pub fn quantity_on(&self, stock_id: &str, date: NaiveDate) -> f64 {
        self.holdings_service
            .build_timelines(&self.workspace.transactions)
            .map(|timelines| self.holdings_service.quantity_on(&timelines, stock_id, date))
            .unwrap_or(0.0)
    }

    /// Weighted-average cost state of a stock as of a date.
    #[must_use]
    pub fn cost_state(&self, stock_id: &str, as_of: NaiveDate) -> CostState {
        self.cost_basis_service
            .cost_state_as_of(&self.workspace.transactions, stock_id, as_of)
    }

    /// Cost basis of the held position at a date
    /// (average cost × quantity held).
    #[must_use]
    pub fn cost_basis_on(&self, stock_id: &str, as_of: NaiveDate) -> f64 {
        self.cost_basis_service
            .cost_basis_on(&self.workspace.transactions, stock_id, as_of)
    }

    /// Currently held positions with weighted-average prices.
    #[must_use]
    pub fn inventory_summary(&self) -> InventorySummary {
        self.cost_basis_service
            .summarize_inventory(&self.workspace.transactions)
    }

    /// Stock ids with a positive current position, sorted.
    #[must_use]
    pub fn purchased_stock_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .inventory_summary()
            .positions
            .into_iter()
            .map(|position| position.stock_id)
            .collect();
        ids.sort();
        ids
    }

    /// Cash spent on buys during the reference date's calendar month.
    #[must_use]
    pub fn monthly_contribution(&self, reference_date: NaiveDate) -> f64 {
        self.cost_basis_service
            .monthly_contribution(&self.workspace.transactions, reference_date)
    }

    /// Dividend alerts (ex-date / payment-date reminders) for a date.
    #[must_use]
    pub fn dividend_alerts_on(&self, date: NaiveDate) -> Vec<DividendAlert> {
        self.dividend_service
            .alerts_on(&self.dividend_events, &self.workspace.transactions, date)
    }

    /// Alerts for tomorrow (UTC) — the notification use case.
    #[must_use]
    pub fn upcoming_dividend_alerts(&self) -> Vec<DividendAlert> {
        match chrono::Utc::now().date_naive().succ_opt() {
            Some(tomorrow) => self.dividend_alerts_on(tomorrow),
            None => Vec::new(),
        }
    }

    // ── Settings ────────────────────────────────────────────────────

    /// Set the default display currency (e.g., "TWD", "USD").
    /// Currency code must be a 3-letter alphabetic string.
    pub fn set_default_currency(&mut self, currency: String) -> Result<(), CoreError> {
        let trimmed = currency.trim().to_uppercase();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CoreError::ValidationError(format!(
                "Invalid currency code '{currency}': must be exactly 3 ASCII letters (e.g., TWD, USD)"
            )));
        }
        self.workspace.settings.default_currency = trimmed;
        self.dirty = true;
        Ok(())
    }

    /// Replace the cash-flow goal configuration.
    pub fn set_goals(&mut self, goals: GoalConfig) {
        self.workspace.settings.goals = goals;
        self.dirty = true;
    }

    #[must_use]
    pub fn goals(&self) -> &GoalConfig {
        &self.workspace.settings.goals
    }

    #[must_use]
    pub fn get_settings(&self) -> &Settings {
        &self.workspace.settings
    }

    // ── Password & Dirty State ──────────────────────────────────────

    /// Re-encrypt the workspace with a new password.
    /// Returns the encrypted bytes. The caller should write them out.
    ///
    /// `last_saved_bytes` must be the most recently saved bytes for this
    /// workspace; the current password is verified by decrypting them.
    pub fn change_password(
        &mut self,
        last_saved_bytes: &[u8],
        current_password: &str,
        new_password: &str,
    ) -> Result<Vec<u8>, CoreError> {
        // Proves the caller knows the old password before re-keying.
        WorkspaceStore::load_from_bytes(last_saved_bytes, current_password)?;

        let new_bytes = WorkspaceStore::save_to_bytes(&self.workspace, new_password)?;
        self.dirty = false;
        Ok(new_bytes)
    }

    /// Returns `true` if the workspace changed since the last save/load.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Export the transaction list as a JSON string.
    pub fn export_transactions_to_json(&self) -> Result<String, CoreError> {
        self.transaction_service.export_json(&self.workspace)
    }

    /// Export the transaction list as a CSV string.
    /// Columns: id,stock_id,stock_name,date,quantity,price,type
    #[must_use]
    pub fn export_transactions_to_csv(&self) -> String {
        self.transaction_service.export_csv(&self.workspace)
    }

    /// Import transactions from a JSON array (all-or-nothing).
    /// Returns the number of rows imported.
    pub fn import_transactions_from_json(&mut self, json: &str) -> Result<usize, CoreError> {
        let count = self
            .transaction_service
            .import_json(&mut self.workspace, json)?;
        self.touch_history();
        Ok(count)
    }

    // ── Cache Management ────────────────────────────────────────────

    #[must_use]
    pub fn summary_cache_len(&self) -> usize {
        self.summary_cache.len()
    }

    /// Drop every memoized summary.
    pub fn clear_summary_cache(&mut self) {
        self.summary_cache.clear();
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(workspace: Workspace) -> Self {
        Self {
            workspace,
            dividend_events: Vec::new(),
            inventory: Vec::new(),
            transaction_service: TransactionService::new(),
            holdings_service: HoldingsService::new(),
            cost_basis_service: CostBasisService::new(),
            dividend_service: DividendService::new(),
            goal_service: GoalService::new(),
            summary_cache: SummaryCache::new(),
            history_rev: 0,
            dividends_rev: 0,
            inventory_rev: 0,
            dirty: false,
        }
    }

    fn touch_history(&mut self) {
        self.history_rev += 1;
        self.dirty = true;
    }
}
