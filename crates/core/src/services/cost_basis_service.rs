use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

use crate::models::inventory::{CostState, InventoryPosition, InventorySummary};
use crate::models::transaction::{TradeKind, TransactionEvent, TransactionRecord};

use super::holdings_service::HoldingsService;

/// Weighted-average cost accounting over the transaction log.
///
/// Selling reduces quantity and total cost proportionally (never FIFO or
/// LIFO lots), so the average cost per share is unchanged by a sell.
pub struct CostBasisService {
    holdings_service: HoldingsService,
}

impl CostBasisService {
    pub fn new() -> Self {
        Self {
            holdings_service: HoldingsService::new(),
        }
    }

    /// Replay one stock's events through `as_of` and return the running
    /// cost state.
    ///
    /// Buys without a finite price are skipped entirely here — a priced
    /// position can't absorb unpriced quantity without corrupting the
    /// average. (The holdings timeline still counts them; quantity and
    /// cost are tracked independently.)
    pub fn cost_state_as_of(
        &self,
        history: &[TransactionRecord],
        stock_id: &str,
        as_of: NaiveDate,
    ) -> CostState {
        let mut events: Vec<TransactionEvent> = self
            .holdings_service
            .normalize_events(history)
            .into_iter()
            .filter(|event| event.stock_id == stock_id && event.date <= as_of)
            .collect();
        events.sort_by(|a, b| a.date.cmp(&b.date).then(a.index.cmp(&b.index)));

        let mut state = CostState::default();
        for event in &events {
            Self::apply(&mut state, event);
        }
        state
    }

    /// Cost basis of the held position at `as_of`: the weighted average
    /// cost times the quantity actually held on that date.
    pub fn cost_basis_on(
        &self,
        history: &[TransactionRecord],
        stock_id: &str,
        as_of: NaiveDate,
    ) -> f64 {
        let state = self.cost_state_as_of(history, stock_id, as_of);
        let quantity = self
            .holdings_service
            .build_timelines(history)
            .map(|timelines| {
                self.holdings_service
                    .quantity_on(&timelines, stock_id, as_of)
            })
            .unwrap_or(0.0);
        state.average_cost() * quantity
    }

    /// Aggregate the full history into currently held positions.
    ///
    /// Unlike the cost replay above, a buy without a usable price still
    /// adds its quantity (at zero cost) — the app has always shown such
    /// rows in the inventory table rather than hiding them.
    pub fn summarize_inventory(&self, history: &[TransactionRecord]) -> InventorySummary {
        let mut events = self.holdings_service.normalize_events(history);
        events.sort_by(|a, b| a.date.cmp(&b.date).then(a.index.cmp(&b.index)));

        let mut states: HashMap<String, CostState> = HashMap::new();
        let mut names: HashMap<String, String> = HashMap::new();
        let mut order: Vec<String> = Vec::new();

        for event in &events {
            if !states.contains_key(&event.stock_id) {
                order.push(event.stock_id.clone());
            }
            let state = states.entry(event.stock_id.clone()).or_default();
            match event.kind {
                TradeKind::Buy => {
                    let price = event.price.unwrap_or(0.0);
                    state.total_quantity += event.quantity;
                    state.total_cost += event.quantity * price;
                }
                TradeKind::Sell => {
                    let sold = event.quantity.min(state.total_quantity);
                    if sold > 0.0 && state.total_quantity > 0.0 {
                        let avg_cost = state.total_cost / state.total_quantity;
                        state.total_quantity -= sold;
                        state.total_cost -= avg_cost * sold;
                        clamp(state);
                    }
                }
            }
        }

        // Names come from the first row that carries one.
        for record in history {
            let stock_id = record.stock_id.trim();
            if stock_id.is_empty() || names.contains_key(stock_id) {
                continue;
            }
            if let Some(name) = record.stock_name.as_deref() {
                let trimmed = name.trim();
                if !trimmed.is_empty() {
                    names.insert(stock_id.to_string(), trimmed.to_string());
                }
            }
        }

        let positions: Vec<InventoryPosition> = order
            .into_iter()
            .filter_map(|stock_id| {
                let state = states.get(&stock_id)?;
                if state.total_quantity <= 0.0 {
                    return None;
                }
                Some(InventoryPosition {
                    stock_name: names.get(&stock_id).cloned().unwrap_or_default(),
                    total_quantity: state.total_quantity,
                    total_cost: state.total_cost,
                    avg_price: state.average_cost(),
                    stock_id,
                })
            })
            .collect();

        let total_investment = positions.iter().map(|p| p.total_cost).sum();

        InventorySummary {
            positions,
            total_investment,
        }
    }

    /// Sum of `quantity * price` over buys landing in the reference
    /// date's calendar month.
    pub fn monthly_contribution(
        &self,
        history: &[TransactionRecord],
        reference_date: NaiveDate,
    ) -> f64 {
        self.holdings_service
            .normalize_events(history)
            .iter()
            .filter(|event| {
                event.kind == TradeKind::Buy
                    && event.date.year() == reference_date.year()
                    && event.date.month() == reference_date.month()
            })
            .map(|event| event.quantity * event.price.unwrap_or(0.0))
            .sum()
    }

    fn apply(state: &mut CostState, event: &TransactionEvent) {
        match event.kind {
            TradeKind::Buy => {
                let Some(price) = event.price else {
                    return;
                };
                state.total_cost += event.quantity * price;
                state.total_quantity += event.quantity;
            }
            TradeKind::Sell => {
                let avg_cost = state.average_cost();
                let sold = event.quantity.min(state.total_quantity);
                state.total_quantity -= sold;
                state.total_cost -= avg_cost * sold;
                clamp(state);
            }
        }
    }
}

/// Re-establish the invariant after float arithmetic: no negative
/// quantity or cost, and an empty position carries no cost.
fn clamp(state: &mut CostState) {
    if state.total_quantity <= 0.0 {
        state.total_quantity = 0.0;
        state.total_cost = 0.0;
    }
    if state.total_cost < 0.0 {
        state.total_cost = 0.0;
    }
}

impl Default for CostBasisService {
    fn default() -> Self {
        Self::new()
    }
}
