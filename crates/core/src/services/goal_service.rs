use crate::models::goal::{
    CashflowGoal, CurrencyAmount, GoalConfig, GoalMetric, GoalMetricKind, GoalRow, GoalTier,
    GoalType, GoalViewModel,
};
use crate::models::summary::{CurrencySummary, DividendSummary};

use super::currency_service::{CurrencyService, DEFAULT_CURRENCY};

/// Goal currencies the apps let users pick from. Anything else collapses
/// to the summary's base currency.
const SUPPORTED_GOAL_CURRENCIES: [&str; 2] = ["TWD", "USD"];

/// Maximum stored goal-name length.
const MAX_GOAL_NAME_LEN: usize = 60;

/// Normalizes goal configuration and measures each goal against the
/// dividend summary.
pub struct GoalService {
    currency_service: CurrencyService,
}

impl GoalService {
    pub fn new() -> Self {
        Self {
            currency_service: CurrencyService::new(),
        }
    }

    /// Canonical goal list from either config shape.
    ///
    /// The list form wins whenever it yields at least one usable goal;
    /// the legacy flat targets are consulted only then, so running the
    /// output back through this function can never duplicate goals.
    pub fn normalize_goals(&self, config: &GoalConfig, base_currency: &str) -> Vec<CashflowGoal> {
        let goals: Vec<CashflowGoal> = config
            .cashflow_goals
            .iter()
            .enumerate()
            .filter_map(|(index, raw)| {
                if !raw.target.is_finite() || raw.target <= 0.0 {
                    return None;
                }
                let id = raw
                    .id
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("goal-{index}"));
                Some(CashflowGoal {
                    id,
                    goal_type: GoalType::from_raw(raw.goal_type.as_deref()),
                    target: raw.target,
                    currency: self.normalize_goal_currency(raw.currency.as_deref(), base_currency),
                    name: sanitize_goal_name(raw.name.as_deref()),
                })
            })
            .collect();

        if !goals.is_empty() {
            return goals;
        }

        let mut fallback = Vec::new();
        let mut append = |goal_type: GoalType, value: Option<f64>| {
            let Some(target) = value.filter(|v| v.is_finite() && *v > 0.0) else {
                return;
            };
            fallback.push(CashflowGoal {
                id: format!("legacy-{goal_type}"),
                goal_type,
                target,
                currency: self.normalize_goal_currency(Some(DEFAULT_CURRENCY), base_currency),
                name: String::new(),
            });
        };
        append(GoalType::Annual, config.total_target);
        append(GoalType::Monthly, config.monthly_target);
        append(GoalType::Minimum, config.minimum_target);
        fallback
    }

    /// Build the goal panel view model for a computed summary.
    pub fn build_view_model(&self, summary: &DividendSummary, config: &GoalConfig) -> GoalViewModel {
        let goals = self.normalize_goals(config, &summary.base_currency);

        let rows: Vec<GoalRow> = goals.iter().map(|goal| self.build_row(goal, summary)).collect();

        let primary_goal_type = if rows.is_empty() {
            None
        } else {
            goals.first().map(|goal| goal.goal_type)
        };
        let achievement_percent = rows.first().map(|row| row.percent).unwrap_or(0.0);

        let metrics = [
            (GoalMetricKind::Ytd, None),
            (GoalMetricKind::Annual, Some(GoalType::Annual)),
            (GoalMetricKind::Monthly, Some(GoalType::Monthly)),
            (GoalMetricKind::Minimum, Some(GoalType::Minimum)),
        ]
        .into_iter()
        .map(|(kind, active_for)| GoalMetric {
            kind,
            entries: self.metric_entries(summary, kind),
            is_active: active_for.is_some() && active_for == primary_goal_type,
        })
        .collect();

        GoalViewModel {
            metrics,
            is_empty: rows.is_empty(),
            rows,
            primary_goal_type,
            achievement_percent,
        }
    }

    fn build_row(&self, goal: &CashflowGoal, summary: &DividendSummary) -> GoalRow {
        let currency_summary = summary.for_currency(&goal.currency);
        let current_value = match goal.goal_type {
            // Annual goals track the accumulated (all-years) total.
            GoalType::Annual => currency_summary.accumulated_total,
            GoalType::Monthly => currency_summary.monthly_average,
            GoalType::Minimum => currency_summary.monthly_minimum,
        };
        let percent = if goal.target > 0.0 {
            (current_value / goal.target).min(1.0)
        } else {
            0.0
        };

        let base_label = if goal.name.is_empty() {
            goal.goal_type.to_string()
        } else {
            goal.name.clone()
        };
        let label = format!("{} ({})", base_label, self.currency_service.label(&goal.currency));

        GoalRow {
            id: goal.id.clone(),
            label,
            goal_type: goal.goal_type,
            currency: goal.currency.clone(),
            current_value,
            target_value: goal.target,
            percent,
            tier: GoalTier::from_percent(percent),
        }
    }

    /// Per-currency amounts for one metric, base currency first. Entries
    /// with a positive amount win; when every amount is zero or negative
    /// the full list is shown instead of nothing.
    fn metric_entries(&self, summary: &DividendSummary, kind: GoalMetricKind) -> Vec<CurrencyAmount> {
        let codes: Vec<String> = summary.per_currency.keys().cloned().collect();
        if codes.is_empty() {
            return Vec::new();
        }
        let sorted = self
            .currency_service
            .sorted_for_display(&codes, &summary.base_currency);

        let entries: Vec<CurrencyAmount> = sorted
            .into_iter()
            .map(|currency| {
                let amount = summary
                    .per_currency
                    .get(&currency)
                    .map(|s| metric_value(s, kind))
                    .unwrap_or(0.0);
                CurrencyAmount { currency, amount }
            })
            .collect();

        let positive: Vec<CurrencyAmount> = entries
            .iter()
            .filter(|entry| entry.amount > 0.0)
            .cloned()
            .collect();
        if positive.is_empty() {
            entries
        } else {
            positive
        }
    }

    fn normalize_goal_currency(&self, raw: Option<&str>, base_currency: &str) -> String {
        let upper = raw.map(|v| v.trim().to_uppercase()).unwrap_or_default();
        if SUPPORTED_GOAL_CURRENCIES.contains(&upper.as_str()) {
            return upper;
        }
        let base = base_currency.trim();
        if !base.is_empty() {
            return base.to_string();
        }
        DEFAULT_CURRENCY.to_string()
    }
}

fn metric_value(summary: &CurrencySummary, kind: GoalMetricKind) -> f64 {
    match kind {
        GoalMetricKind::Ytd => summary.accumulated_total,
        GoalMetricKind::Annual => summary.annual_total,
        GoalMetricKind::Monthly => summary.monthly_average,
        GoalMetricKind::Minimum => summary.monthly_minimum,
    }
}

fn sanitize_goal_name(value: Option<&str>) -> String {
    value
        .map(|v| v.trim().chars().take(MAX_GOAL_NAME_LEN).collect())
        .unwrap_or_default()
}

impl Default for GoalService {
    fn default() -> Self {
        Self::new()
    }
}
