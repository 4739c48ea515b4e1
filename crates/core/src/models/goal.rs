use serde::{Deserialize, Serialize};

/// Which summary figure a cash-flow goal measures itself against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    /// Tracks `accumulated_total` (dividends ever received).
    Annual,
    /// Tracks `monthly_average`.
    Monthly,
    /// Tracks `monthly_minimum`.
    Minimum,
}

impl GoalType {
    /// Coerce free text: trimmed, case-insensitive, unknown means annual.
    pub fn from_raw(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("monthly") => GoalType::Monthly,
            Some("minimum") => GoalType::Minimum,
            _ => GoalType::Annual,
        }
    }
}

impl std::fmt::Display for GoalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GoalType::Annual => write!(f, "annual"),
            GoalType::Monthly => write!(f, "monthly"),
            GoalType::Minimum => write!(f, "minimum"),
        }
    }
}

/// One goal entry as persisted in user settings (untrusted).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalDefinition {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default, rename = "goalType")]
    pub goal_type: Option<String>,

    #[serde(default)]
    pub target: f64,

    #[serde(default)]
    pub currency: Option<String>,

    #[serde(default)]
    pub name: Option<String>,
}

/// The persisted goal configuration. Either the list form
/// (`cashflowGoals`) or the legacy flat form (one target per goal type);
/// the flat fields are only consulted when the list yields nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalConfig {
    #[serde(default, rename = "cashflowGoals")]
    pub cashflow_goals: Vec<GoalDefinition>,

    #[serde(default, rename = "totalTarget")]
    pub total_target: Option<f64>,

    #[serde(default, rename = "monthlyTarget")]
    pub monthly_target: Option<f64>,

    #[serde(default, rename = "minimumTarget")]
    pub minimum_target: Option<f64>,
}

/// A normalized cash-flow goal: positive finite target, canonical type
/// and currency, trimmed name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowGoal {
    pub id: String,
    pub goal_type: GoalType,
    pub target: f64,
    pub currency: String,
    pub name: String,
}

/// Encouragement tier. Message selection from a tier is a UI concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalTier {
    None,
    Half,
    Done,
}

impl GoalTier {
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 1.0 {
            GoalTier::Done
        } else if percent >= 0.5 {
            GoalTier::Half
        } else {
            GoalTier::None
        }
    }
}

/// Progress of one goal against the current summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalRow {
    pub id: String,
    /// Goal name (or goal type) plus the currency label, e.g. "FIRE (NT$)".
    pub label: String,
    pub goal_type: GoalType,
    pub currency: String,
    pub current_value: f64,
    pub target_value: f64,
    /// Clamped to `[0, 1]`.
    pub percent: f64,
    pub tier: GoalTier,
}

/// One monetary amount in one currency, for multi-currency metric rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyAmount {
    pub currency: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalMetricKind {
    /// Accumulated (all-years) dividend total.
    Ytd,
    Annual,
    Monthly,
    Minimum,
}

/// A top-line metric row: amounts per currency (base currency first),
/// flagged active when the primary goal tracks this figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalMetric {
    pub kind: GoalMetricKind,
    pub entries: Vec<CurrencyAmount>,
    pub is_active: bool,
}

/// The goal panel view model consumed by the (out-of-scope) UI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalViewModel {
    pub metrics: Vec<GoalMetric>,
    /// One row per normalized goal, in input order. The first row's goal
    /// type is the "primary" type consumers emphasize.
    pub rows: Vec<GoalRow>,
    pub primary_goal_type: Option<GoalType>,
    /// The first row's percent (0 when there are no rows).
    pub achievement_percent: f64,
    /// True when no usable goals are configured; the UI shows its own
    /// localized empty-state text.
    pub is_empty: bool,
}
