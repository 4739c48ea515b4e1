use serde::{Deserialize, Serialize};

use super::goal::GoalConfig;

/// User-configurable settings, stored inside the encrypted workspace file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Headline display currency (e.g., "TWD", "USD").
    pub default_currency: String,

    /// Cash-flow goal configuration (list form or legacy flat form).
    #[serde(default)]
    pub goals: GoalConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_currency: "TWD".to_string(),
            goals: GoalConfig::default(),
        }
    }
}
