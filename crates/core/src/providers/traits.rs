use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::dividend::DividendRecord;

/// Countries queried when the caller specifies none.
pub const DEFAULT_DIVIDEND_COUNTRIES: [&str; 2] = ["tw", "us"];

/// A request for dividend announcements.
///
/// Empty `years`/`stock_ids`/`fields` mean "no filter"; empty `countries`
/// fall back to the Taiwan + US default at normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DividendQuery {
    pub years: Vec<i32>,
    /// Lowercase ISO country codes (e.g., "tw", "us").
    pub countries: Vec<String>,
    pub stock_ids: Vec<String>,
    /// Optional field projection understood by the API.
    pub fields: Vec<String>,
}

impl DividendQuery {
    pub fn for_years(years: impl IntoIterator<Item = i32>) -> Self {
        Self {
            years: years.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Canonical form: blanks dropped, countries lowercased (defaulted
    /// when none survive), duplicates removed with first-wins order.
    pub fn normalized(&self) -> Self {
        let mut years = Vec::new();
        for year in &self.years {
            if !years.contains(year) {
                years.push(*year);
            }
        }

        let mut countries = Vec::new();
        for country in &self.countries {
            let code = country.trim().to_lowercase();
            if !code.is_empty() && !countries.contains(&code) {
                countries.push(code);
            }
        }
        if countries.is_empty() {
            countries = DEFAULT_DIVIDEND_COUNTRIES
                .iter()
                .map(|c| c.to_string())
                .collect();
        }

        let mut stock_ids = Vec::new();
        for stock_id in &self.stock_ids {
            let id = stock_id.trim().to_string();
            if !id.is_empty() && !stock_ids.contains(&id) {
                stock_ids.push(id);
            }
        }

        let mut fields = Vec::new();
        for field in &self.fields {
            let name = field.trim().to_string();
            if !name.is_empty() && !fields.contains(&name) {
                fields.push(name);
            }
        }

        Self {
            years,
            countries,
            stock_ids,
            fields,
        }
    }
}

/// Trait abstraction for dividend data sources.
///
/// The engine never fetches anything itself — it consumes whatever record
/// slice a provider (or a test fixture) hands it. Swapping the hosted API
/// for a file dump means swapping one implementation.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait DividendProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch dividend announcements matching the query.
    async fn fetch_dividends(&self, query: &DividendQuery) -> Result<Vec<DividendRecord>, CoreError>;
}
