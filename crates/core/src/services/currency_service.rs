/// Currency code normalization and display conventions.
///
/// The dividend API mixes legacy Taiwan codes (`NTD`, `NT$`) with ISO
/// codes; everything funnels through `normalize` before bucketing so a
/// single holding never splits across spellings. Unrecognized codes pass
/// through uppercased; there is no registry check.
pub struct CurrencyService;

/// Currency assumed when a record carries none at all.
pub const DEFAULT_CURRENCY: &str = "TWD";

impl CurrencyService {
    pub fn new() -> Self {
        Self
    }

    /// Canonical currency code for a raw value. Blank or absent means
    /// the default (`TWD`).
    pub fn normalize(&self, raw: Option<&str>) -> String {
        let trimmed = match raw {
            Some(value) => value.trim(),
            None => return DEFAULT_CURRENCY.to_string(),
        };
        if trimmed.is_empty() {
            return DEFAULT_CURRENCY.to_string();
        }
        let upper = trimmed.to_uppercase();
        match upper.as_str() {
            "NTD" | "NT$" => "TWD".to_string(),
            "US$" => "USD".to_string(),
            _ => upper,
        }
    }

    /// Short display label for a currency code. Unknown codes label as
    /// themselves.
    pub fn label<'a>(&self, code: &'a str) -> &'a str {
        match code {
            "TWD" => "NT$",
            "USD" => "US$",
            "HKD" => "HK$",
            "CNY" => "CN¥",
            "JPY" => "JP¥",
            "EUR" => "€",
            "GBP" => "£",
            "SGD" => "S$",
            "AUD" => "A$",
            "CAD" => "CA$",
            "KRW" => "₩",
            "NZD" => "NZ$",
            other => other,
        }
    }

    /// Display order: the base currency leads, the rest alphabetical.
    pub fn sorted_for_display(&self, codes: &[String], base_currency: &str) -> Vec<String> {
        let mut sorted: Vec<String> = codes.to_vec();
        sorted.sort_by(|a, b| {
            if a == base_currency {
                return std::cmp::Ordering::Less;
            }
            if b == base_currency {
                return std::cmp::Ordering::Greater;
            }
            a.cmp(b)
        });
        sorted
    }
}

impl Default for CurrencyService {
    fn default() -> Self {
        Self::new()
    }
}
