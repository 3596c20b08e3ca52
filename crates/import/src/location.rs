use stmtnorm_core::{NormalizerConfig, Section};

/// Trailing words that are part of a company name, never a place.
const NOT_LOCATIONS: [&str; 3] = ["LTD", "LIMITED", "PVT"];

/// Infers where a transaction happened and whether it counts as international.
pub struct LocationExtractor {
    tokens: Vec<String>,
    keywords: Vec<String>,
    home_currency: String,
}

impl LocationExtractor {
    pub fn new(config: &NormalizerConfig) -> Self {
        Self {
            tokens: upper_all(&config.location_tokens),
            keywords: upper_all(&config.international_keywords),
            home_currency: config.default_currency.clone(),
        }
    }

    /// Location tag for a description, lowercased.
    ///
    /// A known city anywhere in the text wins. Otherwise the last word is
    /// used unless it is a number or a company suffix. Returns an empty
    /// string when nothing qualifies.
    pub fn extract_location(&self, description: &str) -> String {
        if let Some(city) = self.known_location(description) {
            return city;
        }

        let Some(last) = description
            .split_whitespace()
            .next_back()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        else {
            return String::new();
        };
        if last.is_empty()
            || last.chars().all(|c| c.is_ascii_digit())
            || NOT_LOCATIONS.contains(&last.to_uppercase().as_str())
        {
            return String::new();
        }
        last.to_lowercase()
    }

    /// First configured city contained in the description, lowercased.
    pub fn known_location(&self, description: &str) -> Option<String> {
        let upper = description.to_uppercase();
        self.tokens
            .iter()
            .find(|t| upper.contains(t.as_str()))
            .map(|t| t.to_lowercase())
    }

    /// Domestic or International for a finished record.
    pub fn transaction_type(&self, description: &str, currency: &str, section: Section) -> Section {
        if section == Section::International {
            return Section::International;
        }
        let upper = description.to_uppercase();
        let foreign_currency = !currency.eq_ignore_ascii_case(&self.home_currency);
        if foreign_currency || self.keywords.iter().any(|k| upper.contains(k.as_str())) {
            Section::International
        } else {
            Section::Domestic
        }
    }
}

fn upper_all(words: &[String]) -> Vec<String> {
    words
        .iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}
