use regex::Regex;
use stmtnorm_core::NormalizerConfig;

use crate::util::{re, whole_word_pattern};

re!(re_corporate_suffix, r"(?i)(?:PVT LTD|LIMITED|LTD|PRIVATE LIMITED)$");
re!(re_agent_prefix, r"(?i)^(?:M/S|SRS|MSW)[\s*]");
re!(re_direction_suffix, r"(?i)\s+(?:CR|DR)$");
re!(re_currency_code, r"(?i)\b(?:INR|USD|EUR)\b");
re!(re_eur, r"(?i)\bEUR\b");
re!(re_usd, r"(?i)\bUSD\b");
re!(re_disallowed, r"[^0-9A-Za-z\s\-.,&]");
re!(re_whitespace, r"\s+");

/// Join the primary description with its continuation lines.
pub fn assemble_description<S: AsRef<str>>(primary: &str, continuation: &[S]) -> String {
    let mut description = primary.to_string();
    for line in continuation {
        description.push(' ');
        description.push_str(line.as_ref());
    }
    description
}

/// A currency code found in a description, and the description without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionCurrency {
    pub code: Option<&'static str>,
    pub description: String,
    /// The code was the description's last word, so what now ends the
    /// description is not where the transaction happened.
    pub consumed_last_word: bool,
}

/// Look for a currency code written as a word in the description and strip
/// every occurrence of it.
pub fn take_description_currency(description: &str) -> DescriptionCurrency {
    for (code, re) in [("EUR", re_eur()), ("USD", re_usd())] {
        if re.is_match(description) {
            let consumed_last_word = description
                .split_whitespace()
                .next_back()
                .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
                .is_some_and(|w| w.eq_ignore_ascii_case(code));
            return DescriptionCurrency {
                code: Some(code),
                description: re.replace_all(description, "").trim().to_string(),
                consumed_last_word,
            };
        }
    }
    DescriptionCurrency {
        code: None,
        description: description.to_string(),
        consumed_last_word: false,
    }
}

/// Strips merchant boilerplate from free-text descriptions.
pub struct DescriptionCleaner {
    locations: Option<Regex>,
}

impl DescriptionCleaner {
    pub fn new(config: &NormalizerConfig) -> Self {
        Self {
            locations: whole_word_pattern(&config.location_tokens),
        }
    }

    /// Clean a description until another pass would not change it, so that
    /// `clean(clean(x)) == clean(x)`.
    pub fn clean(&self, description: &str) -> String {
        let mut current = self.clean_once(description);
        loop {
            let next = self.clean_once(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn clean_once(&self, description: &str) -> String {
        let s = re_corporate_suffix().replace(description, "");
        let s = re_agent_prefix().replace(&s, "");
        let s = re_direction_suffix().replace(&s, "");
        let s = s.trim();

        let s = re_currency_code().replace_all(s, "");
        let s = s.trim();

        let s = match &self.locations {
            Some(re) => re.replace_all(s, ""),
            None => s.into(),
        };

        let s = re_disallowed().replace_all(&s, "");
        let s = re_whitespace().replace_all(&s, " ");
        s.trim().to_string()
    }
}
