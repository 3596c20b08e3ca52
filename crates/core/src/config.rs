use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::error::NormalizeError;

/// What to do with a record whose date matched none of the supported formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFallback {
    /// Emit the stripped token as-is.
    #[default]
    PassThrough,
    /// Drop the record.
    Reject,
}

/// How the standardized stream is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputEncoding {
    /// Fields joined with commas, never quoted. A comma inside a field shifts
    /// every column after it.
    #[default]
    Raw,
    /// Fields quoted when they contain a delimiter, quote or newline.
    Quoted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Card holder assumed until the first user marker line.
    pub default_user: String,
    /// Labels that mark the start of a card holder's sub-statement.
    pub known_users: Vec<String>,
    pub default_currency: String,
    /// City tokens removed from descriptions and reported as the location.
    pub location_tokens: Vec<String>,
    /// Description fragments that mark a domestic-section row as international.
    pub international_keywords: Vec<String>,
    pub date_fallback: DateFallback,
    pub output: OutputEncoding,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            default_user: "Rahul".to_string(),
            known_users: strings(&["Rahul", "Ritu", "Raj"]),
            default_currency: "INR".to_string(),
            location_tokens: strings(&[
                "DELHI",
                "MUMBAI",
                "BANGALORE",
                "GURGAON",
                "NOIDA",
                "CHENNAI",
                "KATUNAYAKE",
                "BERLIN",
                "CALIFORNIA",
                "NEWYORK",
                "DUSSELDOR",
            ]),
            international_keywords: strings(&[
                "SRILANKAN",
                "NEWYORK",
                "CALIFORNIA",
                "BERLIN",
                "DUSSELDOR",
                "KATUNAYAKE",
                "EUR",
                "USD",
            ]),
            date_fallback: DateFallback::default(),
            output: OutputEncoding::default(),
        }
    }
}

impl NormalizerConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, NormalizeError> {
        Ok(toml::from_str(toml_content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, NormalizeError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    pub fn is_known_user(&self, label: &str) -> bool {
        self.known_users.iter().any(|u| u == label)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
