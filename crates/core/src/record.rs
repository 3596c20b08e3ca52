use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// Column names of the standardized output, in order.
pub const STANDARD_HEADERS: [&str; 8] = [
    "Date",
    "Transaction Description",
    "Debit",
    "Credit",
    "Currency",
    "CardName",
    "Transaction",
    "Location",
];

/// Statement section, also used as the record's transaction type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Section {
    #[default]
    Domestic,
    International,
}

impl Section {
    /// The marker text that switches a statement into this section.
    pub fn marker(self) -> &'static str {
        match self {
            Section::Domestic => "Domestic Transactions",
            Section::International => "International Transactions",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Domestic => write!(f, "Domestic"),
            Section::International => write!(f, "International"),
        }
    }
}

/// A record date: either a real calendar date or the best-effort residue of
/// a token that matched no supported format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordDate {
    Iso(NaiveDate),
    Unparsed(String),
}

impl RecordDate {
    pub fn is_unparsed(&self) -> bool {
        matches!(self, RecordDate::Unparsed(_))
    }
}

impl fmt::Display for RecordDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordDate::Iso(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            RecordDate::Unparsed(s) => write!(f, "{s}"),
        }
    }
}

/// One finalized transaction in the standardized eight-column layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardRecord {
    pub date: RecordDate,
    pub description: String,
    pub debit: Money,
    pub credit: Money,
    /// Three-letter currency code.
    pub currency: String,
    /// Card holder the transaction belongs to.
    pub user: String,
    pub transaction_type: Section,
    pub location: String,
}

impl StandardRecord {
    /// Field values in `STANDARD_HEADERS` order.
    pub fn fields(&self) -> [String; 8] {
        [
            self.date.to_string(),
            self.description.clone(),
            self.debit.to_string(),
            self.credit.to_string(),
            self.currency.clone(),
            self.user.clone(),
            self.transaction_type.to_string(),
            self.location.clone(),
        ]
    }
}
