use stmtnorm_core::{NormalizerConfig, Section};

use crate::date::is_date_token;

const HEADER_KEYWORDS: [&str; 5] = ["date", "description", "debit", "credit", "transaction"];

/// A trimmed, non-empty input line and its comma-split fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine<'a> {
    /// 1-based line number in the source text.
    pub number: usize,
    pub text: &'a str,
    pub fields: Vec<&'a str>,
}

impl<'a> RawLine<'a> {
    pub fn new(number: usize, text: &'a str) -> Self {
        let text = text.trim();
        let fields = text.split(',').map(str::trim).collect();
        Self { number, text, fields }
    }

    pub fn field(&self, idx: usize) -> &'a str {
        self.fields.get(idx).copied().unwrap_or_default()
    }
}

/// Split a document into its non-blank lines.
pub fn raw_lines(content: &str) -> impl Iterator<Item = RawLine<'_>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(idx, l)| RawLine::new(idx + 1, l))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    HeaderRow,
    SectionMarker(Section),
    UserMarker(String),
    TransactionStart,
    Continuation,
    Skip,
}

/// Decides the role of each line. `collecting` tells the classifier whether
/// a transaction is open, which is the only way a line becomes a continuation.
pub struct LineClassifier<'c> {
    config: &'c NormalizerConfig,
}

impl<'c> LineClassifier<'c> {
    pub fn new(config: &'c NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn classify(&self, line: &RawLine<'_>, collecting: bool) -> LineKind {
        let first = line.field(0);

        if first.is_empty() {
            return LineKind::Skip;
        }
        if is_header_keyword(first) {
            return LineKind::HeaderRow;
        }
        if let Some(section) = section_marker(line.text) {
            return LineKind::SectionMarker(section);
        }
        if self.config.is_known_user(first) {
            return LineKind::UserMarker(first.to_string());
        }
        if is_date_token(first) {
            return LineKind::TransactionStart;
        }
        if collecting {
            LineKind::Continuation
        } else {
            LineKind::Skip
        }
    }
}

fn is_header_keyword(value: &str) -> bool {
    let lower = value.to_lowercase();
    HEADER_KEYWORDS.contains(&lower.as_str())
}

fn section_marker(text: &str) -> Option<Section> {
    [Section::International, Section::Domestic]
        .into_iter()
        .find(|s| text.contains(s.marker()))
}
