use stmtnorm_core::{
    DateFallback, NormalizeError, NormalizerConfig, Section, StandardRecord,
};

use crate::amount::parse_amount;
use crate::classify::{raw_lines, LineClassifier, LineKind, RawLine};
use crate::date::normalize_date;
use crate::description::{assemble_description, take_description_currency, DescriptionCleaner};
use crate::encode::{encode_records, EncodeError};
use crate::location::LocationExtractor;

/// A transaction whose lines are still being collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    /// Source line of the transaction-start row.
    pub line: usize,
    pub date: String,
    pub description: String,
    pub amount: String,
    pub additional_info: Vec<String>,
}

impl PendingTransaction {
    pub fn start(line: &RawLine<'_>) -> Self {
        Self {
            line: line.number,
            date: line.field(0).to_string(),
            description: line.field(1).to_string(),
            amount: line.field(2).to_string(),
            additional_info: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Collecting(PendingTransaction),
}

/// Context threaded through the line stream. Section and user stay in
/// effect until a marker line replaces them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserState {
    pub section: Section,
    pub user: String,
    pub phase: Phase,
}

impl ParserState {
    pub fn new(config: &NormalizerConfig) -> Self {
        Self {
            section: Section::Domestic,
            user: config.default_user.clone(),
            phase: Phase::Idle,
        }
    }

    pub fn is_collecting(&self) -> bool {
        matches!(self.phase, Phase::Collecting(_))
    }
}

/// A transaction that finished collecting, with the context it closed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedTransaction {
    pub pending: PendingTransaction,
    pub section: Section,
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    /// The previous transaction is complete and should be finalized.
    Closed(ClosedTransaction),
    /// A header, noise or marker row interrupted an open transaction, which
    /// is discarded without a record.
    Dropped(PendingTransaction),
}

/// Apply one classified line to the state.
pub fn transition(state: ParserState, kind: LineKind, line: &RawLine<'_>) -> (ParserState, Outcome) {
    let ParserState { section, user, phase } = state;

    match kind {
        LineKind::HeaderRow | LineKind::Skip => (
            ParserState { section, user, phase: Phase::Idle },
            interrupt(phase),
        ),
        LineKind::SectionMarker(section) => (
            ParserState { section, user, phase: Phase::Idle },
            interrupt(phase),
        ),
        LineKind::UserMarker(user) => (
            ParserState { section, user, phase: Phase::Idle },
            interrupt(phase),
        ),
        LineKind::TransactionStart => {
            let outcome = match phase {
                Phase::Collecting(pending) => Outcome::Closed(ClosedTransaction {
                    pending,
                    section,
                    user: user.clone(),
                }),
                Phase::Idle => Outcome::Continue,
            };
            let phase = Phase::Collecting(PendingTransaction::start(line));
            (ParserState { section, user, phase }, outcome)
        }
        LineKind::Continuation => {
            let phase = match phase {
                Phase::Collecting(mut pending) => {
                    pending.additional_info.push(line.text.to_string());
                    Phase::Collecting(pending)
                }
                Phase::Idle => Phase::Idle,
            };
            (ParserState { section, user, phase }, Outcome::Continue)
        }
    }
}

/// Close whatever is still open at end of input.
pub fn finish(state: ParserState) -> (ParserState, Option<ClosedTransaction>) {
    let ParserState { section, user, phase } = state;
    let closed = match phase {
        Phase::Collecting(pending) => Some(ClosedTransaction {
            pending,
            section,
            user: user.clone(),
        }),
        Phase::Idle => None,
    };
    (ParserState { section, user, phase: Phase::Idle }, closed)
}

fn interrupt(phase: Phase) -> Outcome {
    match phase {
        Phase::Collecting(pending) => Outcome::Dropped(pending),
        Phase::Idle => Outcome::Continue,
    }
}

/// Result of parsing one document.
#[derive(Debug, Default)]
pub struct ParsedStatement {
    /// Records in the order their transactions closed.
    pub records: Vec<StandardRecord>,
    /// Transactions discarded because a header or marker row interrupted them.
    pub interrupted: Vec<PendingTransaction>,
    /// Transactions that closed but could not be turned into a record.
    pub failed: Vec<NormalizeError>,
}

impl ParsedStatement {
    pub fn dropped(&self) -> usize {
        self.interrupted.len() + self.failed.len()
    }
}

/// Turns the text of a statement export into standardized records.
pub struct StatementParser {
    config: NormalizerConfig,
    cleaner: DescriptionCleaner,
    locations: LocationExtractor,
}

impl StatementParser {
    pub fn new(config: NormalizerConfig) -> Self {
        let cleaner = DescriptionCleaner::new(&config);
        let locations = LocationExtractor::new(&config);
        Self { config, cleaner, locations }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    pub fn initial_state(&self) -> ParserState {
        ParserState::new(&self.config)
    }

    pub fn parse(&self, content: &str) -> ParsedStatement {
        self.parse_with_state(content, self.initial_state()).0
    }

    /// Parse starting from `state` and return the state left at the end, so
    /// section and user can carry over into a following file.
    pub fn parse_with_state(&self, content: &str, state: ParserState) -> (ParsedStatement, ParserState) {
        let classifier = LineClassifier::new(&self.config);
        let mut parsed = ParsedStatement::default();
        let mut state = state;

        for line in raw_lines(content) {
            let kind = classifier.classify(&line, state.is_collecting());
            let (next, outcome) = transition(state, kind, &line);
            state = next;
            self.absorb(outcome, &mut parsed);
        }

        let (state, closed) = finish(state);
        if let Some(closed) = closed {
            self.absorb(Outcome::Closed(closed), &mut parsed);
        }

        (parsed, state)
    }

    /// Parse and encode with the configured output encoding, header included.
    pub fn standardize(&self, content: &str) -> Result<String, EncodeError> {
        let parsed = self.parse(content);
        encode_records(&parsed.records, self.config.output)
    }

    /// Build the record for a closed transaction.
    pub fn finalize(&self, closed: &ClosedTransaction) -> Result<StandardRecord, NormalizeError> {
        let pending = &closed.pending;

        let date = normalize_date(&pending.date)?;
        if date.is_unparsed() {
            match self.config.date_fallback {
                DateFallback::Reject => {
                    return Err(NormalizeError::UnparseableDate(date.to_string()));
                }
                DateFallback::PassThrough => {
                    tracing::warn!(line = pending.line, date = %date, "date not normalized, passing through");
                }
            }
        }

        let description = assemble_description(&pending.description, &pending.additional_info);

        let amount = parse_amount(&pending.amount);
        let found = take_description_currency(&description);
        let currency = found
            .code
            .or(amount.currency)
            .map(str::to_string)
            .unwrap_or_else(|| self.config.default_currency.clone());
        let description = found.description;

        // A trailing currency code leaves the merchant name as the last word.
        let location = if found.consumed_last_word {
            self.locations.known_location(&description).unwrap_or_default()
        } else {
            self.locations.extract_location(&description)
        };
        let description = self.cleaner.clean(&description);
        let transaction_type = self
            .locations
            .transaction_type(&description, &currency, closed.section);
        let (debit, credit) = amount.columns();

        Ok(StandardRecord {
            date,
            description,
            debit,
            credit,
            currency,
            user: closed.user.clone(),
            transaction_type,
            location,
        })
    }

    fn absorb(&self, outcome: Outcome, parsed: &mut ParsedStatement) {
        match outcome {
            Outcome::Continue => {}
            Outcome::Closed(closed) => match self.finalize(&closed) {
                Ok(record) => parsed.records.push(record),
                Err(e) => {
                    tracing::warn!(line = closed.pending.line, "dropping record: {e}");
                    parsed.failed.push(NormalizeError::RecordAssembly {
                        line: closed.pending.line,
                        reason: e.to_string(),
                    });
                }
            },
            Outcome::Dropped(pending) => {
                tracing::debug!(line = pending.line, "open transaction interrupted, discarded");
                parsed.interrupted.push(pending);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> RawLine<'_> {
        RawLine::new(1, text)
    }

    fn idle() -> ParserState {
        ParserState::new(&NormalizerConfig::default())
    }

    fn collecting(text: &str) -> ParserState {
        let (state, _) = transition(idle(), LineKind::TransactionStart, &line(text));
        state
    }

    // ── transitions ───────────────────────────────────────────────────────────

    #[test]
    fn start_from_idle_opens_transaction() {
        let (state, outcome) =
            transition(idle(), LineKind::TransactionStart, &line("01-03-2023,STARBUCKS,450.00"));
        assert_eq!(outcome, Outcome::Continue);
        let Phase::Collecting(p) = state.phase else {
            panic!("expected collecting");
        };
        assert_eq!(p.date, "01-03-2023");
        assert_eq!(p.description, "STARBUCKS");
        assert_eq!(p.amount, "450.00");
        assert!(p.additional_info.is_empty());
    }

    #[test]
    fn missing_fields_start_empty() {
        let (state, _) = transition(idle(), LineKind::TransactionStart, &line("01-03-2023"));
        let Phase::Collecting(p) = state.phase else {
            panic!("expected collecting");
        };
        assert_eq!(p.description, "");
        assert_eq!(p.amount, "");
    }

    #[test]
    fn start_while_collecting_closes_previous() {
        let state = collecting("01-03-2023,A,1");
        let (state, outcome) =
            transition(state, LineKind::TransactionStart, &line("02-03-2023,B,2"));
        let Outcome::Closed(closed) = outcome else {
            panic!("expected closed");
        };
        assert_eq!(closed.pending.description, "A");
        assert_eq!(closed.user, "Rahul");
        assert_eq!(closed.section, Section::Domestic);
        assert!(state.is_collecting());
    }

    #[test]
    fn continuation_appends_raw_text() {
        let state = collecting("01-03-2023,UBER,120");
        let (state, outcome) =
            transition(state, LineKind::Continuation, &line("TRIP 8812, GURGAON"));
        assert_eq!(outcome, Outcome::Continue);
        let Phase::Collecting(p) = state.phase else {
            panic!("expected collecting");
        };
        assert_eq!(p.additional_info, vec!["TRIP 8812, GURGAON".to_string()]);
    }

    #[test]
    fn continuation_while_idle_is_ignored() {
        let (state, outcome) = transition(idle(), LineKind::Continuation, &line("stray"));
        assert_eq!(state, idle());
        assert_eq!(outcome, Outcome::Continue);
    }

    #[test]
    fn header_row_drops_open_transaction() {
        let (state, outcome) =
            transition(collecting("01-03-2023,A,1"), LineKind::HeaderRow, &line("Date,Description"));
        assert!(matches!(outcome, Outcome::Dropped(p) if p.description == "A"));
        assert!(!state.is_collecting());
    }

    #[test]
    fn skip_while_idle_changes_nothing() {
        let (state, outcome) = transition(idle(), LineKind::Skip, &line(",x"));
        assert_eq!(state, idle());
        assert_eq!(outcome, Outcome::Continue);
    }

    #[test]
    fn section_marker_switches_section_and_drops() {
        let (state, outcome) = transition(
            collecting("01-03-2023,A,1"),
            LineKind::SectionMarker(Section::International),
            &line("International Transactions"),
        );
        assert_eq!(state.section, Section::International);
        assert!(matches!(outcome, Outcome::Dropped(_)));
        assert!(!state.is_collecting());
    }

    #[test]
    fn user_marker_switches_user_and_keeps_section() {
        let mut start = idle();
        start.section = Section::International;
        let (state, outcome) =
            transition(start, LineKind::UserMarker("Ritu".to_string()), &line("Ritu"));
        assert_eq!(state.user, "Ritu");
        assert_eq!(state.section, Section::International);
        assert_eq!(outcome, Outcome::Continue);
    }

    #[test]
    fn finish_closes_open_transaction() {
        let (state, closed) = finish(collecting("01-03-2023,A,1"));
        assert_eq!(closed.unwrap().pending.description, "A");
        assert!(!state.is_collecting());
        assert_eq!(finish(idle()).1, None);
    }

    // ── finalize ──────────────────────────────────────────────────────────────

    fn closed(date: &str, description: &str, amount: &str, extra: &[&str]) -> ClosedTransaction {
        ClosedTransaction {
            pending: PendingTransaction {
                line: 7,
                date: date.to_string(),
                description: description.to_string(),
                amount: amount.to_string(),
                additional_info: extra.iter().map(|s| s.to_string()).collect(),
            },
            section: Section::Domestic,
            user: "Rahul".to_string(),
        }
    }

    fn parser() -> StatementParser {
        StatementParser::new(NormalizerConfig::default())
    }

    #[test]
    fn finalize_domestic_debit() {
        let record = parser()
            .finalize(&closed("01-03-2023", "STARBUCKS DELHI", "450.00", &[]))
            .unwrap();
        assert_eq!(
            record.fields().join(","),
            "2023-03-01,STARBUCKS,450.00,0.00,INR,Rahul,Domestic,delhi"
        );
    }

    #[test]
    fn finalize_amount_currency_without_description_currency() {
        let record = parser()
            .finalize(&closed("2023-03-04", "HOTEL ADLON", "USD 210.00", &[]))
            .unwrap();
        assert_eq!(record.currency, "USD");
        assert_eq!(record.transaction_type, Section::International);
        assert_eq!(record.debit.to_string(), "210.00");
    }

    #[test]
    fn finalize_description_currency_overrides_amount_currency() {
        let record = parser()
            .finalize(&closed("2023-03-04", "LUFTHANSA EUR", "USD 99.00", &[]))
            .unwrap();
        assert_eq!(record.currency, "EUR");
        assert_eq!(record.description, "LUFTHANSA");
    }

    #[test]
    fn finalize_single_word_merchant_is_its_own_location() {
        let record = parser().finalize(&closed("01-03-2023", "UBER", "100.00", &[])).unwrap();
        assert_eq!(
            record.fields().join(","),
            "2023-03-01,UBER,100.00,0.00,INR,Rahul,Domestic,uber"
        );
    }

    #[test]
    fn finalize_trailing_currency_code_leaves_no_location() {
        let record = parser()
            .finalize(&closed("2023-03-02", "AMAZON EUR", "30.00 CR", &[]))
            .unwrap();
        assert_eq!(record.location, "");
        let record = parser()
            .finalize(&closed("2023-03-02", "STARBUCKS DELHI USD", "5.00", &[]))
            .unwrap();
        assert_eq!(record.location, "delhi");
    }

    #[test]
    fn finalize_uses_continuation_lines() {
        let record = parser()
            .finalize(&closed("05/03/2023", "UBER", "120.00", &["TRIP 8812", "GURGAON"]))
            .unwrap();
        assert_eq!(record.description, "UBER TRIP 8812");
        assert_eq!(record.location, "gurgaon");
        assert_eq!(record.date.to_string(), "2023-03-05");
    }

    #[test]
    fn finalize_passes_unparsed_date_through_by_default() {
        let record = parser()
            .finalize(&closed("31/02/2023", "X Y", "1", &[]))
            .unwrap();
        assert_eq!(record.date.to_string(), "2023-02-31");
        assert!(record.date.is_unparsed());
    }

    #[test]
    fn finalize_rejects_unparsed_date_when_configured() {
        let cfg = NormalizerConfig {
            date_fallback: DateFallback::Reject,
            ..NormalizerConfig::default()
        };
        let err = StatementParser::new(cfg)
            .finalize(&closed("31/02/2023", "X", "1", &[]))
            .unwrap_err();
        assert!(matches!(err, NormalizeError::UnparseableDate(_)));
    }

    #[test]
    fn finalize_keeps_section_of_closing_context() {
        let mut c = closed("2023-03-04", "BIG BAZAAR", "10", &[]);
        c.section = Section::International;
        c.user = "Raj".to_string();
        let record = parser().finalize(&c).unwrap();
        assert_eq!(record.transaction_type, Section::International);
        assert_eq!(record.user, "Raj");
    }

    // ── whole documents ───────────────────────────────────────────────────────

    #[test]
    fn parse_counts_interruptions_and_failures() {
        let cfg = NormalizerConfig {
            date_fallback: DateFallback::Reject,
            ..NormalizerConfig::default()
        };
        let text = "\
01-03-2023,A,1
Date,Description,Amount
31/02/2023,B,2
02-03-2023,C,3
";
        let parsed = StatementParser::new(cfg).parse(text);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].description, "C");
        assert_eq!(parsed.interrupted.len(), 1);
        assert_eq!(parsed.failed.len(), 1);
        assert!(matches!(parsed.failed[0], NormalizeError::RecordAssembly { line: 3, .. }));
        assert_eq!(parsed.dropped(), 2);
    }

    #[test]
    fn parse_with_state_carries_context_forward() {
        let p = parser();
        let (_, state) = p.parse_with_state("International Transactions\nRitu\n", p.initial_state());
        assert_eq!(state.section, Section::International);
        assert_eq!(state.user, "Ritu");

        let (parsed, _) = p.parse_with_state("2023-03-02,BIG BAZAAR,10.00", state);
        assert_eq!(parsed.records[0].user, "Ritu");
        assert_eq!(parsed.records[0].transaction_type, Section::International);
    }

    #[test]
    fn fresh_parse_starts_from_defaults() {
        let p = parser();
        let parsed = p.parse("Raj\n2023-03-02,BIG BAZAAR,10.00");
        assert_eq!(parsed.records[0].user, "Raj");
        let parsed = p.parse("2023-03-02,BIG BAZAAR,10.00");
        assert_eq!(parsed.records[0].user, "Rahul");
    }
}
