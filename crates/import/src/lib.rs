pub mod amount;
pub mod assembler;
pub mod batch;
pub mod classify;
pub mod date;
pub mod description;
pub mod encode;
pub mod location;
pub(crate) mod util;

pub use amount::{parse_amount, Direction, ParsedAmount};
pub use assembler::{
    ClosedTransaction, Outcome, ParsedStatement, ParserState, PendingTransaction, Phase,
    StatementParser,
};
pub use batch::{BatchProcessor, BatchReport, Document, DocumentError, DocumentFailure, OutputSet};
pub use classify::{LineClassifier, LineKind, RawLine};
pub use description::DescriptionCleaner;
pub use encode::{encode_records, EncodeError};
pub use location::LocationExtractor;

pub mod import {
    use crate::*;
    use stmtnorm_core::NormalizerConfig;

    /// Standardize a single statement with the given configuration.
    pub fn standardize_statement(
        content: &str,
        config: NormalizerConfig,
    ) -> Result<String, EncodeError> {
        StatementParser::new(config).standardize(content)
    }

    pub fn process_batch<I>(documents: I, config: NormalizerConfig) -> BatchReport
    where
        I: IntoIterator<Item = Document>,
    {
        BatchProcessor::new(config).process(documents)
    }

    pub fn output_name(input: &str) -> String {
        crate::batch::output_name(input)
    }
}
