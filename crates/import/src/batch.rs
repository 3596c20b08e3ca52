use stmtnorm_core::{NormalizeError, NormalizerConfig};
use thiserror::Error;

use crate::assembler::StatementParser;
use crate::encode::{encode_records, EncodeError};
use crate::util::re;

re!(re_input_token, r"(?i)input");
re!(re_extension, r"\.([^/.]+)$");

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

const SPREADSHEET_EXTENSIONS: [&str; 2] = ["xls", "xlsx"];
const TEXT_EXTENSIONS: [&str; 2] = ["csv", "txt"];

/// One input statement: its identifier and undecoded contents.
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// The document as delimited text. Binary spreadsheets and anything that
    /// is not UTF-8 are rejected; conversion has to happen before this point.
    pub fn decode(&self) -> Result<&str, NormalizeError> {
        let extension = re_extension()
            .captures(&self.name)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_lowercase());
        if extension
            .as_deref()
            .is_some_and(|ext| SPREADSHEET_EXTENSIONS.contains(&ext))
        {
            return Err(NormalizeError::UnsupportedInputFormat(format!(
                "{} is a spreadsheet; convert it to delimited text first",
                self.name
            )));
        }
        if self.bytes.starts_with(ZIP_MAGIC) || self.bytes.starts_with(OLE_MAGIC) {
            return Err(NormalizeError::UnsupportedInputFormat(format!(
                "{} contains binary spreadsheet data",
                self.name
            )));
        }

        let bytes = self.bytes.strip_prefix(UTF8_BOM).unwrap_or(&self.bytes);
        std::str::from_utf8(bytes).map_err(|e| {
            NormalizeError::UnsupportedInputFormat(format!("{} is not UTF-8 text: {e}", self.name))
        })
    }
}

/// Output identifier for an input identifier.
///
/// `bank-input.csv` becomes `bank-output.csv`; names without an `input`
/// token get `-Output` before their extension, which is forced to `.csv`
/// unless it is already a delimited-text extension.
pub fn output_name(input: &str) -> String {
    if re_input_token().is_match(input) {
        return re_input_token().replace(input, "output").into_owned();
    }

    let (base, extension) = match re_extension().captures(input).and_then(|c| c.get(1)) {
        Some(ext) => (&input[..ext.start() - 1], ext.as_str()),
        None => (input, "csv"),
    };
    let extension = if TEXT_EXTENSIONS.contains(&extension.to_lowercase().as_str()) {
        extension
    } else {
        "csv"
    };
    format!("{base}-Output.{extension}")
}

/// Outputs keyed by name, in first-insertion order. Re-inserting a name
/// replaces the content in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSet {
    entries: Vec<(String, String)>,
}

impl OutputSet {
    /// Insert an output, returning the content it replaced.
    pub fn insert(&mut self, name: String, content: String) -> Option<String> {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, content)),
            None => {
                self.entries.push((name, content));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), c.as_str()))
    }
}

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

#[derive(Debug)]
pub struct DocumentFailure {
    pub name: String,
    pub error: DocumentError,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outputs: OutputSet,
    pub failures: Vec<DocumentFailure>,
    /// Documents standardized, counting ones whose output was later replaced
    /// by a name collision.
    pub succeeded: usize,
    /// Records written across all successful documents.
    pub records: usize,
    /// Transactions lost to interruptions or finalization errors.
    pub dropped: usize,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable outcome of the batch.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Standardized {} of {} document(s): {} record(s), {} dropped",
            self.succeeded,
            self.succeeded + self.failures.len(),
            self.records,
            self.dropped
        );
        for failure in &self.failures {
            out.push_str(&format!("\n  {}: {}", failure.name, failure.error));
        }
        out
    }
}

/// Runs documents through one parser, one at a time. A failing document is
/// recorded and the batch moves on.
pub struct BatchProcessor {
    parser: StatementParser,
}

impl BatchProcessor {
    pub fn new(config: NormalizerConfig) -> Self {
        Self {
            parser: StatementParser::new(config),
        }
    }

    pub fn process<I>(&self, documents: I) -> BatchReport
    where
        I: IntoIterator<Item = Document>,
    {
        let mut report = BatchReport::default();

        for doc in documents {
            let span = tracing::info_span!("document", name = %doc.name);
            let _enter = span.enter();

            match self.process_document(&doc) {
                Ok((content, records, dropped)) => {
                    tracing::info!(records, dropped, "standardized");
                    report.succeeded += 1;
                    report.records += records;
                    report.dropped += dropped;
                    let name = output_name(&doc.name);
                    if report.outputs.insert(name.clone(), content).is_some() {
                        tracing::warn!(output = %name, "output name collision, replacing earlier output");
                    }
                }
                Err(error) => {
                    tracing::warn!("document failed: {error}");
                    report.failures.push(DocumentFailure {
                        name: doc.name.clone(),
                        error,
                    });
                }
            }
        }

        report
    }

    fn process_document(&self, doc: &Document) -> Result<(String, usize, usize), DocumentError> {
        let text = doc.decode()?;
        let parsed = self.parser.parse(text);
        let content = encode_records(&parsed.records, self.parser.config().output)?;
        Ok((content, parsed.records.len(), parsed.dropped()))
    }
}
