use stmtnorm_core::{OutputEncoding, StandardRecord, STANDARD_HEADERS};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to flush output: {0}")]
    Flush(String),
    #[error("Output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Render records under the standard header line, lines joined with `\n`
/// and no trailing newline.
pub fn encode_records(
    records: &[StandardRecord],
    encoding: OutputEncoding,
) -> Result<String, EncodeError> {
    match encoding {
        OutputEncoding::Raw => Ok(encode_raw(records)),
        OutputEncoding::Quoted => encode_quoted(records),
    }
}

fn encode_raw(records: &[StandardRecord]) -> String {
    std::iter::once(STANDARD_HEADERS.join(","))
        .chain(records.iter().map(|r| r.fields().join(",")))
        .collect::<Vec<_>>()
        .join("\n")
}

fn encode_quoted(records: &[StandardRecord]) -> Result<String, EncodeError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(STANDARD_HEADERS)?;
    for record in records {
        writer.write_record(&record.fields())?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| EncodeError::Flush(e.to_string()))?;
    let mut out = String::from_utf8(bytes)?;
    if out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}
