use thiserror::Error;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Unparseable date: '{0}'")]
    UnparseableDate(String),
    #[error("Unparseable amount: '{0}'")]
    UnparseableAmount(String),
    #[error("Failed to assemble record starting at line {line}: {reason}")]
    RecordAssembly { line: usize, reason: String },
    #[error("Unsupported input format: {0}")]
    UnsupportedInputFormat(String),
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

