pub mod config;
pub mod error;
pub mod money;
pub mod record;

pub use config::{DateFallback, NormalizerConfig, OutputEncoding};
pub use error::NormalizeError;
pub use money::Money;
pub use record::{RecordDate, Section, StandardRecord, STANDARD_HEADERS};
