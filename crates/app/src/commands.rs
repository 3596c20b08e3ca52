use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use stmtnorm_core::{DateFallback, NormalizeError, NormalizerConfig, OutputEncoding};
use stmtnorm_import::{
    BatchProcessor, BatchReport, Document, DocumentError, DocumentFailure, OutputSet,
};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub files: Vec<PathBuf>,
    pub out_dir: PathBuf,
    pub config: Option<PathBuf>,
    pub quoted: bool,
    pub reject_unparsed_dates: bool,
    pub stdout: bool,
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct ReportOutput {
    pub outputs: Vec<String>,
    pub failures: Vec<FailureOutput>,
    pub succeeded: usize,
    pub records: usize,
    pub dropped: usize,
}

#[derive(Debug, Serialize)]
pub struct FailureOutput {
    pub name: String,
    pub error: String,
}

impl From<&BatchReport> for ReportOutput {
    fn from(report: &BatchReport) -> Self {
        ReportOutput {
            outputs: report.outputs.iter().map(|(name, _)| name.to_string()).collect(),
            failures: report
                .failures
                .iter()
                .map(|f| FailureOutput {
                    name: f.name.clone(),
                    error: f.error.to_string(),
                })
                .collect(),
            succeeded: report.succeeded,
            records: report.records,
            dropped: report.dropped,
        }
    }
}

/// Config file (or defaults) with command-line flags applied on top.
pub fn load_config(opts: &RunOptions) -> Result<NormalizerConfig> {
    let mut config = match &opts.config {
        Some(path) => NormalizerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => NormalizerConfig::default(),
    };
    if opts.quoted {
        config.output = OutputEncoding::Quoted;
    }
    if opts.reject_unparsed_dates {
        config.date_fallback = DateFallback::Reject;
    }
    Ok(config)
}

/// Read every file; unreadable ones become failures instead of aborting.
pub fn read_documents(files: &[PathBuf]) -> (Vec<Document>, Vec<DocumentFailure>) {
    let mut documents = Vec::new();
    let mut failures = Vec::new();

    for path in files {
        let name = document_name(path);
        match fs::read(path) {
            Ok(bytes) => documents.push(Document::new(name, bytes)),
            Err(e) => {
                tracing::warn!("Cannot read {}: {e}", path.display());
                failures.push(DocumentFailure {
                    name,
                    error: DocumentError::Normalize(NormalizeError::Io(e)),
                });
            }
        }
    }

    (documents, failures)
}

pub fn write_outputs(outputs: &OutputSet, out_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut written = Vec::with_capacity(outputs.len());
    for (name, content) in outputs.iter() {
        let path = out_dir.join(name);
        fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

pub fn run(opts: &RunOptions) -> Result<BatchReport> {
    let config = load_config(opts)?;
    let (documents, read_failures) = read_documents(&opts.files);

    let mut report = BatchProcessor::new(config).process(documents);
    report.failures.extend(read_failures);

    if opts.stdout {
        for (name, content) in report.outputs.iter() {
            if report.outputs.len() > 1 {
                println!("==> {name} <==");
            }
            println!("{content}");
        }
    } else {
        write_outputs(&report.outputs, &opts.out_dir)?;
    }

    if opts.json {
        let json = serde_json::to_string_pretty(&ReportOutput::from(&report))
            .context("serializing report")?;
        println!("{json}");
    } else {
        eprintln!("{}", report.summary());
    }

    Ok(report)
}

fn document_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
