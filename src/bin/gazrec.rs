//! CLI binary for gazette-reconcile.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `EngineConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gazette_reconcile::{
    bulk_ingest, verify, CanonicalRecord, EngineConfig, FilePayload, InMemoryStore, VerifyReport,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI definition ───────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "gazrec",
    version,
    about = "Extract gazette cause lists and reconcile them against estate-case spreadsheets"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Name-similarity threshold for reconciliation, in [0,1].
    #[arg(long, global = true, default_value_t = 0.85)]
    threshold: f64,

    /// Documents processed concurrently in a batch.
    #[arg(long, global = true, default_value_t = 4)]
    concurrency: usize,

    /// Per-document timeout in seconds.
    #[arg(long, global = true, default_value_t = 120)]
    timeout: u64,

    /// Disable the OCR fallback for documents without a text layer.
    #[arg(long, global = true)]
    no_ocr: bool,

    /// Tesseract language code.
    #[arg(long, global = true, default_value = "eng")]
    lang: String,

    /// Path to the tesseract binary.
    #[arg(long, global = true, default_value = "tesseract", env = "TESSERACT_PATH")]
    tesseract_path: String,

    /// Print raw JSON instead of the human-readable summary.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Extract records from one or more gazette PDFs.
    Ingest {
        /// Gazette PDF files.
        #[arg(required = true)]
        pdfs: Vec<PathBuf>,
    },
    /// Reconcile a spreadsheet against a gazette PDF.
    Verify {
        /// Ledger spreadsheet (xlsx/xls/ods).
        #[arg(long)]
        excel: PathBuf,
        /// Gazette PDF.
        #[arg(long)]
        pdf: PathBuf,
    },
}

impl Cli {
    fn engine_config(&self) -> Result<EngineConfig> {
        EngineConfig::builder()
            .match_threshold(self.threshold)
            .concurrency(self.concurrency)
            .document_timeout_secs(self.timeout)
            .ocr_enabled(!self.no_ocr)
            .ocr_language(self.lang.clone())
            .tesseract_path(self.tesseract_path.clone())
            .build()
            .context("invalid configuration")
    }
}

// ── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.engine_config()?;

    match &cli.command {
        Command::Ingest { pdfs } => run_ingest(pdfs, &config, cli.json).await,
        Command::Verify { excel, pdf } => run_verify(excel, pdf, &config, cli.json).await,
    }
}

fn working_spinner(msg: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(msg.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn load_payload(path: &Path, content_type: &str) -> Result<FilePayload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(FilePayload::new(name, content_type, bytes))
}

// ── ingest ───────────────────────────────────────────────────────────────────

async fn run_ingest(pdfs: &[PathBuf], config: &EngineConfig, json: bool) -> Result<()> {
    let files = pdfs
        .iter()
        .map(|p| load_payload(p, "application/pdf"))
        .collect::<Result<Vec<_>>>()?;

    let store = InMemoryStore::new();
    let bar = working_spinner(&format!("Extracting {} document(s)…", files.len()));
    let report = bulk_ingest(files, config, &store).await?;
    bar.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{}",
        bold(&format!(
            "{} record(s) extracted from {} file(s)",
            report.count,
            pdfs.len()
        ))
    );
    for record in &report.records {
        print_record(record);
    }
    for failure in &report.failures {
        println!("  {} {}", red("✗"), failure);
    }
    if !report.failures.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_record(record: &CanonicalRecord) {
    let seq = record
        .sequence_no
        .map(|n| n.to_string())
        .unwrap_or_else(|| "-".into());
    println!(
        "  {} {:>4}  {:<16} {:<32} {} {}",
        green("✓"),
        seq,
        record.cause_no,
        record.name_of_deceased,
        record.court_station,
        dim(&format!(
            "vol {} {}",
            record.volume_no,
            record
                .date_published
                .map(|d| d.to_string())
                .unwrap_or_else(|| "undated".into())
        )),
    );
}

// ── verify ───────────────────────────────────────────────────────────────────

async fn run_verify(excel: &Path, pdf: &Path, config: &EngineConfig, json: bool) -> Result<()> {
    let sheet = load_payload(excel, "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")?;
    let gazette = load_payload(pdf, "application/pdf")?;

    let bar = working_spinner("Reconciling…");
    let report = verify(Some(sheet), Some(gazette), config).await?;
    bar.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_verify_report(&report);
    Ok(())
}

fn print_verify_report(report: &VerifyReport) {
    let date = report
        .date_published
        .map(|d| d.to_string())
        .unwrap_or_else(|| "not derived".into());
    println!("{}", bold(&format!("Gazette date: {date}")));
    println!(
        "{}",
        bold(&format!(
            "matched {} · only spreadsheet {} · only gazette {}",
            report.stats.matched, report.stats.only_excel, report.stats.only_pdf
        ))
    );

    if !report.matched.is_empty() {
        println!("{}", green("Matched (published):"));
        for r in &report.matched {
            println!("  {} {:<16} {}", green("✓"), r.cause_no, r.name_of_deceased);
        }
    }
    if !report.only_excel.is_empty() {
        println!("{}", yellow("Only in spreadsheet (still pending):"));
        for r in &report.only_excel {
            println!("  {} {:<16} {}", yellow("…"), r.cause_no, r.name_of_deceased);
        }
    }
    if !report.only_pdf.is_empty() {
        println!("{}", red("Only in gazette (never recorded):"));
        for r in &report.only_pdf {
            println!("  {} {:<16} {}", red("!"), r.cause_no, r.name_of_deceased);
        }
    }
}
