//! Text source resolution: raw PDF bytes → one normalized text string.
//!
//! Digitally-authored gazettes carry an embedded text layer; scanned ones
//! do not and need optical recognition. Rather than nest that decision in
//! conditionals, the two strategies are an explicit fallback chain of
//! [`TextResolver`]s tried in order: the first resolver producing any
//! non-whitespace text wins, and further resolvers (an alternate OCR
//! engine, say) can be appended without touching the control flow.
//!
//! There is no partial-text acceptance: either some resolver yields
//! non-whitespace text, or the document contributes zero records and the
//! chain reports [`FileFailure::NoText`].
//!
//! Whitespace normalization happens here, once, on whatever text won:
//! the extraction grammar downstream is single-line-oriented, so all line
//! breaks collapse to spaces and whitespace runs collapse to one space.
//! The normalization is idempotent.

use crate::config::EngineConfig;
use crate::error::FileFailure;
use crate::pipeline::ocr::TesseractOcrResolver;
use once_cell::sync::Lazy;
use pdfium_render::prelude::*;
use regex::Regex;
use tracing::{debug, info};

/// One strategy for getting text out of PDF bytes.
///
/// Implementations are blocking (pdfium and tesseract are synchronous C
/// libraries/processes); callers host the whole chain in
/// `tokio::task::spawn_blocking`.
pub trait TextResolver: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// `Ok(Some(text))` — usable text obtained. `Ok(None)` — nothing
    /// usable here, let the next resolver try. `Err` — the bytes are
    /// unreadable; no later resolver will fare better.
    fn resolve(&self, bytes: &[u8], file_name: &str) -> Result<Option<String>, FileFailure>;
}

/// Ordered fallback chain of text resolvers.
pub struct ResolverChain {
    resolvers: Vec<Box<dyn TextResolver>>,
}

impl ResolverChain {
    /// The standard chain: embedded text first, OCR second (when enabled).
    pub fn standard(config: &EngineConfig) -> Self {
        let mut resolvers: Vec<Box<dyn TextResolver>> =
            vec![Box::new(EmbeddedTextResolver)];
        if config.ocr_enabled {
            resolvers.push(Box::new(TesseractOcrResolver::new(config)));
        }
        Self { resolvers }
    }

    /// Build a chain from explicit resolvers (tests, alternate engines).
    pub fn new(resolvers: Vec<Box<dyn TextResolver>>) -> Self {
        Self { resolvers }
    }

    /// Append a resolver to the end of the chain.
    pub fn push(&mut self, resolver: Box<dyn TextResolver>) {
        self.resolvers.push(resolver);
    }

    /// Run the chain. Returns normalized text from the first resolver that
    /// produced any, or [`FileFailure::NoText`] when every resolver came
    /// back empty.
    pub fn resolve(&self, bytes: &[u8], file_name: &str) -> Result<String, FileFailure> {
        for resolver in &self.resolvers {
            match resolver.resolve(bytes, file_name)? {
                Some(text) if !text.trim().is_empty() => {
                    info!(
                        file = file_name,
                        resolver = resolver.name(),
                        chars = text.len(),
                        "text resolved"
                    );
                    return Ok(normalize_whitespace(&text));
                }
                _ => {
                    debug!(
                        file = file_name,
                        resolver = resolver.name(),
                        "no usable text, falling through"
                    );
                }
            }
        }
        Err(FileFailure::NoText {
            file: file_name.to_string(),
        })
    }
}

// ── Whitespace normalization ─────────────────────────────────────────────

static RE_LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n|\r|\n").unwrap());
static RE_WS_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

/// Collapse all line breaks to spaces and whitespace runs to one space.
pub fn normalize_whitespace(raw: &str) -> String {
    let unbroken = RE_LINE_BREAKS.replace_all(raw, " ");
    RE_WS_RUNS.replace_all(&unbroken, " ").trim().to_string()
}

// ── Embedded text layer ──────────────────────────────────────────────────

/// Reads the PDF's own text layer via pdfium. Cheap, exact, and absent on
/// pure scans.
pub struct EmbeddedTextResolver;

impl TextResolver for EmbeddedTextResolver {
    fn name(&self) -> &'static str {
        "embedded-text"
    }

    fn resolve(&self, bytes: &[u8], file_name: &str) -> Result<Option<String>, FileFailure> {
        let pdfium = Pdfium::default();
        let document = pdfium.load_pdf_from_byte_slice(bytes, None).map_err(|e| {
            FileFailure::Corrupt {
                file: file_name.to_string(),
                detail: format!("{e:?}"),
            }
        })?;

        let mut text = String::new();
        for page in document.pages().iter() {
            // A page whose text object fails to load is just a page with
            // no text layer; OCR gets its chance next.
            if let Ok(page_text) = page.text() {
                text.push_str(&page_text.all());
                text.push('\n');
            }
        }

        Ok((!text.trim().is_empty()).then_some(text))
    }
}
