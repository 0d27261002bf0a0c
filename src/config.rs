//! Configuration for extraction and reconciliation.
//!
//! All behaviour is controlled through [`EngineConfig`], built via its
//! [`EngineConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across tasks, serialise them for logging, and
//! diff two runs to understand why their outputs differ.

use crate::error::GazetteError;
use serde::{Deserialize, Serialize};

/// Configuration for a bulk-ingest or verify run.
///
/// Built via [`EngineConfig::builder()`] or using
/// [`EngineConfig::default()`].
///
/// # Example
/// ```rust
/// use gazette_reconcile::EngineConfig;
///
/// let config = EngineConfig::builder()
///     .match_threshold(0.90)
///     .concurrency(4)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Name-similarity threshold in [0,1] above which two case names are
    /// treated as the same case. Default: 0.85.
    ///
    /// This is the operating point of the whole reconciliation: lower values
    /// admit false positives (different cases merged), higher values admit
    /// false negatives (the same case missed over OCR noise or spelling
    /// variants). 0.85 tolerates roughly one garbled word in a three-word
    /// name.
    pub match_threshold: f64,

    /// Number of documents processed concurrently in a batch. Default: 4.
    ///
    /// Extraction is CPU/IO-bound (pdfium + tesseract), not network-bound,
    /// so the useful ceiling is the core count, not the tens of in-flight
    /// calls an API pipeline would use.
    pub concurrency: usize,

    /// Per-document timeout in seconds. Default: 120.
    ///
    /// One corrupt or enormous scan must not stall an entire batch; a
    /// document that exceeds this is abandoned and reported as a failure.
    pub document_timeout_secs: u64,

    /// Whether to fall back to OCR when a document has no embedded text
    /// layer. Default: true.
    pub ocr_enabled: bool,

    /// Tesseract language code passed to the OCR engine. Default: "eng".
    pub ocr_language: String,

    /// Path to the tesseract binary. Default: "tesseract" (resolved via
    /// PATH).
    pub tesseract_path: String,

    /// Maximum rendered page dimension (width or height) in pixels when
    /// rasterising for OCR. Default: 2000.
    ///
    /// A safety cap independent of page size: an A0 poster page could
    /// otherwise rasterise to a 13 000 px bitmap and exhaust memory. 2000 px
    /// keeps gazette body text comfortably above tesseract's legibility
    /// floor.
    pub max_rendered_pixels: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            match_threshold: 0.85,
            concurrency: 4,
            document_timeout_secs: 120,
            ocr_enabled: true,
            ocr_language: "eng".to_string(),
            tesseract_path: "tesseract".to_string(),
            max_rendered_pixels: 2000,
        }
    }
}

impl EngineConfig {
    /// Create a new builder for `EngineConfig`.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`EngineConfig`].
#[derive(Debug)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn match_threshold(mut self, t: f64) -> Self {
        self.config.match_threshold = t;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn document_timeout_secs(mut self, secs: u64) -> Self {
        self.config.document_timeout_secs = secs.max(1);
        self
    }

    pub fn ocr_enabled(mut self, v: bool) -> Self {
        self.config.ocr_enabled = v;
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn tesseract_path(mut self, path: impl Into<String>) -> Self {
        self.config.tesseract_path = path.into();
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<EngineConfig, GazetteError> {
        let c = &self.config;
        if !(0.0..=1.0).contains(&c.match_threshold) {
            return Err(GazetteError::InvalidConfig(format!(
                "match_threshold must be within [0,1], got {}",
                c.match_threshold
            )));
        }
        if c.concurrency == 0 {
            return Err(GazetteError::InvalidConfig(
                "concurrency must be ≥ 1".into(),
            ));
        }
        if c.ocr_language.is_empty() {
            return Err(GazetteError::InvalidConfig(
                "ocr_language must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
