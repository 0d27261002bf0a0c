//! Optical recognition for scanned gazettes.
//!
//! Pages are rasterised through pdfium (the same engine that reads the
//! text layer) and handed to the Tesseract CLI one image at a time. Going
//! through the CLI rather than a binding keeps the OCR engine swappable
//! and the build free of leptonica/tesseract link-time dependencies; the
//! binary path and language are configurable.
//!
//! Everything here is blocking — pdfium rasterisation is CPU-bound and
//! tesseract is a child process — so the resolver only ever runs inside
//! the `spawn_blocking` the ingest path already hosts the chain in.

use crate::config::EngineConfig;
use crate::error::FileFailure;
use crate::pipeline::text_source::TextResolver;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::process::Command;
use tracing::{debug, warn};

/// OCR fallback resolver: rasterise each page, recognise with tesseract.
pub struct TesseractOcrResolver {
    language: String,
    tesseract_path: String,
    max_rendered_pixels: u32,
}

impl TesseractOcrResolver {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            language: config.ocr_language.clone(),
            tesseract_path: config.tesseract_path.clone(),
            max_rendered_pixels: config.max_rendered_pixels,
        }
    }

    /// Run tesseract over one page image, returning recognised text.
    /// A failed invocation (missing binary, crashed engine) yields no text
    /// for the page rather than failing the document.
    fn recognise_page(&self, image: &DynamicImage, page_num: usize, scratch: &std::path::Path) -> Option<String> {
        let image_path = scratch.join(format!("page-{page_num}.png"));
        if let Err(e) = image.save(&image_path) {
            warn!(page = page_num, error = %e, "failed to write OCR scratch image");
            return None;
        }

        let output = Command::new(&self.tesseract_path)
            .arg(&image_path)
            .arg("stdout")
            .args(["-l", &self.language])
            .output();

        match output {
            Ok(out) if out.status.success() => {
                let text = String::from_utf8_lossy(&out.stdout).into_owned();
                debug!(page = page_num, chars = text.len(), "page recognised");
                Some(text)
            }
            Ok(out) => {
                warn!(
                    page = page_num,
                    status = %out.status,
                    stderr = %String::from_utf8_lossy(&out.stderr),
                    "tesseract exited with failure"
                );
                None
            }
            Err(e) => {
                warn!(
                    page = page_num,
                    tesseract = %self.tesseract_path,
                    error = %e,
                    "could not invoke tesseract"
                );
                None
            }
        }
    }
}

impl TextResolver for TesseractOcrResolver {
    fn name(&self) -> &'static str {
        "tesseract-ocr"
    }

    fn resolve(&self, bytes: &[u8], file_name: &str) -> Result<Option<String>, FileFailure> {
        let images = render_pages(bytes, self.max_rendered_pixels).map_err(|detail| {
            FileFailure::Corrupt {
                file: file_name.to_string(),
                detail,
            }
        })?;

        let scratch = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(e) => {
                warn!(error = %e, "no scratch directory for OCR");
                return Ok(None);
            }
        };

        let mut text = String::new();
        for (idx, image) in images.iter().enumerate() {
            if let Some(page_text) = self.recognise_page(image, idx + 1, scratch.path()) {
                text.push_str(&page_text);
                text.push('\n');
            }
        }

        Ok((!text.trim().is_empty()).then_some(text))
    }
}

/// Rasterise every page of the document, capping the longest edge at
/// `max_pixels` so an oversized page cannot exhaust memory.
fn render_pages(bytes: &[u8], max_pixels: u32) -> Result<Vec<DynamicImage>, String> {
    let pdfium = Pdfium::default();
    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| format!("{e:?}"))?;

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut images = Vec::new();
    for page in document.pages().iter() {
        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| format!("{e:?}"))?;
        images.push(bitmap.as_image());
    }
    Ok(images)
}
