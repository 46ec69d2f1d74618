//! Text-to-PDF rendering for paper-lantern.
//!
//! Rendering runs in three passes:
//!
//! - **Lexer**: classifies each line by its Markdown-style prefix
//! - **Layout**: wraps and paginates lines into positioned text runs
//! - **Writer**: serializes the layout into a PDF byte buffer
//!
//! Every page carries a diagonal watermark and a `Page n of N` footer.

pub mod error;
pub mod layout;
pub mod lexer;
pub mod metrics;
mod writer;

pub use error::RenderError;
pub use layout::{DocumentLayout, PageLayout, Style, TextRun, Watermark};
pub use lexer::{Line, LineKind};

use tracing::{debug, instrument};

/// Watermark used when none is configured.
pub const DEFAULT_WATERMARK: &str = "Paper Lantern";

/// A finished PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Renders generated text to PDF with a fixed watermark.
#[derive(Debug, Clone)]
pub struct Renderer {
    watermark: Vec<u8>,
}

impl Renderer {
    /// Creates a renderer that stamps `watermark` on every page.
    ///
    /// # Errors
    ///
    /// Returns an error if the watermark is blank or uses characters the
    /// standard PDF fonts cannot draw.
    pub fn new(watermark: &str) -> Result<Self, RenderError> {
        let watermark = watermark.trim();
        if watermark.is_empty() {
            return Err(RenderError::EmptyWatermark);
        }
        let watermark = metrics::encode(watermark).map_err(RenderError::UnencodableWatermark)?;
        Ok(Self { watermark })
    }

    /// Lays out `text` without serializing it.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::EmptyInput` if `text` is blank.
    pub fn layout(&self, text: &str) -> Result<DocumentLayout, RenderError> {
        if text.trim().is_empty() {
            return Err(RenderError::EmptyInput);
        }
        Ok(layout::layout(lexer::lex(text), &self.watermark))
    }

    /// Renders `text` into a complete PDF.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::EmptyInput` if `text` is blank.
    #[instrument(skip_all, fields(input_len = text.len()))]
    pub fn render(&self, text: &str) -> Result<RenderedDocument, RenderError> {
        let layout = self.layout(text)?;
        let bytes = writer::write(&layout);
        debug!(pages = layout.page_count(), bytes = bytes.len(), "rendered pdf");
        Ok(RenderedDocument {
            bytes,
            page_count: layout.page_count(),
        })
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            watermark: DEFAULT_WATERMARK.as_bytes().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    fn long_document() -> String {
        let mut text = String::from("# Photosynthesis\n");
        for section in ["Introduction", "Literature Review", "Main Body", "Conclusion"] {
            text.push_str(&format!("## {section}\n"));
            for _ in 0..12 {
                text.push_str(&"Plants convert light energy into chemical energy. ".repeat(8));
                text.push('\n');
            }
        }
        text
    }

    #[test]
    fn output_is_a_pdf() {
        let doc = Renderer::default()
            .render("# Hello\n## World\nBody text.")
            .expect("renders");
        assert!(doc.bytes.starts_with(b"%PDF-"));
        assert!(doc.bytes.ends_with(b"%%EOF") || doc.bytes.ends_with(b"%%EOF\n"));
        assert_eq!(doc.page_count, 2);
    }

    #[test]
    fn empty_input_is_rejected() {
        let renderer = Renderer::default();
        assert_eq!(renderer.render(""), Err(RenderError::EmptyInput));
        assert_eq!(renderer.render(" \n\t\n"), Err(RenderError::EmptyInput));
    }

    #[test]
    fn rendering_is_idempotent() {
        let renderer = Renderer::default();
        let text = long_document();

        let first = renderer.layout(&text).expect("layout");
        let second = renderer.layout(&text).expect("layout");
        assert_eq!(first, second);

        let a = renderer.render(&text).expect("render");
        let b = renderer.render(&text).expect("render");
        assert_eq!(a.page_count, b.page_count);
        assert_eq!(a.bytes, b.bytes);
    }

    #[test]
    fn every_page_has_watermark_and_footer() {
        let doc = Renderer::default().render(&long_document()).expect("render");

        assert!(doc.page_count > 4);
        assert_eq!(count(&doc.bytes, b"(Paper Lantern) Tj"), doc.page_count);
        for page in 1..=doc.page_count {
            let footer = format!("(Page {page} of {}) Tj", doc.page_count);
            assert_eq!(count(&doc.bytes, footer.as_bytes()), 1, "missing {footer}");
        }
    }

    #[test]
    fn custom_watermark_is_used() {
        let renderer = Renderer::new("  DRAFT ").expect("valid watermark");
        let doc = renderer.render("Just one line.").expect("render");
        assert_eq!(count(&doc.bytes, b"(DRAFT) Tj"), 1);
        assert_eq!(count(&doc.bytes, b"(Paper Lantern)"), 0);
    }

    #[test]
    fn invalid_watermarks_are_rejected() {
        assert_eq!(Renderer::new("   ").unwrap_err(), RenderError::EmptyWatermark);
        assert!(matches!(
            Renderer::new("水印"),
            Err(RenderError::UnencodableWatermark(_))
        ));
    }

    #[test]
    fn unencodable_line_does_not_abort() {
        let doc = Renderer::default()
            .render("## Terms\n光合作用\nChlorophyll absorbs light.")
            .expect("render");
        assert_eq!(doc.page_count, 1);
        assert_eq!(count(&doc.bytes, b"(Chlorophyll absorbs light.) Tj"), 1);
    }

    #[test]
    fn document_title_is_recorded() {
        let doc = Renderer::default()
            .render("# Photosynthesis\n## Introduction\nPlants convert light...")
            .expect("render");
        assert_eq!(count(&doc.bytes, b"/Title (Photosynthesis)"), 1);
    }
}
