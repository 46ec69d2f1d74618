//! Page layout.
//!
//! Turns classified lines into positioned text runs on A4 pages. Nothing
//! here knows about PDF objects; the writer only replays what is laid out.

use crate::lexer::{Line, LineKind};
use crate::metrics::{self, BULLET, Font};
use tracing::warn;

/// Page width in points.
pub const PAGE_WIDTH: f32 = 595.0;
/// Page height in points.
pub const PAGE_HEIGHT: f32 = 842.0;
/// Margin on every side, in points.
pub const MARGIN: f32 = 50.0;
/// Fill opacity of the watermark.
pub const WATERMARK_OPACITY: f32 = 0.1;

const LINE_SPACING: f32 = 1.35;
const TITLE_TOP: f32 = PAGE_HEIGHT * 0.62;
const BULLET_INDENT: f32 = 12.0;
const FOOTER_SIZE: f32 = 9.0;
const WATERMARK_SIZE: f32 = 60.0;
const WATERMARK_ANGLE_DEGREES: f32 = 45.0;

/// Visual style of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Title,
    Section,
    SubSection,
    Body,
    Footer,
}

impl Style {
    #[must_use]
    pub fn font(&self) -> Font {
        match self {
            Self::Title | Self::Section | Self::SubSection => Font::Bold,
            Self::Body | Self::Footer => Font::Regular,
        }
    }

    /// Font size in points.
    #[must_use]
    pub fn size(&self) -> f32 {
        match self {
            Self::Title => 26.0,
            Self::Section => 18.0,
            Self::SubSection => 14.0,
            Self::Body => 11.0,
            Self::Footer => FOOTER_SIZE,
        }
    }

    /// Fill color as RGB components in `0.0..=1.0`.
    #[must_use]
    pub fn color(&self) -> [f32; 3] {
        match self {
            Self::Title => [0.10, 0.20, 0.45],
            Self::Section => [0.15, 0.32, 0.60],
            Self::SubSection => [0.25, 0.25, 0.30],
            Self::Body => [0.0, 0.0, 0.0],
            Self::Footer => [0.40, 0.40, 0.40],
        }
    }

    fn space_before(&self) -> f32 {
        match self {
            Self::Section => 14.0,
            Self::SubSection => 8.0,
            _ => 0.0,
        }
    }

    fn line_height(&self) -> f32 {
        self.size() * LINE_SPACING
    }
}

/// A single line of text at a fixed position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Left edge of the baseline.
    pub x: f32,
    /// Baseline height from the bottom of the page.
    pub y: f32,
    pub style: Style,
    /// WinAnsi-encoded text.
    pub bytes: Vec<u8>,
}

impl TextRun {
    /// The run's text, decoded.
    #[must_use]
    pub fn text(&self) -> String {
        metrics::decode(&self.bytes)
    }
}

/// Rotated, translucent text drawn across the page center.
#[derive(Debug, Clone, PartialEq)]
pub struct Watermark {
    /// WinAnsi-encoded text.
    pub bytes: Vec<u8>,
    pub size: f32,
    pub angle_degrees: f32,
    pub opacity: f32,
}

impl Watermark {
    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            size: WATERMARK_SIZE,
            angle_degrees: WATERMARK_ANGLE_DEGREES,
            opacity: WATERMARK_OPACITY,
        }
    }

    /// Text matrix placing the watermark's midpoint on the page center.
    #[must_use]
    pub fn text_matrix(&self) -> [f32; 6] {
        let (sin, cos) = self.angle_degrees.to_radians().sin_cos();
        let half_width = metrics::text_width(Font::Bold, &self.bytes, self.size) / 2.0;
        // Shift down by roughly half the cap height so the glyphs, not the
        // baseline, straddle the center.
        let half_height = self.size * 0.35;
        let tx = PAGE_WIDTH / 2.0 - half_width * cos + half_height * sin;
        let ty = PAGE_HEIGHT / 2.0 - half_width * sin - half_height * cos;
        [cos, sin, -sin, cos, tx, ty]
    }

    /// The watermark text, decoded.
    #[must_use]
    pub fn text(&self) -> String {
        metrics::decode(&self.bytes)
    }
}

/// One laid-out page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    /// 1-based page number.
    pub number: usize,
    /// Content runs, top to bottom.
    pub runs: Vec<TextRun>,
    pub watermark: Watermark,
    /// `Page n of N`, centered below the bottom margin.
    pub footer: TextRun,
}

/// The laid-out document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub pages: Vec<PageLayout>,
    /// Text of the first title line, if any.
    pub title: Option<String>,
}

impl DocumentLayout {
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    TitlePage,
    Body,
}

struct Paginator {
    phase: Phase,
    finished: Vec<Vec<TextRun>>,
    current: Vec<TextRun>,
    cursor: f32,
    title: Option<String>,
}

impl Paginator {
    fn new() -> Self {
        Self {
            phase: Phase::TitlePage,
            finished: Vec::new(),
            current: Vec::new(),
            cursor: PAGE_HEIGHT - MARGIN,
            title: None,
        }
    }

    fn break_page(&mut self) {
        if self.current.is_empty() {
            return;
        }
        self.finished.push(std::mem::take(&mut self.current));
        self.cursor = PAGE_HEIGHT - MARGIN;
    }

    fn skip(&mut self, amount: f32) {
        if self.current.is_empty() {
            return;
        }
        self.cursor -= amount;
    }

    fn place(&mut self, line: Line, index: usize) {
        let encoded = match metrics::encode(&line.text) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(line = index + 1, error = %err, "skipping line that cannot be rendered");
                return;
            }
        };

        match line.kind {
            LineKind::Blank => self.skip(Style::Body.line_height() / 2.0),
            LineKind::Title => {
                if self.phase == Phase::TitlePage && self.title.is_none() {
                    self.title = Some(line.text);
                    if self.current.is_empty() {
                        self.cursor = TITLE_TOP;
                    }
                }
                self.centered(&encoded, Style::Title);
            }
            LineKind::SectionHeading => {
                self.phase = Phase::Body;
                self.break_page();
                self.skip(Style::Section.space_before());
                self.flow(&encoded, Style::Section, MARGIN);
            }
            LineKind::SubHeading => {
                self.skip(Style::SubSection.space_before());
                self.flow(&encoded, Style::SubSection, MARGIN);
            }
            LineKind::Bullet => {
                let mut item = vec![BULLET, b' '];
                item.extend_from_slice(&encoded);
                self.flow(&item, Style::Body, MARGIN + BULLET_INDENT);
            }
            LineKind::Body => self.flow(&encoded, Style::Body, MARGIN),
        }
    }

    fn flow(&mut self, text: &[u8], style: Style, left: f32) {
        let width = PAGE_WIDTH - MARGIN - left;
        for line in wrap(text, style, width) {
            self.emit(line, style, left);
        }
    }

    fn centered(&mut self, text: &[u8], style: Style) {
        for line in wrap(text, style, PAGE_WIDTH - 2.0 * MARGIN) {
            let width = metrics::text_width(style.font(), &line, style.size());
            self.emit(line, style, (PAGE_WIDTH - width) / 2.0);
        }
    }

    fn emit(&mut self, bytes: Vec<u8>, style: Style, x: f32) {
        if self.cursor - style.line_height() < MARGIN {
            self.break_page();
        }
        self.current.push(TextRun {
            x,
            y: self.cursor - style.size(),
            style,
            bytes,
        });
        self.cursor -= style.line_height();
    }

    fn finish(mut self, watermark: &[u8]) -> DocumentLayout {
        if !self.current.is_empty() || self.finished.is_empty() {
            self.finished.push(self.current);
        }

        let total = self.finished.len();
        let pages = self
            .finished
            .into_iter()
            .enumerate()
            .map(|(index, runs)| {
                let number = index + 1;
                PageLayout {
                    number,
                    runs,
                    watermark: Watermark::new(watermark.to_vec()),
                    footer: footer(number, total),
                }
            })
            .collect();

        DocumentLayout {
            pages,
            title: self.title,
        }
    }
}

fn footer(number: usize, total: usize) -> TextRun {
    let bytes = format!("Page {number} of {total}").into_bytes();
    let width = metrics::text_width(Style::Footer.font(), &bytes, FOOTER_SIZE);
    TextRun {
        x: (PAGE_WIDTH - width) / 2.0,
        y: MARGIN / 2.0,
        style: Style::Footer,
        bytes,
    }
}

/// Greedy word wrap. A word wider than `width` is broken across lines.
fn wrap(text: &[u8], style: Style, width: f32) -> Vec<Vec<u8>> {
    let font = style.font();
    let size = style.size();
    let space = metrics::text_width(font, b" ", size);

    let mut lines = Vec::new();
    let mut line: Vec<u8> = Vec::new();
    let mut line_width = 0.0;

    for mut word in text.split(|&b| b == b' ').filter(|word| !word.is_empty()) {
        let mut word_width = metrics::text_width(font, word, size);
        while word_width > width && word.len() > 1 {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                line_width = 0.0;
            }
            let split = fitting_prefix(word, style, width);
            lines.push(word[..split].to_vec());
            word = &word[split..];
            word_width = metrics::text_width(font, word, size);
        }
        if !line.is_empty() && line_width + space + word_width > width {
            lines.push(std::mem::take(&mut line));
            line_width = 0.0;
        }
        if !line.is_empty() {
            line.push(b' ');
            line_width += space;
        }
        line.extend_from_slice(word);
        line_width += word_width;
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Length of the longest prefix of `word` that fits in `width`, at least
/// one byte. WinAnsi is single-byte, so any split is a glyph boundary.
fn fitting_prefix(word: &[u8], style: Style, width: f32) -> usize {
    (1..=word.len())
        .find(|&end| metrics::text_width(style.font(), &word[..end], style.size()) > width)
        .map_or(word.len(), |end| (end - 1).max(1))
}

/// Lays out classified lines, stamping `watermark` on every page.
pub(crate) fn layout(lines: Vec<Line>, watermark: &[u8]) -> DocumentLayout {
    let mut paginator = Paginator::new();
    for (index, line) in lines.into_iter().enumerate() {
        paginator.place(line, index);
    }
    paginator.finish(watermark)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn run(input: &str) -> DocumentLayout {
        layout(lex(input), b"Paper Lantern")
    }

    fn page_texts(page: &PageLayout) -> Vec<String> {
        page.runs.iter().map(TextRun::text).collect()
    }

    #[test]
    fn title_is_centered_on_its_own_page() {
        let doc = run("# Photosynthesis\n## Introduction\nPlants convert light.");

        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.title.as_deref(), Some("Photosynthesis"));

        let title = &doc.pages[0].runs[0];
        assert_eq!(title.text(), "Photosynthesis");
        assert_eq!(title.style, Style::Title);
        let width = metrics::text_width(Font::Bold, &title.bytes, Style::Title.size());
        assert!((title.x + width / 2.0 - PAGE_WIDTH / 2.0).abs() < 0.01);

        assert_eq!(
            page_texts(&doc.pages[1]),
            vec!["Introduction", "Plants convert light."]
        );
        assert_eq!(doc.pages[1].runs[0].style, Style::Section);
    }

    #[test]
    fn each_section_starts_a_page() {
        let doc = run("## One\ntext\n## Two\n### Detail\n* point\n## Three");
        assert_eq!(doc.page_count(), 3);
        assert_eq!(
            page_texts(&doc.pages[1]),
            vec!["Two", "Detail", "• point"]
        );
    }

    #[test]
    fn leading_section_does_not_leave_blank_page() {
        let doc = run("\n\n## Overview\nBody");
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.pages[0].runs[0].text(), "Overview");
    }

    #[test]
    fn long_body_overflows_onto_new_pages() {
        let paragraph = "The quick brown fox jumps over the lazy dog. ".repeat(20);
        let input = std::iter::repeat_n(paragraph.as_str(), 40)
            .collect::<Vec<_>>()
            .join("\n");
        let doc = run(&input);

        assert!(doc.page_count() > 1);
        for page in &doc.pages {
            for text_run in &page.runs {
                assert!(text_run.y >= MARGIN);
                assert!(text_run.y <= PAGE_HEIGHT - MARGIN);
            }
        }
    }

    #[test]
    fn wrapped_lines_fit_the_column() {
        let paragraph = "Photosynthesis converts light energy into chemical energy ".repeat(10);
        let doc = run(&paragraph);
        let limit = PAGE_WIDTH - 2.0 * MARGIN;

        assert!(doc.pages[0].runs.len() > 1);
        for text_run in &doc.pages[0].runs {
            let width = metrics::text_width(Font::Regular, &text_run.bytes, Style::Body.size());
            assert!(width <= limit + 0.01, "line too wide: {width}");
        }
    }

    #[test]
    fn every_page_gets_footer_and_watermark() {
        let doc = run("# T\n## A\nx\n## B\ny\n## C\nz");
        let total = doc.page_count();
        assert_eq!(total, 4);
        for page in &doc.pages {
            assert_eq!(page.footer.text(), format!("Page {} of {total}", page.number));
            assert_eq!(page.watermark.text(), "Paper Lantern");
            assert!((page.watermark.opacity - 0.1).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn unencodable_line_is_skipped() {
        let doc = run("## Notes\nkept before\n光合作用 is photosynthesis\nkept after");
        assert_eq!(
            page_texts(&doc.pages[0]),
            vec!["Notes", "kept before", "kept after"]
        );
    }

    #[test]
    fn overlong_word_is_broken_to_fit() {
        let word = "x".repeat(200);
        let lines = wrap(format!("a {word} b").as_bytes(), Style::Body, 100.0);

        assert!(lines.len() > 3);
        assert_eq!(lines[0], b"a");
        for line in &lines {
            assert!(metrics::text_width(Font::Regular, line, Style::Body.size()) <= 100.0);
        }
        let rejoined: usize = lines[1..].iter().map(Vec::len).sum();
        assert_eq!(rejoined, 200 + " b".len());
        assert!(lines.last().is_some_and(|last| last.ends_with(b" b")));
    }

    #[test]
    fn long_url_stays_inside_the_margins() {
        let url = format!("https://example.org/{}", "segment/".repeat(40));
        let doc = run(&format!("## References\n* {url}"));
        for run in doc.pages.iter().flat_map(|page| &page.runs) {
            let width = metrics::text_width(run.style.font(), &run.bytes, run.style.size());
            assert!(run.x + width <= PAGE_WIDTH - MARGIN + 0.01, "{}", run.text());
        }
    }

    #[test]
    fn watermark_is_centered_and_diagonal() {
        let watermark = Watermark::new(b"Paper Lantern".to_vec());
        let [a, b, c, d, tx, ty] = watermark.text_matrix();
        assert!((a - d).abs() < 1e-6);
        assert!((b + c).abs() < 1e-6);
        assert!((a - b).abs() < 1e-6);

        let half_width = metrics::text_width(Font::Bold, &watermark.bytes, watermark.size) / 2.0;
        let mid_x = tx + half_width * a - watermark.size * 0.35 * b;
        let mid_y = ty + half_width * b + watermark.size * 0.35 * a;
        assert!((mid_x - PAGE_WIDTH / 2.0).abs() < 0.01);
        assert!((mid_y - PAGE_HEIGHT / 2.0).abs() < 0.01);
    }
}
