//! PDF serialization of a finished layout.

use crate::layout::{DocumentLayout, PAGE_HEIGHT, PAGE_WIDTH, PageLayout, TextRun, Watermark};
use crate::metrics::Font;
use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

const WATERMARK_STATE: Name<'static> = Name(b"GS1");
const WATERMARK_GRAY: f32 = 0.5;
const PRODUCER: &str = "paper-lantern";

/// Serializes `layout` into a complete PDF file.
pub(crate) fn write(layout: &DocumentLayout) -> Vec<u8> {
    let mut next = Ref::new(1);
    let catalog_id = next.bump();
    let tree_id = next.bump();
    let regular_id = next.bump();
    let bold_id = next.bump();
    let alpha_id = next.bump();
    let info_id = next.bump();

    let page_ids: Vec<(Ref, Ref)> = layout
        .pages
        .iter()
        .map(|_| (next.bump(), next.bump()))
        .collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(page_ids.iter().map(|&(page_id, _)| page_id))
        .count(page_ids.len() as i32);

    for (id, font) in [(regular_id, Font::Regular), (bold_id, Font::Bold)] {
        pdf.type1_font(id)
            .base_font(Name(font.base_name()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    let opacity = layout
        .pages
        .first()
        .map_or(crate::layout::WATERMARK_OPACITY, |page| page.watermark.opacity);
    pdf.ext_graphics(alpha_id).non_stroking_alpha(opacity);

    for (page_layout, &(page_id, content_id)) in layout.pages.iter().zip(&page_ids) {
        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
        page.parent(tree_id);
        page.contents(content_id);
        {
            let mut resources = page.resources();
            resources
                .fonts()
                .pair(Name(Font::Regular.resource_name()), regular_id)
                .pair(Name(Font::Bold.resource_name()), bold_id);
            resources.ext_g_states().pair(WATERMARK_STATE, alpha_id);
        }
        page.finish();

        pdf.stream(content_id, &page_content(page_layout));
    }

    {
        let mut info = pdf.document_info(info_id);
        info.producer(TextStr(PRODUCER));
        if let Some(title) = &layout.title {
            info.title(TextStr(title.as_str()));
        }
    }

    pdf.finish()
}

fn page_content(page: &PageLayout) -> Vec<u8> {
    let mut content = Content::new();
    draw_watermark(&mut content, &page.watermark);
    for run in &page.runs {
        draw_run(&mut content, run);
    }
    draw_run(&mut content, &page.footer);
    content.finish()
}

fn draw_watermark(content: &mut Content, watermark: &Watermark) {
    content.save_state();
    content.set_parameters(WATERMARK_STATE);
    content.set_fill_rgb(WATERMARK_GRAY, WATERMARK_GRAY, WATERMARK_GRAY);
    content.begin_text();
    content.set_font(Name(Font::Bold.resource_name()), watermark.size);
    content.set_text_matrix(watermark.text_matrix());
    content.show(Str(&watermark.bytes));
    content.end_text();
    content.restore_state();
}

fn draw_run(content: &mut Content, run: &TextRun) {
    let [r, g, b] = run.style.color();
    content.set_fill_rgb(r, g, b);
    content.begin_text();
    content.set_font(Name(run.style.font().resource_name()), run.style.size());
    content.set_text_matrix([1.0, 0.0, 0.0, 1.0, run.x, run.y]);
    content.show(Str(&run.bytes));
    content.end_text();
}
