//! HTML rendering shared by the document export and the browser view.

use html_escape::{encode_double_quoted_attribute, encode_text};
use storydeck_common::{Deck, SlideRecord};
use storydeck_core::Navigator;

const STYLE: &str = r#"
body { font-family: "Noto Sans", Helvetica, Arial, sans-serif; margin: 0; color: #1d1d1f; }
header { padding: 1rem 2rem; background: #f4f4f6; }
.slide { display: flex; gap: 2rem; padding: 2rem; min-height: 60vh; page-break-after: always; }
.slide .text { flex: 2; }
.slide .visual { flex: 1; }
.slide img { max-width: 100%; }
.slide .index { color: #888; }
nav { display: flex; justify-content: space-between; padding: 1rem 2rem; }
nav .disabled { color: #bbb; }
.failure { padding: 2rem; color: #b00020; }
"#;

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{}</title><style>{STYLE}</style></head>\n<body>\n{body}</body></html>\n",
        encode_text(title)
    )
}

fn failure_body() -> &'static str {
    "<div class=\"failure\"><h2>No slides were generated.</h2><p>The model reply could not be turned into a deck. Try again or rephrase the topic.</p></div>\n"
}

fn slide_section(slide: &SlideRecord, total: usize) -> String {
    let mut html = String::from("<section class=\"slide\">\n<div class=\"text\">\n");
    html.push_str(&format!(
        "<p class=\"index\">Slide {} of {total}</p>\n<h2>{}</h2>\n<ul>\n",
        slide.index,
        encode_text(&slide.title)
    ));
    for bullet in &slide.bullets {
        html.push_str(&format!("<li>{}</li>\n", encode_text(bullet)));
    }
    html.push_str("</ul>\n</div>\n");
    if let Some(image) = &slide.image {
        html.push_str(&format!(
            "<div class=\"visual\"><img src=\"{}\" alt=\"{}\"></div>\n",
            image.data_uri(),
            encode_double_quoted_attribute(&slide.title)
        ));
    }
    html.push_str("</section>\n");
    html
}

/// Every slide on its own printed page.
pub fn render_document(deck: &Deck, generated_at: &str) -> String {
    let mut body = format!(
        "<header><h1>{}</h1><p>Generated {}</p></header>\n",
        encode_text(deck.topic()),
        encode_text(generated_at)
    );
    if deck.is_empty() {
        body.push_str(failure_body());
    }
    for slide in deck.slides() {
        body.push_str(&slide_section(slide, deck.len()));
    }
    page(deck.topic(), &body)
}

/// The slide the navigator points at, with previous/next links.
pub fn render_viewer(deck: &Deck, nav: &Navigator) -> String {
    let mut body = format!(
        "<header><h1>{}</h1><p>{}</p></header>\n",
        encode_text(deck.topic()),
        nav.progress_label()
    );

    let Some(slide) = nav.current(deck) else {
        body.push_str(failure_body());
        return page(deck.topic(), &body);
    };
    body.push_str(&slide_section(slide, deck.len()));

    // Links are 1-based, like the slide numbers shown on the page.
    let pos = nav.position().unwrap_or_default();
    let prev = if nav.is_first() {
        "<span class=\"disabled\">&larr; Previous</span>".to_string()
    } else {
        format!("<a href=\"/?slide={pos}\">&larr; Previous</a>")
    };
    let next = if nav.is_last() {
        "<span class=\"disabled\">Next &rarr;</span>".to_string()
    } else {
        format!("<a href=\"/?slide={}\">Next &rarr;</a>", pos + 2)
    };
    body.push_str(&format!(
        "<nav>{prev}<a href=\"/download\">Download</a>{next}</nav>\n"
    ));
    page(deck.topic(), &body)
}
