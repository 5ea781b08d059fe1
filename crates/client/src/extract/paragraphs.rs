//! Paragraph text harvesting from HTML documents.

use scraper::{Html, Selector};

/// Separator placed between paragraphs in the joined output.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Collect the visible text of every `<p>` element in document order.
///
/// Inline markup is flattened, runs of whitespace collapse to a single space,
/// and paragraphs with no text are skipped. Returns an empty string when the
/// document has no paragraphs.
pub fn paragraph_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let selector = Selector::parse("p").expect("invalid selector");

    document
        .select(&selector)
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(PARAGRAPH_SEPARATOR)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
