//! Plain text to paginated PDF.
//!
//! Output is a reflowed dump in a single built-in font (Helvetica, WinAnsi
//! encoding): no headings, columns, or images. Characters the encoding cannot
//! represent are replaced with `?` rather than failing the document.

mod encoding;
mod layout;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};

use web2pdf_core::{AppConfig, Error};

pub use encoding::{EncodedText, encode_win_ansi};
pub use layout::wrap_lines;

/// Page geometry and type settings, in PDF points.
#[derive(Debug, Clone)]
pub struct PdfLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub font_size: f32,
    /// Baseline-to-baseline distance as a multiple of `font_size`.
    pub line_spacing: f32,
}

impl Default for PdfLayout {
    fn default() -> Self {
        // A4 portrait, 15mm margins
        Self { page_width: 595.0, page_height: 842.0, margin: 42.5, font_size: 12.0, line_spacing: 1.25 }
    }
}

impl From<&AppConfig> for PdfLayout {
    fn from(config: &AppConfig) -> Self {
        Self { font_size: config.font_size, ..Default::default() }
    }
}

impl PdfLayout {
    fn leading(&self) -> f32 {
        self.font_size * self.line_spacing
    }

    fn text_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    fn lines_per_page(&self) -> usize {
        let usable = self.page_height - 2.0 * self.margin;
        ((usable / self.leading()).floor() as usize).max(1)
    }
}

/// Serializes text into a PDF document.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    layout: PdfLayout,
}

impl PdfWriter {
    pub fn new(layout: PdfLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &PdfLayout {
        &self.layout
    }

    /// Render `text` into PDF bytes.
    ///
    /// Fails with `ENCODING_FAILED` only if the document itself cannot be
    /// serialized; unsupported characters are substituted.
    pub fn write(&self, text: &str) -> Result<Vec<u8>, Error> {
        let encoded = encode_win_ansi(text);
        if encoded.substituted > 0 {
            tracing::debug!(substituted = encoded.substituted, "replaced characters outside WinAnsi");
        }

        let lines = wrap_lines(&encoded.bytes, self.layout.text_width(), self.layout.font_size);
        let blank: &[Vec<u8>] = &[];
        let pages: Vec<&[Vec<u8>]> = if lines.is_empty() {
            vec![blank]
        } else {
            lines.chunks(self.layout.lines_per_page()).collect()
        };

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::with_capacity(pages.len());
        for page_lines in &pages {
            let content = self.page_content(page_lines);
            let encoded = content.encode().map_err(|e| Error::EncodingFailed(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let page_count = kids.len() as i64;
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(self.layout.page_width),
                Object::Real(self.layout.page_height),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).map_err(|e| Error::EncodingFailed(e.to_string()))?;

        tracing::debug!(pages = pages.len(), bytes = out.len(), "wrote text PDF");
        Ok(out)
    }

    fn page_content(&self, lines: &[Vec<u8>]) -> Content {
        let layout = &self.layout;
        let top = layout.page_height - layout.margin - layout.font_size;

        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Real(layout.font_size)]),
            Operation::new("TL", vec![Object::Real(layout.leading())]),
            Operation::new("Td", vec![Object::Real(layout.margin), Object::Real(top)]),
        ];

        for line in lines {
            if !line.is_empty() {
                operations.push(Operation::new("Tj", vec![Object::String(line.clone(), StringFormat::Literal)]));
            }
            operations.push(Operation::new("T*", vec![]));
        }

        operations.push(Operation::new("ET", vec![]));
        Content { operations }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_count(bytes: &[u8]) -> usize {
        Document::load_mem(bytes).unwrap().get_pages().len()
    }

    #[test]
    fn test_write_produces_pdf() {
        let bytes = PdfWriter::default().write("Hello, world.").unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        assert_eq!(page_count(&bytes), 1);
    }

    #[test]
    fn test_write_empty_text_is_single_blank_page() {
        let bytes = PdfWriter::default().write("").unwrap();
        assert_eq!(page_count(&bytes), 1);
    }

    #[test]
    fn test_write_unsupported_characters_substituted() {
        let bytes = PdfWriter::default().write("中文 ✓ emoji 🚀 and Café").unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(page_count(&bytes), 1);
    }

    #[test]
    fn test_write_paginates_long_text() {
        let layout = PdfLayout::default();
        let per_page = layout.lines_per_page();
        let text = (0..per_page * 2 + 1).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");

        let bytes = PdfWriter::new(layout).write(&text).unwrap();
        assert_eq!(page_count(&bytes), 3);
    }

    #[test]
    fn test_write_reflows_long_paragraph() {
        let word = "lorem ";
        let text = word.repeat(4000);
        let bytes = PdfWriter::default().write(&text).unwrap();
        assert!(page_count(&bytes) > 1);
    }

    #[test]
    fn test_layout_from_app_config() {
        let config = AppConfig { font_size: 10.0, ..Default::default() };
        let layout = PdfLayout::from(&config);
        assert_eq!(layout.font_size, 10.0);
        assert_eq!(layout.page_width, 595.0);
    }

    #[test]
    fn test_page_content_skips_show_for_blank_lines() {
        let writer = PdfWriter::default();
        let content = writer.page_content(&[b"(paren) \\ back".to_vec(), Vec::new()]);
        let encoded = content.encode().unwrap();
        let decoded = Content::decode(&encoded).unwrap();

        let shown: Vec<_> = decoded.operations.iter().filter(|op| op.operator == "Tj").collect();
        assert_eq!(shown.len(), 1);
        assert_eq!(decoded.operations.iter().filter(|op| op.operator == "T*").count(), 2);
    }
}
