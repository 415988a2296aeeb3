//! Text extraction from source documents.
//!
//! Plain text and Markdown yield one unpaged section. PDFs yield one
//! section per page, numbered from 1.

use grounded_core::{AppError, AppResult};
use lopdf::Document;
use std::path::Path;

/// File extensions the index builder picks up.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md", "pdf"];

/// Raw text of one page, or of a whole unpaged document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub page: Option<u32>,
    pub text: String,
}

/// Split `raw` file contents into sections according to the extension of `path`.
///
/// A PDF that cannot be parsed is a `Knowledge` error. A single page whose
/// text cannot be extracted yields an empty section.
pub fn extract_sections(path: &Path, raw: &[u8]) -> AppResult<Vec<Section>> {
    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);

    if !is_pdf {
        return Ok(vec![Section {
            page: None,
            text: String::from_utf8_lossy(raw).into_owned(),
        }]);
    }

    let doc = Document::load_mem(raw)
        .map_err(|e| AppError::Knowledge(format!("Failed to open PDF {:?}: {}", path, e)))?;

    let sections = doc
        .get_pages()
        .into_keys()
        .map(|page| {
            let text = doc.extract_text(&[page]).unwrap_or_else(|e| {
                tracing::debug!("No text on page {} of {:?}: {}", page, path, e);
                String::new()
            });
            Section {
                page: Some(page),
                text,
            }
        })
        .collect();

    Ok(sections)
}

/// Minimal PDF with one line of Courier text per page.
#[cfg(test)]
pub(crate) fn sample_pdf(pages: &[&str]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
                Operation::new("Td", vec![Object::Integer(72), Object::Integer(720)]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::normalize_text;

    #[test]
    fn test_text_file_is_one_unpaged_section() {
        let sections = extract_sections(Path::new("notes.MD"), b"# Title\nbody").unwrap();
        assert_eq!(
            sections,
            vec![Section {
                page: None,
                text: "# Title\nbody".to_string(),
            }]
        );
    }

    #[test]
    fn test_pdf_pages_numbered_from_one() {
        let pdf = sample_pdf(&["Alpha page text", "Bravo page text", "Charlie page text"]);
        let sections = extract_sections(Path::new("manual.pdf"), &pdf).unwrap();

        let pages: Vec<Option<u32>> = sections.iter().map(|s| s.page).collect();
        assert_eq!(pages, vec![Some(1), Some(2), Some(3)]);
        assert!(normalize_text(&sections[0].text).contains("Alpha page text"));
        assert!(normalize_text(&sections[2].text).contains("Charlie page text"));
    }

    #[test]
    fn test_unparseable_pdf_is_knowledge_error() {
        let result = extract_sections(Path::new("broken.pdf"), b"not a pdf");
        assert!(matches!(result, Err(AppError::Knowledge(_))));
    }
}
