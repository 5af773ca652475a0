use std::path::Path;

use lopdf::Document;
use tracing::debug;

use crate::domain::{errors::PipelineError, ports::TextExtractor};

/// lopdf-backed extractor. Walks the page tree in order and concatenates the
/// text of every non-blank page.
#[derive(Debug, Default)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> Result<String, PipelineError> {
        let document = Document::load(path).map_err(|e| {
            PipelineError::extraction(format!("failed to load {}: {e}", path.display()))
        })?;

        let mut pages = Vec::new();
        for (page_no, _page_id) in document.get_pages() {
            let text = document
                .extract_text(&[page_no])
                .map_err(|e| PipelineError::extraction(format!("page {page_no}: {e}")))?;

            if text.trim().is_empty() {
                debug!(page = page_no, "page had no text");
            } else {
                pages.push(text);
            }
        }

        Ok(pages.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    fn write_sample_pdf(path: &Path, text: &str) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 48.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn extracts_text_from_a_generated_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.pdf");
        write_sample_pdf(&path, "Selection board duties");

        let text = PdfTextExtractor.extract(&path).unwrap();

        assert!(text.contains("Selection board duties"));
    }

    #[test]
    fn missing_file_is_an_extraction_error() {
        let err = PdfTextExtractor
            .extract(Path::new("does-not-exist.pdf"))
            .unwrap_err();

        assert!(matches!(err, PipelineError::Extraction(_)));
    }
}
