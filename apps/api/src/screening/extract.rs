//! Resume text extraction, dispatched on the upload's file extension.

use std::path::Path;

use bytes::Bytes;
use docx_rs::{DocumentChild, ParagraphChild, RunChild};
use thiserror::Error;

/// An uploaded resume file as received from the multipart form.
#[derive(Debug, Clone)]
pub struct ResumeDocument {
    pub filename: String,
    pub data: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeFormat {
    Pdf,
    Docx,
    Txt,
}

impl ResumeFormat {
    /// Infers the format from the filename extension (case-insensitive).
    /// `None` means the file type is not supported and should be skipped.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = Path::new(filename).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX extraction failed: {0}")]
    Docx(String),

    #[error("Text file is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Extraction task aborted: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}

/// Extracts plain text from a resume.
///
/// Returns `Ok(None)` for unsupported formats. Parsing runs on the blocking
/// pool; a parser panic on a corrupt file comes back as `ExtractError::Aborted`.
pub async fn extract_text(doc: &ResumeDocument) -> Result<Option<String>, ExtractError> {
    let Some(format) = ResumeFormat::from_filename(&doc.filename) else {
        return Ok(None);
    };
    let data = doc.data.clone();
    let text = tokio::task::spawn_blocking(move || extract_with_format(format, &data)).await??;
    Ok(Some(text))
}

pub fn extract_with_format(format: ResumeFormat, data: &[u8]) -> Result<String, ExtractError> {
    match format {
        ResumeFormat::Pdf => extract_pdf(data),
        ResumeFormat::Docx => extract_docx(data),
        ResumeFormat::Txt => Ok(String::from_utf8(data.to_vec())?),
    }
}

fn extract_pdf(data: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(data).map_err(|e| ExtractError::Pdf(e.to_string()))
}

/// Top-level paragraphs in document order, each followed by a newline.
fn extract_docx(data: &[u8]) -> Result<String, ExtractError> {
    let docx = docx_rs::read_docx(data).map_err(|e| ExtractError::Docx(e.to_string()))?;

    let mut text = String::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            for paragraph_child in &paragraph.children {
                if let ParagraphChild::Run(run) = paragraph_child {
                    for run_child in &run.children {
                        match run_child {
                            RunChild::Text(t) => text.push_str(&t.text),
                            RunChild::Tab(_) => text.push('\t'),
                            RunChild::Break(_) => text.push('\n'),
                            _ => {}
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Paragraph, Run};
    use std::io::Cursor;

    const TWO_PAGE_PDF: &[u8] = include_bytes!("testdata/two_page_resume.pdf");

    fn doc(filename: &str, data: &'static [u8]) -> ResumeDocument {
        ResumeDocument {
            filename: filename.to_string(),
            data: Bytes::from_static(data),
        }
    }

    #[test]
    fn test_format_from_filename() {
        assert_eq!(ResumeFormat::from_filename("cv.pdf"), Some(ResumeFormat::Pdf));
        assert_eq!(ResumeFormat::from_filename("CV.PDF"), Some(ResumeFormat::Pdf));
        assert_eq!(ResumeFormat::from_filename("a.b.docx"), Some(ResumeFormat::Docx));
        assert_eq!(ResumeFormat::from_filename("notes.txt"), Some(ResumeFormat::Txt));
        assert_eq!(ResumeFormat::from_filename("table.csv"), None);
        assert_eq!(ResumeFormat::from_filename("README"), None);
        assert_eq!(ResumeFormat::from_filename("cv.doc"), None);
    }

    #[tokio::test]
    async fn test_txt_is_decoded_as_utf8() {
        let text = extract_text(&doc("resume.txt", b"Hello")).await.unwrap();
        assert_eq!(text.as_deref(), Some("Hello"));
    }

    #[tokio::test]
    async fn test_txt_invalid_utf8_is_error() {
        let result = extract_text(&doc("resume.txt", &[0xff, 0xfe, 0x00])).await;
        assert!(matches!(result, Err(ExtractError::Utf8(_))));
    }

    #[tokio::test]
    async fn test_unsupported_format_is_skipped() {
        let text = extract_text(&doc("candidates.csv", b"name,score")).await.unwrap();
        assert!(text.is_none());
    }

    #[tokio::test]
    async fn test_pdf_pages_extracted_in_order() {
        let text = extract_text(&doc("resume.PDF", TWO_PAGE_PDF))
            .await
            .unwrap()
            .unwrap();
        let first = text.find("Alice").expect("first page text");
        let second = text.find("Rustacean").expect("second page text");
        assert!(first < second, "pages out of order: {text:?}");
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_error() {
        let result = extract_text(&doc("resume.pdf", b"definitely not a pdf")).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_docx_paragraphs_joined_with_newlines() {
        let mut buf = Cursor::new(Vec::new());
        Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Jane Doe")))
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text("Senior "))
                    .add_run(Run::new().add_text("Rust Engineer")),
            )
            .build()
            .pack(&mut buf)
            .unwrap();

        let text = extract_with_format(ResumeFormat::Docx, buf.get_ref()).unwrap();
        assert_eq!(text, "Jane Doe\nSenior Rust Engineer\n");
    }

    #[test]
    fn test_corrupt_docx_is_error() {
        let result = extract_with_format(ResumeFormat::Docx, b"PK\x03\x04garbage");
        assert!(matches!(result, Err(ExtractError::Docx(_))));
    }
}
