//! Resume text extraction: turns an uploaded PDF or DOCX into plain text.

use lopdf::Document;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type. Please upload a PDF or DOCX file.")]
    UnsupportedFormat,

    #[error("Failed to read document: {0}")]
    ExtractionFailed(#[source] anyhow::Error),
}

/// Extracts plain text from an uploaded resume.
///
/// Dispatch is by filename suffix only (case-insensitive `.pdf` / `.docx`);
/// any other suffix fails before a parser is invoked. An empty result is not
/// an error here; the caller decides what emptiness means.
pub fn extract_text(bytes: &[u8], declared_filename: &str) -> Result<String, ExtractError> {
    let filename = declared_filename.to_lowercase();
    if filename.ends_with(".pdf") {
        extract_pdf(bytes)
    } else if filename.ends_with(".docx") {
        extract_docx(bytes)
    } else {
        Err(ExtractError::UnsupportedFormat)
    }
}

/// Concatenates per-page text in page order. A page that yields no text
/// contributes nothing; one unreadable page never fails the document.
fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| ExtractError::ExtractionFailed(anyhow::anyhow!(e)))?;

    let mut text = String::new();
    for page_num in doc.get_pages().keys() {
        match doc.extract_text(&[*page_num]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => debug!("Skipping unreadable PDF page {page_num}: {e}"),
        }
    }
    Ok(text)
}

/// Concatenates paragraph text in document order, one paragraph per line.
fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| ExtractError::ExtractionFailed(anyhow::anyhow!("{e}")))?;

    let mut text = String::new();
    for child in docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
            for para_child in paragraph.children {
                if let docx_rs::ParagraphChild::Run(run) = para_child {
                    for run_child in run.children {
                        if let docx_rs::RunChild::Text(t) = run_child {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    Ok(text)
}
