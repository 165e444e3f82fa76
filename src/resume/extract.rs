//! Plain-text extraction for uploaded resumes (PDF, DOCX, TXT).

use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Maximum decompressed bytes read from `word/document.xml` (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 20 * 1024 * 1024;

/// Errors raised while turning an uploaded file into text.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// File extension is not one of the supported resume formats.
    #[error("Unsupported file format: {0}. Please upload a PDF or DOCX file")]
    UnsupportedFormat(String),
    /// PDF parser rejected the document.
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    /// DOCX container or XML body could not be read.
    #[error("DOCX extraction failed: {0}")]
    Docx(String),
    /// Plain-text upload was not valid UTF-8.
    #[error("Text file is not valid UTF-8")]
    InvalidEncoding,
    /// Too little text survived extraction to analyse.
    #[error("Could not extract sufficient text from resume ({length} characters)")]
    InsufficientText {
        /// Length of the trimmed text that was extracted.
        length: usize,
    },
}

/// Resume formats accepted by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeFormat {
    /// Portable Document Format.
    Pdf,
    /// Office Open XML word-processing document.
    Docx,
    /// UTF-8 plain text.
    Text,
}

impl ResumeFormat {
    /// Detect the format from a filename's extension.
    pub fn from_filename(filename: &str) -> Result<Self, ExtractError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "txt" => Ok(Self::Text),
            other => Err(ExtractError::UnsupportedFormat(if other.is_empty() {
                filename.to_string()
            } else {
                format!(".{other}")
            })),
        }
    }
}

/// Extract raw text from `bytes`, choosing the parser from `filename`.
pub fn extract_text(bytes: &[u8], filename: &str) -> Result<String, ExtractError> {
    match ResumeFormat::from_filename(filename)? {
        ResumeFormat::Pdf => extract_pdf(bytes),
        ResumeFormat::Docx => extract_docx(bytes),
        ResumeFormat::Text => String::from_utf8(bytes.to_vec())
            .map_err(|_| ExtractError::InvalidEncoding),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    let entry = archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    let mut xml = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut xml)
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    if xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(ExtractError::Docx(
            "word/document.xml exceeds size limit".to_string(),
        ));
    }
    docx_paragraphs(&xml)
}

/// Collect `<w:t>` runs, emitting one line per `<w:p>` paragraph and table cell.
fn docx_paragraphs(xml: &[u8]) -> Result<String, ExtractError> {
    use quick_xml::events::Event;

    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    let line = current.trim();
                    if !line.is_empty() {
                        lines.push(line.to_string());
                    }
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"tab" => current.push('\t'),
            Ok(Event::Text(text)) if in_text => {
                current.push_str(text.unescape().unwrap_or_default().as_ref());
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Docx(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    let tail = current.trim();
    if !tail.is_empty() {
        lines.push(tail.to_string());
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
pub(crate) fn docx_fixture(paragraphs: &[&str]) -> Vec<u8> {
    use std::io::Write;

    let body: String = paragraphs
        .iter()
        .map(|text| format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>"))
        .collect();
    let xml = format!(
        "<?xml version=\"1.0\"?><w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body>{body}</w:body></w:document>"
    );
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        zip.start_file(
            "word/document.xml",
            zip::write::SimpleFileOptions::default(),
        )
        .unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap();
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn docx_paragraphs_become_lines() {
        let bytes = docx_fixture(&["Jane Doe", "Senior Data Analyst", "SQL &amp; Python"]);
        let text = extract_text(&bytes, "resume.DOCX").expect("docx text");
        assert_eq!(text, "Jane Doe\nSenior Data Analyst\nSQL & Python");
    }

    #[test]
    fn unsupported_extensions_are_rejected() {
        let err = extract_text(b"hello", "resume.rtf").expect_err("rtf rejected");
        assert!(matches!(err, ExtractError::UnsupportedFormat(ref ext) if ext == ".rtf"));

        let err = extract_text(b"hello", "resume").expect_err("no extension");
        assert!(matches!(err, ExtractError::UnsupportedFormat(_)));
    }

    #[test]
    fn plain_text_requires_utf8() {
        assert_eq!(extract_text(b"plain", "cv.txt").unwrap(), "plain");
        assert!(matches!(
            extract_text(&[0xff, 0xfe, 0xfd], "cv.txt"),
            Err(ExtractError::InvalidEncoding)
        ));
    }

    #[test]
    fn corrupt_docx_reports_error() {
        let err = extract_text(b"not a zip", "cv.docx").expect_err("corrupt docx");
        assert!(matches!(err, ExtractError::Docx(_)));
    }
}
