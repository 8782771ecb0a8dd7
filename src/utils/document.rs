//! Plain-text extraction from PDF, DOCX and TXT documents.
//!
//! PDF goes through the pdf-extract crate. DOCX is a ZIP archive whose
//! `word/document.xml` is streamed with quick-xml. TXT is decoded with a fixed
//! chain of encodings that ends in Latin-1, which cannot fail.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::models::{DocumentFormat, DocumentText};

/// Errors that can occur during text extraction
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Failed to decode document: {0}")]
    DecodeFailure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read `path` and return its text with the detected format
pub fn extract_document(path: &Path) -> Result<DocumentText, DocumentError> {
    if !path.is_file() {
        return Err(DocumentError::NotFound(path.display().to_string()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let format = DocumentFormat::from_extension(ext)
        .ok_or_else(|| DocumentError::UnsupportedFormat(ext.to_string()))?;

    let text = match format {
        DocumentFormat::Pdf => extract_pdf(path)?,
        DocumentFormat::Docx => extract_docx(path)?,
        DocumentFormat::Txt => decode_text(&std::fs::read(path)?),
    };

    tracing::debug!(
        path = %path.display(),
        format = %format,
        chars = text.chars().count(),
        "Extracted document text"
    );
    Ok(DocumentText::new(text, format))
}

fn extract_pdf(path: &Path) -> Result<String, DocumentError> {
    pdf_extract::extract_text(path).map_err(|e| DocumentError::DecodeFailure(e.to_string()))
}

fn extract_docx(path: &Path) -> Result<String, DocumentError> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| DocumentError::DecodeFailure(format!("Failed to open DOCX: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| DocumentError::DecodeFailure(format!("Missing document body: {}", e)))?
        .read_to_string(&mut xml)?;

    docx_xml_to_text(&xml)
}

/// Flatten WordprocessingML to text: runs are concatenated, paragraphs end in
/// a newline, `w:tab` becomes a tab and `w:br` a newline
pub fn docx_xml_to_text(xml: &str) -> Result<String, DocumentError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"w:t" => in_run_text = true,
                b"w:tab" => text.push('\t'),
                b"w:br" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_run_text => {
                let chunk = e
                    .unescape()
                    .map_err(|e| DocumentError::DecodeFailure(format!("DOCX XML: {}", e)))?;
                text.push_str(&chunk);
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(DocumentError::DecodeFailure(format!("DOCX XML: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

/// Decode text bytes: UTF-8 (BOM stripped), then BOM-marked UTF-16, then Latin-1
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    if let Some(text) = decode_utf16(bytes) {
        return text;
    }

    tracing::debug!("Falling back to Latin-1 decoding");
    bytes.iter().map(|&b| b as char).collect()
}

fn decode_utf16(bytes: &[u8]) -> Option<String> {
    let (body, little_endian) = if let Some(rest) = bytes.strip_prefix(b"\xFF\xFE") {
        (rest, true)
    } else if let Some(rest) = bytes.strip_prefix(b"\xFE\xFF") {
        (rest, false)
    } else {
        return None;
    };

    if body.len() % 2 != 0 {
        return None;
    }

    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| {
            if little_endian {
                u16::from_le_bytes([pair[0], pair[1]])
            } else {
                u16::from_be_bytes([pair[0], pair[1]])
            }
        })
        .collect();

    String::from_utf16(&units).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file() {
        let result = extract_document(Path::new("/nonexistent/paper.pdf"));
        assert!(matches!(result, Err(DocumentError::NotFound(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".odt").tempfile().unwrap();
        let result = extract_document(file.path());
        assert!(matches!(result, Err(DocumentError::UnsupportedFormat(ext)) if ext == "odt"));
    }

    #[test]
    fn test_txt_utf8_with_bom() {
        let mut file = tempfile::Builder::new().suffix(".TXT").tempfile().unwrap();
        file.write_all(b"\xEF\xBB\xBFHello r\xC3\xA9sum\xC3\xA9").unwrap();

        let doc = extract_document(file.path()).unwrap();
        assert_eq!(doc.format, DocumentFormat::Txt);
        assert_eq!(doc.text, "Hello résumé");
    }

    #[test]
    fn test_decode_utf16_le() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "Hi".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode_text(&bytes), "Hi");
    }

    #[test]
    fn test_decode_latin1_fallback() {
        assert_eq!(decode_text(b"caf\xE9"), "café");
    }

    #[test]
    fn test_docx_xml_flattening() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:p><w:r><w:t>Title &amp; More</w:t></w:r></w:p>
<w:p><w:r><w:t xml:space="preserve">A </w:t><w:tab/><w:t>B</w:t><w:br/><w:t>C</w:t></w:r></w:p>
</w:body></w:document>"#;

        let text = docx_xml_to_text(xml).unwrap();
        assert_eq!(text, "Title & More\nA \tB\nC\n");
    }

    #[test]
    fn test_docx_archive() {
        let file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        {
            let mut zip = zip::ZipWriter::new(file.reopen().unwrap());
            zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(
                br#"<w:document xmlns:w="x"><w:body><w:p><w:r><w:t>References</w:t></w:r></w:p></w:body></w:document>"#,
            )
            .unwrap();
            zip.finish().unwrap();
        }

        let doc = extract_document(file.path()).unwrap();
        assert_eq!(doc.format, DocumentFormat::Docx);
        assert_eq!(doc.text, "References\n");
    }

    #[test]
    fn test_corrupt_docx() {
        let mut file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        file.write_all(b"not a zip").unwrap();
        assert!(matches!(
            extract_document(file.path()),
            Err(DocumentError::DecodeFailure(_))
        ));
    }
}
