use lopdf::{content::Content, Document, Object, ObjectId};

use crate::error::AnalysisError;

/// Extracts positional text from every page of an uploaded PDF, joined with
/// `===PAGE N===` markers so downstream parsers can stay line-oriented.
/// A page that fails to decode contributes nothing; only a document that
/// cannot be opened at all is a hard error.
pub fn extract_pdf_text(pdf_bytes: &[u8]) -> Result<String, AnalysisError> {
    let doc = Document::load_mem(pdf_bytes)
        .map_err(|err| AnalysisError::PdfExtraction(err.to_string()))?;

    let mut pages: Vec<String> = Vec::new();
    for (page_num, page_id) in doc.get_pages() {
        let text = page_text(&doc, page_id).unwrap_or_default();
        if !text.trim().is_empty() {
            pages.push(format!("===PAGE {}===\n{}", page_num, text));
        }
    }
    Ok(pages.join("\n"))
}

/// Walks one page's content stream and stitches its text-showing operators
/// back into lines. Positioning operators become line breaks.
fn page_text(doc: &Document, page_id: ObjectId) -> Option<String> {
    let content_bytes = doc.get_page_content(page_id).ok()?;
    let content = Content::decode(&content_bytes).ok()?;

    let mut text = String::new();
    for operation in &content.operations {
        match operation.operator.as_str() {
            "Tj" | "TJ" | "'" | "\"" => {
                for operand in &operation.operands {
                    if let Some(s) = text_object_string(operand) {
                        text.push_str(&s);
                        text.push(' ');
                    }
                }
            }
            "Td" | "TD" | "T*" => {
                if !text.ends_with('\n') {
                    text.push('\n');
                }
            }
            _ => {}
        }
    }
    Some(text)
}

/// Decodes the string payload of a text operand. TJ arrays mix strings with
/// kerning numbers; strings are UTF-16BE when BOM-prefixed, else treated as
/// Latin-1/PDFDocEncoding.
fn text_object_string(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => {
            if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
                let utf16: Vec<u16> = bytes[2..]
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16(&utf16).ok()
            } else {
                Some(bytes.iter().map(|&b| b as char).collect())
            }
        }
        Object::Array(items) => {
            let joined: String = items.iter().filter_map(text_object_string).collect();
            if joined.is_empty() {
                None
            } else {
                Some(joined)
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_are_a_hard_extraction_error() {
        let err = extract_pdf_text(b"not a pdf at all").unwrap_err();
        assert!(matches!(err, AnalysisError::PdfExtraction(_)));
    }

    #[test]
    fn decodes_latin1_and_utf16_string_objects() {
        let latin = Object::String(b"Caf\xe9".to_vec(), lopdf::StringFormat::Literal);
        assert_eq!(text_object_string(&latin), Some("Café".to_string()));

        let mut utf16 = vec![0xFE, 0xFF];
        for unit in "Lawn".encode_utf16() {
            utf16.extend_from_slice(&unit.to_be_bytes());
        }
        let obj = Object::String(utf16, lopdf::StringFormat::Hexadecimal);
        assert_eq!(text_object_string(&obj), Some("Lawn".to_string()));
    }

    #[test]
    fn tj_arrays_concatenate_their_string_parts() {
        let arr = Object::Array(vec![
            Object::String(b"Meeting ".to_vec(), lopdf::StringFormat::Literal),
            Object::Integer(-120),
            Object::String(b"Room".to_vec(), lopdf::StringFormat::Literal),
        ]);
        assert_eq!(text_object_string(&arr), Some("Meeting Room".to_string()));
    }
}
