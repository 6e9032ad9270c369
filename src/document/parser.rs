use super::error::DocumentError;
use roxmltree::{Document, ParsingOptions};

pub const DEFAULT_MAX_INPUT_BYTES: usize = 10_485_760;

/// Limits applied while turning input text into a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentOptions {
    pub allow_dtd: bool,
    pub nodes_limit: u32,
    pub max_input_bytes: usize,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            allow_dtd: false,
            nodes_limit: u32::MAX,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

impl DocumentOptions {
    fn parsing_options(&self) -> ParsingOptions {
        let mut options = ParsingOptions::default();
        options.allow_dtd = self.allow_dtd;
        options.nodes_limit = self.nodes_limit;
        options
    }
}

pub fn decode(bytes: Vec<u8>) -> Result<String, DocumentError> {
    Ok(String::from_utf8(bytes)?)
}

pub fn parse_document<'input>(
    text: &'input str,
    options: &DocumentOptions,
) -> Result<Document<'input>, DocumentError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    Ok(Document::parse_with_options(text, options.parsing_options())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed() {
        let document =
            parse_document("<pets><item id=\"1\"/></pets>", &DocumentOptions::default()).unwrap();
        assert_eq!(document.root_element().tag_name().name(), "pets");
    }

    #[test]
    fn test_parse_strips_byte_order_mark() {
        let document = parse_document("\u{feff}<a/>", &DocumentOptions::default()).unwrap();
        assert_eq!(document.root_element().tag_name().name(), "a");
    }

    #[test]
    fn test_parse_rejects_plain_text() {
        let err = parse_document("invalid_xml", &DocumentOptions::default()).unwrap_err();
        assert!(matches!(err, DocumentError::Parse(_)));
    }

    #[test]
    fn test_parse_rejects_dtd_by_default() {
        let xml = "<?xml version=\"1.0\"?><!DOCTYPE a [<!ENTITY e \"x\">]><a>&e;</a>";

        let err = parse_document(xml, &DocumentOptions::default()).unwrap_err();
        assert!(matches!(err, DocumentError::Parse(_)));

        let options = DocumentOptions {
            allow_dtd: true,
            ..Default::default()
        };
        let document = parse_document(xml, &options).unwrap();
        assert_eq!(document.root_element().text(), Some("x"));
    }

    #[test]
    fn test_parse_enforces_nodes_limit() {
        let options = DocumentOptions {
            nodes_limit: 2,
            ..Default::default()
        };
        let err = parse_document("<a><b/><c/><d/></a>", &options).unwrap_err();
        assert!(matches!(err, DocumentError::Parse(_)));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let err = decode(vec![0x3c, 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, DocumentError::Encoding(_)));
    }
}
