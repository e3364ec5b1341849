use chardetng::EncodingDetector;
use encoding_rs::Encoding;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBody {
    pub text: String,
    pub encoding_label: String,
    /// Set when malformed sequences were replaced with U+FFFD.
    pub had_errors: bool,
}

/// Decode raw bytes into UTF-8 using: BOM -> Content-Type charset -> chardetng fallback.
///
/// Never fails; undecodable sequences become replacement characters so a
/// sloppy page still yields words and links.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> DecodedBody {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(encoding) = content_type
        .and_then(extract_charset)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return decode_with(bytes, encoding);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(bytes, detector.guess(None, true))
}

fn extract_charset(content_type: &str) -> Option<&str> {
    content_type.split(';').find_map(|part| {
        let (name, value) = part.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\''].as_ref()))
    })
}

fn decode_with(bytes: &[u8], encoding: &'static Encoding) -> DecodedBody {
    let (text, used, had_errors) = encoding.decode(bytes);
    DecodedBody {
        text: text.into_owned(),
        encoding_label: used.name().to_string(),
        had_errors,
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_body, extract_charset};

    #[test]
    fn charset_parameter_is_found_in_any_case() {
        assert_eq!(extract_charset("text/html; Charset=\"ISO-8859-1\""), Some("ISO-8859-1"));
        assert_eq!(extract_charset("text/html"), None);
    }

    #[test]
    fn header_charset_is_honoured() {
        let decoded = decode_body(&[0x63, 0x61, 0x66, 0xE9], Some("text/html; charset=iso-8859-1"));
        assert_eq!(decoded.text, "café");
        assert!(!decoded.had_errors);
    }

    #[test]
    fn bom_wins_over_header() {
        let decoded = decode_body(b"\xEF\xBB\xBFhi", Some("text/html; charset=iso-8859-1"));
        assert_eq!(decoded.text, "hi");
        assert_eq!(decoded.encoding_label, "UTF-8");
    }

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        let decoded = decode_body(b"ok \xFF ok", Some("text/html; charset=utf-8"));
        assert_eq!(decoded.text, "ok \u{FFFD} ok");
        assert!(decoded.had_errors);
    }
}
