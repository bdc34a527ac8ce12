// ABOUTME: Decodes raw HTML bytes into a UTF-8 string.
// ABOUTME: Uses a BOM, a Content-Type charset, an in-document meta charset, then chardetng detection.

use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use tracing::debug;

// How far into the document to look for <meta charset>
const META_SNIFF_LEN: usize = 1024;

static META_CHARSET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([a-zA-Z0-9_\-:.]+)"#).unwrap());

/// Decode HTML bytes, honouring an optional Content-Type style hint.
///
/// Never fails: undecodable sequences become U+FFFD.
pub fn decode_html(bytes: &[u8], content_type_hint: Option<&str>) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        debug!(encoding = encoding.name(), "decoding by byte order mark");
        let (decoded, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return decoded.into_owned();
    }

    let declared = content_type_hint
        .and_then(extract_charset)
        .or_else(|| meta_charset(bytes))
        .and_then(|label| Encoding::for_label(label.as_bytes()));

    let encoding = declared.unwrap_or_else(|| {
        let mut detector = chardetng::EncodingDetector::new();
        detector.feed(bytes, true);
        detector.guess(None, true)
    });

    debug!(encoding = encoding.name(), declared = declared.is_some(), "decoding html");
    let (decoded, _, _) = encoding.decode(bytes);
    decoded.into_owned()
}

/// Extract the charset parameter from a Content-Type value.
pub fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    lower.split(';').find_map(|part| {
        part.trim()
            .strip_prefix("charset=")
            .map(|c| c.trim_matches('"').trim_matches('\'').to_string())
            .filter(|c| !c.is_empty())
    })
}

fn meta_charset(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(META_SNIFF_LEN)];
    META_CHARSET_RE
        .captures(head)
        .and_then(|caps| caps.get(1))
        .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
}
