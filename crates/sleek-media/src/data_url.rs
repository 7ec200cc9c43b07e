//! Data URLs
//!
//! RFC 2397 `data:` URL parsing and building.

use base64::Engine;

use crate::MediaError;

const DATA_URL_PREFIX: &str = "data:";
const DEFAULT_MEDIA_TYPE: &str = "text/plain";

/// Decoded `data:` URL
#[derive(Debug, Clone, PartialEq)]
pub struct DataUrl {
    /// Media type without parameters, lowercased
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    /// Parse a `data:` URL, accepting base64 or percent-encoded payloads
    pub fn parse(url: &str) -> Result<Self, MediaError> {
        let rest = url
            .strip_prefix(DATA_URL_PREFIX)
            .ok_or_else(|| MediaError::ParseFailure("URL does not start with 'data:'".into()))?;
        let (metadata, data) = rest
            .split_once(',')
            .ok_or_else(|| MediaError::ParseFailure("Missing comma in data URL".into()))?;

        let mut parts = metadata.split(';');
        let media_type = parts.next().unwrap_or("").trim();
        let is_base64 = parts.any(|p| p.trim().eq_ignore_ascii_case("base64"));

        let bytes = if is_base64 {
            decode_base64(data)?
        } else {
            percent_decode(data)?
        };

        Ok(Self {
            mime_type: if media_type.is_empty() {
                DEFAULT_MEDIA_TYPE.to_string()
            } else {
                media_type.to_ascii_lowercase()
            },
            bytes,
        })
    }

    /// Payload as UTF-8 text
    pub fn text(&self) -> Result<&str, MediaError> {
        std::str::from_utf8(&self.bytes)
            .map_err(|e| MediaError::ParseFailure(format!("data URL payload is not UTF-8: {e}")))
    }
}

/// Build a base64 `data:` URL
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("{DATA_URL_PREFIX}{mime_type};base64,{encoded}")
}

/// Base64 with ASCII whitespace tolerated
fn decode_base64(data: &str) -> Result<Vec<u8>, MediaError> {
    let cleaned: Vec<u8> = data.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(&cleaned)
        .map_err(|e| MediaError::ParseFailure(format!("Invalid base64: {e}")))
}

/// Percent-decode without treating '+' specially
fn percent_decode(input: &str) -> Result<Vec<u8>, MediaError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'%' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let hex = bytes
            .get(i + 1..i + 3)
            .filter(|pair| pair.iter().all(u8::is_ascii_hexdigit))
            .and_then(|pair| std::str::from_utf8(pair).ok())
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            .ok_or_else(|| MediaError::ParseFailure("Invalid percent-escape".into()))?;
        out.push(hex);
        i += 3;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_percent_encoded_svg() {
        let url = "data:image/svg+xml,%3Csvg%20width%3D%2210%22%2F%3E";
        let parsed = DataUrl::parse(url).unwrap();
        assert_eq!(parsed.mime_type, "image/svg+xml");
        assert_eq!(parsed.text().unwrap(), r#"<svg width="10"/>"#);
    }

    #[test]
    fn test_parse_base64_with_whitespace() {
        let parsed = DataUrl::parse("data:image/svg+xml;base64,PHN2\n Zy8+").unwrap();
        assert_eq!(parsed.text().unwrap(), "<svg/>");
    }

    #[test]
    fn test_parse_charset_param() {
        let parsed = DataUrl::parse("data:Image/SVG+XML;charset=utf-8,<svg/>").unwrap();
        assert_eq!(parsed.mime_type, "image/svg+xml");
        assert_eq!(parsed.bytes, b"<svg/>");
    }

    #[test]
    fn test_default_media_type() {
        assert_eq!(DataUrl::parse("data:,hi").unwrap().mime_type, "text/plain");
    }

    #[test]
    fn test_parse_errors() {
        assert!(DataUrl::parse("https://a.test/x.svg").is_err());
        assert!(DataUrl::parse("data:image/png;base64").is_err());
        assert!(DataUrl::parse("data:text/plain,%4").is_err());
        assert!(DataUrl::parse("data:text/plain,%zz").is_err());
        assert!(DataUrl::parse("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn test_encode() {
        assert_eq!(encode("image/png", b"abc"), "data:image/png;base64,YWJj");
        let back = DataUrl::parse(&encode("image/webp", &[0, 255, 7])).unwrap();
        assert_eq!(back.bytes, vec![0, 255, 7]);
    }
}
