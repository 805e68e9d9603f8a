//! Parsing and decoding of image data URIs.

use std::sync::OnceLock;

use base64::Engine;
use regex::Regex;

use super::PhotoError;

/// `data:image/<subtype>;base64,<payload>`, anchored at the start.
const DATA_URI_PATTERN: &str = r"(?s)^data:image/(\w+);base64,(.*)$";

fn data_uri_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(DATA_URI_PATTERN).expect("Invalid data URI pattern"))
}

/// A recognized image data URI, borrowed from the observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUri<'a> {
    subtype: &'a str,
    payload: &'a str,
}

impl<'a> DataUri<'a> {
    /// Parse a photo string.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoError::Unrecognized`] if `raw` does not start with
    /// `data:image/<subtype>;base64,`.
    pub fn parse(raw: &'a str) -> Result<Self, PhotoError> {
        let captures = data_uri_regex()
            .captures(raw)
            .ok_or(PhotoError::Unrecognized)?;
        match (captures.get(1), captures.get(2)) {
            (Some(subtype), Some(payload)) => Ok(Self {
                subtype: subtype.as_str(),
                payload: payload.as_str(),
            }),
            _ => Err(PhotoError::Unrecognized),
        }
    }

    /// The image subtype as written in the URI (`png`, `jpeg`, ...).
    #[must_use]
    pub fn subtype(&self) -> &'a str {
        self.subtype
    }

    /// File extension for the image; `jpeg` becomes `jpg`.
    #[must_use]
    pub fn extension(&self) -> &'a str {
        if self.subtype == "jpeg" {
            "jpg"
        } else {
            self.subtype
        }
    }

    /// The base64 payload, undecoded.
    #[must_use]
    pub fn payload(&self) -> &'a str {
        self.payload
    }

    /// Decode the payload.
    ///
    /// Line breaks and other ASCII whitespace are skipped, so wrapped
    /// payloads decode the same as single-line ones.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoError::Decode`] if the payload is not valid padded
    /// base64.
    pub fn decode(&self) -> Result<Vec<u8>, PhotoError> {
        let compact: Vec<u8> = self
            .payload
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        Ok(base64::engine::general_purpose::STANDARD.decode(compact)?)
    }
}

/// Name of the file holding photo `index` of observation `observation_id`.
///
/// Characters that would split or escape a path component are replaced with
/// `_`.
#[must_use]
pub fn photo_file_name(observation_id: &str, index: usize, extension: &str) -> String {
    let id: String = observation_id
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            other => other,
        })
        .collect();
    format!("obs_{id}_{index}.{extension}")
}

/// The first `max_chars` characters of a raw photo string, on one line.
#[must_use]
pub fn preview(raw: &str, max_chars: usize) -> String {
    raw.chars()
        .take(max_chars)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_png() {
        let uri = DataUri::parse("data:image/png;base64,AAAA").unwrap();
        assert_eq!(uri.subtype(), "png");
        assert_eq!(uri.extension(), "png");
        assert_eq!(uri.payload(), "AAAA");
    }

    #[test]
    fn test_jpeg_extension_is_normalized() {
        let uri = DataUri::parse("data:image/jpeg;base64,AAAA").unwrap();
        assert_eq!(uri.subtype(), "jpeg");
        assert_eq!(uri.extension(), "jpg");
    }

    #[test]
    fn test_other_subtypes_kept_as_is() {
        assert_eq!(
            DataUri::parse("data:image/webp;base64,AAAA")
                .unwrap()
                .extension(),
            "webp"
        );
        assert_eq!(
            DataUri::parse("data:image/JPEG;base64,AAAA")
                .unwrap()
                .extension(),
            "JPEG"
        );
    }

    #[test]
    fn test_parse_rejects_unrecognized() {
        for raw in [
            "",
            "https://example.com/photo.png",
            "data:text/plain;base64,AAAA",
            "data:image/png,AAAA",
            "data:image/svg+xml;base64,AAAA",
            " data:image/png;base64,AAAA",
        ] {
            let err = DataUri::parse(raw).unwrap_err();
            assert!(err.is_unrecognized(), "should reject {raw:?}");
        }
    }

    #[test]
    fn test_empty_payload_is_recognized() {
        let uri = DataUri::parse("data:image/png;base64,").unwrap();
        assert_eq!(uri.payload(), "");
        assert!(uri.decode().unwrap().is_empty());
    }

    #[test]
    fn test_decode() {
        let uri = DataUri::parse("data:image/png;base64,AAAA").unwrap();
        assert_eq!(uri.decode().unwrap(), vec![0, 0, 0]);

        let uri = DataUri::parse("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(uri.decode().unwrap(), b"hello");
    }

    #[test]
    fn test_decode_skips_line_breaks() {
        let uri = DataUri::parse("data:image/png;base64,aGVs\nbG8=\r\n").unwrap();
        assert_eq!(uri.decode().unwrap(), b"hello");
    }

    #[test]
    fn test_decode_invalid_payload() {
        let uri = DataUri::parse("data:image/png;base64,!!!not-base64").unwrap();
        assert!(matches!(uri.decode(), Err(PhotoError::Decode(_))));

        let uri = DataUri::parse("data:image/png;base64,aGVsbG8").unwrap();
        assert!(matches!(uri.decode(), Err(PhotoError::Decode(_))));
    }

    #[test]
    fn test_photo_file_name() {
        assert_eq!(photo_file_name("o1", 0, "png"), "obs_o1_0.png");
        assert_eq!(
            photo_file_name("3f2a-77", 12, "jpg"),
            "obs_3f2a-77_12.jpg"
        );
    }

    #[test]
    fn test_photo_file_name_stays_in_one_component() {
        assert_eq!(photo_file_name("../x", 0, "png"), "obs_.._x_0.png");
        assert_eq!(photo_file_name("a\\b:c", 1, "png"), "obs_a_b_c_1.png");
    }

    #[test]
    fn test_preview_truncates_by_chars() {
        let raw = "é".repeat(60);
        let shown = preview(&raw, 50);
        assert_eq!(shown.chars().count(), 50);

        assert_eq!(preview("short", 50), "short");
    }

    #[test]
    fn test_preview_is_single_line() {
        assert_eq!(preview("ab\ncd\r\nef", 50), "ab cd  ef");
    }
}
