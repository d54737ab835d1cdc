//! Key-segment codec for the flattening grammar.
//!
//! Composite keys join segments with `.` and address array elements with
//! `name[index]`, so a raw segment containing dots, brackets, or similar
//! punctuation would collide with the grammar. Such segments are escaped as
//! a fixed marker followed by base64 of the raw bytes; everything else
//! passes through untouched so typical keys stay human-readable.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::Error;

/// Marker prefix identifying an escaped segment. Not a legal prefix for
/// unmarked segments: a raw segment that happens to start with it is escaped
/// too, so decoding is never ambiguous.
pub const ENCODED_PREFIX: &str = "__encoded__";

lazy_static! {
    // Characters that collide with the flattening grammar or make keys
    // fragile in transit: dots, hyphens, whitespace, brackets, commas,
    // slashes, angle brackets, question marks, colons, asterisks.
    static ref UNSAFE_SEGMENT: Regex = Regex::new(r"[.*\-\[\],/\s<>?:]").unwrap();
}

/// Returns true if the segment must be escaped before joining into a
/// composite key.
pub fn needs_encoding(segment: &str) -> bool {
    if segment.is_empty() {
        return false;
    }
    UNSAFE_SEGMENT.is_match(segment) || segment.starts_with(ENCODED_PREFIX)
}

/// Escape a single key segment. Safe segments are returned unchanged.
pub fn encode(segment: &str) -> String {
    if needs_encoding(segment) {
        format!("{}{}", ENCODED_PREFIX, BASE64.encode(segment.as_bytes()))
    } else {
        segment.to_string()
    }
}

/// Reverse [`encode`]. Unmarked segments are returned unchanged.
pub fn decode(segment: &str) -> Result<String, Error> {
    let Some(payload) = segment.strip_prefix(ENCODED_PREFIX) else {
        return Ok(segment.to_string());
    };

    let bytes = BASE64
        .decode(payload)
        .map_err(|e| Error::Encoding(format!("invalid base64 in segment `{}`: {}", segment, e)))?;
    String::from_utf8(bytes)
        .map_err(|e| Error::Encoding(format!("segment `{}` is not valid UTF-8: {}", segment, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_segments_pass_through() {
        for segment in ["hello", "greeting_title", "special@key", "item2", ""] {
            assert_eq!(encode(segment), segment);
            assert_eq!(decode(segment).unwrap(), segment);
        }
    }

    #[test]
    fn test_unsafe_segments_are_marked() {
        for segment in [
            "allow-multiple",
            "create-poll.title",
            "with spaces",
            "*",
            "image/*, .jpg, .png",
            "a[0]",
            "what?",
        ] {
            let encoded = encode(segment);
            assert!(encoded.starts_with(ENCODED_PREFIX), "{}", segment);
            assert_eq!(decode(&encoded).unwrap(), segment);
        }
    }

    #[test]
    fn test_known_encoding() {
        // "allow-multiple" -> base64 of the raw bytes behind the marker
        assert_eq!(encode("allow-multiple"), "__encoded__YWxsb3ctbXVsdGlwbGU=");
        assert_eq!(
            decode("__encoded__YWxsb3ctbXVsdGlwbGU=").unwrap(),
            "allow-multiple"
        );
    }

    #[test]
    fn test_encoding_is_deterministic() {
        assert_eq!(encode("with.dot"), encode("with.dot"));
    }

    #[test]
    fn test_marker_prefixed_raw_segment_is_escaped() {
        // A raw key that starts with the marker must not survive unmarked,
        // otherwise decode would misread it.
        let tricky = "__encoded__not_actually";
        let encoded = encode(tricky);
        assert_ne!(encoded, tricky);
        assert_eq!(decode(&encoded).unwrap(), tricky);
    }

    #[test]
    fn test_no_collision_between_safe_and_encoded() {
        // The encoded form of an unsafe segment can never equal a safe
        // segment's pass-through form, because safe segments never start
        // with the marker after encode().
        let encoded = encode("a-b");
        assert!(needs_encoding(&encoded) || encoded.starts_with(ENCODED_PREFIX));
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        assert!(decode("__encoded__%%%").is_err());
    }

    #[test]
    fn test_unicode_roundtrip() {
        for segment in ["höhe-änderung", "日本語 キー", "emoji 🎉 key"] {
            assert_eq!(decode(&encode(segment)).unwrap(), segment);
        }
    }
}
