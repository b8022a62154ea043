//! The text encoding of token segments.
//!
//! Segments are JSON encoded with the *standard* base64 alphabet, padding included. This means segments can
//! contain `+`, `/` and `=` but never `.`, which is what separates them. Switching to the URL safe alphabet
//! would break every token issued so far.

use base64::{prelude::BASE64_STANDARD, Engine};
use serde::{de::DeserializeOwned, Serialize};

/// Encode raw bytes into a segment.
pub fn to_base64<T: AsRef<[u8]>>(input: T) -> String {
    BASE64_STANDARD.encode(input)
}

/// Decode a segment into raw bytes.
pub fn from_base64(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64_STANDARD.decode(input)
}

/// Serialize a value as JSON and encode it into a segment.
pub fn encode_json<T: Serialize + ?Sized>(input: &T) -> Result<String, serde_json::Error> {
    let input = serde_json::to_vec(input)?;
    Ok(to_base64(input))
}

/// Decode a segment and parse its JSON contents.
pub fn decode_json<T: DeserializeOwned>(input: &str) -> Result<T, DecodeError> {
    let input = from_base64(input)?;
    let output = serde_json::from_slice(&input)?;
    Ok(output)
}

/// An error when decoding a segment.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::{json, Value};

    #[test]
    fn encode_header() {
        let encoded = encode_json(&json!({"typ": "jwt"})).expect("encode failed");
        assert_eq!(encoded, "eyJ0eXAiOiJqd3QifQ==");
    }

    #[test]
    fn standard_alphabet() {
        // 0xfb 0xff encodes to characters outside of the URL safe alphabet.
        assert_eq!(to_base64([0xfb, 0xff]), "+/8=");
        assert_eq!(from_base64("+/8=").expect("decode failed"), vec![0xfb, 0xff]);
    }

    #[test]
    fn decode_nested_values() {
        let value = json!({"a": [1, 2.5, null, true], "b": {"c": "d"}});
        let encoded = encode_json(&value).expect("encode failed");
        assert!(!encoded.contains('.'));
        let decoded: Value = decode_json(&encoded).expect("decode failed");
        assert_eq!(decoded, value);
    }

    #[rstest]
    #[case::url_safe_alphabet("-_8=")]
    #[case::bad_characters("&&&")]
    #[case::emoji("🚀")]
    fn decode_invalid_base64(#[case] input: &str) {
        let err = decode_json::<Value>(input).expect_err("decode succeeded");
        assert!(matches!(err, DecodeError::Base64(_)));
    }

    #[rstest]
    #[case::empty("")]
    #[case::truncated_json("eyJmb28iOiJiYXIi")]
    #[case::not_json("aGVsbG8=")]
    fn decode_invalid_json(#[case] input: &str) {
        let err = decode_json::<Value>(input).expect_err("decode succeeded");
        assert!(matches!(err, DecodeError::Json(_)));
    }
}
