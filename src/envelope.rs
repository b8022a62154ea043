use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{fmt, str::FromStr};

const SEPARATOR: char = '.';

/// The header written by the encoder. Parsing accepts any JSON object as a header.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Header {
    pub typ: TokenType,
    pub alg: Algorithm,
}

impl Header {
    /// Construct a header for the given algorithm.
    pub fn new(alg: Algorithm) -> Self {
        Self { typ: TokenType::Jwt, alg }
    }
}

/// The token type marker.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    #[serde(rename = "jwt")]
    Jwt,
}

/// The algorithm used to sign a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, SerializeDisplay, DeserializeFromStr)]
pub enum Algorithm {
    /// The token is not signed.
    None,

    /// RSASSA-PKCS1-v1_5 using SHA-256.
    RS256,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::None => "none",
            Self::RS256 => "RS256",
        };
        write!(f, "{text}")
    }
}

impl FromStr for Algorithm {
    type Err = UnsupportedAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "RS256" => Ok(Self::RS256),
            _ => Err(UnsupportedAlgorithm(s.to_string())),
        }
    }
}

/// An algorithm that isn't supported.
#[derive(Debug, thiserror::Error)]
#[error("unsupported algorithm: {0}")]
pub struct UnsupportedAlgorithm(pub String);

/// The raw segments of a token, as they appear on the wire.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawToken<'a> {
    pub header: &'a str,
    pub claims: &'a str,
    pub signature: &'a str,
}

impl<'a> RawToken<'a> {
    /// Split a token into its segments.
    ///
    /// The input must contain exactly two separators. Segments themselves are not looked at.
    pub fn from_wire(s: &'a str) -> Result<Self, MalformedToken> {
        let separators = s.matches(SEPARATOR).count();
        if separators != 2 {
            return Err(MalformedToken(separators));
        }
        let mut segments = s.splitn(3, SEPARATOR);
        match (segments.next(), segments.next(), segments.next()) {
            (Some(header), Some(claims), Some(signature)) => Ok(Self { header, claims, signature }),
            _ => Err(MalformedToken(separators)),
        }
    }

    /// The input covered by the signature.
    pub fn signing_input(&self) -> String {
        signing_input(self.header, self.claims)
    }

    /// Join the segments back into a token.
    pub fn to_wire(&self) -> String {
        let Self { header, claims, signature } = self;
        format!("{header}{SEPARATOR}{claims}{SEPARATOR}{signature}")
    }
}

/// Build the signing input for a pair of encoded header and claims segments.
pub fn signing_input(header: &str, claims: &str) -> String {
    format!("{header}{SEPARATOR}{claims}")
}

/// A token that does not have exactly three segments.
#[derive(Debug, thiserror::Error)]
#[error("expected 2 separators, found {0}")]
pub struct MalformedToken(pub usize);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::none(Algorithm::None, json!({"typ": "jwt", "alg": "none"}))]
    #[case::rs256(Algorithm::RS256, json!({"typ": "jwt", "alg": "RS256"}))]
    fn header_serde(#[case] alg: Algorithm, #[case] expected: serde_json::Value) {
        let header = Header::new(alg);
        assert_eq!(serde_json::to_value(&header).expect("serialize failed"), expected);

        let deserialized: Header = serde_json::from_value(expected).expect("deserialize failed");
        assert_eq!(deserialized, header);
    }

    #[test]
    fn header_field_order() {
        let header = serde_json::to_string(&Header::new(Algorithm::None)).expect("serialize failed");
        assert_eq!(header, r#"{"typ":"jwt","alg":"none"}"#);
    }

    #[rstest]
    #[case::hs256(json!({"typ": "jwt", "alg": "HS256"}))]
    #[case::lowercase(json!({"typ": "jwt", "alg": "rs256"}))]
    #[case::uppercase_type(json!({"typ": "JWT", "alg": "none"}))]
    #[case::missing_alg(json!({"typ": "jwt"}))]
    fn invalid_headers(#[case] input: serde_json::Value) {
        serde_json::from_value::<Header>(input).expect_err("deserialize succeeded");
    }

    #[test]
    fn split_segments() {
        let raw = RawToken::from_wire("aaa.bbb.ccc").expect("split failed");
        assert_eq!(raw, RawToken { header: "aaa", claims: "bbb", signature: "ccc" });
        assert_eq!(raw.signing_input(), "aaa.bbb");
        assert_eq!(raw.to_wire(), "aaa.bbb.ccc");
    }

    #[test]
    fn split_unsigned() {
        let raw = RawToken::from_wire("aaa.bbb.").expect("split failed");
        assert_eq!(raw.signature, "");
    }

    #[rstest]
    #[case::empty("", 0)]
    #[case::no_separators("abc", 0)]
    #[case::one_separator("a.b", 1)]
    #[case::three_separators("a.b.c.d", 3)]
    #[case::only_separators("...", 3)]
    fn malformed(#[case] input: &str, #[case] separators: usize) {
        let err = RawToken::from_wire(input).expect_err("split succeeded");
        assert_eq!(err.0, separators);
    }
}
