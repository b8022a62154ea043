use crate::{
    codec::{decode_json, DecodeError},
    envelope::{MalformedToken, RawToken},
    signer::{InvalidSignature, Rs256Verifier},
    token::{Claims, Expiring, JsonObject, PayloadClaims, Token},
};
use chrono::{DateTime, Utc};
use rsa::RsaPublicKey;
use serde::de::DeserializeOwned;
use serde_json::Value;

impl Token {
    /// Parse a token, verifying its signature if a key is provided.
    ///
    /// Only the expiration and the payload are looked at: the returned token has no config, and other claims
    /// are ignored whatever their type. Use [`Token::parse_claims`] to also get the standard claims back.
    ///
    /// Without a key the signature segment is ignored, so the resulting token is unauthenticated.
    pub fn parse(s: &str, key: Option<&RsaPublicKey>) -> Result<Self, TokenParseError> {
        TokenParser::default().parse(s, key)
    }

    /// Parse a token, recovering both the standard claims and the payload.
    ///
    /// Unlike [`Token::parse`], standard claims of the wrong JSON type are rejected.
    pub fn parse_claims(s: &str, key: Option<&RsaPublicKey>) -> Result<Self, TokenParseError> {
        TokenParser::default().parse_claims(s, key)
    }
}

/// A token parser.
#[derive(Clone, Debug, Default)]
pub struct TokenParser {
    /// The maximum raw token size, in bytes. Tokens of any size are accepted if unset.
    pub max_raw_token_size: Option<usize>,

    /// The timestamp to use for the expiration check. The current time is used if unset.
    pub current_time: Option<DateTime<Utc>>,
}

impl TokenParser {
    /// Parse a token keeping only its payload.
    pub fn parse(&self, s: &str, key: Option<&RsaPublicKey>) -> Result<Token, TokenParseError> {
        let claims: PayloadClaims = self.decode_as(s, key)?;
        Ok(Token { config: None, payload: claims.payload })
    }

    /// Parse a token keeping its standard claims and payload.
    pub fn parse_claims(&self, s: &str, key: Option<&RsaPublicKey>) -> Result<Token, TokenParseError> {
        let claims = self.decode(s, key)?;
        Ok(claims.into_token())
    }

    /// Parse a token into its claim set.
    pub fn decode(&self, s: &str, key: Option<&RsaPublicKey>) -> Result<Claims, TokenParseError> {
        self.decode_as(s, key)
    }

    fn decode_as<T>(&self, s: &str, key: Option<&RsaPublicKey>) -> Result<T, TokenParseError>
    where
        T: DeserializeOwned + Expiring,
    {
        match self.try_decode(s, key) {
            Ok(claims) => {
                tracing::debug!(verified = key.is_some(), "parsed token");
                Ok(claims)
            }
            Err(err) => {
                tracing::debug!(%err, kind = ?err.kind(), "rejected token");
                Err(err)
            }
        }
    }

    fn try_decode<T>(&self, s: &str, key: Option<&RsaPublicKey>) -> Result<T, TokenParseError>
    where
        T: DeserializeOwned + Expiring,
    {
        if let Some(max_size) = self.max_raw_token_size {
            if s.len() > max_size {
                return Err(TokenParseError::TooLarge(max_size));
            }
        }
        let raw = RawToken::from_wire(s)?;
        if let Some(key) = key {
            Rs256Verifier::new(key).verify(&raw.signing_input(), raw.signature)?;
        }

        // Both segments must be JSON objects; the header's contents aren't used past that.
        let _header: JsonObject = decode_json(raw.header).map_err(|e| TokenParseError::InvalidPayload("header", e))?;
        let claims: JsonObject = decode_json(raw.claims).map_err(|e| TokenParseError::InvalidPayload("claims", e))?;
        let claims: T = serde_json::from_value(Value::Object(claims))
            .map_err(|e| TokenParseError::InvalidPayload("claims", DecodeError::Json(e)))?;

        if let Some(expiration) = claims.expiration() {
            let now = self.current_time.unwrap_or_else(Utc::now);
            if i64::from(expiration) <= now.timestamp() {
                return Err(TokenParseError::Expired);
            }
        }
        Ok(claims)
    }
}

/// An error when parsing a token.
#[derive(Debug, thiserror::Error)]
pub enum TokenParseError {
    #[error("token is larger than max allowed: {0} bytes")]
    TooLarge(usize),

    #[error("malformed token: {0}")]
    Malformed(#[from] MalformedToken),

    #[error("token signature verification failed: {0}")]
    InvalidSignature(#[from] InvalidSignature),

    #[error("invalid {0}: {1}")]
    InvalidPayload(&'static str, DecodeError),

    #[error("token has expired")]
    Expired,
}

impl TokenParseError {
    /// The reason this token was rejected.
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            Self::TooLarge(_) | Self::Malformed(_) | Self::InvalidPayload(_, _) => ParseErrorKind::Invalid,
            Self::InvalidSignature(_) => ParseErrorKind::Unauthenticated,
            Self::Expired => ParseErrorKind::Expired,
        }
    }
}

/// A coarse reason for rejecting a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The token is not well formed.
    Invalid,

    /// The token's signature doesn't match the key.
    Unauthenticated,

    /// The token's expiration has elapsed.
    Expired,
}
