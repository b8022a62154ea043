use crate::{
    codec::{encode_json, to_base64},
    envelope::{signing_input, Algorithm, Header, RawToken},
    signer::{Rs256Signer, Signer, SigningError},
    token::{Claims, Token},
};
use rsa::RsaPrivateKey;

impl Token {
    /// Encode this token, signing it with RS256 if a key is provided.
    ///
    /// Without a key the token has `alg: none` and an empty signature segment.
    pub fn encode(&self, key: Option<&RsaPrivateKey>) -> Result<String, TokenEncodeError> {
        match key {
            Some(key) => self.encode_with(Some(&Rs256Signer::new(key))),
            None => self.encode_with(None::<&Rs256Signer>),
        }
    }

    /// Encode this token, signing it with the given signer if any.
    pub fn encode_with<S: Signer>(&self, signer: Option<&S>) -> Result<String, TokenEncodeError> {
        let alg = signer.map(|signer| signer.algorithm()).unwrap_or(Algorithm::None);
        let header = Header::new(alg);
        let claims = Claims::from_parts(self.config.as_ref(), &self.payload);

        let header = encode_json(&header).map_err(|e| TokenEncodeError::Encoding("header", e))?;
        let claims = encode_json(&claims).map_err(|e| TokenEncodeError::Encoding("claims", e))?;
        let signature = match signer {
            Some(signer) => to_base64(signer.sign(&signing_input(&header, &claims))?),
            None => String::new(),
        };
        tracing::debug!(%alg, "encoded token");
        tracing::trace!(header = header.len(), claims = claims.len(), signature = signature.len(), "segment sizes");

        let raw = RawToken { header: &header, claims: &claims, signature: &signature };
        Ok(raw.to_wire())
    }
}

/// An error when encoding a token.
#[derive(Debug, thiserror::Error)]
pub enum TokenEncodeError {
    #[error("encoding {0}: {1}")]
    Encoding(&'static str, serde_json::Error),

    #[error("signing failed: {0}")]
    Signing(#[from] SigningError),
}
