use crate::{codec::from_base64, envelope::Algorithm};
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

/// A token signer.
pub trait Signer {
    /// The algorithm this signer uses.
    fn algorithm(&self) -> Algorithm;

    /// Sign the given input, which is the `header.claims` prefix of a token.
    ///
    /// Returns the raw signature bytes.
    fn sign(&self, input: &str) -> Result<Vec<u8>, SigningError>;
}

/// An error that can occur when signing a token.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("signing failed: {0}")]
    SigningFailed(String),
}

/// A signer that uses an RSA private key with PKCS#1 v1.5 padding over a SHA-256 digest.
pub struct Rs256Signer<'a> {
    key: &'a RsaPrivateKey,
}

impl<'a> Rs256Signer<'a> {
    /// Create a new `Rs256Signer`.
    pub fn new(key: &'a RsaPrivateKey) -> Self {
        Self { key }
    }
}

impl Signer for Rs256Signer<'_> {
    fn algorithm(&self) -> Algorithm {
        Algorithm::RS256
    }

    fn sign(&self, input: &str) -> Result<Vec<u8>, SigningError> {
        let digest = Sha256::digest(input.as_bytes());
        // The RNG is only used for blinding; the signature itself is deterministic.
        self.key
            .sign_with_rng(&mut rand::thread_rng(), Pkcs1v15Sign::new::<Sha256>(), &digest)
            .map_err(|e| SigningError::SigningFailed(e.to_string()))
    }
}

/// A verifier for signatures created by [`Rs256Signer`].
pub struct Rs256Verifier<'a> {
    key: &'a RsaPublicKey,
}

impl<'a> Rs256Verifier<'a> {
    /// Create a new `Rs256Verifier`.
    pub fn new(key: &'a RsaPublicKey) -> Self {
        Self { key }
    }

    /// Verify a base64 encoded signature over the given input.
    pub fn verify(&self, input: &str, signature: &str) -> Result<(), InvalidSignature> {
        let signature = from_base64(signature).map_err(|_| InvalidSignature::Encoding)?;
        let digest = Sha256::digest(input.as_bytes());
        self.key
            .verify(Pkcs1v15Sign::new::<Sha256>(), &digest, &signature)
            .map_err(|_| InvalidSignature::Signature)
    }
}

/// An error during the verification of a token signature.
#[derive(Debug, thiserror::Error)]
pub enum InvalidSignature {
    #[error("invalid signature encoding")]
    Encoding,

    #[error("invalid signature")]
    Signature,
}
