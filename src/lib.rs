pub mod codec;
pub mod encoder;
pub mod envelope;
pub mod parser;
pub mod signer;
pub mod token;

#[cfg(test)]
mod fixtures;

pub use encoder::TokenEncodeError;
pub use parser::{ParseErrorKind, TokenParseError, TokenParser};
pub use rsa;
pub use token::{JsonObject, Token, TokenConfig};
