use crate::encoder::TokenEncodeError;
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::Duration;

const DEFAULT_LIFETIME_SECONDS: i64 = 12 * 60 * 60;

/// A JSON object.
pub type JsonObject = serde_json::Map<String, Value>;

/// The standard claims to be emitted into a token.
///
/// Every field is optional. An empty string or a timestamp `<= 0` is treated exactly like `None`, so
/// `expiration: Some(0)` does not emit an `exp` claim.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TokenConfig {
    /// The token issuer.
    pub issuer: Option<String>,

    /// The token subject.
    pub subject: Option<String>,

    /// The token audience.
    pub audience: Option<String>,

    /// The timestamp, in seconds since the epoch, at which this token becomes invalid.
    pub expiration: Option<i32>,

    /// The first timestamp at which this token is valid. Carried but not enforced on parse.
    pub not_before: Option<i32>,

    /// The timestamp at which this token was issued.
    pub issued_at: Option<i32>,
}

impl TokenConfig {
    /// A config with no claims other than an expiration 12 hours from now.
    pub fn with_default_expiration() -> Self {
        Self::default().expires_in(Duration::from_secs(DEFAULT_LIFETIME_SECONDS as u64))
    }

    /// Set the issuer.
    pub fn issuer<T: Into<String>>(mut self, issuer: T) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Set the subject.
    pub fn subject<T: Into<String>>(mut self, subject: T) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the audience.
    pub fn audience<T: Into<String>>(mut self, audience: T) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Set the expiration timestamp.
    pub fn expiration(mut self, timestamp: i32) -> Self {
        self.expiration = Some(timestamp);
        self
    }

    /// Set the expiration based on an offset from the current time.
    pub fn expires_in(mut self, offset: Duration) -> Self {
        let offset = i64::try_from(offset.as_secs()).unwrap_or(i64::MAX);
        self.expiration = Some(saturating_seconds(Utc::now().timestamp().saturating_add(offset)));
        self
    }

    /// Set the timestamp when this token first becomes valid.
    pub fn not_before(mut self, timestamp: i32) -> Self {
        self.not_before = Some(timestamp);
        self
    }

    /// Set the issued at timestamp.
    pub fn issued_at(mut self, timestamp: i32) -> Self {
        self.issued_at = Some(timestamp);
        self
    }

    /// Set the issued at timestamp to the current time.
    pub fn issued_now(self) -> Self {
        self.issued_at(saturating_seconds(Utc::now().timestamp()))
    }
}

/// A token: standard claims plus an application defined payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Token {
    /// The standard claims.
    ///
    /// This is `None` for tokens produced by [`Token::parse`], which only recovers the payload. Use
    /// [`Token::parse_claims`] to get the standard claims back as well.
    pub config: Option<TokenConfig>,

    /// The application defined claims, serialized under the `payload` key.
    pub payload: JsonObject,
}

impl Token {
    /// Construct a token with an empty payload.
    pub fn new(config: TokenConfig) -> Self {
        Self { config: Some(config), payload: JsonObject::new() }
    }

    /// Set a field in the payload, replacing any previous value.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.payload.insert(key.into(), value.into());
    }

    /// Set a field in the payload to any serializable value.
    ///
    /// Fails if the value has no JSON representation, e.g. a map with non string keys.
    pub fn try_set<K, V>(&mut self, key: K, value: &V) -> Result<(), TokenEncodeError>
    where
        K: Into<String>,
        V: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value).map_err(|e| TokenEncodeError::Encoding("payload", e))?;
        self.payload.insert(key.into(), value);
        Ok(())
    }

    /// Get a field from the payload.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }
}

/// The serialized claim set.
///
/// Fields are declared in key order so the serialized JSON is canonical.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    #[serde(rename = "aud", default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,

    #[serde(
        rename = "exp",
        default,
        deserialize_with = "truncated_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiration: Option<i32>,

    #[serde(
        rename = "iat",
        default,
        deserialize_with = "truncated_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub issued_at: Option<i32>,

    #[serde(rename = "iss", default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    #[serde(
        rename = "nbf",
        default,
        deserialize_with = "truncated_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub not_before: Option<i32>,

    pub payload: JsonObject,

    #[serde(rename = "sub", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl Claims {
    /// Build the claim set for a config and payload, dropping any claim left at its unset value.
    pub fn from_parts(config: Option<&TokenConfig>, payload: &JsonObject) -> Self {
        let Some(config) = config else {
            return Self { payload: payload.clone(), ..Default::default() };
        };
        Self {
            audience: text_claim(&config.audience),
            expiration: time_claim(config.expiration),
            issued_at: time_claim(config.issued_at),
            issuer: text_claim(&config.issuer),
            not_before: time_claim(config.not_before),
            payload: payload.clone(),
            subject: text_claim(&config.subject),
        }
    }

    /// Turn this claim set into a token, keeping the standard claims as its config.
    pub fn into_token(self) -> Token {
        let Self { audience, expiration, issued_at, issuer, not_before, payload, subject } = self;
        let config = TokenConfig { issuer, subject, audience, expiration, not_before, issued_at };
        Token { config: Some(config), payload }
    }
}

/// The claims read by a payload only parse: the expiration and the payload. Anything else is ignored, whatever
/// its type.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PayloadClaims {
    #[serde(rename = "exp", default, deserialize_with = "truncated_seconds")]
    pub expiration: Option<i32>,

    pub payload: JsonObject,
}

/// A decoded claim set that may carry an expiration.
pub trait Expiring {
    fn expiration(&self) -> Option<i32>;
}

impl Expiring for Claims {
    fn expiration(&self) -> Option<i32> {
        self.expiration
    }
}

impl Expiring for PayloadClaims {
    fn expiration(&self) -> Option<i32> {
        self.expiration
    }
}

fn text_claim(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|value| !value.is_empty()).cloned()
}

fn time_claim(value: Option<i32>) -> Option<i32> {
    value.filter(|value| *value > 0)
}

pub(crate) fn saturating_seconds(timestamp: i64) -> i32 {
    timestamp.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

// Timestamps may come in as any JSON number; they're truncated into the i32 domain they were emitted from.
fn truncated_seconds<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds = Option::<f64>::deserialize(deserializer)?;
    Ok(seconds.map(|seconds| seconds as i32))
}
