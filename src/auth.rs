//! Credential helpers for filters and handlers.
//!
//! Thin wrappers: HTTP Basic decoding and HS256 tokens carrying a subject and
//! an expiry. Every token verification failure surfaces as
//! [`Error::Unauthorized`] so it reaches the client as a plain `401`.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::Error;
use crate::request::Request;

/// Username and password from an `Authorization: Basic …` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Decodes HTTP Basic credentials. A missing or malformed header is a `400`.
pub fn basic_credentials(req: &Request) -> Result<Credentials, Error> {
    let header = req.header("authorization").ok_or_else(|| Error::bad_request("No authorization header"))?;
    let malformed = || Error::bad_request("Malformed authorization header");

    let encoded = header.strip_prefix("Basic ").ok_or_else(malformed)?;
    let decoded = STANDARD.decode(encoded.trim()).map_err(|_| malformed())?;
    let decoded = String::from_utf8(decoded).map_err(|_| malformed())?;
    let (username, password) = decoded.split_once(':').ok_or_else(malformed)?;

    Ok(Credentials { username: username.to_owned(), password: password.to_owned() })
}

/// The token from an `Authorization: Bearer …` header. Absence is a `401`.
pub fn bearer_token(req: &Request) -> Result<&str, Error> {
    req.header("authorization")
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::unauthorized("No bearer token"))
}

/// Claims carried by tokens from [`issue_token`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Expiry, seconds since the Unix epoch.
    pub exp: u64,
}

/// Signs an HS256 token for `subject`, valid for `ttl_minutes`.
pub fn issue_token(secret: &str, ttl_minutes: i64, subject: &str) -> Result<String, Error> {
    let exp = now_secs().saturating_add_signed(ttl_minutes.saturating_mul(60));
    let claims = Claims { sub: subject.to_owned(), exp };

    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(Error::internal)
}

/// Verifies signature and expiry. No leeway is granted on `exp`.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            JwtErrorKind::ExpiredSignature => Error::unauthorized("Error verifying JWT token: Expired"),
            JwtErrorKind::InvalidSignature => Error::unauthorized("Error verifying JWT token: Invalid signature"),
            _ => Error::unauthorized(format!("Error verifying JWT token: {e}")),
        })
}

/// A random 64-character hex secret suitable for [`issue_token`].
pub fn generate_secret() -> String {
    Sha256::digest(Uuid::new_v4().as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn now_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default()
}
