// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance and validation.
//!
//! Tokens are stateless JWTs signed with a server-held symmetric secret
//! (HMAC-SHA family). There is no server-side token storage and no
//! revocation list: an issued token stays valid until its encoded expiry,
//! regardless of later account changes. Per-request user lookup in the
//! extractor is what rejects tokens for deleted accounts.
//!
//! Expiry is compared against wall-clock now with zero leeway.

use std::env;

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::config::{
    ConfigError, DEFAULT_TOKEN_TTL_MINUTES, SECRET_KEY_ENV, TOKEN_ALGORITHM_ENV,
    TOKEN_TTL_MINUTES_ENV,
};

use super::error::AuthError;

/// JWT claims carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the username the token was issued for
    pub sub: String,
    /// Expiration timestamp (Unix seconds)
    pub exp: i64,
    /// Issued-at timestamp (Unix seconds)
    pub iat: i64,
}

/// Issues and validates signed access tokens.
///
/// Constructed once at startup from the environment and shared read-only
/// through `AppState`; the signing secret is never re-read per request.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    header: Header,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Build a token service with an explicit secret, algorithm, and TTL.
    pub fn new(secret: &[u8], algorithm: Algorithm, ttl_minutes: i64) -> Self {
        let mut validation = Validation::new(algorithm);
        // No clock-skew grace window: expiry is compared against now.
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            header: Header::new(algorithm),
            validation,
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    /// Build a token service from the environment.
    ///
    /// A missing `SECRET_KEY` is a fatal boot-time condition; callers are
    /// expected to abort startup on error rather than continue without a
    /// verifiable signing key.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = env::var(SECRET_KEY_ENV).map_err(|_| ConfigError::MissingSecret)?;

        let algorithm = match env::var(TOKEN_ALGORITHM_ENV) {
            Ok(name) => parse_hmac_algorithm(&name)?,
            Err(_) => Algorithm::HS256,
        };

        let ttl_minutes = match env::var(TOKEN_TTL_MINUTES_ENV) {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|minutes| *minutes > 0)
                .ok_or(ConfigError::InvalidTokenTtl(raw))?,
            Err(_) => DEFAULT_TOKEN_TTL_MINUTES,
        };

        Ok(Self::new(secret.as_bytes(), algorithm, ttl_minutes))
    }

    /// The configured token lifetime in minutes.
    pub fn ttl_minutes(&self) -> i64 {
        self.ttl.num_minutes()
    }

    /// Issue a signed token for the given subject.
    pub fn issue(&self, subject: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(&self.header, &claims, &self.encoding)
            .map_err(|e| AuthError::InternalError(format!("token encoding failed: {e}")))
    }

    /// Validate a token and return its subject.
    ///
    /// Returns an `AuthError` value (never panics) on malformed structure,
    /// signature mismatch, missing subject claim, or expiry in the past.
    pub fn validate(&self, token: &str) -> Result<String, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            }
        })?;

        Ok(data.claims.sub)
    }
}

/// Parse a configured algorithm name, restricted to the symmetric HMAC
/// family this service signs with.
fn parse_hmac_algorithm(name: &str) -> Result<Algorithm, ConfigError> {
    match name.to_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(ConfigError::UnsupportedAlgorithm(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-key";

    fn service() -> TokenService {
        TokenService::new(SECRET, Algorithm::HS256, 30)
    }

    #[test]
    fn issue_then_validate_returns_subject() {
        let tokens = service();
        let token = tokens.issue("alice").expect("token issues");
        assert_eq!(tokens.validate(&token).expect("token validates"), "alice");
    }

    #[test]
    fn expired_token_is_invalid() {
        // Negative TTL puts the expiry in the past at issuance time.
        let tokens = TokenService::new(SECRET, Algorithm::HS256, -5);
        let token = tokens.issue("alice").expect("token issues");
        assert_eq!(tokens.validate(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn tampered_token_is_invalid() {
        let tokens = service();
        let token = tokens.issue("alice").expect("token issues");

        // Flip a character in the signature segment.
        let mut bytes = token.into_bytes();
        let last = bytes.len() - 1;
        bytes[last] = if bytes[last] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).expect("still utf8");

        let result = tokens.validate(&tampered);
        assert!(
            matches!(
                result,
                Err(AuthError::InvalidSignature) | Err(AuthError::MalformedToken)
            ),
            "unexpected result: {result:?}"
        );
    }

    #[test]
    fn payload_tampering_invalidates_signature() {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

        let tokens = service();
        let token = tokens.issue("alice").expect("token issues");

        // Re-encode the payload with a different subject, keeping the
        // original signature.
        let mut segments: Vec<String> = token.split('.').map(str::to_string).collect();
        assert_eq!(segments.len(), 3);
        let payload = URL_SAFE_NO_PAD
            .decode(segments[1].as_bytes())
            .expect("payload decodes");
        let forged_payload = String::from_utf8(payload)
            .expect("payload is utf8")
            .replace("alice", "mallory");
        segments[1] = URL_SAFE_NO_PAD.encode(forged_payload.as_bytes());
        let forged = segments.join(".");

        assert_eq!(
            tokens.validate(&forged),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn token_signed_with_different_secret_is_invalid() {
        let issuer = TokenService::new(b"other-secret", Algorithm::HS256, 30);
        let token = issuer.issue("alice").expect("token issues");
        assert_eq!(service().validate(&token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        let tokens = service();
        assert_eq!(
            tokens.validate("not-a-jwt"),
            Err(AuthError::MalformedToken)
        );
        assert_eq!(tokens.validate(""), Err(AuthError::MalformedToken));
    }

    #[test]
    fn token_without_subject_is_invalid() {
        #[derive(Serialize)]
        struct NoSubject {
            exp: i64,
            iat: i64,
        }

        let now = Utc::now().timestamp();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &NoSubject {
                exp: now + 600,
                iat: now,
            },
            &EncodingKey::from_secret(SECRET),
        )
        .expect("token encodes");

        assert_eq!(service().validate(&token), Err(AuthError::MalformedToken));
    }

    #[test]
    fn parse_algorithm_accepts_hmac_family_only() {
        assert!(matches!(parse_hmac_algorithm("HS256"), Ok(Algorithm::HS256)));
        assert!(matches!(parse_hmac_algorithm("hs512"), Ok(Algorithm::HS512)));
        assert!(parse_hmac_algorithm("RS256").is_err());
    }
}
