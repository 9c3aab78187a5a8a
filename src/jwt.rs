//! JWT access/refresh tokens (HS256)

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i64,
    pub email: String,
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
    /// Makes two tokens issued within the same second distinct
    pub jti: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtManager {
    pub fn new(secret: &str, access_ttl_secs: u64, refresh_ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: Duration::seconds(access_ttl_secs as i64),
            refresh_ttl: Duration::seconds(refresh_ttl_secs as i64),
        }
    }

    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(&config.secret, config.access_ttl_secs, config.refresh_ttl_secs)
    }

    pub fn issue(&self, user_id: i64, email: &str, kind: TokenKind) -> AppResult<String> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn issue_pair(&self, user_id: i64, email: &str) -> AppResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue(user_id, email, TokenKind::Access)?,
            refresh_token: self.issue(user_id, email, TokenKind::Refresh)?,
        })
    }

    /// Signature, expiry and token kind
    pub fn verify(&self, token: &str, kind: TokenKind) -> AppResult<Claims> {
        let claims = decode::<Claims>(token, &self.decoding, &Validation::default())?.claims;
        if claims.kind != kind {
            return Err(AppError::InvalidToken);
        }
        Ok(claims)
    }
}

/// Stored form of a refresh token
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
