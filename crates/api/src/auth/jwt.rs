//! Console tokens.
//!
//! Access tokens are HS256 JWTs carrying the user's role and tenant.
//! Refresh tokens are opaque hex strings; sessions store only their SHA-256.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::Error as JwtError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use msgdesk_core::types::DbId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::env_or;

/// `iss` claim stamped on and required of every access token.
pub const TOKEN_ISSUER: &str = "msgdesk";

/// Clock skew tolerated when checking `exp`.
const LEEWAY_SECS: u64 = 30;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id.
    pub sub: DbId,
    pub role: String,
    /// Tenant scope. `None` for platform operators.
    pub client_id: Option<DbId>,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// Read `JWT_SECRET` (required), `JWT_ACCESS_EXPIRY_MINS` (default 60)
    /// and `JWT_REFRESH_EXPIRY_DAYS` (default 7).
    ///
    /// # Panics
    ///
    /// Panics when the secret is missing or empty, or a lifetime is not a
    /// positive integer.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        assert!(!secret.trim().is_empty(), "JWT_SECRET must be set");

        let config = Self {
            secret,
            access_token_expiry_mins: env_or("JWT_ACCESS_EXPIRY_MINS", 60),
            refresh_token_expiry_days: env_or("JWT_REFRESH_EXPIRY_DAYS", 7),
        };
        assert!(
            config.access_token_expiry_mins > 0 && config.refresh_token_expiry_days > 0,
            "JWT lifetimes must be positive"
        );
        config
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        // `sub` is numeric here; the library only recognises string subjects.
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.leeway = LEEWAY_SECS;
        validation
    }
}

/// Who a token is issued to.
#[derive(Debug, Clone, Copy)]
pub struct TokenSubject<'a> {
    pub user_id: DbId,
    pub role: &'a str,
    pub client_id: Option<DbId>,
}

/// Output of a login or refresh. The caller persists `refresh_token_hash`
/// and hands the plaintext tokens to the browser.
#[derive(Debug)]
pub struct IssuedTokens {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub refresh_token: String,
    pub refresh_token_hash: String,
    pub refresh_expires_at: DateTime<Utc>,
}

pub fn sign_access_token(subject: TokenSubject<'_>, config: &JwtConfig) -> Result<String, JwtError> {
    let now = Utc::now();
    let claims = Claims {
        sub: subject.user_id,
        role: subject.role.to_owned(),
        client_id: subject.client_id,
        iss: TOKEN_ISSUER.to_owned(),
        iat: now.timestamp(),
        exp: (now + Duration::minutes(config.access_token_expiry_mins)).timestamp(),
        jti: Uuid::new_v4(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

pub fn verify_access_token(token: &str, config: &JwtConfig) -> Result<Claims, JwtError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &JwtConfig::validation(),
    )
    .map(|data| data.claims)
}

/// Sign an access token and mint a fresh refresh token.
pub fn issue_tokens(subject: TokenSubject<'_>, config: &JwtConfig) -> Result<IssuedTokens, JwtError> {
    let access_token = sign_access_token(subject, config)?;
    let refresh_token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    Ok(IssuedTokens {
        access_token,
        expires_in: config.access_token_expiry_mins * 60,
        refresh_token_hash: refresh_token_hash(&refresh_token),
        refresh_token,
        refresh_expires_at: Utc::now() + Duration::days(config.refresh_token_expiry_days),
    })
}

/// Hex SHA-256 of a refresh token, as stored in `user_sessions`.
pub fn refresh_token_hash(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.trim().as_bytes()))
}
