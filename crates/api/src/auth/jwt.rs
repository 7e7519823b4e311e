//! Access tokens and refresh tokens.
//!
//! Access tokens are HS256 JWTs issued by `fgvistos` carrying the user id
//! and canonical role name. Refresh tokens are opaque UUIDs; only their
//! SHA-256 hex digest is persisted in `user_sessions`.

use fgvistos_core::roles::Role;
use fgvistos_core::types::DbId;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 30;
pub const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 14;

/// `iss` claim of every token this service signs.
const ISSUER: &str = "fgvistos";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id.
    pub sub: DbId,
    /// Role name as stored in `roles.name`. Parsed again on every request,
    /// so a stale or unknown value only ever narrows access.
    pub role: String,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl Claims {
    /// The role claim, or `None` when it names no known role.
    pub fn parsed_role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

/// Signing secret and token lifetimes. Loaded by
/// [`crate::config::ServerConfig::from_env`].
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// Access token lifetime in seconds, as reported to clients.
    pub fn access_token_ttl_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }

    /// Expiry instant for a refresh session created now.
    pub fn refresh_expires_at(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::Utc::now() + chrono::Duration::days(self.refresh_token_expiry_days)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation
    }
}

/// Sign an access token for `user_id` with the given role name.
pub fn generate_access_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        iss: ISSUER.to_string(),
        exp: iat + config.access_token_ttl_secs(),
        iat,
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify algorithm, issuer, signature and expiry, returning the claims.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &config.validation(),
    )
    .map(|data| data.claims)
}

/// New refresh token as `(plaintext, sha256_hex)`.
pub fn generate_refresh_token() -> (String, String) {
    let plaintext = Uuid::new_v4().to_string();
    let hash = hash_refresh_token(&plaintext);
    (plaintext, hash)
}

pub fn hash_refresh_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            access_token_expiry_mins: DEFAULT_ACCESS_EXPIRY_MINS,
            refresh_token_expiry_days: DEFAULT_REFRESH_EXPIRY_DAYS,
        }
    }

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(iss: &str, exp_offset: i64) -> Claims {
        let now = chrono::Utc::now().timestamp();
        Claims {
            sub: 1,
            role: "client".into(),
            iss: iss.into(),
            exp: now + exp_offset,
            iat: now - 1200,
            jti: Uuid::new_v4().to_string(),
        }
    }

    #[test]
    fn access_token_carries_user_and_role() {
        let cfg = config("unit-test-secret");
        let token = generate_access_token(7, "Staff", &cfg).unwrap();
        let claims = validate_token(&token, &cfg).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.parsed_role(), Some(Role::Staff));
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn expired_or_foreign_tokens_are_rejected() {
        let cfg = config("unit-test-secret");
        assert!(validate_token(&sign(&claims(ISSUER, -600), &cfg.secret), &cfg).is_err());
        assert!(validate_token(&sign(&claims("someone-else", 600), &cfg.secret), &cfg).is_err());
        assert!(validate_token(&sign(&claims(ISSUER, 600), &cfg.secret), &cfg).is_ok());

        let token = generate_access_token(1, "admin", &config("alpha")).unwrap();
        assert!(validate_token(&token, &config("bravo")).is_err());
    }

    #[test]
    fn refresh_hash_is_stable_hex() {
        let (plaintext, hash) = generate_refresh_token();
        assert_eq!(hash_refresh_token(&plaintext), hash);
        assert_eq!(hash.len(), 64);
        assert_ne!(plaintext, hash);
    }
}
