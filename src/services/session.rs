//! Session context: bearer token validation and the sign-out blocklist.
//!
//! Tokens are issued by the hosted auth provider. This service only verifies
//! them and remembers which ones were signed out until they expire.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::errors::AppError;

/// Key prefix for revoked token fingerprints in Redis.
const REVOKED_KEY_PREFIX: &str = "session:revoked:";

/// JWT claims issued by the auth provider.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Auth user id.
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub aud: Audience,
    #[serde(default)]
    pub role: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
}

/// `aud` as issued: providers send either a single string or a list.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for Audience {
    fn from(aud: &str) -> Self {
        Self::One(aud.to_string())
    }
}

/// The authenticated actor, passed explicitly to anything that needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// A verified bearer token and the user it belongs to.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: SessionUser,
    pub token: String,
    pub expires_at: i64,
}

impl Session {
    pub fn fingerprint(&self) -> String {
        token_fingerprint(&self.token)
    }

    /// Seconds until the token expires, at least one.
    pub fn remaining_secs(&self) -> u64 {
        u64::try_from(self.expires_at - Utc::now().timestamp())
            .unwrap_or(0)
            .max(1)
    }
}

/// Validate a JWT and return the session it represents.
pub fn validate_token(token: &str, jwt_secret: &str, audience: &str) -> Result<Session, AppError> {
    let decoding_key = DecodingKey::from_secret(jwt_secret.as_bytes());
    let mut validation = Validation::default();
    validation.set_audience(&[audience]);

    let claims = jsonwebtoken::decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized)?;

    let id: Uuid = claims.sub.parse().map_err(|_| AppError::Unauthorized)?;

    Ok(Session {
        user: SessionUser {
            id,
            email: claims.email,
        },
        token: token.to_string(),
        expires_at: claims.exp,
    })
}

/// Hex SHA-256 of a token; raw tokens are never stored.
pub fn token_fingerprint(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Blocklist of signed-out tokens, keyed by fingerprint.
#[async_trait]
pub trait SessionRevocations: Send + Sync {
    async fn revoke(&self, fingerprint: &str, ttl_secs: u64) -> Result<(), AppError>;

    async fn is_revoked(&self, fingerprint: &str) -> Result<bool, AppError>;

    async fn ping(&self) -> Result<(), AppError>;
}

/// Redis-backed blocklist; entries expire with the token.
#[derive(Debug, Clone)]
pub struct RedisRevocations {
    client: redis::Client,
}

impl RedisRevocations {
    pub fn open(redis_url: &str) -> Result<Self, AppError> {
        Ok(Self {
            client: redis::Client::open(redis_url)?,
        })
    }
}

#[async_trait]
impl SessionRevocations for RedisRevocations {
    async fn revoke(&self, fingerprint: &str, ttl_secs: u64) -> Result<(), AppError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = redis::cmd("SET")
            .arg(format!("{REVOKED_KEY_PREFIX}{fingerprint}"))
            .arg(1)
            .arg("EX")
            .arg(ttl_secs)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn is_revoked(&self, fingerprint: &str) -> Result<bool, AppError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let exists: bool = redis::cmd("EXISTS")
            .arg(format!("{REVOKED_KEY_PREFIX}{fingerprint}"))
            .query_async(&mut conn)
            .await?;
        Ok(exists)
    }

    async fn ping(&self) -> Result<(), AppError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// Process-local blocklist for single-instance deployments and tests.
#[derive(Debug, Default)]
pub struct MemoryRevocations {
    // fingerprint -> unix expiry
    revoked: Mutex<HashMap<String, i64>>,
    unavailable: Mutex<bool>,
}

impl MemoryRevocations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later call fail, as an unreachable Redis would.
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut flag) = self.unavailable.lock() {
            *flag = unavailable;
        }
    }

    fn check_available(&self) -> Result<(), AppError> {
        let unavailable = self
            .unavailable
            .lock()
            .map_err(|_| AppError::Internal("revocation lock poisoned".to_string()))?;
        if *unavailable {
            return Err(AppError::Internal("session blocklist unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionRevocations for MemoryRevocations {
    async fn revoke(&self, fingerprint: &str, ttl_secs: u64) -> Result<(), AppError> {
        self.check_available()?;
        let ttl = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
        let expires_at = Utc::now().timestamp().saturating_add(ttl);
        let mut revoked = self
            .revoked
            .lock()
            .map_err(|_| AppError::Internal("revocation lock poisoned".to_string()))?;
        let now = Utc::now().timestamp();
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(fingerprint.to_string(), expires_at);
        Ok(())
    }

    async fn is_revoked(&self, fingerprint: &str) -> Result<bool, AppError> {
        self.check_available()?;
        let revoked = self
            .revoked
            .lock()
            .map_err(|_| AppError::Internal("revocation lock poisoned".to_string()))?;
        let now = Utc::now().timestamp();
        Ok(revoked.get(fingerprint).is_some_and(|exp| *exp > now))
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.check_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header};

    const SECRET: &str = "test-secret-key-for-jwt";

    fn token(sub: &str, aud: &str, exp_offset_secs: i64) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: sub.to_string(),
            email: Some("ops@bazaar.test".to_string()),
            aud: aud.into(),
            role: Some("authenticated".to_string()),
            exp: (now + Duration::seconds(exp_offset_secs)).timestamp(),
            iat: Some(now.timestamp()),
        };
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_yields_session_user() {
        let user_id = Uuid::new_v4();
        let session =
            validate_token(&token(&user_id.to_string(), "authenticated", 900), SECRET, "authenticated")
                .unwrap();
        assert_eq!(session.user.id, user_id);
        assert_eq!(session.user.email.as_deref(), Some("ops@bazaar.test"));
        assert!(session.remaining_secs() > 800);
    }

    #[test]
    fn wrong_secret_or_audience_is_unauthorized() {
        let t = token(&Uuid::new_v4().to_string(), "authenticated", 900);
        assert!(validate_token(&t, "other-secret", "authenticated")
            .unwrap_err()
            .is_unauthorized());

        let t = token(&Uuid::new_v4().to_string(), "anon", 900);
        assert!(validate_token(&t, SECRET, "authenticated").is_err());
    }

    #[test]
    fn audience_list_is_accepted() {
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: None,
            aud: Audience::Many(vec!["storage".to_string(), "authenticated".to_string()]),
            role: None,
            exp: (now + Duration::seconds(900)).timestamp(),
            iat: None,
        };
        let t = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let session = validate_token(&t, SECRET, "authenticated").unwrap();
        assert_eq!(session.user.id, user_id);
    }

    #[test]
    fn expired_or_non_uuid_subject_is_rejected() {
        let t = token(&Uuid::new_v4().to_string(), "authenticated", -3600);
        assert!(validate_token(&t, SECRET, "authenticated").is_err());

        let t = token("service-account", "authenticated", 900);
        assert!(validate_token(&t, SECRET, "authenticated").is_err());
    }

    #[test]
    fn fingerprint_is_stable_hex_sha256() {
        let a = token_fingerprint("abc");
        assert_eq!(a.len(), 64);
        assert_eq!(a, token_fingerprint("abc"));
        assert_ne!(a, token_fingerprint("abd"));
    }

    #[tokio::test]
    async fn memory_revocations_remember_until_unavailable() {
        let revocations = MemoryRevocations::new();
        assert!(!revocations.is_revoked("fp").await.unwrap());
        revocations.revoke("fp", 60).await.unwrap();
        assert!(revocations.is_revoked("fp").await.unwrap());

        revocations.set_unavailable(true);
        assert!(revocations.revoke("other", 60).await.is_err());
        assert!(revocations.ping().await.is_err());
    }
}
