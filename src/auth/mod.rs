use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Claims issued by the identity provider for a signed-in user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Identity-provider user id
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: impl Into<String>, email: Option<String>, name: Option<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: sub.into(),
            email,
            name,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
    #[error("Invalid JWT secret")]
    InvalidSecret,
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Validate signature and expiry, returning the claims
pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    if token_data.claims.sub.trim().is_empty() {
        return Err(AuthError::InvalidToken("missing subject".to_string()));
    }

    Ok(token_data.claims)
}

/// The administrator set consulted by the admin gate
#[derive(Debug, Clone, Default)]
pub struct AdminSet {
    ids: HashSet<String>,
}

impl AdminSet {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.ids.contains(user_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Sorted for stable output
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.ids.iter().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn round_trips_claims() {
        let claims = Claims::new("user_123", Some("a@example.org".into()), None, 1);
        let token = generate_jwt(&claims, SECRET).unwrap();
        let decoded = decode_jwt(&token, SECRET).unwrap();
        assert_eq!(decoded.sub, "user_123");
        assert_eq!(decoded.email.as_deref(), Some("a@example.org"));
        assert!(decoded.name.is_none());
    }

    #[test]
    fn rejects_wrong_secret_and_expired_tokens() {
        let claims = Claims::new("user_123", None, None, 1);
        let token = generate_jwt(&claims, SECRET).unwrap();
        assert!(matches!(decode_jwt(&token, "other"), Err(AuthError::InvalidToken(_))));

        let mut expired = Claims::new("user_123", None, None, 1);
        expired.exp = Utc::now().timestamp() - 3600;
        let token = generate_jwt(&expired, SECRET).unwrap();
        assert!(decode_jwt(&token, SECRET).is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        let claims = Claims::new("user_123", None, None, 1);
        assert!(matches!(generate_jwt(&claims, ""), Err(AuthError::InvalidSecret)));
    }

    #[test]
    fn admin_set_membership() {
        let admins = AdminSet::new(["user_b", "user_a"]);
        assert!(admins.contains("user_a"));
        assert!(!admins.contains("user_c"));
        assert_eq!(admins.ids(), vec!["user_a", "user_b"]);
    }
}
