use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Fails when the expiry falls outside the representable date range.
    pub fn new(user_id: impl Into<String>, expiry_hours: u64) -> Result<Self, JwtError> {
        let now = Utc::now();
        let exp = expiry_after(now, expiry_hours).ok_or(JwtError::InvalidExpiry(expiry_hours))?;

        Ok(Self {
            user_id: user_id.into(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        })
    }
}

fn expiry_after(now: DateTime<Utc>, hours: u64) -> Option<DateTime<Utc>> {
    let hours = i64::try_from(hours).ok()?;
    now.checked_add_signed(Duration::try_hours(hours)?)
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("JWT expiry of {0} hours is out of range")]
    InvalidExpiry(u64),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::new(Algorithm::HS256);

    encode(&header, claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Check signature and expiry, returning the embedded claims.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_with_same_secret() {
        let token = generate_jwt(&Claims::new("u-1", 1).unwrap(), "s3cret").unwrap();
        let claims = verify_jwt(&token, "s3cret").unwrap();
        assert_eq!(claims.user_id, "u-1");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_jwt(&Claims::new("u-1", 1).unwrap(), "s3cret").unwrap();
        assert!(matches!(verify_jwt(&token, "other"), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims {
            user_id: "u-1".into(),
            // well past the default 60s leeway
            exp: Utc::now().timestamp() - 3600,
            iat: Utc::now().timestamp() - 7200,
        };
        let token = generate_jwt(&claims, "s3cret").unwrap();
        assert!(verify_jwt(&token, "s3cret").is_err());
    }

    #[test]
    fn empty_secret_never_signs() {
        assert!(matches!(generate_jwt(&Claims::new("u-1", 1).unwrap(), ""), Err(JwtError::InvalidSecret)));
    }

    #[test]
    fn out_of_range_expiry_is_an_error() {
        assert!(matches!(
            Claims::new("u-1", 10_000_000_000),
            Err(JwtError::InvalidExpiry(10_000_000_000))
        ));
        assert!(matches!(Claims::new("u-1", u64::MAX), Err(JwtError::InvalidExpiry(_))));
        assert!(Claims::new("u-1", 24 * 365).is_ok());
    }

    #[test]
    fn claims_use_user_id_wire_name() {
        let value = serde_json::to_value(Claims::new("42", 1).unwrap()).unwrap();
        assert_eq!(value["userId"], "42");
    }
}
