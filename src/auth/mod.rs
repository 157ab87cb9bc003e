use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            user_id,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    InvalidToken(String),
    InvalidSecret,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidToken(msg) => write!(f, "Invalid JWT token: {}", msg),
            JwtError::InvalidSecret => write!(f, "Invalid JWT secret"),
        }
    }
}

impl std::error::Error for JwtError {}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))
}

/// Ownership capability resolved from the authenticated caller. Every
/// ownership check in the service layer goes through here, so the
/// fail-closed comparison lives in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerClaim {
    caller: Uuid,
}

impl OwnerClaim {
    pub fn new(caller: Uuid) -> Self {
        Self { caller }
    }

    pub fn caller(&self) -> Uuid {
        self.caller
    }

    /// True only when the caller is exactly the target user.
    pub fn allows(&self, target: Uuid) -> bool {
        self.caller == target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_claim_allows_self() {
        let caller = Uuid::new_v4();
        assert!(OwnerClaim::new(caller).allows(caller));
    }

    #[test]
    fn owner_claim_denies_other_users() {
        let claim = OwnerClaim::new(Uuid::new_v4());
        assert!(!claim.allows(Uuid::new_v4()));
    }

    #[test]
    fn jwt_round_trip_preserves_user_id() {
        let user_id = Uuid::new_v4();
        let token = generate_jwt(&Claims::new(user_id, 1), "unit-test-secret").unwrap();
        let claims = decode_jwt(&token, "unit-test-secret").unwrap();
        assert_eq!(claims.user_id, user_id);
    }

    #[test]
    fn jwt_rejects_wrong_secret() {
        let token = generate_jwt(&Claims::new(Uuid::new_v4(), 1), "secret-a").unwrap();
        assert!(decode_jwt(&token, "secret-b").is_err());
    }

    #[test]
    fn jwt_rejects_empty_secret() {
        assert!(generate_jwt(&Claims::new(Uuid::new_v4(), 1), "").is_err());
    }
}
