use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::user::User;

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn create_session_token(user: &User, secret: &str, ttl_hours: i64) -> Result<String, String> {
    let now = Utc::now();
    let claims = SessionClaims {
        sub: user.id.clone(),
        email: user.email.clone(),
        name: user.name.clone(),
        iat: now.timestamp(),
        exp: (now + chrono::Duration::hours(ttl_hours)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("create session token failed: {e}"))
}

pub fn verify_session_token(token: &str, secret: &str) -> Result<SessionClaims, String> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("invalid session token: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id: "user-1".to_string(),
            name: "Test".to_string(),
            email: "test@example.com".to_string(),
            preferences: None,
            created_at: Utc::now().to_rfc3339(),
            updated_at: Utc::now().to_rfc3339(),
        }
    }

    #[test]
    fn token_round_trip() {
        let token = create_session_token(&test_user(), "secret", 1).expect("token");
        let claims = verify_session_token(&token, "secret").expect("claims");
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "test@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn rejects_wrong_secret_and_expired_token() {
        let token = create_session_token(&test_user(), "secret", 1).expect("token");
        assert!(verify_session_token(&token, "other-secret").is_err());

        let expired = create_session_token(&test_user(), "secret", -1).expect("token");
        assert!(verify_session_token(&expired, "secret").is_err());
    }
}
