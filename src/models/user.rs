use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub preferences: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

// Full row including the credential hash; never serialized to clients.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub preferences: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl UserRow {
    pub fn to_user(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            preferences: self.preferences,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_conversion_drops_the_credential_hash() {
        let row = UserRow {
            id: "u1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            preferences: Some("{\"theme\":\"dark\"}".to_string()),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        };
        let user = row.to_user();
        let json = serde_json::to_string(&user).expect("serialize");
        assert!(!json.contains("password"));
        assert!(json.contains("ada@example.com"));
    }
}
