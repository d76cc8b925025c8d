use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::database::DatabaseError;
use crate::types::Role;

/// Account row as read for authentication. `password_hash` never leaves
/// the server.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub mobile_number: Option<String>,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub full_name: String,
    pub profile_image: Option<String>,
    pub role: String,
    pub is_creator: i16,
    pub is_verified: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub const COLUMNS: &'static str = "id, mobile_number, email, password_hash, full_name, profile_image, \
         role, is_creator, is_verified, created_at, updated_at";

    pub fn role(&self) -> Role {
        Role::parse(&self.role).unwrap_or_default()
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, DatabaseError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", Self::COLUMNS);
        Ok(sqlx::query_as::<_, User>(&query).bind(id).fetch_optional(pool).await?)
    }

    /// Lookup by mobile number or email, the two accepted login identifiers
    pub async fn find_by_login(pool: &PgPool, mobile: &str, email: &str) -> Result<Option<User>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM users WHERE mobile_number = $1 OR LOWER(email) = LOWER($2) LIMIT 1",
            Self::COLUMNS
        );
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(mobile)
            .bind(email)
            .fetch_optional(pool)
            .await?)
    }

    /// Admin by role, or by matching the configured admin email
    pub fn is_admin(&self, admin_email: Option<&str>) -> bool {
        if self.role() == Role::Admin {
            return true;
        }
        match (self.email.as_deref(), admin_email) {
            (Some(email), Some(admin)) => email.eq_ignore_ascii_case(admin.trim()),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str, email: Option<&str>) -> User {
        User {
            id: 1,
            mobile_number: None,
            email: email.map(str::to_string),
            password_hash: Some("hash".to_string()),
            full_name: "Test".to_string(),
            profile_image: None,
            role: role.to_string(),
            is_creator: 0,
            is_verified: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn admin_by_role_or_email() {
        assert!(user("admin", None).is_admin(None));
        assert!(user("user", Some("Ops@Tirhuta.com")).is_admin(Some("ops@tirhuta.com")));
        assert!(!user("user", Some("someone@tirhuta.com")).is_admin(Some("ops@tirhuta.com")));
        assert!(!user("user", None).is_admin(Some("ops@tirhuta.com")));
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let json = serde_json::to_value(user("user", None)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["full_name"], "Test");
    }
}
