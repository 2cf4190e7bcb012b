use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Back-office roles, stored as the PostgreSQL ENUM "admin_role".
#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "admin_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    SuperAdmin,
    Admin,
    Editor,
}

impl AdminRole {
    pub fn to_str(&self) -> &str {
        match self {
            AdminRole::SuperAdmin => "super_admin",
            AdminRole::Admin => "admin",
            AdminRole::Editor => "editor",
        }
    }
}

/// Account state checked on every authenticated request; deactivation takes
/// effect on the next request, not on outstanding tokens.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "admin_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AdminStatus {
    Active,
    Inactive,
}

/// Back-office operator. `password` holds the argon2 hash, never plaintext,
/// and is stripped before any row reaches a client (see `FilterAdminDto`).
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct AdminUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: AdminRole,
    pub status: AdminStatus,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "category_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CategoryStatus {
    Active,
    Inactive,
}

/// Named grouping of tours (e.g. Hac, Umre). Deleting a category with tours
/// still referencing it is blocked at the API layer and by the FK RESTRICT.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub sort_order: i32,
    pub status: CategoryStatus,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "tour_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TourStatus {
    Active,
    Inactive,
    Draft,
    Full,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "message_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    New,
    Read,
    Replied,
    Archived,
}

/// Inbound inquiry from the public contact form.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub status: MessageStatus,
    pub reply: Option<String>,
    pub ip_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Key/value site configuration row, upserted by key.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct SiteSetting {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_enums_use_lowercase_wire_names() {
        assert_eq!(
            serde_json::from_str::<MessageStatus>("\"replied\"").unwrap(),
            MessageStatus::Replied
        );
        assert_eq!(
            serde_json::to_string(&TourStatus::Draft).unwrap(),
            "\"draft\""
        );
        assert!(serde_json::from_str::<MessageStatus>("\"spam\"").is_err());
    }

    #[test]
    fn admin_role_snake_case() {
        assert_eq!(AdminRole::SuperAdmin.to_str(), "super_admin");
        assert_eq!(
            serde_json::from_str::<AdminRole>("\"super_admin\"").unwrap(),
            AdminRole::SuperAdmin
        );
    }
}
