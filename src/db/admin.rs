use super::DBClient;
use crate::models::AdminUser;
use uuid::Uuid;

const ADMIN_COLUMNS: &str =
    "id, username, email, password, full_name, role, status, last_login, created_at, updated_at";

/// Admin user database operations.
pub trait AdminUserExt {
    /// Get a single admin by id, username, or email (first given key wins).
    async fn get_admin(
        &self,
        admin_id: Option<Uuid>,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<AdminUser>, sqlx::Error>;

    /// Stamp a successful login.
    async fn update_last_login(&self, admin_id: Uuid) -> Result<(), sqlx::Error>;
}

impl AdminUserExt for DBClient {
    async fn get_admin(
        &self,
        admin_id: Option<Uuid>,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<AdminUser>, sqlx::Error> {
        let mut admin: Option<AdminUser> = None;

        if let Some(admin_id) = admin_id {
            admin = sqlx::query_as::<_, AdminUser>(&format!(
                "SELECT {ADMIN_COLUMNS} FROM admin_users WHERE id = $1"
            ))
            .bind(admin_id)
            .fetch_optional(&self.pool)
            .await?;
        } else if let Some(username) = username {
            admin = sqlx::query_as::<_, AdminUser>(&format!(
                "SELECT {ADMIN_COLUMNS} FROM admin_users WHERE username = $1"
            ))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        } else if let Some(email) = email {
            admin = sqlx::query_as::<_, AdminUser>(&format!(
                "SELECT {ADMIN_COLUMNS} FROM admin_users WHERE email = $1"
            ))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        }

        Ok(admin)
    }

    async fn update_last_login(&self, admin_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE admin_users SET last_login = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(admin_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
