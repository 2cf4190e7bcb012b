use super::DBClient;
use crate::models::SiteSetting;

/// Site settings are plain key/value rows, upserted by key.
pub trait SettingExt {
    async fn get_settings(&self) -> Result<Vec<SiteSetting>, sqlx::Error>;

    async fn upsert_setting(&self, key: &str, value: &str) -> Result<(), sqlx::Error>;
}

impl SettingExt for DBClient {
    async fn get_settings(&self) -> Result<Vec<SiteSetting>, sqlx::Error> {
        sqlx::query_as::<_, SiteSetting>(
            "SELECT key, value, updated_at FROM site_settings ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn upsert_setting(&self, key: &str, value: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO site_settings (key, value)
             VALUES ($1, $2)
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
