use super::DBClient;
use crate::dtos::SaveCategoryDto;
use crate::models::{Category, CategoryStatus};

const CATEGORY_COLUMNS: &str = "id, name, slug, description, image, sort_order, status, \
                                meta_title, meta_description, created_at, updated_at";

/// Category database operations.
pub trait CategoryExt {
    async fn get_category(&self, category_id: i64) -> Result<Option<Category>, sqlx::Error>;

    async fn category_exists(&self, category_id: i64) -> Result<bool, sqlx::Error>;

    /// Admin listing, newest first.
    async fn get_categories(&self, page: i64, limit: i64) -> Result<Vec<Category>, sqlx::Error>;

    async fn get_category_count(&self) -> Result<i64, sqlx::Error>;

    /// Public listing: active rows ordered by sort_order.
    async fn get_active_categories(&self) -> Result<Vec<Category>, sqlx::Error>;

    async fn save_category(
        &self,
        slug: &str,
        dto: &SaveCategoryDto,
    ) -> Result<Category, sqlx::Error>;

    async fn update_category(
        &self,
        category_id: i64,
        slug: &str,
        dto: &SaveCategoryDto,
    ) -> Result<Option<Category>, sqlx::Error>;

    async fn update_category_image(
        &self,
        category_id: i64,
        image_url: &str,
    ) -> Result<(), sqlx::Error>;

    async fn delete_category(&self, category_id: i64) -> Result<(), sqlx::Error>;

    /// How many tours still reference this category; deletion is blocked
    /// while this is non-zero.
    async fn count_tours_in_category(&self, category_id: i64) -> Result<i64, sqlx::Error>;
}

impl CategoryExt for DBClient {
    async fn get_category(&self, category_id: i64) -> Result<Option<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn category_exists(&self, category_id: i64) -> Result<bool, sqlx::Error> {
        let exists: Option<bool> =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                .bind(category_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists.unwrap_or(false))
    }

    async fn get_categories(&self, page: i64, limit: i64) -> Result<Vec<Category>, sqlx::Error> {
        let offset = (page - 1) * limit;

        sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories
             ORDER BY sort_order ASC, created_at DESC
             LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_category_count(&self) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.unwrap_or(0))
    }

    async fn get_active_categories(&self) -> Result<Vec<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories
             WHERE status = 'active'
             ORDER BY sort_order ASC, name ASC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn save_category(
        &self,
        slug: &str,
        dto: &SaveCategoryDto,
    ) -> Result<Category, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO categories (name, slug, description, sort_order, status, meta_title, meta_description)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(slug)
        .bind(&dto.description)
        .bind(dto.sort_order)
        .bind(dto.status.unwrap_or(CategoryStatus::Active))
        .bind(&dto.meta_title)
        .bind(&dto.meta_description)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_category(
        &self,
        category_id: i64,
        slug: &str,
        dto: &SaveCategoryDto,
    ) -> Result<Option<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "UPDATE categories
             SET name = $1, slug = $2, description = $3, sort_order = $4, status = $5,
                 meta_title = $6, meta_description = $7, updated_at = NOW()
             WHERE id = $8
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(slug)
        .bind(&dto.description)
        .bind(dto.sort_order)
        .bind(dto.status.unwrap_or(CategoryStatus::Active))
        .bind(&dto.meta_title)
        .bind(&dto.meta_description)
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_category_image(
        &self,
        category_id: i64,
        image_url: &str,
    ) -> Result<(), sqlx::Error> {
        let result =
            sqlx::query("UPDATE categories SET image = $1, updated_at = NOW() WHERE id = $2")
                .bind(image_url)
                .bind(category_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    async fn delete_category(&self, category_id: i64) -> Result<(), sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    async fn count_tours_in_category(&self, category_id: i64) -> Result<i64, sqlx::Error> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT COUNT(*) FROM tours WHERE category_id = $1")
                .bind(category_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.unwrap_or(0))
    }
}
