use super::DBClient;
use crate::dtos::{SaveTourDto, TourDto};
use crate::models::TourStatus;
use serde_json::Value;
use sqlx::{Postgres, QueryBuilder};

// Insert/update return the joined row in one round trip.
const TOUR_RETURNING: &str = "SELECT nt.*, c.name AS category_name
     FROM new_tour nt
     JOIN categories c ON nt.category_id = c.id";

/// Tour database operations.
pub trait TourExt {
    async fn get_tour(&self, tour_id: i64) -> Result<Option<TourDto>, sqlx::Error>;

    /// Public detail lookup; only active tours are visible by slug.
    async fn get_tour_by_slug(&self, slug: &str) -> Result<Option<TourDto>, sqlx::Error>;

    /// Admin listing with optional status / category filters.
    async fn get_tours(
        &self,
        page: i64,
        limit: i64,
        status: Option<TourStatus>,
        category_id: Option<i64>,
    ) -> Result<Vec<TourDto>, sqlx::Error>;

    async fn get_tour_count(
        &self,
        status: Option<TourStatus>,
        category_id: Option<i64>,
    ) -> Result<i64, sqlx::Error>;

    /// Public listing: active tours only, featured first, then priority.
    async fn get_public_tours(
        &self,
        page: i64,
        limit: i64,
        category_slug: Option<&str>,
        featured: Option<bool>,
    ) -> Result<Vec<TourDto>, sqlx::Error>;

    async fn get_public_tour_count(
        &self,
        category_slug: Option<&str>,
        featured: Option<bool>,
    ) -> Result<i64, sqlx::Error>;

    async fn save_tour(
        &self,
        slug: &str,
        content: &str,
        dto: &SaveTourDto,
    ) -> Result<TourDto, sqlx::Error>;

    async fn update_tour(
        &self,
        tour_id: i64,
        slug: &str,
        content: &str,
        dto: &SaveTourDto,
    ) -> Result<Option<TourDto>, sqlx::Error>;

    async fn delete_tour(&self, tour_id: i64) -> Result<(), sqlx::Error>;

    async fn update_featured_image(&self, tour_id: i64, url: &str) -> Result<(), sqlx::Error>;

    async fn append_gallery_image(&self, tour_id: i64, url: &str) -> Result<(), sqlx::Error>;

    /// Append an image URL to `hotel_makkah.images` or `hotel_madinah.images`.
    async fn append_hotel_image(
        &self,
        tour_id: i64,
        makkah: bool,
        url: &str,
    ) -> Result<(), sqlx::Error>;

    /// (total, active, draft, full, inactive) for the dashboard.
    async fn get_tour_status_counts(&self) -> Result<(i64, i64, i64, i64, i64), sqlx::Error>;
}

impl TourExt for DBClient {
    async fn get_tour(&self, tour_id: i64) -> Result<Option<TourDto>, sqlx::Error> {
        sqlx::query_as::<_, TourDto>(
            "SELECT t.*, c.name AS category_name
             FROM tours t
             JOIN categories c ON t.category_id = c.id
             WHERE t.id = $1",
        )
        .bind(tour_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_tour_by_slug(&self, slug: &str) -> Result<Option<TourDto>, sqlx::Error> {
        sqlx::query_as::<_, TourDto>(
            "SELECT t.*, c.name AS category_name
             FROM tours t
             JOIN categories c ON t.category_id = c.id
             WHERE t.slug = $1 AND t.status = 'active'",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_tours(
        &self,
        page: i64,
        limit: i64,
        status: Option<TourStatus>,
        category_id: Option<i64>,
    ) -> Result<Vec<TourDto>, sqlx::Error> {
        let offset = (page - 1) * limit;

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT t.*, c.name AS category_name
             FROM tours t
             JOIN categories c ON t.category_id = c.id
             WHERE TRUE",
        );
        if let Some(status) = status {
            qb.push(" AND t.status = ").push_bind(status);
        }
        if let Some(category_id) = category_id {
            qb.push(" AND t.category_id = ").push_bind(category_id);
        }
        qb.push(" ORDER BY t.created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        qb.build_query_as::<TourDto>().fetch_all(&self.pool).await
    }

    async fn get_tour_count(
        &self,
        status: Option<TourStatus>,
        category_id: Option<i64>,
    ) -> Result<i64, sqlx::Error> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM tours t WHERE TRUE");
        if let Some(status) = status {
            qb.push(" AND t.status = ").push_bind(status);
        }
        if let Some(category_id) = category_id {
            qb.push(" AND t.category_id = ").push_bind(category_id);
        }

        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn get_public_tours(
        &self,
        page: i64,
        limit: i64,
        category_slug: Option<&str>,
        featured: Option<bool>,
    ) -> Result<Vec<TourDto>, sqlx::Error> {
        let offset = (page - 1) * limit;

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT t.*, c.name AS category_name
             FROM tours t
             JOIN categories c ON t.category_id = c.id
             WHERE t.status = 'active'",
        );
        if let Some(category_slug) = category_slug {
            qb.push(" AND c.slug = ").push_bind(category_slug.to_string());
        }
        if let Some(featured) = featured {
            qb.push(" AND t.featured = ").push_bind(featured);
        }
        qb.push(" ORDER BY t.featured DESC, t.priority DESC, t.created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        qb.build_query_as::<TourDto>().fetch_all(&self.pool).await
    }

    async fn get_public_tour_count(
        &self,
        category_slug: Option<&str>,
        featured: Option<bool>,
    ) -> Result<i64, sqlx::Error> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT COUNT(*)
             FROM tours t
             JOIN categories c ON t.category_id = c.id
             WHERE t.status = 'active'",
        );
        if let Some(category_slug) = category_slug {
            qb.push(" AND c.slug = ").push_bind(category_slug.to_string());
        }
        if let Some(featured) = featured {
            qb.push(" AND t.featured = ").push_bind(featured);
        }

        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn save_tour(
        &self,
        slug: &str,
        content: &str,
        dto: &SaveTourDto,
    ) -> Result<TourDto, sqlx::Error> {
        let sql = format!(
            "WITH new_tour AS (
                INSERT INTO tours (title, slug, description, content, price, discount_price,
                                   category_id, start_date, end_date, duration_days, location,
                                   capacity, available_spots, hotel_makkah, hotel_madinah,
                                   contacts, included_services, excluded_services, itinerary,
                                   visit_places, meta_title, meta_description, status, featured,
                                   priority)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                        $16, $17, $18, $19, $20, $21, $22, $23, $24, $25)
                RETURNING *
            )
            {TOUR_RETURNING}"
        );

        bind_tour_fields(sqlx::query_as::<_, TourDto>(&sql), slug, content, dto)
            .fetch_one(&self.pool)
            .await
    }

    async fn update_tour(
        &self,
        tour_id: i64,
        slug: &str,
        content: &str,
        dto: &SaveTourDto,
    ) -> Result<Option<TourDto>, sqlx::Error> {
        let sql = format!(
            "WITH new_tour AS (
                UPDATE tours
                SET title = $1, slug = $2, description = $3, content = $4, price = $5,
                    discount_price = $6, category_id = $7, start_date = $8, end_date = $9,
                    duration_days = $10, location = $11, capacity = $12, available_spots = $13,
                    hotel_makkah = $14, hotel_madinah = $15, contacts = $16,
                    included_services = $17, excluded_services = $18, itinerary = $19,
                    visit_places = $20, meta_title = $21, meta_description = $22, status = $23,
                    featured = $24, priority = $25, updated_at = NOW()
                WHERE id = $26
                RETURNING *
            )
            {TOUR_RETURNING}"
        );

        bind_tour_fields(sqlx::query_as::<_, TourDto>(&sql), slug, content, dto)
            .bind(tour_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_tour(&self, tour_id: i64) -> Result<(), sqlx::Error> {
        let result = sqlx::query("DELETE FROM tours WHERE id = $1")
            .bind(tour_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    async fn update_featured_image(&self, tour_id: i64, url: &str) -> Result<(), sqlx::Error> {
        let result =
            sqlx::query("UPDATE tours SET featured_image = $1, updated_at = NOW() WHERE id = $2")
                .bind(url)
                .bind(tour_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    async fn append_gallery_image(&self, tour_id: i64, url: &str) -> Result<(), sqlx::Error> {
        let result =
            sqlx::query("UPDATE tours SET gallery = gallery || $1, updated_at = NOW() WHERE id = $2")
                .bind(Value::Array(vec![Value::String(url.to_string())]))
                .bind(tour_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    async fn append_hotel_image(
        &self,
        tour_id: i64,
        makkah: bool,
        url: &str,
    ) -> Result<(), sqlx::Error> {
        // Column names cannot be bound, so the two hotel columns get their
        // own statements.
        let sql = if makkah {
            "UPDATE tours
             SET hotel_makkah = jsonb_set(COALESCE(hotel_makkah, '{}'::jsonb), '{images}',
                 COALESCE(hotel_makkah->'images', '[]'::jsonb) || $1),
                 updated_at = NOW()
             WHERE id = $2"
        } else {
            "UPDATE tours
             SET hotel_madinah = jsonb_set(COALESCE(hotel_madinah, '{}'::jsonb), '{images}',
                 COALESCE(hotel_madinah->'images', '[]'::jsonb) || $1),
                 updated_at = NOW()
             WHERE id = $2"
        };

        let result = sqlx::query(sql)
            .bind(Value::Array(vec![Value::String(url.to_string())]))
            .bind(tour_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    async fn get_tour_status_counts(&self) -> Result<(i64, i64, i64, i64, i64), sqlx::Error> {
        sqlx::query_as::<_, (i64, i64, i64, i64, i64)>(
            "SELECT COUNT(*),
                    COUNT(*) FILTER (WHERE status = 'active'),
                    COUNT(*) FILTER (WHERE status = 'draft'),
                    COUNT(*) FILTER (WHERE status = 'full'),
                    COUNT(*) FILTER (WHERE status = 'inactive')
             FROM tours",
        )
        .fetch_one(&self.pool)
        .await
    }
}

type TourQuery<'q> =
    sqlx::query::QueryAs<'q, Postgres, TourDto, sqlx::postgres::PgArguments>;

fn bind_tour_fields<'q>(
    query: TourQuery<'q>,
    slug: &'q str,
    content: &'q str,
    dto: &'q SaveTourDto,
) -> TourQuery<'q> {
    query
        .bind(&dto.title)
        .bind(slug)
        .bind(&dto.description)
        .bind(content)
        .bind(dto.price)
        .bind(dto.discount_price)
        .bind(dto.category_id)
        .bind(dto.start_date)
        .bind(dto.end_date)
        .bind(dto.duration_days)
        .bind(&dto.location)
        .bind(dto.capacity)
        .bind(dto.available_spots)
        .bind(&dto.hotel_makkah)
        .bind(&dto.hotel_madinah)
        .bind(&dto.contacts)
        .bind(&dto.included_services)
        .bind(&dto.excluded_services)
        .bind(&dto.itinerary)
        .bind(&dto.visit_places)
        .bind(&dto.meta_title)
        .bind(&dto.meta_description)
        .bind(dto.status.unwrap_or(TourStatus::Draft))
        .bind(dto.featured)
        .bind(dto.priority)
}
