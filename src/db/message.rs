use super::DBClient;
use crate::dtos::ContactFormDto;
use crate::models::{ContactMessage, MessageStatus};
use sqlx::{Postgres, QueryBuilder};

const MESSAGE_COLUMNS: &str = "id, name, email, phone, subject, message, status, reply, \
                               ip_address, created_at, updated_at";

/// Contact message database operations.
pub trait MessageExt {
    async fn save_message(
        &self,
        dto: &ContactFormDto,
        ip_address: &str,
    ) -> Result<ContactMessage, sqlx::Error>;

    async fn get_message(&self, message_id: i64) -> Result<Option<ContactMessage>, sqlx::Error>;

    async fn get_messages(
        &self,
        page: i64,
        limit: i64,
        status: Option<MessageStatus>,
    ) -> Result<Vec<ContactMessage>, sqlx::Error>;

    async fn get_message_count(
        &self,
        status: Option<MessageStatus>,
    ) -> Result<i64, sqlx::Error>;

    /// Update status and/or reply; untouched fields keep their value, so
    /// repeating the same transition is idempotent.
    async fn update_message(
        &self,
        message_id: i64,
        status: Option<MessageStatus>,
        reply: Option<&str>,
    ) -> Result<Option<ContactMessage>, sqlx::Error>;

    async fn delete_message(&self, message_id: i64) -> Result<(), sqlx::Error>;

    async fn get_recent_messages(&self, limit: i64) -> Result<Vec<ContactMessage>, sqlx::Error>;
}

impl MessageExt for DBClient {
    async fn save_message(
        &self,
        dto: &ContactFormDto,
        ip_address: &str,
    ) -> Result<ContactMessage, sqlx::Error> {
        sqlx::query_as::<_, ContactMessage>(&format!(
            "INSERT INTO contact_messages (name, email, phone, subject, message, ip_address)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(&dto.email)
        .bind(&dto.phone)
        .bind(&dto.subject)
        .bind(&dto.message)
        .bind(ip_address)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_message(&self, message_id: i64) -> Result<Option<ContactMessage>, sqlx::Error> {
        sqlx::query_as::<_, ContactMessage>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM contact_messages WHERE id = $1"
        ))
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_messages(
        &self,
        page: i64,
        limit: i64,
        status: Option<MessageStatus>,
    ) -> Result<Vec<ContactMessage>, sqlx::Error> {
        let offset = (page - 1) * limit;

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {MESSAGE_COLUMNS} FROM contact_messages WHERE TRUE"
        ));
        if let Some(status) = status {
            qb.push(" AND status = ").push_bind(status);
        }
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        qb.build_query_as::<ContactMessage>()
            .fetch_all(&self.pool)
            .await
    }

    async fn get_message_count(
        &self,
        status: Option<MessageStatus>,
    ) -> Result<i64, sqlx::Error> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM contact_messages WHERE TRUE");
        if let Some(status) = status {
            qb.push(" AND status = ").push_bind(status);
        }

        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn update_message(
        &self,
        message_id: i64,
        status: Option<MessageStatus>,
        reply: Option<&str>,
    ) -> Result<Option<ContactMessage>, sqlx::Error> {
        sqlx::query_as::<_, ContactMessage>(&format!(
            "UPDATE contact_messages
             SET status = COALESCE($1, status),
                 reply = COALESCE($2, reply),
                 updated_at = NOW()
             WHERE id = $3
             RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(status)
        .bind(reply)
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_message(&self, message_id: i64) -> Result<(), sqlx::Error> {
        let result = sqlx::query("DELETE FROM contact_messages WHERE id = $1")
            .bind(message_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    async fn get_recent_messages(&self, limit: i64) -> Result<Vec<ContactMessage>, sqlx::Error> {
        sqlx::query_as::<_, ContactMessage>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM contact_messages ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}
