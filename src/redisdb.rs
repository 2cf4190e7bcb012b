use redis::{AsyncCommands, aio::ConnectionManager};
use std::net::IpAddr;

const API_WINDOW_SECS: i64 = 60;
const LOGIN_IP_WINDOW_SECS: i64 = 60 * 60 * 24;
const LOGIN_IDENTIFIER_WINDOW_SECS: i64 = 60 * 60;
const CONTACT_WINDOW_SECS: i64 = 60 * 60;

/// Fixed-window rate-limit counters backed by redis TTL keys.
#[derive(Clone)]
pub struct RedisClient {
    pub conn: ConnectionManager,
}

impl RedisClient {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    // INCR + EXPIRE on first hit; the key dies with its window.
    async fn increment_window(&self, key: String, window_secs: i64) -> redis::RedisResult<i64> {
        let mut conn = self.conn.clone();
        let count: i64 = conn.incr(&key, 1).await?;
        if count == 1 {
            let _: () = conn.expire(&key, window_secs).await?;
        }
        Ok(count)
    }

    /// Count a request against this IP's general API quota; returns the count
    /// within the current minute window.
    pub async fn register_api_request(&self, ip: IpAddr) -> redis::RedisResult<i64> {
        self.increment_window(format!("api_ip:{}", ip), API_WINDOW_SECS)
            .await
    }

    pub async fn get_login_ip_attempts(&self, ip: IpAddr) -> redis::RedisResult<Option<i64>> {
        let mut conn = self.conn.clone();
        conn.get(format!("login_ip:{}", ip)).await
    }

    pub async fn get_login_identifier_attempts(
        &self,
        ip: IpAddr,
        identifier: &str,
    ) -> redis::RedisResult<Option<i64>> {
        let mut conn = self.conn.clone();
        conn.get(format!("login_id:{}:{}", ip, identifier)).await
    }

    pub async fn increment_login_attempts(
        &self,
        ip: IpAddr,
        identifier: &str,
    ) -> redis::RedisResult<()> {
        self.increment_window(format!("login_ip:{}", ip), LOGIN_IP_WINDOW_SECS)
            .await?;
        self.increment_window(
            format!("login_id:{}:{}", ip, identifier),
            LOGIN_IDENTIFIER_WINDOW_SECS,
        )
        .await?;
        Ok(())
    }

    pub async fn clear_login_identifier_attempts(
        &self,
        ip: IpAddr,
        identifier: &str,
    ) -> redis::RedisResult<()> {
        let mut conn = self.conn.clone();
        conn.del(format!("login_id:{}:{}", ip, identifier)).await
    }

    /// Count a contact-form submission for this IP; returns the count within
    /// the current window.
    pub async fn register_contact_attempt(&self, ip: IpAddr) -> redis::RedisResult<i64> {
        self.increment_window(format!("contact_ip:{}", ip), CONTACT_WINDOW_SECS)
            .await
    }
}
