use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::IntoResponse,
};

use axum_client_ip::ClientIp;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    db::AdminUserExt,
    error::{ErrorMessage, HttpError},
    models::{AdminRole, AdminStatus, AdminUser},
    utils::token,
};

/// Inserted into request extensions after successful authentication so
/// downstream handlers can extract the acting admin.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JWTAuthMiddleware {
    pub admin: AdminUser,
}

/// Requests allowed per IP per minute across the whole API.
const API_RATE_LIMIT: i64 = 120;

fn check_api_quota(count: i64) -> Result<(), HttpError> {
    if count > API_RATE_LIMIT {
        return Err(HttpError::too_many_requests("Too many requests"));
    }
    Ok(())
}

/// Fixed-window per-IP limiter applied to every /api route. Login and the
/// contact form keep their stricter budgets on top of this one.
pub async fn rate_limit(
    ClientIp(ip): ClientIp,
    State(app_state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    let count = app_state
        .redis_client
        .register_api_request(ip)
        .await
        .map_err(|e| {
            tracing::error!("Redis error, counting api requests: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    if let Err(err) = check_api_quota(count) {
        tracing::warn!(ip = %ip, count, "API rate limit exceeded");
        return Err(err);
    }

    Ok(next.run(req).await)
}

/// Bearer-token authentication for the admin API.
///
/// Token sources, in order: `Authorization: Bearer <JWT>` header, then the
/// `access_token` cookie for browser clients. 401 when the token is absent,
/// invalid, the admin row is gone, or the account is inactive; the status
/// check runs per request, so deactivation takes effect on the next call.
pub async fn auth(
    cookie_jar: CookieJar,
    State(app_state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|auth_header| auth_header.to_str().ok())
        .and_then(|auth_value| {
            auth_value
                .strip_prefix("Bearer ")
                .map(|token| token.to_owned())
        })
        .or_else(|| {
            cookie_jar
                .get("access_token")
                .map(|cookie| cookie.value().to_string())
        });

    let token =
        token.ok_or_else(|| HttpError::unauthorized(ErrorMessage::TokenRequired.to_string()))?;

    let admin_id = token::decode_token(token, app_state.env.jwt_secret.as_bytes())
        .map_err(|_| HttpError::unauthorized(ErrorMessage::InvalidToken.to_string()))?;

    let admin_id = uuid::Uuid::parse_str(&admin_id)
        .map_err(|_| HttpError::unauthorized(ErrorMessage::InvalidToken.to_string()))?;

    let admin = app_state
        .db_client
        .get_admin(Some(admin_id), None, None)
        .await
        .map_err(|e| {
            tracing::error!("DB error, loading admin for auth: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let admin = admin
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::AdminNoLongerExists.to_string()))?;

    if admin.status != AdminStatus::Active {
        return Err(HttpError::unauthorized(
            ErrorMessage::AccountInactive.to_string(),
        ));
    }

    req.extensions_mut().insert(JWTAuthMiddleware { admin });

    Ok(next.run(req).await)
}

/// Role gate; must run after [`auth`].
pub async fn role_check(
    req: Request,
    next: Next,
    required_roles: Vec<AdminRole>,
) -> Result<impl IntoResponse, HttpError> {
    let auth = req
        .extensions()
        .get::<JWTAuthMiddleware>()
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::UserNotAuthenticated.to_string()))?;

    if !required_roles.contains(&auth.admin.role) {
        return Err(HttpError::new(
            ErrorMessage::PermissionDenied.to_string(),
            StatusCode::FORBIDDEN,
        ));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_quota_boundary() {
        assert!(check_api_quota(API_RATE_LIMIT).is_ok());

        let err = check_api_quota(API_RATE_LIMIT + 1).unwrap_err();
        assert_eq!(err.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.message, "Too many requests");
    }
}
