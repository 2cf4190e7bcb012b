use crate::{
    AppState,
    db::AdminUserExt,
    dtos::{FilterAdminDto, LoginAdminDto, LoginData, LoginResponseDto, Response},
    error::{ErrorMessage, HttpError},
    middleware::JWTAuthMiddleware,
    models::AdminStatus,
    utils::{password, token},
};
use axum::{
    Extension, Json, Router,
    extract::State,
    http::{HeaderMap, header},
    response::IntoResponse,
    routing::post,
};
use axum_client_ip::ClientIp;
use axum_extra::extract::cookie::Cookie;
use tracing::instrument;
use validator::Validate;

pub fn auth_handler() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Login with per-IP rate limiting (100 attempts per IP per day,
/// 10 per identifier per hour).
#[instrument(skip(app_state, body), fields(identifier = %body.identifier))]
pub async fn login(
    ClientIp(ip): ClientIp,
    State(app_state): State<AppState>,
    Json(body): Json<LoginAdminDto>,
) -> Result<impl IntoResponse, HttpError> {
    // A structurally invalid body is a 400; only real credential mismatches
    // get the 401 below.
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let ip_attempts = app_state
        .redis_client
        .get_login_ip_attempts(ip)
        .await
        .map_err(|e| {
            tracing::error!("Redis error, getting ip attempts: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .unwrap_or(0);
    if ip_attempts >= 100 {
        tracing::warn!(ip = %ip, "Login attempts exceeded the IP limit");
        return Err(HttpError::too_many_requests("Too many login attempts"));
    }

    let identifier_attempts = app_state
        .redis_client
        .get_login_identifier_attempts(ip, &body.identifier)
        .await
        .map_err(|e| {
            tracing::error!("Redis error, getting identifier attempts: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .unwrap_or(0);
    if identifier_attempts >= 10 {
        tracing::warn!(ip = %ip, "Login attempts exceeded the identifier limit");
        return Err(HttpError::too_many_requests("Too many login attempts"));
    }

    match authenticate(&app_state, &body).await {
        Ok(response) => {
            if let Err(e) = app_state
                .redis_client
                .clear_login_identifier_attempts(ip, &body.identifier)
                .await
            {
                tracing::warn!("Failed to clear rate limit: {:?}", e);
            }
            tracing::info!(identifier = %body.identifier, ip = %ip, "Login successful");
            Ok(response)
        }
        Err(err) => {
            if let Err(e) = app_state
                .redis_client
                .increment_login_attempts(ip, &body.identifier)
                .await
            {
                tracing::warn!("Failed to increment login attempts: {:?}", e);
            }
            Err(err)
        }
    }
}

/// Verify credentials and issue the access token.
async fn authenticate(
    app_state: &AppState,
    body: &LoginAdminDto,
) -> Result<axum::response::Response, HttpError> {
    // The identifier is an email when it contains '@', a username otherwise.
    let result = if body.identifier.contains('@') {
        app_state
            .db_client
            .get_admin(None, None, Some(&body.identifier))
            .await
    } else {
        app_state
            .db_client
            .get_admin(None, Some(&body.identifier), None)
            .await
    }
    .map_err(|e| {
        tracing::error!("DB error, getting admin: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    let admin = result.ok_or_else(|| {
        tracing::warn!("Admin not found");
        HttpError::unauthorized("Invalid credentials")
    })?;

    if admin.status != AdminStatus::Active {
        tracing::warn!(admin_id = %admin.id, "Inactive account attempted login");
        return Err(HttpError::unauthorized(
            ErrorMessage::AccountInactive.to_string(),
        ));
    }

    let password_matched = password::compare(&body.password, &admin.password).map_err(|e| {
        tracing::error!("Password comparison error: {}", e);
        HttpError::unauthorized("Invalid credentials")
    })?;

    if !password_matched {
        tracing::warn!(admin_id = %admin.id, "Password mismatch");
        return Err(HttpError::unauthorized("Invalid credentials"));
    }

    let access_token = token::create_token(
        &admin.id.to_string(),
        app_state.env.jwt_secret.as_bytes(),
        app_state.env.jwt_maxage,
    )
    .map_err(|e| {
        tracing::error!("Token creation error: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    app_state
        .db_client
        .update_last_login(admin.id)
        .await
        .map_err(|e| {
            tracing::error!(admin_id = %admin.id, "DB error, updating last_login: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    // Cookie for browser clients; API clients use the token from the body.
    let access_cookie = Cookie::build(("access_token", access_token.clone()))
        .path("/")
        .http_only(true)
        .secure(true)
        .build();

    let json_response = Json(LoginResponseDto {
        success: true,
        data: LoginData {
            token: access_token,
            admin: FilterAdminDto::filter_admin(&admin),
        },
    });

    let mut headers = HeaderMap::new();
    headers.append(
        header::SET_COOKIE,
        access_cookie.to_string().parse().map_err(|_| {
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?,
    );

    let mut response = json_response.into_response();
    response.headers_mut().extend(headers);
    Ok(response)
}

/// Clear the access-token cookie.
#[instrument(skip(auth), fields(username = %auth.admin.username))]
pub async fn logout(
    Extension(auth): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let access_cookie = Cookie::build(("access_token", ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .http_only(true)
        .build();

    let mut headers = HeaderMap::new();
    headers.append(
        header::SET_COOKIE,
        access_cookie.to_string().parse().map_err(|_| {
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?,
    );

    let json_response = Json(Response {
        success: true,
        message: "Logout successful".to_string(),
    });

    let mut response = json_response.into_response();
    response.headers_mut().extend(headers);
    tracing::info!("logout successful");
    Ok(response)
}
