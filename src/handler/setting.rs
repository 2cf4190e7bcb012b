use crate::{
    AppState,
    db::SettingExt,
    dtos::{SettingsResponseDto, UpdateSettingsDto},
    error::{ErrorMessage, HttpError},
    middleware::role_check,
    models::AdminRole,
};
use axum::{
    Json, Router,
    extract::State,
    middleware,
    response::IntoResponse,
    routing::{get, put},
};
use std::collections::HashMap;
use tracing::instrument;
use validator::Validate;

pub fn setting_handler() -> Router<AppState> {
    Router::new().route("/", get(get_settings)).route(
        "/",
        put(update_settings).route_layer(middleware::from_fn(|req, next| {
            role_check(req, next, vec![AdminRole::SuperAdmin, AdminRole::Admin])
        })),
    )
}

#[instrument(skip(app_state))]
pub async fn get_settings(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let settings = app_state.db_client.get_settings().await.map_err(|e| {
        tracing::error!("DB error, loading settings: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    let data: HashMap<String, String> =
        settings.into_iter().map(|s| (s.key, s.value)).collect();

    Ok(Json(SettingsResponseDto {
        success: true,
        data,
    }))
}

/// Upsert every submitted key; the full map is echoed back afterwards.
#[instrument(skip(app_state, body))]
pub async fn update_settings(
    State(app_state): State<AppState>,
    Json(body): Json<UpdateSettingsDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    for (key, value) in &body.settings {
        app_state
            .db_client
            .upsert_setting(key, value)
            .await
            .map_err(|e| {
                tracing::error!(key = %key, "DB error, upserting setting: {}", e);
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            })?;
    }

    let settings = app_state.db_client.get_settings().await.map_err(|e| {
        tracing::error!("DB error, reloading settings: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    let data: HashMap<String, String> =
        settings.into_iter().map(|s| (s.key, s.value)).collect();

    tracing::info!(count = data.len(), "settings updated");
    Ok(Json(SettingsResponseDto {
        success: true,
        data,
    }))
}
