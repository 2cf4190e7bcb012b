use crate::{
    AppState,
    db::{CategoryExt, MessageExt, TourExt},
    dtos::{DashboardData, DashboardResponseDto, MessageCounts, TourCounts},
    error::{ErrorMessage, HttpError},
    models::MessageStatus,
};
use axum::{Json, extract::State, response::IntoResponse};
use tracing::instrument;

/// Counts and the latest messages for the admin landing page.
#[instrument(skip(app_state))]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let (total, active, draft, full, inactive) = app_state
        .db_client
        .get_tour_status_counts()
        .await
        .map_err(|e| {
            tracing::error!("DB error, counting tours: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let categories = app_state.db_client.get_category_count().await.map_err(|e| {
        tracing::error!("DB error, counting categories: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    let total_messages = app_state
        .db_client
        .get_message_count(None)
        .await
        .map_err(|e| {
            tracing::error!("DB error, counting messages: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let new_messages = app_state
        .db_client
        .get_message_count(Some(MessageStatus::New))
        .await
        .map_err(|e| {
            tracing::error!("DB error, counting new messages: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let recent_messages = app_state
        .db_client
        .get_recent_messages(5)
        .await
        .map_err(|e| {
            tracing::error!("DB error, loading recent messages: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    Ok(Json(DashboardResponseDto {
        success: true,
        data: DashboardData {
            tours: TourCounts {
                total,
                active,
                draft,
                full,
                inactive,
            },
            categories,
            messages: MessageCounts {
                total: total_messages,
                new: new_messages,
            },
            recent_messages,
        },
    }))
}
