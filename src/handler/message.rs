use crate::{
    AppState,
    db::MessageExt,
    dtos::{
        MessageListData, MessageListResponseDto, MessageQueryParams, MessageResponseDto,
        PaginationDto, Response, UpdateMessageDto,
    },
    error::{ErrorMessage, HttpError},
    middleware::role_check,
    models::AdminRole,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    middleware,
    response::IntoResponse,
    routing::{delete, get},
};
use tracing::instrument;
use validator::Validate;

pub fn message_handler() -> Router<AppState> {
    Router::new()
        .route("/", get(get_messages))
        .route("/{id}", get(get_message).put(edit_message))
        .route(
            "/{id}",
            delete(delete_message).route_layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![AdminRole::SuperAdmin, AdminRole::Admin])
            })),
        )
}

#[instrument(skip(app_state))]
pub async fn get_messages(
    Query(params): Query<MessageQueryParams>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    params
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = params.page.unwrap_or(1);
    let limit = params.limit.unwrap_or(20);

    let messages = app_state
        .db_client
        .get_messages(page, limit, params.status)
        .await
        .map_err(|e| {
            tracing::error!("DB error, listing messages: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let total = app_state
        .db_client
        .get_message_count(params.status)
        .await
        .map_err(|e| {
            tracing::error!("DB error, counting messages: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    Ok(Json(MessageListResponseDto {
        success: true,
        data: MessageListData {
            items: messages,
            pagination: PaginationDto::new(page, limit, total),
        },
    }))
}

#[instrument(skip(app_state))]
pub async fn get_message(
    Path(message_id): Path<i64>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let message = app_state
        .db_client
        .get_message(message_id)
        .await
        .map_err(|e| {
            tracing::error!(message_id, "DB error, getting message: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found("Message not found"))?;

    Ok(Json(MessageResponseDto {
        success: true,
        data: message,
    }))
}

/// Status transition and/or reply text; both fields optional.
#[instrument(skip(app_state, body))]
pub async fn edit_message(
    Path(message_id): Path<i64>,
    State(app_state): State<AppState>,
    Json(body): Json<UpdateMessageDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let message = app_state
        .db_client
        .update_message(message_id, body.status, body.reply.as_deref())
        .await
        .map_err(|e| {
            tracing::error!(message_id, "DB error, updating message: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found("Message not found"))?;

    tracing::info!(message_id, "message updated");
    Ok(Json(MessageResponseDto {
        success: true,
        data: message,
    }))
}

#[instrument(skip(app_state))]
pub async fn delete_message(
    Path(message_id): Path<i64>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .db_client
        .delete_message(message_id)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => HttpError::not_found("Message not found"),
            e => {
                tracing::error!(message_id, "DB error, deleting message: {}", e);
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            }
        })?;

    tracing::info!(message_id, "message deleted");
    Ok(Json(Response {
        success: true,
        message: "Message deleted".to_string(),
    }))
}
