use crate::{
    AppState,
    db::{CategoryExt, MessageExt, SettingExt, TourExt},
    dtos::{
        ContactCreatedData, ContactCreatedResponseDto, ContactFormDto, PaginationDto,
        PublicCategoriesResponseDto, PublicTourQueryParams, TourListData, TourListResponseDto,
        TourResponseDto,
    },
    error::{ErrorMessage, HttpError},
    mail::mails::send_contact_notification_email,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use axum_client_ip::ClientIp;
use tracing::instrument;
use validator::Validate;

/// Public listing: active tours only, featured first.
#[instrument(skip(app_state))]
pub async fn get_tours(
    Query(params): Query<PublicTourQueryParams>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    params
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = params.page.unwrap_or(1);
    let limit = params.limit.unwrap_or(12);

    let tours = app_state
        .db_client
        .get_public_tours(page, limit, params.category.as_deref(), params.featured)
        .await
        .map_err(|e| {
            tracing::error!("DB error, listing public tours: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let total = app_state
        .db_client
        .get_public_tour_count(params.category.as_deref(), params.featured)
        .await
        .map_err(|e| {
            tracing::error!("DB error, counting public tours: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    Ok(Json(TourListResponseDto {
        success: true,
        data: TourListData {
            items: tours,
            pagination: PaginationDto::new(page, limit, total),
        },
    }))
}

/// Detail lookup by slug; drafts and inactive tours 404.
#[instrument(skip(app_state))]
pub async fn get_tour_by_slug(
    Path(tour_slug): Path<String>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let tour = app_state
        .db_client
        .get_tour_by_slug(&tour_slug)
        .await
        .map_err(|e| {
            tracing::error!(slug = %tour_slug, "DB error, getting tour by slug: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found("Tour not found"))?;

    Ok(Json(TourResponseDto {
        success: true,
        data: tour,
    }))
}

#[instrument(skip(app_state))]
pub async fn get_categories(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let categories = app_state
        .db_client
        .get_active_categories()
        .await
        .map_err(|e| {
            tracing::error!("DB error, listing active categories: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    Ok(Json(PublicCategoriesResponseDto {
        success: true,
        data: categories,
    }))
}

/// Contact form submission, rate-limited to 5 per IP per hour. The agency
/// inbox is notified out of band; a failed notification never fails the
/// submission.
#[instrument(skip(app_state, body), fields(email = %body.email))]
pub async fn submit_contact(
    ClientIp(ip): ClientIp,
    State(app_state): State<AppState>,
    Json(body): Json<ContactFormDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let attempts = app_state
        .redis_client
        .register_contact_attempt(ip)
        .await
        .map_err(|e| {
            tracing::error!("Redis error, counting contact attempts: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;
    if attempts > 5 {
        tracing::warn!(ip = %ip, "Contact form rate limit exceeded");
        return Err(HttpError::too_many_requests(
            "Too many messages, try again later",
        ));
    }

    let message = app_state
        .db_client
        .save_message(&body, &ip.to_string())
        .await
        .map_err(|e| {
            tracing::error!("DB error, saving contact message: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    tracing::info!(message_id = message.id, "contact message received");

    let notify_state = app_state.clone();
    let notify_message = message.clone();
    tokio::spawn(async move {
        let settings = match notify_state.db_client.get_settings().await {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Failed to load settings for contact notification: {}", e);
                return;
            }
        };
        let Some(contact_email) = settings
            .iter()
            .find(|s| s.key == "contact_email")
            .map(|s| s.value.clone())
        else {
            return;
        };
        if let Err(e) =
            send_contact_notification_email(&contact_email, &notify_message).await
        {
            tracing::warn!("Failed to send contact notification: {}", e);
        }
    });

    Ok((
        axum::http::StatusCode::CREATED,
        Json(ContactCreatedResponseDto {
            success: true,
            data: ContactCreatedData {
                id: message.id,
                created_at: message.created_at,
            },
        }),
    ))
}
