use crate::{
    AppState,
    db::{CategoryExt, TourExt},
    dtos::{UploadData, UploadResponseDto},
    error::{ErrorMessage, HttpError},
    utils::images::{self, ImageVariants},
};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    response::IntoResponse,
    routing::post,
};
use std::path::PathBuf;
use tracing::instrument;

/// 5 MiB for tour, gallery and category images.
const IMAGE_MAX_BYTES: usize = 5 * 1024 * 1024;
/// 10 MiB for hotel photos, which tend to come straight off a camera.
const HOTEL_IMAGE_MAX_BYTES: usize = 10 * 1024 * 1024;

pub fn upload_handler() -> Router<AppState> {
    Router::new()
        .route("/tour-image/{tour_id}", post(upload_tour_image))
        .route("/gallery-image/{tour_id}", post(upload_gallery_image))
        .route(
            "/hotel-images/{hotel_type}/{tour_id}",
            post(upload_hotel_image),
        )
        .route("/category-image/{category_id}", post(upload_category_image))
        // Multipart overhead on top of the largest per-image ceiling.
        .layer(DefaultBodyLimit::max(HOTEL_IMAGE_MAX_BYTES + 1024 * 1024))
}

/// MIME allow-list and size ceiling for one upload. The ceiling is
/// inclusive: a file of exactly `max_bytes` passes, one byte more is a 400.
fn validate_image_field(mime: &str, len: usize, max_bytes: usize) -> Result<(), HttpError> {
    if !images::is_allowed_mime(mime) {
        return Err(HttpError::bad_request(
            "Only JPEG, PNG and WebP images are accepted",
        ));
    }

    if len > max_bytes {
        return Err(HttpError::bad_request(format!(
            "Image exceeds the {} MB limit",
            max_bytes / (1024 * 1024)
        )));
    }

    Ok(())
}

/// Pull the `image` field out of the multipart body and check its MIME type
/// and size against the route's ceiling.
async fn read_image_field(
    mut multipart: Multipart,
    max_bytes: usize,
) -> Result<Vec<u8>, HttpError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Multipart error: {}", e);
        HttpError::bad_request("Invalid multipart body")
    })? {
        if field.name() != Some("image") {
            continue;
        }

        let mime = field.content_type().unwrap_or_default().to_string();

        let data = field.bytes().await.map_err(|e| {
            tracing::error!("Multipart read error: {}", e);
            HttpError::bad_request("Invalid multipart body")
        })?;

        validate_image_field(&mime, data.len(), max_bytes)?;

        return Ok(data.to_vec());
    }

    Err(HttpError::bad_request("Missing image field"))
}

/// Resize and store on the blocking pool; image decoding is CPU-bound.
async fn process_upload(
    app_state: &AppState,
    data: Vec<u8>,
    folder: &'static str,
) -> Result<ImageVariants, HttpError> {
    let upload_root = PathBuf::from(&app_state.env.upload_dir);

    let result = tokio::task::spawn_blocking(move || {
        images::process_and_store(&data, &upload_root, folder)
    })
    .await
    .map_err(|e| {
        tracing::error!("Image task panicked: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    result.map_err(|e| match e {
        images::ImageError::Decode => HttpError::bad_request(e.to_string()),
        e => {
            tracing::error!("Image processing error: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        }
    })
}

fn upload_response(variants: ImageVariants) -> Json<UploadResponseDto> {
    Json(UploadResponseDto {
        success: true,
        data: UploadData {
            thumb: variants.thumb,
            medium: variants.medium,
            large: variants.large,
        },
    })
}

#[instrument(skip(app_state, multipart))]
pub async fn upload_tour_image(
    Path(tour_id): Path<i64>,
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .db_client
        .get_tour(tour_id)
        .await
        .map_err(|e| {
            tracing::error!(tour_id, "DB error, getting tour: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found("Tour not found"))?;

    let data = read_image_field(multipart, IMAGE_MAX_BYTES).await?;
    let variants = process_upload(&app_state, data, "tours").await?;

    app_state
        .db_client
        .update_featured_image(tour_id, &variants.large)
        .await
        .map_err(|e| {
            tracing::error!(tour_id, "DB error, storing featured image: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    tracing::info!(tour_id, url = %variants.large, "featured image uploaded");
    Ok(upload_response(variants))
}

#[instrument(skip(app_state, multipart))]
pub async fn upload_gallery_image(
    Path(tour_id): Path<i64>,
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .db_client
        .get_tour(tour_id)
        .await
        .map_err(|e| {
            tracing::error!(tour_id, "DB error, getting tour: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found("Tour not found"))?;

    let data = read_image_field(multipart, IMAGE_MAX_BYTES).await?;
    let variants = process_upload(&app_state, data, "gallery").await?;

    app_state
        .db_client
        .append_gallery_image(tour_id, &variants.large)
        .await
        .map_err(|e| {
            tracing::error!(tour_id, "DB error, appending gallery image: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    tracing::info!(tour_id, url = %variants.large, "gallery image uploaded");
    Ok(upload_response(variants))
}

#[instrument(skip(app_state, multipart))]
pub async fn upload_hotel_image(
    Path((hotel_type, tour_id)): Path<(String, i64)>,
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpError> {
    let makkah = match hotel_type.as_str() {
        "makkah" => true,
        "madinah" => false,
        _ => return Err(HttpError::bad_request("Hotel type must be makkah or madinah")),
    };

    app_state
        .db_client
        .get_tour(tour_id)
        .await
        .map_err(|e| {
            tracing::error!(tour_id, "DB error, getting tour: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found("Tour not found"))?;

    let data = read_image_field(multipart, HOTEL_IMAGE_MAX_BYTES).await?;
    let variants = process_upload(&app_state, data, "hotels").await?;

    app_state
        .db_client
        .append_hotel_image(tour_id, makkah, &variants.large)
        .await
        .map_err(|e| {
            tracing::error!(tour_id, "DB error, appending hotel image: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    tracing::info!(tour_id, hotel = %hotel_type, url = %variants.large, "hotel image uploaded");
    Ok(upload_response(variants))
}

#[instrument(skip(app_state, multipart))]
pub async fn upload_category_image(
    Path(category_id): Path<i64>,
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .db_client
        .get_category(category_id)
        .await
        .map_err(|e| {
            tracing::error!(category_id, "DB error, getting category: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found("Category not found"))?;

    let data = read_image_field(multipart, IMAGE_MAX_BYTES).await?;
    let variants = process_upload(&app_state, data, "categories").await?;

    app_state
        .db_client
        .update_category_image(category_id, &variants.medium)
        .await
        .map_err(|e| {
            tracing::error!(category_id, "DB error, storing category image: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    tracing::info!(category_id, url = %variants.medium, "category image uploaded");
    Ok(upload_response(variants))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn size_ceiling_is_inclusive() {
        assert!(validate_image_field("image/jpeg", IMAGE_MAX_BYTES, IMAGE_MAX_BYTES).is_ok());

        let err =
            validate_image_field("image/jpeg", IMAGE_MAX_BYTES + 1, IMAGE_MAX_BYTES).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Image exceeds the 5 MB limit");

        assert!(
            validate_image_field("image/png", HOTEL_IMAGE_MAX_BYTES, HOTEL_IMAGE_MAX_BYTES)
                .is_ok()
        );
        let err = validate_image_field("image/png", HOTEL_IMAGE_MAX_BYTES + 1, HOTEL_IMAGE_MAX_BYTES)
            .unwrap_err();
        assert_eq!(err.message, "Image exceeds the 10 MB limit");
    }

    #[test]
    fn disallowed_mime_is_rejected() {
        let err = validate_image_field("image/gif", 10, IMAGE_MAX_BYTES).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = validate_image_field("", 10, IMAGE_MAX_BYTES).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
