use crate::{
    AppState,
    db::{CategoryExt, TourExt},
    dtos::{
        PaginationDto, Response, SaveTourDto, TourListData, TourListResponseDto, TourQueryParams,
        TourResponseDto,
    },
    error::{ErrorMessage, HttpError},
    middleware::role_check,
    models::AdminRole,
    utils::slug,
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

pub fn tour_handler() -> Router<AppState> {
    Router::new()
        .route("/", get(get_tours).post(create_tour))
        .route("/{id}", get(get_tour).put(edit_tour))
        .route(
            "/{id}",
            delete(delete_tour).route_layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![AdminRole::SuperAdmin, AdminRole::Admin])
            })),
        )
}

#[instrument(skip(app_state))]
pub async fn get_tours(
    Query(params): Query<TourQueryParams>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    params
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = params.page.unwrap_or(1);
    let limit = params.limit.unwrap_or(10);

    let tours = app_state
        .db_client
        .get_tours(page, limit, params.status, params.category_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, listing tours: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let total = app_state
        .db_client
        .get_tour_count(params.status, params.category_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, counting tours: {}", e);
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

#[instrument(skip(app_state))]
pub async fn get_tour(
    Path(tour_id): Path<i64>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let tour = app_state.db_client.get_tour(tour_id).await.map_err(|e| {
        tracing::error!(tour_id, "DB error, getting tour: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    let tour = tour.ok_or_else(|| HttpError::not_found("Tour not found"))?;

    Ok(Json(TourResponseDto {
        success: true,
        data: tour,
    }))
}

#[instrument(skip(app_state, body), fields(title = %body.title))]
pub async fn create_tour(
    State(app_state): State<AppState>,
    Json(body): Json<SaveTourDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let category_ok = app_state
        .db_client
        .category_exists(body.category_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, checking category: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;
    if !category_ok {
        return Err(HttpError::bad_request("Category does not exist"));
    }

    let content = ammonia::clean(&body.content);
    let tour_slug = slug::slugify(&body.title);

    let result = app_state
        .db_client
        .save_tour(&tour_slug, &content, &body)
        .await;

    let tour = match result {
        Ok(tour) => tour,
        // Slug collision: retry once with a unique suffix.
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            let retry_slug = slug::slug_with_suffix(&tour_slug);
            app_state
                .db_client
                .save_tour(&retry_slug, &content, &body)
                .await
                .map_err(|e| {
                    tracing::error!("DB error, saving tour after slug retry: {}", e);
                    HttpError::server_error(ErrorMessage::ServerError.to_string())
                })?
        }
        Err(e) => {
            tracing::error!("DB error, saving tour: {}", e);
            return Err(HttpError::server_error(ErrorMessage::ServerError.to_string()));
        }
    };

    tracing::info!(tour_id = tour.id, slug = %tour.slug, "tour created");
    Ok((
        axum::http::StatusCode::CREATED,
        Json(TourResponseDto {
            success: true,
            data: tour,
        }),
    ))
}

#[instrument(skip(app_state, body))]
pub async fn edit_tour(
    Path(tour_id): Path<i64>,
    State(app_state): State<AppState>,
    Json(body): Json<SaveTourDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let existing = app_state
        .db_client
        .get_tour(tour_id)
        .await
        .map_err(|e| {
            tracing::error!(tour_id, "DB error, getting tour: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found("Tour not found"))?;

    let category_ok = app_state
        .db_client
        .category_exists(body.category_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, checking category: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;
    if !category_ok {
        return Err(HttpError::bad_request("Category does not exist"));
    }

    let content = ammonia::clean(&body.content);

    // The slug is stable across edits unless the title changed.
    let tour_slug = if existing.title == body.title {
        existing.slug.clone()
    } else {
        slug::slugify(&body.title)
    };

    let result = app_state
        .db_client
        .update_tour(tour_id, &tour_slug, &content, &body)
        .await;

    let tour = match result {
        Ok(tour) => tour,
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            let retry_slug = slug::slug_with_suffix(&tour_slug);
            app_state
                .db_client
                .update_tour(tour_id, &retry_slug, &content, &body)
                .await
                .map_err(|e| {
                    tracing::error!("DB error, updating tour after slug retry: {}", e);
                    HttpError::server_error(ErrorMessage::ServerError.to_string())
                })?
        }
        Err(e) => {
            tracing::error!("DB error, updating tour: {}", e);
            return Err(HttpError::server_error(ErrorMessage::ServerError.to_string()));
        }
    };

    let tour = tour.ok_or_else(|| HttpError::not_found("Tour not found"))?;

    tracing::info!(tour_id = tour.id, "tour updated");
    Ok(Json(TourResponseDto {
        success: true,
        data: tour,
    }))
}

#[instrument(skip(app_state))]
pub async fn delete_tour(
    Path(tour_id): Path<i64>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .db_client
        .delete_tour(tour_id)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => HttpError::not_found("Tour not found"),
            e => {
                tracing::error!(tour_id, "DB error, deleting tour: {}", e);
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            }
        })?;

    tracing::info!(tour_id, "tour deleted");
    Ok(Json(Response {
        success: true,
        message: "Tour deleted".to_string(),
    }))
}
