use crate::{
    AppState,
    db::CategoryExt,
    dtos::{
        CategoryListData, CategoryListResponseDto, CategoryResponseDto, PaginationDto, Response,
        SaveCategoryDto,
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
use serde::Deserialize;
use tracing::instrument;
use validator::Validate;

pub fn category_handler() -> Router<AppState> {
    Router::new()
        .route("/", get(get_categories).post(create_category))
        .route("/{id}", get(get_category).put(edit_category))
        .route(
            "/{id}",
            delete(delete_category).route_layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![AdminRole::SuperAdmin, AdminRole::Admin])
            })),
        )
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryQueryParams {
    #[validate(range(min = 1))]
    pub page: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

#[instrument(skip(app_state))]
pub async fn get_categories(
    Query(params): Query<CategoryQueryParams>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    params
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = params.page.unwrap_or(1);
    let limit = params.limit.unwrap_or(50);

    let categories = app_state
        .db_client
        .get_categories(page, limit)
        .await
        .map_err(|e| {
            tracing::error!("DB error, listing categories: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let total = app_state.db_client.get_category_count().await.map_err(|e| {
        tracing::error!("DB error, counting categories: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    Ok(Json(CategoryListResponseDto {
        success: true,
        data: CategoryListData {
            items: categories,
            pagination: PaginationDto::new(page, limit, total),
        },
    }))
}

#[instrument(skip(app_state))]
pub async fn get_category(
    Path(category_id): Path<i64>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let category = app_state
        .db_client
        .get_category(category_id)
        .await
        .map_err(|e| {
            tracing::error!(category_id, "DB error, getting category: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found("Category not found"))?;

    Ok(Json(CategoryResponseDto {
        success: true,
        data: category,
    }))
}

#[instrument(skip(app_state, body), fields(name = %body.name))]
pub async fn create_category(
    State(app_state): State<AppState>,
    Json(body): Json<SaveCategoryDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let category_slug = slug::slugify(&body.name);

    let result = app_state.db_client.save_category(&category_slug, &body).await;

    let category = match result {
        Ok(category) => category,
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            let retry_slug = slug::slug_with_suffix(&category_slug);
            app_state
                .db_client
                .save_category(&retry_slug, &body)
                .await
                .map_err(|e| {
                    tracing::error!("DB error, saving category after slug retry: {}", e);
                    HttpError::server_error(ErrorMessage::ServerError.to_string())
                })?
        }
        Err(e) => {
            tracing::error!("DB error, saving category: {}", e);
            return Err(HttpError::server_error(ErrorMessage::ServerError.to_string()));
        }
    };

    tracing::info!(category_id = category.id, slug = %category.slug, "category created");
    Ok((
        axum::http::StatusCode::CREATED,
        Json(CategoryResponseDto {
            success: true,
            data: category,
        }),
    ))
}

#[instrument(skip(app_state, body))]
pub async fn edit_category(
    Path(category_id): Path<i64>,
    State(app_state): State<AppState>,
    Json(body): Json<SaveCategoryDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let existing = app_state
        .db_client
        .get_category(category_id)
        .await
        .map_err(|e| {
            tracing::error!(category_id, "DB error, getting category: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found("Category not found"))?;

    let category_slug = if existing.name == body.name {
        existing.slug.clone()
    } else {
        slug::slugify(&body.name)
    };

    let result = app_state
        .db_client
        .update_category(category_id, &category_slug, &body)
        .await;

    let category = match result {
        Ok(category) => category,
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            let retry_slug = slug::slug_with_suffix(&category_slug);
            app_state
                .db_client
                .update_category(category_id, &retry_slug, &body)
                .await
                .map_err(|e| {
                    tracing::error!("DB error, updating category after slug retry: {}", e);
                    HttpError::server_error(ErrorMessage::ServerError.to_string())
                })?
        }
        Err(e) => {
            tracing::error!("DB error, updating category: {}", e);
            return Err(HttpError::server_error(ErrorMessage::ServerError.to_string()));
        }
    };

    let category = category.ok_or_else(|| HttpError::not_found("Category not found"))?;

    tracing::info!(category_id = category.id, "category updated");
    Ok(Json(CategoryResponseDto {
        success: true,
        data: category,
    }))
}

/// Deleting is refused while tours still reference the category.
#[instrument(skip(app_state))]
pub async fn delete_category(
    Path(category_id): Path<i64>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let tour_count = app_state
        .db_client
        .count_tours_in_category(category_id)
        .await
        .map_err(|e| {
            tracing::error!(category_id, "DB error, counting category tours: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    if tour_count > 0 {
        return Err(HttpError::unique_constraint_violation(format!(
            "Category has {tour_count} tours; move or delete them first"
        )));
    }

    app_state
        .db_client
        .delete_category(category_id)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => HttpError::not_found("Category not found"),
            e => {
                tracing::error!(category_id, "DB error, deleting category: {}", e);
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            }
        })?;

    tracing::info!(category_id, "category deleted");
    Ok(Json(Response {
        success: true,
        message: "Category deleted".to_string(),
    }))
}
