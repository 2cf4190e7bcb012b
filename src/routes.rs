use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    AppState,
    handler::{
        auth::{auth_handler, logout},
        category::category_handler,
        dashboard::get_dashboard,
        message::message_handler,
        public,
        setting::setting_handler,
        tour::tour_handler,
        upload::upload_handler,
    },
    middleware::{auth, rate_limit},
};

pub fn create_router(app_state: AppState) -> Router {
    // Everything under /api/admin except /login requires a valid token.
    let admin_route = Router::new()
        .nest("/tours", tour_handler())
        .nest("/categories", category_handler())
        .nest("/messages", message_handler())
        .nest("/settings", setting_handler())
        .route("/dashboard", get(get_dashboard))
        .route("/logout", post(logout))
        .layer(middleware::from_fn_with_state(app_state.clone(), auth))
        .merge(auth_handler());

    let public_route = Router::new()
        .route("/tours", get(public::get_tours))
        .route("/tours/{slug}", get(public::get_tour_by_slug))
        .route("/categories", get(public::get_categories))
        .route("/contact", post(public::submit_contact));

    let api_route = Router::new()
        .nest("/admin", admin_route)
        .nest(
            "/upload",
            upload_handler().layer(middleware::from_fn_with_state(app_state.clone(), auth)),
        )
        .merge(public_route)
        // Layers run outside-in: trace, then IP extraction (the limiter and
        // the login/contact handlers all extract ClientIp), then the
        // per-IP quota.
        .layer(middleware::from_fn_with_state(app_state.clone(), rate_limit))
        .layer(app_state.ip_extraction.clone().into_extension())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state.clone());

    Router::new()
        .nest("/api", api_route)
        .nest_service("/uploads", ServeDir::new(&app_state.env.upload_dir))
}
