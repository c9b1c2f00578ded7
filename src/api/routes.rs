use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_size as usize;

    // Mutations require a valid session token. Static page/user segments
    // take priority over the generic :entity capture.
    let guarded = Router::new()
        .route("/api/page/create", post(handlers::create_page))
        .route("/api/page/update/:id", put(handlers::update_page))
        .route("/api/page/delete/:id", delete(handlers::delete_page))
        .route(
            "/api/:entity/create",
            post(handlers::create_record).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/:entity/update/:id",
            put(handlers::update_record).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/:entity/delete/:id", delete(handlers::delete_record))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            handlers::require_auth,
        ));

    let mut router = Router::new()
        .merge(guarded)
        // Accounts (create applies the bootstrap rule itself)
        .route("/api/user/create", post(handlers::create_user))
        .route("/api/user/login", post(handlers::login))
        // Navigation pages
        .route("/api/page/getAll/:lang", get(handlers::menu))
        .route("/api/page/getAll", get(handlers::list_pages_raw))
        .route("/api/page/getMain", get(handlers::get_main))
        .route("/api/page/getAdditional", get(handlers::get_additional))
        .route("/api/page/getMainOne/:id", get(handlers::get_main_one))
        .route("/api/page/MainCon", get(handlers::main_leaves))
        .route("/api/page/AdditCon", get(handlers::additional_leaves))
        // Content entities
        .route("/api/:entity/getAll/:lang", get(handlers::list_localized))
        .route("/api/:entity/getAll", get(handlers::list_raw))
        .route(
            "/api/:entity/getActive/:lang",
            get(handlers::active_localized),
        )
        .route("/api/:entity/getOne", get(handlers::active_raw))
        // Uploaded files
        .route("/static/:key", get(handlers::serve_static))
        // Internal
        .route("/_internal/health", get(handlers::health));

    // Test-only routes
    if state.config.test_mode {
        tracing::warn!("Test mode enabled — purge route is available.");
        router = router.route("/admin/purge", delete(handlers::admin_purge));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
