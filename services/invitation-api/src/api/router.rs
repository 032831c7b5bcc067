use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Request},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};
use uuid::Uuid;

use super::handlers;
use super::ApiState;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
const MUSIC_MOUNT: &str = "/music";

pub fn create_router(state: Arc<ApiState>) -> Router {
    let music_files = Router::new()
        .nest_service(MUSIC_MOUNT, ServeDir::new(state.music.root()))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            require_music_tenant,
        ));
    let timeout = state.config.request_timeout();
    let enable_cors = state.config.enable_cors;

    let router = Router::new()
        .route("/api/tenant/validate", get(handlers::validate_tenant))
        .route("/api/tenant/resolve", get(handlers::resolve_tenant_path))
        .route("/api/config", get(handlers::get_wedding_config))
        .route("/api/countdown", get(handlers::get_countdown))
        .route(
            "/api/guests",
            get(handlers::list_guests).post(handlers::create_guest),
        )
        .route("/api/guests/:guest_id", get(handlers::get_guest))
        .route("/api/rsvp", post(handlers::submit_rsvp))
        .route(
            "/api/gallery",
            get(handlers::list_gallery).post(handlers::create_photo),
        )
        .route("/api/music", get(handlers::list_music))
        .route(
            "/api/preferences/:key",
            get(handlers::get_preference)
                .put(handlers::put_preference)
                .delete(handlers::delete_preference),
        )
        .route(
            "/api/tenants",
            post(handlers::create_tenant).get(handlers::list_tenants),
        )
        .route(
            "/api/tenants/:slug",
            get(handlers::get_tenant).put(handlers::update_tenant),
        )
        .route("/health", get(handlers::health_check))
        .merge(music_files)
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(middleware::from_fn(set_request_id))
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Static music files are tenant-scoped like every other read: the first
/// segment under the mount must name an active tenant.
async fn require_music_tenant(
    State(state): State<Arc<ApiState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path();
    let rest = path.strip_prefix(MUSIC_MOUNT).unwrap_or(path);
    let candidate = rest
        .trim_start_matches('/')
        .split('/')
        .next()
        .filter(|segment| !segment.is_empty());

    let result = state.resolver.validate_tenant_id(candidate).await;
    match result {
        Ok(_) => next.run(request).await,
        Err(err) => handlers::tenant_error(err).into_response(),
    }
}

async fn set_request_id(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    request.extensions_mut().insert(request_id.clone());

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        request
            .headers_mut()
            .insert(REQUEST_ID_HEADER.clone(), header_value);
    }

    let mut response = next.run(request).await;

    if !response.headers().contains_key(&REQUEST_ID_HEADER) {
        if let Ok(header_value) = HeaderValue::from_str(&request_id) {
            response
                .headers_mut()
                .insert(REQUEST_ID_HEADER.clone(), header_value);
        }
    }

    response
}
