use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use wedding_tenant_resolver::{
    validate_slug_format, ErrorKind, SlugValidationResult, TenantRecord, TenantSlug,
    TenantValidationError, ValidationReport,
};

use crate::countdown::{countdown_until, wedding_date_from_config};
use crate::music::Track;
use crate::storage::{
    NewGuest, NewPhoto, PreferenceError, PreferenceScope, RsvpSubmission, StorageError,
};

use super::types::{
    CountdownResponse, CreateGuestRequest, CreatePhotoRequest, CreateTenantRequest,
    ErrorResponse, GuestResponse, ListTenantsQuery, PhotoResponse, PreferenceQuery,
    PreferenceValue, ResolvePathQuery, RsvpRequest, TenantQuery, TenantResponse,
    UpdateTenantRequest, WeddingConfigResponse, WritePreferenceRequest,
};
use super::ApiState;

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

pub async fn health_check() -> ApiResult<Value> {
    Ok(Json(json!({
        "status": "healthy",
        "service": "invitation-api"
    })))
}

pub async fn validate_tenant(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<TenantQuery>,
) -> (StatusCode, Json<ValidationReport>) {
    let result = state
        .resolver
        .validate_tenant_id(query.tenant.as_deref())
        .await;
    report_response(&result)
}

pub async fn resolve_tenant_path(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ResolvePathQuery>,
) -> (StatusCode, Json<ValidationReport>) {
    let path = query.path.unwrap_or_default();
    let result = state.resolver.resolve_path(&path).await;
    report_response(&result)
}

pub async fn get_wedding_config(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<TenantQuery>,
) -> ApiResult<WeddingConfigResponse> {
    let slug = require_tenant(&state, query.tenant.as_deref()).await?;
    let record = load_active_tenant(&state, &slug)?;

    Ok(Json(WeddingConfigResponse {
        slug: record.slug,
        name: record.name,
        config: record.config,
    }))
}

pub async fn get_countdown(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<TenantQuery>,
) -> ApiResult<CountdownResponse> {
    let slug = require_tenant(&state, query.tenant.as_deref()).await?;
    let record = load_active_tenant(&state, &slug)?;

    let wedding_date = wedding_date_from_config(record.config.as_ref()).ok_or_else(|| {
        bad_request(
            "invalid_wedding_date",
            "tenant has no valid weddingDate configured",
        )
    })?;

    Ok(Json(CountdownResponse {
        slug: record.slug,
        wedding_date,
        countdown: countdown_until(wedding_date, Utc::now()),
    }))
}

pub async fn list_guests(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<TenantQuery>,
) -> ApiResult<Vec<GuestResponse>> {
    let slug = require_tenant(&state, query.tenant.as_deref()).await?;
    let guests = state
        .guests
        .list_guests(slug.as_str())
        .map_err(storage_error)?;

    Ok(Json(guests.into_iter().map(GuestResponse::from).collect()))
}

pub async fn get_guest(
    State(state): State<Arc<ApiState>>,
    Path(guest_id): Path<String>,
    Query(query): Query<TenantQuery>,
) -> ApiResult<GuestResponse> {
    let slug = require_tenant(&state, query.tenant.as_deref()).await?;
    let guest = state
        .guests
        .get_guest(slug.as_str(), &guest_id)
        .map_err(storage_error)?;

    match guest {
        Some(record) => Ok(Json(GuestResponse::from(record))),
        None => Err(not_found("guest_not_found", "guest not found")),
    }
}

pub async fn create_guest(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<CreateGuestRequest>,
) -> ApiResult<GuestResponse> {
    let slug = require_tenant(&state, request.tenant.as_deref()).await?;
    let guest = NewGuest {
        name: request.name,
        email: request.email.filter(|email| !email.trim().is_empty()),
        max_party_size: request.max_party_size.unwrap_or(1),
    };

    let record = state
        .guests
        .add_guest(slug.as_str(), &guest)
        .map_err(storage_error)?;

    info!(tenant = %slug, guest_id = %record.guest_id, "registered guest");
    Ok(Json(GuestResponse::from(record)))
}

pub async fn submit_rsvp(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<RsvpRequest>,
) -> ApiResult<GuestResponse> {
    let slug = require_tenant(&state, request.tenant.as_deref()).await?;
    if request.guest_id.trim().is_empty() {
        return Err(bad_request("invalid_guest_id", "guestId cannot be empty"));
    }

    let submission = RsvpSubmission {
        attending: request.attending,
        party_size: request.party_size,
        message: request.message,
    };

    let record = state
        .guests
        .submit_rsvp(slug.as_str(), &request.guest_id, &submission)
        .map_err(storage_error)?;

    Ok(Json(GuestResponse::from(record)))
}

pub async fn list_gallery(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<TenantQuery>,
) -> ApiResult<Vec<PhotoResponse>> {
    let slug = require_tenant(&state, query.tenant.as_deref()).await?;
    let photos = state
        .gallery
        .list_photos(slug.as_str())
        .map_err(storage_error)?;

    Ok(Json(photos.into_iter().map(PhotoResponse::from).collect()))
}

pub async fn create_photo(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<CreatePhotoRequest>,
) -> ApiResult<PhotoResponse> {
    let slug = require_tenant(&state, request.tenant.as_deref()).await?;
    if request.url.trim().is_empty() {
        return Err(bad_request("invalid_url", "url cannot be empty"));
    }

    let photo = NewPhoto {
        url: request.url,
        caption: request.caption,
        display_order: request.display_order,
        taken_at: request.taken_at,
    };

    let record = state
        .gallery
        .add_photo(slug.as_str(), &photo)
        .map_err(storage_error)?;

    info!(tenant = %slug, photo_id = %record.photo_id, "added gallery photo");
    Ok(Json(PhotoResponse::from(record)))
}

pub async fn list_music(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<TenantQuery>,
) -> ApiResult<Vec<Track>> {
    let slug = require_tenant(&state, query.tenant.as_deref()).await?;
    let music = state.music.clone();
    let tracks = tokio::task::spawn_blocking(move || music.list_tracks(&slug))
        .await
        .map_err(internal_error)?
        .map_err(internal_error)?;
    Ok(Json(tracks))
}

pub async fn get_preference(
    State(state): State<Arc<ApiState>>,
    Path(key): Path<String>,
    Query(query): Query<PreferenceQuery>,
) -> ApiResult<PreferenceValue> {
    let scope = preference_scope(&state, &query).await?;
    let value = state
        .preferences
        .read(&scope, &key)
        .map_err(preference_error)?;

    match value {
        Some(value) => Ok(Json(PreferenceValue { key, value })),
        None => Err(not_found("preference_not_found", "preference not set")),
    }
}

pub async fn put_preference(
    State(state): State<Arc<ApiState>>,
    Path(key): Path<String>,
    Query(query): Query<PreferenceQuery>,
    Json(request): Json<WritePreferenceRequest>,
) -> ApiResult<PreferenceValue> {
    let scope = preference_scope(&state, &query).await?;
    state
        .preferences
        .write(&scope, &key, &request.value)
        .map_err(preference_error)?;

    Ok(Json(PreferenceValue {
        key,
        value: request.value,
    }))
}

pub async fn delete_preference(
    State(state): State<Arc<ApiState>>,
    Path(key): Path<String>,
    Query(query): Query<PreferenceQuery>,
) -> ApiResult<Value> {
    let scope = preference_scope(&state, &query).await?;
    let removed = state
        .preferences
        .clear(&scope, &key)
        .map_err(preference_error)?;

    Ok(Json(json!({ "key": key, "removed": removed })))
}

pub async fn create_tenant(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<CreateTenantRequest>,
) -> ApiResult<TenantResponse> {
    let slug = validate_slug_format(Some(&request.slug)).map_err(tenant_error)?;
    if request.name.trim().is_empty() {
        return Err(bad_request("invalid_name", "name cannot be empty"));
    }

    let now = Utc::now().to_rfc3339();
    let record = TenantRecord {
        slug: slug.into_inner(),
        name: request.name.trim().to_string(),
        is_active: request.is_active.unwrap_or(true),
        config: request.config,
        created_at: now.clone(),
        updated_at: now,
    };

    state
        .tenant_registry
        .create_tenant(&record)
        .map_err(storage_error)?;
    state.invalidate_tenant(&record.slug);

    info!(tenant = %record.slug, "registered tenant");
    Ok(Json(record))
}

pub async fn list_tenants(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ListTenantsQuery>,
) -> ApiResult<Vec<TenantResponse>> {
    let tenants = state
        .tenant_registry
        .list_tenants(query.active)
        .map_err(storage_error)?;
    Ok(Json(tenants))
}

pub async fn get_tenant(
    State(state): State<Arc<ApiState>>,
    Path(slug): Path<String>,
) -> ApiResult<TenantResponse> {
    let slug = validate_slug_format(Some(&slug)).map_err(tenant_error)?;
    let tenant = state
        .tenant_registry
        .get_tenant(slug.as_str())
        .map_err(storage_error)?;

    match tenant {
        Some(record) => Ok(Json(record)),
        None => Err(not_found("tenant_not_found", "tenant not registered")),
    }
}

pub async fn update_tenant(
    State(state): State<Arc<ApiState>>,
    Path(slug): Path<String>,
    Json(request): Json<UpdateTenantRequest>,
) -> ApiResult<TenantResponse> {
    let slug = validate_slug_format(Some(&slug)).map_err(tenant_error)?;

    let status_only = request.name.is_none() && request.config.is_none();
    match (status_only, request.is_active) {
        (true, Some(is_active)) => state
            .tenant_registry
            .set_active(slug.as_str(), is_active)
            .map_err(storage_error)?,
        _ => apply_tenant_update(&state, &slug, request)?,
    }
    state.invalidate_tenant(slug.as_str());

    let record = state
        .tenant_registry
        .get_tenant(slug.as_str())
        .map_err(storage_error)?
        .ok_or_else(|| not_found("tenant_not_found", "tenant not registered"))?;

    info!(tenant = %slug, is_active = record.is_active, "updated tenant");
    Ok(Json(record))
}

fn apply_tenant_update(
    state: &ApiState,
    slug: &TenantSlug,
    request: UpdateTenantRequest,
) -> Result<(), ApiError> {
    let mut record = state
        .tenant_registry
        .get_tenant(slug.as_str())
        .map_err(storage_error)?
        .ok_or_else(|| not_found("tenant_not_found", "tenant not registered"))?;

    if let Some(name) = request.name {
        if name.trim().is_empty() {
            return Err(bad_request("invalid_name", "name cannot be empty"));
        }
        record.name = name.trim().to_string();
    }
    if let Some(is_active) = request.is_active {
        record.is_active = is_active;
    }
    if let Some(config) = request.config {
        record.config = Some(config);
    }
    record.updated_at = Utc::now().to_rfc3339();

    state
        .tenant_registry
        .update_tenant(&record)
        .map_err(storage_error)
}

async fn require_tenant(state: &ApiState, raw: Option<&str>) -> Result<TenantSlug, ApiError> {
    state
        .resolver
        .validate_tenant_id(raw)
        .await
        .map_err(tenant_error)
}

/// Re-reads the record behind a confirmed slug.
///
/// The resolver may have answered from cache, so a tenant deactivated in the
/// meantime is still reported with the generic message.
fn load_active_tenant(state: &ApiState, slug: &TenantSlug) -> Result<TenantRecord, ApiError> {
    match state
        .tenant_registry
        .get_tenant(slug.as_str())
        .map_err(storage_error)?
    {
        Some(record) if record.is_active => Ok(record),
        _ => Err(tenant_error(TenantValidationError::NotFoundOrInactive)),
    }
}

async fn preference_scope(
    state: &ApiState,
    query: &PreferenceQuery,
) -> Result<PreferenceScope, ApiError> {
    let slug = require_tenant(state, query.tenant.as_deref()).await?;
    let visitor = query.visitor.as_deref().unwrap_or_default();
    PreferenceScope::new(slug.as_str(), visitor).map_err(preference_error)
}

fn report_response(result: &SlugValidationResult) -> (StatusCode, Json<ValidationReport>) {
    let status = match result {
        Ok(_) => StatusCode::OK,
        Err(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ValidationReport::from(result)))
}

pub(crate) fn tenant_error(err: TenantValidationError) -> ApiError {
    let message = err.to_string();
    match err.kind() {
        ErrorKind::Format => bad_request("invalid_tenant", &message),
        ErrorKind::NotFoundOrInactive => bad_request("tenant_not_found", &message),
        ErrorKind::LookupInfrastructure => {
            error!(details = ?err.details(), "tenant validation machinery failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: message,
                    code: "tenant_lookup_failed".to_string(),
                    details: err.details().map(|details| json!({ "message": details })),
                }),
            )
        }
    }
}

fn storage_error(err: StorageError) -> ApiError {
    match err {
        StorageError::GuestNotFound(_) => not_found("guest_not_found", "guest not found"),
        StorageError::TenantNotFound(_) => not_found("tenant_not_found", "tenant not registered"),
        StorageError::TenantExists(slug) => conflict(
            "tenant_exists",
            &format!("tenant '{slug}' is already registered"),
        ),
        StorageError::InvalidRsvp(message) => bad_request("invalid_request", &message),
        StorageError::InvalidGuest(message) => bad_request("invalid_guest", &message),
        other => internal_error(other),
    }
}

fn preference_error(err: PreferenceError) -> ApiError {
    match err {
        PreferenceError::InvalidKey(_) => bad_request("invalid_key", &err.to_string()),
        PreferenceError::InvalidVisitor(_) => bad_request("invalid_visitor", &err.to_string()),
        PreferenceError::Storage(inner) => {
            warn!(error = %inner, "preference store failed");
            internal_error(inner)
        }
    }
}

fn bad_request(code: &str, message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
            code: code.to_string(),
            details: None,
        }),
    )
}

fn not_found(code: &str, message: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: message.to_string(),
            code: code.to_string(),
            details: None,
        }),
    )
}

fn conflict(code: &str, message: &str) -> ApiError {
    (
        StatusCode::CONFLICT,
        Json(ErrorResponse {
            error: message.to_string(),
            code: code.to_string(),
            details: None,
        }),
    )
}

fn internal_error<E: std::fmt::Display>(err: E) -> ApiError {
    error!(error = %err, "internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "internal server error".to_string(),
            code: "internal_error".to_string(),
            details: Some(json!({ "message": err.to_string() })),
        }),
    )
}
