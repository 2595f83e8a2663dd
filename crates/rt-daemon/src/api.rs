//! Route handlers.
//!
//! Handlers resolve the caller, call the synchronous tracker and wrap the
//! result in the response envelope. Authorization lives in the tracker.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use rt_curriculum::{Phase, Track};
use rt_directory::{Role, User};
use rt_notify::Notification;
use rt_progress::{CompletionPayload, PhaseState, Progress, ProgressReport, ReviewPayload};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::response::{ok, ApiError, ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, Caller};
use crate::AppState;

/// GET /health
pub async fn health() -> &'static str {
    "OK"
}

// === Users ===

#[derive(Debug, Deserialize)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub hospital: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub society: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Registered {
    pub user: User,
    /// Progress records created for a trainee.
    pub initialized: usize,
}

/// POST /api/users — administrators only.
pub async fn register_user(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiJson(req): ApiJson<RegisterUser>,
) -> Result<(StatusCode, Json<ApiResponse<Registered>>), ApiError> {
    state.tracker.ensure_admin(&caller)?;

    let mut user = User::new(req.name, req.email, req.role);
    user.hospital = req.hospital;
    user.specialty = req.specialty;
    user.zone = req.zone;
    user.society = req.society;

    let initialized = state.tracker.register_user(&user)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(Registered { user, initialized })),
    ))
}

/// GET /api/users
pub async fn list_users(State(state): State<AppState>, Caller(caller): Caller) -> ApiResult<Vec<User>> {
    state.tracker.ensure_admin(&caller)?;
    ok(state.tracker.users().list()?)
}

/// GET /api/me
pub async fn me(Caller(caller): Caller) -> ApiResult<User> {
    ok(caller)
}

/// POST /api/users/{id}/initialize — administrators only.
pub async fn initialize(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<usize> {
    state.tracker.ensure_admin(&caller)?;
    let user = state.tracker.caller(user_id)?;
    ok(state.tracker.initialize(&user)?)
}

/// GET /api/users/{id}/progress
pub async fn user_progress(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<Vec<Progress>> {
    ok(state.tracker.progress_for(&caller, user_id)?)
}

/// GET /api/users/{id}/report
pub async fn report(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<ProgressReport> {
    ok(state.tracker.report(&caller, user_id)?)
}

// === Curriculum ===

/// GET /api/curriculum/{track}
pub async fn curriculum(
    State(state): State<AppState>,
    Caller(_caller): Caller,
    ApiPath(track): ApiPath<Track>,
) -> ApiResult<Vec<Phase>> {
    ok(state.tracker.curriculum().phases_by_number(track)?)
}

// === Progress ===

/// GET /api/progress/{id}
pub async fn get_progress(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath(progress_id): ApiPath<Uuid>,
) -> ApiResult<Progress> {
    ok(state.tracker.progress(&caller, progress_id)?)
}

/// POST /api/progress/{id}/activities/{index}/complete
pub async fn complete_activity(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath((progress_id, index)): ApiPath<(Uuid, usize)>,
    ApiJson(payload): ApiJson<CompletionPayload>,
) -> ApiResult<Progress> {
    ok(state
        .tracker
        .mark_completed(&caller, progress_id, index, payload)?)
}

/// POST /api/progress/{id}/activities/{index}/validate
pub async fn validate_activity(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath((progress_id, index)): ApiPath<(Uuid, usize)>,
    ApiJson(review): ApiJson<ReviewPayload>,
) -> ApiResult<Progress> {
    ok(state.tracker.validate(&caller, progress_id, index, review)?)
}

/// POST /api/progress/{id}/activities/{index}/reject
pub async fn reject_activity(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath((progress_id, index)): ApiPath<(Uuid, usize)>,
    ApiJson(review): ApiJson<ReviewPayload>,
) -> ApiResult<Progress> {
    ok(state.tracker.reject(&caller, progress_id, index, review)?)
}

#[derive(Debug, Deserialize)]
pub struct SetState {
    pub state: PhaseState,
}

/// PUT /api/progress/{id}/state — administrator override.
pub async fn set_state(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath(progress_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<SetState>,
) -> ApiResult<Progress> {
    ok(state
        .tracker
        .admin_set_state(&caller, progress_id, req.state)?)
}

// === Notifications ===

#[derive(Debug, Default, Deserialize)]
pub struct InboxQuery {
    #[serde(default)]
    pub unread: bool,
}

/// GET /api/notifications?unread=true
pub async fn inbox(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiQuery(query): ApiQuery<InboxQuery>,
) -> ApiResult<Vec<Notification>> {
    ok(state.tracker.inbox(&caller, query.unread)?)
}

/// GET /api/notifications/unread-count
pub async fn unread_count(State(state): State<AppState>, Caller(caller): Caller) -> ApiResult<usize> {
    ok(state.tracker.unread_count(&caller)?)
}

/// POST /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath(notification_id): ApiPath<Uuid>,
) -> ApiResult<bool> {
    ok(state.tracker.mark_read(&caller, notification_id)?)
}

/// POST /api/notifications/read-all
pub async fn mark_all_read(State(state): State<AppState>, Caller(caller): Caller) -> ApiResult<usize> {
    ok(state.tracker.mark_all_read(&caller)?)
}
