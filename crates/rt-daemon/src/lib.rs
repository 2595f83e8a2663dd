//! # rt-daemon
//!
//! HTTP surface of the Residency Tracker.
//!
//! The router maps JSON routes onto the synchronous [`Tracker`]. Each request
//! identifies its caller with the `x-user-id` header; a missing or unknown id
//! is answered with 401. Domain errors keep the status the tracker assigns
//! them (400, 403, 404), everything else is a 500.

pub mod api;
pub mod response;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use rt_progress::Tracker;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<Tracker>,
}

impl AppState {
    pub fn new(tracker: Tracker) -> Self {
        Self {
            tracker: Arc::new(tracker),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/api/me", get(api::me))
        // Directory
        .route("/api/users", get(api::list_users).post(api::register_user))
        .route("/api/users/{id}/initialize", post(api::initialize))
        .route("/api/users/{id}/progress", get(api::user_progress))
        .route("/api/users/{id}/report", get(api::report))
        // Catalog
        .route("/api/curriculum/{track}", get(api::curriculum))
        // Progress workflow
        .route("/api/progress/{id}", get(api::get_progress))
        .route(
            "/api/progress/{id}/activities/{index}/complete",
            post(api::complete_activity),
        )
        .route(
            "/api/progress/{id}/activities/{index}/validate",
            post(api::validate_activity),
        )
        .route(
            "/api/progress/{id}/activities/{index}/reject",
            post(api::reject_activity),
        )
        .route("/api/progress/{id}/state", put(api::set_state))
        // Inbox
        .route("/api/notifications", get(api::inbox))
        .route("/api/notifications/unread-count", get(api::unread_count))
        .route("/api/notifications/read-all", post(api::mark_all_read))
        .route("/api/notifications/{id}/read", post(api::mark_read))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the tracker until Ctrl-C.
pub async fn serve(tracker: Tracker, bind: &str) -> anyhow::Result<()> {
    let app = create_router(AppState::new(tracker));
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("Residency Tracker listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    tracing::info!("Residency Tracker shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use rt_curriculum::{Activity, ActivityKind, Curriculum, Phase, Track};
    use rt_directory::{Role, User};
    use rt_progress::TrackerConfig;
    use serde_json::{json, Value};
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::response::CALLER_HEADER;

    struct Harness {
        _dir: TempDir,
        app: Router,
        admin: User,
        tutor: User,
        resident: User,
    }

    fn harness() -> Harness {
        let dir = tempdir().unwrap();
        let tracker = Tracker::open(TrackerConfig::for_project(dir.path())).unwrap();
        tracker
            .curriculum()
            .save(
                &Curriculum::new(Track::Residency)
                    .with_phase(
                        Phase::new(1, "Theory")
                            .with_activity(Activity::new("Course", ActivityKind::Theoretical, 1)),
                    )
                    .with_phase(
                        Phase::new(2, "Dry lab")
                            .with_activity(Activity::new("Simulator", ActivityKind::Practical, 1)),
                    ),
            )
            .unwrap();

        let admin = User::new("Root", "root@rt.org", Role::Administrator);
        let tutor = User::new("Gil", "gil@lapaz.es", Role::Tutor)
            .with_hospital("La Paz", "urology", "centro");
        let resident = User::new("Ana", "ana@lapaz.es", Role::Resident)
            .with_hospital("La Paz", "urology", "centro");
        for user in [&admin, &tutor, &resident] {
            tracker.register_user(user).unwrap();
        }

        Harness {
            _dir: dir,
            app: create_router(AppState::new(tracker)),
            admin,
            tutor,
            resident,
        }
    }

    async fn call(app: &Router, method: &str, uri: &str, caller: Option<Uuid>, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(id) = caller {
            request = request.header(CALLER_HEADER, id.to_string());
        }
        let body = match body {
            Some(value) => {
                request = request.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn first_progress(h: &Harness) -> String {
        let uri = format!("/api/users/{}/progress", h.resident.id);
        let (_, body) = call(&h.app, "GET", &uri, Some(h.resident.id), None).await;
        body["data"][0]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn missing_or_unknown_caller_is_unauthorized() {
        let h = harness();
        let (status, body) = call(&h.app, "GET", "/api/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);

        let (status, _) = call(&h.app, "GET", "/api/me", Some(Uuid::new_v4()), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = call(&h.app, "GET", "/api/me", Some(h.tutor.id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Gil");
    }

    #[tokio::test]
    async fn admin_registers_trainee_with_progress() {
        let h = harness();
        let req = json!({
            "name": "Leo",
            "email": "leo@lapaz.es",
            "role": "resident",
            "hospital": "La Paz",
            "specialty": "urology",
            "zone": "centro"
        });
        let (status, body) = call(&h.app, "POST", "/api/users", Some(h.admin.id), Some(req.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["initialized"], 2);

        let (status, _) = call(&h.app, "POST", "/api/users", Some(h.tutor.id), Some(req)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn invalid_registration_is_bad_request() {
        let h = harness();
        let req = json!({"name": "Leo", "email": "not-an-email", "role": "tutor"});
        let (status, body) = call(&h.app, "POST", "/api/users", Some(h.admin.id), Some(req)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("e-mail"));
    }

    #[tokio::test]
    async fn complete_validate_and_cascade_over_http() {
        let h = harness();
        let progress_id = first_progress(&h).await;
        let base = format!("/api/progress/{}/activities/0", progress_id);

        let (status, body) = call(&h.app, "POST", &format!("{}/complete", base), Some(h.resident.id), Some(json!({"comments": "done"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["activities"][0]["state"], "completed");

        let (_, body) = call(&h.app, "GET", "/api/notifications/unread-count", Some(h.tutor.id), None).await;
        assert_eq!(body["data"], 1);

        let (status, body) = call(&h.app, "POST", &format!("{}/validate", base), Some(h.tutor.id), Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["state"], "validated");

        let uri = format!("/api/users/{}/progress", h.resident.id);
        let (_, body) = call(&h.app, "GET", &uri, Some(h.tutor.id), None).await;
        assert_eq!(body["data"][1]["state"], "active");

        let (_, body) = call(&h.app, "GET", "/api/notifications?unread=true", Some(h.resident.id), None).await;
        assert_eq!(body["data"][0]["kind"], "fase_validada");
    }

    #[tokio::test]
    async fn error_statuses_follow_the_taxonomy() {
        let h = harness();
        let progress_id = first_progress(&h).await;

        // Validating a pending activity.
        let uri = format!("/api/progress/{}/activities/0/validate", progress_id);
        let (status, _) = call(&h.app, "POST", &uri, Some(h.tutor.id), Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // A resident validating.
        let (status, _) = call(&h.app, "POST", &uri, Some(h.resident.id), Some(json!({}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // Index out of range.
        let uri = format!("/api/progress/{}/activities/5/complete", progress_id);
        let (status, _) = call(&h.app, "POST", &uri, Some(h.resident.id), Some(json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // Unknown record.
        let uri = format!("/api/progress/{}", Uuid::new_v4());
        let (status, body) = call(&h.app, "GET", &uri, Some(h.admin.id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn unparsable_requests_keep_the_envelope() {
        let h = harness();

        let (status, body) = call(&h.app, "GET", "/api/progress/not-a-uuid", Some(h.admin.id), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());

        let progress_id = first_progress(&h).await;
        let uri = format!("/api/progress/{}/state", progress_id);
        let (status, body) = call(&h.app, "PUT", &uri, Some(h.admin.id), Some(json!({"state": "finished"}))).await;
        assert!(status.is_client_error());
        assert_eq!(body["success"], false);

        let (status, body) = call(&h.app, "GET", "/api/notifications?unread=maybe", Some(h.resident.id), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn admin_state_override() {
        let h = harness();
        let progress_id = first_progress(&h).await;
        let uri = format!("/api/progress/{}/state", progress_id);

        let (status, body) = call(&h.app, "PUT", &uri, Some(h.admin.id), Some(json!({"state": "active"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("already"));

        let (status, _) = call(&h.app, "PUT", &uri, Some(h.tutor.id), Some(json!({"state": "completed"}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn rejection_reaches_the_resident_inbox() {
        let h = harness();
        let progress_id = first_progress(&h).await;
        let base = format!("/api/progress/{}/activities/0", progress_id);
        call(&h.app, "POST", &format!("{}/complete", base), Some(h.resident.id), Some(json!({}))).await;

        let (status, body) = call(&h.app, "POST", &format!("{}/reject", base), Some(h.tutor.id), Some(json!({"comments": "missing log"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["activities"][0]["state"], "rejected");
        assert_eq!(body["data"]["state"], "active");

        let (_, body) = call(&h.app, "GET", "/api/notifications", Some(h.resident.id), None).await;
        let notice = &body["data"][0];
        assert_eq!(notice["kind"], "rechazo");

        let uri = format!("/api/notifications/{}/read", notice["id"].as_str().unwrap());
        let (status, body) = call(&h.app, "POST", &uri, Some(h.resident.id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], true);

        let (status, _) = call(&h.app, "POST", &uri, Some(h.tutor.id), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn report_and_curriculum() {
        let h = harness();
        let uri = format!("/api/users/{}/report", h.resident.id);
        let (status, body) = call(&h.app, "GET", &uri, Some(h.resident.id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total_activities"], 2);
        assert_eq!(body["data"]["certificate_eligible"], false);

        let (status, body) = call(&h.app, "GET", "/api/curriculum/residency", Some(h.resident.id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
    }
}
