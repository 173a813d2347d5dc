//! REST API handlers.
//!
//! Each handler routes to the lifecycle handler owning the job family and
//! returns JSON responses in a `{success, data, error}` envelope.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use shardjob_core::{HandlerKind, JobInfo, JobStatus};
use shardjob_lifecycle::LifecycleError;
use shardjob_scheduler::SchedulerError;

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> Response {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
        .into_response()
}

/// Map a lifecycle failure onto an HTTP status.
fn lifecycle_error(e: &LifecycleError) -> Response {
    let status = match e {
        LifecycleError::InvalidArgument(_)
        | LifecycleError::InvalidJob(_)
        | LifecycleError::UnsupportedHandler(_) => StatusCode::BAD_REQUEST,
        LifecycleError::DuplicateJob(_) => StatusCode::CONFLICT,
        LifecycleError::Scheduler(SchedulerError::NotFound(_)) => StatusCode::NOT_FOUND,
        LifecycleError::Scheduler(SchedulerError::AlreadyRegistered(_)) => StatusCode::CONFLICT,
        LifecycleError::Scheduler(
            SchedulerError::InvalidCron { .. } | SchedulerError::InvalidConfiguration(_),
        ) => StatusCode::BAD_REQUEST,
        LifecycleError::Scheduler(SchedulerError::Coordinator(_)) | LifecycleError::State(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error_response(&e.to_string(), status)
}

/// Optional `?kind=` selector for the owning job family.
#[derive(Debug, Default, serde::Deserialize)]
pub struct KindQuery {
    pub kind: Option<String>,
}

impl KindQuery {
    fn parse(&self) -> Result<Option<HandlerKind>, Response> {
        self.kind
            .as_deref()
            .map(str::parse::<HandlerKind>)
            .transpose()
            .map_err(|e| error_response(&e.to_string(), StatusCode::BAD_REQUEST))
    }
}

/// Optional `?status=` filter for record listings.
#[derive(Debug, Default, serde::Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

// ── Records ────────────────────────────────────────────────────

/// GET /api/v1/jobs
pub async fn list_jobs(
    State(state): State<ApiState>,
    Query(query): Query<StatusQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref().map(str::parse::<JobStatus>).transpose() {
        Ok(status) => status,
        Err(e) => return error_response(&e.to_string(), StatusCode::BAD_REQUEST),
    };
    match state.registry.list_records(status).await {
        Ok(records) => ApiResponse::ok(records).into_response(),
        Err(e) => lifecycle_error(&e),
    }
}

// ── Lifecycle ──────────────────────────────────────────────────

/// POST /api/v1/jobs
pub async fn create_job(
    State(state): State<ApiState>,
    Query(query): Query<KindQuery>,
    Json(job): Json<JobInfo>,
) -> impl IntoResponse {
    let kind = match query.parse() {
        Ok(kind) => kind.unwrap_or_default(),
        Err(resp) => return resp,
    };
    let handler = match state.registry.route(kind) {
        Ok(handler) => handler,
        Err(e) => return lifecycle_error(&e),
    };
    let original_job_name = job.original_job_name.clone();
    match handler.create_job(job).await {
        Ok(()) => (StatusCode::CREATED, ApiResponse::ok(original_job_name)).into_response(),
        Err(e) => lifecycle_error(&e),
    }
}

/// PUT /api/v1/jobs
///
/// Without `?kind=` the family owning the logical job handles the update.
pub async fn update_job(
    State(state): State<ApiState>,
    Query(query): Query<KindQuery>,
    Json(job): Json<JobInfo>,
) -> impl IntoResponse {
    let routed = match query.parse() {
        Ok(Some(kind)) => state.registry.route(kind),
        Ok(None) => state.registry.route_name(&job.original_job_name).await,
        Err(resp) => return resp,
    };
    let handler = match routed {
        Ok(handler) => handler,
        Err(e) => return lifecycle_error(&e),
    };
    let original_job_name = job.original_job_name.clone();
    match handler.update_job(job).await {
        Ok(()) => ApiResponse::ok(original_job_name).into_response(),
        Err(e) => lifecycle_error(&e),
    }
}

/// DELETE /api/v1/jobs/{name}
pub async fn remove_job(State(state): State<ApiState>, Path(name): Path<String>) -> impl IntoResponse {
    let handler = match state.registry.route_name(&name).await {
        Ok(handler) => handler,
        Err(e) => return lifecycle_error(&e),
    };
    debug!(original_job_name = %name, kind = %handler.kind(), "remove routed");
    match handler.remove_job(&name).await {
        Ok(()) => ApiResponse::ok("removed").into_response(),
        Err(e) => lifecycle_error(&e),
    }
}

// ── Queries ────────────────────────────────────────────────────

/// GET /api/v1/jobs/{name}
pub async fn get_job(State(state): State<ApiState>, Path(name): Path<String>) -> impl IntoResponse {
    let handler = match state.registry.route_name(&name).await {
        Ok(handler) => handler,
        Err(e) => return lifecycle_error(&e),
    };
    match handler.get_job(&name).await {
        Ok(Some(configs)) => ApiResponse::ok(configs).into_response(),
        Ok(None) => error_response("job not found", StatusCode::NOT_FOUND),
        Err(e) => lifecycle_error(&e),
    }
}

/// GET /api/v1/jobs/{name}/brief
pub async fn get_job_brief_info(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let handler = match state.registry.route_name(&name).await {
        Ok(handler) => handler,
        Err(e) => return lifecycle_error(&e),
    };
    match handler.get_job_brief_info(&name).await {
        Ok(briefs) => ApiResponse::ok(briefs).into_response(),
        Err(e) => lifecycle_error(&e),
    }
}

/// GET /healthz
pub async fn healthz() -> impl IntoResponse {
    ApiResponse::ok("ok")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use shardjob_core::ShardjobConfig;
    use shardjob_lifecycle::HandlerRegistry;
    use shardjob_scheduler::LocalCoordinator;
    use shardjob_state::RecordStore;

    fn test_state() -> ApiState {
        let registry = HandlerRegistry::from_config(
            &ShardjobConfig::default(),
            Arc::new(RecordStore::open_in_memory().unwrap()),
            Arc::new(LocalCoordinator::new()),
        );
        ApiState {
            registry: Arc::new(registry),
        }
    }

    fn test_job(original: &str, name: &str) -> JobInfo {
        JobInfo::new(original, name, "0 0 * * *", 2)
    }

    fn kind(kind: Option<&str>) -> Query<KindQuery> {
        Query(KindQuery {
            kind: kind.map(str::to_string),
        })
    }

    fn status(status: Option<&str>) -> Query<StatusQuery> {
        Query(StatusQuery {
            status: status.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn list_jobs_empty() {
        let state = test_state();
        let resp = list_jobs(State(state), status(None)).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn list_jobs_rejects_unknown_status() {
        let state = test_state();
        let resp = list_jobs(State(state), status(Some("paused"))).await.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_and_get_job() {
        let state = test_state();
        let resp = create_job(State(state.clone()), kind(None), Json(test_job("billing", "billing-v1")))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = get_job(State(state), Path("billing".to_string())).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn duplicate_create_conflicts() {
        let state = test_state();
        create_job(State(state.clone()), kind(None), Json(test_job("billing", "billing-v1"))).await;
        let resp = create_job(State(state), kind(None), Json(test_job("billing", "billing-v2")))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn create_with_unknown_kind_is_bad_request() {
        let state = test_state();
        let resp = create_job(State(state), kind(Some("batch")), Json(test_job("billing", "billing-v1")))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_with_bad_cron_is_bad_request() {
        let state = test_state();
        let mut job = test_job("billing", "billing-v1");
        job.cron = "sometimes".to_string();
        let resp = create_job(State(state), kind(None), Json(job)).await.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_routes_to_owning_family() {
        let state = test_state();
        create_job(State(state.clone()), kind(Some("script")), Json(test_job("etl", "etl-v1"))).await;

        let resp = update_job(State(state.clone()), kind(None), Json(test_job("etl", "etl-v2")))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let ready = state.registry.list_records(Some(JobStatus::Ready)).await.unwrap();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].job_name, "etl-v2");
        assert_eq!(ready[0].invoke_service_class, Some(HandlerKind::Script));
    }

    #[tokio::test]
    async fn remove_nonexistent_is_ok() {
        let state = test_state();
        let resp = remove_job(State(state), Path("ghost".to_string())).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn brief_info_for_unknown_job_is_empty_ok() {
        let state = test_state();
        let resp = get_job_brief_info(State(state), Path("ghost".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test]
    fn lifecycle_errors_map_to_statuses() {
        let cases = [
            (LifecycleError::InvalidArgument("x".into()), StatusCode::BAD_REQUEST),
            (LifecycleError::DuplicateJob("x".into()), StatusCode::CONFLICT),
            (
                LifecycleError::Scheduler(SchedulerError::NotFound("x".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                LifecycleError::Scheduler(SchedulerError::Coordinator("x".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(lifecycle_error(&error).status(), expected);
        }
    }
}
