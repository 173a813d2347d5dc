//! shardjob-api - REST API for job lifecycle management.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/api/v1/jobs?status=ready` | List job records |
//! | POST | `/api/v1/jobs?kind=simple` | Create a job |
//! | PUT | `/api/v1/jobs?kind=simple` | Replace a job (remove + create) |
//! | GET | `/api/v1/jobs/{name}` | Live configurations of a logical job |
//! | DELETE | `/api/v1/jobs/{name}` | Remove a logical job |
//! | GET | `/api/v1/jobs/{name}/brief` | Live brief status of a logical job |
//! | GET | `/healthz` | Liveness |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use shardjob_lifecycle::HandlerRegistry;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<HandlerRegistry>,
}

/// Build the complete API router.
pub fn build_router(registry: Arc<HandlerRegistry>) -> Router {
    let api_state = ApiState { registry };

    let api_routes = Router::new()
        .route(
            "/jobs",
            get(handlers::list_jobs)
                .post(handlers::create_job)
                .put(handlers::update_job),
        )
        .route("/jobs/{name}", get(handlers::get_job).delete(handlers::remove_job))
        .route("/jobs/{name}/brief", get(handlers::get_job_brief_info))
        .with_state(api_state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/healthz", get(handlers::healthz))
}
