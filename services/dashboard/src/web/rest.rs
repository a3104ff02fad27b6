//! services/dashboard/src/web/rest.rs
//!
//! Contains the Axum handlers for the read-only REST endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::auth::{SignupRequest, SignupResponse};
use crate::web::state::AppState;
use axum::{extract::State, response::Json};
use pregnancy_tracker_core::lookup::GuidanceTables;
use serde::Serialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::signup_handler,
        health_handler,
        guidance_handler,
    ),
    components(
        schemas(SignupRequest, SignupResponse, HealthResponse)
    ),
    tags(
        (name = "Pregnancy Tracker API", description = "Accounts and static guidance for the pregnancy dashboard.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    /// Which document store backs profiles: postgres, memory or unconfigured.
    store: String,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Liveness check that also reports the storage mode.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_handler(State(app_state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        store: app_state.store_label().to_string(),
    })
}

/// The static guidance tables the dashboard renders from.
#[utoipa::path(
    get,
    path = "/guidance",
    responses(
        (status = 200, description = "Trimester guidance, symptom library and reminder labels")
    )
)]
pub async fn guidance_handler(State(app_state): State<Arc<AppState>>) -> Json<GuidanceTables> {
    Json(app_state.guidance.as_ref().clone())
}
