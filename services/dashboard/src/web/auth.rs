//! services/dashboard/src/web/auth.rs
//!
//! Account signup. Signing in and out happens on the dashboard WebSocket, where
//! the session lives.

use crate::adapters::accounts::AccountError;
use crate::web::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use pregnancy_tracker_core::domain::Credentials;
use pregnancy_tracker_core::ports::PortError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct SignupResponse {
    pub identity: String,
    pub email: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new account
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created successfully", body = SignupResponse),
        (status = 400, description = "Invalid email or password"),
        (status = 409, description = "Email already registered"),
        (status = 503, description = "Account storage is not configured"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let accounts = state.accounts.as_ref().ok_or((
        StatusCode::SERVICE_UNAVAILABLE,
        "Account storage is not configured".to_string(),
    ))?;

    let credentials = Credentials {
        email: req.email,
        password: req.password,
    };
    let identity = accounts.register(&credentials).await.map_err(|e| match e {
        AccountError::InvalidEmail(_) | AccountError::WeakPassword => {
            (StatusCode::BAD_REQUEST, e.to_string())
        }
        AccountError::EmailTaken(_) => (StatusCode::CONFLICT, e.to_string()),
        AccountError::Port(PortError::StoreUnavailable) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Account storage is not configured".to_string(),
        ),
        other => {
            error!("Failed to create account: {:?}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create account".to_string(),
            )
        }
    })?;

    let response = SignupResponse {
        identity: identity.to_string(),
        email: credentials.email.trim().to_lowercase(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}
