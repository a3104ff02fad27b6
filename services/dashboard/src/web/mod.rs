pub mod auth;
pub mod protocol;
pub mod rest;
pub mod state;
pub mod ws_handler;

pub use rest::{guidance_handler, health_handler};
pub use ws_handler::ws_handler;

use crate::config::ConfigError;
use crate::error::ApiError;
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::{
    routing::{get, post},
    Router,
};
use rest::ApiDoc;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Builds the complete application: REST endpoints, the dashboard socket and Swagger UI.
pub fn router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = app_state
        .config
        .allowed_origin
        .parse::<HeaderValue>()
        .map_err(|e| ConfigError::InvalidValue("ALLOWED_ORIGIN".to_string(), e.to_string()))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    let api_router = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/health", get(health_handler))
        .route("/guidance", get(guidance_handler))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use pregnancy_tracker_core::lookup::GuidanceTables;
    use pregnancy_tracker_core::MemoryDocumentStore;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn state(backend: Option<&str>) -> Arc<AppState> {
        let backend = backend.map(str::to_string);
        let config = Config::from_lookup(|key| match key {
            "STORE_BACKEND" => backend.clone(),
            _ => None,
        })
        .unwrap();
        let store = backend
            .as_deref()
            .filter(|b| *b == "memory")
            .map(|_| Arc::new(MemoryDocumentStore::new()) as Arc<dyn pregnancy_tracker_core::DocumentStore>);
        Arc::new(AppState::new(Arc::new(config), store, GuidanceTables::builtin()))
    }

    fn signup(email: &str, password: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/auth/signup")
            .header("Content-Type", "application/json")
            .body(Body::from(
                json!({ "email": email, "password": password }).to_string(),
            ))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 65536).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn signup_creates_account_once() {
        let app = router(state(Some("memory"))).unwrap();

        let response = app
            .clone()
            .oneshot(signup("Ana@Example.com", "correct horse"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["email"], "ana@example.com");
        assert!(body["identity"].as_str().is_some());

        let response = app
            .oneshot(signup("ana@example.com", "correct horse"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn signup_validates_input() {
        let app = router(state(Some("memory"))).unwrap();
        let response = app.oneshot(signup("ana@example.com", "short")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn signup_without_store_is_unavailable() {
        let app = router(state(None)).unwrap();
        let response = app
            .oneshot(signup("ana@example.com", "correct horse"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn health_reports_store_mode() {
        let app = router(state(None)).unwrap();
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "status": "ok", "store": "unconfigured" }));
    }

    #[tokio::test]
    async fn guidance_serves_lookup_tables() {
        let app = router(state(Some("memory"))).unwrap();
        let request = Request::builder().uri("/guidance").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["reminder_labels"]["2"], "Every 2 weeks");
        assert!(body["symptom_library"]["nausea"]["foods"].is_array());
    }
}
