//! services/dashboard/src/bin/openapi.rs
//!
//! Dumps the OpenAPI document for the dashboard's REST surface (signup,
//! health and guidance tables). The `/ws` dashboard socket is not described
//! there; its messages live in `web::protocol`.
//!
//! Usage: `openapi [OUTPUT]`, defaulting to `openapi.json`.

use dashboard_lib::web::rest::ApiDoc;
use std::path::PathBuf;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("openapi.json"));

    let document = ApiDoc::openapi().to_pretty_json()?;
    std::fs::write(&output, document)?;
    println!("Wrote the dashboard API description to {}", output.display());
    Ok(())
}
