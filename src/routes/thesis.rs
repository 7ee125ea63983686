use actix_web::{web, HttpResponse};

use crate::core::{denormalize_thesis, normalize_thesis, ThesisManager};
use crate::routes::error::ApiError;
use crate::routes::matches::AppState;

/// Configure thesis routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/thesis/default", web::get().to(default_thesis))
        .route("/thesis/normalize", web::post().to(normalize))
        .route("/thesis/{investor_id}", web::get().to(get_thesis))
        .route("/thesis/{investor_id}", web::put().to(put_thesis));
}

/// GET /api/v1/thesis/default
async fn default_thesis() -> HttpResponse {
    HttpResponse::Ok().json(denormalize_thesis(&ThesisManager::default_thesis()))
}

/// Validate and normalize raw thesis configuration without storing it
///
/// POST /api/v1/thesis/normalize
async fn normalize(raw: web::Json<serde_json::Value>) -> Result<HttpResponse, ApiError> {
    let thesis = normalize_thesis(&raw)?;
    Ok(HttpResponse::Ok().json(denormalize_thesis(&thesis)))
}

/// GET /api/v1/thesis/{investor_id}
async fn get_thesis(
    state: web::Data<AppState>,
    investor_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let thesis = state
        .store()?
        .get_thesis(&investor_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no thesis stored for {}", investor_id)))?;

    Ok(HttpResponse::Ok().json(denormalize_thesis(&thesis)))
}

/// Normalize and store an investor's thesis
///
/// PUT /api/v1/thesis/{investor_id}
async fn put_thesis(
    state: web::Data<AppState>,
    investor_id: web::Path<String>,
    raw: web::Json<serde_json::Value>,
) -> Result<HttpResponse, ApiError> {
    let store = state.store()?;
    let thesis = normalize_thesis(&raw)?;
    store.save_thesis(&investor_id, &thesis).await?;

    tracing::info!("Stored thesis for investor {}", investor_id);

    Ok(HttpResponse::Ok().json(denormalize_thesis(&thesis)))
}
