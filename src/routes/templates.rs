use axum::{extract::Path, routing::get, Json, Router};
use serde::Serialize;

use crate::catalog;
use crate::error::AppError;
use crate::state::AppState;
use crate::types::template::Template;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/templates", get(list_templates))
        .route("/get_template/:template_id", get(get_template))
}

#[derive(Serialize)]
struct CatalogResponse {
    templates: &'static [Template],
    prompts: &'static [&'static str],
}

async fn list_templates() -> Json<CatalogResponse> {
    Json(CatalogResponse {
        templates: catalog::TEMPLATES,
        prompts: catalog::TEXT_PROMPTS,
    })
}

async fn get_template(Path(template_id): Path<String>) -> Result<Json<Template>, AppError> {
    template_id
        .parse::<u32>()
        .ok()
        .and_then(catalog::find)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Template not found".to_string()))
}
