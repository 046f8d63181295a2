pub mod generate;
pub mod health;
pub mod media;
pub mod remote;
pub mod settings;
pub mod templates;

use axum::Router;

use crate::state::AppState;

/// Every API route, without static files or middleware.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(templates::router())
        .merge(generate::router())
        .merge(remote::router())
        .merge(media::router())
        .merge(settings::router())
}
