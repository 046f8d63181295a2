use axum::Router;
use mimalloc::MiMalloc;
use reelsmith::{config, pipeline::encode, routes, state};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelsmith=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from_env();
    let state = state::AppState::new(config.clone());

    if let Err(err) = state.prepare_storage().await {
        tracing::error!(
            "Cannot create upload directory {}: {}",
            config.upload_dir.display(),
            err
        );
        std::process::exit(1);
    }
    if !encode::is_ffmpeg_available(&config.ffmpeg_path) {
        tracing::warn!(
            "{} not found; template rendering will fail until it is installed",
            config.ffmpeg_path
        );
    }

    // Start session eviction task
    let sessions = state.sessions().clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(tokio::time::Duration::from_secs(300)).await; // Every 5 minutes
            sessions.evict_expired();
        }
    });

    let serve_dir = ServeDir::new(&config.static_dir)
        .not_found_service(ServeFile::new(config.static_dir.join("index.html")));

    let app = Router::new()
        .merge(routes::api_router())
        .fallback_service(serve_dir)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(axum::extract::DefaultBodyLimit::max(config.max_file_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("Failed to bind {}: {}", addr, err);
            std::process::exit(1);
        }
    };

    tracing::info!("Reelsmith listening on {}", addr);
    tracing::info!("Templates: GET http://{}/api/templates", addr);
    tracing::info!("Compose: POST http://{}/generate_video", addr);
    tracing::info!("Remote: POST http://{}/generate_sora_video", addr);

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", err);
    }
}
