use std::path::PathBuf;

use reelsmith::icons;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelsmith=info,generate_icons=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("assets/web/icons"));

    match icons::write_icon_set(&out_dir) {
        Ok(paths) => tracing::info!("Wrote {} icons to {}", paths.len(), out_dir.display()),
        Err(err) => {
            tracing::error!("Icon generation failed: {}", err);
            std::process::exit(1);
        }
    }
}
