use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub max_file_size: usize,
    pub upload_dir: PathBuf,
    pub static_dir: PathBuf,
    pub openai_api_key: Option<String>,
    pub replicate_api_key: Option<String>,
    pub openai_base_url: String,
    pub replicate_base_url: String,
    pub poll_interval: Duration,
    pub poll_timeout: Duration,
    pub session_ttl: Duration,
    pub video_fps: u32,
    pub ffmpeg_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            max_file_size: 50 * 1024 * 1024,
            upload_dir: PathBuf::from("uploads"),
            static_dir: PathBuf::from("assets/web"),
            openai_api_key: None,
            replicate_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            replicate_base_url: "https://api.replicate.com/v1".to_string(),
            poll_interval: Duration::from_secs(10),
            poll_timeout: Duration::from_secs(300),
            session_ttl: Duration::from_secs(24 * 3600),
            video_fps: 24,
            ffmpeg_path: "ffmpeg".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let max_file_size_mb: usize = std::env::var("MAX_FILE_SIZE_MB")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(50);

        let poll_interval = parse_poll_interval(std::env::var("POLL_INTERVAL_SECONDS").ok().as_deref())
            .unwrap_or(defaults.poll_interval);

        let poll_timeout_seconds = std::env::var("POLL_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(300);

        let session_ttl_seconds = std::env::var("SESSION_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(24 * 3600);

        let video_fps = std::env::var("VIDEO_FPS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|fps: &u32| (1..=60).contains(fps))
            .unwrap_or(defaults.video_fps);

        Self {
            port,
            max_file_size: max_file_size_mb * 1024 * 1024,
            upload_dir: env_path("UPLOAD_DIR").unwrap_or(defaults.upload_dir),
            static_dir: env_path("STATIC_DIR").unwrap_or(defaults.static_dir),
            openai_api_key: env_secret("OPENAI_API_KEY"),
            replicate_api_key: env_secret("REPLICATE_API_KEY"),
            openai_base_url: std::env::var("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            replicate_base_url: std::env::var("REPLICATE_BASE_URL")
                .unwrap_or(defaults.replicate_base_url),
            poll_interval,
            poll_timeout: Duration::from_secs(poll_timeout_seconds),
            session_ttl: Duration::from_secs(session_ttl_seconds),
            video_fps,
            ffmpeg_path: std::env::var("FFMPEG_PATH").unwrap_or(defaults.ffmpeg_path),
        }
    }
}

/// Whole seconds, at least one, so polling never spins.
fn parse_poll_interval(raw: Option<&str>) -> Option<Duration> {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .map(|secs| Duration::from_secs(secs.max(1)))
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn env_secret(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.max_file_size, 50 * 1024 * 1024);
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.poll_timeout, Duration::from_secs(300));
        assert_eq!(config.video_fps, 24);
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn poll_interval_is_at_least_one_second() {
        assert_eq!(parse_poll_interval(Some("0")), Some(Duration::from_secs(1)));
        assert_eq!(parse_poll_interval(Some(" 15 ")), Some(Duration::from_secs(15)));
        assert_eq!(parse_poll_interval(Some("fast")), None);
        assert_eq!(parse_poll_interval(None), None);
    }

    #[test]
    fn blank_env_values_are_treated_as_unset() {
        std::env::set_var("REELSMITH_TEST_BLANK_SECRET", "   ");
        std::env::set_var("REELSMITH_TEST_SECRET", " sk-abc ");
        assert_eq!(env_secret("REELSMITH_TEST_BLANK_SECRET"), None);
        assert_eq!(env_secret("REELSMITH_TEST_SECRET").as_deref(), Some("sk-abc"));
        assert_eq!(env_path("REELSMITH_TEST_UNSET_PATH"), None);
    }
}
