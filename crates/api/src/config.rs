/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Leaderboard API base URL.
    pub leaderboard_url: String,
    /// Gateway discovery base URL; `None` disables warm/cold enrichment.
    pub discovery_url: Option<String>,
    /// Seconds between background dashboard refreshes (default: `60`).
    pub refresh_interval_secs: u64,
    /// Timeout for each upstream HTTP request in seconds (default: `30`).
    pub upstream_timeout_secs: u64,
}

/// Default leaderboard API.
pub const DEFAULT_LEADERBOARD_URL: &str = "https://leaderboard-api.livepeer.cloud";

/// Default gateway serving orchestrator discovery.
pub const DEFAULT_DISCOVERY_URL: &str = "https://dream-gateway.livepeer.cloud";

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                                  |
    /// |-------------------------|------------------------------------------|
    /// | `HOST`                  | `0.0.0.0`                                |
    /// | `PORT`                  | `3000`                                   |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`                  |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                                     |
    /// | `LEADERBOARD_API_URL`   | `https://leaderboard-api.livepeer.cloud` |
    /// | `DISCOVERY_API_URL`     | `https://dream-gateway.livepeer.cloud`   |
    /// | `REFRESH_INTERVAL_SECS` | `60`                                     |
    /// | `UPSTREAM_TIMEOUT_SECS` | `30`                                     |
    ///
    /// Set `DISCOVERY_API_URL` to an empty string to disable discovery.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let leaderboard_url = std::env::var("LEADERBOARD_API_URL")
            .unwrap_or_else(|_| DEFAULT_LEADERBOARD_URL.into());

        let discovery_url = parse_optional_url(
            std::env::var("DISCOVERY_API_URL").unwrap_or_else(|_| DEFAULT_DISCOVERY_URL.into()),
        );

        let refresh_interval_secs: u64 = std::env::var("REFRESH_INTERVAL_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("REFRESH_INTERVAL_SECS must be a valid u64");
        assert!(refresh_interval_secs > 0, "REFRESH_INTERVAL_SECS must be positive");

        let upstream_timeout_secs: u64 = std::env::var("UPSTREAM_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("UPSTREAM_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            leaderboard_url,
            discovery_url,
            refresh_interval_secs,
            upstream_timeout_secs,
        }
    }
}

/// Treat a blank value as "not configured".
fn parse_optional_url(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_discovery_url_disables_discovery() {
        assert_eq!(parse_optional_url(String::new()), None);
        assert_eq!(parse_optional_url("   ".into()), None);
    }

    #[test]
    fn discovery_url_is_trimmed() {
        assert_eq!(
            parse_optional_url(" https://gateway.example ".into()),
            Some("https://gateway.example".to_string())
        );
    }
}
