use std::env;

const DEFAULT_WINDOW_DAYS: i64 = 30;
const MAX_WINDOW_DAYS: i64 = 3650;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_url: String,
    pub auth_token: String,
    pub user_id: Option<i64>,
    pub full_dates_window_days: i64,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            api_url: env::var("PETPAL_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:8080/api".to_string()),
            auth_token: env::var("PETPAL_TOKEN").unwrap_or_default(),
            user_id: env::var("PETPAL_USER_ID")
                .ok()
                .and_then(|v| v.parse().ok()),
            full_dates_window_days: parse_window_days(
                env::var("PETPAL_FULL_DATES_WINDOW_DAYS").ok().as_deref(),
            ),
            request_timeout_secs: env::var("PETPAL_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
        }
    }
}

/// Ten years at most; anything else falls back to the default.
fn parse_window_days(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse().ok())
        .filter(|days| (0..=MAX_WINDOW_DAYS).contains(days))
        .unwrap_or(DEFAULT_WINDOW_DAYS)
}
