use std::env;
use std::time::Duration;

pub const DEFAULT_TRANSLATE_API_URL: &str = "https://libretranslate.de/translate";
pub const DEFAULT_RECOMMEND_API_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: String,
    pub translate_api_url: String,
    pub translate_api_key: Option<String>,
    pub recommend_api_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: "8080".to_string(),
            translate_api_url: DEFAULT_TRANSLATE_API_URL.to_string(),
            translate_api_key: None,
            recommend_api_url: DEFAULT_RECOMMEND_API_URL.to_string(),
            connect_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl AppConfig {
    /// Loads `.env.local` / `.env` from the crate directory and the working directory.
    /// Values already set in the environment are kept.
    pub fn load_env_files() {
        let manifest_dir = env!("CARGO_MANIFEST_DIR");
        dotenv::from_filename(format!("{}/.env.local", manifest_dir)).ok();
        dotenv::from_filename(format!("{}/.env", manifest_dir)).ok();
        dotenv::from_filename(".env.local").ok();
        dotenv::dotenv().ok();
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let read = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            host: read("HOST").unwrap_or(defaults.host),
            port: read("PORT").unwrap_or(defaults.port),
            translate_api_url: read("TRANSLATE_API_URL").unwrap_or(defaults.translate_api_url),
            translate_api_key: read("TRANSLATE_API_KEY"),
            recommend_api_url: read("RECOMMEND_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.recommend_api_url),
            connect_timeout: secs(
                "HTTP_CONNECT_TIMEOUT_SECS",
                read("HTTP_CONNECT_TIMEOUT_SECS"),
                defaults.connect_timeout,
            ),
            request_timeout: secs(
                "HTTP_TIMEOUT_SECS",
                read("HTTP_TIMEOUT_SECS"),
                defaults.request_timeout,
            ),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn secs(name: &str, raw: Option<String>, default: Duration) -> Duration {
    match raw {
        None => default,
        Some(v) => match v.parse::<u64>() {
            Ok(n) => Duration::from_secs(n),
            Err(_) => {
                log::warn!("Ignoring invalid {}={:?}, using {:?}", name, v, default);
                default
            }
        },
    }
}
