use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_TIMEOUT_MS: u64 = 60_000;

/// Process-level settings. DATABASE_URL, JWT_SECRET and CATALOG_PATH are
/// read where they are used; everything routed through here has a usable
/// default.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub generation: GenerationSettings,
}

/// Connection settings for the generateContent backend. A missing api_key
/// degrades generation to placeholder descriptions rather than failing.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub api_endpoint: String,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env_string("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let host = env_string("HOST")
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        let log_level = env_string("RUST_LOG").unwrap_or_else(|| "info".to_string());

        Self {
            host,
            port,
            log_level,
            generation: GenerationSettings::from_env(),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl GenerationSettings {
    pub fn from_env() -> Self {
        let api_key = env_string("GEMINI_API_KEY");
        let model = env_string("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        let api_endpoint = env_string("GEMINI_API_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_GEMINI_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();
        let timeout = Duration::from_millis(
            env_string("GEMINI_TIMEOUT")
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(DEFAULT_GEMINI_TIMEOUT_MS),
        );

        Self {
            api_key,
            model,
            api_endpoint,
            timeout,
        }
    }
}

/// Env var as a string, with empty and whitespace-only values treated as
/// unset.
pub fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
