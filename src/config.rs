use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Route suffixes tried against the base URL, most specific first.
pub const ENDPOINT_ROUTES: [&str; 4] = ["/generate", "/api/chat", "/chat", "/api/generate"];

/// Runtime configuration, read from the environment.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub request_timeout: Duration,
    pub data_dir: PathBuf,
}

impl Config {
    /// Build the configuration from `FINCHAT_*` variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let api_url = env::var("FINCHAT_API_URL")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let timeout_secs = env_parse("FINCHAT_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);
        let data_dir = env::var("FINCHAT_DATA_DIR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        Self {
            api_url,
            request_timeout: Duration::from_secs(timeout_secs),
            data_dir,
        }
    }

    pub fn endpoints(&self) -> Vec<String> {
        endpoints_for(&self.api_url)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            data_dir: default_data_dir(),
        }
    }
}

pub fn endpoints_for(base: &str) -> Vec<String> {
    let base = base.trim_end_matches('/');
    ENDPOINT_ROUTES
        .iter()
        .map(|route| format!("{base}{route}"))
        .collect()
}

pub fn default_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        return data_dir.join("finchat").join("storage");
    }
    PathBuf::from("cache").join("storage")
}

pub fn env_flag(key: &str) -> bool {
    matches!(
        env::var(key)
            .unwrap_or_else(|_| "false".into())
            .to_ascii_lowercase()
            .as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_keep_route_order() {
        assert_eq!(
            endpoints_for("http://localhost:8000"),
            vec![
                "http://localhost:8000/generate",
                "http://localhost:8000/api/chat",
                "http://localhost:8000/chat",
                "http://localhost:8000/api/generate",
            ]
        );
    }

    #[test]
    fn endpoints_strip_trailing_slash() {
        let urls = endpoints_for("https://api.example.com/");
        assert_eq!(urls[0], "https://api.example.com/generate");
    }

    #[test]
    fn default_points_at_localhost() {
        let config = Config::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.endpoints().len(), 4);
    }
}
