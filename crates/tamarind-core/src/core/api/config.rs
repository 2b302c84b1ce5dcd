use super::ApiError;
use std::time::Duration;

pub const API_KEY_ENV: &str = "TAMARIND_API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://app.tamarind.bio/api/";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Proxies applied to result archive downloads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    pub http: Option<String>,
    pub https: Option<String>,
}

impl ProxyConfig {
    /// Reads `http_proxy` and `https_proxy`, ignoring empty values.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            http: read("http_proxy"),
            https: read("https_proxy"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.http.is_none() && self.https.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub proxy: ProxyConfig,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            proxy: ProxyConfig::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Builds a configuration from an explicit key or `TAMARIND_API_KEY`, with proxies
    /// taken from the environment.
    pub fn from_env(api_key: Option<String>) -> Result<Self, ApiError> {
        let key = api_key
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or(ApiError::MissingApiKey)?;
        Ok(Self::new(key).with_proxy(ProxyConfig::from_env()))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut url = base_url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        self.base_url = url;
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_lookup_ignores_blank_values() {
        let proxy = ProxyConfig::from_lookup(|key| match key {
            "http_proxy" => Some("http://proxy:3128".to_string()),
            "https_proxy" => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(proxy.http.as_deref(), Some("http://proxy:3128"));
        assert_eq!(proxy.https, None);
        assert!(!proxy.is_empty());
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let config = ClientConfig::new("k").with_base_url("http://localhost:9000/api");
        assert_eq!(config.endpoint("jobs"), "http://localhost:9000/api/jobs");
    }

    #[test]
    fn explicit_api_key_wins() {
        let config = ClientConfig::from_env(Some("explicit".into())).unwrap();
        assert_eq!(config.api_key, "explicit");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn blank_explicit_key_is_rejected() {
        let result = ClientConfig::from_env(Some("   ".into()));
        assert!(matches!(result, Err(ApiError::MissingApiKey)));
    }
}
