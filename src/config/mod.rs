#[cfg(feature = "cli")]
pub mod cli;

use crate::core::fetch::ResponseOrder;
use crate::core::ConfigProvider;
use crate::utils::error::{FormError, Result};
use crate::utils::validation::{validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://64490e52b88a78a8f0fbe291.mockapi.io/api/v1/companies";
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub lookup: LookupConfig,
    #[serde(default)]
    pub debounce: DebounceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
    pub discard_stale_responses: Option<bool>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: None,
            discard_stale_responses: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebounceConfig {
    pub delay_ms: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| FormError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DIRECTORY_URL})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::LazyLock;

        static ENV_VAR: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern compiles"));

        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }
}

impl ConfigProvider for AppConfig {
    fn lookup_endpoint(&self) -> &str {
        &self.lookup.base_url
    }

    fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce.delay_ms.unwrap_or(DEFAULT_DEBOUNCE_MS))
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    fn response_order(&self) -> ResponseOrder {
        if self.lookup.discard_stale_responses.unwrap_or(false) {
            ResponseOrder::LatestRequestWins
        } else {
            ResponseOrder::LastResolvedWins
        }
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_url("lookup.base_url", &self.lookup.base_url)?;

        if let Some(timeout) = self.lookup.timeout_seconds {
            validate_range("lookup.timeout_seconds", timeout, 1, 300)?;
        }

        if let Some(delay) = self.debounce.delay_ms {
            validate_range("debounce.delay_ms", delay, 1, 60_000)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.lookup_endpoint(), DEFAULT_BASE_URL);
        assert_eq!(config.debounce_delay(), Duration::from_millis(500));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.response_order(), ResponseOrder::LastResolvedWins);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[lookup]
base_url = "https://directory.example.com/companies"
timeout_seconds = 3
discard_stale_responses = true

[debounce]
delay_ms = 250
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.lookup_endpoint(), "https://directory.example.com/companies");
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.debounce_delay(), Duration::from_millis(250));
        assert_eq!(config.response_order(), ResponseOrder::LatestRequestWins);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = AppConfig::from_toml_str("[debounce]\ndelay_ms = 100\n").unwrap();
        assert_eq!(config.lookup.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.debounce_delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("INVOICE_FORM_TEST_DIRECTORY", "https://env.example.com/companies");

        let toml_content = r#"
[lookup]
base_url = "${INVOICE_FORM_TEST_DIRECTORY}"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.lookup.base_url, "https://env.example.com/companies");

        std::env::remove_var("INVOICE_FORM_TEST_DIRECTORY");
    }

    #[test]
    fn test_config_validation() {
        let config = AppConfig::from_toml_str("[lookup]\nbase_url = \"invalid-url\"\n").unwrap();
        assert!(config.validate().is_err());

        let config = AppConfig::from_toml_str("[lookup]\ntimeout_seconds = 0\n").unwrap();
        assert!(config.validate().is_err());

        let config = AppConfig::from_toml_str("[debounce]\ndelay_ms = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml_str("[lookup\n").unwrap_err();
        assert!(matches!(err, FormError::Config { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[lookup]\nbase_url = \"http://localhost:3000/companies\"\n")
            .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.lookup_endpoint(), "http://localhost:3000/companies");
    }
}
