use crate::adapters::http::DEFAULT_USER_AGENT;
use crate::config::{
    DEFAULT_DELAY_MS, DEFAULT_LISTING_ENDPOINT, DEFAULT_OUTPUT_FILE, DEFAULT_QUERY_TEMPLATE,
    DEFAULT_TIMEOUT_SECS,
};
use crate::domain::model::{DEFAULT_EMPLOYER, DEFAULT_LOCATION};
use crate::domain::ports::{ConfigProvider, SearchProviderKind};
use crate::utils::error::{LeadError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]+)\}").unwrap_or_else(|e| panic!("invalid env var pattern: {e}"))
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub enrich: EnrichConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    pub user_agent: Option<String>,
    pub timeout_seconds: Option<u64>,
    /// Query string of the listing search, e.g. `Keywords = "Worship"`.
    #[serde(default = "default_parameters")]
    pub parameters: BTreeMap<String, String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            user_agent: None,
            timeout_seconds: None,
            parameters: default_parameters(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_LISTING_ENDPOINT.to_string()
}

fn default_parameters() -> BTreeMap<String, String> {
    [
        ("Keywords", crate::config::DEFAULT_KEYWORDS.to_string()),
        ("Location", crate::config::DEFAULT_SEARCH_LOCATION.to_string()),
        ("Radius", crate::config::DEFAULT_RADIUS.to_string()),
        ("Sort", crate::config::DEFAULT_SORT.to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub provider: SearchProviderKind,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub query_template: Option<String>,
}

impl fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field("provider", &self.provider)
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("query_template", &self.query_template)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichConfig {
    pub delay_ms: Option<u64>,
    pub max_listings: Option<usize>,
    pub fallback_employer: Option<String>,
    pub fallback_location: Option<String>,
    #[serde(default)]
    pub email_denylist: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parses TOML after replacing `${VAR}` with environment values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| LeadError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Unset variables are left as written.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_format(&self) -> LogFormat {
        self.monitoring
            .as_ref()
            .map(|m| m.log_format)
            .unwrap_or_default()
    }
}

impl ConfigProvider for TomlConfig {
    fn listing_endpoint(&self) -> &str {
        &self.source.endpoint
    }

    fn listing_params(&self) -> Vec<(String, String)> {
        self.source
            .parameters
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn user_agent(&self) -> &str {
        self.source.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    fn listing_delay(&self) -> Duration {
        Duration::from_millis(self.enrich.delay_ms.unwrap_or(DEFAULT_DELAY_MS))
    }

    fn max_listings(&self) -> Option<usize> {
        self.enrich.max_listings
    }

    fn search_provider(&self) -> SearchProviderKind {
        self.search.provider
    }

    fn search_endpoint(&self) -> Option<&str> {
        self.search.endpoint.as_deref()
    }

    fn search_api_key(&self) -> Option<&str> {
        self.search.api_key.as_deref()
    }

    fn query_template(&self) -> &str {
        self.search
            .query_template
            .as_deref()
            .unwrap_or(DEFAULT_QUERY_TEMPLATE)
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_file(&self) -> &str {
        self.load.filename.as_deref().unwrap_or(DEFAULT_OUTPUT_FILE)
    }

    fn fallback_employer(&self) -> &str {
        self.enrich
            .fallback_employer
            .as_deref()
            .unwrap_or(DEFAULT_EMPLOYER)
    }

    fn fallback_location(&self) -> &str {
        self.enrich
            .fallback_location
            .as_deref()
            .unwrap_or(DEFAULT_LOCATION)
    }

    fn extra_email_denylist(&self) -> &[String] {
        &self.enrich.email_denylist
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("source.endpoint", &self.source.endpoint)?;
        if let Some(endpoint) = &self.search.endpoint {
            validation::validate_url("search.endpoint", endpoint)?;
        }
        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_file_name("load.filename", self.output_file())?;
        if let Some(timeout) = self.source.timeout_seconds {
            validation::validate_range("source.timeout_seconds", timeout, 1, 300)?;
        }
        if let Some(max) = self.enrich.max_listings {
            validation::validate_positive_number("enrich.max_listings", max, 1)?;
        }
        validation::validate_non_empty_string("search.query_template", self.query_template())?;

        if self.search.provider == SearchProviderKind::Tavily {
            let key = validation::validate_required_field("search.api_key", &self.search.api_key)?;
            // Left untouched by substitution when the variable is unset.
            if key.starts_with("${") {
                return Err(LeadError::MissingConfigError {
                    field: "search.api_key".to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[pipeline]
name = "nyc-worship"

[load]
output_path = "./output"
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = TomlConfig::from_toml_str(MINIMAL).unwrap();

        assert_eq!(config.pipeline.name, "nyc-worship");
        assert_eq!(config.listing_endpoint(), DEFAULT_LISTING_ENDPOINT);
        assert_eq!(config.source.parameters.get("Keywords").unwrap(), "Worship");
        assert_eq!(config.source.parameters.get("Radius").unwrap(), "50");
        assert_eq!(config.output_file(), DEFAULT_OUTPUT_FILE);
        assert_eq!(config.search_provider(), SearchProviderKind::Duckduckgo);
        assert_eq!(config.user_agent(), DEFAULT_USER_AGENT);
        assert_eq!(config.fallback_employer(), DEFAULT_EMPLOYER);
        assert!(!config.monitoring_enabled());
        assert_eq!(config.log_format(), LogFormat::Compact);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[pipeline]
name = "la-music"
description = "Music roles around Los Angeles"

[source]
endpoint = "https://jobs.example.org/search"
timeout_seconds = 20

[source.parameters]
Keywords = "Music"
Location = "Los Angeles"

[search]
provider = "tavily"
api_key = "tvly-abc"
query_template = "{employer} {location}"

[enrich]
delay_ms = 250
max_listings = 10
fallback_location = "Los Angeles"
email_denylist = ["wixpress"]

[load]
output_path = "./out"
filename = "la_leads.csv"

[monitoring]
enabled = true
log_format = "json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.listing_params().len(), 2);
        assert_eq!(config.request_timeout(), Duration::from_secs(20));
        assert_eq!(config.search_provider(), SearchProviderKind::Tavily);
        assert_eq!(config.search_api_key(), Some("tvly-abc"));
        assert_eq!(config.query_template(), "{employer} {location}");
        assert_eq!(config.listing_delay(), Duration::from_millis(250));
        assert_eq!(config.max_listings(), Some(10));
        assert_eq!(config.fallback_location(), "Los Angeles");
        assert_eq!(config.extra_email_denylist(), ["wixpress".to_string()]);
        assert_eq!(config.output_file(), "la_leads.csv");
        assert!(config.monitoring_enabled());
        assert_eq!(config.log_format(), LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_output_hides_api_key() {
        let config = TomlConfig::from_toml_str(
            r#"
[pipeline]
name = "t"

[search]
provider = "tavily"
api_key = "tvly-secret"

[load]
output_path = "./output"
"#,
        )
        .unwrap();

        let debug = format!("{:?}", config);
        assert!(!debug.contains("tvly-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("LEAD_SCRAPER_TEST_KEY", "tvly-from-env");

        let toml_content = r#"
[pipeline]
name = "env"

[search]
provider = "tavily"
api_key = "${LEAD_SCRAPER_TEST_KEY}"

[load]
output_path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.search_api_key(), Some("tvly-from-env"));

        std::env::remove_var("LEAD_SCRAPER_TEST_KEY");
    }

    #[test]
    fn test_unresolved_api_key_fails_validation() {
        let toml_content = r#"
[pipeline]
name = "env"

[search]
provider = "tavily"
api_key = "${LEAD_SCRAPER_UNSET_VARIABLE}"

[load]
output_path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(LeadError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[pipeline]
name = "bad"

[source]
endpoint = "invalid-url"

[load]
output_path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml() {
        let result = TomlConfig::from_toml_str("[pipeline\nname = ");
        assert!(matches!(
            result,
            Err(LeadError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.name, "nyc-worship");
    }
}
