use crate::adapters::http::DEFAULT_USER_AGENT;
use crate::config::{
    DEFAULT_DELAY_MS, DEFAULT_KEYWORDS, DEFAULT_LISTING_ENDPOINT, DEFAULT_OUTPUT_FILE,
    DEFAULT_QUERY_TEMPLATE, DEFAULT_RADIUS, DEFAULT_SEARCH_LOCATION, DEFAULT_SORT,
    DEFAULT_TIMEOUT_SECS,
};
use crate::domain::ports::{ConfigProvider, SearchProviderKind, Storage};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Clone, Serialize, Deserialize, Parser)]
#[command(name = "lead-scraper")]
#[command(about = "Scrape job listings and enrich them with employer websites and emails")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_LISTING_ENDPOINT)]
    pub listing_url: String,

    #[arg(long, default_value = DEFAULT_KEYWORDS)]
    pub keywords: String,

    /// Location sent to the job board search
    #[arg(long, default_value = DEFAULT_SEARCH_LOCATION)]
    pub location: String,

    /// Search radius in miles
    #[arg(long, default_value_t = DEFAULT_RADIUS)]
    pub radius: u32,

    #[arg(long, default_value = DEFAULT_SORT)]
    pub sort: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
    pub output_file: String,

    /// Pause between listings, in milliseconds
    #[arg(long, default_value_t = DEFAULT_DELAY_MS)]
    pub delay_ms: u64,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Stop after this many listings
    #[arg(long)]
    pub max_listings: Option<usize>,

    #[arg(long, value_enum, default_value_t = SearchProviderKind::Duckduckgo)]
    pub search_provider: SearchProviderKind,

    #[arg(long)]
    pub search_endpoint: Option<String>,

    #[arg(long, env = "TAVILY_API_KEY", hide_env_values = true)]
    pub search_api_key: Option<String>,

    #[arg(long, default_value = DEFAULT_QUERY_TEMPLATE)]
    pub query_template: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage between phases")]
    pub monitor: bool,
}

impl fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliConfig")
            .field("listing_url", &self.listing_url)
            .field("keywords", &self.keywords)
            .field("location", &self.location)
            .field("radius", &self.radius)
            .field("sort", &self.sort)
            .field("output_path", &self.output_path)
            .field("output_file", &self.output_file)
            .field("delay_ms", &self.delay_ms)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_listings", &self.max_listings)
            .field("search_provider", &self.search_provider)
            .field("search_endpoint", &self.search_endpoint)
            .field("search_api_key", &self.search_api_key.as_ref().map(|_| "<redacted>"))
            .field("query_template", &self.query_template)
            .field("verbose", &self.verbose)
            .field("monitor", &self.monitor)
            .finish()
    }
}

impl ConfigProvider for CliConfig {
    fn listing_endpoint(&self) -> &str {
        &self.listing_url
    }

    fn listing_params(&self) -> Vec<(String, String)> {
        vec![
            ("Keywords".to_string(), self.keywords.clone()),
            ("Location".to_string(), self.location.clone()),
            ("Radius".to_string(), self.radius.to_string()),
            ("Sort".to_string(), self.sort.clone()),
        ]
    }

    fn user_agent(&self) -> &str {
        DEFAULT_USER_AGENT
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn listing_delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    fn max_listings(&self) -> Option<usize> {
        self.max_listings
    }

    fn search_provider(&self) -> SearchProviderKind {
        self.search_provider
    }

    fn search_endpoint(&self) -> Option<&str> {
        self.search_endpoint.as_deref()
    }

    fn search_api_key(&self) -> Option<&str> {
        self.search_api_key.as_deref()
    }

    fn query_template(&self) -> &str {
        &self.query_template
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_file(&self) -> &str {
        &self.output_file
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("listing_url", &self.listing_url)?;
        if let Some(endpoint) = &self.search_endpoint {
            validation::validate_url("search_endpoint", endpoint)?;
        }
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_file_name("output_file", &self.output_file)?;
        validation::validate_range("timeout_secs", self.timeout_secs, 1, 300)?;
        validation::validate_non_empty_string("query_template", &self.query_template)?;
        if let Some(max) = self.max_listings {
            validation::validate_positive_number("max_listings", max, 1)?;
        }
        if self.search_provider == SearchProviderKind::Tavily {
            validation::validate_required_field("search_api_key", &self.search_api_key)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}
