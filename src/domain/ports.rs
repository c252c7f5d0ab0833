use crate::domain::model::{JobListing, Lead, DEFAULT_EMPLOYER, DEFAULT_LOCATION};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Which search backend resolves employer websites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum SearchProviderKind {
    #[default]
    Duckduckgo,
    Tavily,
}

impl std::fmt::Display for SearchProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchProviderKind::Duckduckgo => write!(f, "duckduckgo"),
            SearchProviderKind::Tavily => write!(f, "tavily"),
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    fn listing_endpoint(&self) -> &str;
    fn listing_params(&self) -> Vec<(String, String)>;
    fn user_agent(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn listing_delay(&self) -> Duration;
    fn max_listings(&self) -> Option<usize>;

    fn search_provider(&self) -> SearchProviderKind;
    /// Overrides the provider's public endpoint.
    fn search_endpoint(&self) -> Option<&str>;
    fn search_api_key(&self) -> Option<&str>;
    fn query_template(&self) -> &str;

    fn output_path(&self) -> &str;
    fn output_file(&self) -> &str;

    fn fallback_employer(&self) -> &str {
        DEFAULT_EMPLOYER
    }

    fn fallback_location(&self) -> &str {
        DEFAULT_LOCATION
    }

    /// Appended to the built-in email denylist.
    fn extra_email_denylist(&self) -> &[String] {
        &[]
    }
}

/// Resolves a free-text query to the first result's URL.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn first_result(&self, query: &str) -> Result<Option<String>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<JobListing>>;
    async fn transform(&self, listings: Vec<JobListing>) -> Result<Vec<Lead>>;
    async fn load(&self, leads: Vec<Lead>) -> Result<String>;
}
