#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, LocalStorage};

/// Search page of the staffing site.
pub const DEFAULT_LISTING_ENDPOINT: &str = "https://www.churchstaffing.com/findjobs/search";
pub const DEFAULT_KEYWORDS: &str = "Worship";
pub const DEFAULT_SEARCH_LOCATION: &str = "New York City";
pub const DEFAULT_RADIUS: u32 = 50;
pub const DEFAULT_SORT: &str = "Date";
pub const DEFAULT_QUERY_TEMPLATE: &str = "{employer} {location} church official website";
pub const DEFAULT_OUTPUT_FILE: &str = "leads_nyc_emails.csv";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DELAY_MS: u64 = 1000;
