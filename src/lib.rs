pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, LocalStorage};

pub use config::toml_config::TomlConfig;
pub use core::{etl::EtlEngine, pipeline::LeadPipeline};
pub use domain::model::{JobListing, Lead, LeadRow, RunReport};
pub use utils::error::{LeadError, Result};
