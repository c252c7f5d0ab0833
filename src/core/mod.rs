pub mod emails;
pub mod etl;
pub mod listing;
pub mod pipeline;

pub use crate::domain::model::{JobListing, Lead, RunReport};
pub use crate::domain::ports::{ConfigProvider, Pipeline, SearchProvider, Storage};
pub use crate::utils::error::Result;
