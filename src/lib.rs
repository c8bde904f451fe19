pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{LocalStorage, OpenAiClassifier, TwitterSearchClient};
pub use app::pipelines::SentimentPipeline;
pub use config::toml_config::AppConfig;
pub use crate::core::{etl::EtlEngine, labeler::SentimentLabeler, query::QueryExecutor};
pub use utils::error::{EtlError, Result};
