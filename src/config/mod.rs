pub mod credentials;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli_args::CliConfig;

#[cfg(feature = "cli")]
mod cli_args {
    use crate::config::toml_config::AppConfig;
    use crate::core::SearchRequest;
    use crate::utils::error::Result;
    use crate::utils::validation::{validate_date_order, validate_keyword, Validate};
    use chrono::NaiveDate;
    use clap::Parser;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "tweet-sentiment")]
    #[command(about = "Search tweets by keyword and date range and classify their sentiment")]
    pub struct CliConfig {
        /// Keyword or search expression
        #[arg(short, long)]
        pub keyword: String,

        /// First day to search (YYYY-MM-DD, UTC)
        #[arg(long)]
        pub start_date: NaiveDate,

        /// Last day to search (YYYY-MM-DD, UTC); defaults to now
        #[arg(long)]
        pub end_date: Option<NaiveDate>,

        /// Maximum number of tweets (the service allows at most 100)
        #[arg(long, default_value = "20")]
        pub max_results: usize,

        /// Path to a TOML configuration file
        #[arg(short, long)]
        pub config: Option<String>,

        /// Directory for exported files
        #[arg(long)]
        pub output_path: Option<String>,

        /// Export formats (xlsx, csv, json)
        #[arg(long = "format", value_delimiter = ',')]
        pub formats: Vec<String>,

        /// Bundle the exported files into a single zip archive
        #[arg(long)]
        pub zip: bool,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON")]
        pub log_json: bool,
    }

    impl CliConfig {
        pub fn search_request(&self) -> SearchRequest {
            SearchRequest {
                keyword: self.keyword.trim().to_string(),
                start_date: self.start_date,
                end_date: self.end_date,
                max_results: self.max_results,
            }
        }

        /// 命令列參數優先於設定檔
        pub fn apply_overrides(&self, config: &mut AppConfig) {
            if let Some(output_path) = &self.output_path {
                config.export.output_path = output_path.clone();
            }
            if !self.formats.is_empty() {
                config.export.output_formats = self.formats.clone();
            }
            if self.zip {
                config.export.compression = true;
            }
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_keyword(&self.keyword)?;
            validate_date_order(self.start_date, self.end_date)?;
            if self.max_results == 0 {
                return Err(crate::utils::error::EtlError::ValidationError {
                    message: "max_results must be at least 1".to_string(),
                });
            }
            Ok(())
        }
    }

}
