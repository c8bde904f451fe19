use crate::config::credentials::Credentials;
use crate::core::labeler::{DEFAULT_PROMPT_TEMPLATE, TEXT_PLACEHOLDER};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_one_of, validate_path, validate_positive_number,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SUPPORTED_FORMATS: [&str; 3] = ["xlsx", "csv", "json"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub classifier: ClassifierConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub bearer_token: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.twitter.com/2/tweets/search/recent".to_string(),
            bearer_token: None,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub prompt_template: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/responses".to_string(),
            api_key: None,
            model: "gpt-4.1-mini".to_string(),
            prompt_template: None,
            timeout_seconds: 30,
        }
    }
}

impl ClassifierConfig {
    pub fn prompt_template(&self) -> &str {
        self.prompt_template
            .as_deref()
            .unwrap_or(DEFAULT_PROMPT_TEMPLATE)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compression: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: "./output".to_string(),
            output_formats: vec!["xlsx".to_string()],
            compression: false,
        }
    }
}

impl ExportConfig {
    pub fn wants(&self, format: &str) -> bool {
        self.output_formats.iter().any(|f| f == format)
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OPENAI_API_KEY})，找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 設定檔沒有提供的憑證才從環境變數補上
    pub fn apply_credentials(&mut self, credentials: &Credentials) {
        if self.search.bearer_token.is_none() {
            self.search.bearer_token = credentials.bearer_token.clone();
        }
        if self.classifier.api_key.is_none() {
            self.classifier.api_key = credentials.openai_api_key.clone();
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("search.endpoint", &self.search.endpoint)?;
        validate_positive_number("search.timeout_seconds", self.search.timeout_seconds, 1)?;

        validate_url("classifier.endpoint", &self.classifier.endpoint)?;
        validate_non_empty_string("classifier.model", &self.classifier.model)?;
        validate_positive_number(
            "classifier.timeout_seconds",
            self.classifier.timeout_seconds,
            1,
        )?;
        if !self.classifier.prompt_template().contains(TEXT_PLACEHOLDER) {
            return Err(EtlError::InvalidConfigValueError {
                field: "classifier.prompt_template".to_string(),
                value: self.classifier.prompt_template().to_string(),
                reason: format!("Template must contain {}", TEXT_PLACEHOLDER),
            });
        }

        validate_path("export.output_path", &self.export.output_path)?;
        validate_one_of(
            "export.output_formats",
            &self.export.output_formats,
            &SUPPORTED_FORMATS,
        )?;

        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
