pub const BEARER_TOKEN_VAR: &str = "BEARER_TOKEN";
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Service credentials, read once at startup and never rotated.
#[derive(Clone, Default)]
pub struct Credentials {
    pub bearer_token: Option<String>,
    pub openai_api_key: Option<String>,
}

impl Credentials {
    /// Loads `.env` from the working directory (if any), then reads the
    /// process environment. Missing values are only warned about.
    pub fn load() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => tracing::debug!("No .env file found"),
            Err(e) => tracing::warn!("⚠️ Failed to read .env file: {}", e),
        }

        Self::from_env()
    }

    pub fn from_env() -> Self {
        let credentials = Self {
            bearer_token: read_var(BEARER_TOKEN_VAR),
            openai_api_key: read_var(OPENAI_API_KEY_VAR),
        };

        if credentials.bearer_token.is_none() {
            tracing::warn!("⚠️ {} is not set, searches will be rejected", BEARER_TOKEN_VAR);
        }
        if credentials.openai_api_key.is_none() {
            tracing::warn!(
                "⚠️ {} is not set, every post will be labeled Error",
                OPENAI_API_KEY_VAR
            );
        }

        credentials
    }
}

// 避免把憑證印進日誌
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "***"))
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

fn read_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
