// Client configuration: endpoint, credentials and model selection.
// The library never reads the environment; callers resolve secrets and pass them in.

use crate::error::{LlmError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const URL_OPENAI: &str = "https://api.openai.com/v1";
pub const URL_POE: &str = "https://api.poe.com/v1";

/// Base URL of an OpenAI-compatible `/v1` API
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BaseUrl {
    #[default]
    OpenAi,
    Poe,
    Custom(String),
}

impl BaseUrl {
    pub fn as_str(&self) -> &str {
        match self {
            Self::OpenAi => URL_OPENAI,
            Self::Poe => URL_POE,
            Self::Custom(url) => url,
        }
    }
}

impl From<&str> for BaseUrl {
    /// Recognises the provider names (`openai`, `poe`) and their exact
    /// URLs; anything else is taken as a custom endpoint.
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        let normalized = trimmed.trim_end_matches('/');
        if trimmed.eq_ignore_ascii_case("openai") || normalized == URL_OPENAI {
            Self::OpenAi
        } else if trimmed.eq_ignore_ascii_case("poe") || normalized == URL_POE {
            Self::Poe
        } else {
            Self::Custom(trimmed.to_string())
        }
    }
}

impl From<String> for BaseUrl {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<BaseUrl> for String {
    fn from(value: BaseUrl) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration owned by one client instance.
///
/// `api_key` and `base_url` are fixed once the client is built; only the
/// model can change afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_key: String,
    base_url: BaseUrl,
    pub model: Option<String>,
    /// Whole-request timeout applied by the HTTP transport
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: BaseUrl::default(),
            model: None,
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<BaseUrl>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Check the fields a client cannot work without
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(LlmError::invalid_argument("API key must not be empty"));
        }
        if self.base_url.as_str().trim().is_empty() {
            return Err(LlmError::invalid_argument("base URL must not be empty"));
        }
        if let Some(model) = &self.model {
            if model.trim().is_empty() {
                return Err(LlmError::invalid_argument("model must not be empty"));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}
