//! Configuration for report analysis.
//!
//! Everything the hosted-model client needs lives in [`AnalyzerConfig`]: the
//! API key is read once at startup and handed to the component that issues
//! requests instead of being looked up from the process environment on every
//! call. `build()` validates eagerly so a missing key stops the binary before
//! it accepts a single upload.

use crate::error::AnalyzerError;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Environment variable holding the hosted-model API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Base URL of the Gemini REST API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for analysing uploaded reports.
///
/// Built via [`AnalyzerConfig::builder()`] or [`AnalyzerConfig::from_env()`].
///
/// # Example
/// ```rust
/// use medreport_analyzer::AnalyzerConfig;
///
/// let config = AnalyzerConfig::builder()
///     .api_key("test-key")
///     .model("gemini-2.0-flash")
///     .api_timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.model, "gemini-2.0-flash");
/// ```
#[derive(Clone, Serialize)]
pub struct AnalyzerConfig {
    /// Secret key for the hosted model. Never serialised or logged.
    #[serde(skip)]
    pub api_key: String,

    /// Model identifier. Default: `gemini-2.0-flash`.
    pub model: String,

    /// API base URL; overridden in tests to point at a stub server.
    pub base_url: String,

    /// Custom analysis prompt. If None, uses [`crate::prompts::ANALYSIS_PROMPT`].
    pub prompt: Option<String>,

    /// Sampling temperature. None leaves the provider default in place.
    pub temperature: Option<f32>,

    /// Output token cap. None leaves the provider default in place.
    pub max_output_tokens: Option<u32>,

    /// Per-request timeout for the hosted call in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Directory for scoped upload files. None uses the OS temp dir.
    pub temp_dir: Option<PathBuf>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            prompt: None,
            temperature: None,
            max_output_tokens: None,
            api_timeout_secs: 120,
            temp_dir: None,
        }
    }
}

impl fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("prompt", &self.prompt)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("temp_dir", &self.temp_dir)
            .finish()
    }
}

impl AnalyzerConfig {
    /// Create a new builder for `AnalyzerConfig`.
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder {
            config: Self::default(),
        }
    }

    /// Load the API key from [`API_KEY_ENV`] and validate.
    ///
    /// Returns [`AnalyzerError::MissingApiKey`] when the variable is unset or
    /// blank.
    pub fn from_env() -> Result<Self, AnalyzerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`AnalyzerConfig::from_env`] with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AnalyzerError> {
        let key = lookup(API_KEY_ENV).unwrap_or_default();
        Self::builder().api_key(key).build()
    }

    /// The prompt actually sent with every request.
    pub fn effective_prompt(&self) -> &str {
        self.prompt
            .as_deref()
            .unwrap_or(crate::prompts::ANALYSIS_PROMPT)
    }
}

/// Builder for [`AnalyzerConfig`].
#[derive(Debug)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

/// Start from an already validated config, e.g. to layer CLI overrides on
/// top of [`AnalyzerConfig::from_lookup`].
impl From<AnalyzerConfig> for AnalyzerConfigBuilder {
    fn from(config: AnalyzerConfig) -> Self {
        Self { config }
    }
}

impl AnalyzerConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.prompt = Some(prompt.into());
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn max_output_tokens(mut self, n: u32) -> Self {
        self.config.max_output_tokens = Some(n);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = Some(dir.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalyzerConfig, AnalyzerError> {
        let c = &self.config;
        if c.api_key.trim().is_empty() {
            return Err(AnalyzerError::MissingApiKey { var: API_KEY_ENV });
        }
        if c.model.trim().is_empty() {
            return Err(AnalyzerError::InvalidConfig("model must not be empty".into()));
        }
        if c.api_timeout_secs == 0 {
            return Err(AnalyzerError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(AnalyzerError::InvalidConfig(format!(
                "base URL must be http(s), got '{}'",
                c.base_url
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_fatal() {
        let err = AnalyzerConfig::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, AnalyzerError::MissingApiKey { var } if var == API_KEY_ENV));
    }

    #[test]
    fn blank_key_is_fatal() {
        let err = AnalyzerConfig::from_lookup(|_| Some("   ".into())).unwrap_err();
        assert!(matches!(err, AnalyzerError::MissingApiKey { .. }));
    }

    #[test]
    fn key_from_lookup_uses_defaults() {
        let config = AnalyzerConfig::from_lookup(|name| {
            (name == API_KEY_ENV).then(|| "abc123".to_string())
        })
        .unwrap();
        assert_eq!(config.api_key, "abc123");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api_timeout_secs, 120);
        assert_eq!(config.effective_prompt(), crate::prompts::ANALYSIS_PROMPT);
    }

    #[test]
    fn debug_redacts_key() {
        let config = AnalyzerConfig::builder().api_key("s3cret").build().unwrap();
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("s3cret"), "got: {dbg}");
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn serialise_skips_key() {
        let config = AnalyzerConfig::builder().api_key("s3cret").build().unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("s3cret"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = AnalyzerConfig::builder()
            .api_key("k")
            .api_timeout_secs(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidConfig(_)));
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let config = AnalyzerConfig::builder()
            .api_key("k")
            .base_url("http://127.0.0.1:9999/v1beta/")
            .build()
            .unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:9999/v1beta");
    }

    #[test]
    fn builder_from_config_keeps_key_and_revalidates() {
        let base = AnalyzerConfig::from_lookup(|_| Some("k".into())).unwrap();
        let config = AnalyzerConfigBuilder::from(base.clone())
            .model("gemini-1.5-pro")
            .build()
            .unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.model, "gemini-1.5-pro");

        let err = AnalyzerConfigBuilder::from(base).model(" ").build().unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidConfig(_)));
    }

    #[test]
    fn custom_prompt_overrides_default() {
        let config = AnalyzerConfig::builder()
            .api_key("k")
            .prompt("Summarise.")
            .build()
            .unwrap();
        assert_eq!(config.effective_prompt(), "Summarise.");
    }
}
