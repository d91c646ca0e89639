//! Configuration types for June.
//!
//! This module provides the configuration structures used by the assistant:
//! - [`GlobalConfig`]: User-level configuration stored in `~/.june/config.yaml`
//! - [`RetrievalConfig`]: How many chunks feed the model context and the fallback
//! - [`ConversationConfig`]: History bounds
//! - [`KnowledgeConfig`]: Which knowledge profile to load
//! - [`check_config`]: Collects every problem for `june config check`
//!
//! Provider settings reuse [`june_model::GeminiConfig`] instead of duplicating it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use june_model::{GeminiConfig, GEMINI_API_KEY_ENV, PLACEHOLDER_API_KEY};

use crate::constants::{
    CONFIG_FILENAME, DEFAULT_CONTEXT_TOP_K, DEFAULT_FALLBACK_TOP_K, DEFAULT_MAX_PAIRS,
    JUNE_HOME_DIR, LARGE_TOP_K_WARNING,
};
use crate::errors::JuneError;
use crate::knowledge::KnowledgeBase;

// ============================================================================
// GlobalConfig
// ============================================================================

/// Global (user-level) configuration for June.
///
/// Loaded from `~/.june/config.yaml`. Every section is optional; a missing
/// file yields the defaults.
///
/// # Example YAML
///
/// ```yaml
/// gemini:
///   apiKey: AIza...            # GEMINI_API_KEY takes precedence
///   model: gemini-1.5-pro
///   timeoutSecs: 30
///   generation:
///     temperature: 0.7
///     topK: 40
///     topP: 0.95
///     maxOutputTokens: 1024
/// retrieval:
///   contextTopK: 4
///   fallbackTopK: 2
/// conversation:
///   maxPairs: 10
/// knowledge:
///   profilePath: ./my-profile.yaml
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    /// Hosted model settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Retrieval settings.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Conversation history settings.
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Knowledge profile location.
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

impl GlobalConfig {
    /// Load the global configuration from the default location (`~/.june/config.yaml`).
    ///
    /// If the file does not exist, returns a default configuration so the
    /// assistant works out-of-the-box.
    ///
    /// # Errors
    ///
    /// Returns [`JuneError::InvalidGlobalConfig`] if the file exists but cannot be parsed.
    pub fn load_default() -> Result<Self, JuneError> {
        match Self::default_path() {
            Some(path) => Self::from_path(&path),
            None => {
                tracing::debug!("Could not determine home directory, using default config");
                let mut config = Self::default();
                config.apply_env_overrides();
                config.log_warnings()?;
                Ok(config)
            }
        }
    }

    /// Load from `path` when given, otherwise from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self, JuneError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::load_default(),
        }
    }

    /// Load the global configuration from a specific path.
    ///
    /// If the file does not exist, returns a default configuration. The
    /// `GEMINI_API_KEY` environment variable is applied after parsing.
    /// A relative `knowledge.profilePath` is resolved against the config
    /// file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`JuneError::InvalidGlobalConfig`] if the file exists but cannot be parsed.
    /// Returns [`JuneError::InvalidConfiguration`] if validation fails.
    pub fn from_path(path: &Path) -> Result<Self, JuneError> {
        let mut config = Self::read_file(path)?;
        config.apply_env_overrides();
        config.log_warnings()?;
        Ok(config)
    }

    /// Parse `path` without applying environment overrides or validation.
    ///
    /// A missing file yields the defaults.
    pub fn read_file(path: &Path) -> Result<Self, JuneError> {
        if !path.exists() {
            tracing::debug!(
                "Global config not found at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            JuneError::InvalidGlobalConfig(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut config = Self::parse(&content).map_err(|e| {
            JuneError::InvalidGlobalConfig(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        if let (Some(profile), Some(dir)) = (&config.knowledge.profile_path, path.parent()) {
            if profile.is_relative() {
                config.knowledge.profile_path = Some(dir.join(profile));
            }
        }

        Ok(config)
    }

    /// Parse a YAML document. An empty document yields the defaults.
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Get the default global config directory (`~/.june`).
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(JUNE_HOME_DIR))
    }

    /// Get the default global config file path (`~/.june/config.yaml`).
    pub fn default_path() -> Option<PathBuf> {
        Self::default_dir().map(|d| d.join(CONFIG_FILENAME))
    }

    /// Apply environment overrides (`GEMINI_API_KEY`).
    pub fn apply_env_overrides(&mut self) {
        self.apply_api_key_override(std::env::var(GEMINI_API_KEY_ENV).ok());
    }

    /// Replace the configured API key with `value` when it is non-empty.
    pub fn apply_api_key_override(&mut self, value: Option<String>) {
        if let Some(key) = value.filter(|k| !k.trim().is_empty()) {
            tracing::debug!("Using API key from {}", GEMINI_API_KEY_ENV);
            self.gemini.api_key = Some(key);
        }
    }

    /// Copy of this config with secrets masked, for display.
    pub fn redacted(&self) -> Self {
        Self {
            gemini: self.gemini.redacted(),
            ..self.clone()
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first critical error as [`JuneError::InvalidConfiguration`].
    ///
    /// # Warnings
    ///
    /// Non-fatal issues are collected and returned as a list of warning strings.
    /// Callers should log these warnings but can proceed with the configuration.
    pub fn validate(&self) -> Result<Vec<String>, JuneError> {
        let mut all_warnings = Vec::new();

        all_warnings.extend(validate_gemini(&self.gemini)?);
        all_warnings.extend(self.retrieval.validate()?);
        all_warnings.extend(self.conversation.validate()?);

        Ok(all_warnings)
    }

    fn log_warnings(&self) -> Result<(), JuneError> {
        let warnings = self.validate()?;
        for warning in warnings {
            tracing::warn!("Config warning: {}", warning);
        }
        Ok(())
    }
}

fn validate_gemini(config: &GeminiConfig) -> Result<Vec<String>, JuneError> {
    let mut warnings = Vec::new();

    if config.model.trim().is_empty() {
        return Err(JuneError::invalid_configuration(
            "gemini.model must not be empty",
            "Set gemini.model to a model id such as gemini-1.5-pro",
        ));
    }

    if config.timeout_secs == 0 {
        return Err(JuneError::invalid_configuration(
            "gemini.timeoutSecs must be greater than 0",
            "Set gemini.timeoutSecs to a positive number of seconds (default: 30)",
        ));
    }

    let generation = &config.generation;
    if !(0.0..=2.0).contains(&generation.temperature) {
        return Err(JuneError::invalid_configuration(
            format!(
                "gemini.generation.temperature must be between 0.0 and 2.0, got {}",
                generation.temperature
            ),
            "Set gemini.generation.temperature within 0.0..=2.0 (default: 0.7)",
        ));
    }

    if !(0.0..=1.0).contains(&generation.top_p) {
        return Err(JuneError::invalid_configuration(
            format!(
                "gemini.generation.topP must be between 0.0 and 1.0, got {}",
                generation.top_p
            ),
            "Set gemini.generation.topP within 0.0..=1.0 (default: 0.95)",
        ));
    }

    if generation.max_output_tokens == 0 {
        return Err(JuneError::invalid_configuration(
            "gemini.generation.maxOutputTokens must be greater than 0",
            "Set gemini.generation.maxOutputTokens to a positive integer (default: 1024)",
        ));
    }

    if config
        .api_key
        .as_deref()
        .is_some_and(|key| key.trim() == PLACEHOLDER_API_KEY)
    {
        warnings.push(format!(
            "gemini.apiKey is the sample placeholder; answers will come from local knowledge only. Set {} to enable the model.",
            GEMINI_API_KEY_ENV
        ));
    }

    Ok(warnings)
}

// ============================================================================
// RetrievalConfig
// ============================================================================

/// Retrieval settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalConfig {
    /// Chunks rendered into the model context.
    #[serde(default = "default_context_top_k")]
    pub context_top_k: usize,

    /// Chunks considered when picking a canned fallback reply.
    #[serde(default = "default_fallback_top_k")]
    pub fallback_top_k: usize,
}

fn default_context_top_k() -> usize {
    DEFAULT_CONTEXT_TOP_K
}

fn default_fallback_top_k() -> usize {
    DEFAULT_FALLBACK_TOP_K
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            context_top_k: default_context_top_k(),
            fallback_top_k: default_fallback_top_k(),
        }
    }
}

impl RetrievalConfig {
    /// Validate retrieval settings.
    pub fn validate(&self) -> Result<Vec<String>, JuneError> {
        let mut warnings = Vec::new();

        if self.context_top_k == 0 {
            return Err(JuneError::invalid_configuration(
                "retrieval.contextTopK must be greater than 0",
                "Set retrieval.contextTopK to a positive integer (default: 4)",
            ));
        }

        if self.fallback_top_k == 0 {
            return Err(JuneError::invalid_configuration(
                "retrieval.fallbackTopK must be greater than 0",
                "Set retrieval.fallbackTopK to a positive integer (default: 2)",
            ));
        }

        if self.context_top_k > LARGE_TOP_K_WARNING {
            warnings.push(format!(
                "retrieval.contextTopK={} is large; prompts may exceed the model's output budget",
                self.context_top_k
            ));
        }

        if self.fallback_top_k > LARGE_TOP_K_WARNING {
            warnings.push(format!(
                "retrieval.fallbackTopK={} is large; only the top chunk picks the fallback reply",
                self.fallback_top_k
            ));
        }

        Ok(warnings)
    }
}

// ============================================================================
// ConversationConfig
// ============================================================================

/// Conversation history settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationConfig {
    /// Exchange pairs kept after each successful reply.
    #[serde(default = "default_max_pairs")]
    pub max_pairs: usize,
}

fn default_max_pairs() -> usize {
    DEFAULT_MAX_PAIRS
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_pairs: default_max_pairs(),
        }
    }
}

impl ConversationConfig {
    /// Validate conversation settings.
    pub fn validate(&self) -> Result<Vec<String>, JuneError> {
        if self.max_pairs == 0 {
            return Err(JuneError::invalid_configuration(
                "conversation.maxPairs must be greater than 0",
                "Set conversation.maxPairs to a positive integer (default: 10)",
            ));
        }
        Ok(Vec::new())
    }
}

// ============================================================================
// KnowledgeConfig
// ============================================================================

/// Knowledge profile location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeConfig {
    /// Profile YAML file. The built-in profile is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_path: Option<PathBuf>,
}

// ============================================================================
// Validation report
// ============================================================================

/// One configuration source inspected by [`check_config`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSourceInfo {
    /// Name of the source (`config` or `profile`).
    pub name: String,
    /// File path, or `built-in` for the embedded profile.
    pub location: String,
    /// Whether the file exists.
    pub exists: bool,
    /// Whether the source parsed and validated.
    pub valid: bool,
    /// Error, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of configuration validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigValidationResult {
    /// Sources checked, in load order.
    pub sources: Vec<ConfigSourceInfo>,
    /// Whether a usable API key is configured (file or environment).
    pub api_key_configured: bool,
    /// Validation warnings (non-fatal issues).
    pub warnings: Vec<String>,
    /// Validation errors (fatal issues).
    pub errors: Vec<String>,
}

impl ConfigValidationResult {
    /// Check if the configuration is valid (no errors).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate the configuration file at `path` (default location when `None`)
/// and the knowledge profile it selects.
///
/// Unlike [`GlobalConfig::load`], problems are collected instead of returned
/// as the first error.
pub fn check_config(path: Option<&Path>) -> ConfigValidationResult {
    let mut result = ConfigValidationResult::default();

    let config_path = path.map(Path::to_path_buf).or_else(GlobalConfig::default_path);
    let mut config_source = ConfigSourceInfo {
        name: "config".to_string(),
        location: config_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(no home directory)".to_string()),
        exists: config_path.as_ref().is_some_and(|p| p.exists()),
        valid: true,
        error: None,
    };

    let parsed = match &config_path {
        Some(path) => GlobalConfig::read_file(path),
        None => Ok(GlobalConfig::default()),
    };

    let config = match parsed {
        Ok(mut config) => {
            config.apply_env_overrides();
            match config.validate() {
                Ok(warnings) => result.warnings.extend(warnings),
                Err(e) => {
                    config_source.valid = false;
                    config_source.error = Some(e.to_string());
                    result.errors.push(format!("Config: {}", e));
                }
            }
            Some(config)
        }
        Err(e) => {
            config_source.valid = false;
            config_source.error = Some(e.to_string());
            result.errors.push(format!("Config: {}", e));
            None
        }
    };
    result.sources.push(config_source);

    let Some(config) = config else {
        return result;
    };
    result.api_key_configured = config.gemini.usable_api_key().is_some();

    let mut profile_source = ConfigSourceInfo {
        name: "profile".to_string(),
        location: config
            .knowledge
            .profile_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in".to_string()),
        exists: config
            .knowledge
            .profile_path
            .as_ref()
            .map_or(true, |p| p.exists()),
        valid: true,
        error: None,
    };

    match KnowledgeBase::load(&config.knowledge) {
        Ok(kb) => result.warnings.extend(kb.warnings()),
        Err(e) => {
            profile_source.valid = false;
            profile_source.error = Some(e.to_string());
            result.errors.push(format!("Profile: {}", e));
        }
    }
    result.sources.push(profile_source);

    result
}
