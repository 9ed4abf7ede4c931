//! `imageguard-config` — ImageGuard runtime configuration.
//!
//! Provides:
//! - Typed config schema (vision API, gateway, logging)
//! - Optional YAML file with `${ENV_VAR}` substitution
//! - Environment overrides (`OPENAI_API_KEY`, `IMAGEGUARD_*`)
//! - Default value application and validation
//! - Redaction for safe display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{apply_env_overrides, process_env, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config};
pub use redact::redact;
pub use schema::{GatewayConfig, ImageGuardConfig, LogFormat, LoggingConfig, VisionConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use imageguard_core::{GuardError, VisionSettings};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Load the config file (if any), substitute env vars, overlay env overrides,
/// apply defaults, and validate.
///
/// This is the main entry point for long-running processes.
pub async fn load_and_prepare(path: Option<&Path>) -> Result<ImageGuardConfig> {
    let env = process_env();
    let path = config_file_path(path);
    let raw_config = load_config(&path).await?;

    // Serialize to Value for the env substitution pass.
    let value: Value =
        serde_json::to_value(&raw_config).context("Failed to serialize config for processing")?;
    let value = resolve_env_vars_with(&value, &env).context("Failed to resolve env vars in config")?;
    let config: ImageGuardConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    finish(config, &env)
}

/// Build a config from environment variables alone.
///
/// Used per invocation so a credential rotated in the environment is picked up
/// without restarting.
pub fn from_env_map(env: &HashMap<String, String>) -> Result<ImageGuardConfig> {
    overlay_env(ImageGuardConfig::default(), env)
}

/// Re-apply environment overrides on top of an already loaded config.
///
/// Values from `env` win; anything it leaves unset keeps the base value.
pub fn overlay_env(base: ImageGuardConfig, env: &HashMap<String, String>) -> Result<ImageGuardConfig> {
    finish(base, env)
}

fn finish(config: ImageGuardConfig, env: &HashMap<String, String>) -> Result<ImageGuardConfig> {
    let config = apply_env_overrides(config, env)?;
    let config = apply_all_defaults(config);

    let report = validate(&config);
    report.log();
    if !report.is_valid() {
        bail!("invalid configuration: {}", report.error_summary());
    }
    Ok(config)
}

impl ImageGuardConfig {
    /// Vision settings for constructing an analyzer. Fails without an API key.
    pub fn vision_settings(&self) -> Result<VisionSettings, GuardError> {
        let vision = self.vision.clone().unwrap_or_default();
        let api_key = vision
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| GuardError::Config(format!("{} is not set", env::API_KEY_VAR)))?;

        let mut settings = VisionSettings::new(api_key);
        if let Some(base) = vision.api_base {
            settings = settings.with_api_base(base);
        }
        if let Some(model) = vision.model {
            settings = settings.with_model(model);
        }
        if let Some(max_tokens) = vision.max_tokens {
            settings = settings.with_max_tokens(max_tokens);
        }
        if let Some(secs) = vision.timeout_secs {
            settings = settings.with_timeout(Duration::from_secs(secs));
        }
        Ok(settings)
    }

    /// `host:port` for the HTTP gateway.
    pub fn bind_address(&self) -> String {
        let gateway = self.gateway.clone().unwrap_or_default();
        format!(
            "{}:{}",
            gateway.host.as_deref().unwrap_or(defaults::DEFAULT_HOST),
            gateway.port.unwrap_or(defaults::DEFAULT_PORT)
        )
    }

    pub fn logging_config(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }

    /// Redacted JSON view, safe to print.
    pub fn redacted(&self) -> Value {
        serde_json::to_value(self).map(|v| redact(&v)).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn env_only_config_resolves_settings() {
        let cfg = from_env_map(&env(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("IMAGEGUARD_MAX_TOKENS", "120"),
        ]))
        .unwrap();
        let settings = cfg.vision_settings().unwrap();
        assert_eq!(settings.api_key, "sk-test");
        assert_eq!(settings.max_tokens, 120);
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.timeout, Duration::from_secs(30));
    }

    #[test]
    fn missing_key_is_config_error() {
        let cfg = from_env_map(&HashMap::new()).unwrap();
        let err = cfg.vision_settings().unwrap_err();
        assert!(matches!(err, GuardError::Config(_)));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn invalid_values_fail_preparation() {
        assert!(from_env_map(&env(&[("IMAGEGUARD_TIMEOUT_SECS", "0")])).is_err());
    }

    #[test]
    fn overlay_keeps_file_key_unless_env_sets_one() {
        let base = ImageGuardConfig {
            vision: Some(VisionConfig {
                api_key: Some("sk-from-file".into()),
                model: Some("gpt-4o-mini".into()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let cfg = overlay_env(base.clone(), &HashMap::new()).unwrap();
        let settings = cfg.vision_settings().unwrap();
        assert_eq!(settings.api_key, "sk-from-file");
        assert_eq!(settings.model, "gpt-4o-mini");

        let cfg = overlay_env(base, &env(&[("OPENAI_API_KEY", "sk-from-env")])).unwrap();
        assert_eq!(cfg.vision_settings().unwrap().api_key, "sk-from-env");
    }

    #[test]
    fn invalid_config_error_names_every_field() {
        let err = from_env_map(&env(&[
            ("IMAGEGUARD_TIMEOUT_SECS", "0"),
            ("IMAGEGUARD_MAX_TOKENS", "0"),
        ]))
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("vision.timeoutSecs"), "{message}");
        assert!(message.contains("vision.maxTokens"), "{message}");
    }

    #[test]
    fn bind_address_uses_defaults() {
        let cfg = from_env_map(&HashMap::new()).unwrap();
        assert_eq!(cfg.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn redacted_view_masks_key() {
        let cfg = from_env_map(&env(&[("OPENAI_API_KEY", "sk-very-secret-key")])).unwrap();
        let shown = cfg.redacted().to_string();
        assert!(!shown.contains("sk-very-secret-key"));
    }
}
