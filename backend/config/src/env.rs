//! Environment handling for config values.
//!
//! Two mechanisms:
//! - `${VAR_NAME}` references inside YAML string values, resolved at load time.
//!   Only uppercase `[A-Z_][A-Z0-9_]*` names match; `$${VAR}` escapes to a literal `${VAR}`.
//! - Well-known variables (`OPENAI_API_KEY`, `IMAGEGUARD_*`) that override the file.

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

use crate::schema::{GatewayConfig, ImageGuardConfig, LogFormat, LoggingConfig, VisionConfig};

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const API_BASE_VAR: &str = "IMAGEGUARD_API_BASE";
pub const MODEL_VAR: &str = "IMAGEGUARD_MODEL";
pub const MAX_TOKENS_VAR: &str = "IMAGEGUARD_MAX_TOKENS";
pub const TIMEOUT_VAR: &str = "IMAGEGUARD_TIMEOUT_SECS";
pub const HOST_VAR: &str = "IMAGEGUARD_BIND";
pub const PORT_VAR: &str = "IMAGEGUARD_PORT";
pub const LOG_FORMAT_VAR: &str = "IMAGEGUARD_LOG_FORMAT";
pub const LOG_DIR_VAR: &str = "IMAGEGUARD_LOG_DIR";
pub const LOG_LEVEL_VAR: &str = "RUST_LOG";

/// `${VAR}`, optionally preceded by an escaping `$`.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Snapshot of the process environment.
pub fn process_env() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Substitute `${VAR}` references in a config JSON value tree.
///
/// Only string leaves are processed. Fails if a referenced var is unset or empty.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => {
            let result: Result<Vec<_>> = arr
                .iter()
                .enumerate()
                .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
                .collect();
            Ok(Value::Array(result?))
        }
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &regex::Captures| {
        let var_name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

fn non_empty<'a>(env: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    env.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(env: &HashMap<String, String>, key: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    non_empty(env, key)
        .map(|raw| raw.parse::<T>().with_context(|| format!("{key} has an invalid value")))
        .transpose()
}

/// Overlay well-known environment variables onto a config. Set variables win over the file.
pub fn apply_env_overrides(
    mut config: ImageGuardConfig,
    env: &HashMap<String, String>,
) -> Result<ImageGuardConfig> {
    let vision = config.vision.get_or_insert_with(VisionConfig::default);
    if let Some(key) = non_empty(env, API_KEY_VAR) {
        vision.api_key = Some(key.to_string());
    }
    if let Some(base) = non_empty(env, API_BASE_VAR) {
        vision.api_base = Some(base.to_string());
    }
    if let Some(model) = non_empty(env, MODEL_VAR) {
        vision.model = Some(model.to_string());
    }
    if let Some(max_tokens) = parse_var(env, MAX_TOKENS_VAR)? {
        vision.max_tokens = Some(max_tokens);
    }
    if let Some(timeout) = parse_var(env, TIMEOUT_VAR)? {
        vision.timeout_secs = Some(timeout);
    }

    let gateway = config.gateway.get_or_insert_with(GatewayConfig::default);
    if let Some(host) = non_empty(env, HOST_VAR) {
        gateway.host = Some(host.to_string());
    }
    if let Some(port) = parse_var(env, PORT_VAR)? {
        gateway.port = Some(port);
    }

    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if let Some(level) = non_empty(env, LOG_LEVEL_VAR) {
        logging.level = Some(level.to_string());
    }
    if let Some(format) = non_empty(env, LOG_FORMAT_VAR) {
        logging.format = Some(match format.to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            other => bail!("{LOG_FORMAT_VAR} must be 'pretty' or 'json', got '{other}'"),
        });
    }
    if let Some(dir) = non_empty(env, LOG_DIR_VAR) {
        logging.dir = Some(dir.to_string());
    }

    Ok(config)
}
