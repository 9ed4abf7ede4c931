//! Config defaults: applies sensible default values to parsed config.

use imageguard_core::settings::{
    DEFAULT_API_BASE, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS,
};

use crate::schema::{GatewayConfig, ImageGuardConfig, LogFormat, LoggingConfig, VisionConfig};

pub const DEFAULT_HOST: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 8080;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: ImageGuardConfig) -> ImageGuardConfig {
    let config = apply_vision_defaults(config);
    let config = apply_gateway_defaults(config);
    apply_logging_defaults(config)
}

fn apply_vision_defaults(mut config: ImageGuardConfig) -> ImageGuardConfig {
    let vision = config.vision.get_or_insert_with(VisionConfig::default);
    vision.api_base.get_or_insert_with(|| DEFAULT_API_BASE.to_string());
    vision.model.get_or_insert_with(|| DEFAULT_MODEL.to_string());
    vision.max_tokens.get_or_insert(DEFAULT_MAX_TOKENS);
    vision.timeout_secs.get_or_insert(DEFAULT_TIMEOUT_SECS);
    config
}

fn apply_gateway_defaults(mut config: ImageGuardConfig) -> ImageGuardConfig {
    let gateway = config.gateway.get_or_insert_with(GatewayConfig::default);
    gateway.host.get_or_insert_with(|| DEFAULT_HOST.to_string());
    gateway.port.get_or_insert(DEFAULT_PORT);
    config
}

fn apply_logging_defaults(mut config: ImageGuardConfig) -> ImageGuardConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging.level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.format.get_or_insert(LogFormat::Pretty);
    config
}
