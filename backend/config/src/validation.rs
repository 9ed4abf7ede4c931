//! Config validation: schema checks with user-friendly error messages.

use crate::schema::ImageGuardConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Emit every finding through `tracing`. Call once a subscriber is installed.
    pub fn log(&self) {
        for warning in &self.warnings {
            tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
        }
        for error in &self.errors {
            tracing::error!(path = %error.path, message = %error.message, "Config error");
        }
    }

    /// All errors on one line, for startup failures printed before logging exists.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
///
/// A missing API key is only a warning here: `invoke` reports it per request,
/// `serve` refuses to start.
pub fn validate(config: &ImageGuardConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_vision(config, &mut report);
    validate_gateway(config, &mut report);
    report
}

fn validate_vision(config: &ImageGuardConfig, report: &mut ValidationReport) {
    let Some(vision) = &config.vision else { return };

    if vision.api_key.as_deref().map(str::is_empty).unwrap_or(true) {
        report.warn("vision.apiKey", "No API key configured; analysis requests will fail");
    }
    if let Some(base) = &vision.api_base {
        if !(base.starts_with("https://") || base.starts_with("http://")) {
            report.error("vision.apiBase", format!("'{base}' is not an http(s) URL"));
        }
    }
    if vision.model.as_deref().map(|m| m.trim().is_empty()).unwrap_or(false) {
        report.error("vision.model", "Model id cannot be empty");
    }
    if vision.max_tokens == Some(0) {
        report.error("vision.maxTokens", "maxTokens must be > 0");
    }
    if vision.timeout_secs == Some(0) {
        report.error("vision.timeoutSecs", "timeoutSecs must be > 0");
    }
}

fn validate_gateway(config: &ImageGuardConfig, report: &mut ValidationReport) {
    let Some(gw) = &config.gateway else { return };
    if let Some(port) = gw.port {
        if port < 1024 && port != 80 && port != 443 {
            report.warn(
                "gateway.port",
                format!("Port {port} requires elevated privileges; consider using a port >= 1024"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply_all_defaults;
    use crate::schema::{GatewayConfig, VisionConfig};

    #[test]
    fn defaults_are_valid_but_warn_about_key() {
        let report = validate(&apply_all_defaults(ImageGuardConfig::default()));
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert_eq!(report.warnings[0].path, "vision.apiKey");
    }

    #[test]
    fn error_summary_lists_every_error() {
        let cfg = ImageGuardConfig {
            vision: Some(VisionConfig {
                max_tokens: Some(0),
                timeout_secs: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let summary = validate(&cfg).error_summary();
        assert!(summary.contains("vision.maxTokens"));
        assert!(summary.contains("vision.timeoutSecs"));
    }

    #[test]
    fn zero_max_tokens_is_error() {
        let cfg = ImageGuardConfig {
            vision: Some(VisionConfig {
                api_key: Some("sk-x".into()),
                max_tokens: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let report = validate(&cfg);
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "vision.maxTokens");
    }

    #[test]
    fn non_http_base_is_error() {
        let cfg = ImageGuardConfig {
            vision: Some(VisionConfig {
                api_base: Some("ftp://example.com".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(!validate(&cfg).is_valid());
    }

    #[test]
    fn privileged_port_warns() {
        let cfg = ImageGuardConfig {
            gateway: Some(GatewayConfig {
                port: Some(81),
                ..Default::default()
            }),
            ..Default::default()
        };
        let report = validate(&cfg);
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].path, "gateway.port");
    }
}
