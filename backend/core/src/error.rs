use thiserror::Error;

/// Error taxonomy for one analysis invocation.
///
/// A rejected image is not an error; it is a [`crate::Verdict::Rejected`].
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("vision API transport failure: {0}")]
    UpstreamTransport(String),

    #[error("vision API returned {status}: {message}")]
    UpstreamStatus { status: u16, message: String },

    #[error("malformed model response: {0}")]
    MalformedModelResponse(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl GuardError {
    /// HTTP status the entry point answers with for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            GuardError::InvalidInput(_) => 400,
            _ => 500,
        }
    }

    /// Message that is safe to return to callers.
    ///
    /// Only `InvalidInput` echoes its detail, since that detail is derived from
    /// the caller's own request. Every other variant uses a fixed string.
    pub fn public_message(&self) -> String {
        match self {
            GuardError::InvalidInput(detail) => format!("Missing or invalid data: {detail}"),
            GuardError::UpstreamTransport(_) | GuardError::UpstreamStatus { .. } => {
                "Unexpected error: vision service request failed".to_string()
            }
            GuardError::MalformedModelResponse(_) => {
                "Unexpected error: Invalid JSON response".to_string()
            }
            GuardError::Config(_) => "Unexpected error: service is not configured".to_string(),
        }
    }

    /// Short machine-readable kind, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            GuardError::InvalidInput(_) => "invalid_input",
            GuardError::UpstreamTransport(_) => "upstream_transport",
            GuardError::UpstreamStatus { .. } => "upstream_status",
            GuardError::MalformedModelResponse(_) => "malformed_model_response",
            GuardError::Config(_) => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_maps_to_400() {
        let err = GuardError::InvalidInput("image".into());
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.public_message(), "Missing or invalid data: image");
    }

    #[test]
    fn upstream_failures_map_to_500() {
        let errs = [
            GuardError::UpstreamTransport("connection refused".into()),
            GuardError::UpstreamStatus { status: 502, message: "bad gateway".into() },
            GuardError::MalformedModelResponse("maybe?".into()),
            GuardError::Config("OPENAI_API_KEY is not set".into()),
        ];
        for err in errs {
            assert_eq!(err.status_code(), 500, "{err}");
        }
    }

    #[test]
    fn public_message_hides_upstream_detail() {
        let err = GuardError::UpstreamStatus {
            status: 401,
            message: "Incorrect API key provided: sk-abc".into(),
        };
        assert!(!err.public_message().contains("sk-abc"));
    }
}
