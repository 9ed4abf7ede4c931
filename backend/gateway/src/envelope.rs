//! HTTP-style response envelope: `{statusCode, body, headers}`.

use std::collections::BTreeMap;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use imageguard_core::{GuardError, Verdict};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const APPLICATION_JSON: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    /// JSON-serialized body.
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

impl ResponseEnvelope {
    fn json(status_code: u16, body: Value) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string());
        Self {
            status_code,
            body: body.to_string(),
            headers,
        }
    }

    /// 200 with an empty object body.
    pub fn ok() -> Self {
        Self::json(200, json!({}))
    }

    /// 403 carrying the rejection reasons in model order.
    pub fn rejected(reasons: &[String]) -> Self {
        Self::json(403, json!({ "reason": reasons }))
    }

    pub fn from_verdict(verdict: &Verdict) -> Self {
        match verdict {
            Verdict::Accepted => Self::ok(),
            Verdict::Rejected { reasons } => Self::rejected(reasons),
        }
    }

    /// 400 or 500 with a non-leaking `error` message.
    pub fn from_error(error: &GuardError) -> Self {
        Self::json(error.status_code(), json!({ "error": error.public_message() }))
    }

    /// 500 for failures outside the error taxonomy (e.g. a panic).
    pub fn internal() -> Self {
        Self::json(500, json!({ "error": "Unexpected error: internal failure" }))
    }

    /// Parsed body. `Value::Null` if the body is somehow not JSON.
    pub fn body_json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, self.body).into_response();
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                response.headers_mut().insert(name, value);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_lambda_shape() {
        let value = serde_json::to_value(ResponseEnvelope::ok()).unwrap();
        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["body"], "{}");
        assert_eq!(value["headers"]["Content-Type"], "application/json");
    }

    #[test]
    fn rejected_body_lists_reasons() {
        let env = ResponseEnvelope::rejected(&["PRESENCE_OF_FACES".to_string()]);
        assert_eq!(env.status_code, 403);
        assert_eq!(env.body_json(), json!({ "reason": ["PRESENCE_OF_FACES"] }));
    }

    #[test]
    fn every_envelope_is_json_typed() {
        let envelopes = [
            ResponseEnvelope::ok(),
            ResponseEnvelope::rejected(&[]),
            ResponseEnvelope::from_error(&GuardError::InvalidInput("'image'".into())),
            ResponseEnvelope::from_error(&GuardError::Config("no key".into())),
            ResponseEnvelope::internal(),
        ];
        for env in envelopes {
            assert_eq!(env.headers.get(CONTENT_TYPE).map(String::as_str), Some(APPLICATION_JSON));
            assert!(env.body_json().is_object());
        }
    }

    #[test]
    fn error_envelope_does_not_echo_upstream_detail() {
        let env = ResponseEnvelope::from_error(&GuardError::UpstreamTransport(
            "error sending request to https://api.openai.com with sk-secret".into(),
        ));
        assert_eq!(env.status_code, 500);
        assert!(!env.body.contains("sk-secret"));
    }
}
