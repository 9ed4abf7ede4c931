//! Inbound event shapes.
//!
//! Accepts a direct event (`{"image": "<b64>", "location_type": "interior"}`) or a
//! proxy-style event whose `body` carries that JSON, optionally base64-encoded.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use imageguard_core::{GuardError, LocationType};
use imageguard_understanding::decode_base64;

const IMAGE_FIELD: &str = "'image'";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InboundEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, alias = "locationType", skip_serializing_if = "Option::is_none")]
    pub location_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(default, rename = "isBase64Encoded")]
    pub is_base64_encoded: bool,

    #[serde(default, rename = "queryStringParameters", skip_serializing_if = "Option::is_none")]
    pub query_string_parameters: Option<HashMap<String, String>>,
}

/// Decoded, validated input for one analysis.
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    pub image: Vec<u8>,
    pub location: Option<LocationType>,
}

impl InboundEvent {
    pub fn new(image: impl Into<String>, location_type: Option<&str>) -> Self {
        Self {
            image: Some(image.into()),
            location_type: location_type.map(str::to_string),
            ..Default::default()
        }
    }

    fn location_hint(&self) -> Option<&str> {
        self.location_type.as_deref().or_else(|| {
            self.query_string_parameters
                .as_ref()
                .and_then(|q| q.get("location_type"))
                .map(String::as_str)
        })
    }

    /// Validate the event and decode the image. Errors are always `InvalidInput`.
    pub fn resolve(&self) -> Result<AnalysisInput, GuardError> {
        if let Some(image) = &self.image {
            return Ok(AnalysisInput {
                image: decode_base64(image)?,
                location: LocationType::parse(self.location_hint()),
            });
        }

        let Some(body) = &self.body else {
            return Err(GuardError::InvalidInput(IMAGE_FIELD.into()));
        };
        let raw = if self.is_base64_encoded {
            decode_base64(body)?
        } else {
            body.as_bytes().to_vec()
        };
        let inner: InboundEvent = serde_json::from_slice(&raw)
            .map_err(|_| GuardError::InvalidInput("request body is not a JSON event".into()))?;
        let image = inner
            .image
            .as_deref()
            .ok_or_else(|| GuardError::InvalidInput(IMAGE_FIELD.into()))?;

        Ok(AnalysisInput {
            image: decode_base64(image)?,
            location: LocationType::parse(inner.location_hint().or_else(|| self.location_hint())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: serde_json::Value) -> InboundEvent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn direct_event_decodes_image() {
        let input = event(json!({ "image": "aGVsbG8=", "location_type": "interior" }))
            .resolve()
            .unwrap();
        assert_eq!(input.image, b"hello");
        assert_eq!(input.location.unwrap().as_str(), "interior");
    }

    #[test]
    fn missing_image_names_the_field() {
        let err = event(json!({ "location_type": "exterior" })).resolve().unwrap_err();
        assert_eq!(err.public_message(), "Missing or invalid data: 'image'");
    }

    #[test]
    fn empty_location_means_generic_mode() {
        let input = event(json!({ "image": "aGVsbG8=", "location_type": "" })).resolve().unwrap();
        assert!(input.location.is_none());
    }

    #[test]
    fn proxy_body_is_unwrapped() {
        let inner = json!({ "image": "aGVsbG8=", "locationType": "exterior" }).to_string();
        let input = event(json!({ "body": inner, "isBase64Encoded": false })).resolve().unwrap();
        assert_eq!(input.image, b"hello");
        assert_eq!(input.location.unwrap().as_str(), "exterior");
    }

    #[test]
    fn base64_proxy_body_with_query_location() {
        let inner = imageguard_understanding::encode_base64(
            json!({ "image": "aGVsbG8=" }).to_string().as_bytes(),
        );
        let input = event(json!({
            "body": inner,
            "isBase64Encoded": true,
            "queryStringParameters": { "location_type": "interior" }
        }))
        .resolve()
        .unwrap();
        assert_eq!(input.location.unwrap().as_str(), "interior");
    }

    #[test]
    fn proxy_body_without_image_is_invalid() {
        let err = event(json!({ "body": "{}" })).resolve().unwrap_err();
        assert!(matches!(err, GuardError::InvalidInput(_)));
    }

    #[test]
    fn proxy_body_string_is_not_quoted_in_error() {
        let payload = format!("\"{}\"", "Z".repeat(200));
        let err = event(json!({ "body": payload })).resolve().unwrap_err();
        assert_eq!(
            err.public_message(),
            "Missing or invalid data: request body is not a JSON event"
        );
    }
}
