//! Turns the model's free-text answer into a [`Verdict`].

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument, warn};

use imageguard_core::{GuardError, LocationType, ReasonVocabulary, Verdict, VisionAnalyzer};

/// Exact answer the model gives when nothing is wrong with the image.
pub const VALID_TOKEN: &str = "valid";

/// One surrounding Markdown code fence, optionally tagged (```json).
static CODE_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z0-9_-]*\s*(.*?)\s*```$").unwrap());

pub struct Processor {
    analyzer: Arc<dyn VisionAnalyzer>,
}

impl Processor {
    pub fn new(analyzer: Arc<dyn VisionAnalyzer>) -> Self {
        Self { analyzer }
    }

    pub fn analyzer_name(&self) -> &str {
        self.analyzer.name()
    }

    /// Analyze one image and classify the answer. No retries.
    #[instrument(
        skip(self, image),
        fields(analyzer = self.analyzer.name(), image_bytes = image.len(), location)
    )]
    pub async fn process(
        &self,
        image: &[u8],
        location: Option<&LocationType>,
    ) -> Result<Verdict, GuardError> {
        if let Some(location) = location {
            tracing::Span::current().record("location", location.as_str());
        }
        if image.is_empty() {
            return Err(GuardError::InvalidInput("'image' is empty".into()));
        }

        let completion = self.analyzer.analyze(image, location).await?;
        let content = completion.first_content()?;
        debug!(content_len = content.len(), "Classifying model answer");

        let verdict = classify_content(content)?;
        if let Verdict::Rejected { reasons } = &verdict {
            let vocabulary = ReasonVocabulary::for_location(location);
            for reason in reasons.iter().filter(|r| !vocabulary.contains(r)) {
                warn!(reason = %reason, ?vocabulary, "Model returned an off-vocabulary reason code");
            }
        }
        Ok(verdict)
    }
}

/// `valid` (after trimming, case-sensitive) accepts; anything else must decode
/// as a list of reason codes.
pub fn classify_content(content: &str) -> Result<Verdict, GuardError> {
    if content.trim() == VALID_TOKEN {
        return Ok(Verdict::Accepted);
    }
    let reasons = decode_reasons(content)?;
    Ok(Verdict::Rejected { reasons })
}

/// Decode the model's rejection answer: a JSON array of strings, possibly
/// wrapped in a single code fence.
pub fn decode_reasons(content: &str) -> Result<Vec<String>, GuardError> {
    let trimmed = content.trim();
    let payload = CODE_FENCE_RE
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map_or(trimmed, |m| m.as_str());

    serde_json::from_str::<Vec<String>>(payload).map_err(|e| {
        GuardError::MalformedModelResponse(format!(
            "expected 'valid' or a JSON list of reason codes ({e})"
        ))
    })
}
