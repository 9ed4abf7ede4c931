use async_trait::async_trait;

use crate::completion::ChatCompletion;
use crate::error::GuardError;
use crate::types::LocationType;

/// A vision-language backend that looks at one image and answers in free text.
///
/// Implementations perform at most one outbound call per `analyze` and do not
/// retry. The raw completion is returned unexamined beyond JSON decoding.
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    /// Backend name (e.g., "openai").
    fn name(&self) -> &str;

    /// Ask the backend about `image`, using the prompt selected by `location`.
    async fn analyze(
        &self,
        image: &[u8],
        location: Option<&LocationType>,
    ) -> Result<ChatCompletion, GuardError>;
}
