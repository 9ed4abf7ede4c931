pub mod completion;
pub mod error;
pub mod reasons;
pub mod settings;
pub mod traits;
pub mod types;

pub use completion::{ChatCompletion, CompletionChoice, CompletionMessage, CompletionUsage};
pub use error::GuardError;
pub use reasons::{ReasonVocabulary, CONTENT_REASONS, SITE_REASONS};
pub use settings::VisionSettings;
pub use traits::VisionAnalyzer;
pub use types::{LocationType, Verdict};
