pub mod image;
pub mod mock;
pub mod processor;
pub mod prompt;
pub mod vision;

pub use image::{decode_base64, encode_base64, jpeg_data_url};
pub use mock::MockAnalyzer;
pub use processor::{classify_content, decode_reasons, Processor, VALID_TOKEN};
pub use prompt::build_prompt;
pub use vision::OpenAiAnalyzer;
