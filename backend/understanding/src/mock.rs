use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use imageguard_core::{ChatCompletion, GuardError, LocationType, VisionAnalyzer};

enum Reply {
    Completion(ChatCompletion),
    Transport(String),
}

/// An analyzer that returns a canned answer and records how it was called.
pub struct MockAnalyzer {
    reply: Reply,
    calls: AtomicUsize,
    last_location: Mutex<Option<String>>,
}

impl MockAnalyzer {
    fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_location: Mutex::new(None),
        }
    }

    /// Answer every call with a single choice carrying `content`.
    pub fn with_text(content: impl Into<String>) -> Self {
        Self::new(Reply::Completion(ChatCompletion::from_text(content)))
    }

    /// Answer with a completion that has no choices.
    pub fn empty() -> Self {
        Self::new(Reply::Completion(ChatCompletion::default()))
    }

    /// Fail every call as if the connection dropped.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(Reply::Transport(message.into()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_location(&self) -> Option<String> {
        self.last_location.lock().ok().and_then(|l| l.clone())
    }
}

#[async_trait]
impl VisionAnalyzer for MockAnalyzer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn analyze(
        &self,
        _image: &[u8],
        location: Option<&LocationType>,
    ) -> Result<ChatCompletion, GuardError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_location.lock() {
            *last = location.map(|l| l.as_str().to_string());
        }
        match &self.reply {
            Reply::Completion(completion) => Ok(completion.clone()),
            Reply::Transport(message) => Err(GuardError::UpstreamTransport(message.clone())),
        }
    }
}
