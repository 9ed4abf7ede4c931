//! Request handler: one inbound event in, one response envelope out.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use serde_json::Value;
use tracing::{error, warn};

use imageguard_config::ImageGuardConfig;
use imageguard_core::{GuardError, LocationType, Verdict, VisionSettings};
use imageguard_logging::{EventLogger, VerdictEvent, redact_sensitive_data};
use imageguard_understanding::{OpenAiAnalyzer, Processor};

use crate::envelope::ResponseEnvelope;
use crate::event::{AnalysisInput, InboundEvent};

/// Fixed 400 detail for events that do not deserialize. The serde message can
/// quote the caller's payload, so it never reaches the body or the logs.
const NOT_AN_OBJECT: &str = "event is not an object";

pub struct EventHandler {
    processor: Processor,
}

impl EventHandler {
    pub fn new(processor: Processor) -> Self {
        Self { processor }
    }

    /// Handler backed by the OpenAI analyzer.
    pub fn from_settings(settings: VisionSettings) -> Result<Self, GuardError> {
        let analyzer = OpenAiAnalyzer::new(settings)?;
        Ok(Self::new(Processor::new(Arc::new(analyzer))))
    }

    pub fn analyzer_name(&self) -> &str {
        self.processor.analyzer_name()
    }

    /// Handle a raw JSON event. A shape that does not deserialize is a 400.
    pub async fn handle_value(&self, event: Value) -> ResponseEnvelope {
        match serde_json::from_value::<InboundEvent>(event) {
            Ok(event) => self.handle(&event).await,
            Err(_) => reject_input(GuardError::InvalidInput(NOT_AN_OBJECT.into())),
        }
    }

    /// Validation failures answer 400 before the analyzer is touched.
    pub async fn handle(&self, event: &InboundEvent) -> ResponseEnvelope {
        match event.resolve() {
            Ok(input) => self.handle_input(input).await,
            Err(err) => reject_input(err),
        }
    }

    /// Run the processor on already-decoded input. Never panics outward.
    pub async fn handle_input(&self, input: AnalysisInput) -> ResponseEnvelope {
        let start = Instant::now();
        let outcome = AssertUnwindSafe(self.processor.process(&input.image, input.location.as_ref()))
            .catch_unwind()
            .await;

        match outcome {
            Ok(result) => respond(result, input.location.as_ref(), start),
            Err(_) => {
                error!("Processor panicked; answering 500");
                let envelope = ResponseEnvelope::internal();
                EventLogger::log_verdict(
                    &VerdictEvent::new(envelope.status_code)
                        .with_location(input.location.as_ref().map(LocationType::as_str))
                        .with_latency_ms(start.elapsed().as_millis() as u64)
                        .with_error("processor panicked"),
                );
                envelope
            }
        }
    }
}

fn reject_input(err: GuardError) -> ResponseEnvelope {
    warn!(
        kind = err.kind(),
        error = %redact_sensitive_data(&err.to_string()),
        "Rejecting inbound event"
    );
    respond(Err(err), None, Instant::now())
}

fn respond(
    result: Result<Verdict, GuardError>,
    location: Option<&LocationType>,
    start: Instant,
) -> ResponseEnvelope {
    let (envelope, event) = match &result {
        Ok(verdict) => {
            let envelope = ResponseEnvelope::from_verdict(verdict);
            let event = VerdictEvent::new(envelope.status_code).with_reasons(verdict.reasons().len());
            (envelope, event)
        }
        Err(err) => {
            if err.status_code() >= 500 {
                error!(
                    kind = err.kind(),
                    error = %redact_sensitive_data(&err.to_string()),
                    "Image analysis failed"
                );
            }
            let envelope = ResponseEnvelope::from_error(err);
            let event = VerdictEvent::new(envelope.status_code).with_error(err);
            (envelope, event)
        }
    };
    EventLogger::log_verdict(
        &event
            .with_location(location.map(LocationType::as_str))
            .with_latency_ms(start.elapsed().as_millis() as u64),
    );
    envelope
}

/// Per-invocation entry point.
///
/// Reads configuration from `env` at call time, so nothing is cached across
/// invocations. Input is validated first: a bad event is a 400 even when the
/// credential is also missing.
pub async fn invoke_with_env(event: Value, env: &HashMap<String, String>) -> ResponseEnvelope {
    invoke_with_config(event, &ImageGuardConfig::default(), env).await
}

/// Like [`invoke_with_env`], with `env` layered over an already loaded config file.
pub async fn invoke_with_config(
    event: Value,
    base: &ImageGuardConfig,
    env: &HashMap<String, String>,
) -> ResponseEnvelope {
    let input = match serde_json::from_value::<InboundEvent>(event) {
        Ok(event) => match event.resolve() {
            Ok(input) => input,
            Err(err) => return reject_input(err),
        },
        Err(_) => return reject_input(GuardError::InvalidInput(NOT_AN_OBJECT.into())),
    };

    let handler = imageguard_config::overlay_env(base.clone(), env)
        .map_err(|e| GuardError::Config(format!("{e:#}")))
        .and_then(|config| config.vision_settings())
        .and_then(EventHandler::from_settings);

    match handler {
        Ok(handler) => handler.handle_input(input).await,
        Err(err) => respond(Err(err), input.location.as_ref(), Instant::now()),
    }
}
