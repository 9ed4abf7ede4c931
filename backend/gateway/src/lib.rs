//! ImageGuard entry point: turns inbound events into response envelopes and
//! serves them over HTTP.

pub mod envelope;
pub mod event;
pub mod handler;
pub mod server;

pub use envelope::ResponseEnvelope;
pub use event::{AnalysisInput, InboundEvent};
pub use handler::{EventHandler, invoke_with_config, invoke_with_env};
pub use server::{build_router, start_server, GatewayState};
