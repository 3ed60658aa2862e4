pub mod logging;
pub mod metrics;
pub mod trace_context;

pub use logging::init_tracing;
pub use metrics::{init_metrics, render_metrics};
pub use trace_context::{TRACEPARENT_HEADER, TRACESTATE_HEADER, TracedClientExt, TracedRequest};
