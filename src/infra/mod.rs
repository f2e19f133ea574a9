// Concrete reporters, resolvers and sinks plugged into the geo-fix stage

pub mod fanout_reporter;
pub mod gazetteer_resolver;
pub mod metrics_reporter;
pub mod ndjson_output_adapter;
pub mod recording_reporter;
pub mod tracing_reporter;

pub use fanout_reporter::FanoutReporter;
pub use gazetteer_resolver::GazetteerResolver;
pub use metrics_reporter::MetricsReporter;
pub use ndjson_output_adapter::NdjsonFileSink;
pub use recording_reporter::{RecordedEvent, RecordingReporter};
pub use tracing_reporter::TracingReporter;
