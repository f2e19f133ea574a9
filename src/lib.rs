pub mod config;
pub mod domain;
pub mod error;
pub mod observability;
pub mod pipeline;

// Layered boundaries for application and infrastructure
pub mod app;
pub mod infra;

pub use app::ports::{CoordinateResolver, FnResolver, LifecycleReporter};
pub use domain::{Coordinates, GeoRecord, LifecycleEvent, Message, RecordId, Resolution};
pub use error::{GeoFixError, ReporterError, StageError};
pub use pipeline::processing::{GeoFixOperator, GeoFixSubscriber, StageState, StageStats};
pub use pipeline::{Notification, Subscriber, Subscription};
