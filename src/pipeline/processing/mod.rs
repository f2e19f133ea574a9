// Record processing stages

pub mod geofix;

pub use geofix::{GeoFixOperator, GeoFixSubscriber, StageState, StageStats};
