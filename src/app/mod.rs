pub mod ports;
pub mod geofix_use_case;

pub use geofix_use_case::{GeoFixRunSummary, GeoFixUseCase};
