//! Metrics for the geo-fix stage
//!
//! Counters are recorded through the `metrics` facade. Without an installed
//! recorder every call is a no-op, so the stage can always record.

use std::fmt;

/// Every metric name emitted by the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    ElementsStarted,
    ElementsEnded,
    StagesCompleted,
    StagesErrored,
    RecordsFixed,
    RecordsUnresolved,
}

impl MetricName {
    pub const ALL: [MetricName; 6] = [
        MetricName::ElementsStarted,
        MetricName::ElementsEnded,
        MetricName::StagesCompleted,
        MetricName::StagesErrored,
        MetricName::RecordsFixed,
        MetricName::RecordsUnresolved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::ElementsStarted => "geofix_elements_started_total",
            MetricName::ElementsEnded => "geofix_elements_ended_total",
            MetricName::StagesCompleted => "geofix_stages_completed_total",
            MetricName::StagesErrored => "geofix_stages_errored_total",
            MetricName::RecordsFixed => "geofix_records_fixed_total",
            MetricName::RecordsUnresolved => "geofix_records_unresolved_total",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MetricName::ElementsStarted => "Elements whose processing started",
            MetricName::ElementsEnded => "Elements whose processing ended",
            MetricName::StagesCompleted => "Stages that completed normally",
            MetricName::StagesErrored => "Stages terminated by an error",
            MetricName::RecordsFixed => "Records that received coordinates",
            MetricName::RecordsUnresolved => "Records left without new coordinates",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Register descriptions with whichever recorder is installed
pub fn describe_all() {
    for name in MetricName::ALL {
        ::metrics::describe_counter!(name.as_str(), name.description());
    }
}

pub mod geofix {
    use super::MetricName;

    pub fn element_started(plugin: &str) {
        ::metrics::counter!(MetricName::ElementsStarted.as_str(), "plugin" => plugin.to_string()).increment(1);
    }

    pub fn element_ended(plugin: &str) {
        ::metrics::counter!(MetricName::ElementsEnded.as_str(), "plugin" => plugin.to_string()).increment(1);
    }

    pub fn stage_completed(plugin: &str) {
        ::metrics::counter!(MetricName::StagesCompleted.as_str(), "plugin" => plugin.to_string()).increment(1);
    }

    pub fn stage_errored(plugin: &str) {
        ::metrics::counter!(MetricName::StagesErrored.as_str(), "plugin" => plugin.to_string()).increment(1);
    }

    /// Record the outcome counts of a finished run
    pub fn run_outcome(plugin: &str, fixed: u64, unresolved: u64) {
        ::metrics::counter!(MetricName::RecordsFixed.as_str(), "plugin" => plugin.to_string()).increment(fixed);
        ::metrics::counter!(MetricName::RecordsUnresolved.as_str(), "plugin" => plugin.to_string())
            .increment(unresolved);
    }
}
