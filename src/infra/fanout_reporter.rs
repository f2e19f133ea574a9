use std::sync::Arc;

use crate::app::ports::LifecycleReporter;
use crate::domain::RecordId;
use crate::error::ReporterError;

/// Reporter that forwards every event to several reporters in order.
///
/// Stops at the first failing reporter and returns its error.
#[derive(Default)]
pub struct FanoutReporter {
    reporters: Vec<Arc<dyn LifecycleReporter>>,
}

impl FanoutReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, reporter: Arc<dyn LifecycleReporter>) -> Self {
        self.reporters.push(reporter);
        self
    }

    pub fn len(&self) -> usize {
        self.reporters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reporters.is_empty()
    }

    fn each(
        &self,
        report: impl Fn(&dyn LifecycleReporter) -> Result<(), ReporterError>,
    ) -> Result<(), ReporterError> {
        self.reporters
            .iter()
            .try_for_each(|reporter| report(reporter.as_ref()))
    }
}

impl LifecycleReporter for FanoutReporter {
    fn report_element_started(&self, id: &RecordId) -> Result<(), ReporterError> {
        self.each(|reporter| reporter.report_element_started(id))
    }

    fn report_element_ended(&self, id: &RecordId) -> Result<(), ReporterError> {
        self.each(|reporter| reporter.report_element_ended(id))
    }

    fn report_stage_completed(&self) -> Result<(), ReporterError> {
        self.each(|reporter| reporter.report_stage_completed())
    }

    fn report_stage_errored(&self) -> Result<(), ReporterError> {
        self.each(|reporter| reporter.report_stage_errored())
    }
}
