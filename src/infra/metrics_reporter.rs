use crate::app::ports::LifecycleReporter;
use crate::domain::RecordId;
use crate::error::ReporterError;
use crate::observability::metrics::geofix;

/// Reporter that counts lifecycle events through the metrics facade
pub struct MetricsReporter {
    plugin_name: String,
}

impl MetricsReporter {
    pub fn new(plugin_name: impl Into<String>) -> Self {
        Self {
            plugin_name: plugin_name.into(),
        }
    }
}

impl LifecycleReporter for MetricsReporter {
    fn report_element_started(&self, _id: &RecordId) -> Result<(), ReporterError> {
        geofix::element_started(&self.plugin_name);
        Ok(())
    }

    fn report_element_ended(&self, _id: &RecordId) -> Result<(), ReporterError> {
        geofix::element_ended(&self.plugin_name);
        Ok(())
    }

    fn report_stage_completed(&self) -> Result<(), ReporterError> {
        geofix::stage_completed(&self.plugin_name);
        Ok(())
    }

    fn report_stage_errored(&self) -> Result<(), ReporterError> {
        geofix::stage_errored(&self.plugin_name);
        Ok(())
    }
}
