use tracing::{debug, info, warn};

use crate::app::ports::LifecycleReporter;
use crate::domain::RecordId;
use crate::error::ReporterError;

/// Reporter that turns lifecycle events into structured log lines
pub struct TracingReporter {
    plugin_name: String,
}

impl TracingReporter {
    pub fn new(plugin_name: impl Into<String>) -> Self {
        Self {
            plugin_name: plugin_name.into(),
        }
    }
}

impl LifecycleReporter for TracingReporter {
    fn report_element_started(&self, id: &RecordId) -> Result<(), ReporterError> {
        debug!(plugin = %self.plugin_name, id = %id, "Element started");
        Ok(())
    }

    fn report_element_ended(&self, id: &RecordId) -> Result<(), ReporterError> {
        debug!(plugin = %self.plugin_name, id = %id, "Element ended");
        Ok(())
    }

    fn report_stage_completed(&self) -> Result<(), ReporterError> {
        info!(plugin = %self.plugin_name, "Plugin completed");
        Ok(())
    }

    fn report_stage_errored(&self) -> Result<(), ReporterError> {
        warn!(plugin = %self.plugin_name, "Plugin errored");
        Ok(())
    }
}
