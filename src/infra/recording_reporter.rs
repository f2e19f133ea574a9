use chrono::{DateTime, Utc};
use std::sync::Mutex;

use crate::app::ports::LifecycleReporter;
use crate::domain::{LifecycleEvent, RecordId};
use crate::error::ReporterError;

/// A lifecycle event together with the moment it was reported
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub event: LifecycleEvent,
    pub reported_at: DateTime<Utc>,
}

/// Reporter that keeps a timestamped, in-memory log of everything reported
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, event: LifecycleEvent) -> Result<(), ReporterError> {
        let mut events = self
            .events
            .lock()
            .map_err(|e| ReporterError::Unavailable(format!("event log poisoned: {}", e)))?;
        events.push(RecordedEvent {
            event,
            reported_at: Utc::now(),
        });
        Ok(())
    }

    pub fn recorded(&self) -> Vec<RecordedEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Events in the order they were reported, without timestamps
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.recorded().into_iter().map(|recorded| recorded.event).collect()
    }

    pub fn completed_count(&self) -> usize {
        self.count(|event| matches!(event, LifecycleEvent::StageCompleted))
    }

    pub fn errored_count(&self) -> usize {
        self.count(|event| matches!(event, LifecycleEvent::StageErrored))
    }

    fn count(&self, predicate: impl Fn(&LifecycleEvent) -> bool) -> usize {
        self.events().iter().filter(|event| predicate(event)).count()
    }
}

impl LifecycleReporter for RecordingReporter {
    fn report_element_started(&self, id: &RecordId) -> Result<(), ReporterError> {
        self.record(LifecycleEvent::ElementStarted(id.clone()))
    }

    fn report_element_ended(&self, id: &RecordId) -> Result<(), ReporterError> {
        self.record(LifecycleEvent::ElementEnded(id.clone()))
    }

    fn report_stage_completed(&self) -> Result<(), ReporterError> {
        self.record(LifecycleEvent::StageCompleted)
    }

    fn report_stage_errored(&self) -> Result<(), ReporterError> {
        self.record(LifecycleEvent::StageErrored)
    }
}
