use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn, Instrument, Span};
use uuid::Uuid;

use crate::app::ports::{CoordinateResolver, LifecycleReporter};
use crate::domain::{GeoRecord, Resolution};
use crate::error::StageError;
use crate::pipeline::{Subscriber, Subscription};

pub const DEFAULT_PLUGIN_NAME: &str = "geofix";

/// Lifecycle of one stage instance over one sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StageState {
    Idle,
    Active,
    Completed,
    Errored,
}

impl StageState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StageState::Completed | StageState::Errored)
    }
}

/// Per-stage counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageStats {
    /// Records that went through resolution and were emitted
    pub processed: u64,
    /// Records whose coordinates were overwritten
    pub fixed: u64,
    /// Records left untouched because nothing usable was resolved
    pub unresolved: u64,
}

/// Apply a resolution to a record. Returns whether the record was changed.
pub fn apply_resolution<R: GeoRecord>(record: &mut R, resolution: &Resolution) -> bool {
    match resolution {
        Resolution::Resolved(coordinates) => {
            record.set_coordinates(coordinates.latitude, coordinates.longitude);
            true
        }
        Resolution::Unresolved => false,
    }
}

/// Operator that approximates the geo-location of every record in a stream.
///
/// The operator owns no stream state; `call` wraps a downstream subscriber in a
/// `GeoFixSubscriber` that does the actual work for one sequence. The only
/// stage-specific piece is the injected `CoordinateResolver`.
pub struct GeoFixOperator<R> {
    plugin_name: String,
    reporter: Arc<dyn LifecycleReporter>,
    resolver: Arc<dyn CoordinateResolver<R>>,
}

impl<R> Clone for GeoFixOperator<R> {
    fn clone(&self) -> Self {
        Self {
            plugin_name: self.plugin_name.clone(),
            reporter: Arc::clone(&self.reporter),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<R: GeoRecord + 'static> GeoFixOperator<R> {
    pub fn new(reporter: Arc<dyn LifecycleReporter>, resolver: Arc<dyn CoordinateResolver<R>>) -> Self {
        Self {
            plugin_name: DEFAULT_PLUGIN_NAME.to_string(),
            reporter,
            resolver,
        }
    }

    pub fn with_plugin_name(mut self, plugin_name: impl Into<String>) -> Self {
        self.plugin_name = plugin_name.into();
        self
    }

    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    /// Wrap `downstream` so that every record pushed into the returned
    /// subscriber is geo-fixed before reaching it.
    pub fn call<S: Subscriber<R>>(&self, downstream: S) -> GeoFixSubscriber<R, S> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("geofix_stage", plugin = %self.plugin_name, run_id = %run_id);
        GeoFixSubscriber {
            operator: self.clone(),
            downstream,
            state: StageState::Idle,
            stats: StageStats::default(),
            subscription: Subscription::new(),
            run_id,
            span,
        }
    }

    /// Resolve coordinates for `record` and write them into it when the
    /// resolution is usable. Returns whether the record was changed.
    pub async fn geo_fix(&self, record: &mut R) -> Result<bool, StageError> {
        let resolution = self
            .resolver
            .resolve(record)
            .await
            .map_err(|source| StageError::Resolution { id: record.id(), source })?;

        let fixed = apply_resolution(record, &resolution);
        if !fixed {
            debug!(id = %record.id(), "No usable coordinates resolved, leaving record untouched");
        }
        Ok(fixed)
    }
}

/// Subscriber produced by `GeoFixOperator::call`.
///
/// Brackets the processing of every record with element lifecycle reports,
/// reports completion or failure of the whole stage before forwarding the
/// terminal signal, and goes silent once terminated or unsubscribed.
pub struct GeoFixSubscriber<R, S> {
    operator: GeoFixOperator<R>,
    downstream: S,
    state: StageState,
    stats: StageStats,
    subscription: Subscription,
    run_id: Uuid,
    span: Span,
}

impl<R, S> GeoFixSubscriber<R, S>
where
    R: GeoRecord + 'static,
    S: Subscriber<R>,
{
    pub fn state(&self) -> StageState {
        self.state
    }

    pub fn stats(&self) -> StageStats {
        self.stats
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Handle the host can use to cancel this stage
    pub fn subscription(&self) -> Subscription {
        self.subscription.clone()
    }

    pub fn downstream(&self) -> &S {
        &self.downstream
    }

    pub fn into_downstream(self) -> S {
        self.downstream
    }

    fn activate(&mut self) {
        if self.state == StageState::Idle {
            debug!("Stage active");
            self.state = StageState::Active;
        }
    }

    async fn handle_next(&mut self, mut record: R) {
        if self.state.is_terminal() {
            warn!(id = %record.id(), state = ?self.state, "Dropping element received after terminal signal");
            return;
        }
        if self.is_unsubscribed() {
            debug!(id = %record.id(), "Dropping element, stage unsubscribed");
            return;
        }
        self.activate();

        let id = record.id();
        if let Err(e) = self.operator.reporter.report_element_started(&id) {
            self.fail(e.into()).await;
            return;
        }

        let outcome = self.operator.geo_fix(&mut record).await;
        let fixed = match outcome {
            Ok(fixed) => fixed,
            Err(e) => {
                self.fail(e).await;
                return;
            }
        };

        if self.is_unsubscribed() {
            debug!(id = %id, "Stage unsubscribed during resolution, not emitting");
            return;
        }

        if let Err(e) = self.operator.reporter.report_element_ended(&id) {
            self.fail(e.into()).await;
            return;
        }

        self.stats.processed += 1;
        if fixed {
            self.stats.fixed += 1;
        } else {
            self.stats.unresolved += 1;
        }

        self.downstream.on_next(record).await;
    }

    async fn handle_completed(&mut self) {
        if self.state.is_terminal() || self.is_unsubscribed() {
            debug!(state = ?self.state, "Ignoring completion");
            return;
        }
        self.activate();

        if let Err(e) = self.operator.reporter.report_stage_completed() {
            self.fail(e.into()).await;
            return;
        }
        self.state = StageState::Completed;
        info!(
            processed = self.stats.processed,
            fixed = self.stats.fixed,
            unresolved = self.stats.unresolved,
            "Geo-fix stage completed"
        );

        self.downstream.on_completed().await;
    }

    async fn fail(&mut self, error: StageError) {
        if self.state.is_terminal() {
            warn!(error = %error, state = ?self.state, "Ignoring error received after terminal signal");
            return;
        }
        if self.is_unsubscribed() {
            debug!(error = %error, "Ignoring error, stage unsubscribed");
            return;
        }
        self.state = StageState::Errored;

        if let Err(report_error) = self.operator.reporter.report_stage_errored() {
            warn!(error = %report_error, "Failed to report stage error");
        }
        error!(error = %error, processed = self.stats.processed, "Geo-fix stage errored");

        self.downstream.on_error(error).await;
    }
}

#[async_trait]
impl<R, S> Subscriber<R> for GeoFixSubscriber<R, S>
where
    R: GeoRecord + 'static,
    S: Subscriber<R>,
{
    async fn on_next(&mut self, record: R) {
        let span = self.span.clone();
        self.handle_next(record).instrument(span).await
    }

    async fn on_completed(&mut self) {
        let span = self.span.clone();
        self.handle_completed().instrument(span).await
    }

    async fn on_error(&mut self, error: StageError) {
        let span = self.span.clone();
        self.fail(error).instrument(span).await
    }

    fn is_unsubscribed(&self) -> bool {
        self.subscription.is_unsubscribed() || self.downstream.is_unsubscribed()
    }
}
