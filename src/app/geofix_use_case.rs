use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::app::ports::{CoordinateResolver, LifecycleReporter};
use crate::config::Config;
use crate::domain::Message;
use crate::error::StageError;
use crate::infra::{GazetteerResolver, NdjsonFileSink};
use crate::observability::metrics::geofix;
use crate::pipeline::processing::{GeoFixOperator, StageState, StageStats};
use crate::pipeline::source::drive_channel;

/// Outcome of one geo-fix run over a file
#[derive(Debug, Clone, Serialize)]
pub struct GeoFixRunSummary {
    pub run_id: Uuid,
    pub plugin_name: String,
    pub state: StageState,
    pub stats: StageStats,
    pub written: u64,
    pub error: Option<String>,
    pub output_file: String,
}

impl GeoFixRunSummary {
    pub fn succeeded(&self) -> bool {
        self.state == StageState::Completed
    }
}

/// Use case for geo-fixing a file of newline-delimited JSON messages
pub struct GeoFixUseCase {
    operator: GeoFixOperator<Message>,
    channel_capacity: usize,
}

impl GeoFixUseCase {
    pub fn new(operator: GeoFixOperator<Message>, channel_capacity: usize) -> Self {
        Self {
            operator,
            channel_capacity: channel_capacity.max(1),
        }
    }

    /// Build the use case with a gazetteer resolver taken from configuration
    pub fn from_config(config: &Config, reporter: Arc<dyn LifecycleReporter>) -> Self {
        let resolver: Arc<dyn CoordinateResolver<Message>> =
            Arc::new(GazetteerResolver::from_config(&config.resolver));
        let operator = GeoFixOperator::new(reporter, resolver).with_plugin_name(config.stage.plugin_name.clone());
        Self::new(operator, config.stage.channel_capacity)
    }

    pub fn operator(&self) -> &GeoFixOperator<Message> {
        &self.operator
    }

    /// Stream `input` through the stage into `output`.
    ///
    /// A stage error (unparseable line, failing resolver or reporter) ends the
    /// run early but is reported in the summary rather than returned. Only
    /// failures to open the input or write the output are returned as errors.
    pub async fn run_file(&self, input: &Path, output: &str) -> Result<GeoFixRunSummary> {
        let file = tokio::fs::File::open(input)
            .await
            .with_context(|| format!("Failed to open input file '{}'", input.display()))?;
        let sink: NdjsonFileSink<Message> = NdjsonFileSink::create(output)
            .with_context(|| format!("Failed to create output file '{}'", output))?;

        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let reader = tokio::spawn(read_messages(file, tx));

        let mut stage = self.operator.call(sink);
        info!(run_id = %stage.run_id(), input = %input.display(), output = %output, "Starting geo-fix run");
        drive_channel(rx, &mut stage).await;

        if let Err(e) = reader.await {
            warn!(error = %e, "Input reader task failed");
        }

        let run_id = stage.run_id();
        let state = stage.state();
        let stats = stage.stats();
        let mut sink = stage.into_downstream();
        if let Some(e) = sink.take_write_error() {
            return Err(e).with_context(|| format!("Failed to write output file '{}'", output));
        }

        geofix::run_outcome(self.operator.plugin_name(), stats.fixed, stats.unresolved);

        let summary = GeoFixRunSummary {
            run_id,
            plugin_name: self.operator.plugin_name().to_string(),
            state,
            stats,
            written: sink.written(),
            error: sink.stage_error().map(|e| e.to_string()),
            output_file: sink.file_path().to_string(),
        };
        info!(
            run_id = %summary.run_id,
            state = ?summary.state,
            written = summary.written,
            "Geo-fix run finished"
        );
        Ok(summary)
    }
}

/// Read NDJSON messages into `tx` until the input ends, a line fails to parse,
/// or the receiving side goes away. Blank lines are skipped.
async fn read_messages(file: tokio::fs::File, tx: mpsc::Sender<std::result::Result<Message, StageError>>) {
    let mut lines = BufReader::new(file).lines();
    let mut line_number = 0usize;

    loop {
        let item = match lines.next_line().await {
            Ok(Some(line)) => {
                line_number += 1;
                if line.trim().is_empty() {
                    continue;
                }
                serde_json::from_str::<Message>(&line).map_err(|e| {
                    StageError::upstream(anyhow::anyhow!("invalid message on line {}: {}", line_number, e))
                })
            }
            Ok(None) => return,
            Err(e) => Err(StageError::upstream(
                anyhow::Error::new(e).context(format!("failed reading line {}", line_number + 1)),
            )),
        };

        let is_error = item.is_err();
        if tx.send(item).await.is_err() {
            debug!("Stage stopped consuming, closing reader");
            return;
        }
        if is_error {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LifecycleEvent, RecordId};
    use crate::infra::RecordingReporter;
    use std::fs;
    use tempfile::tempdir;

    fn config() -> Config {
        Config::from_toml_str(
            r#"
            [stage]
            plugin_name = "geofix-test"
            channel_capacity = 1

            [resolver.places]
            "Rome" = [41.9028, 12.4964]
            "#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_run_file_fixes_known_locations() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.ndjson");
        let output = dir.path().join("out.ndjson");
        fs::write(
            &input,
            concat!(
                "{\"id\":1,\"location\":\"Rome\",\"text\":\"ciao\"}\n",
                "\n",
                "{\"id\":2,\"location\":\"Gotham\"}\n",
            ),
        )
        .unwrap();

        let reporter = Arc::new(RecordingReporter::new());
        let use_case = GeoFixUseCase::from_config(&config(), reporter.clone());
        let summary = use_case.run_file(&input, output.to_str().unwrap()).await.unwrap();

        assert!(summary.succeeded());
        assert_eq!(summary.plugin_name, "geofix-test");
        assert_eq!(summary.written, 2);
        assert_eq!(summary.stats.fixed, 1);
        assert_eq!(summary.stats.unresolved, 1);
        assert!(summary.error.is_none());
        assert_eq!(reporter.completed_count(), 1);

        let written: Vec<Message> = fs::read_to_string(&output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(written[0].latitude, Some(41.9028));
        assert_eq!(written[0].longitude, Some(12.4964));
        assert_eq!(written[0].attribute_str("text"), Some("ciao"));
        assert_eq!(written[1].latitude, None);
    }

    #[tokio::test]
    async fn test_unparseable_line_errors_the_stage() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.ndjson");
        let output = dir.path().join("out.ndjson");
        fs::write(
            &input,
            "{\"id\":1,\"location\":\"Rome\"}\nnot json\n{\"id\":3,\"location\":\"Rome\"}\n",
        )
        .unwrap();

        let reporter = Arc::new(RecordingReporter::new());
        let use_case = GeoFixUseCase::from_config(&config(), reporter.clone());
        let summary = use_case.run_file(&input, output.to_str().unwrap()).await.unwrap();

        assert!(!summary.succeeded());
        assert_eq!(summary.state, StageState::Errored);
        assert_eq!(summary.written, 1);
        assert!(summary.error.unwrap().contains("line 2"));
        assert_eq!(
            reporter.events(),
            vec![
                LifecycleEvent::ElementStarted(RecordId::from(1i64)),
                LifecycleEvent::ElementEnded(RecordId::from(1i64)),
                LifecycleEvent::StageErrored,
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_input_is_an_error() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.ndjson");
        let use_case = GeoFixUseCase::from_config(&config(), Arc::new(RecordingReporter::new()));

        let result = use_case
            .run_file(&dir.path().join("missing.ndjson"), output.to_str().unwrap())
            .await;
        assert!(result.is_err());
    }
}
