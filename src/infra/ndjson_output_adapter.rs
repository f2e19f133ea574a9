use async_trait::async_trait;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::marker::PhantomData;
use std::path::Path;
use tracing::{error, info};

use crate::error::StageError;
use crate::pipeline::Subscriber;

/// Subscriber that writes every record as one JSON line.
///
/// A failed write stops the sink: it unsubscribes so upstream stops pushing,
/// and keeps the I/O error for the caller.
pub struct NdjsonFileSink<T> {
    writer: BufWriter<File>,
    file_path: String,
    written: u64,
    completed: bool,
    stage_error: Option<StageError>,
    write_error: Option<std::io::Error>,
    _record: PhantomData<fn(T)>,
}

impl<T> NdjsonFileSink<T> {
    pub fn create(file_path: &str) -> std::io::Result<Self> {
        let path = Path::new(file_path);
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        info!("Creating geo-fix output file: {}", file_path);

        let writer = BufWriter::new(
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)?,
        );

        Ok(Self {
            writer,
            file_path: file_path.to_string(),
            written: 0,
            completed: false,
            stage_error: None,
            write_error: None,
            _record: PhantomData,
        })
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn stage_error(&self) -> Option<&StageError> {
        self.stage_error.as_ref()
    }

    pub fn take_write_error(&mut self) -> Option<std::io::Error> {
        self.write_error.take()
    }

    fn flush(&mut self) {
        if self.write_error.is_some() {
            return;
        }
        if let Err(e) = self.writer.flush() {
            error!(file = %self.file_path, error = %e, "Failed to flush output");
            self.write_error = Some(e);
        }
    }
}

impl<T: Serialize> NdjsonFileSink<T> {
    fn write_record(&mut self, record: &T) -> std::io::Result<()> {
        let json_line = serde_json::to_string(record)?;
        writeln!(self.writer, "{}", json_line)
    }
}

#[async_trait]
impl<T: Serialize + Send> Subscriber<T> for NdjsonFileSink<T> {
    async fn on_next(&mut self, record: T) {
        if self.write_error.is_some() {
            return;
        }
        match self.write_record(&record) {
            Ok(()) => self.written += 1,
            Err(e) => {
                error!(file = %self.file_path, error = %e, "Failed to write record");
                self.write_error = Some(e);
            }
        }
    }

    async fn on_completed(&mut self) {
        self.completed = true;
        self.flush();
    }

    async fn on_error(&mut self, error: StageError) {
        self.stage_error = Some(error);
        self.flush();
    }

    fn is_unsubscribed(&self) -> bool {
        self.write_error.is_some()
    }
}
