use crate::config::{FileNaming, OutputConfig};
use crate::error::{ExperimentError, Result};
use crate::task::TabularRecord;
use cogex_core::{ParticipantId, TaskKind};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Files produced by one flush of the trial log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistReport {
    pub records: usize,
    pub files: Vec<PathBuf>,
}

/// Destination for a finished session's records
pub trait TrialSink<R: TabularRecord> {
    fn write(
        &mut self,
        participant: &ParticipantId,
        task: TaskKind,
        records: &[R],
    ) -> Result<PersistReport>;
}

/// Writes a JSON document and a CSV table into every configured directory.
///
/// Directories are written one after another. A failure stops the flush but
/// leaves directories that were already written in place.
#[derive(Debug, Clone)]
pub struct FileSink {
    output: OutputConfig,
}

impl FileSink {
    pub fn new(output: OutputConfig) -> Self {
        Self { output }
    }
}

impl<R: TabularRecord> TrialSink<R> for FileSink {
    fn write(
        &mut self,
        participant: &ParticipantId,
        task: TaskKind,
        records: &[R],
    ) -> Result<PersistReport> {
        let mut report = PersistReport {
            records: records.len(),
            files: Vec::with_capacity(self.output.directories.len() * 2),
        };
        for dir in &self.output.directories {
            fs::create_dir_all(dir)?;

            let json_path = self.output.json_path(dir, participant, task);
            write_json(&json_path, records)?;
            let csv_path = self.output.csv_path(dir, participant, task);
            write_csv(&csv_path, records)?;

            info!(
                directory = %dir.display(),
                records = records.len(),
                "trial log written"
            );
            report.files.push(json_path);
            report.files.push(csv_path);
        }
        Ok(report)
    }
}

pub fn write_json<R: Serialize>(path: &Path, records: &[R]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, records)?;
    out.flush()?;
    Ok(())
}

pub fn write_csv<R: TabularRecord>(path: &Path, records: &[R]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(R::HEADERS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_json<R: DeserializeOwned>(path: &Path) -> Result<Vec<R>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

pub fn read_csv<R: DeserializeOwned>(path: &Path) -> Result<Vec<R>> {
    let mut reader = csv::Reader::from_path(path)?;
    let records = reader.deserialize().collect::<std::result::Result<Vec<R>, _>>()?;
    Ok(records)
}

/// Loads a participant's records from `dir`, preferring the CSV file and
/// falling back to the JSON document.
pub fn load_records<R: TabularRecord>(
    dir: &Path,
    naming: &FileNaming,
    participant: &ParticipantId,
    task: TaskKind,
) -> Result<Vec<R>> {
    let output = OutputConfig {
        directories: vec![dir.to_path_buf()],
        naming: naming.clone(),
    };
    let csv_path = output.csv_path(dir, participant, task);
    if csv_path.exists() {
        debug!(path = %csv_path.display(), "loading CSV");
        return read_csv(&csv_path);
    }
    let json_path = output.json_path(dir, participant, task);
    if json_path.exists() {
        debug!(path = %json_path.display(), "loading JSON");
        return read_json(&json_path);
    }
    Err(ExperimentError::DataNotFound {
        participant: participant.to_string(),
        directory: dir.to_path_buf(),
    })
}
