pub mod error;
pub mod stats;
pub mod stroop;

pub use error::{AnalysisError, Result};
pub use stats::{ResponseTimes, Scored, Summary, summarize};
pub use stroop::{Congruence, PairStats, by_word_color, congruence};

use cogex_core::{ParticipantId, TaskKind};
use cogex_experiment::{OutputConfig, TabularRecord, load_records};
use std::path::{Path, PathBuf};

/// Directory the analysis reads from when none is given.
pub fn default_data_dir(task: TaskKind) -> PathBuf {
    match task {
        TaskKind::NBack => PathBuf::from("N Back Data"),
        TaskKind::Stroop => PathBuf::from("stroop_data"),
    }
}

/// Loads one participant's trials, named the way the experiment writes them.
pub fn load_participant<R: TabularRecord>(
    dir: &Path,
    participant: &ParticipantId,
    task: TaskKind,
) -> Result<Vec<R>> {
    let naming = OutputConfig::for_task(task).naming;
    let records = load_records(dir, &naming, participant, task)?;
    tracing::debug!(%participant, %task, count = records.len(), "records loaded");
    Ok(records)
}
