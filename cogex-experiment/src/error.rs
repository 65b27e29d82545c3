use cogex_core::{CoreError, SessionPhase};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExperimentError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("participant id not set")]
    ParticipantNotSet,

    #[error("colour palette is empty")]
    EmptyPalette,

    #[error("response key {0:?} is bound to more than one colour")]
    DuplicateResponseKey(char),

    #[error("colour {0:?} appears more than once in the palette")]
    DuplicateColor(String),

    #[error("no participant id entered")]
    NoParticipantEntered,

    #[error("target probability {0} is outside [0, 1]")]
    InvalidTargetProbability(f64),

    #[error("cannot persist while the session is {0}")]
    NotPersisting(SessionPhase),

    #[error("data for participant {participant} not found in {}", .directory.display())]
    DataNotFound {
        participant: String,
        directory: PathBuf,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, ExperimentError>;
