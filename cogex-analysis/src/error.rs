use cogex_experiment::ExperimentError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Experiment(#[from] ExperimentError),

    #[error("no trials recorded for participant {participant}")]
    EmptyLog { participant: String },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
