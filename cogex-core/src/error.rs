use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A trial outcome is written exactly once.
    #[error("trial {index} has already been answered")]
    AlreadyAnswered { index: usize },

    #[error("participant id must not be empty")]
    EmptyParticipantId,

    #[error("participant id {0:?} contains a path separator")]
    InvalidParticipantId(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
