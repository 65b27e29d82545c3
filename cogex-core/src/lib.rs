pub mod error;
pub mod history;
pub mod input;
pub mod participant;
pub mod phase;
pub mod stimulus;
pub mod trial;

pub use error::{CoreError, Result};
pub use history::DigitHistory;
pub use input::Key;
pub use participant::ParticipantId;
pub use phase::{Phase, SessionPhase};
pub use stimulus::{NBackStimulus, Stimulus, StroopStimulus, TaskKind};
pub use trial::{Answer, Outcome, Trial};
