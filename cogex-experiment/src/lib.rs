pub mod config;
pub mod error;
pub mod nback;
pub mod persist;
pub mod prompt;
pub mod session;
pub mod stroop;
pub mod task;

pub use config::{ColorEntry, FileNaming, NBackConfig, OutputConfig, SessionConfig, StroopConfig};
pub use error::{ExperimentError, Result};
pub use nback::{DigitSequence, NBackRecord, NBackTask};
pub use persist::{FileSink, PersistReport, TrialSink, load_records};
pub use prompt::prompt_participant;
pub use session::{Session, SessionEvent};
pub use stroop::{StroopRecord, StroopTask};
pub use task::{TabularRecord, Task};
