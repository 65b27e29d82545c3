use serde::{Deserialize, Serialize};
use std::fmt;

/// Which experiment a trial belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    NBack,
    Stroop,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::NBack => "n_back",
            TaskKind::Stroop => "stroop",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Defines a task's stimulus payload and the response shape it expects
pub trait Stimulus: Clone + Send + Sync + fmt::Debug {
    type Response: Copy + PartialEq + Send + Sync + fmt::Debug;

    const TASK: TaskKind;

    /// Text drawn on screen.
    fn label(&self) -> String;

    /// Display colour, `None` for the default foreground.
    fn ink(&self) -> Option<[u8; 4]> {
        None
    }
}

/// A digit plus the history window right after it was appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NBackStimulus {
    pub digit: u8,
    pub sequence: Vec<u8>,
}

impl Stimulus for NBackStimulus {
    /// `true` means "matches the digit two back".
    type Response = bool;

    const TASK: TaskKind = TaskKind::NBack;

    fn label(&self) -> String {
        self.digit.to_string()
    }
}

/// A colour word drawn in a (possibly different) display colour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StroopStimulus {
    pub word: String,
    pub color: String,
    pub rgb: [u8; 3],
}

impl StroopStimulus {
    pub fn is_congruent(&self) -> bool {
        self.word == self.color
    }
}

impl Stimulus for StroopStimulus {
    /// Uppercase letter bound to a display colour.
    type Response = char;

    const TASK: TaskKind = TaskKind::Stroop;

    fn label(&self) -> String {
        self.word.clone()
    }

    fn ink(&self) -> Option<[u8; 4]> {
        let [r, g, b] = self.rgb;
        Some([r, g, b, 255])
    }
}
