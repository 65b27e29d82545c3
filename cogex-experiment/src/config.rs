use cogex_core::{ParticipantId, TaskKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub trial_count: usize,
    /// Pause after every recorded response.
    pub inter_trial_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            trial_count: 20,
            inter_trial_interval_ms: 500,
        }
    }
}

/// How output files are named inside each directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileNaming {
    /// `participant_{id}_{suite}`
    Suite { suite: String },
    /// `{id}_{task}_results`
    Results,
}

impl FileNaming {
    pub fn file_stem(&self, participant: &ParticipantId, task: TaskKind) -> String {
        match self {
            FileNaming::Suite { suite } => format!("participant_{participant}_{suite}"),
            FileNaming::Results => format!("{participant}_{task}_results"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub directories: Vec<PathBuf>,
    pub naming: FileNaming,
}

impl OutputConfig {
    pub fn for_task(task: TaskKind) -> Self {
        match task {
            TaskKind::NBack => Self {
                directories: vec![PathBuf::from("data"), PathBuf::from("N Back Data")],
                naming: FileNaming::Suite {
                    suite: "cognitive_suite".to_string(),
                },
            },
            TaskKind::Stroop => Self {
                directories: vec![PathBuf::from("stroop_data")],
                naming: FileNaming::Results,
            },
        }
    }

    /// Same naming, different directories.
    pub fn in_directory(&self, dir: impl Into<PathBuf>) -> Self {
        Self {
            directories: vec![dir.into()],
            naming: self.naming.clone(),
        }
    }

    pub fn json_path(&self, dir: &Path, participant: &ParticipantId, task: TaskKind) -> PathBuf {
        dir.join(format!("{}.json", self.naming.file_stem(participant, task)))
    }

    pub fn csv_path(&self, dir: &Path, participant: &ParticipantId, task: TaskKind) -> PathBuf {
        dir.join(format!("{}.csv", self.naming.file_stem(participant, task)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NBackConfig {
    pub trials: usize,
    pub target_probability: f64,
    pub output: OutputConfig,
}

impl Default for NBackConfig {
    fn default() -> Self {
        Self {
            trials: 20,
            target_probability: 0.3,
            output: OutputConfig::for_task(TaskKind::NBack),
        }
    }
}

/// One colour of the Stroop vocabulary and the key that names it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColorEntry {
    pub name: String,
    pub rgb: [u8; 3],
    pub key: char,
}

impl ColorEntry {
    pub fn new(name: &str, rgb: [u8; 3], key: char) -> Self {
        Self {
            name: name.to_string(),
            rgb,
            key,
        }
    }

    pub fn default_palette() -> Vec<ColorEntry> {
        vec![
            ColorEntry::new("RED", [255, 0, 0], 'R'),
            ColorEntry::new("GREEN", [0, 255, 0], 'G'),
            ColorEntry::new("BLUE", [0, 0, 255], 'B'),
            ColorEntry::new("YELLOW", [255, 255, 0], 'Y'),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StroopConfig {
    pub trials: usize,
    pub palette: Vec<ColorEntry>,
    pub output: OutputConfig,
}

impl Default for StroopConfig {
    fn default() -> Self {
        Self {
            trials: 40,
            palette: ColorEntry::default_palette(),
            output: OutputConfig::for_task(TaskKind::Stroop),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_file_names() {
        let id = ParticipantId::new("p01").unwrap();
        let nback = OutputConfig::for_task(TaskKind::NBack);
        assert_eq!(
            nback.csv_path(Path::new("N Back Data"), &id, TaskKind::NBack),
            PathBuf::from("N Back Data/participant_p01_cognitive_suite.csv")
        );

        let stroop = OutputConfig::for_task(TaskKind::Stroop);
        assert_eq!(stroop.directories, vec![PathBuf::from("stroop_data")]);
        assert_eq!(
            stroop.json_path(Path::new("stroop_data"), &id, TaskKind::Stroop),
            PathBuf::from("stroop_data/p01_stroop_results.json")
        );
    }

    #[test]
    fn defaults_match_the_classic_programs() {
        assert_eq!(SessionConfig::default().inter_trial_interval_ms, 500);
        assert_eq!(NBackConfig::default().trials, 20);
        assert_eq!(NBackConfig::default().target_probability, 0.3);
        assert_eq!(StroopConfig::default().trials, 40);
        assert_eq!(StroopConfig::default().palette.len(), 4);
    }
}
