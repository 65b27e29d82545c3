use crate::config::{ColorEntry, StroopConfig};
use crate::error::{ExperimentError, Result};
use crate::task::{ResponseOf, TabularRecord, Task};
use cogex_core::{Key, ParticipantId, StroopStimulus, TaskKind, Trial};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Colour-word interference task
#[derive(Debug, Clone)]
pub struct StroopTask {
    palette: Vec<ColorEntry>,
}

impl StroopTask {
    /// Keys and colour names are matched case-insensitively; each colour
    /// has exactly one key and each key names one colour.
    pub fn new(palette: Vec<ColorEntry>) -> Result<Self> {
        if palette.is_empty() {
            return Err(ExperimentError::EmptyPalette);
        }
        let mut palette = palette;
        let mut keys = Vec::with_capacity(palette.len());
        let mut names: Vec<String> = Vec::with_capacity(palette.len());
        for entry in &mut palette {
            entry.key = entry.key.to_ascii_uppercase();
            if keys.contains(&entry.key) {
                return Err(ExperimentError::DuplicateResponseKey(entry.key));
            }
            if names.iter().any(|n| n.eq_ignore_ascii_case(&entry.name)) {
                return Err(ExperimentError::DuplicateColor(entry.name.clone()));
            }
            keys.push(entry.key);
            names.push(entry.name.clone());
        }
        Ok(Self { palette })
    }

    pub fn from_config(config: &StroopConfig) -> Result<Self> {
        Self::new(config.palette.clone())
    }

    pub fn palette(&self) -> &[ColorEntry] {
        &self.palette
    }

    pub fn key_for_color(&self, color: &str) -> Option<char> {
        self.palette.iter().find(|c| c.name == color).map(|c| c.key)
    }

    /// Builds a trial for a fixed word/colour pair; the answer key always
    /// follows the display colour.
    pub fn trial_for(&self, index: usize, word: &str, color: &str) -> Option<Trial<StroopStimulus>> {
        let ink = self.palette.iter().find(|c| c.name == color)?;
        Some(Trial::new(
            index,
            StroopStimulus {
                word: word.to_string(),
                color: ink.name.clone(),
                rgb: ink.rgb,
            },
            ink.key,
        ))
    }
}

impl Default for StroopTask {
    fn default() -> Self {
        Self {
            palette: ColorEntry::default_palette(),
        }
    }
}

impl Task for StroopTask {
    type Stimulus = StroopStimulus;
    type Record = StroopRecord;

    /// Word and display colour are drawn independently.
    fn next_trial<R: Rng>(&mut self, rng: &mut R, index: usize) -> Trial<StroopStimulus> {
        let word = &self.palette[rng.random_range(0..self.palette.len())];
        let ink = &self.palette[rng.random_range(0..self.palette.len())];
        Trial::new(
            index,
            StroopStimulus {
                word: word.name.clone(),
                color: ink.name.clone(),
                rgb: ink.rgb,
            },
            ink.key,
        )
    }

    fn interpret_key(&self, key: Key) -> Option<ResponseOf<Self>> {
        match key {
            Key::Char(c) => self
                .palette
                .iter()
                .map(|entry| entry.key)
                .find(|k| *k == c.to_ascii_uppercase()),
            _ => None,
        }
    }

    fn instructions(&self) -> Vec<String> {
        let bindings = self
            .palette
            .iter()
            .map(|c| format!("{} = {}", c.key, c.name))
            .collect::<Vec<_>>()
            .join(", ");
        vec![
            "Stroop Effect Task Instructions:".to_string(),
            "- A word will appear on the screen in a color.".to_string(),
            "- Press the key for the COLOR of the word, ignoring the word itself.".to_string(),
            format!("- {bindings}."),
            "- Try to respond as quickly and accurately as possible.".to_string(),
            "Press SPACE to begin.".to_string(),
        ]
    }

    fn record(&self, participant: &ParticipantId, trial: &Trial<StroopStimulus>) -> StroopRecord {
        let answer = trial.outcome().answer();
        StroopRecord {
            participant_id: participant.clone(),
            task_type: TaskKind::Stroop,
            trial_number: trial.index,
            word: trial.stimulus.word.clone(),
            color: trial.stimulus.color.clone(),
            correct_key: trial.correct_response,
            user_response: answer.map(|a| a.response),
            response_time: answer.map(|a| a.latency.as_secs_f64()),
            is_correct: answer.map(|a| a.correct),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StroopRecord {
    pub participant_id: ParticipantId,
    pub task_type: TaskKind,
    pub trial_number: usize,
    pub word: String,
    pub color: String,
    pub correct_key: char,
    pub user_response: Option<char>,
    pub response_time: Option<f64>,
    pub is_correct: Option<bool>,
}

impl StroopRecord {
    pub fn is_congruent(&self) -> bool {
        self.word == self.color
    }
}

impl TabularRecord for StroopRecord {
    const HEADERS: &'static [&'static str] = &[
        "participant_id",
        "task_type",
        "trial_number",
        "word",
        "color",
        "correct_key",
        "user_response",
        "response_time",
        "is_correct",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::Duration;

    #[test]
    fn incongruent_trial_answers_with_the_display_colour() {
        let task = StroopTask::default();
        let mut trial = task.trial_for(0, "RED", "BLUE").unwrap();
        assert!(!trial.stimulus.is_congruent());
        assert_eq!(trial.correct_response, 'B');

        let answer = trial.answer('R', Duration::from_millis(700)).unwrap();
        assert!(!answer.correct);
    }

    #[test]
    fn correct_key_always_follows_colour() {
        let mut task = StroopTask::default();
        let mut rng = StdRng::seed_from_u64(11);
        for i in 0..200 {
            let trial = task.next_trial(&mut rng, i);
            let expected = task.key_for_color(&trial.stimulus.color);
            assert_eq!(Some(trial.correct_response), expected);
        }
    }

    #[test]
    fn word_and_colour_vary_independently() {
        let mut task = StroopTask::default();
        let mut rng = StdRng::seed_from_u64(5);
        let trials: Vec<_> = (0..400).map(|i| task.next_trial(&mut rng, i)).collect();
        assert!(trials.iter().any(|t| t.stimulus.is_congruent()));
        assert!(trials.iter().any(|t| !t.stimulus.is_congruent()));
    }

    #[test]
    fn rejects_empty_and_ambiguous_palettes() {
        assert!(matches!(
            StroopTask::new(Vec::new()),
            Err(ExperimentError::EmptyPalette)
        ));
        let clash = vec![
            ColorEntry::new("BLUE", [0, 0, 255], 'b'),
            ColorEntry::new("BLACK", [0, 0, 0], 'B'),
        ];
        assert!(matches!(
            StroopTask::new(clash),
            Err(ExperimentError::DuplicateResponseKey('B'))
        ));
        let twice = vec![
            ColorEntry::new("RED", [255, 0, 0], 'R'),
            ColorEntry::new("red", [200, 0, 0], 'Q'),
        ];
        assert!(matches!(
            StroopTask::new(twice),
            Err(ExperimentError::DuplicateColor(name)) if name == "red"
        ));
    }

    #[test]
    fn only_palette_letters_are_responses() {
        let task = StroopTask::default();
        assert_eq!(task.interpret_key(Key::Char('G')), Some('G'));
        assert_eq!(task.interpret_key(Key::Char('y')), Some('Y'));
        assert_eq!(task.interpret_key(Key::Char('Q')), None);
        assert_eq!(task.interpret_key(Key::Space), None);
    }

    #[test]
    fn instructions_list_the_bindings() {
        let lines = StroopTask::default().instructions();
        assert!(lines.contains(&"- R = RED, G = GREEN, B = BLUE, Y = YELLOW.".to_string()));
    }
}
