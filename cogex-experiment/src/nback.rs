use crate::config::NBackConfig;
use crate::error::{ExperimentError, Result};
use crate::task::{ResponseOf, TabularRecord, Task};
use cogex_core::{DigitHistory, Key, NBackStimulus, ParticipantId, TaskKind, Trial};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Distance of a target trial's match.
pub const LAG: usize = 2;

/// 2-back digit task
#[derive(Debug, Clone)]
pub struct NBackTask {
    history: DigitHistory,
    target_probability: f64,
}

impl NBackTask {
    pub fn new(target_probability: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&target_probability) {
            return Err(ExperimentError::InvalidTargetProbability(target_probability));
        }
        Ok(Self {
            history: DigitHistory::new(),
            target_probability,
        })
    }

    pub fn from_config(config: &NBackConfig) -> Result<Self> {
        Self::new(config.target_probability)
    }

    /// Seeds the window, oldest digit first.
    pub fn with_history(mut self, digits: &[u8]) -> Self {
        self.history = DigitHistory::from_digits(digits);
        self
    }

    pub fn history(&self) -> &DigitHistory {
        &self.history
    }
}

impl Task for NBackTask {
    type Stimulus = NBackStimulus;
    type Record = NBackRecord;

    /// Draws 1-9 uniformly. Once two digits are known, a target is forced
    /// with `target_probability` by repeating the digit two back. Non-target
    /// draws may still match by chance.
    fn next_trial<R: Rng>(&mut self, rng: &mut R, index: usize) -> Trial<NBackStimulus> {
        let drawn: u8 = rng.random_range(1..=9);
        let forced = if self.history.len() >= LAG && rng.random::<f64>() < self.target_probability
        {
            self.history.back(LAG)
        } else {
            None
        };
        let digit = forced.unwrap_or(drawn);
        self.history.push(digit);

        Trial::new(
            index,
            NBackStimulus {
                digit,
                sequence: self.history.to_vec(),
            },
            forced.is_some(),
        )
    }

    fn interpret_key(&self, key: Key) -> Option<ResponseOf<Self>> {
        match key {
            Key::Space => Some(true),
            Key::Char('N') => Some(false),
            _ => None,
        }
    }

    fn instructions(&self) -> Vec<String> {
        [
            "N-back Memory Task Instructions:",
            "- A sequence of digits will appear on the screen.",
            "- Press SPACE if the current digit matches the one 2-back.",
            "- Press N if it does not match.",
            "Press SPACE to start.",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn record(&self, participant: &ParticipantId, trial: &Trial<NBackStimulus>) -> NBackRecord {
        let answer = trial.outcome().answer();
        NBackRecord {
            participant_id: participant.clone(),
            task_type: TaskKind::NBack,
            trial_number: trial.index,
            digit: trial.stimulus.digit,
            correct_response: trial.correct_response,
            user_response: answer.map(|a| a.response),
            response_time: answer.map(|a| a.latency.as_secs_f64()),
            is_correct: answer.map(|a| a.correct),
            sequence: DigitSequence(trial.stimulus.sequence.clone()),
        }
    }
}

/// History snapshot, stored as space separated digits (`"3 5 3"`) so the
/// JSON and CSV files hold the same value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DigitSequence(pub Vec<u8>);

impl Serialize for DigitSequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let joined = self
            .0
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        serializer.serialize_str(&joined)
    }
}

impl<'de> Deserialize<'de> for DigitSequence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.split_whitespace()
            .map(|part| part.parse::<u8>().map_err(serde::de::Error::custom))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(DigitSequence)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NBackRecord {
    pub participant_id: ParticipantId,
    pub task_type: TaskKind,
    pub trial_number: usize,
    pub digit: u8,
    pub correct_response: bool,
    pub user_response: Option<bool>,
    pub response_time: Option<f64>,
    pub is_correct: Option<bool>,
    pub sequence: DigitSequence,
}

impl TabularRecord for NBackRecord {
    const HEADERS: &'static [&'static str] = &[
        "participant_id",
        "task_type",
        "trial_number",
        "digit",
        "correct_response",
        "user_response",
        "response_time",
        "is_correct",
        "sequence",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::Duration;

    #[test]
    fn forced_target_repeats_two_back() {
        let mut task = NBackTask::new(1.0).unwrap().with_history(&[3, 5]);
        let mut rng = StdRng::seed_from_u64(7);
        let trial = task.next_trial(&mut rng, 2);
        assert_eq!(trial.stimulus.digit, 3);
        assert!(trial.correct_response);
        assert_eq!(trial.stimulus.sequence, vec![3, 5, 3]);
    }

    #[test]
    fn never_targets_with_zero_probability() {
        let mut task = NBackTask::new(0.0).unwrap().with_history(&[4, 4]);
        let mut rng = StdRng::seed_from_u64(1);
        for i in 0..50 {
            assert!(!task.next_trial(&mut rng, i).correct_response);
        }
    }

    #[test]
    fn rejects_out_of_range_probability() {
        assert!(matches!(
            NBackTask::new(1.5),
            Err(ExperimentError::InvalidTargetProbability(_))
        ));
        assert!(NBackTask::new(f64::NAN).is_err());
    }

    #[test]
    fn key_mapping() {
        let task = NBackTask::new(0.3).unwrap();
        assert_eq!(task.interpret_key(Key::Space), Some(true));
        assert_eq!(task.interpret_key(Key::Char('N')), Some(false));
        assert_eq!(task.interpret_key(Key::Char('M')), None);
        assert_eq!(task.interpret_key(Key::Enter), None);
    }

    #[test]
    fn record_of_pending_trial_has_no_answer_fields() {
        let mut task = NBackTask::new(0.3).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let mut trial = task.next_trial(&mut rng, 0);
        let id = ParticipantId::new("p1").unwrap();

        let pending = task.record(&id, &trial);
        assert_eq!(pending.response_time, None);
        assert_eq!(pending.is_correct, None);
        assert_eq!(pending.user_response, None);

        trial.answer(false, Duration::from_millis(420)).unwrap();
        let answered = task.record(&id, &trial);
        assert_eq!(answered.response_time, Some(0.42));
        assert_eq!(answered.is_correct, Some(true));
        assert_eq!(answered.sequence, DigitSequence(vec![trial.stimulus.digit]));
    }

    #[test]
    fn sequence_serializes_as_spaced_digits() {
        let json = serde_json::to_string(&DigitSequence(vec![3, 5, 3])).unwrap();
        assert_eq!(json, "\"3 5 3\"");
        let back: DigitSequence = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DigitSequence(vec![3, 5, 3]));
    }

    proptest! {
        #[test]
        fn generation_invariants(seed in any::<u64>(), p in 0.0..=1.0f64, n in 1usize..60) {
            let mut task = NBackTask::new(p).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            for i in 0..n {
                let before = task.history().clone();
                let trial = task.next_trial(&mut rng, i);

                prop_assert!((1..=9).contains(&trial.stimulus.digit));
                prop_assert!(task.history().len() <= 3);
                if before.len() < 2 {
                    prop_assert!(!trial.correct_response);
                }
                if trial.correct_response {
                    prop_assert_eq!(Some(trial.stimulus.digit), before.back(2));
                }
                prop_assert_eq!(&trial.stimulus.sequence, &task.history().to_vec());
            }
        }
    }
}
