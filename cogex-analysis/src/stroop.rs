use crate::stats::{ResponseTimes, Scored};
use cogex_experiment::StroopRecord;
use std::collections::BTreeMap;
use std::fmt;

/// Accuracy and mean latency for one word shown in one colour
#[derive(Debug, Clone, PartialEq)]
pub struct PairStats {
    pub word: String,
    pub color: String,
    pub trials: usize,
    pub accuracy_pct: f64,
    pub mean_rt: Option<f64>,
}

/// Groups trials by (word, colour), ordered by word then colour.
pub fn by_word_color(records: &[StroopRecord]) -> Vec<PairStats> {
    let mut groups: BTreeMap<(&str, &str), Vec<&StroopRecord>> = BTreeMap::new();
    for r in records {
        groups
            .entry((r.word.as_str(), r.color.as_str()))
            .or_default()
            .push(r);
    }
    groups
        .into_iter()
        .map(|((word, color), group)| {
            let correct = group.iter().filter(|r| r.is_correct == Some(true)).count();
            PairStats {
                word: word.to_string(),
                color: color.to_string(),
                trials: group.len(),
                accuracy_pct: correct as f64 / group.len() as f64 * 100.0,
                mean_rt: ResponseTimes::from_values(group.iter().filter_map(|r| r.response_time()))
                    .map(|rt| rt.mean),
            }
        })
        .collect()
}

/// Mean latency on congruent vs incongruent trials
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Congruence {
    pub congruent: Option<ResponseTimes>,
    pub incongruent: Option<ResponseTimes>,
}

impl Congruence {
    /// Incongruent minus congruent mean, in seconds.
    pub fn effect(&self) -> Option<f64> {
        Some(self.incongruent?.mean - self.congruent?.mean)
    }
}

pub fn congruence(records: &[StroopRecord]) -> Congruence {
    let times = |congruent: bool| {
        ResponseTimes::from_values(
            records
                .iter()
                .filter(|r| r.is_congruent() == congruent)
                .filter_map(|r| r.response_time),
        )
    };
    Congruence {
        congruent: times(true),
        incongruent: times(false),
    }
}

impl fmt::Display for PairStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<8} {:<8} {:>6} {:>9.2}%",
            self.word, self.color, self.trials, self.accuracy_pct
        )?;
        match self.mean_rt {
            Some(rt) => write!(f, " {rt:>9.3}s"),
            None => write!(f, " {:>10}", "-"),
        }
    }
}

impl fmt::Display for Congruence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mean = |rt: Option<ResponseTimes>| match rt {
            Some(rt) => format!("{:.3} seconds (n={})", rt.mean, rt.count),
            None => "-".to_string(),
        };
        writeln!(f, "Congruent Mean Response Time: {}", mean(self.congruent))?;
        write!(f, "Incongruent Mean Response Time: {}", mean(self.incongruent))?;
        if let Some(effect) = self.effect() {
            write!(f, "\nStroop Effect: {:.0} ms", effect * 1e3)?;
        }
        Ok(())
    }
}
