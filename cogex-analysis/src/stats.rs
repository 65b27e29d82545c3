use crate::error::{AnalysisError, Result};
use cogex_core::ParticipantId;
use cogex_experiment::{NBackRecord, StroopRecord};
use std::fmt;

/// Per-trial fields the descriptive statistics look at
pub trait Scored {
    fn is_correct(&self) -> Option<bool>;
    /// Seconds.
    fn response_time(&self) -> Option<f64>;
}

impl Scored for NBackRecord {
    fn is_correct(&self) -> Option<bool> {
        self.is_correct
    }
    fn response_time(&self) -> Option<f64> {
        self.response_time
    }
}

impl Scored for StroopRecord {
    fn is_correct(&self) -> Option<bool> {
        self.is_correct
    }
    fn response_time(&self) -> Option<f64> {
        self.response_time
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseTimes {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` below two values.
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
}

impl ResponseTimes {
    /// `None` when there is no recorded time.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let values: Vec<f64> = values.into_iter().collect();
        if values.is_empty() {
            return None;
        }
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let std_dev = (count > 1).then(|| {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        });
        Some(Self {
            count,
            mean,
            std_dev,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

/// Describe-style block of the response time column.
impl fmt::Display for ResponseTimes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<6}{}", "count", self.count)?;
        writeln!(f, "{:<6}{:.4}", "mean", self.mean)?;
        match self.std_dev {
            Some(sd) => writeln!(f, "{:<6}{sd:.4}", "std")?,
            None => writeln!(f, "{:<6}NaN", "std")?,
        }
        writeln!(f, "{:<6}{:.4}", "min", self.min)?;
        write!(f, "{:<6}{:.4}", "max", self.max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub trials: usize,
    pub correct: usize,
    /// Percentage of all trials; unanswered trials count as incorrect.
    pub accuracy_pct: f64,
    pub response_times: Option<ResponseTimes>,
}

pub fn summarize<R: Scored>(participant: &ParticipantId, records: &[R]) -> Result<Summary> {
    if records.is_empty() {
        return Err(AnalysisError::EmptyLog {
            participant: participant.to_string(),
        });
    }
    let correct = records
        .iter()
        .filter(|r| r.is_correct() == Some(true))
        .count();
    Ok(Summary {
        trials: records.len(),
        correct,
        accuracy_pct: correct as f64 / records.len() as f64 * 100.0,
        response_times: ResponseTimes::from_values(
            records.iter().filter_map(|r| r.response_time()),
        ),
    })
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Trials: {} ({} correct)", self.trials, self.correct)?;
        writeln!(f, "Overall Accuracy: {:.2}%", self.accuracy_pct)?;
        match &self.response_times {
            Some(rt) => {
                writeln!(f, "Average Response Time: {:.2} seconds", rt.mean)?;
                writeln!(f, "Min Response Time: {:.2} seconds", rt.min)?;
                write!(f, "Max Response Time: {:.2} seconds", rt.max)
            }
            None => write!(f, "No response times recorded"),
        }
    }
}
