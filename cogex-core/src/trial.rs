use crate::error::{CoreError, Result};
use crate::stimulus::{Stimulus, TaskKind};
use std::time::Duration;

/// What the participant did, recorded in one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Answer<R> {
    pub response: R,
    pub latency: Duration,
    pub correct: bool,
}

/// Per-trial response state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Outcome<R> {
    #[default]
    Pending,
    Answered(Answer<R>),
}

impl<R> Outcome<R> {
    pub fn answer(&self) -> Option<&Answer<R>> {
        match self {
            Outcome::Pending => None,
            Outcome::Answered(answer) => Some(answer),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending)
    }
}

/// One stimulus-response unit
#[derive(Debug, Clone)]
pub struct Trial<S: Stimulus> {
    pub index: usize,
    pub stimulus: S,
    pub correct_response: S::Response,
    outcome: Outcome<S::Response>,
}

impl<S: Stimulus> Trial<S> {
    pub fn new(index: usize, stimulus: S, correct_response: S::Response) -> Self {
        Self {
            index,
            stimulus,
            correct_response,
            outcome: Outcome::Pending,
        }
    }

    pub fn task(&self) -> TaskKind {
        S::TASK
    }

    pub fn outcome(&self) -> &Outcome<S::Response> {
        &self.outcome
    }

    /// Sets response, latency and correctness together. A trial can only be
    /// answered once; later calls fail and leave the first answer in place.
    pub fn answer(&mut self, response: S::Response, latency: Duration) -> Result<Answer<S::Response>> {
        if !self.outcome.is_pending() {
            return Err(CoreError::AlreadyAnswered { index: self.index });
        }
        let answer = Answer {
            response,
            latency,
            correct: response == self.correct_response,
        };
        self.outcome = Outcome::Answered(answer);
        Ok(answer)
    }
}
