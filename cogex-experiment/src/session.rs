use crate::config::SessionConfig;
use crate::error::{ExperimentError, Result};
use crate::persist::{PersistReport, TrialSink};
use crate::task::Task;
use cogex_core::{Key, ParticipantId, Phase, SessionPhase, Stimulus, Trial};
use cogex_timing::Timer;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Key that leaves the instruction screen.
pub const START_KEY: Key = Key::Space;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    KeyPressed(Key),
    /// The runner has put the current stimulus on screen.
    StimulusShown,
    InterTrialElapsed,
}

/// Drives one participant through a fixed number of trials of a task.
///
/// `AwaitingStart -> Presenting -> AwaitingResponse -> Recorded`, repeated
/// `trial_count` times, then `Persisting -> Done`. Quitting from any
/// non-terminal phase ends in `Aborted` with nothing written.
pub struct Session<K, T, R>
where
    K: Task,
    T: Timer,
    R: Rng,
{
    pub task: K,
    pub timer: T,
    pub rng: R,
    pub config: SessionConfig,
    phase: SessionPhase,
    participant: Option<ParticipantId>,
    current: Option<Trial<K::Stimulus>>,
    onset: Option<T::Timestamp>,
    recorded_at: Option<T::Timestamp>,
    log: Vec<Trial<K::Stimulus>>,
}

impl<K, T, R> Session<K, T, R>
where
    K: Task,
    T: Timer,
    R: Rng,
{
    pub fn new(task: K, config: SessionConfig, timer: T, rng: R) -> Self {
        let capacity = config.trial_count;
        Self {
            task,
            timer,
            rng,
            config,
            phase: SessionPhase::AwaitingStart,
            participant: None,
            current: None,
            onset: None,
            recorded_at: None,
            log: Vec::with_capacity(capacity),
        }
    }

    pub fn with_participant(mut self, participant: ParticipantId) -> Self {
        self.participant = Some(participant);
        self
    }

    pub fn set_participant(&mut self, participant: ParticipantId) {
        self.participant = Some(participant);
    }

    pub fn participant(&self) -> Option<&ParticipantId> {
        self.participant.as_ref()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn handle_event(&mut self, event: SessionEvent) -> bool {
        if self.phase.is_terminal() {
            debug!(phase = %self.phase, ?event, "session finished, event ignored");
            return false;
        }
        match (self.phase, event) {
            (SessionPhase::AwaitingStart, SessionEvent::KeyPressed(key)) if key == START_KEY => {
                let task = <K::Stimulus as Stimulus>::TASK;
                info!(trials = self.config.trial_count, %task, "session started");
                self.next_trial_or_persist();
                true
            }
            (SessionPhase::Presenting, SessionEvent::StimulusShown) => {
                self.onset = Some(self.timer.now());
                self.phase = SessionPhase::AwaitingResponse;
                true
            }
            (phase, SessionEvent::KeyPressed(key)) if phase.accepts_responses() => {
                self.record_response(key)
            }
            (SessionPhase::Recorded, SessionEvent::InterTrialElapsed) => {
                self.next_trial_or_persist();
                true
            }
            (phase, event) => {
                debug!(%phase, ?event, "event ignored");
                false
            }
        }
    }

    /// Time-driven transitions. In `Recorded` this blocks for whatever is
    /// left of the inter-trial interval, then reports it elapsed.
    pub fn update(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.phase == SessionPhase::Recorded {
            let interval = Duration::from_millis(self.config.inter_trial_interval_ms);
            let elapsed = self
                .recorded_at
                .map(|t| self.timer.elapsed(t))
                .unwrap_or_default();
            if let Some(remaining) = interval.checked_sub(elapsed) {
                self.timer.sleep(remaining);
            }
            events.push(SessionEvent::InterTrialElapsed);
        }
        events
    }

    /// Ends the session without persisting. Returns how many recorded
    /// trials are discarded; the trial on screen is dropped unrecorded.
    /// A finished session is left as it is.
    pub fn abort(&mut self) -> usize {
        if self.phase.is_terminal() {
            return 0;
        }
        let unsaved = self.log.len();
        warn!(unsaved, phase = %self.phase, "session aborted before saving");
        self.current = None;
        self.onset = None;
        self.phase = SessionPhase::Aborted;
        unsaved
    }

    /// Keeps the closing banner up for one inter-trial interval. Returns the
    /// time held, zero unless the session is `Done`.
    pub fn hold_farewell(&mut self) -> Duration {
        if self.phase != SessionPhase::Done {
            return Duration::ZERO;
        }
        let hold = Duration::from_millis(self.config.inter_trial_interval_ms);
        self.timer.sleep(hold);
        hold
    }

    /// Hands the trial log to `sink`. Only valid in `Persisting`; on success
    /// the session is `Done` and accepts no further events.
    pub fn persist<S: TrialSink<K::Record>>(&mut self, sink: &mut S) -> Result<PersistReport> {
        if self.phase != SessionPhase::Persisting {
            return Err(ExperimentError::NotPersisting(self.phase));
        }
        let records = self.records()?;
        let Some(participant) = self.participant.as_ref() else {
            return Err(ExperimentError::ParticipantNotSet);
        };
        let report = sink.write(participant, <K::Stimulus as Stimulus>::TASK, &records)?;
        self.phase = SessionPhase::Done;
        info!(
            participant = %participant,
            records = report.records,
            files = report.files.len(),
            "session persisted"
        );
        Ok(report)
    }

    /// Flat records for every completed trial.
    pub fn records(&self) -> Result<Vec<K::Record>> {
        let participant = self
            .participant
            .as_ref()
            .ok_or(ExperimentError::ParticipantNotSet)?;
        Ok(self
            .log
            .iter()
            .map(|trial| self.task.record(participant, trial))
            .collect())
    }

    pub fn log(&self) -> &[Trial<K::Stimulus>] {
        &self.log
    }

    pub fn current_trial(&self) -> Option<&Trial<K::Stimulus>> {
        self.current.as_ref()
    }

    pub fn current_stimulus(&self) -> Option<&K::Stimulus> {
        self.current.as_ref().map(|t| &t.stimulus)
    }

    pub fn instructions(&self) -> Vec<String> {
        self.task.instructions()
    }

    /// One-based position of the trial on screen and the total.
    pub fn trial_progress(&self) -> Option<(usize, usize)> {
        self.current
            .as_ref()
            .map(|t| (t.index + 1, self.config.trial_count))
    }

    fn next_trial_or_persist(&mut self) {
        if self.log.len() < self.config.trial_count {
            self.start_trial();
        } else {
            info!(completed = self.log.len(), "all trials complete");
            self.phase = SessionPhase::Persisting;
        }
    }

    fn start_trial(&mut self) {
        let index = self.log.len();
        let trial = self.task.next_trial(&mut self.rng, index);
        info!(
            trial = index,
            stimulus = ?trial.stimulus,
            correct = ?trial.correct_response,
            "trial presented"
        );
        self.current = Some(trial);
        self.onset = None;
        self.recorded_at = None;
        self.phase = SessionPhase::Presenting;
    }

    fn record_response(&mut self, key: Key) -> bool {
        let Some(response) = self.task.interpret_key(key) else {
            debug!(?key, "key ignored while awaiting response");
            return false;
        };
        let Some(mut trial) = self.current.take() else {
            return false;
        };
        let latency = self
            .onset
            .map(|t| self.timer.elapsed(t))
            .unwrap_or_default();

        match trial.answer(response, latency) {
            Ok(answer) => {
                info!(
                    trial = trial.index,
                    response = ?answer.response,
                    correct = answer.correct,
                    rt_ms = latency.as_secs_f64() * 1e3,
                    "response recorded"
                );
                self.log.push(trial);
                self.recorded_at = Some(self.timer.now());
                self.phase = SessionPhase::Recorded;
                true
            }
            Err(err) => {
                debug!(%err, "response rejected");
                self.current = Some(trial);
                false
            }
        }
    }
}
