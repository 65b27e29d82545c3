//! Drives whole sessions with a manual clock and an in-memory sink.

use cogex_core::{Key, Outcome, ParticipantId, SessionPhase, TaskKind};
use cogex_experiment::{
    ExperimentError, NBackRecord, NBackTask, PersistReport, Session, SessionConfig, SessionEvent,
    StroopRecord, StroopTask, TabularRecord, TrialSink,
};
use cogex_timing::{ManualTimer, Timer};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;

struct MemorySink<R> {
    batches: Vec<(ParticipantId, TaskKind, Vec<R>)>,
}

impl<R> Default for MemorySink<R> {
    fn default() -> Self {
        Self {
            batches: Vec::new(),
        }
    }
}

impl<R: TabularRecord + Clone> TrialSink<R> for MemorySink<R> {
    fn write(
        &mut self,
        participant: &ParticipantId,
        task: TaskKind,
        records: &[R],
    ) -> cogex_experiment::Result<PersistReport> {
        self.batches
            .push((participant.clone(), task, records.to_vec()));
        Ok(PersistReport {
            records: records.len(),
            files: Vec::new(),
        })
    }
}

fn config(trials: usize) -> SessionConfig {
    SessionConfig {
        trial_count: trials,
        inter_trial_interval_ms: 500,
    }
}

fn participant() -> ParticipantId {
    ParticipantId::new("p42").unwrap()
}

fn nback_session(trials: usize) -> (Session<NBackTask, ManualTimer, StdRng>, ManualTimer) {
    let clock = ManualTimer::new();
    let session = Session::new(
        NBackTask::new(0.3).unwrap(),
        config(trials),
        clock.clone(),
        StdRng::seed_from_u64(2024),
    )
    .with_participant(participant());
    (session, clock)
}

fn press(key: Key) -> SessionEvent {
    SessionEvent::KeyPressed(key)
}

#[test]
fn nback_session_runs_to_done() {
    let (mut session, clock) = nback_session(5);
    assert_eq!(session.phase(), SessionPhase::AwaitingStart);
    assert!(session.handle_event(press(Key::Space)));

    for i in 0..5 {
        assert_eq!(session.phase(), SessionPhase::Presenting);
        assert_eq!(session.trial_progress(), Some((i + 1, 5)));
        assert!(session.handle_event(SessionEvent::StimulusShown));
        assert_eq!(session.phase(), SessionPhase::AwaitingResponse);

        clock.advance(Duration::from_millis(250 + 10 * i as u64));
        assert!(session.handle_event(press(Key::Char('N'))));
        assert_eq!(session.phase(), SessionPhase::Recorded);

        let trial = session.log().last().unwrap();
        let answer = trial.outcome().answer().unwrap();
        assert_eq!(answer.latency, Duration::from_millis(250 + 10 * i as u64));
        assert!(!answer.response);
        assert_eq!(answer.correct, !trial.correct_response);

        let before = clock.now();
        let events = session.update();
        assert_eq!(events, vec![SessionEvent::InterTrialElapsed]);
        assert_eq!(clock.elapsed(before), Duration::from_millis(500));
        for event in events {
            session.handle_event(event);
        }
    }

    assert_eq!(session.phase(), SessionPhase::Persisting);
    let mut sink = MemorySink::<NBackRecord>::default();
    let report = session.persist(&mut sink).unwrap();
    assert_eq!(report.records, 5);
    assert_eq!(session.phase(), SessionPhase::Done);

    let (who, task, records) = &sink.batches[0];
    assert_eq!(who, &participant());
    assert_eq!(*task, TaskKind::NBack);
    let numbers: Vec<_> = records.iter().map(|r| r.trial_number).collect();
    assert_eq!(numbers, vec![0, 1, 2, 3, 4]);
    assert!(records.iter().all(|r| r.response_time.is_some()));

    assert!(!session.handle_event(press(Key::Space)));
    assert!(session.update().is_empty());
}

#[test]
fn unmapped_key_leaves_trial_pending() {
    let (mut session, clock) = nback_session(3);
    session.handle_event(press(Key::Space));
    session.handle_event(SessionEvent::StimulusShown);

    clock.advance(Duration::from_millis(100));
    assert!(!session.handle_event(press(Key::Char('Q'))));
    assert!(!session.handle_event(press(Key::Enter)));
    assert_eq!(session.phase(), SessionPhase::AwaitingResponse);
    assert!(matches!(
        session.current_trial().unwrap().outcome(),
        Outcome::Pending
    ));
    assert!(session.log().is_empty());

    // The clock kept running from onset, not from the ignored key.
    clock.advance(Duration::from_millis(200));
    assert!(session.handle_event(press(Key::Space)));
    let answer = *session.log()[0].outcome().answer().unwrap();
    assert_eq!(answer.latency, Duration::from_millis(300));
}

#[test]
fn keys_before_onset_are_ignored() {
    let (mut session, _clock) = nback_session(2);
    assert!(!session.handle_event(press(Key::Char('N'))));
    assert_eq!(session.phase(), SessionPhase::AwaitingStart);

    session.handle_event(press(Key::Space));
    assert_eq!(session.phase(), SessionPhase::Presenting);
    assert!(!session.handle_event(press(Key::Space)));
    assert_eq!(session.phase(), SessionPhase::Presenting);
}

#[test]
fn slow_frames_shorten_the_remaining_pause() {
    let (mut session, clock) = nback_session(2);
    session.handle_event(press(Key::Space));
    session.handle_event(SessionEvent::StimulusShown);
    session.handle_event(press(Key::Space));

    clock.advance(Duration::from_millis(200));
    let before = clock.now();
    session.update();
    assert_eq!(clock.elapsed(before), Duration::from_millis(300));

    let (mut late, late_clock) = nback_session(2);
    late.handle_event(press(Key::Space));
    late.handle_event(SessionEvent::StimulusShown);
    late.handle_event(press(Key::Space));
    late_clock.advance(Duration::from_millis(900));
    let before = late_clock.now();
    assert_eq!(late.update(), vec![SessionEvent::InterTrialElapsed]);
    assert_eq!(late_clock.elapsed(before), Duration::ZERO);
}

#[test]
fn zero_trials_go_straight_to_persisting() {
    let (mut session, _clock) = nback_session(0);
    session.handle_event(press(Key::Space));
    assert_eq!(session.phase(), SessionPhase::Persisting);

    let mut sink = MemorySink::<NBackRecord>::default();
    let report = session.persist(&mut sink).unwrap();
    assert_eq!(report.records, 0);
    assert!(sink.batches[0].2.is_empty());
}

#[test]
fn persist_is_only_valid_when_trials_are_done() {
    let (mut session, _clock) = nback_session(1);
    let mut sink = MemorySink::<NBackRecord>::default();
    assert!(matches!(
        session.persist(&mut sink),
        Err(ExperimentError::NotPersisting(SessionPhase::AwaitingStart))
    ));
    assert!(sink.batches.is_empty());
}

#[test]
fn missing_participant_fails_before_writing() {
    let mut session = Session::new(
        NBackTask::new(0.3).unwrap(),
        config(0),
        ManualTimer::new(),
        StdRng::seed_from_u64(1),
    );
    session.handle_event(press(Key::Space));

    let mut sink = MemorySink::<NBackRecord>::default();
    assert!(matches!(
        session.persist(&mut sink),
        Err(ExperimentError::ParticipantNotSet)
    ));
    assert!(sink.batches.is_empty());
    assert_eq!(session.phase(), SessionPhase::Persisting);

    session.set_participant(participant());
    session.persist(&mut sink).unwrap();
    assert_eq!(session.phase(), SessionPhase::Done);
}

#[test]
fn stroop_session_scores_by_display_colour() {
    let clock = ManualTimer::new();
    let mut session = Session::new(
        StroopTask::default(),
        config(12),
        clock.clone(),
        StdRng::seed_from_u64(99),
    )
    .with_participant(participant());

    session.handle_event(press(Key::Space));
    let mut expected = Vec::new();
    while session.phase() != SessionPhase::Persisting {
        session.handle_event(SessionEvent::StimulusShown);
        let trial = session.current_trial().unwrap();
        let correct = trial.correct_response;
        // Answer wrongly on every third trial, lowercase otherwise.
        let key = if trial.index % 3 == 0 {
            if correct == 'R' { 'G' } else { 'R' }
        } else {
            correct.to_ascii_lowercase()
        };
        expected.push(trial.index % 3 != 0);
        clock.advance(Duration::from_millis(600));
        assert!(session.handle_event(press(Key::Char(key))));
        for event in session.update() {
            session.handle_event(event);
        }
    }

    let mut sink = MemorySink::<StroopRecord>::default();
    session.persist(&mut sink).unwrap();
    let records = &sink.batches[0].2;
    assert_eq!(records.len(), 12);
    let scored: Vec<_> = records.iter().map(|r| r.is_correct.unwrap()).collect();
    assert_eq!(scored, expected);
    assert!(records.iter().all(|r| r.response_time == Some(0.6)));
}

#[test]
fn quitting_mid_trial_writes_nothing() {
    let (mut session, clock) = nback_session(4);
    session.handle_event(press(Key::Space));
    session.handle_event(SessionEvent::StimulusShown);
    session.handle_event(press(Key::Space));
    for event in session.update() {
        session.handle_event(event);
    }
    session.handle_event(SessionEvent::StimulusShown);
    assert_eq!(session.phase(), SessionPhase::AwaitingResponse);
    let pending = session.current_trial().unwrap().index;

    assert_eq!(session.abort(), 1);
    assert_eq!(session.phase(), SessionPhase::Aborted);
    assert!(session.current_trial().is_none());
    assert!(session.log().iter().all(|t| t.index != pending));
    assert_eq!(session.log().len(), 1);

    assert!(!session.handle_event(press(Key::Space)));
    assert!(session.update().is_empty());

    let mut sink = MemorySink::<NBackRecord>::default();
    assert!(matches!(
        session.persist(&mut sink),
        Err(ExperimentError::NotPersisting(SessionPhase::Aborted))
    ));
    assert!(sink.batches.is_empty());

    let before = clock.now();
    assert_eq!(session.hold_farewell(), Duration::ZERO);
    assert_eq!(clock.elapsed(before), Duration::ZERO);
}

#[test]
fn abort_after_saving_changes_nothing() {
    let (mut session, _clock) = nback_session(0);
    session.handle_event(press(Key::Space));
    session
        .persist(&mut MemorySink::<NBackRecord>::default())
        .unwrap();
    assert_eq!(session.abort(), 0);
    assert_eq!(session.phase(), SessionPhase::Done);
}

#[test]
fn closing_banner_is_held_for_one_interval() {
    let (mut session, clock) = nback_session(0);
    session.handle_event(press(Key::Space));
    assert_eq!(session.hold_farewell(), Duration::ZERO);

    session
        .persist(&mut MemorySink::<NBackRecord>::default())
        .unwrap();
    let before = clock.now();
    assert_eq!(session.hold_farewell(), Duration::from_millis(500));
    assert_eq!(clock.elapsed(before), Duration::from_millis(500));
}
