//! Round trips of the trial log through the JSON and CSV files.

use cogex_core::{ParticipantId, TaskKind};
use cogex_experiment::persist::{read_csv, read_json, write_csv};
use cogex_experiment::{
    DigitSequence, ExperimentError, FileNaming, FileSink, NBackRecord, OutputConfig,
    StroopRecord, TabularRecord, TrialSink, load_records,
};
use std::fs;
use tempfile::tempdir;

fn participant() -> ParticipantId {
    ParticipantId::new("p7").unwrap()
}

fn nback_records() -> Vec<NBackRecord> {
    vec![
        NBackRecord {
            participant_id: participant(),
            task_type: TaskKind::NBack,
            trial_number: 0,
            digit: 3,
            correct_response: false,
            user_response: Some(false),
            response_time: Some(0.512),
            is_correct: Some(true),
            sequence: DigitSequence(vec![3]),
        },
        NBackRecord {
            participant_id: participant(),
            task_type: TaskKind::NBack,
            trial_number: 1,
            digit: 5,
            correct_response: false,
            user_response: Some(true),
            response_time: Some(0.731),
            is_correct: Some(false),
            sequence: DigitSequence(vec![3, 5]),
        },
        NBackRecord {
            participant_id: participant(),
            task_type: TaskKind::NBack,
            trial_number: 2,
            digit: 3,
            correct_response: true,
            user_response: Some(true),
            response_time: Some(0.402),
            is_correct: Some(true),
            sequence: DigitSequence(vec![3, 5, 3]),
        },
    ]
}

fn stroop_record(trial_number: usize, word: &str, color: &str, key: char) -> StroopRecord {
    StroopRecord {
        participant_id: participant(),
        task_type: TaskKind::Stroop,
        trial_number,
        word: word.to_string(),
        color: color.to_string(),
        correct_key: key,
        user_response: Some(key),
        response_time: Some(0.65),
        is_correct: Some(true),
    }
}

#[test]
fn nback_log_round_trips_through_every_directory() {
    let root = tempdir().unwrap();
    let output = OutputConfig {
        directories: vec![root.path().join("data"), root.path().join("N Back Data")],
        naming: FileNaming::Suite {
            suite: "cognitive_suite".to_string(),
        },
    };
    let mut sink = FileSink::new(output.clone());
    let records = nback_records();

    let report = sink
        .write(&participant(), TaskKind::NBack, &records)
        .unwrap();
    assert_eq!(report.records, 3);
    assert_eq!(report.files.len(), 4);
    assert!(report.files.iter().all(|f| f.exists()));

    for dir in &output.directories {
        assert!(dir.join("participant_p7_cognitive_suite.csv").exists());
        let from_csv: Vec<NBackRecord> =
            load_records(dir, &output.naming, &participant(), TaskKind::NBack).unwrap();
        assert_eq!(from_csv, records);

        let json_path = output.json_path(dir, &participant(), TaskKind::NBack);
        let from_json: Vec<NBackRecord> = read_json(&json_path).unwrap();
        assert_eq!(from_json, from_csv);
    }

    let csv = fs::read_to_string(output.csv_path(
        &output.directories[0],
        &participant(),
        TaskKind::NBack,
    ))
    .unwrap();
    let rows: Vec<_> = csv.lines().collect();
    assert_eq!(rows[0], NBackRecord::HEADERS.join(","));
    assert_eq!(rows[3], "p7,n_back,2,3,true,true,0.402,true,3 5 3");
}

#[test]
fn empty_log_writes_header_only_files() {
    let dir = tempdir().unwrap();
    let output = OutputConfig::for_task(TaskKind::Stroop).in_directory(dir.path());
    let mut sink = FileSink::new(output.clone());

    sink.write(&participant(), TaskKind::Stroop, &Vec::<StroopRecord>::new())
        .unwrap();

    let csv_path = dir.path().join("p7_stroop_results.csv");
    let csv = fs::read_to_string(&csv_path).unwrap();
    let rows: Vec<_> = csv.lines().collect();
    assert_eq!(rows, vec![StroopRecord::HEADERS.join(",")]);
    assert!(read_csv::<StroopRecord>(&csv_path).unwrap().is_empty());

    let json_path = dir.path().join("p7_stroop_results.json");
    let json: Vec<StroopRecord> = read_json(&json_path).unwrap();
    assert!(json.is_empty());
}

#[test]
fn unanswered_fields_survive_as_empty_cells() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pending.csv");
    let mut pending = stroop_record(0, "RED", "BLUE", 'B');
    pending.user_response = None;
    pending.response_time = None;
    pending.is_correct = None;

    write_csv(&path, std::slice::from_ref(&pending)).unwrap();
    let rows = fs::read_to_string(&path).unwrap();
    assert_eq!(rows.lines().nth(1), Some("p7,stroop,0,RED,BLUE,B,,,"));
    assert_eq!(read_csv::<StroopRecord>(&path).unwrap(), vec![pending]);
}

#[test]
fn loader_falls_back_to_json() {
    let dir = tempdir().unwrap();
    let output = OutputConfig::for_task(TaskKind::Stroop).in_directory(dir.path());
    let records = vec![
        stroop_record(0, "RED", "RED", 'R'),
        stroop_record(1, "GREEN", "YELLOW", 'Y'),
    ];
    FileSink::new(output.clone())
        .write(&participant(), TaskKind::Stroop, &records)
        .unwrap();
    fs::remove_file(output.csv_path(dir.path(), &participant(), TaskKind::Stroop)).unwrap();

    let loaded: Vec<StroopRecord> =
        load_records(dir.path(), &output.naming, &participant(), TaskKind::Stroop).unwrap();
    assert_eq!(loaded, records);
    assert!(loaded[0].is_congruent());
    assert!(!loaded[1].is_congruent());
}

#[test]
fn loader_reports_missing_participant() {
    let dir = tempdir().unwrap();
    let naming = FileNaming::Results;
    let err = load_records::<StroopRecord>(dir.path(), &naming, &participant(), TaskKind::Stroop)
        .unwrap_err();
    assert!(matches!(
        &err,
        ExperimentError::DataNotFound { participant, .. } if participant == "p7"
    ));
    assert!(err.to_string().contains("p7"));
}

#[test]
fn unwritable_directory_is_an_error() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, b"occupied").unwrap();
    let output = OutputConfig {
        directories: vec![dir.path().join("ok"), blocker.join("nested")],
        naming: FileNaming::Results,
    };

    let result = FileSink::new(output).write(&participant(), TaskKind::NBack, &nback_records());
    assert!(matches!(result, Err(ExperimentError::Io(_))));
    // Directories before the failure keep their files.
    assert!(dir.path().join("ok").join("p7_n_back_results.csv").exists());
}
