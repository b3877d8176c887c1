//! Tests for file checking, reports, snapshot traces and batch analysis.

use ferry_log_check::*;
use std::io::Write;
use std::path::PathBuf;

const ONE_CAR: &[&str] = &[
    "1: P: started",
    "2: O 1: started",
    "3: O 1: arrived to 0",
    "4: P: arrived to 0",
    "5: O 1: boarding",
    "6: P: leaving 0",
    "7: P: arrived to 1",
    "8: O 1: leaving in 1",
    "9: P: leaving 1",
    "10: P: finish",
];

fn write_log(dir: &tempfile::TempDir, filename: &str, lines: &[&str]) -> PathBuf {
    let path = dir.path().join(filename);
    let mut file = std::fs::File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    path
}

fn check(path: &std::path::Path, bounds: Bounds) -> (Result<Summary, Error>, String) {
    let mut out = Vec::new();
    let result = check_file(path, bounds, &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn test_check_file_reports_success() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_log(&dir, "proj2.out", ONE_CAR);

    let (result, text) = check(&path, Bounds::new().trucks(0).cars(1).capacity(2));
    let summary = result.unwrap();
    assert_eq!(summary.cars, 1);

    assert!(text.starts_with("Analyzing file '"), "{text}");
    assert!(text.contains("checking against N=0, O=1, K=2"), "{text}");
    assert!(text.contains("\tState: Finished\n"), "{text}");
    assert!(text.contains("Cars started: 1\n"), "{text}");
    assert!(text.ends_with("No errors found\n"), "{text}");
}

#[test]
fn test_check_file_reports_violation_before_summary() {
    let dir = tempfile::tempdir().unwrap();
    let mut lines = ONE_CAR.to_vec();
    lines[4] = "5: O 1: leaving in 1";
    let path = write_log(&dir, "proj2.out", &lines);

    let (result, text) = check(&path, Bounds::new());
    let Err(Error::Analysis(failure)) = result else {
        panic!("expected analysis failure");
    };
    assert_eq!(failure.violation.position, Position::Line(5));

    let error_at = text.find("Error on line 5: O 1 left while not on board").unwrap();
    let summary_at = text.find("Ferry:").unwrap();
    assert!(error_at < summary_at, "{text}");
    assert!(text.contains("skipping ferry capacity and vehicle amount checks"));
    assert!(!text.contains("No errors found"));
}

#[test]
fn test_check_file_reports_summary_when_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.out");

    let (result, text) = check(&path, Bounds::new());
    assert!(matches!(result, Err(Error::Io(_))), "{result:?}");
    assert!(text.contains("Failed to read"), "{text}");
    assert!(text.contains("\tState: Unknown\n"), "{text}");
    assert!(text.contains("Trucks started: 0\nCars started: 0\n"), "{text}");
}

#[test]
fn test_check_file_reports_count_and_capacity_violations() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_log(&dir, "proj2.out", ONE_CAR);

    let (result, text) = check(&path, Bounds::new().trucks(1).cars(1).capacity(3));
    // one truck expected but none started
    assert!(result.is_err());
    assert!(text.contains("Too few trucks started"), "{text}");

    let (result, text) = check(&path, Bounds::new().trucks(0).cars(1).capacity(0));
    assert!(result.is_err());
    assert!(text.contains("Ferry capacity exceeded (expected 0, measured 1)"), "{text}");
}

// two trucks cannot fit together under K=5, and the ferry never runs full
const TWO_TRUCKS: &[&str] = &[
    "1: P: started",
    "2: N 1: started",
    "3: N 2: started",
    "4: N 1: arrived to 0",
    "5: N 2: arrived to 0",
    "6: P: arrived to 0",
    "7: N 1: boarding",
    "8: P: leaving 0",
    "9: P: arrived to 1",
    "10: N 1: leaving in 1",
    "11: P: leaving 1",
    "12: P: arrived to 0",
    "13: N 2: boarding",
    "14: P: leaving 0",
    "15: P: arrived to 1",
    "16: N 2: leaving in 1",
    "17: P: leaving 1",
    "18: P: finish",
];

#[test]
fn test_check_file_prints_capacity_warning() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_log(&dir, "proj2.out", TWO_TRUCKS);

    let (result, text) = check(&path, Bounds::new().trucks(2).cars(0).capacity(5));
    let summary = result.unwrap();
    assert_eq!(summary.warnings.len(), 1);
    assert!(
        text.contains("Warning: Ferry didn't fully utilize its capacity (expected 5, measured 3)"),
        "{text}"
    );
    assert!(text.ends_with("No errors found\n"), "{text}");
}

#[test]
fn test_warning_printed_before_end_of_log_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_log(&dir, "proj2.out", &TWO_TRUCKS[..17]);

    let (result, text) = check(&path, Bounds::new().trucks(2).cars(0).capacity(5));
    assert!(matches!(result, Err(Error::Analysis(_))), "{result:?}");

    let warning_at = text.find("Warning: Ferry didn't fully utilize").unwrap();
    let error_at = text
        .find("Error on end of log (after line 17): Ferry didn't finish on the last line")
        .unwrap();
    let summary_at = text.find("Ferry:").unwrap();
    assert!(warning_at < error_at, "{text}");
    assert!(error_at < summary_at, "{text}");
    assert_eq!(text.matches("Warning:").count(), 1, "{text}");
}

#[test]
fn test_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_log(&dir, "proj2.out", ONE_CAR);

    let mut out = Vec::new();
    check_file_with(
        &path,
        Bounds::new(),
        ReportFormat::Json,
        &mut NoopObserver,
        &mut out,
    )
    .unwrap();

    let report: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(report["passed"], true);
    assert!(report["error"].is_null());
    assert_eq!(report["summary"]["ferry"]["state"], "Finished");
    assert_eq!(report["summary"]["ferry"]["port"], "1");
    assert_eq!(report["summary"]["ferry"]["trips"], 2);
    assert_eq!(report["summary"]["cars"], 1);
}

#[test]
fn test_json_report_on_violation() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_log(&dir, "proj2.out", &ONE_CAR[..9]);

    let mut out = Vec::new();
    let result = check_file_with(
        &path,
        Bounds::new(),
        ReportFormat::Json,
        &mut NoopObserver,
        &mut out,
    );
    assert!(result.is_err());

    let report: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(report["passed"], false);
    assert_eq!(
        report["error"],
        "Error on end of log (after line 9): Ferry didn't finish on the last line"
    );
    assert_eq!(report["summary"]["ferry"]["state"], "EnRoute");
}

#[test]
fn test_snapshot_trace() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_log(&dir, "proj2.out", ONE_CAR);
    let trace_path = dir.path().join("trace.ndjson");

    let mut emitter = SnapshotEmitter::new(&trace_path).unwrap();
    let mut out = Vec::new();
    check_file_with(
        &path,
        Bounds::new(),
        ReportFormat::Text,
        &mut emitter,
        &mut out,
    )
    .unwrap();
    assert_eq!(emitter.finish().unwrap(), ONE_CAR.len());

    let content = std::fs::read_to_string(&trace_path).unwrap();
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), ONE_CAR.len());

    assert_eq!(lines[0]["line"], 1);
    assert_eq!(lines[0]["entry"], "1: P: started");
    assert_eq!(lines[0]["ferry"]["state"], "Started");

    assert_eq!(lines[4]["entry"], "5: O 1: boarding");
    assert_eq!(lines[4]["ferry"]["loaded"]["cars"], 1);
    assert_eq!(lines[4]["ferry"]["state"], "ArrivedBoarding");
    assert_eq!(lines[4]["cars"], 1);

    assert_eq!(lines[9]["ferry"]["state"], "Finished");
}

#[test]
fn test_snapshot_trace_stops_at_violation() {
    let dir = tempfile::tempdir().unwrap();
    let mut lines = ONE_CAR.to_vec();
    lines[6] = "7: P: arrived to 0";
    let path = write_log(&dir, "proj2.out", &lines);
    let trace_path = dir.path().join("trace.ndjson");

    let mut emitter = SnapshotEmitter::new(&trace_path).unwrap();
    let mut out = Vec::new();
    let result = check_file_with(
        &path,
        Bounds::new(),
        ReportFormat::Text,
        &mut emitter,
        &mut out,
    );
    assert!(result.is_err());
    assert_eq!(emitter.finish().unwrap(), 6);
}

#[test]
fn test_analyze_files_keeps_input_order() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_log(&dir, "good.out", ONE_CAR);
    let bad = write_log(&dir, "bad.out", &ONE_CAR[..5]);
    let missing = dir.path().join("missing.out");

    let results = analyze_files(&[good.clone(), bad, missing, good], Bounds::new());
    assert_eq!(results.len(), 4);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(Error::Analysis(_))));
    assert!(matches!(results[2], Err(Error::Io(_))));
    assert_eq!(
        results[0].as_ref().unwrap(),
        results[3].as_ref().unwrap()
    );
}
