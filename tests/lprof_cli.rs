use std::fs;

use lineprof::runtime::Function;
use lineprof::{code, LineProfiler};
use tempfile::TempDir;

fn dumped_profile(dir: &TempDir) -> std::path::PathBuf {
    let square = Function::new(code!("square"), |frame, x: i64| {
        frame.line(line!());
        x * x
    });
    let profiler = LineProfiler::new();
    profiler.wrap(&square).call(7);

    let file_path = dir.path().join("square.json");
    profiler.dump_stats(&file_path).unwrap();
    file_path
}

#[test]
fn prints_the_report_for_a_stats_file() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = dumped_profile(&temp_dir);

    let output = assert_cmd::cargo::cargo_bin_cmd!("lprof")
        .arg(&file_path)
        .args(["--unit", "1e-6", "--summarize"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("Timer unit: 1e-6 s"));
    assert!(stdout.contains("Function: square at line"));
    assert!(stdout.contains("Line Contents"));
    assert!(stdout.contains("100.00%"));
}

#[test]
fn logs_module_filters_when_asked() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = dumped_profile(&temp_dir);

    let output = assert_cmd::cargo::cargo_bin_cmd!("lprof")
        .arg(&file_path)
        .args(["--log-level", "lineprof=debug"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Logging enabled for lineprof at level DEBUG"));
}

#[test]
fn fails_cleanly_on_a_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let output = assert_cmd::cargo::cargo_bin_cmd!("lprof")
        .arg(temp_dir.path().join("absent.json"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("could not load"));
    assert!(output.stdout.is_empty());
}

#[test]
fn rejects_a_malformed_file_and_a_bad_unit() {
    let temp_dir = TempDir::new().unwrap();
    let garbage = temp_dir.path().join("garbage.json");
    fs::write(&garbage, "not json at all").unwrap();
    let output = assert_cmd::cargo::cargo_bin_cmd!("lprof")
        .arg(&garbage)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr)
        .unwrap()
        .contains("malformed stats file"));

    let file_path = dumped_profile(&temp_dir);
    let output = assert_cmd::cargo::cargo_bin_cmd!("lprof")
        .arg(&file_path)
        .args(["--unit", "-1"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}
