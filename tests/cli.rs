mod common;

use std::process::{Command, Output};

use tempfile::tempdir;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tablegrab"))
        .args(args)
        .output()
        .expect("CLI should run")
}

#[test]
fn extract_writes_csv_with_bom() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("page.html");
    let output = dir.path().join("table.csv");
    common::write_page(&input, common::SCENARIO_COLSPAN_LINK);

    let result = run(&[
        "extract",
        "-i",
        &input.to_string_lossy(),
        "-o",
        &output.to_string_lossy(),
    ]);
    assert_eq!(result.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&result.stderr));

    let csv = std::fs::read_to_string(&output).expect("CSV should be readable");
    assert_eq!(csv, "\u{feff}Header,\nX,Y\n");
}

#[test]
fn extract_writes_workbook_for_framework_target() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("page.html");
    let output = dir.path().join("ant");
    common::write_page(&input, common::ANT_DESIGN);

    let result = run(&[
        "extract",
        "-i",
        &input.to_string_lossy(),
        "-o",
        &output.to_string_lossy(),
        "--format",
        "xlsx",
        "--base-url",
        "https://example.com/app/",
    ]);
    assert_eq!(result.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&result.stderr));

    let bytes = std::fs::read(dir.path().join("ant.xlsx")).expect("workbook should exist");
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn page_without_tables_exits_with_two() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("empty.html");
    let output = dir.path().join("empty.csv");
    std::fs::write(&input, common::NO_TABLES).expect("fixture should be written");

    let result = run(&[
        "extract",
        "-i",
        &input.to_string_lossy(),
        "-o",
        &output.to_string_lossy(),
        "--selector",
        "p",
    ]);
    assert_eq!(result.status.code(), Some(2));
    assert!(!output.exists());
}

#[test]
fn invalid_selector_exits_with_one() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("page.html");
    common::write_page(&input, common::SCENARIO_ROWSPAN);

    let result = run(&["inspect", "-i", &input.to_string_lossy(), "--selector", "td["]);
    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).contains("--selector"));
}

#[test]
fn inspect_prints_result_json() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("page.html");
    common::write_page(&input, common::SCENARIO_ROWSPAN);

    let result = run(&["inspect", "-i", &input.to_string_lossy()]);
    assert_eq!(result.status.code(), Some(0));

    let json: serde_json::Value =
        serde_json::from_slice(&result.stdout).expect("stdout should be JSON");
    assert_eq!(
        json,
        serde_json::json!({
            "data": [["A", "B"], ["", "C"]],
            "merges": [{"s": {"r": 0, "c": 0}, "e": {"r": 1, "c": 0}}],
            "links": []
        })
    );
}

#[test]
fn scan_lists_targets_unless_excluded() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("page.html");
    let settings = dir.path().join("settings.json");
    common::write_page(
        &input,
        &format!("{}{}", common::SCENARIO_ROWSPAN, common::ARCO),
    );
    std::fs::write(&settings, r#"{"excludedUrls": ["intranet.local"]}"#)
        .expect("settings should be written");

    let listed = run(&["scan", "-i", &input.to_string_lossy()]);
    assert_eq!(listed.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&listed.stdout);
    let lines = stdout.lines().collect::<Vec<_>>();
    assert_eq!(lines, vec!["0\tplain\tFixture page", "1\tarco\tFixture page"]);

    let excluded = run(&[
        "scan",
        "-i",
        &input.to_string_lossy(),
        "--settings",
        &settings.to_string_lossy(),
        "--url",
        "https://intranet.local/report",
    ]);
    assert_eq!(excluded.status.code(), Some(2));
    assert!(excluded.stdout.is_empty());
}
