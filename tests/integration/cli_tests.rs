//! Process-level tests for the `wsi-inspect` binary.

use std::process::{Command, Output};

use super::test_utils::{aperio_slide, generic_slide, write_slide, ByteOrderType};

fn run_binary(path: &std::path::Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wsi-inspect"))
        .arg(path)
        .env_remove("RUST_LOG")
        .env_remove("WSI_SLIDE")
        .output()
        .unwrap()
}

#[test]
fn test_success_exit_code() {
    let file = write_slide(&aperio_slide(ByteOrderType::LittleEndian), ".svs");

    let output = run_binary(file.path());

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("aperio\nlevel_count= 3\n"));
}

#[test]
fn test_missing_file_logs_error_and_fails() {
    let dir = tempfile::tempdir().unwrap();

    let output = run_binary(&dir.path().join("missing.svs"));

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR"));
    assert!(stderr.contains("Inspection failed"));
    assert!(stderr.contains("Error: No such file"));
}

#[test]
fn test_missing_property_keeps_report_on_stdout() {
    let file = write_slide(&generic_slide(ByteOrderType::LittleEndian, false), ".tif");

    let output = run_binary(file.path());

    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 5);
    assert!(stdout.ends_with("level_downsamples= (1.0, 2.0)\n"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Missing property: openslide.objective-power"));
}
