//! End-to-end inspector tests against on-disk slides.

use wsi_inspect::InspectError;

use super::test_utils::{
    aperio_slide, field, generic_slide, run_inspect, write_slide, ByteOrderType,
};

#[tokio::test]
async fn test_inspect_aperio_slide() {
    let file = write_slide(&aperio_slide(ByteOrderType::LittleEndian), ".svs");

    let (result, output) = run_inspect(file.path()).await;
    result.unwrap();

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 8);
    assert_eq!(lines[0], "aperio");
    assert_eq!(lines[1], "level_count= 3");
    assert_eq!(lines[2], "dimensions= (4096, 2048)");
    assert_eq!(
        lines[3],
        "level_dimensions= ((4096, 2048), (1024, 512), (256, 128))"
    );
    assert_eq!(lines[4], "level_downsamples= (1.0, 4.0, 16.0)");
    assert_eq!(lines[5], "objective-power= 20");
    assert_eq!(lines[6], "MPP= 0.4990");
    assert!(lines[7].starts_with("Properties= {"));
    assert!(lines[7].contains("\"aperio.AppMag\": \"20\""));
    assert!(lines[7].contains("\"openslide.vendor\": \"aperio\""));
}

#[tokio::test]
async fn test_level_fields_are_consistent() {
    let file = write_slide(&aperio_slide(ByteOrderType::BigEndian), ".svs");

    let (result, output) = run_inspect(file.path()).await;
    result.unwrap();

    let count: usize = field(&output, "level_count").unwrap().parse().unwrap();
    let dimensions = field(&output, "dimensions").unwrap();
    let level_dimensions = field(&output, "level_dimensions").unwrap();
    let downsamples: Vec<f64> = field(&output, "level_downsamples")
        .unwrap()
        .trim_matches(|c| c == '(' || c == ')')
        .split(", ")
        .map(|d| d.parse().unwrap())
        .collect();

    assert_eq!(level_dimensions.matches('(').count() - 1, count);
    assert!(level_dimensions.starts_with(&format!("({}", dimensions)));
    assert_eq!(downsamples.len(), count);
    assert_eq!(downsamples[0], 1.0);
    assert!(downsamples.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_missing_file_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.svs");

    let (result, output) = run_inspect(&path).await;

    match result {
        Err(InspectError::NotFound(p)) => assert!(p.ends_with("missing.svs")),
        other => panic!("expected NotFound, got {:?}", other),
    }
    assert!(output.is_empty());
}

#[tokio::test]
async fn test_directory_is_not_found() {
    let dir = tempfile::tempdir().unwrap();

    let (result, output) = run_inspect(dir.path()).await;

    match result {
        Err(InspectError::NotFound(p)) => assert_eq!(p, dir.path().display().to_string()),
        other => panic!("expected NotFound, got {:?}", other),
    }
    assert!(output.is_empty());
}

#[tokio::test]
async fn test_unsupported_file_writes_nothing() {
    let file = write_slide(b"GIF89a this is not a slide at all", ".svs");

    let (result, output) = run_inspect(file.path()).await;

    assert!(matches!(result, Err(InspectError::Format(_))));
    assert!(output.is_empty());
}

#[tokio::test]
async fn test_generic_tiff_missing_objective_power() {
    let file = write_slide(&generic_slide(ByteOrderType::LittleEndian, false), ".tif");

    let (result, output) = run_inspect(file.path()).await;

    match result {
        Err(InspectError::MissingProperty { key }) => {
            assert_eq!(key, "openslide.objective-power")
        }
        other => panic!("expected MissingProperty, got {:?}", other),
    }

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines,
        vec![
            "generic-tiff",
            "level_count= 2",
            "dimensions= (2000, 1000)",
            "level_dimensions= ((2000, 1000), (1000, 500))",
            "level_downsamples= (1.0, 2.0)",
        ]
    );
}

#[tokio::test]
async fn test_bigtiff_report_matches_classic() {
    let classic = write_slide(&generic_slide(ByteOrderType::LittleEndian, false), ".tif");
    let bigtiff = write_slide(&generic_slide(ByteOrderType::LittleEndian, true), ".tif");

    let (_, classic_output) = run_inspect(classic.path()).await;
    let (_, bigtiff_output) = run_inspect(bigtiff.path()).await;

    assert_eq!(classic_output, bigtiff_output);
}

#[tokio::test]
async fn test_repeated_runs_are_identical() {
    let file = write_slide(&aperio_slide(ByteOrderType::LittleEndian), ".svs");

    let (first, first_output) = run_inspect(file.path()).await;
    let (second, second_output) = run_inspect(file.path()).await;

    first.unwrap();
    second.unwrap();
    assert_eq!(first_output, second_output);
}
