use std::{fs, path::PathBuf};

use tempfile::tempdir;

use pidview::{PidviewError, source::FetchError};
use pidview_cli::{Args, Command, run, validate_files};

fn demos_path() -> PathBuf {
    // Demos are at workspace root, relative to workspace not the crate
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

/// Collects all .svg files from a directory
fn collect_svg_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("svg")
            })
            .collect()
    } else {
        Vec::new()
    };

    files.sort();
    files
}

fn render_args(input: &str, output: &str, overlay: Option<String>, zoom: i32) -> Args {
    Args {
        command: Command::Render {
            input: input.to_string(),
            output: output.to_string(),
            overlay,
            width: 800.0,
            height: 400.0,
            zoom,
        },
        config: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_demo_diagrams() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let diagrams = collect_svg_files(demos_path());
    assert!(!diagrams.is_empty(), "No demo diagrams found in demos/");

    let mut failed = Vec::new();
    for diagram in &diagrams {
        let output = temp_dir.path().join(format!(
            "{}.out.svg",
            diagram.file_stem().unwrap().to_string_lossy()
        ));
        let args = render_args(
            &diagram.to_string_lossy(),
            &output.to_string_lossy(),
            None,
            0,
        );
        if let Err(e) = run(&args) {
            failed.push((diagram.clone(), e));
        }
    }

    if !failed.is_empty() {
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} demo diagram(s) failed", failed.len());
    }
}

#[test]
fn e2e_render_with_overlay() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demos = demos_path();
    let output = temp_dir.path().join("overlay.svg");

    let args = render_args(
        &demos.join("pump_station.svg").to_string_lossy(),
        &output.to_string_lossy(),
        Some(
            demos
                .join("pump_station.overlay.json")
                .to_string_lossy()
                .to_string(),
        ),
        2,
    );
    run(&args).expect("render should succeed");

    let svg = fs::read_to_string(output).expect("output should exist");
    assert!(svg.contains(r#"data-layer="badges""#));
    assert!(svg.contains("pid-highlight"));
    assert!(svg.contains(r#"data-path="path0""#));
    assert!(svg.contains(r#"aria-label="Gate valve V-201A""#));
}

#[test]
fn e2e_render_rejects_broken_diagram() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("broken.svg");
    fs::write(&input, "<svg><g></svg>").unwrap();

    let args = render_args(
        &input.to_string_lossy(),
        &temp_dir.path().join("out.svg").to_string_lossy(),
        None,
        0,
    );
    assert!(run(&args).is_err());
}

#[test]
fn e2e_validate_demo_tag_map() {
    let demos = demos_path();
    let report = validate_files(
        &demos.join("pump_station.tags.toml"),
        &demos.join("pump_station.svg"),
    )
    .expect("validation should run");
    assert!(report.is_clean(), "unexpected findings: {:?}", report.warnings());

    let report = validate_files(
        &demos.join("pump_station.tags.toml"),
        &demos.join("no_such_plant.svg"),
    )
    .expect("validation should run");
    assert!(
        report
            .warnings()
            .contains(&"missing svg 'no_such_plant.svg'".to_string())
    );
}

#[test]
fn e2e_render_reports_missing_diagram() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let args = render_args(
        &temp_dir.path().join("absent.svg").to_string_lossy(),
        &temp_dir.path().join("out.svg").to_string_lossy(),
        None,
        0,
    );
    assert!(matches!(
        run(&args),
        Err(PidviewError::Fetch(FetchError::NotFound(_)))
    ));
}
