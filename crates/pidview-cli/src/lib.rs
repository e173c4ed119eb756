//! PIDView CLI library
//!
//! This module contains the core CLI logic: rendering a fitted, overlaid
//! view of a diagram to SVG, and validating tag maps against diagrams.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Command};

use std::{fs, io, path::Path, time::Instant};

use log::{info, warn};

use pidview::{
    DiagramViewport, InputEvent, PidviewError,
    geometry::Size,
    overlay::Overlay,
    source::{FetchError, FileSource, SourceId},
    validate::{self, TagMap, ValidationReport},
};

/// Run the PIDView CLI application
///
/// # Errors
///
/// Returns `PidviewError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Diagram loading errors
/// - Malformed overlay or tag map input
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), PidviewError> {
    let app_config = config::load_config(args.config.as_ref())?;

    match &args.command {
        Command::Render {
            input,
            output,
            overlay,
            width,
            height,
            zoom,
        } => {
            info!(input_path = input, output_path = output; "Rendering diagram");

            let mut view = DiagramViewport::new(app_config);
            let start = Instant::now();
            view.set_container_size(Size::new(*width, *height), start);

            let (source, id) = file_source(Path::new(input))?;
            view.load_from(&source, id)?;

            let key = if *zoom >= 0 { '+' } else { '-' };
            for _ in 0..zoom.unsigned_abs() {
                view.handle_input(InputEvent::Key(key), start);
            }
            view.tick(start + view.config().viewport().debounce());

            if let Some(path) = overlay {
                let json = fs::read_to_string(path)?;
                let overlay = Overlay::from_json(&json).map_err(io::Error::from)?;
                for warning in view.set_overlay(&overlay) {
                    warn!(warning; "Overlay warning");
                }
            }

            let svg = view.render_svg()?;
            fs::write(output, svg)?;
            info!(output_file = output; "SVG exported successfully");
            Ok(())
        }
        Command::Validate { tag_map, diagram } => {
            let report = validate_files(Path::new(tag_map), Path::new(diagram))?;
            for warning in report.warnings() {
                println!("{warning}");
            }
            info!(warnings = report.warnings().len(); "Validation finished");
            Ok(())
        }
    }
}

/// Validates a tag map file against a diagram file.
///
/// A diagram that does not exist is reported as a finding, not an error.
///
/// # Errors
///
/// Returns `PidviewError` if the tag map cannot be read or is malformed, or
/// if the diagram exists but cannot be loaded.
pub fn validate_files(tag_map: &Path, diagram: &Path) -> Result<ValidationReport, PidviewError> {
    let content = fs::read_to_string(tag_map)?;
    let map = TagMap::from_toml(&content)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

    if !diagram.exists() {
        let name = diagram
            .file_name()
            .map_or_else(|| diagram.display().to_string(), |n| n.to_string_lossy().into_owned());
        return Ok(validate::validate_missing_diagram(&map, &name));
    }

    let markup = fs::read_to_string(diagram)?;
    let scene = pidview_parser::parse(&markup)?;
    Ok(validate::validate(&map, &scene))
}

/// Splits a diagram path into a source over its directory and the diagram id.
fn file_source(path: &Path) -> Result<(FileSource, SourceId), FetchError> {
    let stem = path.file_stem().and_then(|s| s.to_str());
    let is_svg = path.extension().and_then(|e| e.to_str()) == Some("svg");
    let (Some(stem), true) = (stem, is_svg) else {
        return Err(FetchError::InvalidId(SourceId::new(
            path.display().to_string(),
        )));
    };

    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok((FileSource::new(dir), SourceId::new(stem)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_source_splits_path() {
        let (source, id) = file_source(Path::new("plants/north/P-101.svg")).unwrap();
        assert_eq!(source.dir(), Path::new("plants/north"));
        assert_eq!(id.as_str(), "P-101");

        let (source, id) = file_source(Path::new("P-101.svg")).unwrap();
        assert_eq!(source.dir(), Path::new("."));
        assert_eq!(id.as_str(), "P-101");
    }

    #[test]
    fn test_file_source_requires_svg() {
        assert!(matches!(
            file_source(Path::new("plants/P-101.xml")),
            Err(FetchError::InvalidId(_))
        ));
    }
}
