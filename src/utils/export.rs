use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::config::constants::EXPORT_TIMESTAMP_FORMAT;
use crate::core::commands::CommandOutput;
use crate::error::{LocatorError, LocatorResult};
use crate::utils::logging::{self, FileIOType, OperationCategory};

#[derive(Debug, Serialize)]
struct PointRow<'a> {
    command: &'a str,
    label: &'a str,
    x: f64,
    y: f64,
    node: Option<usize>,
    node_x: Option<f64>,
    node_y: Option<f64>,
}

#[derive(Debug, Serialize)]
struct EdgeRow<'a> {
    command: &'a str,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

/// `<dir>/<stem>_<timestamp>.<extension>`, creating `dir` if needed.
pub fn timestamped_path(dir: &Path, stem: &str, extension: &str) -> LocatorResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let timestamp = Local::now().format(EXPORT_TIMESTAMP_FORMAT).to_string();
    Ok(dir.join(format!("{}_{}.{}", stem, timestamp, extension)))
}

/// One row per labelled point across all outputs.
pub fn export_points_csv(path: &Path, outputs: &[CommandOutput]) -> LocatorResult<()> {
    let _timing = logging::start_timing("export_points_csv",
        OperationCategory::FileIO { subcategory: FileIOType::ResultsExport });

    let mut writer = csv::Writer::from_path(path)?;
    let mut rows = 0;
    for output in outputs {
        let command = output.command.label();
        for point in &output.points {
            writer.serialize(PointRow {
                command,
                label: &point.label,
                x: point.location.x,
                y: point.location.y,
                node: point.nearest_node,
                node_x: point.node_location.map(|c| c.x),
                node_y: point.node_location.map(|c| c.y),
            })?;
            rows += 1;
        }
    }
    writer.flush()?;
    info!("Wrote {} point rows to {}", rows, path.display());
    Ok(())
}

pub fn export_edges_csv(path: &Path, outputs: &[CommandOutput]) -> LocatorResult<()> {
    let _timing = logging::start_timing("export_edges_csv",
        OperationCategory::FileIO { subcategory: FileIOType::ResultsExport });

    let mut writer = csv::Writer::from_path(path)?;
    for output in outputs {
        for (a, b) in &output.edges {
            writer.serialize(EdgeRow {
                command: output.command.label(),
                x1: a.x,
                y1: a.y,
                x2: b.x,
                y2: b.y,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// FeatureCollection with a Point per labelled point and a LineString per edge.
pub fn to_geojson(outputs: &[CommandOutput]) -> Value {
    let mut features = Vec::new();
    for output in outputs {
        let command = output.command.label();
        for point in &output.points {
            features.push(json!({
                "type": "Feature",
                "properties": {
                    "command": command,
                    "label": point.label,
                    "nearest_node": point.nearest_node,
                },
                "geometry": {"type": "Point", "coordinates": [point.location.x, point.location.y]},
            }));
        }
        for (a, b) in &output.edges {
            features.push(json!({
                "type": "Feature",
                "properties": {"command": command},
                "geometry": {"type": "LineString", "coordinates": [[a.x, a.y], [b.x, b.y]]},
            }));
        }
    }
    json!({"type": "FeatureCollection", "features": features})
}

pub fn export_geojson(path: &Path, outputs: &[CommandOutput]) -> LocatorResult<()> {
    let _timing = logging::start_timing("export_geojson",
        OperationCategory::FileIO { subcategory: FileIOType::ResultsExport });

    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &to_geojson(outputs))
        .map_err(|e| LocatorError::Export(e.to_string()))?;
    info!("Wrote GeoJSON results to {}", path.display());
    Ok(())
}
