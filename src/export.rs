//! Snapshots of the current geometry as JSON, CSV or a standalone HTML page.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::color::{to_hex, ColorScheme};
use crate::galaxy::{GalaxyShape, Geometry, Params, Session};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot infer export format from '{0}' (use .json, .csv or .html, or pass --format)")]
    UnknownFormat(PathBuf),
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
    Html,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct Snapshot<'a> {
    galaxy: &'a GalaxyShape,
    params: &'a Params,
    time: f64,
    stars: &'a Geometry,
}

pub fn to_json(session: &Session, geometry: &Geometry) -> Result<String, ExportError> {
    let snapshot = Snapshot {
        galaxy: session.shape(),
        params: session.params(),
        time: session.time(),
        stars: geometry,
    };
    Ok(serde_json::to_string_pretty(&snapshot)?)
}

pub fn to_csv(geometry: &Geometry) -> String {
    let mut out = String::from("x,y,z,color\n");
    for ([x, y, z], color) in geometry.points() {
        let _ = writeln!(out, "{},{},{},{}", x, y, z, color);
    }
    out
}

/// Standalone page with a top-down SVG scatter on black.
pub fn to_html(session: &Session, geometry: &Geometry, scheme: ColorScheme) -> String {
    let shape = session.shape();
    let params = session.params();
    let r = shape.max_radius * 1.05;
    let dot = shape.max_radius / 250.0;
    let color_max = shape.color_max();

    let mut circles = String::with_capacity(geometry.len() * 64);
    for ([x, y, _], value) in geometry.points() {
        let _ = writeln!(
            circles,
            r#"<circle cx="{:.4}" cy="{:.4}" r="{:.4}" fill="{}"/>"#,
            x,
            // SVG y grows downward
            -y,
            dot,
            to_hex(scheme.star_color(value, color_max))
        );
    }

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Spiral Galaxy</title>
<style>
body {{ margin: 0; background: #000; color: #ccc; font-family: monospace; }}
header {{ padding: 8px 16px; }}
svg {{ display: block; width: 100vmin; height: 100vmin; margin: 0 auto; }}
circle {{ opacity: 0.8; }}
</style>
</head>
<body>
<header>
<h1>Spiral Galaxy</h1>
<p>stars {stars} · arms {arms} · pitch {pitch} · seed {seed} · t = {time:.2}</p>
<p>mass {mass:.2} · omega {omega:.2} · dispersion {dispersion:.2} · radial density {radial:.2} · vertical density {vertical:.2}</p>
</header>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="{min} {min} {size} {size}">
<rect x="{min}" y="{min}" width="{size}" height="{size}" fill="#000"/>
{circles}</svg>
</body>
</html>
"##,
        stars = shape.stars,
        arms = shape.arms,
        pitch = shape.pitch,
        seed = shape.seed,
        time = session.time(),
        mass = params.mass,
        omega = params.omega,
        dispersion = params.dispersion,
        radial = params.radial_density,
        vertical = params.vertical_density,
        min = -r,
        size = 2.0 * r,
        circles = circles,
    )
}

/// Write the session's current geometry to `path`.
/// The format falls back to the file extension when not given.
pub fn write_snapshot(
    path: &Path,
    format: Option<ExportFormat>,
    session: &Session,
    scheme: ColorScheme,
) -> Result<ExportFormat, ExportError> {
    let format = format
        .or_else(|| ExportFormat::from_path(path))
        .ok_or_else(|| ExportError::UnknownFormat(path.to_path_buf()))?;

    let geometry = session.render();
    let body = match format {
        ExportFormat::Json => to_json(session, &geometry)?,
        ExportFormat::Csv => to_csv(&geometry),
        ExportFormat::Html => to_html(session, &geometry, scheme),
    };

    std::fs::write(path, body).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        "Exported {} stars as {:?} to {}",
        geometry.len(),
        format,
        path.display()
    );
    Ok(format)
}
