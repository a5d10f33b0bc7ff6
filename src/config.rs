use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::color::ColorScheme;
use crate::export::ExportFormat;
use crate::galaxy::{GalaxyShape, Params};
use crate::view::Camera;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub galaxy: GalaxyShape,
    pub params: Params,
    pub display: DisplayConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub color_scheme: ColorScheme,
    pub fps: u32,
    /// Advance elapsed time while the viewer runs
    pub animate: bool,
    /// Simulation time per wall-clock second when animating
    pub time_scale: f64,
    pub show_panel: bool,
    pub camera: Camera,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color_scheme: ColorScheme::Plasma,
            fps: 30,
            animate: false,
            time_scale: 1.0,
            show_panel: true,
            camera: Camera::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Target of the in-viewer export key
    pub path: PathBuf,
    /// Inferred from the extension when unset
    pub format: Option<ExportFormat>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("galaxia.html"),
            format: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Get the default XDG config path (~/.config/galaxia/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("galaxia").join("config.toml"))
    }

    /// Load config from the default XDG path if it exists
    /// Returns None if file doesn't exist, logs warning on parse errors
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            return None;
        }
        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("{:#}; using defaults", e);
                None
            }
        }
    }

    /// Initialize default config file at XDG path, returns the path
    pub fn init_default_config() -> Result<PathBuf> {
        let path = Self::default_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Self::write_template(&path)?;
        Ok(path)
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, Self::generate_config_template())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Generate a commented TOML config template
    pub fn generate_config_template() -> String {
        r#"# Galaxia Configuration
# This file is auto-generated. Edit as needed.

[galaxy]
# Number of stars
stars = 1000
# Number of spiral arms
arms = 2
# Spiral winding per unit radius
pitch = 0.35
# Outer radius of the disk
max_radius = 15.0
# Random seed; the same seed always yields the same galaxy
seed = 42

[params]
# Central mass, scales colour intensity (0.5-5.0)
mass = 1.0
# Angular velocity of the rigid rotation (0.0-2.0)
omega = 0.4
# Vertical dispersion of the disk (0.05-0.5)
dispersion = 0.15
# Radial density, higher packs stars toward the centre (0.5-3.0)
radial_density = 1.0
# Vertical density, higher gives a thinner disk (0.5-3.0)
vertical_density = 1.0

[display]
# Color scheme: "plasma", "spectrum", "fire", "ocean", "purple", "monochrome"
color_scheme = "plasma"
# Frames per second
fps = 30
# Advance time so angular velocity is visible (space toggles at runtime)
animate = false
# Simulation time per second while animating
time_scale = 1.0
# Show the parameter panel
show_panel = true

[display.camera]
# Rotation about the galactic axis, radians
yaw = 0.0
# 0.0 looks straight down, 1.5708 is edge-on
tilt = 0.0
zoom = 1.0

[export]
# File written by the export key; format follows the extension
# (.json, .csv, .html) unless set explicitly
path = "galaxia.html"
# format = "html"
"#
        .to_string()
    }

    /// Force loaded values into the ranges the viewer supports.
    /// Returns a description of every adjustment made.
    pub fn normalize(&mut self) -> Vec<String> {
        let mut notes = Vec::new();

        if self.galaxy.arms == 0 {
            self.galaxy.arms = 1;
            notes.push("galaxy.arms = 0 treated as 1".to_string());
        }
        if !(self.galaxy.max_radius.is_finite() && self.galaxy.max_radius > 0.01) {
            notes.push(format!(
                "galaxy.max_radius = {} replaced by default",
                self.galaxy.max_radius
            ));
            self.galaxy.max_radius = GalaxyShape::default().max_radius;
        }
        if !self.galaxy.pitch.is_finite() {
            self.galaxy.pitch = GalaxyShape::default().pitch;
            notes.push("galaxy.pitch replaced by default".to_string());
        }

        let clamped = self.params.clamped();
        for param in clamped.changed_from(&self.params) {
            notes.push(format!(
                "params.{} = {} clamped to {}",
                param.key(),
                self.params.get(param),
                clamped.get(param)
            ));
        }
        self.params = clamped;

        if self.display.fps == 0 {
            self.display.fps = DisplayConfig::default().fps;
            notes.push("display.fps = 0 replaced by default".to_string());
        }
        if !self.display.time_scale.is_finite() {
            self.display.time_scale = 1.0;
            notes.push("display.time_scale replaced by default".to_string());
        }

        for note in &notes {
            warn!("Config: {}", note);
        }
        notes
    }

    /// Merge CLI arguments into config (CLI takes priority)
    pub fn merge_args(&mut self, args: &crate::Args) {
        // Galaxy shape
        if let Some(stars) = args.stars {
            self.galaxy.stars = stars;
        }
        if let Some(arms) = args.arms {
            self.galaxy.arms = arms;
        }
        if let Some(pitch) = args.pitch {
            self.galaxy.pitch = pitch;
        }
        if let Some(max_radius) = args.max_radius {
            self.galaxy.max_radius = max_radius;
        }
        if let Some(seed) = args.seed {
            self.galaxy.seed = seed;
        }

        // Adjustable parameters, range-checked later by normalize()
        if let Some(mass) = args.mass {
            self.params.mass = mass;
        }
        if let Some(omega) = args.omega {
            self.params.omega = omega;
        }
        if let Some(dispersion) = args.dispersion {
            self.params.dispersion = dispersion;
        }
        if let Some(density) = args.radial_density {
            self.params.radial_density = density;
        }
        if let Some(density) = args.vertical_density {
            self.params.vertical_density = density;
        }

        // Display
        if let Some(ref colors) = args.colors {
            match colors.parse() {
                Ok(scheme) => self.display.color_scheme = scheme,
                Err(e) => warn!("{}; keeping {}", e, self.display.color_scheme.name()),
            }
        }
        if args.animate {
            self.display.animate = true;
        }
        if let Some(fps) = args.fps {
            self.display.fps = fps;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn template_parses_to_defaults() {
        let parsed: Config = toml::from_str(&Config::generate_config_template()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn missing_sections_use_defaults() {
        let parsed: Config = toml::from_str("[params]\nmass = 2.0\n").unwrap();
        assert_eq!(parsed.params.mass, 2.0);
        assert_eq!(parsed.params.omega, Params::default().omega);
        assert_eq!(parsed.galaxy, GalaxyShape::default());
        assert_eq!(parsed.display, DisplayConfig::default());
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        Config::write_template(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[galaxy\nstars = ").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config"));
    }

    #[test]
    fn normalize_clamps_out_of_range_values() {
        let mut config: Config = toml::from_str(
            "[galaxy]\narms = 0\n[params]\nmass = 12.0\nvertical_density = 0.1\n[display]\nfps = 0\n",
        )
        .unwrap();
        let notes = config.normalize();
        assert_eq!(config.galaxy.arms, 1);
        assert_eq!(config.params.mass, 5.0);
        assert_eq!(config.params.vertical_density, 0.5);
        assert_eq!(config.display.fps, 30);
        assert_eq!(notes.len(), 4);

        assert!(Config::default().normalize().is_empty());
    }

    #[test]
    fn cli_overrides_config() {
        let args = crate::Args::parse_from([
            "galaxia",
            "--stars",
            "500",
            "--mass",
            "2.5",
            "--colors",
            "fire",
            "--animate",
        ]);
        let mut config = Config::default();
        config.merge_args(&args);
        assert_eq!(config.galaxy.stars, 500);
        assert_eq!(config.params.mass, 2.5);
        assert_eq!(config.display.color_scheme, ColorScheme::Fire);
        assert!(config.display.animate);
        // Untouched values survive
        assert_eq!(config.galaxy.arms, 2);
        assert_eq!(config.params.omega, 0.4);
    }

    #[test]
    fn cli_without_overrides_keeps_config() {
        let args = crate::Args::parse_from(["galaxia"]);
        let mut config = Config::default();
        config.params.mass = 3.0;
        config.merge_args(&args);
        assert_eq!(config.params.mass, 3.0);
        assert!(!config.display.animate);
    }
}
