use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when addressing or changing a parameter.
#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("unknown parameter '{0}' (expected one of: mass, omega, dispersion, radial_density, vertical_density)")]
    Unknown(String),
    #[error("{param} must be a finite number, got {value}")]
    NotFinite { param: Param, value: f64 },
    #[error("{param} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        param: Param,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Bounds and step of one adjustable parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl SliderRange {
    const fn new(min: f64, max: f64, step: f64, default: f64) -> Self {
        Self {
            min,
            max,
            step,
            default,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        // Tolerate float noise from step arithmetic
        value >= self.min - 1e-9 && value <= self.max + 1e-9
    }

    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.default;
        }
        value.clamp(self.min, self.max)
    }

    /// Fraction of the way from min to max, for gauges.
    pub fn ratio(&self, value: f64) -> f64 {
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    /// Move `steps` whole steps from `value`, snapped to the step grid.
    pub fn step_from(&self, value: f64, steps: i32) -> f64 {
        let raw = value + steps as f64 * self.step;
        let snapped = self.min + ((raw - self.min) / self.step).round() * self.step;
        // Drop the 1e-17 tails so values print cleanly
        let snapped = (snapped * 1e9).round() / 1e9;
        self.clamp(snapped)
    }
}

/// The five user-adjustable parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    Mass,
    Omega,
    Dispersion,
    RadialDensity,
    VerticalDensity,
}

impl Param {
    pub const ALL: [Param; 5] = [
        Param::Mass,
        Param::Omega,
        Param::Dispersion,
        Param::RadialDensity,
        Param::VerticalDensity,
    ];

    /// Name used in config files and on the control socket.
    pub fn key(&self) -> &'static str {
        match self {
            Param::Mass => "mass",
            Param::Omega => "omega",
            Param::Dispersion => "dispersion",
            Param::RadialDensity => "radial_density",
            Param::VerticalDensity => "vertical_density",
        }
    }

    /// Label shown next to the slider.
    pub fn label(&self) -> &'static str {
        match self {
            Param::Mass => "Central mass",
            Param::Omega => "Angular velocity",
            Param::Dispersion => "Dispersion (z)",
            Param::RadialDensity => "Radial density",
            Param::VerticalDensity => "Vertical density",
        }
    }

    pub fn range(&self) -> SliderRange {
        match self {
            Param::Mass => SliderRange::new(0.5, 5.0, 0.5, 1.0),
            Param::Omega => SliderRange::new(0.0, 2.0, 0.1, 0.4),
            Param::Dispersion => SliderRange::new(0.05, 0.5, 0.05, 0.15),
            Param::RadialDensity => SliderRange::new(0.5, 3.0, 0.1, 1.0),
            Param::VerticalDensity => SliderRange::new(0.5, 3.0, 0.1, 1.0),
        }
    }

    /// Whether changing this parameter invalidates the star sample.
    pub fn affects_sample(&self) -> bool {
        matches!(
            self,
            Param::Dispersion | Param::RadialDensity | Param::VerticalDensity
        )
    }

    pub fn next(&self) -> Self {
        let i = Self::ALL.iter().position(|p| p == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        let i = Self::ALL.iter().position(|p| p == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Param {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "mass" | "masa" => Ok(Param::Mass),
            "omega" | "angular_velocity" | "velocity" => Ok(Param::Omega),
            "dispersion" | "disp" | "disp_z" => Ok(Param::Dispersion),
            "radial_density" | "density" => Ok(Param::RadialDensity),
            "vertical_density" | "density_z" | "thickness" => Ok(Param::VerticalDensity),
            _ => Err(ParamError::Unknown(s.to_string())),
        }
    }
}

/// Current values of the adjustable parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Scales colour intensity only.
    pub mass: f64,
    pub omega: f64,
    pub dispersion: f64,
    pub radial_density: f64,
    pub vertical_density: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            mass: Param::Mass.range().default,
            omega: Param::Omega.range().default,
            dispersion: Param::Dispersion.range().default,
            radial_density: Param::RadialDensity.range().default,
            vertical_density: Param::VerticalDensity.range().default,
        }
    }
}

impl Params {
    pub fn get(&self, param: Param) -> f64 {
        match param {
            Param::Mass => self.mass,
            Param::Omega => self.omega,
            Param::Dispersion => self.dispersion,
            Param::RadialDensity => self.radial_density,
            Param::VerticalDensity => self.vertical_density,
        }
    }

    fn slot(&mut self, param: Param) -> &mut f64 {
        match param {
            Param::Mass => &mut self.mass,
            Param::Omega => &mut self.omega,
            Param::Dispersion => &mut self.dispersion,
            Param::RadialDensity => &mut self.radial_density,
            Param::VerticalDensity => &mut self.vertical_density,
        }
    }

    /// Set a parameter, rejecting values outside its slider range.
    pub fn set(&mut self, param: Param, value: f64) -> Result<(), ParamError> {
        if !value.is_finite() {
            return Err(ParamError::NotFinite { param, value });
        }
        let range = param.range();
        if !range.contains(value) {
            return Err(ParamError::OutOfRange {
                param,
                value,
                min: range.min,
                max: range.max,
            });
        }
        *self.slot(param) = range.clamp(value);
        Ok(())
    }

    /// Move a parameter by whole slider steps, stopping at the ends.
    /// Returns the new value.
    pub fn step(&mut self, param: Param, steps: i32) -> f64 {
        let value = param.range().step_from(self.get(param), steps);
        *self.slot(param) = value;
        value
    }

    /// Copy with every field forced into its slider range.
    pub fn clamped(&self) -> Self {
        let mut out = *self;
        for param in Param::ALL {
            let v = param.range().clamp(out.get(param));
            *out.slot(param) = v;
        }
        out
    }

    /// Parameters whose values differ from `other`.
    pub fn changed_from(&self, other: &Params) -> Vec<Param> {
        Param::ALL
            .into_iter()
            .filter(|&p| self.get(p) != other.get(p))
            .collect()
    }
}
