//! Spiral galaxy generation: sampling, spiral mapping, and the session that
//! ties them to the adjustable parameters.

mod mapper;
mod params;
mod sampler;
mod session;

pub use mapper::{map_position, MapParams};
pub use params::{Param, ParamError, Params};
pub use sampler::{sample_stars, SampleSpec, StarSample};
pub use session::Session;

use serde::{Deserialize, Serialize};

/// Session-wide constants of the galaxy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalaxyShape {
    pub stars: usize,
    pub arms: u32,
    /// Spiral winding per unit radius.
    pub pitch: f64,
    pub max_radius: f64,
    pub seed: u64,
}

impl Default for GalaxyShape {
    fn default() -> Self {
        Self {
            stars: 1000,
            arms: 2,
            pitch: 0.35,
            max_radius: 15.0,
            seed: 42,
        }
    }
}

impl GalaxyShape {
    /// Sampler inputs for this shape under the given parameters.
    pub fn sample_spec(&self, params: &Params) -> SampleSpec {
        SampleSpec {
            count: self.stars,
            arms: self.arms,
            max_radius: self.max_radius,
            dispersion: params.dispersion,
            radial_density: params.radial_density,
            vertical_density: params.vertical_density,
            seed: self.seed,
        }
    }

    pub fn map_params(&self, params: &Params, time: f64) -> MapParams {
        MapParams {
            arms: self.arms,
            pitch: self.pitch,
            omega: params.omega,
            time,
        }
    }

    /// Colour value mapped to the top of the gradient: the outermost star at
    /// default mass. Heavier galaxies saturate from the rim inward.
    pub fn color_max(&self) -> f64 {
        self.max_radius * Param::Mass.range().default
    }
}

/// Renderable output: positions plus a colour value per star.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Geometry {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    /// `radius * mass`
    pub color: Vec<f64>,
}

impl Geometry {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn points(&self) -> impl Iterator<Item = ([f64; 3], f64)> + '_ {
        (0..self.len()).map(|i| ([self.x[i], self.y[i], self.z[i]], self.color[i]))
    }
}

/// Map a sample into renderable geometry. Pure: same inputs, same output.
pub fn render(shape: &GalaxyShape, params: &Params, time: f64, sample: &StarSample) -> Geometry {
    let map = shape.map_params(params, time);
    let n = sample.len();
    let mut geometry = Geometry {
        x: Vec::with_capacity(n),
        y: Vec::with_capacity(n),
        z: Vec::with_capacity(n),
        color: Vec::with_capacity(n),
    };

    for star in sample.stars() {
        let [x, y, z] = map_position(&star, &map);
        geometry.x.push(x);
        geometry.y.push(y);
        geometry.z.push(z);
        geometry.color.push(star.radius * params.mass);
    }

    geometry
}
