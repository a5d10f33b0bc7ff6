use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

const YAW_STEP: f64 = 0.1;
const TILT_STEP: f64 = 0.1;
const ZOOM_STEP: f64 = 1.15;

/// Orbit camera around the galactic centre.
///
/// `tilt = 0` looks straight down the z axis with +y up, `tilt = π/2` sees the
/// disk edge-on. Projection is orthographic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub yaw: f64,
    pub tilt: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            tilt: 0.0,
            zoom: 1.0,
        }
    }
}

impl Camera {
    /// Project a world point to view space: (right, up, depth toward viewer).
    pub fn project(&self, [x, y, z]: [f64; 3]) -> (f64, f64, f64) {
        let (sy, cy) = self.yaw.sin_cos();
        let x1 = x * cy - y * sy;
        let y1 = x * sy + y * cy;

        let (st, ct) = self.tilt.sin_cos();
        let up = y1 * ct + z * st;
        let depth = z * ct - y1 * st;
        (x1, up, depth)
    }

    pub fn orbit(&mut self, steps: i32) {
        self.yaw = (self.yaw + steps as f64 * YAW_STEP).rem_euclid(std::f64::consts::TAU);
    }

    pub fn tilt_by(&mut self, steps: i32) {
        self.tilt = (self.tilt + steps as f64 * TILT_STEP).clamp(0.0, FRAC_PI_2);
    }

    pub fn zoom_by(&mut self, steps: i32) {
        self.zoom = (self.zoom * ZOOM_STEP.powi(steps)).clamp(0.25, 8.0);
    }
}

/// Maps view-space coordinates onto a dot grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub cx: f64,
    pub cy: f64,
    /// Grid units per world unit.
    pub scale: f64,
    /// Horizontal stretch applied to grid x.
    pub aspect: f64,
}

impl Viewport {
    /// Fit a disk of `radius` world units into a `grid_w x grid_h` grid.
    /// `aspect` is the width/height of one grid unit.
    pub fn fit_disk(grid_w: usize, grid_h: usize, radius: f64, aspect: f64, zoom: f64) -> Self {
        let cx = grid_w as f64 / 2.0;
        let cy = grid_h as f64 / 2.0;
        let effective_w = grid_w as f64 / aspect;
        let fit = (effective_w.min(grid_h as f64) / 2.0) * 0.95;
        Self {
            cx,
            cy,
            scale: fit / radius.max(f64::EPSILON) * zoom,
            aspect,
        }
    }

    /// Grid position of a view-space point, or None when off-grid.
    pub fn to_grid(
        &self,
        right: f64,
        up: f64,
        grid_w: usize,
        grid_h: usize,
    ) -> Option<(usize, usize)> {
        let gx = self.cx + right * self.scale * self.aspect;
        let gy = self.cy - up * self.scale;
        if gx < 0.0 || gy < 0.0 {
            return None;
        }
        let (gx, gy) = (gx as usize, gy as usize);
        (gx < grid_w && gy < grid_h).then_some((gx, gy))
    }
}
