use std::f64::consts::TAU;

use super::sampler::Star;

/// Everything besides the star itself that the spiral mapping depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapParams {
    pub arms: u32,
    pub pitch: f64,
    /// Rigid rotation rate in radians per unit time.
    pub omega: f64,
    pub time: f64,
}

/// Angular offset of an arm. Arm count 0 is treated as 1.
#[inline]
pub fn arm_angle(arm: u32, arms: u32) -> f64 {
    TAU * arm as f64 / arms.max(1) as f64
}

/// Polar angle of a star on its spiral arm.
///
/// `pitch * radius` bends radial rays into arms; `omega * time` rotates the
/// whole pattern without winding it.
#[inline]
pub fn spiral_angle(star: &Star, p: &MapParams) -> f64 {
    star.base_angle
        + arm_angle(star.arm, p.arms)
        + p.pitch * star.radius
        + p.omega * p.time
        + star.scatter
}

/// Cartesian position of a star. The vertical offset passes through.
#[inline]
pub fn map_position(star: &Star, p: &MapParams) -> [f64; 3] {
    let theta = spiral_angle(star, p);
    [
        star.radius * theta.cos(),
        star.radius * theta.sin(),
        star.vertical,
    ]
}
