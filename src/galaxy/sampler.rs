//! Star-field sampling.
//!
//! Every sequence is drawn in full before the next one starts, from a single
//! seeded ChaCha stream, so a sample is reproducible from its inputs alone.
//! Draws are unit-scale (`Exp1`, `StandardNormal`) and scaled afterwards:
//! changing a density with the same seed rescales a sequence exactly instead
//! of reshuffling it.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Exp1, StandardNormal};
use std::f64::consts::TAU;

/// Smallest radius a star may sit at.
pub const MIN_RADIUS: f64 = 0.01;

/// Standard deviation of the angular scatter before radial attenuation.
pub const SCATTER_SIGMA: f64 = 0.6;

/// Inputs that determine a star sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSpec {
    pub count: usize,
    pub arms: u32,
    pub max_radius: f64,
    /// Vertical dispersion before density scaling.
    pub dispersion: f64,
    pub radial_density: f64,
    pub vertical_density: f64,
    pub seed: u64,
}

impl SampleSpec {
    /// Scale of the exponential radius distribution.
    pub fn radial_scale(&self) -> f64 {
        self.max_radius / (3.0 * self.radial_density)
    }

    /// Standard deviation of the vertical offsets.
    pub fn vertical_sigma(&self) -> f64 {
        self.dispersion / self.vertical_density
    }
}

/// Five parallel sequences, one entry per star.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StarSample {
    pub radius: Vec<f64>,
    pub base_angle: Vec<f64>,
    pub arm: Vec<u32>,
    pub scatter: Vec<f64>,
    pub vertical: Vec<f64>,
}

/// Borrowed view of a single star.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub radius: f64,
    pub base_angle: f64,
    pub arm: u32,
    pub scatter: f64,
    pub vertical: f64,
}

impl StarSample {
    pub fn len(&self) -> usize {
        self.radius.len()
    }

    pub fn star(&self, i: usize) -> Star {
        Star {
            radius: self.radius[i],
            base_angle: self.base_angle[i],
            arm: self.arm[i],
            scatter: self.scatter[i],
            vertical: self.vertical[i],
        }
    }

    pub fn stars(&self) -> impl Iterator<Item = Star> + '_ {
        (0..self.len()).map(|i| self.star(i))
    }
}

/// Draw a star sample. Arm count 0 is treated as a single arm.
pub fn sample_stars(spec: &SampleSpec) -> StarSample {
    let mut rng = ChaCha8Rng::seed_from_u64(spec.seed);
    let n = spec.count;
    let arms = spec.arms.max(1);

    let scale = spec.radial_scale();
    let radius: Vec<f64> = (0..n)
        .map(|_| {
            let e: f64 = rng.sample(Exp1);
            (e * scale).clamp(MIN_RADIUS, spec.max_radius)
        })
        .collect();

    let arm: Vec<u32> = (0..n).map(|_| rng.random_range(0..arms)).collect();

    let base_angle: Vec<f64> = (0..n).map(|_| rng.random_range(0.0..TAU)).collect();

    // Outer stars scatter less so arms stay tight at large radius
    let scatter: Vec<f64> = radius
        .iter()
        .map(|&r| {
            let g: f64 = rng.sample(StandardNormal);
            g * SCATTER_SIGMA / (1.0 + r / 2.0)
        })
        .collect();

    let sigma = spec.vertical_sigma();
    let vertical: Vec<f64> = (0..n)
        .map(|_| {
            let g: f64 = rng.sample(StandardNormal);
            g * sigma
        })
        .collect();

    StarSample {
        radius,
        base_angle,
        arm,
        scatter,
        vertical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> SampleSpec {
        SampleSpec {
            count: 1000,
            arms: 2,
            max_radius: 15.0,
            dispersion: 0.15,
            radial_density: 1.0,
            vertical_density: 1.0,
            seed: 42,
        }
    }

    fn std_dev(values: &[f64]) -> f64 {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
    }

    #[test]
    fn sequences_have_requested_length() {
        for count in [0, 1, 7, 1000] {
            let s = sample_stars(&SampleSpec { count, ..spec() });
            assert_eq!(s.radius.len(), count);
            assert_eq!(s.base_angle.len(), count);
            assert_eq!(s.arm.len(), count);
            assert_eq!(s.scatter.len(), count);
            assert_eq!(s.vertical.len(), count);
        }
    }

    #[test]
    fn radii_are_clamped() {
        // High density and a tiny disk push many draws against both bounds
        for (max_radius, radial_density) in [(15.0, 0.5), (15.0, 3.0), (0.5, 0.5)] {
            let s = sample_stars(&SampleSpec {
                max_radius,
                radial_density,
                ..spec()
            });
            assert!(s
                .radius
                .iter()
                .all(|&r| (MIN_RADIUS..=max_radius).contains(&r)));
        }
    }

    #[test]
    fn same_seed_is_bit_identical() {
        let a = sample_stars(&spec());
        let b = sample_stars(&spec());
        assert_eq!(a, b);

        let c = sample_stars(&SampleSpec { seed: 43, ..spec() });
        assert_ne!(a, c);
    }

    #[test]
    fn arm_indices_and_angles_in_range() {
        let s = sample_stars(&SampleSpec { arms: 3, ..spec() });
        assert!(s.arm.iter().all(|&a| a < 3));
        assert!(s.base_angle.iter().all(|&a| (0.0..TAU).contains(&a)));
        // All three arms get populated with a thousand stars
        for arm in 0..3 {
            assert!(s.arm.contains(&arm));
        }
    }

    #[test]
    fn zero_arms_behaves_as_one() {
        let s = sample_stars(&SampleSpec { arms: 0, ..spec() });
        assert!(s.arm.iter().all(|&a| a == 0));
    }

    #[test]
    fn higher_vertical_density_thins_the_disk() {
        let mut last = f64::INFINITY;
        for vertical_density in [0.5, 1.0, 1.5, 3.0] {
            let s = sample_stars(&SampleSpec {
                vertical_density,
                ..spec()
            });
            let sd = std_dev(&s.vertical);
            assert!(sd < last, "{sd} should be below {last}");
            last = sd;
        }
    }

    #[test]
    fn higher_radial_density_compresses_toward_center() {
        let loose = sample_stars(&SampleSpec {
            radial_density: 0.5,
            ..spec()
        });
        let dense = sample_stars(&SampleSpec {
            radial_density: 3.0,
            ..spec()
        });
        let mean = |v: &[f64]| v.iter().sum::<f64>() / v.len() as f64;
        assert!(mean(&dense.radius) < mean(&loose.radius));
    }

    #[test]
    fn scatter_is_attenuated_with_radius() {
        let s = sample_stars(&spec());
        // |scatter| * (1 + r/2) recovers the raw normal draw; its spread must
        // match the unattenuated sigma while the attenuated spread is smaller.
        let raw: Vec<f64> = s
            .scatter
            .iter()
            .zip(&s.radius)
            .map(|(d, r)| d * (1.0 + r / 2.0))
            .collect();
        let raw_sd = std_dev(&raw);
        assert!((raw_sd - SCATTER_SIGMA).abs() < 0.08, "raw sd {raw_sd}");
        assert!(std_dev(&s.scatter) < raw_sd);
    }
}
