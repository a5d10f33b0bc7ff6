use tracing::debug;

use super::{render, sample_stars, GalaxyShape, Geometry, Param, ParamError, Params, StarSample};

/// Owns the current parameters and the last generated sample.
///
/// The sample is regenerated wholesale whenever one of its inputs changes and
/// reused otherwise; mapping always runs over the whole sample.
#[derive(Debug, Clone)]
pub struct Session {
    shape: GalaxyShape,
    params: Params,
    time: f64,
    sample: StarSample,
    generation: u64,
}

impl Session {
    pub fn new(shape: GalaxyShape, params: Params) -> Self {
        let params = params.clamped();
        let sample = sample_stars(&shape.sample_spec(&params));
        Self {
            shape,
            params,
            time: 0.0,
            sample,
            generation: 1,
        }
    }

    pub fn shape(&self) -> &GalaxyShape {
        &self.shape
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of samples drawn so far, including the initial one.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn regenerate(&mut self) {
        self.sample = sample_stars(&self.shape.sample_spec(&self.params));
        self.generation += 1;
        debug!(
            "Regenerated {} stars (seed {}, generation {})",
            self.sample.len(),
            self.shape.seed,
            self.generation
        );
    }

    pub fn set_param(&mut self, param: Param, value: f64) -> Result<(), ParamError> {
        let before = self.params.get(param);
        self.params.set(param, value)?;
        if param.affects_sample() && self.params.get(param) != before {
            self.regenerate();
        }
        Ok(())
    }

    /// Move a parameter by whole slider steps. Returns the new value.
    pub fn step_param(&mut self, param: Param, steps: i32) -> f64 {
        let before = self.params.get(param);
        let value = self.params.step(param, steps);
        if param.affects_sample() && value != before {
            self.regenerate();
        }
        value
    }

    /// Replace all parameters at once, regenerating at most once.
    pub fn set_params(&mut self, params: Params) {
        let params = params.clamped();
        let resample = params
            .changed_from(&self.params)
            .iter()
            .any(Param::affects_sample);
        self.params = params;
        if resample {
            self.regenerate();
        }
    }

    pub fn reset_params(&mut self) {
        self.set_params(Params::default());
    }

    pub fn reseed(&mut self, seed: u64) {
        self.shape.seed = seed;
        self.regenerate();
    }

    pub fn advance(&mut self, dt: f64) {
        self.time += dt;
    }

    pub fn reset_time(&mut self) {
        self.time = 0.0;
    }

    /// Current geometry for the presentation layer.
    pub fn render(&self) -> Geometry {
        render(&self.shape, &self.params, self.time, &self.sample)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(GalaxyShape::default(), Params::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_only_params_reuse_the_sample() {
        let mut session = Session::default();
        let sample = session.sample.clone();

        session.set_param(Param::Mass, 3.0).unwrap();
        session.set_param(Param::Omega, 1.2).unwrap();
        session.step_param(Param::Mass, 1);

        assert_eq!(session.generation(), 1);
        assert_eq!(session.sample, sample);
    }

    #[test]
    fn shape_params_regenerate() {
        let mut session = Session::default();
        session.set_param(Param::VerticalDensity, 2.0).unwrap();
        assert_eq!(session.generation(), 2);
        session.step_param(Param::RadialDensity, 1);
        assert_eq!(session.generation(), 3);

        // Unchanged value does not resample
        session.set_param(Param::VerticalDensity, 2.0).unwrap();
        assert_eq!(session.generation(), 3);
        // Neither does stepping into a wall
        session.step_param(Param::Dispersion, 100);
        let generation = session.generation();
        session.step_param(Param::Dispersion, 1);
        assert_eq!(session.generation(), generation);
    }

    #[test]
    fn rejected_values_leave_the_session_untouched() {
        let mut session = Session::default();
        let err = session.set_param(Param::RadialDensity, 10.0).unwrap_err();
        assert!(matches!(err, ParamError::OutOfRange { .. }));
        assert_eq!(session.params(), &Params::default());
        assert_eq!(session.generation(), 1);
    }

    #[test]
    fn resample_matches_fresh_session() {
        let mut session = Session::default();
        session.set_param(Param::Dispersion, 0.3).unwrap();
        let fresh = Session::new(
            GalaxyShape::default(),
            Params {
                dispersion: 0.3,
                ..Params::default()
            },
        );
        assert_eq!(session.render(), fresh.render());
    }

    #[test]
    fn reseed_changes_the_cloud() {
        let mut session = Session::default();
        let before = session.render();
        session.reseed(7);
        assert_eq!(session.shape().seed, 7);
        assert_ne!(session.render(), before);
    }

    #[test]
    fn time_rotates_without_resampling() {
        let mut session = Session::default();
        let still = session.render();
        session.advance(1.5);
        let moved = session.render();
        assert_eq!(session.generation(), 1);
        assert_ne!(still.x, moved.x);
        assert_eq!(still.z, moved.z);

        session.reset_time();
        assert_eq!(session.render(), still);
    }

    #[test]
    fn set_params_clamps_and_resamples_once() {
        let mut session = Session::default();
        session.set_params(Params {
            mass: 50.0,
            radial_density: 2.0,
            vertical_density: 2.0,
            ..Params::default()
        });
        assert_eq!(session.params().mass, 5.0);
        assert_eq!(session.generation(), 2);

        session.reset_params();
        assert_eq!(session.params(), &Params::default());
        assert_eq!(session.generation(), 3);
    }
}
