//! Sweep parameters supplied by the operator

use crate::error::ValidationError;
use crate::naming::format_real;
use serde::{Deserialize, Serialize};

/// Upper bound on temperature points in one sweep
pub const MAX_SWEEP_POINTS: u64 = 10_000;

/// Tolerance applied when deciding whether the maximum is on the grid
pub const GRID_EPSILON: f64 = 1e-9;

/// Most decimal places a grid point is snapped to
const MAX_GRID_DECIMALS: usize = 22;

/// Parameter sweep requested by the operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRequest {
    /// Number of molecules per simulation
    pub molecules: u32,
    /// First temperature of the sweep
    pub min_temperature: f64,
    /// Last temperature of the sweep (inclusive)
    pub max_temperature: f64,
    /// Increment between temperatures
    pub step_temperature: f64,
    /// Simulated time in seconds
    pub simulation_end_time: f64,
    /// Whether each point also renders a movie
    #[serde(default)]
    pub record_movie: bool,
}

impl Default for SweepRequest {
    fn default() -> Self {
        Self {
            molecules: 1000,
            min_temperature: 85.0,
            max_temperature: 90.0,
            step_temperature: 1.0,
            simulation_end_time: 5.5,
            record_movie: false,
        }
    }
}

impl SweepRequest {
    /// With molecule count
    #[inline]
    #[must_use]
    pub fn with_molecules(mut self, molecules: u32) -> Self {
        self.molecules = molecules;
        self
    }

    /// With temperature range
    #[inline]
    #[must_use]
    pub fn with_range(mut self, min: f64, max: f64, step: f64) -> Self {
        self.min_temperature = min;
        self.max_temperature = max;
        self.step_temperature = step;
        self
    }

    /// With simulation end time
    #[inline]
    #[must_use]
    pub fn with_simulation_end_time(mut self, seconds: f64) -> Self {
        self.simulation_end_time = seconds;
        self
    }

    /// With movie rendering on or off
    #[inline]
    #[must_use]
    pub fn with_movie(mut self, record_movie: bool) -> Self {
        self.record_movie = record_movie;
        self
    }

    /// Check the request before a graph is built from it
    ///
    /// An empty range (`min > max`) is valid.
    ///
    /// # Errors
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.molecules == 0 {
            return Err(ValidationError::MissingMolecules);
        }
        if !(self.simulation_end_time.is_finite() && self.simulation_end_time > 0.0) {
            return Err(ValidationError::InvalidSimulationTime(self.simulation_end_time));
        }
        if !(self.step_temperature.is_finite() && self.step_temperature > 0.0) {
            return Err(ValidationError::InvalidStep(self.step_temperature));
        }
        if !self.min_temperature.is_finite() {
            return Err(ValidationError::NonFiniteBound {
                name: "min_temperature",
            });
        }
        if !self.max_temperature.is_finite() {
            return Err(ValidationError::NonFiniteBound {
                name: "max_temperature",
            });
        }

        let points = self.point_count();
        if points > MAX_SWEEP_POINTS {
            return Err(ValidationError::TooManyPoints {
                points,
                limit: MAX_SWEEP_POINTS,
            });
        }

        let grid = self.temperature_grid();
        if let Some(pair) = grid
            .windows(2)
            .find(|pair| format_real(pair[0]) == format_real(pair[1]))
        {
            return Err(ValidationError::IndistinctTemperatures {
                temperature: format_real(pair[0]),
            });
        }
        Ok(())
    }

    /// Number of temperature points in the inclusive range
    ///
    /// Zero for an empty range or an unusable step.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn point_count(&self) -> u64 {
        let span = self.max_temperature - self.min_temperature;
        if !(span >= 0.0 && self.step_temperature > 0.0) {
            return 0;
        }
        let steps = (span / self.step_temperature + GRID_EPSILON).floor();
        if !steps.is_finite() || steps >= u64::MAX as f64 {
            return u64::MAX;
        }
        steps as u64 + 1
    }

    /// Temperatures of the sweep, ascending
    ///
    /// Point `i` is `min + i * step` rounded to the decimal places of `min`
    /// and `step`, so rounding error never accumulates along the range and
    /// no point is named more coarsely than the operator wrote it.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn temperature_grid(&self) -> Vec<f64> {
        let count = self.point_count();
        if count > MAX_SWEEP_POINTS {
            return Vec::new();
        }
        let places =
            decimal_places(self.min_temperature).max(decimal_places(self.step_temperature));
        let scale = 10f64.powi(i32::try_from(places).unwrap_or(0));
        (0..count)
            .map(|i| snap(self.min_temperature + i as f64 * self.step_temperature, scale))
            .collect()
    }
}

/// Fractional digits in the shortest text of `value`
fn decimal_places(value: f64) -> usize {
    format_real(value)
        .split_once('.')
        .map_or(0, |(_, fraction)| fraction.len())
        .min(MAX_GRID_DECIMALS)
}

fn snap(value: f64, scale: f64) -> f64 {
    let snapped = (value * scale).round() / scale;
    if snapped.is_finite() {
        snapped
    } else {
        value
    }
}
