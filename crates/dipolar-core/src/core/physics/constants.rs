use serde::Deserialize;
use std::f64::consts::PI;

pub const MU_0: f64 = 4.0 * PI * 1e-7;
pub const MU_E: f64 = 1.25663706e-6;
pub const SPIN_FACTOR: f64 = 0.5;

/// Physical constants entering the pair energy prefactor.
///
/// SI values by default; any of them can be overridden from a
/// `[constants]` table in a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct PhysicalConstants {
    /// Vacuum permeability.
    pub mu_0: f64,
    /// Moment magnitude scale; enters the energy squared.
    pub mu_e: f64,
    /// Spin normalization; the energy is divided by its square.
    pub spin_factor: f64,
}

impl PhysicalConstants {
    /// The factor multiplying `-rawDot / d³` in the pair energy.
    #[inline]
    pub fn prefactor(&self) -> f64 {
        self.mu_0 / (4.0 * PI) / (self.spin_factor * self.spin_factor) * self.mu_e * self.mu_e
    }
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            mu_0: MU_0,
            mu_e: MU_E,
            spin_factor: SPIN_FACTOR,
        }
    }
}
