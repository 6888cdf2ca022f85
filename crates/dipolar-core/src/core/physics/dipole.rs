use super::constants::PhysicalConstants;
use nalgebra::Vector3;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InteractionError {
    #[error("points are coincident (zero separation)")]
    Coincident,
    #[error("interaction energy is not finite")]
    NonFinite,
}

/// One evaluated pair term.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PairEnergy {
    /// The unnormalized orientation term `3(m1·u)(m2·u) - m1·m2`.
    pub raw_dot: f64,
    pub energy: f64,
}

#[inline]
pub fn orientation_term(m1: &Vector3<f64>, m2: &Vector3<f64>, unit: &Vector3<f64>) -> f64 {
    3.0 * m1.dot(unit) * m2.dot(unit) - m1.dot(m2)
}

/// Closed-form dipole–dipole energy of the pair `(r1, m1)`, `(r2, m2)`.
///
/// `energy = -rawDot * prefactor / d³`, with `d = |r1 - r2|`. Coincident points have no
/// defined separation direction and are rejected instead of yielding NaN.
#[inline]
pub fn dipole_dipole(
    r1: &Vector3<f64>,
    m1: &Vector3<f64>,
    r2: &Vector3<f64>,
    m2: &Vector3<f64>,
    constants: &PhysicalConstants,
) -> Result<PairEnergy, InteractionError> {
    let dr = r1 - r2;
    let dist = dr.norm();
    if dist == 0.0 {
        return Err(InteractionError::Coincident);
    }

    let unit = dr / dist;
    let raw_dot = orientation_term(m1, m2, &unit);
    let energy = -raw_dot * constants.prefactor() / (dist * dist * dist);

    if !energy.is_finite() {
        return Err(InteractionError::NonFinite);
    }
    Ok(PairEnergy { raw_dot, energy })
}
