use crate::core::models::dipole::PointStore;
use crate::core::physics::constants::PhysicalConstants;
use crate::core::physics::dipole::dipole_dipole;
use crate::engine::error::EngineError;
use tracing::instrument;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Sums every pair energy without the pipeline, one row of pairs `(i, i+1..N)` per unit of work.
///
/// This is the reference the pipeline total is checked against; it shares the pair
/// function but none of the queueing or shutdown machinery.
#[instrument(skip_all, name = "direct_sum_task")]
pub fn run(store: &PointStore, constants: &PhysicalConstants) -> Result<f64, EngineError> {
    let n = store.len();

    #[cfg(not(feature = "parallel"))]
    let total = (0..n)
        .map(|i| row_energy(store, constants, i))
        .try_fold(0.0, |acc, row| row.map(|r| acc + r));

    #[cfg(feature = "parallel")]
    let total = (0..n)
        .into_par_iter()
        .map(|i| row_energy(store, constants, i))
        .try_reduce(|| 0.0, |acc, row| Ok(acc + row));

    total
}

fn row_energy(
    store: &PointStore,
    constants: &PhysicalConstants,
    i: usize,
) -> Result<f64, EngineError> {
    let positions = store.positions();
    let moments = store.moments();
    let mut row = 0.0;
    for j in (i + 1)..store.len() {
        let pair = dipole_dipole(
            &positions[i],
            &moments[i],
            &positions[j],
            &moments[j],
            constants,
        )
        .map_err(|source| EngineError::Interaction {
            first: i,
            second: j,
            source,
        })?;
        row += pair.energy;
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::dipole::DipolePoint;
    use nalgebra::Vector3;

    #[test]
    fn three_collinear_points_sum_pairwise_terms() {
        let constants = PhysicalConstants::default();
        let m = Vector3::new(0.0, 1.0, 0.0);
        let store = PointStore::from_points([
            DipolePoint::new(Vector3::new(0.0, 0.0, 0.0), m),
            DipolePoint::new(Vector3::new(1.0, 0.0, 0.0), m),
            DipolePoint::new(Vector3::new(3.0, 0.0, 0.0), m),
        ]);

        // Moments perpendicular to the line: rawDot = -1 for every pair.
        let expected = constants.prefactor() * (1.0 / 1.0 + 1.0 / 27.0 + 1.0 / 8.0);
        let total = run(&store, &constants).unwrap();
        assert!((total - expected).abs() <= expected.abs() * 1e-12);
    }

    #[test]
    fn coincident_points_fail_the_sum() {
        let store = PointStore::from_points([
            DipolePoint::new(Vector3::zeros(), Vector3::x()),
            DipolePoint::new(Vector3::new(1.0, 0.0, 0.0), Vector3::x()),
            DipolePoint::new(Vector3::zeros(), Vector3::y()),
        ]);
        let result = run(&store, &PhysicalConstants::default());
        assert!(matches!(
            result,
            Err(EngineError::Interaction {
                first: 0,
                second: 2,
                ..
            })
        ));
    }

    #[test]
    fn fewer_than_two_points_sum_to_zero() {
        let store = PointStore::from_points([DipolePoint::new(Vector3::zeros(), Vector3::x())]);
        assert_eq!(run(&store, &PhysicalConstants::default()).unwrap(), 0.0);
    }
}
