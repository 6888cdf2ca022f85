use nalgebra::Vector3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Position and moment counts differ: {positions} positions, {moments} moments")]
    LengthMismatch { positions: usize, moments: usize },
}

/// A point dipole: where it sits and which way its magnetic moment points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DipolePoint {
    pub position: Vector3<f64>,
    pub moment: Vector3<f64>,
}

impl DipolePoint {
    pub fn new(position: Vector3<f64>, moment: Vector3<f64>) -> Self {
        Self { position, moment }
    }
}

/// The four vectors needed to evaluate one unordered pair `(first, second)`, `first < second`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairTask {
    pub first: usize,
    pub second: usize,
    pub r1: Vector3<f64>,
    pub m1: Vector3<f64>,
    pub r2: Vector3<f64>,
    pub m2: Vector3<f64>,
}

/// Read-only storage of the loaded dipoles as two parallel sequences sharing one index.
///
/// A `PointStore` is built once, wrapped in an `Arc`, and shared by every pipeline task
/// without locking. It exposes no mutating methods.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointStore {
    positions: Vec<Vector3<f64>>,
    moments: Vec<Vector3<f64>>,
}

impl PointStore {
    pub fn new(
        positions: Vec<Vector3<f64>>,
        moments: Vec<Vector3<f64>>,
    ) -> Result<Self, StoreError> {
        if positions.len() != moments.len() {
            return Err(StoreError::LengthMismatch {
                positions: positions.len(),
                moments: moments.len(),
            });
        }
        Ok(Self { positions, moments })
    }

    pub fn from_points(points: impl IntoIterator<Item = DipolePoint>) -> Self {
        let (positions, moments) = points
            .into_iter()
            .map(|p| (p.position, p.moment))
            .unzip();
        Self { positions, moments }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of unique unordered pairs, `N(N-1)/2`.
    pub fn pair_count(&self) -> u64 {
        let n = self.len() as u64;
        n * n.saturating_sub(1) / 2
    }

    pub fn positions(&self) -> &[Vector3<f64>] {
        &self.positions
    }

    pub fn moments(&self) -> &[Vector3<f64>] {
        &self.moments
    }

    pub fn position(&self, index: usize) -> Option<&Vector3<f64>> {
        self.positions.get(index)
    }

    pub fn moment(&self, index: usize) -> Option<&Vector3<f64>> {
        self.moments.get(index)
    }

    pub fn point(&self, index: usize) -> Option<DipolePoint> {
        Some(DipolePoint::new(
            *self.positions.get(index)?,
            *self.moments.get(index)?,
        ))
    }

    pub fn iter(&self) -> impl Iterator<Item = DipolePoint> + '_ {
        self.positions
            .iter()
            .zip(&self.moments)
            .map(|(r, m)| DipolePoint::new(*r, *m))
    }

    /// Copies the vectors of points `first` and `second` into a [`PairTask`].
    ///
    /// Returns `None` if either index is out of range.
    pub fn pair_task(&self, first: usize, second: usize) -> Option<PairTask> {
        let a = self.point(first)?;
        let b = self.point(second)?;
        Some(PairTask {
            first,
            second,
            r1: a.position,
            m1: a.moment,
            r2: b.position,
            m2: b.moment,
        })
    }
}
