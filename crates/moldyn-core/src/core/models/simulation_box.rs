use nalgebra::{Matrix3, Vector3};

/// Periodic simulation cell, stored as a matrix whose columns are the box vectors.
///
/// Only the diagonal is used for periodic unwrapping; the off-diagonal skew of
/// triclinic cells is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimulationBox(pub Matrix3<f32>);

impl SimulationBox {
    pub fn orthorhombic(extent: Vector3<f32>) -> Self {
        Self(Matrix3::from_diagonal(&extent))
    }

    /// Full per-axis extent (the matrix diagonal).
    pub fn extent(&self) -> Vector3<f32> {
        self.0.diagonal()
    }

    pub fn half_extent(&self) -> Vector3<f32> {
        self.extent() * 0.5
    }

    /// A box with a zero extent on any axis disables unwrapping on that axis.
    pub fn is_periodic(&self) -> bool {
        self.extent().iter().any(|&e| e > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_reads_matrix_diagonal_and_ignores_skew() {
        let mut m = Matrix3::from_diagonal(&Vector3::new(10.0, 20.0, 30.0));
        m[(0, 1)] = 5.0;
        let cell = SimulationBox(m);
        assert_eq!(cell.extent(), Vector3::new(10.0, 20.0, 30.0));
        assert_eq!(cell.half_extent(), Vector3::new(5.0, 10.0, 15.0));
    }

    #[test]
    fn default_box_is_not_periodic() {
        assert!(!SimulationBox::default().is_periodic());
        assert!(SimulationBox::orthorhombic(Vector3::new(1.0, 0.0, 0.0)).is_periodic());
    }
}
