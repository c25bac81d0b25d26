use super::simulation_box::SimulationBox;
use nalgebra::Point3;

/// Atom positions and simulation cell of one trajectory frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrajectoryFrame {
    pub positions: Vec<Point3<f32>>,
    pub sim_box: SimulationBox,
}

impl TrajectoryFrame {
    pub fn new(positions: Vec<Point3<f32>>, sim_box: SimulationBox) -> Self {
        Self { positions, sim_box }
    }

    pub fn atom_count(&self) -> usize {
        self.positions.len()
    }
}
