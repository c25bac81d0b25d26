use itertools::iproduct;
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;
use std::ops::{Range, RangeInclusive};

type CellKey = [i32; 3];

/// Uniform grid hashed by integer cell coordinate.
///
/// Only occupied cells are stored, so memory is proportional to the number of
/// points no matter how far apart they are. Entries are sorted by cell and then
/// by point index; each occupied cell maps to its slice of `entries`.
#[derive(Debug, Clone)]
pub struct SpatialHashGrid {
    cell_size: f32,
    cells: HashMap<CellKey, Range<usize>>,
    entries: Vec<(usize, Point3<f32>)>,
    occupied: Option<(CellKey, CellKey)>,
}

impl SpatialHashGrid {
    /// Buckets `points` into cubic cells of edge `cell_size`.
    ///
    /// # Panics
    ///
    /// Panics if `cell_size` is not strictly positive.
    pub fn build(points: &[Point3<f32>], cell_size: f32) -> Self {
        assert!(
            cell_size > 0.0,
            "spatial hash cell size must be positive, got {cell_size}"
        );

        let mut keyed: Vec<(CellKey, usize)> = points
            .iter()
            .enumerate()
            .map(|(index, p)| (cell_key(p, cell_size), index))
            .collect();
        keyed.sort_unstable();

        let mut cells: HashMap<CellKey, Range<usize>> = HashMap::new();
        let mut occupied: Option<(CellKey, CellKey)> = None;
        let mut start = 0;
        while start < keyed.len() {
            let key = keyed[start].0;
            let end = start + keyed[start..].iter().take_while(|(k, _)| *k == key).count();
            cells.insert(key, start..end);
            occupied = Some(match occupied {
                None => (key, key),
                Some((lo, hi)) => (
                    [0, 1, 2].map(|axis| lo[axis].min(key[axis])),
                    [0, 1, 2].map(|axis| hi[axis].max(key[axis])),
                ),
            });
            start = end;
        }

        let entries = keyed
            .into_iter()
            .map(|(_, index)| (index, points[index]))
            .collect();

        Self {
            cell_size,
            cells,
            entries,
            occupied,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of cells holding at least one point.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Every point whose cell overlaps the axis-aligned cube of half-width
    /// `radius` around `center`, as `(point_index, position)`.
    ///
    /// The result is a superset of the points within `radius`; points inside the
    /// same cell are yielded in ascending index order.
    pub fn query(
        &self,
        center: Point3<f32>,
        radius: f32,
    ) -> impl Iterator<Item = (usize, Point3<f32>)> + '_ {
        let [xs, ys, zs] = self.cell_span(center, radius);
        iproduct!(zs, ys, xs)
            .filter_map(move |(z, y, x)| self.cells.get(&[x, y, z]))
            .flat_map(move |range| self.entries[range.clone()].iter().copied())
    }

    /// Like [`query`](Self::query) but filtered to an exact distance of at most `radius`.
    pub fn within(
        &self,
        center: Point3<f32>,
        radius: f32,
    ) -> impl Iterator<Item = (usize, Point3<f32>)> + '_ {
        let r2 = radius * radius;
        self.query(center, radius)
            .filter(move |(_, p)| (p - center).norm_squared() <= r2)
    }

    /// Cell coordinates overlapped by the query cube, clipped to the occupied
    /// region so that the walk never leaves it.
    fn cell_span(&self, center: Point3<f32>, radius: f32) -> [RangeInclusive<i32>; 3] {
        let Some((min, max)) = self.occupied else {
            return [EMPTY_SPAN; 3];
        };
        let r = Vector3::repeat(radius.max(0.0));
        let lo = (center - r) / self.cell_size;
        let hi = (center + r) / self.cell_size;
        if lo.iter().chain(hi.iter()).any(|c| c.is_nan()) {
            return [EMPTY_SPAN; 3];
        }
        [0, 1, 2].map(|axis| {
            let from = (lo[axis].floor() as i32).max(min[axis]);
            let to = (hi[axis].floor() as i32).min(max[axis]);
            if from > to { EMPTY_SPAN } else { from..=to }
        })
    }
}

const EMPTY_SPAN: RangeInclusive<i32> = 1..=0;

fn cell_key(p: &Point3<f32>, cell_size: f32) -> CellKey {
    // `as` saturates, so far-out coordinates land in the outermost cells.
    [0, 1, 2].map(|axis| (p[axis] / cell_size).floor() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Deterministic pseudo-random points in a cube of edge `size`.
    fn scattered_points(count: usize, size: f32, seed: u64) -> Vec<Point3<f32>> {
        let mut state = seed;
        let mut next = move || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 33) as f32 / (1u64 << 31) as f32) * size
        };
        (0..count)
            .map(|_| Point3::new(next(), next(), next()))
            .collect()
    }

    #[test]
    fn query_returns_superset_of_points_within_radius() {
        let points = scattered_points(500, 20.0, 7);
        let grid = SpatialHashGrid::build(&points, 3.5);
        let centers = scattered_points(40, 24.0, 99);

        for radius in [0.5, 3.5, 6.0] {
            for center in &centers {
                let candidates: HashSet<usize> = grid.query(*center, radius).map(|(i, _)| i).collect();
                for (i, p) in points.iter().enumerate() {
                    if (p - center).norm() <= radius {
                        assert!(candidates.contains(&i), "missed point {i} at radius {radius}");
                    }
                }
            }
        }
    }

    #[test]
    fn query_yields_each_point_at_most_once_with_its_position() {
        let points = scattered_points(200, 10.0, 3);
        let grid = SpatialHashGrid::build(&points, 2.0);
        let found: Vec<_> = grid.query(Point3::new(5.0, 5.0, 5.0), 100.0).collect();

        assert_eq!(found.len(), points.len());
        let unique: HashSet<usize> = found.iter().map(|(i, _)| *i).collect();
        assert_eq!(unique.len(), points.len());
        for (i, p) in found {
            assert_eq!(p, points[i]);
        }
    }

    #[test]
    fn within_filters_to_exact_distance() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
        ];
        let grid = SpatialHashGrid::build(&points, 3.5);
        let mut hits: Vec<usize> = grid.within(Point3::origin(), 1.2).map(|(i, _)| i).collect();
        hits.sort_unstable();
        assert_eq!(hits, vec![0, 1]);
    }

    #[test]
    fn query_far_outside_grid_is_empty() {
        let points = scattered_points(50, 5.0, 1);
        let grid = SpatialHashGrid::build(&points, 1.0);
        assert_eq!(grid.query(Point3::new(100.0, 0.0, 0.0), 2.0).count(), 0);
        assert_eq!(grid.query(Point3::new(-50.0, -50.0, -50.0), 2.0).count(), 0);
    }

    #[test]
    fn empty_point_set_builds_and_queries_nothing() {
        let grid = SpatialHashGrid::build(&[], 3.5);
        assert!(grid.is_empty());
        assert_eq!(grid.query(Point3::origin(), 10.0).count(), 0);
    }

    #[test]
    fn query_is_restartable() {
        let points = scattered_points(30, 4.0, 11);
        let grid = SpatialHashGrid::build(&points, 1.0);
        let center = Point3::new(2.0, 2.0, 2.0);
        let first: Vec<_> = grid.query(center, 1.5).collect();
        let second: Vec<_> = grid.query(center, 1.5).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn distant_points_occupy_only_their_own_cells() {
        let points = vec![Point3::origin(), Point3::new(1000.0, 1000.0, 1000.0)];
        let grid = SpatialHashGrid::build(&points, 3.5);

        assert_eq!(grid.occupied_cells(), 2);
        assert_eq!(grid.len(), 2);
        let near_origin: Vec<usize> = grid.query(Point3::origin(), 3.5).map(|(i, _)| i).collect();
        assert_eq!(near_origin, vec![0]);
        let near_far: Vec<usize> = grid.within(points[1], 1.0).map(|(i, _)| i).collect();
        assert_eq!(near_far, vec![1]);
        assert_eq!(grid.query(Point3::new(500.0, 500.0, 500.0), 3.5).count(), 0);
    }

    #[test]
    fn points_sharing_a_cell_come_out_in_index_order() {
        let points = vec![
            Point3::new(0.3, 0.3, 0.3),
            Point3::new(-5.0, -5.0, -5.0),
            Point3::new(0.1, 0.2, 0.1),
            Point3::new(0.9, 0.9, 0.9),
        ];
        let grid = SpatialHashGrid::build(&points, 1.0);
        let same_cell: Vec<usize> = grid.query(Point3::new(0.5, 0.5, 0.5), 0.4).map(|(i, _)| i).collect();
        assert_eq!(same_cell, vec![0, 2, 3]);
    }

    #[test]
    #[should_panic(expected = "cell size must be positive")]
    fn build_panics_on_non_positive_cell_size() {
        SpatialHashGrid::build(&[Point3::origin()], 0.0);
    }
}
