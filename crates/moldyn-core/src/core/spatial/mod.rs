//! # Spatial Indexing
//!
//! A uniform hash grid over a 3D point set for radius-bounded neighbor queries.
//!
//! The grid is a transient index: it is built in O(N) from a point slice, queried,
//! and dropped. There is no incremental update; callers rebuild it when the point
//! set changes. Queries over-approximate (every point in the overlapped cells is
//! yielded), so callers re-check the exact distance or use
//! [`SpatialHashGrid::within`].

mod grid;

pub use grid::SpatialHashGrid;
