//! Exact nearest-point search over 2D point sets.
//!
//! [`PointIndex`] wraps an R-tree but keeps the answers of a brute-force
//! scan: when several points are equidistant from the query, the one with
//! the lowest insertion index wins. Squared distances are compared exactly,
//! so integer pixel coordinates never suffer rounding ties.

mod brute;

use rstar::{PointDistance, RTree, RTreeObject, AABB};

pub use brute::brute_force_nearest;

/// Below this many points a linear scan beats building a tree.
const BRUTE_FORCE_LIMIT: usize = 16;

/// Trait for objects that can be located in a 2D Cartesian coordinate system.
pub trait Locatable2d {
    /// Returns the x-coordinate of the object.
    fn x(&self) -> f64;

    /// Returns the y-coordinate of the object.
    fn y(&self) -> f64;
}

impl Locatable2d for [f64; 2] {
    fn x(&self) -> f64 {
        self[0]
    }

    fn y(&self) -> f64 {
        self[1]
    }
}

/// Result of a nearest-point query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestHit {
    /// Insertion index of the nearest point
    pub index: usize,
    /// Squared Euclidean distance to it
    pub distance_squared: f64,
}

impl NearestHit {
    pub fn distance(&self) -> f64 {
        self.distance_squared.sqrt()
    }
}

#[derive(Debug, Clone)]
struct IndexedPoint {
    position: [f64; 2],
    index: usize,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        dx * dx + dy * dy
    }
}

#[derive(Debug, Clone)]
enum Backend {
    Linear(Vec<[f64; 2]>),
    Tree(RTree<IndexedPoint>),
}

/// Spatial index answering nearest-point queries with brute-force semantics.
#[derive(Debug, Clone)]
pub struct PointIndex {
    backend: Backend,
    len: usize,
}

impl PointIndex {
    /// Build an index over `points`; index `i` refers to `points[i]`.
    pub fn new(points: &[[f64; 2]]) -> Self {
        let len = points.len();
        let backend = if len <= BRUTE_FORCE_LIMIT {
            Backend::Linear(points.to_vec())
        } else {
            let entries = points
                .iter()
                .enumerate()
                .map(|(index, &position)| IndexedPoint { position, index })
                .collect();
            Backend::Tree(RTree::bulk_load(entries))
        };
        Self { backend, len }
    }

    /// Build an index over any slice of locatable objects.
    pub fn from_locatable<T: Locatable2d>(objects: &[T]) -> Self {
        let points: Vec<[f64; 2]> = objects.iter().map(|o| [o.x(), o.y()]).collect();
        Self::new(&points)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Nearest point to `query`, ties resolved toward the lowest index.
    ///
    /// Returns `None` only for an empty index.
    pub fn nearest(&self, query: [f64; 2]) -> Option<NearestHit> {
        match &self.backend {
            Backend::Linear(points) => brute_force_nearest(points, query),
            Backend::Tree(tree) => {
                let mut candidates = tree.nearest_neighbor_iter_with_distance_2(&query);
                let (first, best) = candidates.next()?;
                let mut index = first.index;
                for (entry, distance_squared) in candidates {
                    if distance_squared > best {
                        break;
                    }
                    index = index.min(entry.index);
                }
                Some(NearestHit {
                    index,
                    distance_squared: best,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests;
