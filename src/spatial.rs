//! Spatial indexing for position-to-region lookups
//!
//! This module is only available with the `spatial-index` feature.

use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

use crate::geometry::Point;

/// KD-tree over region sites
///
/// The nearest site to a position is the site of the Voronoi region that
/// contains it, so a nearest-neighbor query answers "which region is here".
#[derive(Clone)]
pub struct SpatialIndex {
    tree: Option<ImmutableKdTree<f64, usize, 2, 32>>,
    len: usize,
}

impl SpatialIndex {
    /// Build the index from region sites, in region order
    ///
    /// ```
    /// use voronoi_mapgen::{DVec2, SpatialIndex};
    ///
    /// let sites = vec![DVec2::new(10.0, 10.0), DVec2::new(90.0, 10.0), DVec2::new(50.0, 90.0)];
    /// let index = SpatialIndex::new(&sites);
    /// assert_eq!(index.find_nearest(DVec2::new(80.0, 20.0)), Some(1));
    /// ```
    pub fn new(sites: &[Point]) -> Self {
        let points: Vec<[f64; 2]> = sites.iter().map(|p| [p.x, p.y]).collect();
        Self {
            tree: (!points.is_empty()).then(|| ImmutableKdTree::new_from_slice(&points)),
            len: points.len(),
        }
    }

    /// Index of the site nearest to `position`, `None` for an empty index
    pub fn find_nearest(&self, position: Point) -> Option<usize> {
        let tree = self.tree.as_ref()?;
        let result = tree.nearest_one::<SquaredEuclidean>(&[position.x, position.y]);
        Some(result.item as usize)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
