//! Sample point generation

use rand::{Rng, RngCore};

use crate::geometry::{Point, Rect};

/// Produces the initial sample sites for a map
pub trait SiteGenerator: Send + Sync {
    fn generate(&self, count: usize, bounds: Rect, rng: &mut dyn RngCore) -> Vec<Point>;
}

/// Sites drawn uniformly at random inside the bounds
///
/// An `inset` keeps sites off the bounding sides, where the diagram primitive
/// may drop them.
#[derive(Debug, Clone, Copy)]
pub struct UniformSites {
    /// Margin kept free on every side, as a fraction of the bounds' size
    pub inset: f64,
}

impl Default for UniformSites {
    fn default() -> Self {
        Self { inset: 0.001 }
    }
}

impl SiteGenerator for UniformSites {
    fn generate(&self, count: usize, bounds: Rect, rng: &mut dyn RngCore) -> Vec<Point> {
        let margin_x = bounds.width * self.inset;
        let margin_y = bounds.height * self.inset;
        let (lo, hi) = (bounds.min(), bounds.max());

        (0..count)
            .map(|_| {
                Point::new(
                    rng.gen_range(lo.x + margin_x..hi.x - margin_x),
                    rng.gen_range(lo.y + margin_y..hi.y - margin_y),
                )
            })
            .collect()
    }
}
