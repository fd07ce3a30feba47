//! Lloyd's Relaxation for uniform site distribution
//!
//! Lloyd's Relaxation iteratively improves the uniformity of the sites by
//! moving each one to the centroid of its Voronoi cell and rebuilding the
//! diagram from the moved sites.

use std::time::Instant;

use super::voronoi::DiagramSource;
use crate::error::Result;
use crate::geometry::{self, Point, Rect};

/// Options for Lloyd's relaxation algorithm
#[derive(Debug, Clone, Copy)]
pub struct LloydOptions {
    /// Maximum number of iterations to run
    pub max_iterations: usize,
    /// Convergence threshold as a fraction of the bounds' diagonal: stop when
    /// the largest site displacement falls below it. 0.0 runs every iteration.
    pub convergence_threshold: f64,
}

impl Default for LloydOptions {
    fn default() -> Self {
        Self {
            max_iterations: 2,
            convergence_threshold: 0.0,
        }
    }
}

/// Apply exactly `iterations` passes of Lloyd's relaxation
///
/// Each site moves to the arithmetic mean of its cell's polygon vertices. A
/// site whose cell has no vertices stays where it is. Zero iterations return
/// the sites unchanged.
///
/// # Errors
///
/// Propagates [`crate::MapError::DiagramFailed`] from the diagram source.
pub fn lloyd_relaxation(
    sites: Vec<Point>,
    bounds: Rect,
    iterations: usize,
    source: &dyn DiagramSource,
) -> Result<Vec<Point>> {
    let options = LloydOptions {
        max_iterations: iterations,
        ..Default::default()
    };
    lloyd_relaxation_with_options(sites, bounds, options, source)
}

/// Apply Lloyd's relaxation with custom options
pub fn lloyd_relaxation_with_options(
    mut sites: Vec<Point>,
    bounds: Rect,
    options: LloydOptions,
    source: &dyn DiagramSource,
) -> Result<Vec<Point>> {
    if options.max_iterations == 0 {
        return Ok(sites);
    }

    let convergence_threshold = options.convergence_threshold * bounds.max().distance(bounds.min());
    let total_start = Instant::now();

    log::debug!(
        "[Lloyd] Starting: {} sites, max {} iterations, threshold {:.4} (abs: {:.4})",
        sites.len(),
        options.max_iterations,
        options.convergence_threshold,
        convergence_threshold
    );

    let mut iterations_run = 0;
    let mut converged = false;

    for iteration in 0..options.max_iterations {
        let iter_start = Instant::now();
        let diagram = source.build(&sites, bounds)?;

        let mut max_displacement: f64 = 0.0;
        let relaxed: Vec<Point> = diagram
            .sites
            .iter()
            .zip(&diagram.cells)
            .map(|(&site, cell)| {
                let centroid = geometry::mean(cell.iter().copied()).unwrap_or(site);
                max_displacement = max_displacement.max(site.distance(centroid));
                centroid
            })
            .collect();

        sites = relaxed;
        iterations_run = iteration + 1;

        log::trace!(
            "[Lloyd] Iter {}: total={:?}, max_disp={:.4}",
            iteration + 1,
            iter_start.elapsed(),
            max_displacement
        );

        if convergence_threshold > 0.0 && max_displacement < convergence_threshold {
            converged = true;
            break;
        }
    }

    log::debug!(
        "[Lloyd] Finished: {} iterations (of max {}), converged={}, total={:?}",
        iterations_run,
        options.max_iterations,
        converged,
        total_start.elapsed()
    );

    Ok(sites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::sites::{SiteGenerator, UniformSites};
    use crate::generation::voronoi::{RawDiagram, VoronoiceDiagram};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn random_sites(count: usize, seed: u64) -> Vec<Point> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        UniformSites::default().generate(count, Rect::from_size(100.0, 100.0), &mut rng)
    }

    /// A source whose cells are all empty
    struct EmptyCells;

    impl DiagramSource for EmptyCells {
        fn build(&self, sites: &[Point], _bounds: Rect) -> Result<RawDiagram> {
            Ok(RawDiagram {
                sites: sites.to_vec(),
                cells: vec![Vec::new(); sites.len()],
                edges: Vec::new(),
            })
        }
    }

    #[test]
    fn test_zero_iterations_is_identity() {
        let sites = random_sites(30, 1);
        let bounds = Rect::from_size(100.0, 100.0);
        let relaxed =
            lloyd_relaxation(sites.clone(), bounds, 0, &VoronoiceDiagram::default()).unwrap();
        assert_eq!(sites, relaxed);
    }

    #[test]
    fn test_relaxation_stays_in_bounds() {
        let bounds = Rect::from_size(100.0, 100.0);
        let relaxed =
            lloyd_relaxation(random_sites(100, 42), bounds, 3, &VoronoiceDiagram::default())
                .unwrap();

        assert_eq!(relaxed.len(), 100);
        for p in &relaxed {
            assert!(bounds.contains(*p));
        }
    }

    #[test]
    fn test_relaxation_determinism() {
        let bounds = Rect::from_size(100.0, 100.0);
        let source = VoronoiceDiagram::default();
        let a = lloyd_relaxation(random_sites(50, 12345), bounds, 2, &source).unwrap();
        let b = lloyd_relaxation(random_sites(50, 12345), bounds, 2, &source).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_cells_leave_sites_unmoved() {
        let sites = random_sites(10, 3);
        let bounds = Rect::from_size(100.0, 100.0);
        let relaxed = lloyd_relaxation(sites.clone(), bounds, 4, &EmptyCells).unwrap();
        assert_eq!(sites, relaxed);
    }

    #[test]
    fn test_convergence_stops_early() {
        let options = LloydOptions {
            max_iterations: 20,
            convergence_threshold: 1.0,
        };
        // Every displacement is below the whole diagonal, so one pass suffices
        let bounds = Rect::from_size(100.0, 100.0);
        let source = VoronoiceDiagram::default();
        let once = lloyd_relaxation(random_sites(40, 5), bounds, 1, &source).unwrap();
        let early =
            lloyd_relaxation_with_options(random_sites(40, 5), bounds, options, &source).unwrap();
        assert_eq!(once, early);
    }

    #[test]
    fn test_lloyd_options_default() {
        let options = LloydOptions::default();
        assert_eq!(options.max_iterations, 2);
        assert_eq!(options.convergence_threshold, 0.0);
    }
}
