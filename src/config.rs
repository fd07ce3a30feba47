//! Map Configuration and Builder
//!
//! This module provides configuration types for deterministic map generation.
//! Every structural parameter must be given explicitly; only the tunables with
//! a documented public default (river density, noisy edge options) may be left out.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};
use crate::geometry::{Point, Rect};

/// Fraction of vertices sampled as candidate river sources
pub const DEFAULT_RIVER_DENSITY: f64 = 1.0 / 14.0;

/// Upper bound on Lloyd relaxation iterations
pub const MAX_LLOYD_ITERATIONS: usize = 20;

/// Upper bound on noisy edge subdivision depth (at most 2^depth + 1 points per half)
pub const MAX_SUBDIVISION_DEPTH: u32 = 16;

/// Configuration for deterministic map generation
///
/// The same configuration (with the same hooks) always produces the identical
/// graph, down to every scalar field and noisy edge point.
///
/// # Example
///
/// ```rust
/// use voronoi_mapgen::*;
///
/// let config = MapConfigBuilder::new()
///     .seed(42)
///     .bounds(Rect::from_size(1000.0, 1000.0))
///     .site_count(2000)
///     .lloyd_iterations(2).unwrap()
///     .point_precision(100.0).unwrap()
///     .resolution_scale(1.0).unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(config.site_count, 2000);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapConfig {
    /// Top-level random seed; every other random draw derives from it
    pub seed: u64,

    /// Map extent; Voronoi cells are clipped to it
    pub bounds: Rect,

    /// Number of sample points handed to the site generator
    pub site_count: usize,

    /// Number of Lloyd relaxation passes over the sites (0 = none)
    pub lloyd_iterations: usize,

    /// Quantization granularity used to merge near-duplicate Voronoi vertices
    ///
    /// Vertices whose `round(coord / resolution_scale * point_precision)` keys
    /// match collapse into one. Higher values keep more distinct vertices.
    pub point_precision: f64,

    /// Resolution multiplier of the map
    ///
    /// Scales the dedup quantization, the border tolerance and the noisy edge
    /// segment thresholds so that behavior does not depend on map resolution.
    pub resolution_scale: f64,

    /// Fraction of vertices sampled as candidate river sources
    pub river_density: f64,
}

impl MapConfig {
    /// Quantize a single coordinate into its dedup key component
    #[inline]
    pub fn quantize(&self, coord: f64) -> i64 {
        (coord / self.resolution_scale * self.point_precision).round() as i64
    }

    /// Dedup key for a vertex location
    #[inline]
    pub fn vertex_key(&self, p: Point) -> (i64, i64) {
        (self.quantize(p.x), self.quantize(p.y))
    }

    /// Distance from a bounding side within which a vertex counts as map border
    ///
    /// Half of one quantization step.
    #[inline]
    pub fn border_tolerance(&self) -> f64 {
        0.5 * self.resolution_scale / self.point_precision
    }

    /// Number of river source candidates for a graph with `vertex_count` vertices
    #[inline]
    pub fn river_candidates(&self, vertex_count: usize) -> usize {
        (vertex_count as f64 * self.river_density).round() as usize
    }
}

/// Builder for creating MapConfig with validation
///
/// # Example
///
/// ```rust
/// use voronoi_mapgen::*;
///
/// let missing = MapConfigBuilder::new().seed(1).build();
/// assert!(missing.is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapConfigBuilder {
    seed: Option<u64>,
    bounds: Option<Rect>,
    site_count: Option<usize>,
    lloyd_iterations: Option<usize>,
    point_precision: Option<f64>,
    resolution_scale: Option<f64>,
    river_density: Option<f64>,
}

impl MapConfigBuilder {
    /// Create a new builder with nothing set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the top-level random seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the map bounds
    pub fn bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Set the number of sites
    pub fn site_count(mut self, count: usize) -> Self {
        self.site_count = Some(count);
        self
    }

    /// Set the number of Lloyd relaxation iterations
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if iterations > 20 (excessive and impractical)
    pub fn lloyd_iterations(mut self, iterations: usize) -> Result<Self> {
        if iterations > MAX_LLOYD_ITERATIONS {
            return Err(MapError::InvalidConfig(format!(
                "Lloyd iterations must be <= {} (got {})",
                MAX_LLOYD_ITERATIONS, iterations
            )));
        }
        self.lloyd_iterations = Some(iterations);
        Ok(self)
    }

    /// Set the vertex dedup precision
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if precision is not a positive finite number
    pub fn point_precision(mut self, precision: f64) -> Result<Self> {
        self.point_precision = Some(positive(precision, "point precision")?);
        Ok(self)
    }

    /// Set the resolution multiplier
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if scale is not a positive finite number
    pub fn resolution_scale(mut self, scale: f64) -> Result<Self> {
        self.resolution_scale = Some(positive(scale, "resolution scale")?);
        Ok(self)
    }

    /// Override the river density (defaults to [`DEFAULT_RIVER_DENSITY`])
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if density is outside [0, 1]
    pub fn river_density(mut self, density: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&density) {
            return Err(MapError::InvalidConfig(format!(
                "river density must be within [0, 1] (got {})",
                density
            )));
        }
        self.river_density = Some(density);
        Ok(self)
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first required field left unset,
    /// or if the bounds are empty.
    pub fn build(self) -> Result<MapConfig> {
        let seed = required(self.seed, "seed")?;
        let bounds = required(self.bounds, "bounds")?;
        let site_count = required(self.site_count, "site_count")?;
        let lloyd_iterations = required(self.lloyd_iterations, "lloyd_iterations")?;
        let point_precision = required(self.point_precision, "point_precision")?;
        let resolution_scale = required(self.resolution_scale, "resolution_scale")?;

        if !(bounds.width > 0.0 && bounds.height > 0.0) {
            return Err(MapError::InvalidConfig(format!(
                "bounds must have positive size (got {}x{})",
                bounds.width, bounds.height
            )));
        }

        Ok(MapConfig {
            seed,
            bounds,
            site_count,
            lloyd_iterations,
            point_precision,
            resolution_scale,
            river_density: self.river_density.unwrap_or(DEFAULT_RIVER_DENSITY),
        })
    }
}

fn required<T>(value: Option<T>, name: &str) -> Result<T> {
    value.ok_or_else(|| MapError::InvalidConfig(format!("{} must be set", name)))
}

pub(crate) fn positive(value: f64, name: &str) -> Result<f64> {
    if !(value.is_finite() && value > 0.0) {
        return Err(MapError::InvalidConfig(format!(
            "{} must be positive (got {})",
            name, value
        )));
    }
    Ok(value)
}

/// Tunables for the noisy edge synthesizer
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoisyEdgeOptions {
    /// How far toward each region's site the control quadrilateral reaches (0..1)
    pub tradeoff: f64,
    /// Default minimum segment length before resolution scaling
    pub base_min_length: f64,
    /// Hard cap on subdivision depth
    pub max_depth: u32,
}

impl NoisyEdgeOptions {
    /// Create validated options
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `tradeoff` is outside [0, 1], if
    /// `base_min_length` is not a positive finite number, or if `max_depth`
    /// exceeds [`MAX_SUBDIVISION_DEPTH`].
    pub fn new(tradeoff: f64, base_min_length: f64, max_depth: u32) -> Result<Self> {
        let options = Self {
            tradeoff,
            base_min_length,
            max_depth,
        };
        options.validate()?;
        Ok(options)
    }

    /// Check options built by hand or deserialized
    ///
    /// # Errors
    ///
    /// Same conditions as [`NoisyEdgeOptions::new`].
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.tradeoff) {
            return Err(MapError::InvalidConfig(format!(
                "noisy edge tradeoff must be within [0, 1] (got {})",
                self.tradeoff
            )));
        }
        positive(self.base_min_length, "noisy edge base length")?;
        if self.max_depth > MAX_SUBDIVISION_DEPTH {
            return Err(MapError::InvalidConfig(format!(
                "noisy edge depth must be <= {} (got {})",
                MAX_SUBDIVISION_DEPTH, self.max_depth
            )));
        }
        Ok(())
    }
}

impl Default for NoisyEdgeOptions {
    fn default() -> Self {
        Self {
            tradeoff: 0.5,
            base_min_length: 10.0,
            max_depth: 12,
        }
    }
}
