//! Error types for voronoi map generation

use thiserror::Error;

/// Errors that can occur during map generation or queries
///
/// Degenerate geometry and rivers that fail to reach the sea are not errors;
/// they degrade to zero-area regions and missing rivers instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    /// Configuration validation failed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The raw Voronoi/Delaunay primitive could not build a diagram
    #[error("diagram construction failed: {0}")]
    DiagramFailed(String),

    /// Requested region ID does not exist
    #[error("region not found: {0}")]
    RegionNotFound(usize),

    /// Generation was aborted through a [`crate::CancelToken`]
    #[error("generation cancelled")]
    Cancelled,
}

/// Result type alias for map generation
pub type Result<T> = std::result::Result<T, MapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MapError::InvalidConfig("site_count must be set".into());
        assert_eq!(err.to_string(), "invalid configuration: site_count must be set");
        assert_eq!(MapError::RegionNotFound(7).to_string(), "region not found: 7");
        assert_eq!(MapError::Cancelled.to_string(), "generation cancelled");
    }
}
