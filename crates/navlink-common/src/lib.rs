//! Common types shared by the navigation link generator and its front ends

pub mod debug;
mod math;
mod mesh;

pub use math::*;
pub use mesh::*;

/// Represents a 3D position (Y-up)
pub type Vec3 = glam::Vec3;

/// Error types for the library
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid triangulation: {0}")]
    InvalidTriangulation(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("visibility query failed: {0}")]
    Oracle(String),

    #[error("link placement failed: {0}")]
    Placement(String),

    #[cfg(feature = "std")]
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for link generation operations
pub type Result<T> = std::result::Result<T, Error>;
