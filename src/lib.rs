//! Straight-skeleton roof generation for building footprints.
//!
//! A footprint is a face in a [`topology::TopologyStore`]. [`roof::RoofBuilder`]
//! replaces it with a hip, gable or flat roof whose faces are tagged by role,
//! and [`tessellation::TessellateRoof`] turns the result into triangle meshes.

pub mod error;
pub mod math;
pub mod operations;
pub mod roof;
pub mod tessellation;
pub mod topology;

pub use error::{Result, RooflineError};
