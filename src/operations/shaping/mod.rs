mod extrude_region;
mod inset_region;

pub use extrude_region::{ExtrudeRegion, Extrusion};
pub use inset_region::{Inset, InsetRegion};
