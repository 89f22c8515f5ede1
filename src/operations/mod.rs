//! Mesh-kernel primitives used by the roof pipeline.
//!
//! Every operation is a small struct built with `new(..)` and run against a
//! [`TopologyStore`](crate::topology::TopologyStore) with `execute`.

pub mod creation;
pub mod modification;
pub mod query;
pub mod shaping;
pub mod transform;
