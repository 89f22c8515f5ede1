mod mesh_report;

pub use mesh_report::{MeshReport, MeshSummary};
