mod delete;
mod dissolve;
mod recalc_normals;
mod remove_doubles;
mod split_edge;

pub use delete::{Delete, DeleteContext};
pub use dissolve::{DissolveEdges, DissolveFaces, DissolveVerts};
pub use recalc_normals::RecalcNormals;
pub use remove_doubles::{RemoveDoubles, WeldMap};
pub use split_edge::{EdgeSplit, SplitEdge};
