use std::collections::HashSet;

use tracing::debug;

use super::footprint::Footprint;
use super::lift::SkeletonGraph;
use crate::error::Result;
use crate::math::intersect_2d::point_on_segment_2d;
use crate::math::{xy, SPLIT_WELD_DISTANCE, WELD_DISTANCE};
use crate::operations::modification::{Delete, RemoveDoubles, SplitEdge};
use crate::topology::{TopologyStore, VertexId};

/// Joins skeleton vertices that lie on other skeleton edges.
///
/// Each such edge is split where the vertex sits (in plan view), then all
/// nearby vertices are welded with the looser post-split distance. The
/// skeleton edge set is rebuilt from the surviving interior vertices.
pub struct WeldSkeleton<'a> {
    footprint: &'a Footprint,
    graph: &'a SkeletonGraph,
}

impl<'a> WeldSkeleton<'a> {
    /// Creates a new `WeldSkeleton` operation.
    #[must_use]
    pub fn new(footprint: &'a Footprint, graph: &'a SkeletonGraph) -> Self {
        Self { footprint, graph }
    }

    /// Executes the weld, returning the final skeleton.
    ///
    /// # Errors
    ///
    /// Returns an error if a skeleton vertex or edge is missing.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SkeletonGraph> {
        let mut edges = self.graph.edges.clone();
        let mut split_vertices = Vec::new();

        for &v in &self.graph.vertices {
            if !store.contains_vertex(v) {
                continue;
            }
            let p = xy(&store.point(v)?);
            let mut i = 0;
            while i < edges.len() {
                let edge = store.edge(edges[i])?;
                if edge.contains(v) {
                    i += 1;
                    continue;
                }
                let (a, b) = (edge.start, edge.end);
                let on_edge = point_on_segment_2d(
                    &p,
                    &xy(&store.point(a)?),
                    &xy(&store.point(b)?),
                    WELD_DISTANCE,
                );
                if let Some(t) = on_edge {
                    let split = SplitEdge::new(edges[i], a, t).execute(store)?;
                    edges[i] = split.near;
                    edges.push(split.far);
                    split_vertices.push(split.vertex);
                }
                i += 1;
            }
        }

        let mut order = self.footprint.ring.clone();
        order.extend(self.graph.vertices.iter().copied());
        order.extend(split_vertices.iter().copied());
        let welds = RemoveDoubles::new(order, SPLIT_WELD_DISTANCE).execute(store)?;

        let boundary: HashSet<VertexId> = self.footprint.ring.iter().copied().collect();
        let mut vertices = Vec::new();
        for &v in self.graph.vertices.iter().chain(&split_vertices) {
            let v = welds.resolve(v);
            if !boundary.contains(&v) && store.contains_vertex(v) && !vertices.contains(&v) {
                vertices.push(v);
            }
        }

        let mut final_edges = Vec::new();
        let mut dangling = Vec::new();
        for &v in &vertices {
            let linked = store.linked_edges(v);
            if linked.is_empty() {
                dangling.push(v);
            }
            for e in linked {
                if !final_edges.contains(&e) {
                    final_edges.push(e);
                }
            }
        }
        if !dangling.is_empty() {
            Delete::edges_and_verts(Vec::new(), dangling.clone()).execute(store)?;
            vertices.retain(|v| !dangling.contains(v));
        }

        debug!(
            splits = split_vertices.len(),
            welded = welds.len(),
            edges = final_edges.len(),
            "welded skeleton"
        );
        Ok(SkeletonGraph {
            vertices,
            edges: final_edges,
        })
    }
}
