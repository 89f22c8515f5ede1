use std::collections::HashSet;

use tracing::debug;

use super::footprint::Footprint;
use super::skeleton::SkeletonArc;
use crate::error::{OperationError, Result, SkeletonError};
use crate::math::{Point2, Point3, COLUMN_EPSILON, WELD_DISTANCE};
use crate::operations::modification::RemoveDoubles;
use crate::topology::{EdgeId, TopologyStore, VertexId};

/// Interior skeleton geometry living in the mesh store.
#[derive(Debug, Clone, Default)]
pub struct SkeletonGraph {
    /// Skeleton vertices that are not footprint corners.
    pub vertices: Vec<VertexId>,
    /// Skeleton (ridge and hip) edges.
    pub edges: Vec<EdgeId>,
}

/// Turns 2-D skeleton arcs into 3-D vertices and ridge edges.
///
/// Heights are scaled so that the tallest arc ends up `height` above the
/// footprint median. A skeleton point that already has a vertex in its
/// column (same `x`, `y`) reuses the tallest such vertex, which is how arcs
/// attach to the footprint corners.
pub struct LiftSkeleton<'a> {
    footprint: &'a Footprint,
    arcs: &'a [SkeletonArc],
    height: f64,
}

impl<'a> LiftSkeleton<'a> {
    /// Creates a new `LiftSkeleton` operation.
    #[must_use]
    pub fn new(footprint: &'a Footprint, arcs: &'a [SkeletonArc], height: f64) -> Self {
        Self {
            footprint,
            arcs,
            height,
        }
    }

    /// Executes the lift.
    ///
    /// # Errors
    ///
    /// Returns [`SkeletonError::Degenerate`] if no arc has a positive finite
    /// height, and [`OperationError::InvalidInput`] for a non-positive target
    /// height.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SkeletonGraph> {
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(OperationError::InvalidInput(format!(
                "roof height {} must be positive",
                self.height
            ))
            .into());
        }
        let tallest = self
            .arcs
            .iter()
            .map(|arc| arc.height)
            .fold(f64::NEG_INFINITY, f64::max);
        if !(tallest.is_finite() && tallest > 0.0) {
            return Err(SkeletonError::Degenerate(format!(
                "tallest skeleton arc has height {tallest}"
            ))
            .into());
        }
        let scale = self.height / tallest;
        let base = self.footprint.median.z;

        let mut columns = Columns {
            candidates: self.footprint.ring.clone(),
            created: Vec::new(),
        };
        let mut pairs = Vec::new();
        for arc in self.arcs {
            let source = columns.resolve(store, arc.source, base + arc.height * scale)?;
            for sink in &arc.sinks {
                let z = base + self.sink_height(sink) * scale;
                let target = columns.resolve(store, *sink, z)?;
                if target != source {
                    store.add_edge(source, target)?;
                    pairs.push((source, target));
                }
            }
        }

        let mut order = self.footprint.ring.clone();
        order.extend(columns.created.iter().copied());
        let welds = RemoveDoubles::new(order, WELD_DISTANCE).execute(store)?;

        let mut edges = Vec::new();
        for (a, b) in pairs {
            let (a, b) = (welds.resolve(a), welds.resolve(b));
            if a == b {
                continue;
            }
            if let Some(edge) = store.find_edge(a, b) {
                if !edges.contains(&edge) {
                    edges.push(edge);
                }
            }
        }

        let boundary: HashSet<VertexId> = self.footprint.ring.iter().copied().collect();
        let mut vertices = Vec::new();
        for v in columns.created {
            let v = welds.resolve(v);
            if boundary.contains(&v) || vertices.contains(&v) || !store.contains_vertex(v) {
                continue;
            }
            let mut attached = false;
            for &edge in &edges {
                if store.edge(edge)?.contains(v) {
                    attached = true;
                    break;
                }
            }
            if attached {
                vertices.push(v);
            } else {
                store.remove_vertex(v)?;
            }
        }

        debug!(
            vertices = vertices.len(),
            edges = edges.len(),
            welded = welds.len(),
            "lifted skeleton"
        );
        Ok(SkeletonGraph { vertices, edges })
    }

    /// Lowest height of any arc that sinks into `point`.
    fn sink_height(&self, point: &Point2) -> f64 {
        self.arcs
            .iter()
            .filter(|arc| arc.sinks.iter().any(|s| same_column(s, point)))
            .map(|arc| arc.height)
            .fold(f64::INFINITY, f64::min)
    }
}

fn same_column(a: &Point2, b: &Point2) -> bool {
    (a.x - b.x).abs() < COLUMN_EPSILON && (a.y - b.y).abs() < COLUMN_EPSILON
}

/// Vertices that skeleton points may attach to.
struct Columns {
    candidates: Vec<VertexId>,
    created: Vec<VertexId>,
}

impl Columns {
    /// Tallest known vertex above `point`, or a new one at height `z`.
    fn resolve(&mut self, store: &mut TopologyStore, point: Point2, z: f64) -> Result<VertexId> {
        let mut best: Option<(VertexId, f64)> = None;
        for &v in &self.candidates {
            let Ok(data) = store.vertex(v) else {
                continue;
            };
            let p = data.point;
            if same_column(&Point2::new(p.x, p.y), &point)
                && best.is_none_or(|(_, top)| p.z > top)
            {
                best = Some((v, p.z));
            }
        }
        if let Some((v, _)) = best {
            return Ok(v);
        }
        let v = store.add_vertex(Point3::new(point.x, point.y, z));
        self.candidates.push(v);
        self.created.push(v);
        Ok(v)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::error::RooflineError;
    use crate::operations::creation::MakeFace;
    use crate::roof::footprint::PrepareFootprint;

    fn footprint(store: &mut TopologyStore, pts: &[(f64, f64)]) -> Footprint {
        let face = MakeFace::new(pts.iter().map(|&(x, y)| Point3::new(x, y, 0.5)).collect())
            .execute(store)
            .unwrap();
        PrepareFootprint::new(face).execute(store).unwrap()
    }

    fn arc(source: (f64, f64), sinks: &[(f64, f64)], height: f64) -> SkeletonArc {
        SkeletonArc {
            source: Point2::new(source.0, source.1),
            sinks: sinks.iter().map(|&(x, y)| Point2::new(x, y)).collect(),
            height,
        }
    }

    #[test]
    fn square_apex_is_lifted_to_full_height() {
        let mut store = TopologyStore::new();
        let fp = footprint(&mut store, &[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
        let arcs = [arc((1.0, 1.0), &[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)], 1.0)];
        let graph = LiftSkeleton::new(&fp, &arcs, 2.0).execute(&mut store).unwrap();

        assert_eq!(graph.vertices.len(), 1);
        assert_eq!(graph.edges.len(), 4);
        let apex = store.point(graph.vertices[0]).unwrap();
        assert_relative_eq!(apex.z, 2.5);
        for &e in &graph.edges {
            let edge = store.edge(e).unwrap();
            assert!(edge.contains(graph.vertices[0]));
            assert!(fp.ring.contains(&edge.other(graph.vertices[0])));
        }
    }

    #[test]
    fn sink_takes_lowest_height_and_scale_uses_tallest_arc() {
        let mut store = TopologyStore::new();
        let fp = footprint(&mut store, &[(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (0.0, 2.0)]);
        let arcs = [
            arc((3.0, 1.0), &[(4.0, 0.0), (4.0, 2.0)], 1.0),
            arc((1.0, 1.0), &[(0.0, 0.0), (3.0, 1.0), (0.0, 2.0)], 1.0),
        ];
        let graph = LiftSkeleton::new(&fp, &arcs, 3.0).execute(&mut store).unwrap();
        assert_eq!(graph.vertices.len(), 2);
        assert_eq!(graph.edges.len(), 5);
        for &v in &graph.vertices {
            assert_relative_eq!(store.point(v).unwrap().z, 3.5);
        }
        // The ridge joins the two nodes.
        assert!(store.find_edge(graph.vertices[0], graph.vertices[1]).is_some());
    }

    #[test]
    fn near_duplicate_nodes_are_welded() {
        let mut store = TopologyStore::new();
        let fp = footprint(&mut store, &[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
        let arcs = [
            arc((1.0, 1.0), &[(0.0, 0.0), (2.0, 0.0)], 1.0),
            arc((1.00002, 1.0), &[(2.0, 2.0), (0.0, 2.0)], 1.0),
        ];
        let graph = LiftSkeleton::new(&fp, &arcs, 1.0).execute(&mut store).unwrap();
        assert_eq!(graph.vertices.len(), 1);
        assert_eq!(graph.edges.len(), 4);
    }

    #[test]
    fn zero_height_skeleton_is_degenerate() {
        let mut store = TopologyStore::new();
        let fp = footprint(&mut store, &[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
        let arcs = [arc((1.0, 1.0), &[(0.0, 0.0), (2.0, 0.0)], 0.0)];
        let err = LiftSkeleton::new(&fp, &arcs, 1.0).execute(&mut store).unwrap_err();
        assert!(matches!(err, RooflineError::Skeleton(SkeletonError::Degenerate(_))));
        assert_eq!(store.vertex_count(), 4);
    }
}
