use std::collections::HashSet;

use tracing::{debug, warn};

use super::footprint::Footprint;
use super::lift::SkeletonGraph;
use crate::error::{Result, TopologyError};
use crate::operations::creation::ContextualCreate;
use crate::topology::{EdgeId, FaceId, FaceTag, TopologyStore, VertexId};

/// Roof faces closed over the footprint edges.
#[derive(Debug, Clone, Default)]
pub struct Reconstruction {
    /// One face per footprint edge that could be closed.
    pub faces: Vec<FaceId>,
    /// Footprint edges whose face had to be guessed or could not be built.
    pub incomplete: Vec<(VertexId, VertexId)>,
}

/// Builds the roof face standing on each footprint edge.
///
/// The face is bounded by the footprint edge and the skeleton edges leaving
/// its two ends. When those skeleton edges do not meet in a single vertex
/// or a single ridge edge, the two sides are followed upward, always taking
/// the pair of next edges whose midpoints are closest, until they close.
pub struct ReconstructFaces<'a> {
    footprint: &'a Footprint,
    skeleton: &'a SkeletonGraph,
}

/// Outcome of closing one footprint edge.
enum Closure {
    Complete(Vec<EdgeId>),
    Partial(Vec<EdgeId>),
}

impl<'a> ReconstructFaces<'a> {
    /// Creates a new `ReconstructFaces` operation.
    #[must_use]
    pub fn new(footprint: &'a Footprint, skeleton: &'a SkeletonGraph) -> Self {
        Self {
            footprint,
            skeleton,
        }
    }

    /// Executes the reconstruction.
    ///
    /// Faces are tagged [`FaceTag::Roof`] and wound so that each runs along
    /// its footprint edge in ring order.
    ///
    /// # Errors
    ///
    /// Returns an error if a footprint edge or skeleton edge is missing.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<Reconstruction> {
        let skeleton: HashSet<EdgeId> = self.skeleton.edges.iter().copied().collect();
        let mut result = Reconstruction::default();

        for &(v1, v2) in &self.footprint.boundary {
            let boundary = store
                .find_edge(v1, v2)
                .ok_or_else(|| TopologyError::EntityNotFound("footprint edge".into()))?;

            let (mut edges, complete) = match close(store, v1, v2, &skeleton)? {
                Closure::Complete(edges) => (edges, true),
                Closure::Partial(edges) => (edges, false),
            };
            edges.push(boundary);

            let face = ContextualCreate::new(edges)
                .oriented(v1, v2)
                .with_tag(FaceTag::Roof)
                .execute(store)?;
            match face {
                Some(face) if complete => result.faces.push(face),
                Some(face) => {
                    warn!("roof face over footprint edge closed on a best-effort chain");
                    result.faces.push(face);
                    result.incomplete.push((v1, v2));
                }
                None => {
                    warn!("no roof face could be closed over footprint edge");
                    result.incomplete.push((v1, v2));
                }
            }
        }

        debug!(
            faces = result.faces.len(),
            incomplete = result.incomplete.len(),
            "reconstructed roof faces"
        );
        Ok(result)
    }
}

/// Collects the skeleton edges bounding the face over `v1 -> v2`.
fn close(
    store: &TopologyStore,
    v1: VertexId,
    v2: VertexId,
    skeleton: &HashSet<EdgeId>,
) -> Result<Closure> {
    let linked = linked_edges(store, &[v1, v2], skeleton, &[]);
    let mut opposite = Vec::new();
    for &e in &linked {
        for v in store.edge(e)?.vertices() {
            if v != v1 && v != v2 && !opposite.contains(&v) {
                opposite.push(v);
            }
        }
    }

    let (mut front_a, mut front_b) = match opposite.as_slice() {
        [_] => return Ok(Closure::Complete(linked)),
        [a, b] => (*a, *b),
        _ => return Ok(Closure::Partial(linked)),
    };
    if let Some(ridge) = store.find_edge(front_a, front_b) {
        let mut edges = linked;
        edges.push(ridge);
        return Ok(Closure::Complete(edges));
    }

    let mut chain = linked;
    for _ in 0..skeleton.len() {
        let from_a = linked_edges(store, &[front_a], skeleton, &chain);
        let from_b = linked_edges(store, &[front_b], skeleton, &chain);
        let Some((ea, eb)) = closest_pair(store, &from_a, &from_b)? else {
            return Ok(Closure::Partial(chain));
        };
        if ea == eb {
            chain.push(ea);
            return Ok(Closure::Complete(chain));
        }
        chain.push(ea);
        chain.push(eb);

        let next_a = store.edge(ea)?.other(front_a);
        let next_b = store.edge(eb)?.other(front_b);
        if next_a == next_b {
            return Ok(Closure::Complete(chain));
        }
        if let Some(ridge) = store.find_edge(next_a, next_b) {
            chain.push(ridge);
            return Ok(Closure::Complete(chain));
        }
        front_a = next_a;
        front_b = next_b;
    }
    Ok(Closure::Partial(chain))
}

/// Skeleton edges touching any of `vertices`, minus those in `exclude`.
fn linked_edges(
    store: &TopologyStore,
    vertices: &[VertexId],
    skeleton: &HashSet<EdgeId>,
    exclude: &[EdgeId],
) -> Vec<EdgeId> {
    let mut result = Vec::new();
    for &v in vertices {
        for e in store.linked_edges(v) {
            if skeleton.contains(&e) && !exclude.contains(&e) && !result.contains(&e) {
                result.push(e);
            }
        }
    }
    result
}

/// The pair of edges, one from each list, with the closest midpoints.
fn closest_pair(
    store: &TopologyStore,
    from_a: &[EdgeId],
    from_b: &[EdgeId],
) -> Result<Option<(EdgeId, EdgeId)>> {
    let mut best: Option<(EdgeId, EdgeId, f64)> = None;
    for &ea in from_a {
        let ma = store.edge_median(ea)?;
        for &eb in from_b {
            let distance = (store.edge_median(eb)? - ma).norm();
            if best.is_none_or(|(_, _, d)| distance < d) {
                best = Some((ea, eb, distance));
            }
        }
    }
    Ok(best.map(|(ea, eb, _)| (ea, eb)))
}
