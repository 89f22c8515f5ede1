use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::FixedFaceHandle;
use spade::{
    ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation,
};

use tracing::debug;

use crate::error::{Result, TessellationError};
use crate::math::polygon_3d::newell_normal;
use crate::math::{Point2, Point3, Vector3};
use crate::topology::{FaceId, TopologyStore};

use super::TriangleMesh;

/// Triangulates faces with a constrained Delaunay triangulation.
///
/// Each face is projected onto the plane through its Newell normal, so
/// non-convex loops are handled and slightly non-planar roof faces keep
/// their original 3-D vertex positions. Triangles wind with the face.
pub struct TessellateFaces {
    faces: Vec<FaceId>,
}

impl TessellateFaces {
    /// Creates a new `TessellateFaces` operation.
    #[must_use]
    pub fn new(faces: Vec<FaceId>) -> Self {
        Self { faces }
    }

    /// Executes the tessellation, returning one mesh for all faces.
    ///
    /// # Errors
    ///
    /// Returns [`TessellationError::Failed`] if the projected boundary of a
    /// face crosses itself, or an error if a face is missing. Faces without
    /// area are skipped.
    pub fn execute(&self, store: &TopologyStore) -> Result<TriangleMesh> {
        let mut mesh = TriangleMesh::default();
        for &face in &self.faces {
            let points = store.face_points(face)?;
            let Some(normal) = newell_normal(&points) else {
                debug!(?face, "skipping face without area");
                continue;
            };
            mesh.append(tessellate_loop(&points, normal)?);
        }
        Ok(mesh)
    }
}

/// Orthonormal `(u, v)` with `u × v = normal`.
fn plane_basis(normal: &Vector3) -> (Vector3, Vector3) {
    let axis = if normal.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = normal.cross(&axis).normalize();
    let v = normal.cross(&u);
    (u, v)
}

#[allow(clippy::cast_possible_truncation)]
fn tessellate_loop(points: &[Point3], normal: Vector3) -> Result<TriangleMesh> {
    let (u_dir, v_dir) = plane_basis(&normal);
    let origin = points[0];
    let project = |p: &Point3| -> SpadePoint2<f64> {
        let d = p - origin;
        SpadePoint2::new(d.dot(&u_dir), d.dot(&v_dir))
    };
    let projected: Vec<_> = points.iter().map(project).collect();

    let mut cdt = ConstrainedDelaunayTriangulation::<SpadePoint2<f64>>::new();
    let handles = insert_constraint_loop(&mut cdt, &projected)?;
    let interior_faces = classify_interior_faces(&cdt);

    // Coincident projected points share one CDT vertex; the first wins.
    let mut source: HashMap<usize, usize> = HashMap::new();
    for (i, h) in handles.iter().enumerate() {
        source.entry(h.index()).or_insert(i);
    }

    let mut mesh = TriangleMesh::default();
    let mut vertex_map: HashMap<usize, u32> = HashMap::new();

    for face_handle in cdt.inner_faces() {
        if !interior_faces.contains(&face_handle.fix().index()) {
            continue;
        }

        let mut tri_indices = [0u32; 3];
        for (i, vh) in face_handle.vertices().iter().enumerate() {
            let idx = vh.fix().index();
            let mesh_idx = if let Some(&existing) = vertex_map.get(&idx) {
                existing
            } else {
                let original = source.get(&idx).copied().ok_or_else(|| {
                    TessellationError::Failed("triangulation introduced a vertex".into())
                })?;
                let pos = vh.position();
                let new_idx = mesh.vertices.len() as u32;
                mesh.vertices.push(points[original]);
                mesh.normals.push(normal);
                mesh.uvs.push(Point2::new(pos.x, pos.y));
                vertex_map.insert(idx, new_idx);
                new_idx
            };
            tri_indices[i] = mesh_idx;
        }
        mesh.indices.push(tri_indices);
    }

    if mesh.is_empty() {
        return Err(TessellationError::Failed("face produced no triangles".into()).into());
    }
    Ok(mesh)
}

/// Inserts a closed polygon as constraint edges into the CDT.
fn insert_constraint_loop(
    cdt: &mut ConstrainedDelaunayTriangulation<SpadePoint2<f64>>,
    points: &[SpadePoint2<f64>],
) -> Result<Vec<spade::handles::FixedVertexHandle>> {
    if points.len() < 3 {
        return Err(
            TessellationError::Failed("constraint loop needs at least 3 points".into()).into(),
        );
    }

    let mut handles = Vec::with_capacity(points.len());
    for &pt in points {
        let h = cdt
            .insert(pt)
            .map_err(|e: InsertionError| TessellationError::Failed(format!("CDT insert: {e}")))?;
        handles.push(h);
    }

    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from == to {
            continue;
        }
        if !cdt.can_add_constraint(from, to) {
            return Err(
                TessellationError::Failed("face boundary crosses itself in projection".into())
                    .into(),
            );
        }
        cdt.add_constraint(from, to);
    }

    Ok(handles)
}

/// Classifies which inner faces of the CDT are inside the polygon using flood-fill.
///
/// Starts from faces adjacent to the outer (infinite) face at depth 0. Each time
/// a constraint edge is crossed, depth increments. Odd depth = interior.
fn classify_interior_faces(
    cdt: &ConstrainedDelaunayTriangulation<SpadePoint2<f64>>,
) -> HashSet<usize> {
    let mut interior = HashSet::new();
    let mut depth_map: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<spade::handles::InnerTag>, u32)> = VecDeque::new();

    let outer_fix = cdt.outer_face().fix();

    for edge in cdt.directed_edges() {
        if edge.face().fix() == outer_fix {
            if let Some(inner) = edge.rev().face().as_inner() {
                let idx = inner.fix().index();
                if depth_map.contains_key(&idx) {
                    continue;
                }
                let depth = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
                depth_map.insert(idx, depth);
                if depth % 2 == 1 {
                    interior.insert(idx);
                }
                queue.push_back((inner.fix(), depth));
            }
        }
    }

    while let Some((face_fix, depth)) = queue.pop_front() {
        let face = cdt.face(face_fix);
        for edge in face.adjacent_edges() {
            let Some(neighbor) = edge.rev().face().as_inner() else {
                continue;
            };
            let n_idx = neighbor.fix().index();
            if depth_map.contains_key(&n_idx) {
                continue;
            }
            let new_depth = depth + u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_map.insert(n_idx, new_depth);
            if new_depth % 2 == 1 {
                interior.insert(n_idx);
            }
            queue.push_back((neighbor.fix(), new_depth));
        }
    }

    interior
}
