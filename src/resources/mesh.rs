use cgmath::{InnerSpace, Vector2, Vector3};

use crate::{
    data_structures::model::Vertex,
    resources::document::{DocPrimitive, Topology},
};

/// Turns one OBJ model into a primitive.
///
/// OBJ has no tangents, so they are derived from the texture coordinates when
/// the model carries both normals and texture coordinates.
pub fn obj_primitive(model: &tobj::Model, material: Option<usize>) -> DocPrimitive {
    let mesh = &model.mesh;
    let mut vertices = (0..mesh.positions.len() / 3)
        .map(|i| Vertex {
            position: [
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            ],
            tex_coords: [
                mesh.texcoords.get(i * 2).map_or(0.0, |f| *f),
                1.0 - mesh.texcoords.get(i * 2 + 1).map_or(0.0, |f| *f),
            ],
            normal: [
                mesh.normals.get(i * 3).map_or(0.0, |f| *f),
                mesh.normals.get(i * 3 + 1).map_or(0.0, |f| *f),
                mesh.normals.get(i * 3 + 2).map_or(0.0, |f| *f),
            ],
            tangent: [0.0; 3],
        })
        .collect::<Vec<_>>();

    let topology = match mesh.face_arities.iter().find(|&&arity| arity != 3) {
        Some(&arity) => Topology::Polygons(arity),
        None => Topology::Triangles,
    };
    let has_tangents =
        topology == Topology::Triangles && !mesh.texcoords.is_empty() && !mesh.normals.is_empty();
    if has_tangents {
        compute_tangents(&mut vertices, &mesh.indices);
    }

    DocPrimitive {
        vertices,
        indices: mesh.indices.clone(),
        topology,
        material,
        has_tangents,
        has_joints: false,
    }
}

/// Per-vertex tangents averaged over the triangles sharing the vertex.
///
/// Triangles with out-of-range indices or degenerate texture coordinates
/// contribute nothing.
pub fn compute_tangents(vertices: &mut [Vertex], indices: &[u32]) {
    let mut triangles_included = vec![0u32; vertices.len()];

    for c in indices.chunks_exact(3) {
        let [i0, i1, i2] = [c[0] as usize, c[1] as usize, c[2] as usize];
        if i0 >= vertices.len() || i1 >= vertices.len() || i2 >= vertices.len() {
            continue;
        }
        let (v0, v1, v2) = (vertices[i0], vertices[i1], vertices[i2]);

        let pos0: Vector3<_> = v0.position.into();
        let pos1: Vector3<_> = v1.position.into();
        let pos2: Vector3<_> = v2.position.into();

        let uv0: Vector2<_> = v0.tex_coords.into();
        let uv1: Vector2<_> = v1.tex_coords.into();
        let uv2: Vector2<_> = v2.tex_coords.into();

        let delta_pos1 = pos1 - pos0;
        let delta_pos2 = pos2 - pos0;
        let delta_uv1 = uv1 - uv0;
        let delta_uv2 = uv2 - uv0;

        // delta_pos1 = delta_uv1.x * T + delta_uv1.y * B
        // delta_pos2 = delta_uv2.x * T + delta_uv2.y * B
        let det = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
        if det.abs() <= f32::EPSILON {
            continue;
        }
        let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) / det;

        for i in [i0, i1, i2] {
            vertices[i].tangent = (tangent + Vector3::from(vertices[i].tangent)).into();
            triangles_included[i] += 1;
        }
    }

    for (vertex, n) in vertices.iter_mut().zip(triangles_included) {
        if n > 0 {
            let averaged = Vector3::from(vertex.tangent) / n as f32;
            if averaged.magnitude2() > f32::EPSILON {
                vertex.tangent = averaged.normalize().into();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn vertex(position: [f32; 3], tex_coords: [f32; 2]) -> Vertex {
        Vertex {
            position,
            normal: [0.0, 0.0, 1.0],
            tex_coords,
            ..Default::default()
        }
    }

    #[test]
    fn tangent_follows_u_direction() {
        let mut vertices = vec![
            vertex([0.0, 0.0, 0.0], [0.0, 0.0]),
            vertex([2.0, 0.0, 0.0], [1.0, 0.0]),
            vertex([0.0, 2.0, 0.0], [0.0, 1.0]),
        ];
        compute_tangents(&mut vertices, &[0, 1, 2]);
        for v in &vertices {
            assert_relative_eq!(Vector3::from(v.tangent), Vector3::unit_x(), epsilon = 1e-6);
        }
    }

    #[test]
    fn degenerate_uvs_leave_tangents_zero() {
        let mut vertices = vec![
            vertex([0.0, 0.0, 0.0], [0.5, 0.5]),
            vertex([1.0, 0.0, 0.0], [0.5, 0.5]),
            vertex([0.0, 1.0, 0.0], [0.5, 0.5]),
        ];
        compute_tangents(&mut vertices, &[0, 1, 2, 0, 1, 7]);
        assert!(vertices.iter().all(|v| v.tangent == [0.0; 3]));
    }

    #[test]
    fn quad_faces_are_reported() {
        let model = tobj::Model::new(
            tobj::Mesh {
                positions: vec![0.0; 12],
                indices: vec![0, 1, 2, 3],
                face_arities: vec![4],
                ..Default::default()
            },
            "quad".into(),
        );
        let primitive = obj_primitive(&model, None);
        assert_eq!(primitive.topology, Topology::Polygons(4));
        assert!(!primitive.has_tangents);
    }
}
