//! Flat geometry store.
//!
//! All vertices and indices of a scene live in two contiguous arrays. A
//! [`DrawGroup`] names a vertex range and the world matrix that places it; the
//! table of world matrices holds one entry per mesh-bearing node, shared by all
//! of that node's draw groups.

use cgmath::Matrix4;

use crate::{
    data_structures::{
        model::{Mesh, Vertex},
        scene_graph::{NodeId, SceneGraph},
    },
    error::SceneError,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawGroup {
    pub vertex_begin: u32,
    pub vertex_count: u32,
    pub index_begin: u32,
    pub index_count: u32,
    pub matrix_index: usize,
}

#[derive(Clone, Debug, Default)]
pub struct GeometryStore {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub draw_groups: Vec<DrawGroup>,
    pub matrices: Vec<Matrix4<f32>>,
}

impl GeometryStore {
    /// Walks the graph depth-first and records a draw group per primitive of
    /// every mesh-bearing node.
    ///
    /// Each such node contributes its resolved world matrix, so the graph's
    /// upper transform is already folded in.
    pub fn flatten(&mut self, graph: &SceneGraph, meshes: &[Mesh]) {
        self.draw_groups.clear();
        self.matrices.clear();
        for &root in graph.roots() {
            self.flatten_node(graph, meshes, root);
        }
    }

    fn flatten_node(&mut self, graph: &SceneGraph, meshes: &[Mesh], id: NodeId) {
        let Some(node) = graph.node(id) else {
            return;
        };
        if let Some(mesh) = node.mesh.and_then(|m| meshes.get(m)) {
            let matrix_index = self.matrices.len();
            self.matrices.push(node.world);
            self.draw_groups
                .extend(mesh.primitives.iter().map(|p| DrawGroup {
                    vertex_begin: p.vertex_range.start,
                    vertex_count: p.vertex_range.end - p.vertex_range.start,
                    index_begin: p.index_range.start,
                    index_count: p.index_range.end - p.index_range.start,
                    matrix_index,
                }));
        }
        for &child in &node.children {
            self.flatten_node(graph, meshes, child);
        }
    }

    /// Checks every draw group against the vertex, index and matrix tables.
    pub fn validate(&self) -> Result<(), SceneError> {
        for (i, group) in self.draw_groups.iter().enumerate() {
            let vertex_end = group.vertex_begin as usize + group.vertex_count as usize;
            if vertex_end > self.vertices.len() {
                return Err(SceneError::invalid(format!(
                    "draw group {i} ends at vertex {vertex_end}, store holds {}",
                    self.vertices.len()
                )));
            }
            let index_end = group.index_begin as usize + group.index_count as usize;
            if index_end > self.indices.len() {
                return Err(SceneError::invalid(format!(
                    "draw group {i} ends at index {index_end}, store holds {}",
                    self.indices.len()
                )));
            }
            SceneError::check_index("matrix", group.matrix_index, self.matrices.len())?;
        }
        Ok(())
    }
}
