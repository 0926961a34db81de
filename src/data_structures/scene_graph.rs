//! Scene graph and hierarchical scene organization.
//!
//! Nodes live in an arena and refer to their children by [`NodeId`]. The graph
//! is built once from a [`SceneDocument`] and is read-only afterwards: world
//! transforms are resolved top-down while the tree is built and bounding boxes
//! are aggregated bottom-up once a node's children are in place.
//!
//! Document nodes reachable through more than one parent are instanced once per
//! path, so the arena is always a tree.

use cgmath::{EuclideanSpace, Matrix4, Point3, SquareMatrix};
use log::debug;

use crate::{
    data_structures::{aabb::Aabb, model::Mesh},
    error::SceneError,
    resources::document::SceneDocument,
};

pub type NodeId = usize;

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub name: Option<String>,
    /// Index of the document node this was instanced from.
    pub source: usize,
    pub local: Matrix4<f32>,
    pub world: Matrix4<f32>,
    pub children: Vec<NodeId>,
    pub mesh: Option<usize>,
    pub camera: Option<usize>,
    pub light: Option<usize>,
    /// World-space bounds of this node's mesh and all of its descendants.
    pub bounds: Option<Aabb>,
}

impl Node {
    pub fn world_translation(&self) -> Point3<f32> {
        Point3::from_vec(self.world.w.truncate())
    }
}

#[derive(Clone, Debug)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    upper: Matrix4<f32>,
}

impl SceneGraph {
    /// Builds the graph with an identity upper transform.
    pub fn build(document: &SceneDocument, meshes: &[Mesh]) -> Result<Self, SceneError> {
        Self::build_with_upper(document, meshes, Matrix4::identity())
    }

    /// Builds the graph, placing every root under `upper`.
    pub fn build_with_upper(
        document: &SceneDocument,
        meshes: &[Mesh],
        upper: Matrix4<f32>,
    ) -> Result<Self, SceneError> {
        if document.roots.is_empty() {
            return Err(SceneError::load("document has no root node"));
        }
        let mut graph = SceneGraph {
            nodes: Vec::new(),
            roots: Vec::new(),
            upper,
        };
        let mut path = Vec::new();
        for &root in &document.roots {
            SceneError::check_index("root node", root, document.nodes.len())?;
            let id = graph.insert(document, meshes, root, &upper, &mut path)?;
            graph.roots.push(id);
        }
        debug!(
            "scene graph built: {} nodes from {} document nodes, {} roots",
            graph.nodes.len(),
            document.nodes.len(),
            graph.roots.len()
        );
        Ok(graph)
    }

    fn insert(
        &mut self,
        document: &SceneDocument,
        meshes: &[Mesh],
        index: usize,
        parent_world: &Matrix4<f32>,
        path: &mut Vec<usize>,
    ) -> Result<NodeId, SceneError> {
        if path.contains(&index) {
            return Err(SceneError::invalid(format!(
                "node {index} is its own ancestor"
            )));
        }
        let doc_node = &document.nodes[index];
        let mesh = doc_node
            .mesh
            .map(|m| SceneError::check_index("mesh", m, meshes.len()))
            .transpose()?;
        let camera = doc_node
            .camera
            .map(|c| SceneError::check_index("camera", c, document.cameras.len()))
            .transpose()?;
        let light = doc_node
            .light
            .map(|l| SceneError::check_index("light", l, document.lights.len()))
            .transpose()?;

        // pre-order: the world transform is known before any child is visited
        let local = doc_node.transform.to_matrix();
        let world = parent_world * local;
        let id = self.nodes.len();
        self.nodes.push(Node {
            name: doc_node.name.clone(),
            source: index,
            local,
            world,
            children: Vec::with_capacity(doc_node.children.len()),
            mesh,
            camera,
            light,
            bounds: None,
        });

        path.push(index);
        let mut children = Vec::with_capacity(doc_node.children.len());
        for &child in &doc_node.children {
            SceneError::check_index("child node", child, document.nodes.len())?;
            children.push(self.insert(document, meshes, child, &world, path)?);
        }
        path.pop();

        // post-order: children are final, fold their bounds into ours
        let own = mesh
            .and_then(|m| meshes[m].bounds)
            .map(|b| b.transformed(&world));
        let bounds = children
            .iter()
            .fold(own, |acc, &c| Aabb::merge(acc, self.nodes[c].bounds));
        let node = &mut self.nodes[id];
        node.children = children;
        node.bounds = bounds;
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Transform every root is placed under.
    pub fn upper(&self) -> &Matrix4<f32> {
        &self.upper
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.name.as_deref() == Some(name))
    }

    /// Bounds of the whole scene, `None` if no node carries geometry.
    pub fn bounds(&self) -> Option<Aabb> {
        self.roots
            .iter()
            .fold(None, |acc, &r| Aabb::merge(acc, self.nodes[r].bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data_structures::transform::{NodeTransform, Transform},
        resources::document::DocNode,
    };
    use approx::assert_relative_eq;
    use cgmath::Vector3;

    fn translated(x: f32, y: f32, z: f32, children: Vec<usize>) -> DocNode {
        DocNode {
            transform: NodeTransform::Decomposed(Transform::from(Vector3::new(x, y, z))),
            children,
            ..Default::default()
        }
    }

    #[test]
    fn child_world_accumulates_parent_translation() {
        let document = SceneDocument {
            nodes: vec![translated(1.0, 0.0, 0.0, vec![1]), translated(0.0, 1.0, 0.0, vec![])],
            roots: vec![0],
            ..Default::default()
        };
        let graph = SceneGraph::build(&document, &[]).unwrap();
        let child = graph.node(graph.node(0).unwrap().children[0]).unwrap();
        assert_relative_eq!(
            child.world_translation(),
            Point3::new(1.0, 1.0, 0.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn upper_transform_applies_to_roots() {
        let document = SceneDocument {
            nodes: vec![translated(0.0, 0.0, 1.0, vec![])],
            roots: vec![0],
            ..Default::default()
        };
        let upper = Matrix4::from_translation(Vector3::new(0.0, 5.0, 0.0));
        let graph = SceneGraph::build_with_upper(&document, &[], upper).unwrap();
        assert_relative_eq!(
            graph.node(0).unwrap().world_translation(),
            Point3::new(0.0, 5.0, 1.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn cycle_is_rejected() {
        let document = SceneDocument {
            nodes: vec![translated(0.0, 0.0, 0.0, vec![1]), translated(0.0, 0.0, 0.0, vec![0])],
            roots: vec![0],
            ..Default::default()
        };
        let err = SceneGraph::build(&document, &[]).unwrap_err();
        assert!(matches!(err, SceneError::InvalidDocument { .. }));
    }

    #[test]
    fn dangling_child_is_rejected() {
        let document = SceneDocument {
            nodes: vec![translated(0.0, 0.0, 0.0, vec![7])],
            roots: vec![0],
            ..Default::default()
        };
        let err = SceneGraph::build(&document, &[]).unwrap_err();
        assert!(matches!(err, SceneError::InvalidDocument { .. }));
    }

    #[test]
    fn missing_root_fails_to_load() {
        let document = SceneDocument {
            nodes: vec![translated(0.0, 0.0, 0.0, vec![])],
            ..Default::default()
        };
        let err = SceneGraph::build(&document, &[]).unwrap_err();
        assert!(matches!(err, SceneError::LoadFailed { .. }));
    }

    #[test]
    fn shared_node_is_instanced_per_parent() {
        let document = SceneDocument {
            nodes: vec![
                translated(0.0, 0.0, 0.0, vec![1, 2]),
                translated(-1.0, 0.0, 0.0, vec![3]),
                translated(1.0, 0.0, 0.0, vec![3]),
                translated(0.0, 2.0, 0.0, vec![]),
            ],
            roots: vec![0],
            ..Default::default()
        };
        let graph = SceneGraph::build(&document, &[]).unwrap();
        assert_eq!(graph.len(), 5);
        let leaves: Vec<_> = graph.nodes().iter().filter(|n| n.source == 3).collect();
        assert_eq!(leaves.len(), 2);
        assert_relative_eq!(leaves[0].world_translation(), Point3::new(-1.0, 2.0, 0.0));
        assert_relative_eq!(leaves[1].world_translation(), Point3::new(1.0, 2.0, 0.0));
    }
}
