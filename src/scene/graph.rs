use crate::error::{AudioNestError, Result};
use std::collections::HashMap;

/// Identifier of a node in the surrounding scene graph.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Trait for exposing an external scene hierarchy to the container layer.
///
/// Implement this for your engine's transform hierarchy. It is only queried while the
/// container tree is initialized.
pub trait SceneGraph {
    /// Every node below `node`, in depth-first pre-order, siblings in storage order.
    /// `node` itself is not included.
    fn descendants(&self, node: NodeId) -> Vec<NodeId>;

    /// Immediate structural parent of `node`, `None` for roots and unknown nodes.
    fn parent(&self, node: NodeId) -> Option<NodeId>;
}

/// Simple owned scene hierarchy.
#[derive(Debug, Clone, Default)]
pub struct SceneTree {
    next_id: u64,
    parents: HashMap<NodeId, Option<NodeId>>,
    children: HashMap<NodeId, Vec<NodeId>>,
}

impl SceneTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_root(&mut self) -> NodeId {
        self.insert(None)
    }

    pub fn add_child(&mut self, parent: NodeId) -> Result<NodeId> {
        if !self.contains(parent) {
            return Err(AudioNestError::Configuration(format!(
                "Parent node {} does not exist",
                parent
            )));
        }
        Ok(self.insert(Some(parent)))
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.parents.contains_key(&node)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.children.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    fn insert(&mut self, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.parents.insert(id, parent);
        self.children.insert(id, Vec::new());
        if let Some(parent) = parent {
            self.children.entry(parent).or_default().push(id);
        }
        id
    }
}

impl SceneGraph for SceneTree {
    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parents.get(&node).copied().flatten()
    }
}
