use std::ops::{Index, IndexMut};

use crate::{Axis, BoundingBox};

/// A node of the build tree.
///
/// The build tree is transient: it exists only between construction and
/// serialization, and child links are ids into [`BvhNodes`] rather than owned
/// pointers.
#[derive(Clone, Copy, Debug)]
pub enum BvhNode {
    Internal {
        bounds: BoundingBox,
        axis: Axis,
        left_id: BvhNodeId,
        right_id: BvhNodeId,
    },

    Leaf {
        bounds: BoundingBox,
        /// Index of the leaf's first triangle in the reordered output.
        triangles_offset: u32,
        triangle_count: u32,
    },
}

impl BvhNode {
    pub fn bounds(&self) -> BoundingBox {
        match self {
            BvhNode::Internal { bounds, .. } => *bounds,
            BvhNode::Leaf { bounds, .. } => *bounds,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BvhNodeId(u32);

impl BvhNodeId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// Arena backing the build tree; its length doubles as the node counter that
/// sizes the flattened array.
#[derive(Debug, Default)]
pub struct BvhNodes {
    nodes: Vec<BvhNode>,
}

impl BvhNodes {
    pub fn add(&mut self, node: BvhNode) -> BvhNodeId {
        let id = BvhNodeId::new(self.nodes.len() as u32);

        self.nodes.push(node);
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Index<BvhNodeId> for BvhNodes {
    type Output = BvhNode;

    fn index(&self, index: BvhNodeId) -> &Self::Output {
        &self.nodes[index.get() as usize]
    }
}

impl IndexMut<BvhNodeId> for BvhNodes {
    fn index_mut(&mut self, index: BvhNodeId) -> &mut Self::Output {
        &mut self.nodes[index.get() as usize]
    }
}
