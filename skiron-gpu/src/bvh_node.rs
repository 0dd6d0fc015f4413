use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// A node of the flattened BVH, as the GPU reads it.
///
/// The record is exactly 32 bytes so that nodes pack tightly into cache lines
/// during traversal. An interior node's first child is always the record right
/// after it in the array, so only the second child's slot is stored; `offset`
/// is that slot for interior nodes and the index of the first triangle for
/// leaves. `prim_count == 0` marks an interior node.
#[repr(C)]
#[derive(Copy, Clone, Default, Debug, PartialEq, Pod, Zeroable)]
pub struct BvhNode {
    min: Vec3,
    prim_count: u16,
    axis: u16,
    max: Vec3,
    offset: u32,
}

impl BvhNode {
    pub fn internal(min: Vec3, max: Vec3, axis: u16) -> Self {
        Self {
            min,
            prim_count: 0,
            axis,
            max,
            offset: 0,
        }
    }

    pub fn leaf(min: Vec3, max: Vec3, prim_count: u16, triangles_offset: u32) -> Self {
        Self {
            min,
            prim_count,
            axis: 0,
            max,
            offset: triangles_offset,
        }
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    pub fn max(&self) -> Vec3 {
        self.max
    }

    pub fn is_leaf(&self) -> bool {
        self.prim_count > 0
    }

    pub fn prim_count(&self) -> u16 {
        self.prim_count
    }

    /// Axis the node's primitives were partitioned on; lets the tracer visit
    /// children front-to-back. Meaningful only for interior nodes.
    pub fn axis(&self) -> u16 {
        self.axis
    }

    /// Index of the leaf's first triangle in the reordered triangle array.
    pub fn triangles_offset(&self) -> u32 {
        self.offset
    }

    /// Slot of the second child in the node array.
    pub fn second_child(&self) -> u32 {
        self.offset
    }

    pub fn set_second_child(&mut self, slot: u32) {
        self.offset = slot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec3;
    use std::mem;

    #[test]
    fn layout() {
        assert_eq!(32, mem::size_of::<BvhNode>());

        let node = BvhNode::leaf(vec3(1.0, 2.0, 3.0), vec3(4.0, 5.0, 6.0), 7, 8);
        let bytes = bytemuck::bytes_of(&node);

        assert_eq!(bytes[0..4], 1.0f32.to_le_bytes());
        assert_eq!(bytes[4..8], 2.0f32.to_le_bytes());
        assert_eq!(bytes[8..12], 3.0f32.to_le_bytes());
        assert_eq!(bytes[12..14], 7u16.to_le_bytes());
        assert_eq!(bytes[14..16], 0u16.to_le_bytes());
        assert_eq!(bytes[16..20], 4.0f32.to_le_bytes());
        assert_eq!(bytes[20..24], 5.0f32.to_le_bytes());
        assert_eq!(bytes[24..28], 6.0f32.to_le_bytes());
        assert_eq!(bytes[28..32], 8u32.to_le_bytes());
    }

    #[test]
    fn leaf_vs_internal() {
        let leaf = BvhNode::leaf(Vec3::ZERO, Vec3::ONE, 3, 10);

        assert!(leaf.is_leaf());
        assert_eq!(3, leaf.prim_count());
        assert_eq!(10, leaf.triangles_offset());

        let mut internal = BvhNode::internal(Vec3::ZERO, Vec3::ONE, 2);

        internal.set_second_child(42);

        assert!(!internal.is_leaf());
        assert_eq!(2, internal.axis());
        assert_eq!(42, internal.second_child());
    }
}
