use super::{BvhNode, BvhNodeId, BvhNodes};
use crate::gpu;

/// Flattens the build tree into the array the GPU traverses.
///
/// Layout contract: nodes are laid out depth-first with an interior node's
/// first child in the record right after it, so only the second child's slot
/// gets written out. The traversal shaders rely on this to skip whole
/// subtrees with a single offset read.
pub(crate) fn run(nodes: &BvhNodes, root_id: BvhNodeId) -> Vec<gpu::BvhNode> {
    let mut out = vec![gpu::BvhNode::default(); nodes.len()];
    let mut stack = vec![(root_id, None::<usize>)];
    let mut slot = 0;

    while let Some((id, parent_slot)) = stack.pop() {
        // Popping an entry with a back-reference means we're the second
        // child, and our slot is only known now.
        if let Some(parent_slot) = parent_slot {
            out[parent_slot].set_second_child(slot as u32);
        }

        match nodes[id] {
            BvhNode::Internal {
                bounds,
                axis,
                left_id,
                right_id,
            } => {
                out[slot] =
                    gpu::BvhNode::internal(bounds.min(), bounds.max(), axis.into());

                // Second child goes onto the stack first so that the first
                // child lands in the very next slot.
                stack.push((right_id, Some(slot)));
                stack.push((left_id, None));
            }

            BvhNode::Leaf {
                bounds,
                triangles_offset,
                triangle_count,
            } => {
                assert!(triangle_count <= u32::from(u16::MAX));

                out[slot] = gpu::BvhNode::leaf(
                    bounds.min(),
                    bounds.max(),
                    triangle_count as u16,
                    triangles_offset,
                );
            }
        }

        slot += 1;
    }

    assert_eq!(out.len(), slot);

    out
}
