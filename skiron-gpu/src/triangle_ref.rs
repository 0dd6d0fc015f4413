use bytemuck::{Pod, Zeroable};

/// Reference to one triangle of the scene: which mesh it belongs to and where
/// its first vertex index sits in the shared index buffer.
///
/// The BVH hands these out reordered so that each leaf's triangles form a
/// contiguous run.
#[repr(C)]
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct TriangleRef {
    mesh_id: u32,
    first_index: u32,
}

impl TriangleRef {
    pub fn new(mesh_id: u32, first_index: u32) -> Self {
        Self {
            mesh_id,
            first_index,
        }
    }

    pub fn mesh_id(self) -> u32 {
        self.mesh_id
    }

    pub fn first_index(self) -> u32 {
        self.first_index
    }
}
