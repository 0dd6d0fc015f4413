mod mesh;

use glam::Vec3;
use thiserror::Error;

pub use self::mesh::*;

/// Scene geometry as handed over by the outer renderer: a shared vertex and
/// index buffer, plus per-mesh runs into the index buffer.
///
/// The renderer is expected to pass already-valid data; [`Scene::validate`]
/// exists so that a malformed hand-over fails with a descriptive error at the
/// boundary instead of somewhere inside the builder.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    meshes: Vec<Mesh>,
    vertices: Vec<Vec3>,
    indices: Vec<u32>,
}

impl Scene {
    pub fn new(meshes: Vec<Mesh>, vertices: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            meshes,
            vertices,
            indices,
        }
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }

    /// Position of the vertex referenced by the `entry`-th index-buffer slot.
    pub(crate) fn position(&self, entry: u32) -> Vec3 {
        self.vertices[self.indices[entry as usize] as usize]
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        for (mesh_id, mesh) in self.meshes.iter().enumerate() {
            let mesh_id = mesh_id as u32;

            if mesh.end() < mesh.begin() || (mesh.end() as usize) > self.indices.len() {
                return Err(SceneError::InvalidMeshRange {
                    mesh_id,
                    begin: mesh.begin(),
                    end: mesh.end(),
                    len: self.indices.len(),
                });
            }

            if (mesh.end() - mesh.begin()) % 3 != 0 {
                return Err(SceneError::PartialTriangle {
                    mesh_id,
                    begin: mesh.begin(),
                    end: mesh.end(),
                });
            }

            for entry in mesh.begin()..mesh.end() {
                let vertex = self.indices[entry as usize];

                if (vertex as usize) >= self.vertices.len() {
                    return Err(SceneError::VertexOutOfBounds {
                        mesh_id,
                        entry,
                        vertex,
                        len: self.vertices.len(),
                    });
                }
            }
        }

        if self.triangle_count() == 0 {
            return Err(SceneError::NoTriangles);
        }

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("scene contains no triangles")]
    NoTriangles,

    #[error(
        "mesh {mesh_id}: index range {begin}..{end} is out of bounds \
         (index buffer holds {len} entries)"
    )]
    InvalidMeshRange {
        mesh_id: u32,
        begin: u32,
        end: u32,
        len: usize,
    },

    #[error("mesh {mesh_id}: index range {begin}..{end} is not a whole number of triangles")]
    PartialTriangle { mesh_id: u32, begin: u32, end: u32 },

    #[error(
        "mesh {mesh_id}: index-buffer entry {entry} references vertex {vertex}, \
         but the scene has only {len} vertices"
    )]
    VertexOutOfBounds {
        mesh_id: u32,
        entry: u32,
        vertex: u32,
        len: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec3;

    fn vertices() -> Vec<Vec3> {
        vec![
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn accepts_valid_scene() {
        let target = Scene::new(vec![Mesh::new(0, 3)], vertices(), vec![0, 1, 2]);

        assert_eq!(Ok(()), target.validate());
        assert_eq!(1, target.triangle_count());
    }

    #[test]
    fn rejects_empty_scene() {
        let target = Scene::default();

        assert_eq!(Err(SceneError::NoTriangles), target.validate());
    }

    #[test]
    fn rejects_mesh_past_index_buffer() {
        let target = Scene::new(vec![Mesh::new(0, 6)], vertices(), vec![0, 1, 2]);

        assert_eq!(
            Err(SceneError::InvalidMeshRange {
                mesh_id: 0,
                begin: 0,
                end: 6,
                len: 3,
            }),
            target.validate(),
        );
    }

    #[test]
    fn rejects_partial_triangle() {
        let target = Scene::new(vec![Mesh::new(0, 2)], vertices(), vec![0, 1, 2]);

        assert_eq!(
            Err(SceneError::PartialTriangle {
                mesh_id: 0,
                begin: 0,
                end: 2,
            }),
            target.validate(),
        );
    }

    #[test]
    fn rejects_dangling_vertex_index() {
        let target = Scene::new(vec![Mesh::new(0, 3)], vertices(), vec![0, 1, 9]);

        assert_eq!(
            Err(SceneError::VertexOutOfBounds {
                mesh_id: 0,
                entry: 2,
                vertex: 9,
                len: 3,
            }),
            target.validate(),
        );
    }
}
