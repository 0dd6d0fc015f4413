mod bvh_builder;
mod bvh_node;
mod bvh_primitive;
mod bvh_serializer;

pub use self::bvh_builder::*;
pub use self::bvh_node::*;
pub use self::bvh_primitive::*;
use crate::{gpu, BoundingBox, Scene, SceneError};

/// A built hierarchy, ready for upload.
///
/// `nodes` is the flattened tree (root at slot 0) and `triangles` the triangle
/// references reordered so that each leaf's triangles form a contiguous run.
/// Both arrays are immutable once built; the outer renderer uploads their byte
/// views wholesale.
#[derive(Clone, Debug)]
pub struct Bvh {
    nodes: Vec<gpu::BvhNode>,
    triangles: Vec<gpu::TriangleRef>,
}

impl Bvh {
    pub fn build(scene: &Scene) -> Result<Self, SceneError> {
        Self::build_with(scene, &BvhParams::default())
    }

    pub fn build_with(scene: &Scene, params: &BvhParams) -> Result<Self, SceneError> {
        scene.validate()?;

        let triangles = extract_triangles(scene);
        let mut primitives = extract_primitives(scene, &triangles);

        let (nodes, root_id, ordered) =
            bvh_builder::run(&triangles, &mut primitives, params);

        let nodes = bvh_serializer::run(&nodes, root_id);

        log::debug!(
            "Built BVH; nodes={}, triangles={}",
            nodes.len(),
            ordered.len(),
        );

        Ok(Self {
            nodes,
            triangles: ordered,
        })
    }

    pub fn nodes(&self) -> &[gpu::BvhNode] {
        &self.nodes
    }

    pub fn triangles(&self) -> &[gpu::TriangleRef] {
        &self.triangles
    }

    /// Node array as bytes, sized exactly `size_of::<gpu::BvhNode>() * nodes`.
    pub fn node_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.nodes)
    }

    /// Triangle array as bytes, sized exactly
    /// `size_of::<gpu::TriangleRef>() * triangles`.
    pub fn triangle_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.triangles)
    }
}

/// One triangle reference per three consecutive index-buffer entries, in mesh
/// order then intra-mesh order; this is the ordering the BVH later permutes.
fn extract_triangles(scene: &Scene) -> Vec<gpu::TriangleRef> {
    scene
        .meshes()
        .iter()
        .enumerate()
        .flat_map(|(mesh_id, mesh)| {
            (mesh.begin()..mesh.end()).step_by(3).map(move |first_index| {
                gpu::TriangleRef::new(mesh_id as u32, first_index)
            })
        })
        .collect()
}

fn extract_primitives(
    scene: &Scene,
    triangles: &[gpu::TriangleRef],
) -> Vec<BvhPrimitive> {
    triangles
        .iter()
        .enumerate()
        .map(|(triangle_id, triangle)| {
            let bounds: BoundingBox = (0..3)
                .map(|i| scene.position(triangle.first_index() + i))
                .collect();

            BvhPrimitive::new(triangle_id as u32, bounds)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mesh;
    use glam::{vec3, Vec3};

    fn tri(origin: Vec3) -> [Vec3; 3] {
        [
            origin,
            origin + vec3(1.0, 0.0, 0.0),
            origin + vec3(0.0, 1.0, 0.0),
        ]
    }

    fn single_mesh(triangles: &[[Vec3; 3]]) -> Scene {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for triangle in triangles {
            for vertex in triangle {
                indices.push(vertices.len() as u32);
                vertices.push(*vertex);
            }
        }

        let meshes = vec![Mesh::new(0, indices.len() as u32)];

        Scene::new(meshes, vertices, indices)
    }

    /// Walks the flattened tree from the root, checking the layout contract
    /// and that every node's bounds contain its descendants; returns the
    /// leaf-triangle total.
    fn check_tree(target: &Bvh, slot: usize) -> u32 {
        let node = target.nodes()[slot];

        if node.is_leaf() {
            return u32::from(node.prim_count());
        }

        let second = node.second_child() as usize;

        assert!(second >= slot + 2);
        assert!(second < target.nodes().len());

        for child in [target.nodes()[slot + 1], target.nodes()[second]] {
            assert!(child.min().cmpge(node.min()).all());
            assert!(child.max().cmple(node.max()).all());
        }

        check_tree(target, slot + 1) + check_tree(target, second)
    }

    #[test]
    fn single_triangle_yields_a_root_leaf() {
        let scene = single_mesh(&[tri(Vec3::ZERO)]);
        let target = Bvh::build(&scene).unwrap();

        assert_eq!(1, target.nodes().len());
        assert_eq!(1, target.triangles().len());

        let root = target.nodes()[0];

        assert!(root.is_leaf());
        assert_eq!(1, root.prim_count());
        assert_eq!(0, root.triangles_offset());
        assert_eq!(Vec3::ZERO, root.min());
        assert_eq!(vec3(1.0, 1.0, 0.0), root.max());
    }

    #[test]
    fn equal_centroids_yield_a_single_leaf() {
        let scene = single_mesh(&vec![tri(vec3(3.0, 3.0, 3.0)); 100]);
        let target = Bvh::build(&scene).unwrap();

        assert_eq!(1, target.nodes().len());
        assert_eq!(100, target.triangles().len());
        assert_eq!(100, target.nodes()[0].prim_count());
    }

    #[test]
    fn two_triangles_split_into_two_leaves() {
        let scene =
            single_mesh(&[tri(Vec3::ZERO), tri(vec3(10.0, 0.0, 0.0))]);

        let target = Bvh::build(&scene).unwrap();

        assert_eq!(3, target.nodes().len());

        let root = target.nodes()[0];

        assert!(!root.is_leaf());
        assert_eq!(2, root.second_child());
        assert_eq!(1, target.nodes()[1].prim_count());
        assert_eq!(1, target.nodes()[2].prim_count());
    }

    #[test]
    fn output_is_a_permutation_of_extraction() {
        let scene = single_mesh(
            &(0..40)
                .map(|i| {
                    tri(vec3(
                        (i % 7) as f32 * 3.0,
                        (i % 5) as f32 * 2.0,
                        (i % 3) as f32 * 4.0,
                    ))
                })
                .collect::<Vec<_>>(),
        );

        let target = Bvh::build(&scene).unwrap();

        let mut got: Vec<_> = target.triangles().to_vec();
        let mut expected = extract_triangles(&scene);

        assert_eq!(expected.len(), got.len());

        got.sort_by_key(|t| (t.mesh_id(), t.first_index()));
        expected.sort_by_key(|t| (t.mesh_id(), t.first_index()));

        assert_eq!(expected, got);
        assert_eq!(40, check_tree(&target, 0));
    }

    #[test]
    fn meshes_are_extracted_in_order() {
        let vertices = vec![
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(0.0, 1.0, 0.0),
            vec3(5.0, 0.0, 0.0),
            vec3(6.0, 0.0, 0.0),
            vec3(5.0, 1.0, 0.0),
        ];

        let indices = vec![0, 1, 2, 3, 4, 5];
        let meshes = vec![Mesh::new(0, 3), Mesh::new(3, 6)];
        let scene = Scene::new(meshes, vertices, indices);

        let expected = vec![
            gpu::TriangleRef::new(0, 0),
            gpu::TriangleRef::new(1, 3),
        ];

        assert_eq!(expected, extract_triangles(&scene));

        let target = Bvh::build(&scene).unwrap();

        assert_eq!(2, check_tree(&target, 0));
    }

    #[test]
    fn centroid_is_the_bounds_midpoint() {
        // A skewed triangle: the true centroid and the box midpoint differ.
        let scene = single_mesh(&[[
            vec3(0.0, 0.0, 0.0),
            vec3(4.0, 0.0, 0.0),
            vec3(0.0, 2.0, 0.0),
        ]]);

        let triangles = extract_triangles(&scene);
        let primitives = extract_primitives(&scene, &triangles);

        assert_eq!(vec3(2.0, 1.0, 0.0), primitives[0].center);
    }

    #[test]
    fn rebuilding_is_deterministic() {
        let scene = single_mesh(
            &(0..100)
                .map(|i| {
                    tri(vec3(
                        (i * 37 % 11) as f32,
                        (i * 17 % 13) as f32,
                        (i * 29 % 7) as f32,
                    ))
                })
                .collect::<Vec<_>>(),
        );

        let a = Bvh::build(&scene).unwrap();
        let b = Bvh::build(&scene).unwrap();

        assert_eq!(a.node_bytes(), b.node_bytes());
        assert_eq!(a.triangle_bytes(), b.triangle_bytes());
    }

    #[test]
    fn byte_views_match_record_sizes() {
        let scene =
            single_mesh(&[tri(Vec3::ZERO), tri(vec3(4.0, 0.0, 0.0))]);

        let target = Bvh::build(&scene).unwrap();

        assert_eq!(32 * target.nodes().len(), target.node_bytes().len());
        assert_eq!(
            8 * target.triangles().len(),
            target.triangle_bytes().len(),
        );
    }

    #[test]
    fn big_duplicate_heavy_scene_stays_shallow() {
        // Lots of duplicate centroids mixed with a spread - duplicates
        // collapse into shared leaves instead of recursing forever.
        let scene = single_mesh(
            &(0..2048)
                .map(|i| {
                    if i % 2 == 0 {
                        tri(vec3(100.0, 100.0, 100.0))
                    } else {
                        tri(vec3((i % 64) as f32, 0.0, 0.0))
                    }
                })
                .collect::<Vec<_>>(),
        );

        let target = Bvh::build(&scene).unwrap();

        assert_eq!(2048, check_tree(&target, 0));
    }

    #[test]
    fn invalid_scene_is_rejected() {
        let scene = Scene::default();

        assert_eq!(Some(SceneError::NoTriangles), Bvh::build(&scene).err());
    }
}
