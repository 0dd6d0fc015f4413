use glam::Vec3;

use super::{BvhNode, BvhNodeId, BvhNodes, BvhPrimitive};
use crate::{gpu, Axis, BoundingBox};

/// How the builder trades tree depth against leaf size.
///
/// Costs are relative to each other, so only their ratio matters; the
/// defaults treat visiting a node and intersecting a triangle as equally
/// expensive and keep leaves as small as possible.
#[derive(Clone, Debug)]
pub struct BvhParams {
    /// Number of equal-width buckets candidate SAH planes are drawn from.
    pub buckets: usize,

    /// Estimated cost of visiting an interior node during traversal.
    pub traversal_cost: f32,

    /// Estimated cost of one ray/triangle intersection test.
    pub intersection_cost: f32,

    /// Ranges larger than this are always split, even when the SAH would
    /// rather keep them in one leaf.
    pub max_leaf_size: usize,
}

impl Default for BvhParams {
    fn default() -> Self {
        Self {
            buckets: 12,
            traversal_cost: 1.0,
            intersection_cost: 1.0,
            max_leaf_size: 1,
        }
    }
}

/// Recursively partitions `primitives` in place, producing the build tree and
/// the leaf-order triangle array.
pub(crate) fn run(
    triangles: &[gpu::TriangleRef],
    primitives: &mut [BvhPrimitive],
    params: &BvhParams,
) -> (BvhNodes, BvhNodeId, Vec<gpu::TriangleRef>) {
    assert!(params.buckets >= 2);

    let mut builder = Builder {
        triangles,
        params,
        nodes: BvhNodes::default(),
        ordered: Vec::with_capacity(triangles.len()),
    };

    let root_id = builder.build(primitives);

    (builder.nodes, root_id, builder.ordered)
}

struct Builder<'a> {
    triangles: &'a [gpu::TriangleRef],
    params: &'a BvhParams,
    nodes: BvhNodes,
    ordered: Vec<gpu::TriangleRef>,
}

impl Builder<'_> {
    fn build(&mut self, primitives: &mut [BvhPrimitive]) -> BvhNodeId {
        assert!(!primitives.is_empty());

        let bounds: BoundingBox =
            primitives.iter().map(|primitive| primitive.bounds).collect();

        if primitives.len() == 1 {
            return self.leaf(bounds, primitives);
        }

        let centroid_bounds: BoundingBox =
            primitives.iter().map(|primitive| primitive.center).collect();

        let axis = centroid_bounds.longest_axis();

        // All centroids sit at the same spot on the split axis - partitioning
        // further cannot separate anything.
        if centroid_bounds.min()[axis] == centroid_bounds.max()[axis] {
            return self.leaf(bounds, primitives);
        }

        let mid = if primitives.len() <= 2 {
            split_at_median(primitives, axis)
        } else {
            match self.find_sah_split(primitives, &centroid_bounds, axis, &bounds) {
                Some(mid) => mid,
                None => return self.leaf(bounds, primitives),
            }
        };

        assert!(mid > 0 && mid < primitives.len());

        let (left, right) = primitives.split_at_mut(mid);
        let left_id = self.build(left);
        let right_id = self.build(right);

        let bounds = self.nodes[left_id].bounds() + self.nodes[right_id].bounds();

        self.nodes.add(BvhNode::Internal {
            bounds,
            axis,
            left_id,
            right_id,
        })
    }

    fn leaf(&mut self, bounds: BoundingBox, primitives: &[BvhPrimitive]) -> BvhNodeId {
        let triangles_offset = self.ordered.len() as u32;

        for primitive in primitives {
            self.ordered
                .push(self.triangles[primitive.triangle_id as usize]);
        }

        self.nodes.add(BvhNode::Leaf {
            bounds,
            triangles_offset,
            triangle_count: primitives.len() as u32,
        })
    }

    /// Picks the cheapest of the `buckets - 1` candidate planes on `axis` and,
    /// if splitting beats a leaf (or the range is too large for one), performs
    /// the partition and returns the boundary index. `None` means "make a
    /// leaf".
    fn find_sah_split(
        &self,
        primitives: &mut [BvhPrimitive],
        centroid_bounds: &BoundingBox,
        axis: Axis,
        bounds: &BoundingBox,
    ) -> Option<usize> {
        let buckets = self.params.buckets;
        let mut bins = vec![Bin::default(); buckets];

        for primitive in primitives.iter() {
            let bin = bucket_of(centroid_bounds, axis, buckets, primitive.center);

            bins[bin].count += 1;
            bins[bin].bounds += primitive.bounds;
        }

        // ---

        let mut left_areas = vec![0.0; buckets - 1];
        let mut right_areas = vec![0.0; buckets - 1];
        let mut left_counts = vec![0u32; buckets - 1];
        let mut right_counts = vec![0u32; buckets - 1];
        let mut left_bb = BoundingBox::default();
        let mut right_bb = BoundingBox::default();
        let mut left_count = 0;
        let mut right_count = 0;

        for i in 0..(buckets - 1) {
            left_count += bins[i].count;
            left_counts[i] = left_count;
            left_bb += bins[i].bounds;
            left_areas[i] = left_bb.area();

            right_count += bins[buckets - 1 - i].count;
            right_counts[buckets - 2 - i] = right_count;
            right_bb += bins[buckets - 1 - i].bounds;
            right_areas[buckets - 2 - i] = right_bb.area();
        }

        // ---

        let mut best: Option<(usize, f32)> = None;
        let total_area = bounds.area();

        for i in 0..(buckets - 1) {
            // A plane with everything on one side separates nothing.
            if left_counts[i] == 0 || right_counts[i] == 0 {
                continue;
            }

            let cost = self.params.traversal_cost
                + ((left_counts[i] as f32) * left_areas[i]
                    + (right_counts[i] as f32) * right_areas[i])
                    / total_area;

            let is_current_bucket_better =
                best.map_or(true, |(_, best_cost)| cost < best_cost);

            if is_current_bucket_better {
                best = Some((i, cost));
            }
        }

        let (split_bucket, split_cost) = best?;
        let leaf_cost = self.params.intersection_cost * (primitives.len() as f32);

        if primitives.len() <= self.params.max_leaf_size && split_cost >= leaf_cost {
            return None;
        }

        Some(partition_by_bucket(
            primitives,
            centroid_bounds,
            axis,
            buckets,
            split_bucket,
        ))
    }
}

/// Bucket index of `center` on `axis`; a centroid exactly at the upper bound
/// of the centroid range lands in the last bucket.
fn bucket_of(
    centroid_bounds: &BoundingBox,
    axis: Axis,
    buckets: usize,
    center: Vec3,
) -> usize {
    let offset = centroid_bounds.map(center)[axis];

    ((offset * (buckets as f32)) as usize).min(buckets - 1)
}

/// Moves primitives at or below `split_bucket` in front of the rest; linear
/// time, no ordering inside the halves.
fn partition_by_bucket(
    primitives: &mut [BvhPrimitive],
    centroid_bounds: &BoundingBox,
    axis: Axis,
    buckets: usize,
    split_bucket: usize,
) -> usize {
    let mut left = 0;
    let mut right = primitives.len();

    while left < right {
        let bin = bucket_of(centroid_bounds, axis, buckets, primitives[left].center);

        if bin <= split_bucket {
            left += 1;
        } else {
            right -= 1;
            primitives.swap(left, right);
        }
    }

    left
}

/// Selects the element that would sit at the middle under centroid order and
/// partitions around it, without fully sorting the range.
fn split_at_median(primitives: &mut [BvhPrimitive], axis: Axis) -> usize {
    let mid = primitives.len() / 2;

    primitives.select_nth_unstable_by(mid, |a, b| {
        a.center[axis].total_cmp(&b.center[axis])
    });

    mid
}

#[derive(Clone, Copy, Default, Debug)]
struct Bin {
    bounds: BoundingBox,
    count: u32,
}
