//! 2-D k-d tree for nearest and k-nearest neighbour queries.
//!
//! Built in one pass by median split along alternating axes; immutable and
//! shareable read-only across worker threads afterwards. Distance ties are
//! broken by ascending element index so queries are deterministic across
//! runs and thread counts.

use std::collections::BinaryHeap;

use super::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn next(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    fn coord(self, p: Point) -> f64 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
        }
    }
}

#[derive(Clone, Debug)]
struct KdNode {
    point: Point,
    /// Index of the point in the slice the tree was built from.
    index: usize,
    axis: Axis,
    left: Option<usize>,
    right: Option<usize>,
}

/// A neighbour returned by a query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbour {
    pub index: usize,
    pub point: Point,
    pub distance: f64,
}

/// Balanced 2-D spatial index over a fixed point set.
#[derive(Clone, Debug, Default)]
pub struct KdTree {
    nodes: Vec<KdNode>,
    root: Option<usize>,
}

impl KdTree {
    /// Builds the tree; `index` in query results refers back into `points`.
    pub fn build(points: &[Point]) -> KdTree {
        let mut items: Vec<(Point, usize)> = points.iter().copied().zip(0..).collect();
        let mut nodes = Vec::with_capacity(points.len());
        let len = items.len();
        let root = Self::build_range(&mut items, 0, len, Axis::X, &mut nodes);
        KdTree { nodes, root }
    }

    fn build_range(
        items: &mut [(Point, usize)],
        lo: usize,
        hi: usize,
        axis: Axis,
        nodes: &mut Vec<KdNode>,
    ) -> Option<usize> {
        if lo >= hi {
            return None;
        }
        items[lo..hi].sort_by(|a, b| {
            axis.coord(a.0)
                .total_cmp(&axis.coord(b.0))
                .then(a.1.cmp(&b.1))
        });
        let mid = lo + (hi - lo) / 2;
        let (point, index) = items[mid];

        let node_idx = nodes.len();
        nodes.push(KdNode {
            point,
            index,
            axis,
            left: None,
            right: None,
        });
        let left = Self::build_range(items, lo, mid, axis.next(), nodes);
        let right = Self::build_range(items, mid + 1, hi, axis.next(), nodes);
        nodes[node_idx].left = left;
        nodes[node_idx].right = right;
        Some(node_idx)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// The nearest neighbour of `query` under `distance`, or `None` on an
    /// empty tree. The query point itself is a valid answer when it is in
    /// the tree; callers that need to exclude it should use [`k_nearest`]
    /// and skip matches by index.
    ///
    /// [`k_nearest`]: KdTree::k_nearest
    pub fn nearest(&self, query: Point, distance: impl Fn(Point, Point) -> f64) -> Option<Neighbour> {
        let mut best: Option<Neighbour> = None;
        if let Some(root) = self.root {
            self.search(root, query, &distance, &mut best);
        }
        best
    }

    fn search(
        &self,
        node_idx: usize,
        query: Point,
        distance: &impl Fn(Point, Point) -> f64,
        best: &mut Option<Neighbour>,
    ) {
        let node = &self.nodes[node_idx];
        let d = distance(query, node.point);
        let better = match best {
            None => true,
            Some(b) => d < b.distance || (d == b.distance && node.index < b.index),
        };
        if better {
            *best = Some(Neighbour {
                index: node.index,
                point: node.point,
                distance: d,
            });
        }

        let query_coord = node.axis.coord(query);
        let node_coord = node.axis.coord(node.point);
        let (near, far) = if query_coord < node_coord {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };
        if let Some(near) = near {
            self.search(near, query, distance, best);
        }
        if let Some(far) = far {
            // Only cross the splitting plane if it is closer than the best
            // match so far, measured with the caller's own metric.
            let on_plane = match node.axis {
                Axis::X => Point::new(node_coord, query.y),
                Axis::Y => Point::new(query.x, node_coord),
            };
            let plane_distance = distance(query, on_plane);
            if best.as_ref().map_or(true, |b| plane_distance <= b.distance) {
                self.search(far, query, distance, best);
            }
        }
    }

    /// The k nearest neighbours of `query`, ascending by distance (ties by
    /// index). Fewer than k are returned when the tree is smaller.
    pub fn k_nearest(
        &self,
        query: Point,
        k: usize,
        distance: impl Fn(Point, Point) -> f64,
    ) -> Vec<Neighbour> {
        if k == 0 {
            return Vec::new();
        }
        let mut heap: BinaryHeap<HeapEntry> = BinaryHeap::with_capacity(k + 1);
        if let Some(root) = self.root {
            self.search_k(root, query, k, &distance, &mut heap);
        }
        let mut result: Vec<Neighbour> = heap
            .into_iter()
            .map(|e| Neighbour {
                index: e.index,
                point: e.point,
                distance: e.distance,
            })
            .collect();
        result.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.index.cmp(&b.index)));
        result
    }

    fn search_k(
        &self,
        node_idx: usize,
        query: Point,
        k: usize,
        distance: &impl Fn(Point, Point) -> f64,
        heap: &mut BinaryHeap<HeapEntry>,
    ) {
        let node = &self.nodes[node_idx];
        let d = distance(query, node.point);
        let entry = HeapEntry {
            distance: d,
            index: node.index,
            point: node.point,
        };
        if heap.len() < k {
            heap.push(entry);
        } else if let Some(worst) = heap.peek() {
            if entry.cmp(worst) == std::cmp::Ordering::Less {
                heap.pop();
                heap.push(entry);
            }
        }

        let query_coord = node.axis.coord(query);
        let node_coord = node.axis.coord(node.point);
        let (near, far) = if query_coord < node_coord {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };
        if let Some(near) = near {
            self.search_k(near, query, k, distance, heap);
        }
        if let Some(far) = far {
            let on_plane = match node.axis {
                Axis::X => Point::new(node_coord, query.y),
                Axis::Y => Point::new(query.x, node_coord),
            };
            let plane_distance = distance(query, on_plane);
            let must_cross = heap.len() < k
                || heap
                    .peek()
                    .map_or(true, |worst| plane_distance <= worst.distance);
            if must_cross {
                self.search_k(far, query, k, distance, heap);
            }
        }
    }
}

/// Max-heap entry: the worst retained neighbour sits on top.
#[derive(Clone, Copy, Debug, PartialEq)]
struct HeapEntry {
    distance: f64,
    index: usize,
    point: Point,
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.index.cmp(&other.index))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::distance::euclidean;

    fn sample_points() -> Vec<Point> {
        vec![
            Point::new(2.0, 3.0),
            Point::new(5.0, 4.0),
            Point::new(9.0, 6.0),
            Point::new(4.0, 7.0),
            Point::new(8.0, 1.0),
            Point::new(7.0, 2.0),
        ]
    }

    #[test]
    fn empty_tree_returns_nothing() {
        let tree = KdTree::build(&[]);
        assert!(tree.is_empty());
        assert!(tree.nearest(Point::new(0.0, 0.0), euclidean).is_none());
        assert!(tree.k_nearest(Point::new(0.0, 0.0), 3, euclidean).is_empty());
    }

    #[test]
    fn nearest_matches_brute_force() {
        let points = sample_points();
        let tree = KdTree::build(&points);
        for query in [
            Point::new(9.0, 2.0),
            Point::new(0.0, 0.0),
            Point::new(5.0, 5.0),
            Point::new(4.1, 6.9),
        ] {
            let got = tree.nearest(query, euclidean).unwrap();
            let want = points
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| euclidean(query, **a).total_cmp(&euclidean(query, **b)))
                .unwrap();
            assert_eq!(got.index, want.0, "query {query:?}");
        }
    }

    #[test]
    fn nearest_matches_brute_force_random() {
        let mut state = 0xD1B5_4A32_D192_ED03_u64;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state as f64 / u64::MAX as f64) * 100.0
        };
        let points: Vec<Point> = (0..200).map(|_| Point::new(next(), next())).collect();
        let tree = KdTree::build(&points);
        for _ in 0..50 {
            let query = Point::new(next(), next());
            let got = tree.nearest(query, euclidean).unwrap();
            let want = points
                .iter()
                .map(|&p| euclidean(query, p))
                .fold(f64::INFINITY, f64::min);
            assert!((got.distance - want).abs() < 1e-12);
        }
    }

    #[test]
    fn k_nearest_sorted_and_bounded() {
        let points = sample_points();
        let tree = KdTree::build(&points);
        let query = Point::new(6.0, 3.0);
        let got = tree.k_nearest(query, 3, euclidean);
        assert_eq!(got.len(), 3);
        assert!(got[0].distance <= got[1].distance && got[1].distance <= got[2].distance);

        let mut brute: Vec<(usize, f64)> = points
            .iter()
            .enumerate()
            .map(|(i, &p)| (i, euclidean(query, p)))
            .collect();
        brute.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        for (n, (i, d)) in got.iter().zip(&brute) {
            assert_eq!(n.index, *i);
            assert!((n.distance - d).abs() < 1e-12);
        }

        // k larger than the tree returns everything.
        assert_eq!(tree.k_nearest(query, 100, euclidean).len(), points.len());
    }

    #[test]
    fn ties_broken_by_index() {
        // Two points equidistant from the query: the smaller index wins.
        let points = vec![Point::new(1.0, 0.0), Point::new(-1.0, 0.0)];
        let tree = KdTree::build(&points);
        let got = tree.nearest(Point::new(0.0, 0.0), euclidean).unwrap();
        assert_eq!(got.index, 0);
    }
}
