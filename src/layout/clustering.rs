//! Nearest-neighbour clustering of page elements.
//!
//! The shared shape of every variant: choose at most one nearest-neighbour
//! edge per element (in parallel), turn the edge array into an undirected
//! graph, and emit its connected components. The edge array has exactly one
//! writer per index, so the parallel map needs no locks; component output
//! is deterministic because index order breaks every tie.

use log::debug;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use super::params::ClusteringOptions;
use crate::geometry::distance::find_index_nearest;
use crate::geometry::kdtree::KdTree;
use crate::geometry::{Point, Rectangle};

/// Runs `choose` once per index, in parallel according to `max_workers`.
pub(crate) fn build_edges<F>(count: usize, max_workers: isize, choose: F) -> Vec<Option<usize>>
where
    F: Fn(usize) -> Option<usize> + Sync,
{
    if max_workers == 1 {
        return (0..count).map(choose).collect();
    }
    if max_workers > 1 {
        match ThreadPoolBuilder::new()
            .num_threads(max_workers as usize)
            .build()
        {
            Ok(pool) => {
                return pool.install(|| (0..count).into_par_iter().map(&choose).collect());
            }
            Err(e) => {
                debug!("falling back to the global pool: {e}");
            }
        }
    }
    (0..count).into_par_iter().map(&choose).collect()
}

/// Connected components of an adjacency list, by iterative depth-first
/// search from each unvisited node. Components come out in ascending order
/// of their smallest index.
pub fn connected_components(adjacency: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut visited = vec![false; adjacency.len()];
    let mut components = Vec::new();
    let mut stack = Vec::new();

    for start in 0..adjacency.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        stack.clear();
        stack.push(start);
        let mut component = Vec::new();
        while let Some(node) = stack.pop() {
            component.push(node);
            for &next in &adjacency[node] {
                if !visited[next] {
                    visited[next] = true;
                    stack.push(next);
                }
            }
        }
        component.sort_unstable();
        components.push(component);
    }
    components
}

/// Components of the "element i chose neighbour j" edge array, treating the
/// edges as undirected. `None` entries contribute no edge.
pub fn group_indices_by_edges(edges: &[Option<usize>]) -> Vec<Vec<usize>> {
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); edges.len()];
    for (i, edge) in edges.iter().enumerate() {
        if let Some(j) = *edge {
            adjacency[i].push(j);
            adjacency[j].push(i);
        }
    }
    connected_components(&adjacency)
}

/// Clusters elements by their single nearest neighbour.
///
/// A k-d tree over the candidate points serves the queries. For each
/// element passing `filter_pivot`, the nearest other element is accepted
/// when `filter_final` holds for the pair and the distance stays under
/// `max_distance`; accepted edges are then grouped into components.
/// Returned groups hold indices into `elements`.
#[allow(clippy::too_many_arguments)]
pub fn cluster_nearest_neighbours<T, D, M, PP, PC, FP, FF>(
    elements: &[T],
    distance: D,
    max_distance: M,
    pivot_point: PP,
    candidate_point: PC,
    filter_pivot: FP,
    filter_final: FF,
    options: &ClusteringOptions,
) -> Vec<Vec<usize>>
where
    T: Sync,
    D: Fn(Point, Point) -> f64 + Sync,
    M: Fn(&T, &T) -> f64 + Sync,
    PP: Fn(&T) -> Point + Sync,
    PC: Fn(&T) -> Point + Sync,
    FP: Fn(&T) -> bool + Sync,
    FF: Fn(&T, &T) -> bool + Sync,
{
    let candidates: Vec<Point> = elements.iter().map(&candidate_point).collect();
    let tree = KdTree::build(&candidates);

    let edges = build_edges(elements.len(), options.max_workers, |i| {
        let element = &elements[i];
        if !filter_pivot(element) {
            return None;
        }
        // Two matches are enough: the nearest may be the element itself.
        let found = tree.k_nearest(pivot_point(element), 2, &distance);
        let nearest = found.into_iter().find(|n| n.index != i)?;
        let other = &elements[nearest.index];
        if filter_final(element, other) && nearest.distance < max_distance(element, other) {
            Some(nearest.index)
        } else {
            None
        }
    });

    group_indices_by_edges(&edges)
}

/// Clusters elements by their k nearest neighbours, keeping the closest
/// candidate that passes the filters.
///
/// Unlike [`cluster_nearest_neighbours`], a rejected nearest neighbour does
/// not end the search: the remaining candidates are tried in distance
/// order.
#[allow(clippy::too_many_arguments)]
pub fn cluster_k_nearest_neighbours<T, D, M, PP, PC, FP, FF>(
    elements: &[T],
    k: usize,
    distance: D,
    max_distance: M,
    pivot_point: PP,
    candidate_point: PC,
    filter_pivot: FP,
    filter_final: FF,
    options: &ClusteringOptions,
) -> Vec<Vec<usize>>
where
    T: Sync,
    D: Fn(Point, Point) -> f64 + Sync,
    M: Fn(&T, &T) -> f64 + Sync,
    PP: Fn(&T) -> Point + Sync,
    PC: Fn(&T) -> Point + Sync,
    FP: Fn(&T) -> bool + Sync,
    FF: Fn(&T, &T) -> bool + Sync,
{
    let candidates: Vec<Point> = elements.iter().map(&candidate_point).collect();
    let tree = KdTree::build(&candidates);

    let edges = build_edges(elements.len(), options.max_workers, |i| {
        let element = &elements[i];
        if !filter_pivot(element) {
            return None;
        }
        let found = tree.k_nearest(pivot_point(element), k + 1, &distance);
        for neighbour in found {
            if neighbour.index == i {
                continue;
            }
            let other = &elements[neighbour.index];
            if !filter_final(element, other) {
                continue;
            }
            if neighbour.distance < max_distance(element, other) {
                return Some(neighbour.index);
            }
            // Candidates arrive in distance order; once over the limit,
            // everything further is too.
            return None;
        }
        None
    });

    group_indices_by_edges(&edges)
}

/// Clusters line-shaped elements by scanning every candidate instead of
/// using a spatial index: with a pivot and a candidate point per element
/// taken from segment end-points there are too few elements per page for a
/// tree to pay off.
pub fn cluster_nearest_neighbours_lines<T, D, M, PP, PC>(
    elements: &[T],
    distance: D,
    max_distance: M,
    pivot_point: PP,
    candidate_point: PC,
    options: &ClusteringOptions,
) -> Vec<Vec<usize>>
where
    T: Sync,
    D: Fn(Point, Point) -> f64 + Sync,
    M: Fn(&T, &T) -> f64 + Sync,
    PP: Fn(&T) -> Point + Sync,
    PC: Fn(&T) -> Point + Sync,
{
    let edges = build_edges(elements.len(), options.max_workers, |i| {
        let element = &elements[i];
        let (index, found_distance) = find_index_nearest(
            pivot_point(element),
            i,
            elements,
            &candidate_point,
            &distance,
        )?;
        let other = &elements[index];
        (found_distance < max_distance(element, other)).then_some(index)
    });

    group_indices_by_edges(&edges)
}

/// Groups elements whose axis-aligned rectangles transitively overlap.
///
/// Repeated scan-and-merge: the head group absorbs every group whose
/// rectangle intersects it (within `tolerance`), widening to the union of
/// the corners, until a full pass makes no merge. Groups whose rectangles
/// no longer touch anything come out as separate components.
pub fn coalesce_axis_aligned<T>(
    elements: &[T],
    bounds: impl Fn(&T) -> Rectangle,
    tolerance: f64,
) -> Vec<Vec<usize>> {
    let mut pending: std::collections::VecDeque<(Rectangle, Vec<usize>)> = elements
        .iter()
        .enumerate()
        .map(|(i, e)| (bounds(e).normalise(), vec![i]))
        .collect();
    let mut merged: Vec<Vec<usize>> = Vec::new();

    while let Some((mut rect, mut indices)) = pending.pop_front() {
        let mut changed = false;
        let mut kept = std::collections::VecDeque::with_capacity(pending.len());
        while let Some((other_rect, other_indices)) = pending.pop_front() {
            if intersects_with_tolerance(&rect, &other_rect, tolerance) {
                rect = rect.union(&other_rect);
                indices.extend(other_indices);
                changed = true;
            } else {
                kept.push_back((other_rect, other_indices));
            }
        }
        pending = kept;
        if changed {
            // The union may now reach groups rejected earlier in the pass.
            pending.push_front((rect, indices));
        } else {
            indices.sort_unstable();
            merged.push(indices);
        }
    }
    merged
}

fn intersects_with_tolerance(a: &Rectangle, b: &Rectangle, tolerance: f64) -> bool {
    let expanded = Rectangle::new(
        Point::new(a.left() - tolerance, a.bottom() - tolerance),
        Point::new(a.right() + tolerance, a.top() + tolerance),
    );
    expanded.intersects_with(b)
}
