//! Exact area intersection between two closed outlines
//!
//! The plane is cut into horizontal slabs at every vertex and at every
//! edge-edge crossing. Inside an open slab no two edges swap order, so the
//! filled intervals along the slab's midline tell whether the two fills share
//! a positive area anywhere in that slab. Shapes that merely touch (shared
//! edge, shared vertex) never overlap.

use glam::DVec2;

/// Parallel edges never produce a crossing
const PARALLEL_EPSILON: f64 = 1e-12;

/// Returns true when the even-odd fills of both outlines share positive area
pub fn outlines_overlap(a: &[DVec2], b: &[DVec2]) -> bool {
    if a.len() < 3 || b.len() < 3 {
        return false;
    }

    let (a_min, a_max) = bounds(a);
    let (b_min, b_max) = bounds(b);
    if a_min.x >= b_max.x || b_min.x >= a_max.x || a_min.y >= b_max.y || b_min.y >= a_max.y {
        return false;
    }
    let lo = a_min.y.max(b_min.y);
    let hi = a_max.y.min(b_max.y);

    let edges: Vec<(DVec2, DVec2)> = edges(a).chain(edges(b)).collect();
    let mut cuts: Vec<f64> = a.iter().chain(b).map(|p| p.y).collect();
    for (i, &(p0, p1)) in edges.iter().enumerate() {
        for &(q0, q1) in &edges[i + 1..] {
            if let Some(hit) = segment_crossing(p0, p1, q0, q1) {
                cuts.push(hit.y);
            }
        }
    }
    cuts.retain(|y| y.is_finite());
    cuts.sort_by(f64::total_cmp);
    cuts.dedup();

    cuts.windows(2).any(|slab| {
        let mid = 0.5 * (slab[0] + slab[1]);
        if slab[1] <= slab[0] || mid <= lo || mid >= hi {
            return false;
        }
        spans_overlap(&spans_at(a, mid), &spans_at(b, mid))
    })
}

fn bounds(points: &[DVec2]) -> (DVec2, DVec2) {
    points
        .iter()
        .fold((DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)), |(min, max), &p| {
            (min.min(p), max.max(p))
        })
}

/// Closed edge loop (last vertex connects back to the first)
fn edges(points: &[DVec2]) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(&p, &q)| (p, q))
}

/// Intersection point of two segments, if they cross or touch
fn segment_crossing(p0: DVec2, p1: DVec2, q0: DVec2, q1: DVec2) -> Option<DVec2> {
    let r = p1 - p0;
    let s = q1 - q0;
    let denom = r.perp_dot(s);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }
    let qp = q0 - p0;
    let t = qp.perp_dot(s) / denom;
    let u = qp.perp_dot(r) / denom;
    ((0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)).then(|| p0 + r * t)
}

/// Filled x-intervals of an outline along the horizontal line at `y`
fn spans_at(points: &[DVec2], y: f64) -> Vec<(f64, f64)> {
    let mut xs: Vec<f64> = edges(points)
        .filter(|(p, q)| (p.y > y) != (q.y > y))
        .map(|(p, q)| p.x + (y - p.y) * (q.x - p.x) / (q.y - p.y))
        .collect();
    xs.sort_by(f64::total_cmp);
    xs.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect()
}

/// Do two sorted interval lists share a positive-length overlap?
fn spans_overlap(a: &[(f64, f64)], b: &[(f64, f64)]) -> bool {
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let lo = a[i].0.max(b[j].0);
        let hi = a[i].1.min(b[j].1);
        if hi > lo {
            return true;
        }
        if a[i].1 < b[j].1 {
            i += 1;
        } else {
            j += 1;
        }
    }
    false
}
