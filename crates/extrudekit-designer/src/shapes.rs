//! Decomposition of a path into closed, filled shapes.
//!
//! Curves are sampled uniformly, contours are cleaned up and cut at their
//! self-crossings, and every resulting loop is classified as an outer
//! boundary or a hole by nesting.

use glam::Vec2;
use lyon::geom::{CubicBezierSegment, QuadraticBezierSegment};
use lyon::path::{Path, PathEvent};
use smallvec::SmallVec;

use crate::document::FillRule;

const EPSILON: f32 = 1e-6;
/// Most crossings resolved on one contour
const MAX_SPLITS: usize = 256;

/// A closed outline with optional holes.
///
/// The outer ring is counter-clockwise and holes are clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub outer: Vec<Vec2>,
    pub holes: SmallVec<[Vec<Vec2>; 2]>,
}

impl Shape {
    pub fn rings(&self) -> impl Iterator<Item = &Vec<Vec2>> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    /// Apply a 2D mapping to every ring, restoring orientation afterwards
    pub fn map_points(&mut self, f: impl Fn(Vec2) -> Vec2) {
        for p in self.outer.iter_mut() {
            *p = f(*p);
        }
        for hole in self.holes.iter_mut() {
            for p in hole.iter_mut() {
                *p = f(*p);
            }
        }
        orient(&mut self.outer, true);
        for hole in self.holes.iter_mut() {
            orient(hole, false);
        }
    }
}

/// Signed area; positive for counter-clockwise rings
pub fn signed_area(ring: &[Vec2]) -> f32 {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum::<f32>()
        * 0.5
}

fn orient(ring: &mut [Vec2], ccw: bool) {
    if (signed_area(ring) > 0.0) != ccw {
        ring.reverse();
    }
}

/// Even-odd point-in-polygon test
pub fn contains(ring: &[Vec2], p: Vec2) -> bool {
    let mut inside = false;
    let n = ring.len();
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Sample a path into polylines, `curve_segments` points per curve
pub fn flatten(path: &Path, curve_segments: u32) -> Vec<Vec<Vec2>> {
    let n = curve_segments.max(1);
    let mut rings = Vec::new();
    let mut current: Vec<Vec2> = Vec::new();

    for event in path.iter() {
        match event {
            PathEvent::Begin { at } => {
                current = vec![Vec2::new(at.x, at.y)];
            }
            PathEvent::Line { to, .. } => current.push(Vec2::new(to.x, to.y)),
            PathEvent::Quadratic { from, ctrl, to } => {
                let seg = QuadraticBezierSegment { from, ctrl, to };
                for i in 1..=n {
                    let p = seg.sample(i as f32 / n as f32);
                    current.push(Vec2::new(p.x, p.y));
                }
            }
            PathEvent::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => {
                let seg = CubicBezierSegment {
                    from,
                    ctrl1,
                    ctrl2,
                    to,
                };
                for i in 1..=n {
                    let p = seg.sample(i as f32 / n as f32);
                    current.push(Vec2::new(p.x, p.y));
                }
            }
            PathEvent::End { .. } => {
                rings.push(std::mem::take(&mut current));
            }
        }
    }
    rings
}

/// Drop repeated points and the closing duplicate
fn dedup_ring(mut ring: Vec<Vec2>) -> Vec<Vec2> {
    ring.dedup_by(|b, a| a.distance_squared(*b) < EPSILON * EPSILON);
    while ring.len() > 1
        && ring
            .first()
            .zip(ring.last())
            .is_some_and(|(f, l)| f.distance_squared(*l) < EPSILON * EPSILON)
    {
        ring.pop();
    }
    ring
}

fn has_area(ring: &[Vec2]) -> bool {
    ring.len() >= 3 && signed_area(ring).abs() > EPSILON
}

/// Where segments `a-b` and `c-d` cross away from their endpoints
fn segment_crossing(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> Option<Vec2> {
    const END_TOLERANCE: f32 = 1e-4;
    let r = b - a;
    let s = d - c;
    let denom = r.perp_dot(s);
    if denom.abs() < EPSILON {
        return None;
    }
    let ac = c - a;
    let t = ac.perp_dot(s) / denom;
    let u = ac.perp_dot(r) / denom;
    let inside = |v: f32| v > END_TOLERANCE && v < 1.0 - END_TOLERANCE;
    (inside(t) && inside(u)).then(|| a + r * t)
}

/// First pair of non-adjacent edges `(i, j)`, `i < j`, that cross
fn first_crossing(ring: &[Vec2]) -> Option<(usize, usize, Vec2)> {
    let n = ring.len();
    if n < 4 {
        return None;
    }
    for i in 0..n {
        let (a, b) = (ring[i], ring[(i + 1) % n]);
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let (c, d) = (ring[j], ring[(j + 1) % n]);
            if let Some(x) = segment_crossing(a, b, c, d) {
                return Some((i, j, x));
            }
        }
    }
    None
}

/// Cut a self-intersecting contour into simple loops.
///
/// A figure-eight or bowtie becomes one loop per lobe, so lobes that wind
/// in opposite directions are not cancelled out by the area test. Every
/// cut leaves two strictly shorter loops.
fn split_at_crossings(ring: Vec<Vec2>) -> Vec<Vec<Vec2>> {
    let mut pending = vec![ring];
    let mut simple = Vec::new();
    let mut splits = 0;

    while let Some(ring) = pending.pop() {
        let crossing = if splits < MAX_SPLITS {
            first_crossing(&ring)
        } else {
            None
        };
        let Some((i, j, x)) = crossing else {
            simple.push(ring);
            continue;
        };
        splits += 1;

        // Edges i+1..j form the detached loop, closed through the crossing
        let mut lobe = ring[i + 1..=j].to_vec();
        lobe.push(x);

        let mut rest = ring[..=i].to_vec();
        rest.push(x);
        rest.extend_from_slice(&ring[j + 1..]);

        pending.push(lobe);
        pending.push(rest);
    }

    if splits > 0 {
        tracing::debug!("Split self-intersecting contour into {} loops", simple.len());
    }
    simple
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Outer,
    Hole(usize),
}

/// Split a path into filled shapes.
///
/// Each contour's container is the smallest larger contour enclosing its
/// first vertex. With even-odd filling every other nesting level is a hole.
/// With non-zero filling a contour is a hole only when its container is an
/// outer boundary wound the opposite way.
pub fn shapes_from_path(path: &Path, fill_rule: FillRule, curve_segments: u32) -> Vec<Shape> {
    let mut rings: Vec<Vec<Vec2>> = flatten(path, curve_segments)
        .into_iter()
        .map(dedup_ring)
        .flat_map(split_at_crossings)
        .filter(|ring| has_area(ring))
        .collect();
    // Largest first, so containers are classified before their contents
    rings.sort_by(|a, b| signed_area(b).abs().total_cmp(&signed_area(a).abs()));
    let areas: Vec<f32> = rings.iter().map(|r| signed_area(r)).collect();

    let mut roles: Vec<Role> = Vec::with_capacity(rings.len());
    for i in 0..rings.len() {
        let sample = rings[i][0];
        let parent = (0..i)
            .rev()
            .find(|&j| areas[j].abs() > areas[i].abs() && contains(&rings[j], sample));
        let role = match parent {
            Some(p) if roles[p] == Role::Outer => {
                let opposite = (areas[p] > 0.0) != (areas[i] > 0.0);
                if fill_rule == FillRule::EvenOdd || opposite {
                    Role::Hole(p)
                } else {
                    Role::Outer
                }
            }
            _ => Role::Outer,
        };
        roles.push(role);
    }

    let mut shapes: Vec<Option<Shape>> = rings
        .iter()
        .zip(&roles)
        .map(|(ring, role)| {
            (*role == Role::Outer).then(|| {
                let mut outer = ring.clone();
                orient(&mut outer, true);
                Shape {
                    outer,
                    holes: SmallVec::new(),
                }
            })
        })
        .collect();

    for (ring, role) in rings.into_iter().zip(&roles) {
        if let Role::Hole(parent) = role {
            if let Some(shape) = shapes[*parent].as_mut() {
                let mut hole = ring;
                orient(&mut hole, false);
                shape.holes.push(hole);
            }
        }
    }

    shapes.into_iter().flatten().collect()
}
