//! Bevelled extrusion of 2D shapes into triangle meshes.
//!
//! The profile runs along +Z: a front bevel from `-thickness` to `0`, a
//! straight body from `0` to `depth`, and a back bevel from `depth` to
//! `depth + thickness`. Bevel rings follow a quarter circle, pushing the
//! outline outwards by up to `bevel_size`.

use extrudekit_settings::ParameterStore;
use glam::{Vec2, Vec3};
use lyon::math::point;
use lyon::path::Path;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers,
};

use crate::error::{ConvertError, ConvertResult};
use crate::mesh::MeshData;
use crate::shapes::Shape;

/// Depth parameter units per scene unit of extrusion
pub const DEPTH_DIVISOR: f32 = 10.0;
/// Fewest bevel rings generated regardless of the requested count
pub const MIN_BEVEL_SEGMENTS: u32 = 4;
/// Fewest samples per curve segment
pub const MIN_CURVE_SEGMENTS: u32 = 8;

/// Longest allowed miter, as a multiple of the bevel offset
const MITER_LIMIT: f32 = 3.0;

// ── Options ─────────────────────────────────────────────────

/// Resolved extrusion settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrudeOptions {
    pub depth: f32,
    pub bevel_thickness: f32,
    pub bevel_size: f32,
    pub bevel_segments: u32,
    pub curve_segments: u32,
}

impl ExtrudeOptions {
    /// Derive settings from the parameter store.
    ///
    /// `depth = depth / 10`, at least 4 bevel rings, and at least
    /// `max(8, 2 * bevel_segments)` samples per curve.
    pub fn from_params(params: &ParameterStore) -> Self {
        Self {
            depth: params.depth / DEPTH_DIVISOR,
            bevel_thickness: params.bevel_thickness,
            bevel_size: params.bevel_size,
            bevel_segments: params.bevel_segments.max(MIN_BEVEL_SEGMENTS),
            curve_segments: MIN_CURVE_SEGMENTS.max(params.bevel_segments.saturating_mul(2)),
        }
    }

    fn has_bevel(&self) -> bool {
        self.bevel_thickness > 0.0 || self.bevel_size > 0.0
    }

    /// `(z, outline offset)` for every ring from front cap to back cap
    fn layers(&self) -> Vec<(f32, f32)> {
        if !self.has_bevel() {
            return vec![(0.0, 0.0), (self.depth, 0.0)];
        }
        let segs = self.bevel_segments.max(1);
        let ring = |b: u32| {
            let t = b as f32 / segs as f32;
            let angle = t * std::f32::consts::FRAC_PI_2;
            (self.bevel_thickness * angle.cos(), self.bevel_size * angle.sin())
        };

        let mut layers = Vec::with_capacity(2 * segs as usize + 2);
        for b in 0..segs {
            let (z, offset) = ring(b);
            layers.push((-z, offset));
        }
        layers.push((0.0, self.bevel_size));
        layers.push((self.depth, self.bevel_size));
        for b in (0..segs).rev() {
            let (z, offset) = ring(b);
            layers.push((self.depth + z, offset));
        }
        layers
    }
}

// ── Extrude ─────────────────────────────────────────────────

/// Extrude one shape into a closed mesh
pub fn extrude_shape(shape: &Shape, options: &ExtrudeOptions) -> ConvertResult<MeshData> {
    let layers = options.layers();
    let (front_z, back_z) = match (layers.first(), layers.last()) {
        (Some(front), Some(back)) => (front.0, back.0),
        _ => return Err(ConvertError::Degenerate("no extrusion layers".into())),
    };

    let mut mesh = MeshData::new();
    let cap = tessellate_cap(shape)?;
    push_cap(&mut mesh, &cap, front_z, false);
    push_cap(&mut mesh, &cap, back_z, true);

    for ring in shape.rings() {
        let bevel = bevel_vectors(ring);
        for pair in layers.windows(2) {
            let (z0, o0) = pair[0];
            let (z1, o1) = pair[1];
            if (z1 - z0).abs() < f32::EPSILON && (o1 - o0).abs() < f32::EPSILON {
                continue;
            }
            push_wall(&mut mesh, ring, &bevel, (z0, o0), (z1, o1));
        }
    }

    if mesh.is_empty() {
        return Err(ConvertError::Degenerate("extrusion produced no faces".into()));
    }
    Ok(mesh)
}

/// Per-vertex miter vectors pointing away from the filled region
fn bevel_vectors(ring: &[Vec2]) -> Vec<Vec2> {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let prev = ring[(i + n - 1) % n];
            let cur = ring[i];
            let next = ring[(i + 1) % n];
            let n1 = outward_normal(cur - prev);
            let n2 = outward_normal(next - cur);
            let dir = (n1 + n2).normalize_or_zero();
            if dir == Vec2::ZERO {
                return n1;
            }
            let cos_half = dir.dot(n1).max(1.0 / MITER_LIMIT);
            dir / cos_half
        })
        .collect()
}

/// Right-hand normal of an edge; outward for counter-clockwise outer rings
/// and for clockwise holes
fn outward_normal(edge: Vec2) -> Vec2 {
    Vec2::new(edge.y, -edge.x).normalize_or_zero()
}

fn push_wall(
    mesh: &mut MeshData,
    ring: &[Vec2],
    bevel: &[Vec2],
    (z0, o0): (f32, f32),
    (z1, o1): (f32, f32),
) {
    let n = ring.len();
    let at = |i: usize, z: f32, offset: f32| {
        let p = ring[i] + bevel[i] * offset;
        Vec3::new(p.x, p.y, z)
    };

    for i in 0..n {
        let j = (i + 1) % n;
        let a = at(i, z0, o0);
        let b = at(j, z0, o0);
        let c = at(j, z1, o1);
        let d = at(i, z1, o1);

        let normal = {
            let primary = (b - a).cross(c - a);
            let fallback = (c - a).cross(d - a);
            if primary.length_squared() > fallback.length_squared() {
                primary.normalize_or_zero()
            } else {
                fallback.normalize_or_zero()
            }
        };
        if normal == Vec3::ZERO {
            continue;
        }

        let ia = mesh.push_vertex(a, normal);
        let ib = mesh.push_vertex(b, normal);
        let ic = mesh.push_vertex(c, normal);
        let id = mesh.push_vertex(d, normal);
        mesh.push_triangle(ia, ib, ic);
        mesh.push_triangle(ia, ic, id);
    }
}

// ── Caps ────────────────────────────────────────────────────

fn tessellate_cap(shape: &Shape) -> ConvertResult<VertexBuffers<Vec2, u32>> {
    let mut builder = Path::builder();
    for ring in shape.rings() {
        let mut points = ring.iter();
        if let Some(first) = points.next() {
            builder.begin(point(first.x, first.y));
            for p in points {
                builder.line_to(point(p.x, p.y));
            }
            builder.close();
        }
    }
    let outline = builder.build();

    let mut buffers: VertexBuffers<Vec2, u32> = VertexBuffers::new();
    let mut tessellator = FillTessellator::new();
    tessellator
        .tessellate_path(
            &outline,
            &FillOptions::default().with_fill_rule(FillRule::EvenOdd),
            &mut BuffersBuilder::new(&mut buffers, |vertex: FillVertex| {
                let p = vertex.position();
                Vec2::new(p.x, p.y)
            }),
        )
        .map_err(|e| ConvertError::Degenerate(format!("cap tessellation failed: {:?}", e)))?;
    Ok(buffers)
}

/// Add a flat cap at `z`, facing +Z when `facing_back` and -Z otherwise
fn push_cap(mesh: &mut MeshData, cap: &VertexBuffers<Vec2, u32>, z: f32, facing_back: bool) {
    let normal = if facing_back { Vec3::Z } else { Vec3::NEG_Z };
    let base = mesh.vertex_count() as u32;
    for v in &cap.vertices {
        mesh.push_vertex(Vec3::new(v.x, v.y, z), normal);
    }
    for tri in cap.indices.chunks_exact(3) {
        let (a, b, c) = (tri[0], tri[1], tri[2]);
        let (pa, pb, pc) = (
            cap.vertices[a as usize],
            cap.vertices[b as usize],
            cap.vertices[c as usize],
        );
        let ccw = (pb - pa).perp_dot(pc - pa) > 0.0;
        if ccw == facing_back {
            mesh.push_triangle(base + a, base + b, base + c);
        } else {
            mesh.push_triangle(base + a, base + c, base + b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Aabb;
    use smallvec::SmallVec;

    fn square(size: f32) -> Shape {
        Shape {
            outer: vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(size, 0.0),
                Vec2::new(size, size),
                Vec2::new(0.0, size),
            ],
            holes: SmallVec::new(),
        }
    }

    fn flat(depth: f32) -> ExtrudeOptions {
        ExtrudeOptions {
            depth,
            bevel_thickness: 0.0,
            bevel_size: 0.0,
            bevel_segments: 4,
            curve_segments: 8,
        }
    }

    #[test]
    fn test_options_from_params() {
        let opts = ExtrudeOptions::from_params(&ParameterStore::default());
        assert_eq!(opts.depth, 2.0);
        assert_eq!(opts.bevel_segments, 4);
        assert_eq!(opts.curve_segments, 8);

        let params = ParameterStore {
            bevel_segments: 7,
            ..Default::default()
        };
        let opts = ExtrudeOptions::from_params(&params);
        assert_eq!(opts.bevel_segments, 7);
        assert_eq!(opts.curve_segments, 14);
    }

    #[test]
    fn test_layer_profile() {
        let opts = ExtrudeOptions {
            depth: 2.0,
            bevel_thickness: 1.0,
            bevel_size: 0.5,
            bevel_segments: 4,
            curve_segments: 8,
        };
        let layers = opts.layers();
        assert_eq!(layers.len(), 10);
        assert_eq!(layers[0], (-1.0, 0.0));
        assert_eq!(layers[4], (0.0, 0.5));
        assert_eq!(layers[5], (2.0, 0.5));
        assert_eq!(*layers.last().unwrap(), (3.0, 0.0));
        assert!(layers.windows(2).all(|w| w[0].0 <= w[1].0 + 1e-6));
    }

    #[test]
    fn test_flat_prism() {
        let mesh = extrude_shape(&square(10.0), &flat(2.0)).unwrap();
        // Two caps of two triangles plus four wall quads
        assert_eq!(mesh.triangle_count(), 4 + 8);
        let b = mesh.bounds();
        assert_eq!(b.min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(b.max, Vec3::new(10.0, 10.0, 2.0));
    }

    #[test]
    fn test_bevel_grows_outline() {
        let opts = ExtrudeOptions {
            depth: 2.0,
            bevel_thickness: 1.0,
            bevel_size: 0.5,
            bevel_segments: 4,
            curve_segments: 8,
        };
        let b: Aabb = extrude_shape(&square(10.0), &opts).unwrap().bounds();
        assert!((b.min.x + 0.5).abs() < 1e-5);
        assert!((b.max.x - 10.5).abs() < 1e-5);
        assert!((b.min.z + 1.0).abs() < 1e-5);
        assert!((b.max.z - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_wall_normals_point_outward() {
        let mesh = extrude_shape(&square(10.0), &flat(1.0)).unwrap();
        let center = Vec3::new(5.0, 5.0, 0.5);
        for tri in mesh.indices.chunks_exact(3) {
            let p = mesh.positions[tri[0] as usize];
            let n = mesh.normals[tri[0] as usize];
            assert!((p - center).dot(n) > 0.0, "normal {:?} at {:?}", n, p);
        }
    }

    #[test]
    fn test_hole_walls_face_into_hole() {
        let mut shape = square(10.0);
        shape.holes.push(vec![
            Vec2::new(3.0, 3.0),
            Vec2::new(3.0, 7.0),
            Vec2::new(7.0, 7.0),
            Vec2::new(7.0, 3.0),
        ]);
        let mesh = extrude_shape(&shape, &flat(1.0)).unwrap();
        let hole_center = Vec3::new(5.0, 5.0, 0.5);
        let inner_walls: Vec<(Vec3, Vec3)> = mesh
            .positions
            .iter()
            .zip(&mesh.normals)
            .filter(|(p, n)| {
                n.z == 0.0 && (3.0..=7.0).contains(&p.x) && (3.0..=7.0).contains(&p.y)
            })
            .map(|(p, n)| (*p, *n))
            .collect();
        assert_eq!(inner_walls.len(), 16);
        for (p, n) in inner_walls {
            assert!((hole_center - p).dot(n) > 0.0, "normal {:?} at {:?}", n, p);
        }
    }
}
