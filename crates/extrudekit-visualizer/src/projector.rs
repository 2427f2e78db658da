//! Projection of the scene into depth-sorted, shaded screen triangles.
//!
//! Both exporters draw from the same [`RenderList`], so vector and raster
//! output agree with each other and with the live camera.

use extrudekit_designer::Side;
use glam::{Mat3, Vec2, Vec3};

use crate::scene::Scene;
use crate::shading::{shade, Shade};

/// One flat-shaded triangle in surface pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPolygon {
    pub points: [Vec2; 3],
    /// Mean clip-space `w`; larger is farther from the camera
    pub depth: f32,
    pub shade: Shade,
}

/// Painter-ordered triangles, farthest first
#[derive(Debug, Clone, Default)]
pub struct RenderList {
    pub width: u32,
    pub height: u32,
    pub polygons: Vec<RenderPolygon>,
}

impl RenderList {
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}

/// Project the scene's model through its camera onto a `width`×`height`
/// surface
pub fn project_scene(scene: &Scene, width: u32, height: u32) -> RenderList {
    let mut list = RenderList {
        width,
        height,
        polygons: Vec::new(),
    };
    let Some(model) = scene.model() else {
        return list;
    };
    if width == 0 || height == 0 {
        return list;
    }

    let mut camera = scene.camera;
    camera.update_aspect_ratio(width as f32, height as f32);
    let view_projection = camera.view_projection();
    let eye = camera.position;
    let (w, h) = (width as f32, height as f32);
    let normal_matrix = Mat3::from_mat4(model.root.inverse().transpose());

    for scene_mesh in &model.meshes {
        let material = &scene_mesh.material;
        for tri in scene_mesh.mesh.indices.chunks_exact(3) {
            let local = [
                scene_mesh.mesh.positions[tri[0] as usize],
                scene_mesh.mesh.positions[tri[1] as usize],
                scene_mesh.mesh.positions[tri[2] as usize],
            ];
            let world = local.map(|p| model.root.transform_point3(p));

            let mut normal = face_normal(world[0], world[1], world[2]);
            if normal == Vec3::ZERO {
                continue;
            }
            // Keep the stored orientation when the transform mirrors
            let stored = normal_matrix * scene_mesh.mesh.normals[tri[0] as usize];
            if stored.dot(normal) < 0.0 {
                normal = -normal;
            }

            let centroid = (world[0] + world[1] + world[2]) / 3.0;
            if normal.dot(eye - centroid) <= 0.0 {
                match material.side {
                    Side::Front => continue,
                    Side::Double => normal = -normal,
                }
            }

            let clip = world.map(|p| view_projection * p.extend(1.0));
            if clip.iter().any(|c| c.w <= camera.near) {
                continue;
            }
            let points = clip.map(|c| {
                let ndc = c.truncate() / c.w;
                Vec2::new((ndc.x + 1.0) * 0.5 * w, (1.0 - ndc.y) * 0.5 * h)
            });
            if off_screen(&points, w, h) {
                continue;
            }

            list.polygons.push(RenderPolygon {
                points,
                depth: (clip[0].w + clip[1].w + clip[2].w) / 3.0,
                shade: shade(material, &scene.lights, centroid, normal, eye),
            });
        }
    }

    list.polygons.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    tracing::debug!(
        "Projected {} triangles onto {}x{}",
        list.polygons.len(),
        width,
        height
    );
    list
}

fn off_screen(points: &[Vec2; 3], w: f32, h: f32) -> bool {
    points.iter().all(|p| p.x < 0.0)
        || points.iter().all(|p| p.x > w)
        || points.iter().all(|p| p.y < 0.0)
        || points.iter().all(|p| p.y > h)
}

/// Unit normal of a triangle, zero when degenerate
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Model, SceneMesh};
    use extrudekit_core::ModelKind;
    use extrudekit_designer::{MeshData, PhysicalMaterial};
    use extrudekit_settings::ParameterStore;
    use glam::Mat4;

    fn quad(z: f32, side: Side) -> SceneMesh {
        let mut mesh = MeshData::new();
        let n = Vec3::Z;
        let a = mesh.push_vertex(Vec3::new(-1.0, -1.0, z), n);
        let b = mesh.push_vertex(Vec3::new(1.0, -1.0, z), n);
        let c = mesh.push_vertex(Vec3::new(1.0, 1.0, z), n);
        let d = mesh.push_vertex(Vec3::new(-1.0, 1.0, z), n);
        mesh.push_triangle(a, b, c);
        mesh.push_triangle(a, c, d);
        let mut material = PhysicalMaterial::for_solid(&ParameterStore::default(), None);
        material.side = side;
        SceneMesh {
            mesh,
            material,
            cast_shadow: true,
            receive_shadow: true,
        }
    }

    fn scene_with(meshes: Vec<SceneMesh>) -> Scene {
        let mut scene = Scene::default();
        scene.set_model(Model::from_meshes(ModelKind::Solid, Mat4::IDENTITY, meshes, "quad"));
        scene.camera.position = Vec3::new(0.0, 0.0, 5.0);
        scene.camera.look_at(Vec3::ZERO);
        scene
    }

    #[test]
    fn test_empty_scene_projects_nothing() {
        assert!(project_scene(&Scene::default(), 100, 100).is_empty());
    }

    #[test]
    fn test_quad_projects_inside_surface() {
        let scene = scene_with(vec![quad(0.0, Side::Front)]);
        let list = project_scene(&scene, 200, 100);
        assert_eq!(list.len(), 2);
        for poly in &list.polygons {
            for p in poly.points {
                assert!(p.x > 0.0 && p.x < 200.0 && p.y > 0.0 && p.y < 100.0);
            }
        }
    }

    #[test]
    fn test_back_faces_follow_material_side() {
        let mut scene = scene_with(vec![quad(0.0, Side::Front)]);
        scene.camera.position = Vec3::new(0.0, 0.0, -5.0);
        assert!(project_scene(&scene, 100, 100).is_empty());

        let mut scene = scene_with(vec![quad(0.0, Side::Double)]);
        scene.camera.position = Vec3::new(0.0, 0.0, -5.0);
        assert_eq!(project_scene(&scene, 100, 100).len(), 2);
    }

    #[test]
    fn test_far_polygons_drawn_first() {
        let scene = scene_with(vec![quad(1.0, Side::Front), quad(-1.0, Side::Front)]);
        let list = project_scene(&scene, 100, 100);
        assert_eq!(list.len(), 4);
        assert!(list.polygons.windows(2).all(|w| w[0].depth >= w[1].depth));
    }

    #[test]
    fn test_face_normal() {
        assert_eq!(face_normal(Vec3::ZERO, Vec3::X, Vec3::Y), Vec3::Z);
        assert_eq!(face_normal(Vec3::ZERO, Vec3::X, Vec3::X * 2.0), Vec3::ZERO);
    }
}
