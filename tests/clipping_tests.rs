//! Frustum clipping properties, checked over seeded random triangles.
use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use scanline_renderer::rendering::{clip_frustum, clip_near, clip_side, Polygon, Polygon3D};
use scanline_renderer::AttributedVertex;

const NEAR_Z: f32 = 0.5;
const ITERATIONS: usize = 2_000;

fn random_point(rng: &mut ChaCha8Rng) -> Vec3 {
    Vec3::new(
        rng.gen_range(-6.0..6.0),
        rng.gen_range(-6.0..6.0),
        rng.gen_range(-4.0..8.0),
    )
}

fn random_triangle(rng: &mut ChaCha8Rng) -> Polygon3D {
    Polygon::new(vec![random_point(rng), random_point(rng), random_point(rng)])
}

/// Slack that grows with the coordinates involved.
fn slack(p: Vec3) -> f32 {
    1e-4 * (1.0 + p.abs().max_element())
}

#[test]
fn clipped_vertices_stay_inside_the_frustum() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed_c11b);

    for i in 0..ITERATIONS {
        let dfc = rng.gen_range(0.5..3.0);
        let triangle = random_triangle(&mut rng);
        let clipped = clip_frustum(&triangle, NEAR_Z, dfc);

        for p in &clipped.vertices {
            assert!(
                p.z >= NEAR_Z - slack(*p),
                "iteration {i}: vertex {p:?} in front of near plane (input {:?})",
                triangle.vertices
            );
            assert!(
                p.x.abs() * dfc <= p.z + slack(*p),
                "iteration {i}: vertex {p:?} outside side planes for dfc {dfc} (input {:?})",
                triangle.vertices
            );
        }
    }
}

#[test]
fn clipping_never_leaves_a_fragment() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    for i in 0..ITERATIONS {
        let triangle = random_triangle(&mut rng);
        let near = clip_near(&triangle, NEAR_Z);
        let frustum = clip_frustum(&triangle, NEAR_Z, 1.0);

        for (label, polygon) in [("near", &near), ("frustum", &frustum)] {
            assert!(
                polygon.len() == 0 || polygon.len() >= 3,
                "iteration {i}: {label} clip produced {} vertices",
                polygon.len()
            );
        }
    }
}

#[test]
fn fully_visible_triangle_is_unchanged() {
    let triangle = Polygon::new(vec![
        Vec3::new(-0.5, -0.5, 2.0),
        Vec3::new(0.5, -0.5, 2.0),
        Vec3::new(0.0, 0.5, 2.0),
    ]);
    assert_eq!(clip_frustum(&triangle, NEAR_Z, 1.0), triangle);
}

#[test]
fn triangle_behind_the_eye_disappears() {
    let triangle = Polygon::new(vec![
        Vec3::new(-1.0, 0.0, -1.0),
        Vec3::new(1.0, 0.0, -1.0),
        Vec3::new(0.0, 1.0, -3.0),
    ]);
    assert!(clip_frustum(&triangle, NEAR_Z, 1.0).is_empty());
}

#[test]
fn dipping_vertex_becomes_two_crossings() {
    let triangle = Polygon::new(vec![
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(1.0, 0.0, -1.0),
        Vec3::new(1.0, 1.0, 1.0),
    ]);
    let clipped = clip_near(&triangle, NEAR_Z);

    assert_eq!(clipped.len(), 4);
    let close = |a: Vec3, b: Vec3| (a - b).length() < 1e-5;
    assert!(close(clipped.vertices[1], Vec3::new(0.25, 0.0, 0.5)));
    assert!(clipped.vertices.iter().any(|&v| close(v, Vec3::new(1.0, 0.75, 0.5))));
}

#[test]
fn side_planes_are_mirror_images() {
    let wide = Polygon::new(vec![
        Vec3::new(-10.0, 0.0, 2.0),
        Vec3::new(10.0, 0.0, 2.0),
        Vec3::new(0.0, 1.0, 2.0),
    ]);

    let left = clip_side(&wide, 1.0);
    let right = clip_side(&wide, -1.0);

    let min_x = left.vertices.iter().map(|v| v.x).fold(f32::INFINITY, f32::min);
    let max_x = right.vertices.iter().map(|v| v.x).fold(f32::NEG_INFINITY, f32::max);
    assert!((min_x + 2.0).abs() < 1e-5, "left cut at {min_x}");
    assert!((max_x - 2.0).abs() < 1e-5, "right cut at {max_x}");
}

#[test]
fn attributes_follow_the_cut() {
    let vertex = |position: Vec3, u: f32| AttributedVertex::new(position, Vec2::new(u, 0.0), Vec3::NEG_Z);
    let triangle = Polygon::new(vec![
        vertex(Vec3::new(0.0, 0.0, 0.0), 0.0),
        vertex(Vec3::new(0.0, 0.0, 2.0), 1.0),
        vertex(Vec3::new(0.0, 1.0, 2.0), 1.0),
    ]);

    let clipped = clip_near(&triangle, NEAR_Z);

    assert_eq!(clipped.len(), 4);
    for v in &clipped.vertices {
        // uv.x tracks z / 2 along every edge of this triangle.
        assert!(
            (v.uv.x - v.position.z * 0.5).abs() < 1e-5,
            "uv {:?} does not match position {:?}",
            v.uv,
            v.position
        );
        assert!(v.position.z >= NEAR_Z - 1e-6);
    }
}
