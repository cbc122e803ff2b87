//! Perspective-correct interpolation against hand-computed values.
use glam::{Vec2, Vec3};
use scanline_renderer::rendering::geometry::cast_vertex;
use scanline_renderer::rendering::{cast_perspective, Polygon, Polygon3D, VertexCasted};
use scanline_renderer::AttributedVertex;

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

/// Screen-space endpoint: cast x/y with camera depth kept in z.
fn screen_vertex(camera_space: Vec3, u: f32) -> AttributedVertex {
    AttributedVertex::new(cast_vertex(camera_space, 1.0), Vec2::new(u, 0.0), Vec3::NEG_Z)
}

#[test]
fn midpoint_in_space_is_three_quarters_on_screen() {
    // (0, 0, 1) -> (0, 2, 3): the world-space midpoint (0, 1, 2) casts to
    // y = 0.5, three quarters of the way along the projected edge.
    let p0 = screen_vertex(Vec3::new(0.0, 0.0, 1.0), 0.0);
    let p1 = screen_vertex(Vec3::new(0.0, 2.0, 3.0), 1.0);
    assert!(close(p1.position.y, 2.0 / 3.0));

    let mid = cast_perspective(&p0, &p1, 0.75);

    assert!(close(mid.position.z, 2.0), "depth {}", mid.position.z);
    assert!(close(mid.uv.x, 0.5), "uv {:?}", mid.uv);
    assert!(close(mid.position.y, 0.5));
}

#[test]
fn endpoints_are_reproduced() {
    let p0 = screen_vertex(Vec3::new(1.0, -1.0, 1.5), 0.2);
    let p1 = screen_vertex(Vec3::new(-2.0, 0.5, 6.0), 0.9);

    let start = cast_perspective(&p0, &p1, 0.0);
    let end = cast_perspective(&p0, &p1, 1.0);

    assert!(close(start.position.z, 1.5) && close(start.uv.x, 0.2));
    assert!(close(end.position.z, 6.0) && close(end.uv.x, 0.9));
    assert!((start.position - p0.position).length() < 1e-5);
    assert!((end.position - p1.position).length() < 1e-5);
}

#[test]
fn stepping_across_a_span_lands_on_the_far_end() {
    let left = AttributedVertex::new(Vec3::new(0.0, 0.0, 2.0), Vec2::new(0.0, 0.0), Vec3::Y);
    let right = AttributedVertex::new(Vec3::new(40.0, 0.0, 8.0), Vec2::new(1.0, 1.0), Vec3::Y);

    let target = VertexCasted::from_vertex(&right);
    let mut current = VertexCasted::from_vertex(&left);
    let delta = current.delta_to(target, 40.0);
    let mut last_depth = current.depth();
    for _ in 0..40 {
        current.step(&delta);
        assert!(current.depth() >= last_depth, "depth must grow toward the far end");
        last_depth = current.depth();
    }

    assert!((current.depth() - 8.0).abs() < 1e-3);
    assert!((current.uv() - Vec2::ONE).length() < 1e-3);
    assert!((current.normal() - Vec3::Y).length() < 1e-3);
}

#[test]
fn unit_fov_projects_square_to_quarter_size() {
    let square: Polygon3D = Polygon::new(vec![
        Vec3::new(-0.5, -0.5, 2.0),
        Vec3::new(0.5, -0.5, 2.0),
        Vec3::new(0.5, 0.5, 2.0),
        Vec3::new(-0.5, 0.5, 2.0),
    ]);

    let cast = square.cast(1.0);

    let expected = [(-0.25, -0.25), (0.25, -0.25), (0.25, 0.25), (-0.25, 0.25)];
    for (v, (x, y)) in cast.vertices.iter().zip(expected) {
        assert!(close(v.x, x) && close(v.y, y), "cast vertex {v:?}");
        assert_eq!(v.z, 2.0, "depth is carried through the cast");
    }

    let screen = square.project(1.0, 100, 100);
    assert!(close(screen.vertices[0].x, 37.5));
    assert!(close(screen.vertices[0].y, 62.5), "+Y is up on screen");
    assert!(close(screen.vertices[2].x, 62.5));
    assert!(close(screen.vertices[2].y, 37.5));
}
