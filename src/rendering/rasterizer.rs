/// Scanline renderer.
///
/// Per draw call: camera transform, back-face cull, frustum clip, perspective
/// divide, screen mapping, scan conversion and span filling. Flat draws write
/// color only; mapped draws are depth tested, textured and lit.
use super::clipper::{clip_frustum, DEFAULT_NEAR_Z};
use super::depth_buffer::DepthBuffer;
use super::geometry::{
    is_front_facing, AttributedPolygon, AttributedVertex, Cube, IndexedTriangle, Polygon,
    Polygon2D, Triangle, Vertex,
};
use super::line::draw_outline;
use super::scanline::{scan_lines, scan_lines_attributed};
use super::shading::{cast_perspective, ShadingConfig, VertexCasted};
use super::surface::{Color, PixelSource, PixelTarget};
use crate::camera::Camera;
use crate::{count_add, count_call, perf_scope};
use glam::{Vec2, Vec3};
use std::ops::AddAssign;

/// Renderer settings.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// Camera-space depth of the near clip plane. Must not be negative.
    pub near_z: f32,
    pub backface_culling: bool,
    /// Fill for the flat (untextured) draw calls.
    pub fill_color: Color,
    pub outline_color: Color,
    /// Outline every polygon drawn by `draw_mapped_triangles_3d`.
    pub wireframe: bool,
    pub shading: ShadingConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            near_z: DEFAULT_NEAR_Z,
            backface_culling: true,
            fill_color: Color::new(128, 0, 0),
            outline_color: Color::BLACK,
            wireframe: false,
            shading: ShadingConfig::default(),
        }
    }
}

/// What happened to the triangles of one draw call.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub triangles_submitted: usize,
    /// Skipped because an index was out of range.
    pub triangles_invalid: usize,
    pub triangles_culled: usize,
    /// Entirely outside the view volume.
    pub triangles_clipped: usize,
    pub polygons_drawn: usize,
    pub pixels_written: usize,
}

impl AddAssign for DrawStats {
    fn add_assign(&mut self, rhs: Self) {
        self.triangles_submitted += rhs.triangles_submitted;
        self.triangles_invalid += rhs.triangles_invalid;
        self.triangles_culled += rhs.triangles_culled;
        self.triangles_clipped += rhs.triangles_clipped;
        self.polygons_drawn += rhs.polygons_drawn;
        self.pixels_written += rhs.pixels_written;
    }
}

/// Rendering context: owns the camera, configuration and depth buffer.
/// Surfaces and textures stay with the caller.
pub struct Renderer<C: Camera> {
    camera: C,
    config: RenderConfig,
    depth: DepthBuffer,
}

impl<C: Camera> Renderer<C> {
    pub fn new(camera: C) -> Self {
        Self::with_config(camera, RenderConfig::default())
    }

    pub fn with_config(camera: C, config: RenderConfig) -> Self {
        Self {
            camera,
            config,
            depth: DepthBuffer::new(0, 0),
        }
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut C {
        &mut self.camera
    }

    pub fn set_camera(&mut self, camera: C) {
        self.camera = camera;
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut RenderConfig {
        &mut self.config
    }

    /// World-space direction the light travels.
    pub fn set_directional_light(&mut self, direction: Vec3) {
        self.config.shading.light_dir = direction;
    }

    /// Match the depth buffer to the target surface. Resets all depths.
    pub fn set_z_buffer_size(&mut self, width: usize, height: usize) {
        self.depth.resize(width, height);
    }

    /// Reset depths for a new frame. Not done implicitly.
    pub fn clear_z_buffer(&mut self) {
        self.depth.clear();
    }

    pub fn depth_buffer(&self) -> &DepthBuffer {
        &self.depth
    }

    /// Flat-filled triangles. No depth test: later triangles overwrite
    /// earlier ones.
    pub fn draw_triangles_3d<S>(
        &self,
        surface: &mut S,
        vertices: &[Vec3],
        indices: &[IndexedTriangle],
        outline: bool,
    ) -> DrawStats
    where
        S: PixelTarget + ?Sized,
    {
        count_call!(draw_calls);
        let mut stats = DrawStats::default();
        let (width, height) = (surface.width(), surface.height());
        let dfc = self.camera.projection_constant();

        let camera_space = self.camera.transform_vertices(vertices);
        for polygon in self.visible_polygons(&camera_space, indices, dfc, &mut stats) {
            let screen = polygon.project(dfc, width, height).to_2d();
            stats.pixels_written += self.draw_polygon(surface, &screen, self.config.fill_color, outline);
            stats.polygons_drawn += 1;
        }

        log::trace!("draw_triangles_3d: {stats:?}");
        stats
    }

    /// Textured, lit, depth-tested triangles.
    pub fn draw_mapped_triangles_3d<S, T>(
        &mut self,
        surface: &mut S,
        vertices: &[AttributedVertex],
        indices: &[IndexedTriangle],
        texture: &T,
    ) -> DrawStats
    where
        S: PixelTarget + ?Sized,
        T: PixelSource + ?Sized,
    {
        perf_scope!("draw_mapped_triangles_3d");
        count_call!(draw_calls);
        let mut stats = DrawStats::default();
        let (width, height) = (surface.width(), surface.height());
        let dfc = self.camera.projection_constant();

        let camera_space = self.camera.transform_attributed_vertices(vertices);
        let polygons = self.visible_polygons(&camera_space, indices, dfc, &mut stats);
        let outline = self.config.wireframe;
        for polygon in polygons {
            let screen = polygon.project(dfc, width, height);
            stats.pixels_written += self.draw_polygon_mapped(surface, &screen, texture, outline);
            stats.polygons_drawn += 1;
        }

        log::trace!("draw_mapped_triangles_3d: {stats:?}");
        stats
    }

    /// Fill a screen-space polygon with one color. Returns the number of
    /// pixel writes.
    pub fn draw_polygon<S>(&self, surface: &mut S, polygon: &Polygon2D, color: Color, outline: bool) -> usize
    where
        S: PixelTarget + ?Sized,
    {
        let mut written = 0;
        for line in scan_lines(polygon, surface.width(), surface.height()) {
            for x in line.start_x..=line.end_x {
                surface.set_pixel(x, line.y, color);
            }
            written += (line.end_x - line.start_x + 1) as usize;
        }

        if outline {
            draw_outline(surface, &polygon.vertices, self.config.outline_color);
        }
        written
    }

    /// Fill a screen-space polygon (x/y in pixels, z = camera depth) with
    /// perspective-correct texture and lighting, subject to the depth buffer.
    /// Returns the number of pixels that passed the depth test.
    pub fn draw_polygon_mapped<S, T>(
        &mut self,
        surface: &mut S,
        polygon: &AttributedPolygon,
        texture: &T,
        outline: bool,
    ) -> usize
    where
        S: PixelTarget + ?Sized,
        T: PixelSource + ?Sized,
    {
        let shading = self.config.shading;
        let light_dir = self.camera.transform_directional_light(shading.light_dir);
        let vertices = &polygon.vertices;
        let n = vertices.len();
        let mut written = 0;

        for line in scan_lines_attributed(polygon, surface.width(), surface.height()) {
            let y = line.y as f32;
            let left = edge_point(&vertices[line.left_edge], &vertices[(line.left_edge + 1) % n], y);
            let right = edge_point(&vertices[line.right_edge], &vertices[(line.right_edge + 1) % n], y);

            // Edge values sit at the exact crossings; the first pixel may be
            // up to a pixel inside them, or far inside when clamped.
            let left = VertexCasted::from_vertex(&left);
            let right = VertexCasted::from_vertex(&right);
            let span = line.right_x - line.left_x;
            let delta = left.delta_to(right, span);
            let mut current = if span > 0.0 {
                left.lerp(right, (line.start_x as f32 - line.left_x) / span)
            } else {
                left
            };

            for x in line.start_x..=line.end_x {
                let z = current.depth();
                if self.depth.test_and_set(x as usize, line.y as usize, z) {
                    let base = texture.get_pixel_uv(current.uv());
                    let light = shading.light_intensity(current.normal(), light_dir);
                    surface.set_pixel(x, line.y, shading.shade(base, light));
                    written += 1;
                }
                current.step(&delta);
            }
        }

        if outline {
            let points: Vec<Vec2> = vertices.iter().map(|v| v.position.truncate()).collect();
            draw_outline(surface, &points, self.config.outline_color);
        }
        written
    }

    /// Flat 2D triangle from the x/y of a screen-space triangle.
    pub fn draw_triangle<S>(&self, surface: &mut S, triangle: &Triangle, color: Color) -> usize
    where
        S: PixelTarget + ?Sized,
    {
        let polygon = Polygon::new(triangle.vertices.iter().map(|v| v.truncate()).collect());
        self.draw_polygon(surface, &polygon, color, false)
    }

    /// Flat-filled cube through `draw_triangles_3d`.
    pub fn draw_cube<S>(&self, surface: &mut S, cube: &Cube, outline: bool) -> DrawStats
    where
        S: PixelTarget + ?Sized,
    {
        self.draw_triangles_3d(surface, &cube.vertices(), &Cube::indices(), outline)
    }

    /// Resolve, cull and clip camera-space triangles.
    fn visible_polygons<V: Vertex>(
        &self,
        vertices: &[V],
        indices: &[IndexedTriangle],
        dfc: f32,
        stats: &mut DrawStats,
    ) -> Vec<Polygon<V>> {
        stats.triangles_submitted += indices.len();
        count_add!(triangles_submitted, indices.len());

        let near_z = self.config.near_z;
        debug_assert!(near_z >= 0.0, "near plane {near_z} is behind the eye");
        if near_z < 0.0 {
            log::warn!("skipping {} triangles: near plane {near_z} is behind the eye", indices.len());
            stats.triangles_invalid += indices.len();
            return Vec::new();
        }

        let mut polygons = Vec::with_capacity(indices.len());
        for triangle in indices {
            let Some(resolved) = triangle.resolve(vertices) else {
                debug_assert!(
                    false,
                    "triangle {:?} indexes past {} vertices",
                    triangle.indices,
                    vertices.len()
                );
                log::warn!(
                    "skipping triangle {:?}: index out of range for {} vertices",
                    triangle.indices,
                    vertices.len()
                );
                stats.triangles_invalid += 1;
                continue;
            };
            let triangle = Triangle { vertices: resolved };

            if self.config.backface_culling && !is_front_facing(&triangle.positions(), dfc) {
                stats.triangles_culled += 1;
                count_call!(triangles_culled);
                continue;
            }

            let clipped = clip_frustum(&triangle.to_polygon(), near_z, dfc);
            if clipped.is_degenerate() {
                stats.triangles_clipped += 1;
                count_call!(triangles_clipped_away);
                continue;
            }
            count_call!(polygons_rasterized);
            polygons.push(clipped);
        }
        polygons
    }
}

/// Perspective-correct point on edge `v1 -> v2` at row `y`.
#[inline]
fn edge_point(v1: &AttributedVertex, v2: &AttributedVertex, y: f32) -> AttributedVertex {
    let dy = v2.position.y - v1.position.y;
    let t = if dy == 0.0 {
        0.0
    } else {
        ((y - v1.position.y) / dy).clamp(0.0, 1.0)
    };
    cast_perspective(v1, v2, t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::StaticCamera;
    use crate::rendering::surface::PixelSurface;

    fn quad_facing_camera(z: f32, half: f32) -> (Vec<AttributedVertex>, Vec<IndexedTriangle>) {
        let corner = |x: f32, y: f32, uv: Vec2| {
            AttributedVertex::new(Vec3::new(x, y, z), uv, Vec3::NEG_Z)
        };
        let vertices = vec![
            corner(-half, -half, Vec2::new(0.0, 1.0)),
            corner(half, -half, Vec2::new(1.0, 1.0)),
            corner(half, half, Vec2::new(1.0, 0.0)),
            corner(-half, half, Vec2::new(0.0, 0.0)),
        ];
        let indices = vec![IndexedTriangle::new(0, 1, 2), IndexedTriangle::new(0, 2, 3)];
        (vertices, indices)
    }

    fn renderer(width: usize, height: usize) -> Renderer<StaticCamera> {
        let mut renderer = Renderer::new(StaticCamera::default());
        renderer.set_z_buffer_size(width, height);
        renderer
    }

    #[test]
    fn flat_draw_fills_center_of_screen() {
        let renderer = renderer(32, 32);
        let mut surface = PixelSurface::new(32, 32);
        let (vertices, indices) = quad_facing_camera(2.0, 0.5);
        let positions: Vec<Vec3> = vertices.iter().map(|v| v.position).collect();

        let stats = renderer.draw_triangles_3d(&mut surface, &positions, &indices, false);

        assert_eq!(stats.polygons_drawn, 2);
        assert_eq!(surface.get_pixel(16, 16), Some(Color::new(128, 0, 0)));
        assert_eq!(surface.get_pixel(1, 1), Some(Color::BLACK));
    }

    #[test]
    fn reversed_winding_is_culled() {
        let renderer = renderer(16, 16);
        let mut surface = PixelSurface::new(16, 16);
        let (vertices, indices) = quad_facing_camera(2.0, 0.5);
        let positions: Vec<Vec3> = vertices.iter().map(|v| v.position).collect();
        let reversed: Vec<_> = indices.iter().map(|t| t.reversed()).collect();

        let stats = renderer.draw_triangles_3d(&mut surface, &positions, &reversed, false);

        assert_eq!(stats.triangles_culled, 2);
        assert_eq!(stats.pixels_written, 0);
    }

    #[test]
    fn geometry_behind_camera_is_clipped_away() {
        let mut renderer = renderer(16, 16);
        let mut surface = PixelSurface::new(16, 16);
        let (vertices, indices) = quad_facing_camera(-3.0, 0.5);
        let texture = PixelSurface::from_fn(2, 2, |_, _| Color::WHITE);

        renderer.config_mut().backface_culling = false;
        let stats = renderer.draw_mapped_triangles_3d(&mut surface, &vertices, &indices, &texture);

        assert_eq!(stats.triangles_clipped, 2);
        assert_eq!(stats.pixels_written, 0);
    }

    #[test]
    fn nearer_quad_wins_regardless_of_order() {
        let red = PixelSurface::from_fn(2, 2, |_, _| Color::new(255, 0, 0));
        let blue = PixelSurface::from_fn(2, 2, |_, _| Color::new(0, 0, 255));
        let (near, indices) = quad_facing_camera(2.0, 0.5);
        let (far, _) = quad_facing_camera(4.0, 4.0);

        let mut renderer = renderer(32, 32);
        renderer.set_directional_light(Vec3::Z);
        let mut surface = PixelSurface::new(32, 32);

        renderer.draw_mapped_triangles_3d(&mut surface, &near, &indices, &red);
        renderer.draw_mapped_triangles_3d(&mut surface, &far, &indices, &blue);

        let center = surface.get_pixel(16, 16).unwrap();
        assert!(center.r > 0 && center.b == 0, "near red quad must stay in front");
        let edge = surface.get_pixel(2, 16).unwrap();
        assert!(edge.b > 0, "far quad still visible outside the near one");
    }

    #[test]
    fn lighting_scales_texture() {
        let white = PixelSurface::from_fn(2, 2, |_, _| Color::WHITE);
        let (vertices, indices) = quad_facing_camera(2.0, 0.5);
        let mut surface = PixelSurface::new(16, 16);

        // Light travels toward the viewer: only the ambient term remains.
        let mut renderer = renderer(16, 16);
        renderer.set_directional_light(Vec3::NEG_Z);
        renderer.draw_mapped_triangles_3d(&mut surface, &vertices, &indices, &white);
        assert_eq!(surface.get_pixel(8, 8), Some(Color::new(75, 75, 75)));

        // Light from behind the viewer.
        renderer.set_directional_light(Vec3::Z);
        renderer.clear_z_buffer();
        renderer.draw_mapped_triangles_3d(&mut surface, &vertices, &indices, &white);
        assert_eq!(surface.get_pixel(8, 8), Some(Color::WHITE));
    }

    #[test]
    fn clamped_span_keeps_depth_of_the_visible_part() {
        // Screen-space quad twice as wide as the target; depth runs 1 -> 3
        // from left to right, so 1/z is linear in screen x.
        let corner = |x: f32, y: f32, z: f32| AttributedVertex::new(Vec3::new(x, y, z), Vec2::ZERO, Vec3::NEG_Z);
        let polygon = AttributedPolygon::new(vec![
            corner(-100.0, 0.0, 1.0),
            corner(100.0, 0.0, 3.0),
            corner(100.0, 10.0, 3.0),
            corner(-100.0, 10.0, 1.0),
        ]);
        let mut renderer = renderer(100, 10);
        let mut surface = PixelSurface::new(100, 10);
        let white = PixelSurface::from_fn(2, 2, |_, _| Color::WHITE);

        let written = renderer.draw_polygon_mapped(&mut surface, &polygon, &white, false);

        assert_eq!(written, 100 * 10);
        let depth_at = |x: usize| renderer.depth_buffer().get(x, 5).unwrap();
        // x = 0 is halfway across: 1/z = (1 + 1/3) / 2.
        assert!((depth_at(0) - 1.5).abs() < 1e-3, "depth at left edge {}", depth_at(0));
        assert!((depth_at(50) - 2.0).abs() < 1e-3, "depth at x = 50 {}", depth_at(50));
        assert!(depth_at(99) < 3.0);
    }

    #[test]
    fn span_starts_at_the_first_covered_pixel_not_the_crossing() {
        // Depth 2 -> 4 between x = 0.5 and x = 8.5; pixel 1 is 1/16 of the way.
        let corner = |x: f32, y: f32, z: f32| AttributedVertex::new(Vec3::new(x, y, z), Vec2::ZERO, Vec3::NEG_Z);
        let polygon = AttributedPolygon::new(vec![
            corner(0.5, 0.0, 2.0),
            corner(8.5, 0.0, 4.0),
            corner(8.5, 4.0, 4.0),
            corner(0.5, 4.0, 2.0),
        ]);
        let mut renderer = renderer(16, 8);
        let mut surface = PixelSurface::new(16, 8);
        let white = PixelSurface::from_fn(2, 2, |_, _| Color::WHITE);

        renderer.draw_polygon_mapped(&mut surface, &polygon, &white, false);

        let inv_z = 0.5 + (0.25 - 0.5) / 16.0;
        let depth = renderer.depth_buffer().get(1, 2).unwrap();
        assert!((depth - 1.0 / inv_z).abs() < 1e-4, "depth at x = 1 is {depth}");
    }

    #[test]
    fn screen_triangle_ignores_depth() {
        let renderer = renderer(16, 16);
        let mut surface = PixelSurface::new(16, 16);
        let green = Color::new(0, 255, 0);
        let triangle = Triangle::new(
            Vec3::new(2.0, 2.0, -50.0),
            Vec3::new(12.0, 2.0, 0.0),
            Vec3::new(2.0, 12.0, 900.0),
        );

        let written = renderer.draw_triangle(&mut surface, &triangle, green);

        let filled = (0..16)
            .flat_map(|y| (0..16).map(move |x| (x, y)))
            .filter(|&(x, y)| surface.get_pixel(x, y) == Some(green))
            .count();
        assert_eq!(written, filled);
        assert_eq!(surface.get_pixel(4, 4), Some(green));
        assert_eq!(surface.get_pixel(11, 11), Some(Color::BLACK));
    }

    #[test]
    fn cube_in_front_shows_one_face() {
        let renderer = renderer(32, 32);
        let mut surface = PixelSurface::new(32, 32);

        let stats = renderer.draw_cube(&mut surface, &Cube::new(1.0, Vec3::new(0.0, 0.0, 2.0)), false);

        assert_eq!(stats.triangles_submitted, 12);
        assert_eq!(stats.polygons_drawn, 2);
        assert_eq!(stats.triangles_culled, 10);
        assert_eq!(surface.get_pixel(16, 16), Some(Color::new(128, 0, 0)));
        assert_eq!(surface.get_pixel(1, 1), Some(Color::BLACK));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "indexes past")]
    fn out_of_range_index_is_a_debug_contract_violation() {
        let renderer = renderer(8, 8);
        let mut surface = PixelSurface::new(8, 8);
        renderer.draw_triangles_3d(
            &mut surface,
            &[Vec3::Z, Vec3::X + Vec3::Z],
            &[IndexedTriangle::new(0, 1, 2)],
            false,
        );
    }

    #[test]
    fn outline_uses_outline_color() {
        let mut renderer = renderer(16, 16);
        renderer.config_mut().outline_color = Color::WHITE;
        let mut surface = PixelSurface::new(16, 16);
        let square = Polygon2D::new(vec![
            Vec2::new(2.0, 2.0),
            Vec2::new(12.0, 2.0),
            Vec2::new(12.0, 12.0),
            Vec2::new(2.0, 12.0),
        ]);

        renderer.draw_polygon(&mut surface, &square, Color::new(0, 255, 0), true);

        assert_eq!(surface.get_pixel(2, 7), Some(Color::WHITE));
        assert_eq!(surface.get_pixel(7, 7), Some(Color::new(0, 255, 0)));
    }
}
