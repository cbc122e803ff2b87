/// Cameras map world-space geometry into camera space (+X right, +Y up,
/// +Z forward) and supply the projection constant for the perspective divide.
use crate::math::Rotate;
use crate::rendering::geometry::AttributedVertex;
use glam::Vec3;

/// Field of view of the first-person camera, in degrees.
pub const FPS_FOV_DEGREES: f32 = 90.0;

/// Pitch limit in degrees; keeps the look vector off the vertical axis.
pub const MAX_PITCH_DEGREES: f32 = 89.0;

/// World-to-camera transform and projection constant.
///
/// Implementors only describe where the camera is and how it is turned; the
/// transforms are shared. Vertices are translated by the negated position,
/// rotated by yaw about Y and then by the negated pitch about X. Directions
/// (normals, light) get the rotation only.
pub trait Camera {
    fn position(&self) -> Vec3;
    fn yaw_degrees(&self) -> f32;
    fn pitch_degrees(&self) -> f32;
    fn fov_degrees(&self) -> f32;

    /// `1 / tan(fov / 2)`.
    #[inline]
    fn projection_constant(&self) -> f32 {
        1.0 / (self.fov_degrees().to_radians() * 0.5).tan()
    }

    #[inline]
    fn rotate_direction(&self, direction: Vec3) -> Vec3 {
        direction
            .rotated_y(self.yaw_degrees().to_radians())
            .rotated_x(-self.pitch_degrees().to_radians())
    }

    #[inline]
    fn to_camera_space(&self, point: Vec3) -> Vec3 {
        self.rotate_direction(point - self.position())
    }

    fn transform_vertices(&self, vertices: &[Vec3]) -> Vec<Vec3> {
        vertices.iter().map(|&v| self.to_camera_space(v)).collect()
    }

    fn transform_attributed_vertices(&self, vertices: &[AttributedVertex]) -> Vec<AttributedVertex> {
        vertices
            .iter()
            .map(|v| AttributedVertex {
                position: self.to_camera_space(v.position),
                uv: v.uv,
                normal: self.rotate_direction(v.normal),
            })
            .collect()
    }

    #[inline]
    fn transform_directional_light(&self, direction: Vec3) -> Vec3 {
        self.rotate_direction(direction)
    }
}

impl<C: Camera + ?Sized> Camera for Box<C> {
    fn position(&self) -> Vec3 {
        (**self).position()
    }

    fn yaw_degrees(&self) -> f32 {
        (**self).yaw_degrees()
    }

    fn pitch_degrees(&self) -> f32 {
        (**self).pitch_degrees()
    }

    fn fov_degrees(&self) -> f32 {
        (**self).fov_degrees()
    }
}

/// Input-driven first-person camera with a fixed 90 degree field of view.
#[derive(Clone, Debug)]
pub struct FpsCamera {
    pub position: Vec3,
    /// Degrees; positive turns right.
    pub yaw: f32,
    /// Degrees; positive looks down.
    pub pitch: f32,

    // Movement state
    pub move_speed: f32,
    /// Degrees per pointer unit.
    pub mouse_sensitivity: f32,
}

impl FpsCamera {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            move_speed: 3.0,
            mouse_sensitivity: 0.15,
        }
    }

    /// World-space forward direction.
    pub fn look_vector(&self) -> Vec3 {
        Vec3::Z
            .rotated_x(self.pitch.to_radians())
            .rotated_y(-self.yaw.to_radians())
    }

    /// World-space right direction, `up x look`. Shrinks as pitch nears the
    /// limit.
    pub fn right_vector(&self) -> Vec3 {
        Vec3::Y.cross(self.look_vector())
    }

    /// Apply a pointer delta.
    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        self.yaw += delta_x * self.mouse_sensitivity;
        self.pitch = (self.pitch + delta_y * self.mouse_sensitivity)
            .clamp(-MAX_PITCH_DEGREES, MAX_PITCH_DEGREES);
    }

    /// Move along the look vector, the right vector and world up.
    pub fn move_local(&mut self, forward: f32, right: f32, up: f32, dt: f32) {
        let move_vec = self.look_vector() * forward + self.right_vector() * right + Vec3::Y * up;
        self.position += move_vec * self.move_speed * dt;
    }
}

impl Camera for FpsCamera {
    #[inline]
    fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    fn yaw_degrees(&self) -> f32 {
        self.yaw
    }

    #[inline]
    fn pitch_degrees(&self) -> f32 {
        self.pitch
    }

    #[inline]
    fn fov_degrees(&self) -> f32 {
        FPS_FOV_DEGREES
    }
}

/// Camera that never moves on its own.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StaticCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
}

impl Default for StaticCamera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            fov: FPS_FOV_DEGREES,
        }
    }
}

impl StaticCamera {
    pub fn new(position: Vec3, fov: f32) -> Self {
        Self {
            position,
            fov,
            ..Self::default()
        }
    }

    pub fn with_orientation(mut self, yaw: f32, pitch: f32) -> Self {
        self.yaw = yaw;
        self.pitch = pitch;
        self
    }
}

impl Camera for StaticCamera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn yaw_degrees(&self) -> f32 {
        self.yaw
    }

    fn pitch_degrees(&self) -> f32 {
        self.pitch
    }

    fn fov_degrees(&self) -> f32 {
        self.fov
    }
}

/// Camera controller - handles input state
#[derive(Default)]
pub struct CameraController {
    pub forward_pressed: bool,
    pub backward_pressed: bool,
    pub left_pressed: bool,
    pub right_pressed: bool,
    pub up_pressed: bool,
    pub down_pressed: bool,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update camera based on controller state
    pub fn update_camera(&self, camera: &mut FpsCamera, dt: f32) {
        let axis = |positive: bool, negative: bool| positive as i32 as f32 - negative as i32 as f32;

        camera.move_local(
            axis(self.forward_pressed, self.backward_pressed),
            axis(self.right_pressed, self.left_pressed),
            axis(self.up_pressed, self.down_pressed),
            dt,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-4
    }

    #[test]
    fn ninety_degree_fov_has_unit_projection_constant() {
        let camera = FpsCamera::new(Vec3::ZERO);
        assert!((camera.projection_constant() - 1.0).abs() < 1e-6);

        let narrow = StaticCamera::new(Vec3::ZERO, 60.0);
        assert!((narrow.projection_constant() - 3f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn point_ahead_lands_on_positive_z() {
        let mut camera = FpsCamera::new(Vec3::new(3.0, 1.0, -2.0));
        camera.yaw = 37.0;
        camera.pitch = -20.0;

        let ahead = camera.position + camera.look_vector() * 5.0;
        let local = camera.to_camera_space(ahead);
        assert!(approx(local, Vec3::new(0.0, 0.0, 5.0)), "got {local:?}");

        let right = camera.position + camera.right_vector().normalize();
        assert!(camera.to_camera_space(right).x > 0.99);
    }

    #[test]
    fn directions_ignore_position() {
        let mut camera = FpsCamera::new(Vec3::new(100.0, -50.0, 7.0));
        camera.yaw = 90.0;

        let light = camera.transform_directional_light(Vec3::X);
        assert!(approx(light, Vec3::new(0.0, 0.0, 1.0)));

        let vertices = camera.transform_attributed_vertices(&[AttributedVertex::new(
            camera.position,
            glam::Vec2::ONE,
            Vec3::X,
        )]);
        assert!(approx(vertices[0].position, Vec3::ZERO));
        assert!(approx(vertices[0].normal, Vec3::Z));
        assert_eq!(vertices[0].uv, glam::Vec2::ONE);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = FpsCamera::new(Vec3::ZERO);
        camera.rotate(0.0, 10_000.0);
        assert_eq!(camera.pitch, MAX_PITCH_DEGREES);
        camera.rotate(0.0, -100_000.0);
        assert_eq!(camera.pitch, -MAX_PITCH_DEGREES);
    }

    #[test]
    fn controller_moves_along_look_vector() {
        let mut camera = FpsCamera::new(Vec3::ZERO);
        camera.yaw = 90.0;
        let controller = CameraController {
            forward_pressed: true,
            ..CameraController::default()
        };

        controller.update_camera(&mut camera, 1.0);

        assert!(approx(camera.position, Vec3::X * camera.move_speed));
    }

    #[test]
    fn boxed_camera_behaves_like_the_inner_one() {
        let inner = StaticCamera::new(Vec3::new(1.0, 2.0, 3.0), 75.0).with_orientation(10.0, 5.0);
        let boxed: Box<dyn Camera> = Box::new(inner);
        let p = Vec3::new(-4.0, 0.5, 9.0);
        assert_eq!(boxed.to_camera_space(p), inner.to_camera_space(p));
        assert_eq!(boxed.projection_constant(), inner.projection_constant());
    }
}
