use glam::{Vec2, Vec3};

/// Axis rotations used by the camera and mesh helpers.
///
/// Sign convention (angles in radians):
/// - X: `y' = y cos a - z sin a`, `z' = y sin a + z cos a`
/// - Y: `x' = x cos a - z sin a`, `z' = x sin a + z cos a`
/// - Z: `x' = x cos a - y sin a`, `y' = x sin a + y cos a`
pub trait Rotate {
    fn rotated_x(self, radians: f32) -> Self;
    fn rotated_y(self, radians: f32) -> Self;
    fn rotated_z(self, radians: f32) -> Self;

    /// Rotate about Y, then X, then Z by the components of `radians`.
    #[inline]
    fn rotated_yxz(self, radians: Vec3) -> Self
    where
        Self: Sized,
    {
        self.rotated_y(radians.y)
            .rotated_x(radians.x)
            .rotated_z(radians.z)
    }
}

impl Rotate for Vec3 {
    #[inline]
    fn rotated_x(self, radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Vec3::new(
            self.x,
            self.y * cos - self.z * sin,
            self.y * sin + self.z * cos,
        )
    }

    #[inline]
    fn rotated_y(self, radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Vec3::new(
            self.x * cos - self.z * sin,
            self.y,
            self.x * sin + self.z * cos,
        )
    }

    #[inline]
    fn rotated_z(self, radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Vec3::new(
            self.x * cos - self.y * sin,
            self.x * sin + self.y * cos,
            self.z,
        )
    }
}

/// X coordinate where the line through `start` with direction `dir` crosses
/// the horizontal line `y`. Returns `None` for horizontal directions.
#[inline]
pub fn x_at_y(dir: Vec2, start: Vec2, y: f32) -> Option<f32> {
    if dir.y == 0.0 {
        return None;
    }
    Some(start.x + (y - start.y) * dir.x / dir.y)
}
