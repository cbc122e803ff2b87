/// Lighting and perspective-correct attribute interpolation.
/// Kept separate from the span loop so the lighting model can change
/// without touching rasterization.
use super::geometry::{AttributedVertex, EYE_PLANE_EPSILON};
use super::surface::Color;
use glam::{Vec2, Vec3};

/// Directional + ambient lighting.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShadingConfig {
    /// Direction the light travels, world space. Not normalized; its length
    /// scales the diffuse term.
    pub light_dir: Vec3,
    /// Constant term added to every fragment.
    pub ambient: f32,
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            // Down, left and into the screen.
            light_dir: Vec3::new(-0.707, -0.707, -0.707),
            ambient: 0.3,
        }
    }
}

impl ShadingConfig {
    /// Light factor in `[0, 1]` for a surface normal, with `light_dir` already
    /// in the same space as `normal`.
    #[inline]
    pub fn light_intensity(&self, normal: Vec3, light_dir: Vec3) -> f32 {
        let lambert = normal.normalize_or_zero().dot(-light_dir).max(0.0);
        (lambert + self.ambient).clamp(0.0, 1.0)
    }

    /// Scale a color by a light factor using 8.8 fixed point.
    #[inline]
    pub fn shade(&self, base: Color, light: f32) -> Color {
        let light_fp = (light.clamp(0.0, 1.0) * 256.0) as u32;
        let channel = |c: u8| ((c as u32 * light_fp) >> 8).min(255) as u8;
        Color::new(channel(base.r), channel(base.g), channel(base.b))
    }
}

/// Attributes divided by depth. These vary linearly in screen space, so they
/// can be stepped across a span and divided back per pixel.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct VertexCasted {
    pub inv_z: f32,
    pub uv_over_z: Vec2,
    pub normal_over_z: Vec3,
}

impl VertexCasted {
    /// `v.position.z` is camera depth; x/y are ignored.
    #[inline]
    pub fn from_vertex(v: &AttributedVertex) -> Self {
        let z = v.position.z.max(EYE_PLANE_EPSILON);
        let inv_z = 1.0 / z;
        Self {
            inv_z,
            uv_over_z: v.uv * inv_z,
            normal_over_z: v.normal * inv_z,
        }
    }

    #[inline]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            inv_z: self.inv_z + (other.inv_z - self.inv_z) * t,
            uv_over_z: self.uv_over_z.lerp(other.uv_over_z, t),
            normal_over_z: self.normal_over_z.lerp(other.normal_over_z, t),
        }
    }

    /// Per-pixel increment from `self` to `other` over a screen distance of
    /// `span` pixels. A zero (or negative) span gives a zero increment.
    #[inline]
    pub fn delta_to(self, other: Self, span: f32) -> Self {
        if span <= 0.0 {
            return Self::default();
        }
        let inv = 1.0 / span;
        Self {
            inv_z: (other.inv_z - self.inv_z) * inv,
            uv_over_z: (other.uv_over_z - self.uv_over_z) * inv,
            normal_over_z: (other.normal_over_z - self.normal_over_z) * inv,
        }
    }

    #[inline]
    pub fn step(&mut self, delta: &Self) {
        self.inv_z += delta.inv_z;
        self.uv_over_z += delta.uv_over_z;
        self.normal_over_z += delta.normal_over_z;
    }

    /// Reconstructed camera depth.
    #[inline]
    pub fn depth(&self) -> f32 {
        if self.inv_z.abs() < f32::EPSILON {
            f32::INFINITY
        } else {
            1.0 / self.inv_z
        }
    }

    #[inline]
    pub fn uv(&self) -> Vec2 {
        self.uv_over_z * self.depth()
    }

    #[inline]
    pub fn normal(&self) -> Vec3 {
        self.normal_over_z * self.depth()
    }
}

/// Perspective-correct blend of two screen-space vertices at screen
/// parameter `t`. Screen x/y blend linearly; depth, UV and normal are
/// recovered from the linearly blended `1/z`, `uv/z` and `normal/z`.
#[inline]
pub fn cast_perspective(v1: &AttributedVertex, v2: &AttributedVertex, t: f32) -> AttributedVertex {
    let blended = VertexCasted::from_vertex(v1).lerp(VertexCasted::from_vertex(v2), t);
    let z = blended.depth();
    let xy = v1.position.truncate().lerp(v2.position.truncate(), t);
    AttributedVertex::new(xy.extend(z), blended.uv(), blended.normal())
}
