/// Camera-space polygon clipping.
///
/// Each pass is a single-plane Sutherland-Hodgman walk. New vertices are
/// linear blends of the edge endpoints with one parameter `t` shared by
/// position and every attribute; perspective correction happens later, in the
/// rasterizer. Winding is preserved. Output with fewer than three vertices
/// means the polygon left the view volume and is dropped by the caller.
use super::geometry::{Polygon, Vertex};
use glam::Vec3;

/// Default distance of the near plane from the eye.
pub const DEFAULT_NEAR_Z: f32 = 0.5;

/// Walk every edge `(v1, v2)` of `polygon`:
/// in/in keeps `v1`, in/out keeps `v1` plus the crossing, out/in emits only
/// the crossing, out/out emits nothing.
fn clip_against<V, I, C>(polygon: &Polygon<V>, inside: I, crossing: C) -> Polygon<V>
where
    V: Vertex,
    I: Fn(Vec3) -> bool,
    C: Fn(Vec3, Vec3) -> f32,
{
    let mut output = Vec::with_capacity(polygon.len() + 2);

    for (v1, v2) in polygon.edges() {
        let p1 = v1.position();
        let p2 = v2.position();

        match (inside(p1), inside(p2)) {
            (true, true) => output.push(v1),
            (true, false) => {
                output.push(v1);
                output.push(v1.interpolate(v2, crossing(p1, p2)));
            }
            (false, true) => output.push(v1.interpolate(v2, crossing(p1, p2))),
            (false, false) => {}
        }
    }

    Polygon::new(output)
}

/// Keep the part of `polygon` with `z >= near_z`.
pub fn clip_near<V: Vertex>(polygon: &Polygon<V>, near_z: f32) -> Polygon<V> {
    debug_assert!(near_z >= 0.0, "near plane must not be behind the eye");
    clip_against(
        polygon,
        |p| p.z >= near_z,
        |p1, p2| near_crossing(p1, p2, near_z),
    )
}

/// Keep the part of `polygon` on the inner side of the plane through the eye
/// that contains the Y axis and the line `z = a * x`, `a = -dfc`. Inside is
/// `z >= a * x`.
///
/// `clip_side(p, dfc)` cuts at the left frustum edge and `clip_side(p, -dfc)`
/// at the right one.
pub fn clip_side<V: Vertex>(polygon: &Polygon<V>, dfc: f32) -> Polygon<V> {
    let a = -dfc;
    clip_against(
        polygon,
        |p| p.z >= a * p.x,
        |p1, p2| side_crossing(p1, p2, a),
    )
}

/// Near plane, then the left and right side planes.
pub fn clip_frustum<V: Vertex>(polygon: &Polygon<V>, near_z: f32, dfc: f32) -> Polygon<V> {
    let clipped = clip_near(polygon, near_z);
    if clipped.is_degenerate() {
        return clipped;
    }
    let clipped = clip_side(&clipped, dfc);
    if clipped.is_degenerate() {
        return clipped;
    }
    clip_side(&clipped, -dfc)
}

impl<V: Vertex> Polygon<V> {
    /// Near-plane clip.
    #[inline]
    pub fn clip(&self, near_z: f32) -> Self {
        clip_near(self, near_z)
    }
}

/// Edge parameter where `p1 -> p2` crosses `z = near_z`. Only called for
/// edges with one endpoint on each side, so the depths differ.
#[inline]
fn near_crossing(p1: Vec3, p2: Vec3, near_z: f32) -> f32 {
    let dz = p1.z - p2.z;
    if dz == 0.0 {
        return 0.0;
    }
    ((p1.z - near_z) / dz).clamp(0.0, 1.0)
}

/// Edge parameter where `p1 -> p2` crosses the line `z = a * x` in the XZ
/// plane. Substituting the edge `(x1 + t * dx, z1 + t * dz)` into the cut
/// line gives `t = (a * x1 - z1) / (dz - a * dx)`.
fn side_crossing(p1: Vec3, p2: Vec3, a: f32) -> f32 {
    let dx = p2.x - p1.x;
    let dz = p2.z - p1.z;
    let offset = a * p1.x - p1.z;

    let t = if dx == 0.0 {
        // Edge runs along z at fixed x.
        if dz == 0.0 {
            return 0.0;
        }
        offset / dz
    } else if dz == 0.0 {
        // Edge runs along x at fixed z.
        if a == 0.0 {
            return 0.0;
        }
        offset / (-a * dx)
    } else {
        let denom = dz - a * dx;
        if denom == 0.0 {
            // Parallel to the cut line; no single crossing.
            return 0.0;
        }
        offset / denom
    };

    t.clamp(0.0, 1.0)
}
