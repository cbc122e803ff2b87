/// Geometry primitives for the scanline pipeline.
///
/// Coordinate frame: camera space has +X right, +Y up and +Z forward (away
/// from the eye). A triangle is front-facing when its vertices appear
/// counter-clockwise on screen; outward normals follow from that winding.
use crate::math::Rotate;
use glam::{Vec2, Vec3};
use std::ops::{Add, Mul, Sub};

/// Depths at or below this are treated as lying on the eye plane.
pub const EYE_PLANE_EPSILON: f32 = 1e-6;

/// Position, texture coordinate and normal carried through clipping and
/// rasterization.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct AttributedVertex {
    pub position: Vec3,
    pub uv: Vec2,
    pub normal: Vec3,
}

impl AttributedVertex {
    #[inline]
    pub const fn new(position: Vec3, uv: Vec2, normal: Vec3) -> Self {
        Self {
            position,
            uv,
            normal,
        }
    }

    /// Linear (not perspective-correct) blend of every attribute.
    #[inline]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            uv: self.uv.lerp(other.uv, t),
            normal: self.normal.lerp(other.normal, t),
        }
    }
}

impl Add for AttributedVertex {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.position + rhs.position,
            self.uv + rhs.uv,
            self.normal + rhs.normal,
        )
    }
}

impl Sub for AttributedVertex {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.position - rhs.position,
            self.uv - rhs.uv,
            self.normal - rhs.normal,
        )
    }
}

impl Mul<f32> for AttributedVertex {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.position * rhs, self.uv * rhs, self.normal * rhs)
    }
}

/// Anything with a screen-plane location. Enough for scan conversion.
pub trait Planar: Copy {
    fn xy(&self) -> Vec2;
}

/// A vertex that can be clipped and projected.
pub trait Vertex: Planar {
    fn position(&self) -> Vec3;
    /// Same attributes, new position.
    fn with_position(self, position: Vec3) -> Self;
    /// Linear interpolation of position and every carried attribute.
    fn interpolate(self, other: Self, t: f32) -> Self;
}

impl Planar for Vec2 {
    #[inline]
    fn xy(&self) -> Vec2 {
        *self
    }
}

impl Planar for Vec3 {
    #[inline]
    fn xy(&self) -> Vec2 {
        self.truncate()
    }
}

impl Planar for AttributedVertex {
    #[inline]
    fn xy(&self) -> Vec2 {
        self.position.truncate()
    }
}

impl Vertex for Vec3 {
    #[inline]
    fn position(&self) -> Vec3 {
        *self
    }

    #[inline]
    fn with_position(self, position: Vec3) -> Self {
        position
    }

    #[inline]
    fn interpolate(self, other: Self, t: f32) -> Self {
        self.lerp(other, t)
    }
}

impl Vertex for AttributedVertex {
    #[inline]
    fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    fn with_position(self, position: Vec3) -> Self {
        Self { position, ..self }
    }

    #[inline]
    fn interpolate(self, other: Self, t: f32) -> Self {
        self.lerp(other, t)
    }
}

/// Three indices into a vertex slice.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IndexedTriangle {
    pub indices: [u32; 3],
}

impl IndexedTriangle {
    #[inline]
    pub const fn new(a: u32, b: u32, c: u32) -> Self {
        Self { indices: [a, b, c] }
    }

    /// Opposite winding.
    #[inline]
    pub const fn reversed(self) -> Self {
        let [a, b, c] = self.indices;
        Self::new(a, c, b)
    }

    /// Look up the three vertices. `None` if any index is out of range.
    #[inline]
    pub fn resolve<V: Copy>(&self, vertices: &[V]) -> Option<[V; 3]> {
        let [a, b, c] = self.indices;
        Some([
            *vertices.get(a as usize)?,
            *vertices.get(b as usize)?,
            *vertices.get(c as usize)?,
        ])
    }
}

impl From<[u32; 3]> for IndexedTriangle {
    fn from(indices: [u32; 3]) -> Self {
        Self { indices }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Triangle<V = Vec3> {
    pub vertices: [V; 3],
}

pub type AttributedTriangle = Triangle<AttributedVertex>;

impl<V: Copy> Triangle<V> {
    #[inline]
    pub const fn new(a: V, b: V, c: V) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Open the triangle into a three-vertex loop.
    pub fn to_polygon(&self) -> Polygon<V> {
        Polygon::new(self.vertices.to_vec())
    }
}

impl<V: Vertex> Triangle<V> {
    #[inline]
    pub fn positions(&self) -> [Vec3; 3] {
        self.vertices.map(|v| v.position())
    }
}

/// Ordered, closed vertex loop; the last vertex connects back to the first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon<V> {
    pub vertices: Vec<V>,
}

pub type Polygon2D = Polygon<Vec2>;
pub type Polygon3D = Polygon<Vec3>;
pub type AttributedPolygon = Polygon<AttributedVertex>;

impl<V: Copy> Polygon<V> {
    #[inline]
    pub fn new(vertices: Vec<V>) -> Self {
        Self { vertices }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Fewer than three vertices enclose no area.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.vertices.len() < 3
    }

    /// Every edge `(v[i], v[i + 1])`, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (V, V)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

impl<V: Vertex> Polygon<V> {
    /// Perspective divide of every position; other attributes untouched.
    pub fn cast(&self, dfc: f32) -> Self {
        self.map_positions(|p| cast_vertex(p, dfc))
    }

    /// Map cast coordinates onto pixel coordinates.
    pub fn to_screen_space(&self, width: usize, height: usize) -> Self {
        self.map_positions(|p| to_screen_space(p, width, height))
    }

    /// Cast followed by the screen-space transform.
    pub fn project(&self, dfc: f32, width: usize, height: usize) -> Self {
        self.map_positions(|p| to_screen_space(cast_vertex(p, dfc), width, height))
    }

    fn map_positions(&self, f: impl Fn(Vec3) -> Vec3) -> Self {
        Self::new(
            self.vertices
                .iter()
                .map(|v| v.with_position(f(v.position())))
                .collect(),
        )
    }
}

impl Polygon3D {
    /// Drop depth, keeping screen x/y.
    pub fn to_2d(&self) -> Polygon2D {
        Polygon::new(self.vertices.iter().map(|v| v.truncate()).collect())
    }
}

/// Axis-aligned bounds in the screen plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Range2d {
    pub min: Vec2,
    pub max: Vec2,
}

impl Range2d {
    /// `None` for an empty slice.
    pub fn of_points(points: &[Vec2]) -> Option<Self> {
        Self::of(points)
    }

    /// Bounds of the vertices' x/y.
    pub fn of_attributed(vertices: &[AttributedVertex]) -> Option<Self> {
        Self::of(vertices)
    }

    pub fn of<V: Planar>(vertices: &[V]) -> Option<Self> {
        let first = vertices.first()?.xy();
        Some(vertices.iter().skip(1).fold(
            Self {
                min: first,
                max: first,
            },
            |range, v| {
                let p = v.xy();
                Self {
                    min: range.min.min(p),
                    max: range.max.max(p),
                }
            },
        ))
    }

    #[inline]
    pub fn contains_x(&self, x: f32, tolerance: f32) -> bool {
        x >= self.min.x - tolerance && x <= self.max.x + tolerance
    }
}

/// Perspective divide: `(x / z * dfc, y / z * dfc, z)`. Depth is kept so the
/// rasterizer can interpolate `1/z`. A depth on the eye plane is nudged off
/// it instead of dividing by zero.
#[inline]
pub fn cast_vertex(v: Vec3, dfc: f32) -> Vec3 {
    let z = if v.z.abs() < EYE_PLANE_EPSILON {
        EYE_PLANE_EPSILON.copysign(v.z)
    } else {
        v.z
    };
    Vec3::new(v.x / z * dfc, v.y / z * dfc, v.z)
}

/// Cast coordinates to pixels. X spans `[-1, 1]` across the width; Y is
/// scaled by the same factor (aspect `width / height`) and flipped so +Y is
/// up on screen.
#[inline]
pub fn to_screen_space(p: Vec3, width: usize, height: usize) -> Vec3 {
    let half_w = width as f32 * 0.5;
    let half_h = height as f32 * 0.5;
    let aspect = if height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    };
    Vec3::new(p.x * half_w + half_w, -p.y * aspect * half_h + half_h, p.z)
}

/// `(b - a) x (c - a)` of a camera-space triangle.
#[inline]
pub fn cross_product(triangle: &[Vec3; 3]) -> Vec3 {
    let [a, b, c] = *triangle;
    (b - a).cross(c - a)
}

/// Cross product of the perspective-cast triangle. Its z sign is the
/// on-screen winding.
#[inline]
pub fn cross_product_cast(triangle: &[Vec3; 3], dfc: f32) -> Vec3 {
    cross_product(&triangle.map(|v| cast_vertex(v, dfc)))
}

/// Outward unit normal of a front-facing (counter-clockwise) triangle.
/// Zero for a degenerate triangle.
#[inline]
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (c - a).cross(b - a).normalize_or_zero()
}

/// Back-face test on camera-space positions.
///
/// Uses the winding of the cast triangle when every vertex is in front of the
/// eye. With a vertex on or behind the eye plane the cast is meaningless, so
/// the sign of `v0 . ((v1 - v0) x (v2 - v0))` is used; the two agree wherever
/// both are defined.
#[inline]
pub fn is_front_facing(triangle: &[Vec3; 3], dfc: f32) -> bool {
    if triangle.iter().any(|v| v.z <= EYE_PLANE_EPSILON) {
        triangle[0].dot(cross_product(triangle)) >= 0.0
    } else {
        cross_product_cast(triangle, dfc).z >= 0.0
    }
}

/// Per-vertex normals: normalized sum of adjacent face normals. Triangles with
/// out-of-range indices are ignored.
pub fn calculate_normals(vertices: &[Vec3], indices: &[IndexedTriangle]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; vertices.len()];
    for triangle in indices {
        let Some([a, b, c]) = triangle.resolve(vertices) else {
            continue;
        };
        let normal = face_normal(a, b, c);
        for &index in &triangle.indices {
            normals[index as usize] += normal;
        }
    }
    normals.iter_mut().for_each(|n| *n = n.normalize_or_zero());
    normals
}

/// Resolve an index list into triangles, skipping (and logging) any triangle
/// with an out-of-range index.
pub fn triangles_from_indices<V: Copy>(
    vertices: &[V],
    indices: &[IndexedTriangle],
) -> Vec<Triangle<V>> {
    indices
        .iter()
        .filter_map(|triangle| {
            let resolved = triangle.resolve(vertices);
            if resolved.is_none() {
                log::warn!(
                    "skipping triangle {:?}: index out of range for {} vertices",
                    triangle.indices,
                    vertices.len()
                );
            }
            resolved.map(|vertices| Triangle { vertices })
        })
        .collect()
}

pub fn triangles_to_polygons<V: Copy>(triangles: &[Triangle<V>]) -> Vec<Polygon<V>> {
    triangles.iter().map(Triangle::to_polygon).collect()
}

/// Rotate about Y, then X, then Z by the components of `radians`.
pub fn rotate_vertices(vertices: &[Vec3], radians: Vec3) -> Vec<Vec3> {
    vertices.iter().map(|v| v.rotated_yxz(radians)).collect()
}

pub fn translate_vertices(vertices: &[Vec3], offset: Vec3) -> Vec<Vec3> {
    vertices.iter().map(|v| *v + offset).collect()
}

/// Corner loops of the six cube faces (indices into `CUBE_CORNERS`),
/// counter-clockwise seen from outside.
const CUBE_FACES: [[u32; 4]; 6] = [
    [0, 1, 2, 3], // -Z
    [4, 7, 6, 5], // +Z
    [0, 3, 7, 4], // -X
    [1, 5, 6, 2], // +X
    [0, 4, 5, 1], // -Y
    [3, 2, 6, 7], // +Y
];

const CUBE_FACE_NORMALS: [Vec3; 6] = [
    Vec3::NEG_Z,
    Vec3::Z,
    Vec3::NEG_X,
    Vec3::X,
    Vec3::NEG_Y,
    Vec3::Y,
];

const CUBE_CORNERS: [Vec3; 8] = [
    Vec3::new(-0.5, -0.5, -0.5),
    Vec3::new(0.5, -0.5, -0.5),
    Vec3::new(0.5, 0.5, -0.5),
    Vec3::new(-0.5, 0.5, -0.5),
    Vec3::new(-0.5, -0.5, 0.5),
    Vec3::new(0.5, -0.5, 0.5),
    Vec3::new(0.5, 0.5, 0.5),
    Vec3::new(-0.5, 0.5, 0.5),
];

const FACE_UVS: [Vec2; 4] = [
    Vec2::new(0.0, 1.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(0.0, 0.0),
];

/// Axis-aligned cube of edge `size`, rotated about its center and then
/// placed at `center`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Cube {
    pub size: f32,
    /// Radians about Y, then X, then Z.
    pub rotation: Vec3,
    pub center: Vec3,
}

impl Default for Cube {
    fn default() -> Self {
        Self {
            size: 1.0,
            rotation: Vec3::ZERO,
            center: Vec3::ZERO,
        }
    }
}

impl Cube {
    pub fn new(size: f32, center: Vec3) -> Self {
        Self {
            size,
            center,
            ..Self::default()
        }
    }

    #[inline]
    fn place(&self, corner: Vec3) -> Vec3 {
        (corner * self.size).rotated_yxz(self.rotation) + self.center
    }

    /// The eight corners.
    pub fn vertices(&self) -> [Vec3; 8] {
        CUBE_CORNERS.map(|corner| self.place(corner))
    }

    /// Twelve triangles over `vertices()`, front-facing from outside.
    pub fn indices() -> Vec<IndexedTriangle> {
        CUBE_FACES
            .iter()
            .flat_map(|&[a, b, c, d]| [IndexedTriangle::new(a, b, c), IndexedTriangle::new(a, c, d)])
            .collect()
    }

    /// Four vertices per face with full-face UVs and the face normal, so
    /// faces shade flat and each carries its own texture copy.
    pub fn attributed_vertices(&self) -> Vec<AttributedVertex> {
        CUBE_FACES
            .iter()
            .zip(CUBE_FACE_NORMALS)
            .flat_map(|(face, normal)| {
                let normal = normal.rotated_yxz(self.rotation);
                face.iter().zip(FACE_UVS).map(move |(&corner, uv)| {
                    AttributedVertex::new(self.place(CUBE_CORNERS[corner as usize]), uv, normal)
                })
            })
            .collect()
    }

    /// Twelve triangles over `attributed_vertices()`.
    pub fn attributed_indices() -> Vec<IndexedTriangle> {
        (0..CUBE_FACES.len() as u32)
            .flat_map(|face| {
                let base = face * 4;
                [
                    IndexedTriangle::new(base, base + 1, base + 2),
                    IndexedTriangle::new(base, base + 2, base + 3),
                ]
            })
            .collect()
    }
}
