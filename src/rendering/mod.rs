/// CPU rasterization pipeline: geometry, clipping, scan conversion, shading.
pub mod clipper;
pub mod depth_buffer;
pub mod geometry;
pub mod line;
pub mod rasterizer;
pub mod scanline;
pub mod shading;
pub mod surface;
pub mod texture;

pub use clipper::{clip_frustum, clip_near, clip_side, DEFAULT_NEAR_Z};
pub use depth_buffer::DepthBuffer;
pub use geometry::{
    AttributedPolygon, AttributedTriangle, AttributedVertex, Cube, IndexedTriangle, Polygon,
    Polygon2D, Polygon3D, Range2d, Triangle,
};
pub use line::{draw_line, draw_square};
pub use rasterizer::{DrawStats, RenderConfig, Renderer};
pub use scanline::{scan_lines, scan_lines_attributed, EdgeScanLine, ScanLine};
pub use shading::{cast_perspective, ShadingConfig, VertexCasted};
pub use surface::{blit, Color, PixelSource, PixelSurface, PixelTarget, SurfaceView};
