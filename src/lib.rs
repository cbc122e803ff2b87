/// Scanline Renderer - CPU software rasterization
/// Frustum clipping, perspective-correct texturing, depth buffering
pub mod camera;
pub mod math;
pub mod perf;
pub mod rendering;

pub use camera::{Camera, CameraController, FpsCamera, StaticCamera};
pub use math::Rotate;
pub use perf::{CounterSnapshot, FunctionCounters, FUNCTION_COUNTERS};
pub use rendering::{
    AttributedVertex, Color, DrawStats, IndexedTriangle, PixelSource, PixelSurface, PixelTarget,
    RenderConfig, Renderer, ShadingConfig, SurfaceView,
};
