/// Procedural textures for tests, benchmarks and debug rendering.
use super::surface::{Color, PixelSurface};

/// `size` x `size` checkerboard of `cells` x `cells` squares, starting with
/// `even` in the top-left corner.
pub fn checkerboard(size: usize, cells: usize, even: Color, odd: Color) -> PixelSurface {
    let cell = (size / cells.max(1)).max(1);
    PixelSurface::from_fn(size, size, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            even
        } else {
            odd
        }
    })
}
