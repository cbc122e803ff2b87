/// Pixel surfaces for software rendering.
/// A surface is both a render target and a texture source: the same
/// `0xAARRGGBB` packing is used for writes and sampled reads.
///
/// All addressing goes through the row pitch, so padded rows (e.g. buffers
/// handed over by a windowing layer) are supported.
use anyhow::ensure;
use glam::{IVec2, Vec2};

pub const BYTES_PER_PIXEL: usize = 4;

/// 8-bit RGB color.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pack into `0xAARRGGBB` with opaque alpha.
    #[inline]
    pub const fn to_argb(self) -> u32 {
        0xFF000000 | ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    #[inline]
    pub const fn from_argb(packed: u32) -> Self {
        Self {
            r: (packed >> 16) as u8,
            g: (packed >> 8) as u8,
            b: packed as u8,
        }
    }
}

/// Read access to a pitched pixel buffer.
pub trait PixelSource {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// Row pitch in bytes. Always a multiple of `BYTES_PER_PIXEL` and at
    /// least `width * BYTES_PER_PIXEL`.
    fn pitch(&self) -> usize;
    fn pixels(&self) -> &[u32];

    /// Linear index of `(x, y)` in `pixels()`, or `None` when out of bounds.
    #[inline]
    fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(y * (self.pitch() / BYTES_PER_PIXEL) + x)
    }

    #[inline]
    fn get_pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.index_of(x, y)
            .map(|index| Color::from_argb(self.pixels()[index]))
    }

    /// Sample with texture coordinates. Each coordinate is wrapped with a
    /// floating modulo and clamped to be non-negative, so `1.25` samples like
    /// `0.25` and negative coordinates sample the first row/column.
    #[inline]
    fn get_pixel_uv(&self, uv: Vec2) -> Color {
        let (width, height) = (self.width(), self.height());
        if width == 0 || height == 0 {
            return Color::BLACK;
        }

        let u = (uv.x % 1.0).max(0.0);
        let v = (uv.y % 1.0).max(0.0);
        let x = ((u * width as f32) as usize).min(width - 1);
        let y = ((v * height as f32) as usize).min(height - 1);

        self.get_pixel(x as i32, y as i32).unwrap_or(Color::BLACK)
    }
}

/// Write access to a pitched pixel buffer.
pub trait PixelTarget: PixelSource {
    fn pixels_mut(&mut self) -> &mut [u32];

    /// Write a pixel. Out-of-bounds coordinates are ignored.
    #[inline]
    fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(index) = self.index_of(x, y) {
            self.pixels_mut()[index] = color.to_argb();
        }
    }

    /// Fill the visible area of every row, leaving row padding untouched.
    fn fill(&mut self, color: Color) {
        let width = self.width();
        let stride = self.pitch() / BYTES_PER_PIXEL;
        let packed = color.to_argb();
        if stride == 0 {
            return;
        }
        for row in self.pixels_mut().chunks_mut(stride) {
            let visible = width.min(row.len());
            row[..visible].fill(packed);
        }
    }
}

/// Minimum backing length for a buffer of the given shape.
#[inline]
fn required_len(width: usize, height: usize, stride: usize) -> usize {
    if width == 0 || height == 0 {
        0
    } else {
        (height - 1) * stride + width
    }
}

fn validate_pitch(width: usize, pitch: usize) -> anyhow::Result<()> {
    ensure!(
        pitch % BYTES_PER_PIXEL == 0,
        "pitch {pitch} is not a multiple of {BYTES_PER_PIXEL} bytes"
    );
    ensure!(
        pitch >= width * BYTES_PER_PIXEL,
        "pitch {pitch} is smaller than a {width}-pixel row"
    );
    Ok(())
}

/// Owned pixel surface.
#[derive(Clone, Debug)]
pub struct PixelSurface {
    width: usize,
    height: usize,
    pitch: usize,
    pixels: Vec<u32>,
}

impl PixelSurface {
    /// Tightly packed surface cleared to black.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pitch: width * BYTES_PER_PIXEL,
            pixels: vec![Color::BLACK.to_argb(); width * height],
        }
    }

    /// Surface whose rows are `pitch` bytes apart.
    pub fn with_pitch(width: usize, height: usize, pitch: usize) -> anyhow::Result<Self> {
        validate_pitch(width, pitch)?;
        let stride = pitch / BYTES_PER_PIXEL;
        Ok(Self {
            width,
            height,
            pitch,
            pixels: vec![Color::BLACK.to_argb(); stride * height],
        })
    }

    /// Build a surface by evaluating `f` for every pixel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> Color) -> Self {
        let mut surface = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                surface.pixels[y * width + x] = f(x, y).to_argb();
            }
        }
        surface
    }

    /// Resize to a tightly packed surface. Contents are cleared to black.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pitch = width * BYTES_PER_PIXEL;
        self.pixels.clear();
        self.pixels.resize(width * height, Color::BLACK.to_argb());
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

impl PixelSource for PixelSurface {
    #[inline]
    fn width(&self) -> usize {
        self.width
    }

    #[inline]
    fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn pitch(&self) -> usize {
        self.pitch
    }

    #[inline]
    fn pixels(&self) -> &[u32] {
        &self.pixels
    }
}

impl PixelTarget for PixelSurface {
    #[inline]
    fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }
}

/// Surface over a caller-owned buffer, e.g. a window's presentation buffer.
pub struct SurfaceView<'a> {
    width: usize,
    height: usize,
    pitch: usize,
    pixels: &'a mut [u32],
}

impl<'a> SurfaceView<'a> {
    pub fn new(
        pixels: &'a mut [u32],
        width: usize,
        height: usize,
        pitch: usize,
    ) -> anyhow::Result<Self> {
        validate_pitch(width, pitch)?;
        let required = required_len(width, height, pitch / BYTES_PER_PIXEL);
        ensure!(
            pixels.len() >= required,
            "buffer holds {} pixels, {width}x{height} at pitch {pitch} needs {required}",
            pixels.len()
        );
        Ok(Self {
            width,
            height,
            pitch,
            pixels,
        })
    }

    /// Tightly packed view.
    pub fn packed(pixels: &'a mut [u32], width: usize, height: usize) -> anyhow::Result<Self> {
        Self::new(pixels, width, height, width * BYTES_PER_PIXEL)
    }
}

impl<'a> PixelSource for SurfaceView<'a> {
    #[inline]
    fn width(&self) -> usize {
        self.width
    }

    #[inline]
    fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn pitch(&self) -> usize {
        self.pitch
    }

    #[inline]
    fn pixels(&self) -> &[u32] {
        self.pixels
    }
}

impl<'a> PixelTarget for SurfaceView<'a> {
    #[inline]
    fn pixels_mut(&mut self) -> &mut [u32] {
        self.pixels
    }
}

/// Copy every pixel of `src` into `dst` at `offset`. No blending; pixels
/// landing outside `dst` are dropped.
pub fn blit<D, S>(dst: &mut D, src: &S, offset: IVec2)
where
    D: PixelTarget + ?Sized,
    S: PixelSource + ?Sized,
{
    for y in 0..src.height() as i32 {
        for x in 0..src.width() as i32 {
            if let Some(color) = src.get_pixel(x, y) {
                dst.set_pixel(x + offset.x, y + offset.y, color);
            }
        }
    }
}
