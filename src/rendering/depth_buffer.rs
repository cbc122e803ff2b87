use crate::count_call;

/// Per-pixel minimum depth seen this frame.
/// Cleared to `+inf` so the first fragment at any pixel always passes.
pub struct DepthBuffer {
    width: usize,
    height: usize,
    depths: Vec<f32>,
}

impl DepthBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            depths: vec![f32::INFINITY; width * height],
        }
    }

    /// Reallocate for a new surface size. All depths are reset.
    pub fn resize(&mut self, width: usize, height: usize) {
        if self.width == width && self.height == height {
            self.clear();
            return;
        }
        log::debug!(
            "depth buffer resized {}x{} -> {}x{}",
            self.width,
            self.height,
            width,
            height
        );
        self.width = width;
        self.height = height;
        self.depths.clear();
        self.depths.resize(width * height, f32::INFINITY);
    }

    /// Clear depth data for a new frame.
    #[inline]
    pub fn clear(&mut self) {
        count_call!(depth_clears);
        self.depths.fill(f32::INFINITY);
    }

    /// Strict less-than depth test. On pass the stored depth becomes `depth`
    /// and `true` is returned; equal depths fail, so the first writer wins.
    /// Out-of-range coordinates always fail.
    #[inline]
    pub fn test_and_set(&mut self, x: usize, y: usize, depth: f32) -> bool {
        count_call!(pixels_tested);
        if x >= self.width || y >= self.height {
            return false;
        }

        let stored = &mut self.depths[y * self.width + x];
        if depth < *stored {
            *stored = depth;
            count_call!(depth_passed);
            true
        } else {
            count_call!(depth_failed);
            false
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.depths[y * self.width + x])
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }
}
