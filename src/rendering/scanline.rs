/// Scan conversion of screen-space polygons into horizontal spans.
///
/// A span covers the pixels whose integer x lies between the leftmost and
/// rightmost edge crossings of the row. Each span remembers which edges
/// produced its ends so attribute interpolation can resume from that edge's
/// endpoints.
use super::geometry::{Planar, Polygon, Range2d};
use crate::count_add;
use crate::math::x_at_y;

/// Slack when checking an edge crossing against the polygon's x range.
const X_RANGE_TOLERANCE: f32 = 1e-3;

/// Pixel span on row `y`, inclusive at both ends.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScanLine {
    pub y: i32,
    pub start_x: i32,
    pub end_x: i32,
}

/// A span plus the edges (`i` meaning `(v[i], v[i + 1])`) that bound it.
///
/// `left_x`/`right_x` are the exact crossings before rounding and clamping;
/// attributes evaluated at the edges belong to these positions, not to the
/// pixel ends of the span.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EdgeScanLine {
    pub y: i32,
    pub start_x: i32,
    pub end_x: i32,
    pub left_x: f32,
    pub right_x: f32,
    pub left_edge: usize,
    pub right_edge: usize,
}

impl EdgeScanLine {
    #[inline]
    pub fn len(&self) -> i32 {
        self.end_x - self.start_x
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start_x > self.end_x
    }
}

impl From<EdgeScanLine> for ScanLine {
    fn from(line: EdgeScanLine) -> Self {
        Self {
            y: line.y,
            start_x: line.start_x,
            end_x: line.end_x,
        }
    }
}

/// Spans of `polygon` clipped to a `width` x `height` target.
pub fn scan_lines<V: Planar>(polygon: &Polygon<V>, width: usize, height: usize) -> Vec<ScanLine> {
    scan_lines_attributed(polygon, width, height)
        .into_iter()
        .map(ScanLine::from)
        .collect()
}

/// Spans of `polygon` with their bounding edges.
///
/// Rows run from the polygon's lowest to highest y, clamped to the target.
/// Horizontal edges never contribute a crossing; an edge only contributes on
/// rows within its own y extent. Spans that end up empty after rounding or
/// clamping are not emitted.
pub fn scan_lines_attributed<V: Planar>(
    polygon: &Polygon<V>,
    width: usize,
    height: usize,
) -> Vec<EdgeScanLine> {
    if polygon.is_degenerate() || width == 0 || height == 0 {
        return Vec::new();
    }
    let Some(range) = Range2d::of(&polygon.vertices) else {
        return Vec::new();
    };
    if !range.min.is_finite() || !range.max.is_finite() {
        return Vec::new();
    }

    let y_first = range.min.y.floor().max(0.0) as i32;
    let y_last = range.max.y.min((height - 1) as f32).floor() as i32;
    let max_x = (width - 1) as i32;

    let n = polygon.vertices.len();
    let mut lines = Vec::with_capacity((y_last - y_first + 1).max(0) as usize);

    for y in y_first..=y_last {
        let yf = y as f32;
        let mut left: Option<(f32, usize)> = None;
        let mut right: Option<(f32, usize)> = None;

        for edge in 0..n {
            let p1 = polygon.vertices[edge].xy();
            let p2 = polygon.vertices[(edge + 1) % n].xy();

            if yf < p1.y.min(p2.y) || yf > p1.y.max(p2.y) {
                continue;
            }
            let Some(x) = x_at_y(p2 - p1, p1, yf) else {
                continue;
            };
            if !range.contains_x(x, X_RANGE_TOLERANCE) {
                continue;
            }

            if left.map_or(true, |(lx, _)| x < lx) {
                left = Some((x, edge));
            }
            if right.map_or(true, |(rx, _)| x > rx) {
                right = Some((x, edge));
            }
        }

        let (Some((lx, left_edge)), Some((rx, right_edge))) = (left, right) else {
            continue;
        };

        let start_x = (lx.ceil() as i32).max(0);
        let end_x = (rx.floor() as i32).min(max_x);
        if start_x > end_x {
            continue;
        }

        lines.push(EdgeScanLine {
            y,
            start_x,
            end_x,
            left_x: lx,
            right_x: rx,
            left_edge,
            right_edge,
        });
    }

    count_add!(scanlines, lines.len());
    lines
}
