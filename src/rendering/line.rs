/// Wireframe primitives.
use super::surface::{Color, PixelTarget};
use glam::Vec2;

/// Clip segment `a -> b` to `[0, max.x] x [0, max.y]` (Liang-Barsky).
fn clip_segment(a: Vec2, b: Vec2, max: Vec2) -> Option<(Vec2, Vec2)> {
    let d = b - a;
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;

    for (p, q) in [
        (-d.x, a.x),
        (d.x, max.x - a.x),
        (-d.y, a.y),
        (d.y, max.y - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }

    Some((a + d * t0, a + d * t1))
}

/// Bresenham line. Endpoints are ordered left to right first, so drawing
/// `a -> b` and `b -> a` set the same pixels. The segment is clipped to the
/// surface and rounded to pixel centers before stepping.
pub fn draw_line<T: PixelTarget + ?Sized>(surface: &mut T, from: Vec2, to: Vec2, color: Color) {
    if !from.is_finite() || !to.is_finite() || surface.width() == 0 || surface.height() == 0 {
        return;
    }

    let (a, b) = if (from.x, from.y) <= (to.x, to.y) {
        (from, to)
    } else {
        (to, from)
    };

    let max = Vec2::new(surface.width() as f32 - 1.0, surface.height() as f32 - 1.0);
    let Some((a, b)) = clip_segment(a, b, max) else {
        return;
    };

    let (mut x, mut y) = (a.x.round() as i32, a.y.round() as i32);
    let (end_x, end_y) = (b.x.round() as i32, b.y.round() as i32);
    let dx = (end_x - x).abs();
    let dy = -(end_y - y).abs();
    let step_x = if x < end_x { 1 } else { -1 };
    let step_y = if y < end_y { 1 } else { -1 };
    let mut error = dx + dy;

    loop {
        surface.set_pixel(x, y, color);
        if x == end_x && y == end_y {
            break;
        }
        let doubled = 2 * error;
        if doubled >= dy {
            error += dy;
            x += step_x;
        }
        if doubled <= dx {
            error += dx;
            y += step_y;
        }
    }
}

/// Outline of an axis-aligned square centered on `center`.
pub fn draw_square<T: PixelTarget + ?Sized>(
    surface: &mut T,
    center: Vec2,
    side: f32,
    color: Color,
) {
    let half = side * 0.5;
    let top_left = center + Vec2::new(-half, -half);
    let top_right = center + Vec2::new(half, -half);
    let bottom_left = center + Vec2::new(-half, half);
    let bottom_right = center + Vec2::new(half, half);

    draw_line(surface, top_left, top_right, color);
    draw_line(surface, bottom_left, bottom_right, color);
    draw_line(surface, top_left, bottom_left, color);
    draw_line(surface, top_right, bottom_right, color);
}

/// Closed outline through every vertex of a loop.
pub fn draw_outline<T: PixelTarget + ?Sized>(surface: &mut T, points: &[Vec2], color: Color) {
    let n = points.len();
    if n < 2 {
        return;
    }
    for i in 0..n {
        draw_line(surface, points[i], points[(i + 1) % n], color);
    }
}
