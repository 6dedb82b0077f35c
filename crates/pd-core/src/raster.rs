//! Rasterization of segments and polygons into an [`EdgeMask`].
//!
//! Drawing is clipped to the mask; geometry may extend past its borders.

use crate::{EdgeMask, Point2f, Point2i, Segment2i};

/// Sets every pixel on the 8-connected Bresenham path from `a` to `b`.
pub fn draw_line(mask: &mut EdgeMask, a: Point2i, b: Point2i) {
    let dx = (b.x - a.x).abs();
    let dy = -(b.y - a.y).abs();
    let sx = if a.x < b.x { 1 } else { -1 };
    let sy = if a.y < b.y { 1 } else { -1 };

    let (mut x, mut y) = (a.x, a.y);
    let mut err = dx + dy;
    loop {
        set_clipped(mask, x, y);
        if x == b.x && y == b.y {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Draws `seg` with the given stroke width.
///
/// A pixel is covered when its center lies within `thickness / 2` of the
/// segment. The Bresenham path is always drawn so thin strokes never break.
pub fn draw_segment(mask: &mut EdgeMask, seg: &Segment2i, thickness: f32) {
    draw_line(mask, seg.p0, seg.p1);

    let half = 0.5 * thickness.max(0.0);
    if half < 0.5 {
        return;
    }

    let pad = half.ceil() as i32;
    let x0 = seg.p0.x.min(seg.p1.x) - pad;
    let x1 = seg.p0.x.max(seg.p1.x) + pad;
    let y0 = seg.p0.y.min(seg.p1.y) - pad;
    let y1 = seg.p0.y.max(seg.p1.y) + pad;

    for y in y0.max(0)..=y1.min(mask.height() as i32 - 1) {
        for x in x0.max(0)..=x1.min(mask.width() as i32 - 1) {
            if seg.distance_to(Point2f::new(x as f32, y as f32)) <= half + 1e-4 {
                mask.set(x as usize, y as usize, true);
            }
        }
    }
}

/// Fills a closed polygon, boundary included.
///
/// Interior pixels are found with an even-odd scanline test at pixel
/// centers; the boundary is traced separately so degenerate (zero-area)
/// polygons still mark their outline.
pub fn fill_polygon(mask: &mut EdgeMask, poly: &[Point2i]) {
    let Some(first) = poly.first() else {
        return;
    };

    for (i, &a) in poly.iter().enumerate() {
        let b = poly[(i + 1) % poly.len()];
        draw_line(mask, a, b);
    }
    if poly.len() < 3 {
        return;
    }

    let (mut ymin, mut ymax) = (first.y, first.y);
    for p in poly {
        ymin = ymin.min(p.y);
        ymax = ymax.max(p.y);
    }

    let mut xs: Vec<f64> = Vec::new();
    for y in ymin.max(0)..=ymax.min(mask.height() as i32 - 1) {
        xs.clear();
        let yc = y as f64;
        for (i, a) in poly.iter().enumerate() {
            let b = poly[(i + 1) % poly.len()];
            let (ay, by) = (a.y as f64, b.y as f64);
            let crosses = (ay <= yc && yc < by) || (by <= yc && yc < ay);
            if crosses {
                let t = (yc - ay) / (by - ay);
                xs.push(a.x as f64 + t * (b.x - a.x) as f64);
            }
        }
        xs.sort_by(|a, b| a.total_cmp(b));

        for pair in xs.chunks_exact(2) {
            let from = pair[0].ceil() as i32;
            let to = pair[1].floor() as i32;
            for x in from.max(0)..=to.min(mask.width() as i32 - 1) {
                mask.set(x as usize, y as usize, true);
            }
        }
    }
}

fn set_clipped(mask: &mut EdgeMask, x: i32, y: i32) {
    if x >= 0 && y >= 0 {
        mask.set(x as usize, y as usize, true);
    }
}

#[cfg(test)]
mod tests {
    use super::{draw_line, draw_segment, fill_polygon};
    use crate::{EdgeMask, Point2i, Segment2i};

    fn p(x: i32, y: i32) -> Point2i {
        Point2i::new(x, y)
    }

    #[test]
    fn line_hits_both_endpoints_and_clips() {
        let mut mask = EdgeMask::empty(8, 8);
        draw_line(&mut mask, p(-3, 2), p(5, 6));

        assert!(mask.is_edge(5, 6));
        assert!(mask.count() >= 5);
        assert!(mask.count() <= 9);
    }

    #[test]
    fn thick_horizontal_segment_covers_neighbor_rows() {
        let mut mask = EdgeMask::empty(20, 10);
        draw_segment(&mut mask, &Segment2i::new(p(2, 5), p(17, 5)), 2.0);

        for x in 2..=17 {
            assert!(mask.is_edge(x, 4));
            assert!(mask.is_edge(x, 5));
            assert!(mask.is_edge(x, 6));
        }
        assert!(!mask.is_edge(10, 3));
        assert!(!mask.is_edge(10, 7));
    }

    #[test]
    fn square_polygon_fills_interior_and_boundary() {
        let mut mask = EdgeMask::empty(10, 10);
        fill_polygon(&mut mask, &[p(2, 2), p(2, 6), p(6, 6), p(6, 2)]);

        assert_eq!(mask.count(), 25);
        assert!(mask.is_edge(4, 4));
        assert!(!mask.is_edge(7, 4));
    }

    #[test]
    fn degenerate_polygon_draws_outline() {
        let mut mask = EdgeMask::empty(10, 10);
        fill_polygon(&mut mask, &[p(1, 1), p(1, 2), p(1, 3), p(1, 2)]);
        assert_eq!(mask.count(), 3);
    }
}
