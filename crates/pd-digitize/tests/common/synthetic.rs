#![allow(dead_code)]

use std::path::Path;

use pd_core::{Image, Point2f};

pub const INK: u8 = 0;
pub const PAPER: u8 = 255;

pub fn blank_plot(width: usize, height: usize) -> Image<u8> {
    Image::new_fill(width, height, PAPER)
}

/// Inks every pixel within `radius` of the polyline through `pts`.
pub fn stroke_polyline(img: &mut Image<u8>, pts: &[Point2f], radius: f32) {
    for w in pts.windows(2) {
        stroke_segment(img, w[0], w[1], radius);
    }
}

pub fn stroke_segment(img: &mut Image<u8>, a: Point2f, b: Point2f, radius: f32) {
    let pad = radius.ceil() + 1.0;
    let x0 = (a.x.min(b.x) - pad).max(0.0) as usize;
    let y0 = (a.y.min(b.y) - pad).max(0.0) as usize;
    let x1 = ((a.x.max(b.x) + pad) as usize).min(img.width() - 1);
    let y1 = ((a.y.max(b.y) + pad) as usize).min(img.height() - 1);

    for y in y0..=y1 {
        for x in x0..=x1 {
            let p = Point2f::new(x as f32, y as f32);
            if distance_to_segment(p, a, b) <= radius
                && let Some(v) = img.get_mut(x, y)
            {
                *v = INK;
            }
        }
    }
}

pub fn stroke_hline(img: &mut Image<u8>, y: f32, x0: f32, x1: f32, radius: f32) {
    stroke_segment(img, Point2f::new(x0, y), Point2f::new(x1, y), radius);
}

pub fn stroke_vline(img: &mut Image<u8>, x: f32, y0: f32, y1: f32, radius: f32) {
    stroke_segment(img, Point2f::new(x, y0), Point2f::new(x, y1), radius);
}

pub fn fill_disk(img: &mut Image<u8>, c: Point2f, r: f32) {
    stroke_segment(img, c, c, r);
}

/// `n` points on the arc from `from_deg` to `to_deg` (screen coordinates,
/// angles measured toward +y).
pub fn arc_points(c: Point2f, r: f32, from_deg: f32, to_deg: f32, n: usize) -> Vec<Point2f> {
    (0..n)
        .map(|i| {
            let t = (from_deg + (to_deg - from_deg) * i as f32 / (n - 1) as f32).to_radians();
            Point2f::new(c.x + r * t.cos(), c.y + r * t.sin())
        })
        .collect()
}

pub fn distance_to_segment(p: Point2f, a: Point2f, b: Point2f) -> f32 {
    let d = b - a;
    let len2 = d.dot(d);
    if len2 <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(d) / len2).clamp(0.0, 1.0);
    p.distance(a + d * t)
}

pub fn distance_to_polyline(p: Point2f, pts: &[Point2f]) -> f32 {
    pts.windows(2)
        .map(|w| distance_to_segment(p, w[0], w[1]))
        .fold(f32::INFINITY, f32::min)
}

pub fn save_png(img: &Image<u8>, path: &Path) {
    image::GrayImage::from_raw(img.width() as u32, img.height() as u32, img.data().to_vec())
        .expect("buffer matches dimensions")
        .save(path)
        .expect("write png");
}
