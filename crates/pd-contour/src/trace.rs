use pd_core::{EdgeMask, Point2i, raster::fill_polygon};

use crate::set::ContourSet;

// Direction 0 is east; increasing index turns counterclockwise on screen.
const DX: [i32; 8] = [1, 1, 0, -1, -1, -1, 0, 1];
const DY: [i32; 8] = [0, -1, -1, -1, 0, 1, 1, 1];
const WEST: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChainApprox {
    /// Every border pixel, in traversal order.
    #[default]
    None,
    /// Only the pixels where the chain changes direction.
    Simple,
}

pub fn find_external_contours(mask: &EdgeMask, approx: ChainApprox) -> ContourSet {
    let (w, h) = mask.dims();
    let mut set = ContourSet::new(w, h);
    if w == 0 || h == 0 {
        return set;
    }

    let mut covered = EdgeMask::empty(w, h);
    let mut queue: Vec<(usize, usize)> = Vec::new();

    for y in 0..h {
        for x in 0..w {
            if !mask.is_edge(x, y) || covered.is_edge(x, y) {
                continue;
            }
            if x > 0 && mask.is_edge(x - 1, y) {
                continue;
            }

            let border = trace_outer_border(mask, Point2i::new(x as i32, y as i32));
            cover_component(mask, &mut covered, (x, y), &mut queue);
            fill_polygon(&mut covered, &border);

            let points = match approx {
                ChainApprox::None => border,
                ChainApprox::Simple => compress_runs(border),
            };
            set.push(points);
        }
    }

    set
}

fn fg(mask: &EdgeMask, x: i32, y: i32) -> bool {
    x >= 0 && y >= 0 && mask.is_edge(x as usize, y as usize)
}

fn step(p: Point2i, dir: usize) -> Point2i {
    Point2i::new(p.x + DX[dir], p.y + DY[dir])
}

/// Follows the outer border of the component whose raster-first pixel is `p0`.
fn trace_outer_border(mask: &EdgeMask, p0: Point2i) -> Vec<Point2i> {
    // Clockwise search from the west neighbor, which is known to be background.
    let first = (1..=8)
        .map(|k| (WEST + 8 - k) % 8)
        .find(|&d| fg(mask, p0.x + DX[d], p0.y + DY[d]));
    let Some(first_dir) = first else {
        return vec![p0];
    };
    let p1 = step(p0, first_dir);

    let mut out = Vec::new();
    let mut cur = p0;
    // Direction from `cur` back to the previously visited pixel.
    let mut back = first_dir;
    loop {
        let mut next_dir = back;
        for k in 1..=8 {
            let d = (back + k) % 8;
            if fg(mask, cur.x + DX[d], cur.y + DY[d]) {
                next_dir = d;
                break;
            }
        }
        let next = step(cur, next_dir);

        out.push(cur);
        if next == p0 && cur == p1 {
            break;
        }

        cur = next;
        back = (next_dir + 4) % 8;
    }

    out
}

/// Marks every pixel 8-connected to `seed` as covered.
fn cover_component(
    mask: &EdgeMask,
    covered: &mut EdgeMask,
    seed: (usize, usize),
    queue: &mut Vec<(usize, usize)>,
) {
    let (w, h) = mask.dims();
    queue.clear();
    covered.set(seed.0, seed.1, true);
    queue.push(seed);

    while let Some((x, y)) = queue.pop() {
        for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                if mask.is_edge(nx, ny) && !covered.is_edge(nx, ny) {
                    covered.set(nx, ny, true);
                    queue.push((nx, ny));
                }
            }
        }
    }
}

/// Drops points whose incoming and outgoing steps share a direction.
fn compress_runs(points: Vec<Point2i>) -> Vec<Point2i> {
    let n = points.len();
    if n < 3 {
        return points;
    }

    let delta = |a: Point2i, b: Point2i| (b.x - a.x, b.y - a.y);
    (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            delta(prev, points[i]) != delta(points[i], next)
        })
        .map(|i| points[i])
        .collect()
}
