//! Binary morphology on [`EdgeMask`]s.
//!
//! The structuring element is a filled square anchored at its center (for
//! even sizes the anchor sits at `size / 2`). Samples that fall outside the
//! image are ignored by both operators, so the border neither grows nor
//! erodes the foreground. Square windows are separable; each pass is a
//! horizontal run followed by a vertical run.

use pd_core::{EdgeMask, Image};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuringElement {
    Square(usize),
}

impl StructuringElement {
    /// Offsets covered before and after the anchor.
    fn reach(self) -> (usize, usize) {
        match self {
            StructuringElement::Square(k) => {
                let k = k.max(1);
                let before = k / 2;
                (before, k - 1 - before)
            }
        }
    }
}

impl Default for StructuringElement {
    fn default() -> Self {
        StructuringElement::Square(3)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Dilate,
    Erode,
}

pub fn dilate(src: &EdgeMask, se: StructuringElement, iterations: usize) -> EdgeMask {
    repeat(src, se, iterations, Op::Dilate)
}

pub fn erode(src: &EdgeMask, se: StructuringElement, iterations: usize) -> EdgeMask {
    repeat(src, se, iterations, Op::Erode)
}

/// `iterations` dilations followed by `iterations` erosions.
pub fn close(src: &EdgeMask, se: StructuringElement, iterations: usize) -> EdgeMask {
    let dilated = dilate(src, se, iterations);
    erode(&dilated, se, iterations)
}

fn repeat(src: &EdgeMask, se: StructuringElement, iterations: usize, op: Op) -> EdgeMask {
    let mut cur = src.clone();
    if cur.width() == 0 || cur.height() == 0 {
        return cur;
    }

    let mut tmp = Image::new_fill(cur.width(), cur.height(), 0u8);
    for _ in 0..iterations {
        cur = apply_once(&cur, se, op, &mut tmp);
    }
    cur
}

fn apply_once(src: &EdgeMask, se: StructuringElement, op: Op, tmp: &mut Image<u8>) -> EdgeMask {
    let (w, h) = src.dims();
    let (before, after) = se.reach();
    let data = src.as_image().data();

    // A window hits when any (dilate) or all (erode) in-image samples are set.
    let hit = |set: bool| match op {
        Op::Dilate => set,
        Op::Erode => !set,
    };

    let rows = tmp.data_mut();
    for y in 0..h {
        let row = &data[y * w..(y + 1) * w];
        for x in 0..w {
            let x0 = x.saturating_sub(before);
            let x1 = (x + after).min(w - 1);
            let found = row[x0..=x1].iter().any(|&v| hit(v != 0));
            rows[y * w + x] = found as u8;
        }
    }

    let mut out = EdgeMask::empty(w, h);
    for y in 0..h {
        let y0 = y.saturating_sub(before);
        let y1 = (y + after).min(h - 1);
        for x in 0..w {
            let found = (y0..=y1).any(|yy| rows[yy * w + x] != 0);
            let on = match op {
                Op::Dilate => found,
                Op::Erode => !found,
            };
            out.set(x, y, on);
        }
    }
    out
}
