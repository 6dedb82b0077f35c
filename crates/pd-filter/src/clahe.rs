use pd_core::{BorderMode, Image, ImageView};

const BINS: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub struct ClaheConfig {
    /// Histogram clip limit relative to a flat histogram. `<= 0` disables
    /// clipping (plain tile-wise equalization).
    pub clip_limit: f32,
    pub tiles_x: usize,
    pub tiles_y: usize,
}

impl Default for ClaheConfig {
    fn default() -> Self {
        Self {
            clip_limit: 3.0,
            tiles_x: 8,
            tiles_y: 8,
        }
    }
}

pub fn clahe_u8(src: &ImageView<'_, u8>, cfg: &ClaheConfig) -> Image<u8> {
    let (w, h) = src.dims();
    if w == 0 || h == 0 {
        return Image::new_fill(w, h, 0u8);
    }

    let tiles_x = cfg.tiles_x.max(1);
    let tiles_y = cfg.tiles_y.max(1);
    let tile_w = w.div_ceil(tiles_x);
    let tile_h = h.div_ceil(tiles_y);
    let tile_area = tile_w * tile_h;

    let clip = if cfg.clip_limit > 0.0 {
        ((cfg.clip_limit * tile_area as f32 / BINS as f32) as usize).max(1)
    } else {
        usize::MAX
    };

    let mut luts = vec![[0u8; BINS]; tiles_x * tiles_y];
    let mut hist = [0usize; BINS];
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            tile_histogram(src, tx * tile_w, ty * tile_h, tile_w, tile_h, &mut hist);
            clip_and_redistribute(&mut hist, clip);
            luts[ty * tiles_x + tx] = build_lut(&hist, tile_area);
        }
    }

    let inv_tw = 1.0 / tile_w as f32;
    let inv_th = 1.0 / tile_h as f32;
    let x_weights: Vec<(usize, usize, f32)> = (0..w)
        .map(|x| interp_weights(x, inv_tw, tiles_x))
        .collect();

    let mut out = Image::new_fill(w, h, 0u8);
    let dst = out.data_mut();
    for y in 0..h {
        let (ty1, ty2, ya) = interp_weights(y, inv_th, tiles_y);
        let row = src.row(y);
        for (x, &v) in row.iter().enumerate() {
            let (tx1, tx2, xa) = x_weights[x];
            let v = v as usize;
            let l11 = luts[ty1 * tiles_x + tx1][v] as f32;
            let l12 = luts[ty1 * tiles_x + tx2][v] as f32;
            let l21 = luts[ty2 * tiles_x + tx1][v] as f32;
            let l22 = luts[ty2 * tiles_x + tx2][v] as f32;

            let top = l11 * (1.0 - xa) + l12 * xa;
            let bottom = l21 * (1.0 - xa) + l22 * xa;
            let res = top * (1.0 - ya) + bottom * ya;
            dst[y * w + x] = res.round().clamp(0.0, 255.0) as u8;
        }
    }

    out
}

fn tile_histogram(
    src: &ImageView<'_, u8>,
    x0: usize,
    y0: usize,
    tile_w: usize,
    tile_h: usize,
    hist: &mut [usize; BINS],
) {
    hist.fill(0);
    let border = BorderMode::<u8>::Reflect101;
    let fully_inside = x0 + tile_w <= src.width() && y0 + tile_h <= src.height();

    for y in y0..y0 + tile_h {
        if fully_inside {
            for &v in &src.row(y)[x0..x0 + tile_w] {
                hist[v as usize] += 1;
            }
            continue;
        }

        for x in x0..x0 + tile_w {
            let v = border.fetch(src, x as isize, y as isize);
            hist[v as usize] += 1;
        }
    }
}

fn clip_and_redistribute(hist: &mut [usize; BINS], clip: usize) {
    if clip == usize::MAX {
        return;
    }

    let mut excess = 0usize;
    for h in hist.iter_mut() {
        if *h > clip {
            excess += *h - clip;
            *h = clip;
        }
    }

    let batch = excess / BINS;
    let mut residual = excess - batch * BINS;
    for h in hist.iter_mut() {
        *h += batch;
    }

    if residual > 0 {
        let step = (BINS / residual).max(1);
        let mut i = 0;
        while i < BINS && residual > 0 {
            hist[i] += 1;
            residual -= 1;
            i += step;
        }
    }
}

fn build_lut(hist: &[usize; BINS], tile_area: usize) -> [u8; BINS] {
    let scale = 255.0 / tile_area as f32;
    let mut lut = [0u8; BINS];
    let mut sum = 0usize;
    for (i, &h) in hist.iter().enumerate() {
        sum += h;
        lut[i] = (sum as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Neighboring tile indices and the blend weight of the second one.
#[inline]
fn interp_weights(p: usize, inv_tile: f32, tiles: usize) -> (usize, usize, f32) {
    let f = p as f32 * inv_tile - 0.5;
    let i1 = f.floor();
    let a = f - i1;
    let i1 = i1 as isize;
    let lo = i1.max(0) as usize;
    let hi = ((i1 + 1).max(0) as usize).min(tiles - 1);
    (lo.min(tiles - 1), hi, a)
}
