//! Hysteresis edge detection at a single scale.
//!
//! Gradients come from the 3x3 Sobel operator with replicated borders and the
//! magnitude is the L1 norm `|gx| + |gy|`. Non-maximum suppression compares
//! each pixel against its two neighbors along the gradient direction
//! quantized to 0/45/90/135 degrees. The outermost one-pixel frame never
//! produces edges.
//!
//! Threshold behavior:
//! - a pixel is strong when its suppressed magnitude is `> high_thresh`;
//! - a pixel is weak when it is `> low_thresh` and survives only if it is
//!   8-connected, through other weak pixels, to a strong one;
//! - swapped thresholds are reordered.

use pd_core::{EdgeMask, Image, ImageView};

#[derive(Debug, Clone, PartialEq)]
pub struct CannyConfig {
    pub low_thresh: f32,
    pub high_thresh: f32,
}

impl Default for CannyConfig {
    fn default() -> Self {
        Self {
            low_thresh: 50.0,
            high_thresh: 150.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CannyDetector {
    tmp: Image<f32>,
    gx: Image<f32>,
    gy: Image<f32>,
    mag: Image<f32>,
    nms: Image<f32>,
    weak: Vec<u8>,
    visited: Vec<u8>,
    stack: Vec<usize>,
}

impl CannyDetector {
    pub fn new() -> Self {
        Self {
            tmp: Image::new_fill(0, 0, 0.0),
            gx: Image::new_fill(0, 0, 0.0),
            gy: Image::new_fill(0, 0, 0.0),
            mag: Image::new_fill(0, 0, 0.0),
            nms: Image::new_fill(0, 0, 0.0),
            weak: Vec::new(),
            visited: Vec::new(),
            stack: Vec::new(),
        }
    }

    pub fn detect_u8(&mut self, img: &ImageView<'_, u8>, cfg: &CannyConfig) -> EdgeMask {
        let (w, h) = img.dims();
        self.ensure_dims(w, h);
        copy_u8_to_tmp(img, self.tmp.data_mut(), w);

        if w == 0 || h == 0 {
            return EdgeMask::empty(w, h);
        }

        self.compute_sobel();
        self.non_max_suppression();
        let count = self.hysteresis(cfg);

        self.build_mask(count)
    }

    fn ensure_dims(&mut self, w: usize, h: usize) {
        if self.tmp.width() != w || self.tmp.height() != h {
            self.tmp = Image::new_fill(w, h, 0.0);
            self.gx = Image::new_fill(w, h, 0.0);
            self.gy = Image::new_fill(w, h, 0.0);
            self.mag = Image::new_fill(w, h, 0.0);
            self.nms = Image::new_fill(w, h, 0.0);
        }

        let n = w.saturating_mul(h);
        if self.weak.len() != n {
            self.weak = vec![0; n];
            self.visited = vec![0; n];
        }
    }

    fn compute_sobel(&mut self) {
        let w = self.tmp.width();
        let h = self.tmp.height();
        let src = self.tmp.data();

        let gx = self.gx.data_mut();
        let gy = self.gy.data_mut();
        let mag = self.mag.data_mut();

        for y in 0..h {
            let ym1 = y.saturating_sub(1);
            let yp1 = (y + 1).min(h - 1);
            for x in 0..w {
                let xm1 = x.saturating_sub(1);
                let xp1 = (x + 1).min(w - 1);

                let p00 = src[ym1 * w + xm1];
                let p01 = src[ym1 * w + x];
                let p02 = src[ym1 * w + xp1];
                let p10 = src[y * w + xm1];
                let p12 = src[y * w + xp1];
                let p20 = src[yp1 * w + xm1];
                let p21 = src[yp1 * w + x];
                let p22 = src[yp1 * w + xp1];

                let gxx = (p02 + 2.0 * p12 + p22) - (p00 + 2.0 * p10 + p20);
                let gyy = (p20 + 2.0 * p21 + p22) - (p00 + 2.0 * p01 + p02);

                let idx = y * w + x;
                gx[idx] = gxx;
                gy[idx] = gyy;
                mag[idx] = gxx.abs() + gyy.abs();
            }
        }
    }

    fn non_max_suppression(&mut self) {
        let w = self.tmp.width();
        let h = self.tmp.height();
        let gx = self.gx.data();
        let gy = self.gy.data();
        let mag = self.mag.data();
        let nms = self.nms.data_mut();

        nms.fill(0.0);
        if w < 3 || h < 3 {
            return;
        }

        const TAN22_5: f32 = 0.414_213_57;
        const TAN67_5: f32 = 2.414_213_7;

        for y in 1..(h - 1) {
            for x in 1..(w - 1) {
                let idx = y * w + x;
                let m = mag[idx];
                if m <= 0.0 {
                    continue;
                }

                let gxx = gx[idx];
                let gyy = gy[idx];
                let ax = gxx.abs();
                let ay = gyy.abs();

                let (i1, i2) = if ay <= ax * TAN22_5 {
                    (idx - 1, idx + 1)
                } else if ay >= ax * TAN67_5 {
                    (idx - w, idx + w)
                } else if gxx * gyy > 0.0 {
                    (idx - w - 1, idx + w + 1)
                } else {
                    (idx - w + 1, idx + w - 1)
                };

                if m >= mag[i1] && m >= mag[i2] {
                    nms[idx] = m;
                }
            }
        }
    }

    fn hysteresis(&mut self, cfg: &CannyConfig) -> usize {
        let w = self.tmp.width();
        let h = self.tmp.height();

        self.weak.fill(0);
        self.visited.fill(0);
        self.stack.clear();

        let mut low = cfg.low_thresh;
        let mut high = cfg.high_thresh;
        if high < low {
            core::mem::swap(&mut high, &mut low);
        }

        for (idx, &v) in self.nms.data().iter().enumerate() {
            if v <= 0.0 {
                continue;
            }
            if v > low {
                self.weak[idx] = 1;
            }
            if v > high {
                self.visited[idx] = 1;
                self.stack.push(idx);
            }
        }

        let mut count = self.stack.len();

        while let Some(idx) = self.stack.pop() {
            let x = idx % w;
            let y = idx / w;

            let y0 = y.saturating_sub(1);
            let y1 = (y + 1).min(h - 1);
            let x0 = x.saturating_sub(1);
            let x1 = (x + 1).min(w - 1);

            for ny in y0..=y1 {
                for nx in x0..=x1 {
                    let nidx = ny * w + nx;
                    if self.visited[nidx] == 0 && self.weak[nidx] != 0 {
                        self.visited[nidx] = 1;
                        self.stack.push(nidx);
                        count += 1;
                    }
                }
            }
        }

        count
    }

    fn build_mask(&self, count: usize) -> EdgeMask {
        let w = self.tmp.width();
        let h = self.tmp.height();
        let mut mask = EdgeMask::empty(w, h);
        if count == 0 {
            return mask;
        }

        for (idx, &v) in self.visited.iter().enumerate() {
            if v != 0 {
                mask.set(idx % w, idx / w, true);
            }
        }
        mask
    }
}

impl Default for CannyDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot convenience wrapper around [`CannyDetector`].
pub fn canny_u8(img: &ImageView<'_, u8>, cfg: &CannyConfig) -> EdgeMask {
    CannyDetector::new().detect_u8(img, cfg)
}

fn copy_u8_to_tmp(src: &ImageView<'_, u8>, dst: &mut [f32], dst_w: usize) {
    for y in 0..src.height() {
        let s = src.row(y);
        let d = &mut dst[y * dst_w..(y + 1) * dst_w];
        for (dv, &sv) in d.iter_mut().zip(s.iter()) {
            *dv = sv as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use pd_core::{EDGE, Image};

    use crate::canny::{CannyConfig, CannyDetector, canny_u8};

    fn vertical_step(w: usize, h: usize, edge_x: usize) -> Image<u8> {
        Image::from_fn(w, h, |x, _| if x >= edge_x { 220 } else { 30 })
    }

    #[test]
    fn vertical_step_yields_edge_columns_at_the_transition() {
        let img = vertical_step(40, 30, 20);
        let mask = canny_u8(&img.as_view(), &CannyConfig::default());

        assert_eq!(mask.dims(), (40, 30));
        for y in 1..29 {
            assert!(mask.is_edge(19, y) || mask.is_edge(20, y), "row {y}");
            for x in (1..17).chain(23..39) {
                assert!(!mask.is_edge(x, y), "spurious edge at ({x}, {y})");
            }
        }
        assert!(mask.as_image().data().iter().all(|&v| v == 0 || v == EDGE));
    }

    #[test]
    fn outer_frame_is_never_marked() {
        let img = Image::from_fn(16, 16, |x, y| if (x + y) % 2 == 0 { 0 } else { 255 });
        let mask = canny_u8(&img.as_view(), &CannyConfig::default());

        for i in 0..16 {
            assert!(!mask.is_edge(i, 0));
            assert!(!mask.is_edge(i, 15));
            assert!(!mask.is_edge(0, i));
            assert!(!mask.is_edge(15, i));
        }
    }

    #[test]
    fn flat_image_has_no_edges() {
        let img = Image::new_fill(32, 24, 128u8);
        let mask = canny_u8(&img.as_view(), &CannyConfig::default());
        assert!(mask.is_blank());
    }

    #[test]
    fn weak_edges_need_a_strong_neighbor() {
        // Step of 40 gray levels: Sobel L1 magnitude 160 on the transition.
        let img = Image::from_fn(40, 30, |x, _| if x >= 20 { 140 } else { 100 });

        let connected = CannyConfig {
            low_thresh: 50.0,
            high_thresh: 150.0,
        };
        let isolated = CannyConfig {
            low_thresh: 50.0,
            high_thresh: 170.0,
        };

        let mut det = CannyDetector::new();
        assert!(!det.detect_u8(&img.as_view(), &connected).is_blank());
        assert!(det.detect_u8(&img.as_view(), &isolated).is_blank());
    }

    #[test]
    fn thresholds_are_strict_and_reordered() {
        let img = Image::from_fn(40, 30, |x, _| if x >= 20 { 140 } else { 100 });
        let mut det = CannyDetector::new();

        let at_magnitude = CannyConfig {
            low_thresh: 160.0,
            high_thresh: 160.0,
        };
        assert!(det.detect_u8(&img.as_view(), &at_magnitude).is_blank());

        let swapped = CannyConfig {
            low_thresh: 150.0,
            high_thresh: 50.0,
        };
        assert!(!det.detect_u8(&img.as_view(), &swapped).is_blank());
    }

    #[test]
    fn detector_reuses_buffers_across_sizes() {
        let mut det = CannyDetector::new();
        let a = det.detect_u8(&vertical_step(40, 30, 20).as_view(), &CannyConfig::default());
        let b = det.detect_u8(&vertical_step(64, 48, 10).as_view(), &CannyConfig::default());
        let a2 = det.detect_u8(&vertical_step(40, 30, 20).as_view(), &CannyConfig::default());

        assert_eq!(b.dims(), (64, 48));
        assert_eq!(a, a2);
    }
}
