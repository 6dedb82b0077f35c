use pd_core::{BorderMode, Image, ImageView};

/// Square median filter of side `ksize` with replicated borders.
///
/// Even sizes are rounded up to the next odd size; `ksize <= 1` returns a
/// copy of the input.
pub fn median_blur_u8(src: &ImageView<'_, u8>, ksize: usize) -> Image<u8> {
    let ksize = if ksize.is_multiple_of(2) { ksize + 1 } else { ksize };
    if ksize <= 1 {
        return src.to_image();
    }

    let (w, h) = src.dims();
    let r = (ksize / 2) as isize;
    let border = BorderMode::<u8>::Clamp;
    let mid = ksize * ksize / 2;

    let mut window: Vec<u8> = Vec::with_capacity(ksize * ksize);
    let mut out = Image::new_fill(w, h, 0u8);
    let dst = out.data_mut();

    for y in 0..h {
        let interior_y = y as isize >= r && (y as isize) + r < h as isize;
        for x in 0..w {
            window.clear();
            let interior = interior_y && x as isize >= r && (x as isize) + r < w as isize;
            if interior {
                let x0 = x - r as usize;
                for yy in (y - r as usize)..=(y + r as usize) {
                    window.extend_from_slice(&src.row(yy)[x0..x0 + ksize]);
                }
            } else {
                for dy in -r..=r {
                    for dx in -r..=r {
                        window.push(border.fetch(src, x as isize + dx, y as isize + dy));
                    }
                }
            }

            let (_, m, _) = window.select_nth_unstable(mid);
            dst[y * w + x] = *m;
        }
    }

    out
}
