use pd_core::ImageView;

pub fn histogram_u8(src: &ImageView<'_, u8>) -> [usize; 256] {
    let mut hist = [0usize; 256];
    for y in 0..src.height() {
        for &v in src.row(y) {
            hist[v as usize] += 1;
        }
    }
    hist
}

/// Median of all pixel values.
///
/// For an even pixel count this is the mean of the two middle values, so the
/// result may end in `.5`. Returns `None` for an empty image.
pub fn median_intensity(src: &ImageView<'_, u8>) -> Option<f64> {
    let n = src.width() * src.height();
    if n == 0 {
        return None;
    }

    let hist = histogram_u8(src);
    let lo_rank = (n - 1) / 2;
    let hi_rank = n / 2;

    let lo = value_at_rank(&hist, lo_rank);
    let hi = if hi_rank == lo_rank {
        lo
    } else {
        value_at_rank(&hist, hi_rank)
    };
    Some(0.5 * (lo as f64 + hi as f64))
}

fn value_at_rank(hist: &[usize; 256], rank: usize) -> u8 {
    let mut seen = 0usize;
    for (v, &count) in hist.iter().enumerate() {
        seen += count;
        if seen > rank {
            return v as u8;
        }
    }
    u8::MAX
}
