use crate::image::ImageView;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BorderMode<T> {
    Clamp,
    Constant(T),
    Reflect101,
}

/// Maps a possibly out-of-range index onto `[0, len)`.
///
/// Returns `None` for [`BorderMode::Constant`] when `i` is outside the range
/// (the caller substitutes the constant) and for empty axes.
pub fn resolve_index<T>(i: isize, len: usize, mode: &BorderMode<T>) -> Option<usize> {
    if len == 0 {
        return None;
    }

    if i >= 0 && (i as usize) < len {
        return Some(i as usize);
    }

    match mode {
        BorderMode::Constant(_) => None,
        BorderMode::Clamp => Some(if i < 0 { 0 } else { len - 1 }),
        BorderMode::Reflect101 => {
            if len == 1 {
                return Some(0);
            }

            let period = (2 * len - 2) as isize;
            let r = i.rem_euclid(period) as usize;
            Some(if r < len { r } else { period as usize - r })
        }
    }
}

impl<T: Copy> BorderMode<T> {
    /// Reads `(x, y)` from `img`, resolving out-of-range coordinates with this
    /// border policy.
    ///
    /// # Panics
    /// Panics when `img` is empty and the mode is not [`BorderMode::Constant`].
    pub fn fetch(&self, img: &ImageView<'_, T>, x: isize, y: isize) -> T {
        let xi = resolve_index(x, img.width(), self);
        let yi = resolve_index(y, img.height(), self);
        match (xi, yi, self) {
            (Some(xi), Some(yi), _) => *img.get(xi, yi).expect("resolved index is in bounds"),
            (_, _, BorderMode::Constant(v)) => *v,
            _ => panic!("cannot sample an empty image with non-constant border"),
        }
    }
}
