use crate::{Error, Image, ImageView};

pub const BACKGROUND: u8 = 0;
pub const EDGE: u8 = 255;

/// Binary raster restricted to `{BACKGROUND, EDGE}`.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMask {
    img: Image<u8>,
}

impl EdgeMask {
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            img: Image::new_fill(width, height, BACKGROUND),
        }
    }

    /// Marks every pixel strictly greater than `thresh` as an edge.
    pub fn from_threshold(src: &ImageView<'_, u8>, thresh: u8) -> Self {
        let img = Image::from_fn(src.width(), src.height(), |x, y| {
            if src.row(y)[x] > thresh { EDGE } else { BACKGROUND }
        });
        Self { img }
    }

    pub fn width(&self) -> usize {
        self.img.width()
    }

    pub fn height(&self) -> usize {
        self.img.height()
    }

    pub fn dims(&self) -> (usize, usize) {
        self.img.dims()
    }

    pub fn is_edge(&self, x: usize, y: usize) -> bool {
        self.img.get(x, y).is_some_and(|&v| v != BACKGROUND)
    }

    /// Sets or clears a pixel; coordinates outside the mask are ignored.
    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        if let Some(v) = self.img.get_mut(x, y) {
            *v = if on { EDGE } else { BACKGROUND };
        }
    }

    pub fn count(&self) -> usize {
        self.img.data().iter().filter(|&&v| v != BACKGROUND).count()
    }

    pub fn is_blank(&self) -> bool {
        self.img.data().iter().all(|&v| v == BACKGROUND)
    }

    pub fn iter_edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let w = self.width().max(1);
        self.img
            .data()
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != BACKGROUND)
            .map(move |(i, _)| (i % w, i / w))
    }

    pub fn as_view(&self) -> ImageView<'_, u8> {
        self.img.as_view()
    }

    pub fn as_image(&self) -> &Image<u8> {
        &self.img
    }

    pub fn ensure_same_dims(&self, other: &EdgeMask) -> Result<(), Error> {
        if self.dims() != other.dims() {
            return Err(Error::DimensionMismatch {
                expected: self.dims(),
                actual: other.dims(),
            });
        }
        Ok(())
    }

    /// `self AND NOT removal`.
    pub fn subtract(&self, removal: &EdgeMask) -> Result<EdgeMask, Error> {
        self.ensure_same_dims(removal)?;
        let data = self
            .img
            .data()
            .iter()
            .zip(removal.img.data())
            .map(|(&a, &r)| if r != BACKGROUND { BACKGROUND } else { a })
            .collect();
        let img = Image::from_vec(self.width(), self.height(), data)?;
        Ok(Self { img })
    }
}

#[cfg(test)]
mod tests {
    use super::{BACKGROUND, EDGE, EdgeMask};
    use crate::{Error, Image};

    #[test]
    fn threshold_is_strict() {
        let img = Image::from_vec(4, 1, vec![0u8, 1, 50, 51]).expect("valid image");

        let by_thresh = EdgeMask::from_threshold(&img.as_view(), 50);
        assert_eq!(
            by_thresh.as_image().data(),
            &[BACKGROUND, BACKGROUND, BACKGROUND, EDGE]
        );
        assert_eq!(by_thresh.count(), 1);
    }

    #[test]
    fn subtract_clears_removed_pixels_only() {
        let mut a = EdgeMask::empty(3, 3);
        a.set(0, 0, true);
        a.set(1, 1, true);
        a.set(2, 2, true);

        let mut r = EdgeMask::empty(3, 3);
        r.set(1, 1, true);
        r.set(0, 2, true);

        let out = a.subtract(&r).expect("same dims");
        assert!(out.is_edge(0, 0));
        assert!(!out.is_edge(1, 1));
        assert!(out.is_edge(2, 2));
        assert!(!out.is_edge(0, 2));
        assert_eq!(out.iter_edges().collect::<Vec<_>>(), vec![(0, 0), (2, 2)]);
    }

    #[test]
    fn mismatched_dims_are_rejected() {
        let a = EdgeMask::empty(3, 3);
        let b = EdgeMask::empty(4, 3);
        assert_eq!(
            a.subtract(&b).err(),
            Some(Error::DimensionMismatch {
                expected: (3, 3),
                actual: (4, 3)
            })
        );
    }
}
