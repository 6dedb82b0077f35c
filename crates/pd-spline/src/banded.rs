/// Symmetric pentadiagonal matrix stored by its lower bands.
///
/// `sub1[i]` is `A[i][i-1]` and `sub2[i]` is `A[i][i-2]`; entries that would
/// fall outside the matrix are ignored.
#[derive(Debug, Clone)]
pub(crate) struct Pentadiagonal {
    pub diag: Vec<f64>,
    pub sub1: Vec<f64>,
    pub sub2: Vec<f64>,
}

impl Pentadiagonal {
    pub fn zeros(n: usize) -> Self {
        Self {
            diag: vec![0.0; n],
            sub1: vec![0.0; n],
            sub2: vec![0.0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.diag.len()
    }

    /// `A = L·D·Lᵀ` with unit lower-triangular `L`. Returns `None` when a
    /// pivot is not strictly positive.
    pub fn factor(&self) -> Option<LdlFactor> {
        let n = self.len();
        let mut d = vec![0.0; n];
        let mut l1 = vec![0.0; n];
        let mut l2 = vec![0.0; n];

        for i in 0..n {
            if i >= 2 {
                l2[i] = self.sub2[i] / d[i - 2];
            }
            if i >= 1 {
                let coupled = if i >= 2 { l2[i] * d[i - 2] * l1[i - 1] } else { 0.0 };
                l1[i] = (self.sub1[i] - coupled) / d[i - 1];
            }

            let mut di = self.diag[i];
            if i >= 1 {
                di -= l1[i] * l1[i] * d[i - 1];
            }
            if i >= 2 {
                di -= l2[i] * l2[i] * d[i - 2];
            }
            if !(di.is_finite() && di > 0.0) {
                return None;
            }
            d[i] = di;
        }

        Some(LdlFactor { d, l1, l2 })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct LdlFactor {
    d: Vec<f64>,
    l1: Vec<f64>,
    l2: Vec<f64>,
}

impl LdlFactor {
    pub fn solve(&self, b: &[f64]) -> Vec<f64> {
        let n = self.d.len();
        debug_assert_eq!(b.len(), n);

        let mut x = b.to_vec();
        for i in 0..n {
            if i >= 1 {
                x[i] -= self.l1[i] * x[i - 1];
            }
            if i >= 2 {
                x[i] -= self.l2[i] * x[i - 2];
            }
        }
        for i in 0..n {
            x[i] /= self.d[i];
        }
        for i in (0..n).rev() {
            if i + 1 < n {
                x[i] -= self.l1[i + 1] * x[i + 1];
            }
            if i + 2 < n {
                x[i] -= self.l2[i + 2] * x[i + 2];
            }
        }
        x
    }
}
