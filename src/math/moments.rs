//! First and second moments of paired samples.
//!
//! Sums of squares are computed two-pass (deviations from the mean), which keeps
//! precision for series that sit far from zero.

/// Means and centred sums of squares/cross-products of `(x, y)` pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairMoments {
    pub n: usize,
    pub mean_x: f64,
    pub mean_y: f64,
    /// `Σ (x - x̄)²`
    pub sxx: f64,
    /// `Σ (y - ȳ)²`
    pub syy: f64,
    /// `Σ (x - x̄)(y - ȳ)`
    pub sxy: f64,
    /// Every `x` is the same value.
    pub x_constant: bool,
    /// Every `y` is the same value.
    pub y_constant: bool,
}

impl PairMoments {
    /// Returns `None` for an empty sample.
    pub fn from_pairs(xs: &[f64], ys: &[f64]) -> Option<Self> {
        let n = xs.len().min(ys.len());
        if n == 0 {
            return None;
        }
        let (xs, ys) = (&xs[..n], &ys[..n]);

        let nf = n as f64;
        let mean_x = xs.iter().sum::<f64>() / nf;
        let mean_y = ys.iter().sum::<f64>() / nf;

        let mut sxx = 0.0;
        let mut syy = 0.0;
        let mut sxy = 0.0;
        for (&x, &y) in xs.iter().zip(ys) {
            let dx = x - mean_x;
            let dy = y - mean_y;
            sxx += dx * dx;
            syy += dy * dy;
            sxy += dx * dy;
        }

        // Exact comparison: a constant column can still leave rounding noise in sxx.
        let x_constant = xs.iter().all(|&x| x == xs[0]);
        let y_constant = ys.iter().all(|&y| y == ys[0]);

        Some(Self {
            n,
            mean_x,
            mean_y,
            sxx,
            syy,
            sxy,
            x_constant,
            y_constant,
        })
    }

    pub fn x_degenerate(&self) -> bool {
        self.x_constant || self.sxx <= 0.0
    }

    pub fn y_degenerate(&self) -> bool {
        self.y_constant || self.syy <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moments_of_small_sample() {
        let m = PairMoments::from_pairs(&[1.0, 2.0, 3.0], &[2.0, 4.0, 9.0]).unwrap();
        assert_eq!(m.n, 3);
        assert!((m.mean_x - 2.0).abs() < 1e-12);
        assert!((m.mean_y - 5.0).abs() < 1e-12);
        assert!((m.sxx - 2.0).abs() < 1e-12);
        assert!((m.syy - 26.0).abs() < 1e-12);
        assert!((m.sxy - 7.0).abs() < 1e-12);
        assert!(!m.x_degenerate());
    }

    #[test]
    fn constant_column_is_degenerate_even_with_rounding() {
        let m = PairMoments::from_pairs(&[0.1, 0.1, 0.1], &[1.0, 2.0, 3.0]).unwrap();
        assert!(m.x_degenerate());
        assert!(!m.y_degenerate());
    }

    #[test]
    fn empty_sample_has_no_moments() {
        assert!(PairMoments::from_pairs(&[], &[]).is_none());
    }
}
