//! Smooth bump functions and one-dimensional windows.
//!
//! The construction is the classical one used for partitions of unity
//! (see L. W. Tu, *An Introduction to Manifolds*, §13.1, and
//! <https://math.stackexchange.com/a/2064866/429591>):
//!
//! - `f(t) = 0` for `t ≤ 0` and `exp(-1/t)` for `t > 0`;
//! - `g(t) = f(t) / (f(t) + f(1 - t))`, a smooth step from 0 to 1 on
//!   \[0, 1\];
//! - `ρ(x) = 1 - g((x² - a²) / (b² - a²))`, equal to 1 for `|x| ≤ a`
//!   and to 0 for `|x| ≥ b`.

use ndarray::{Array, ArrayBase, Data, Dimension};
#[cfg(feature = "curve-sampling")]
use curve_sampling::Sampling;
use crate::Error;

/// Perturbation applied to the argument of a [`Bump`] when the
/// rescaling of its transition band is `0/0`.
pub const EPSILON: f64 = 1e-6;

/// Default rounding length of a [`Window`].
pub const DEFAULT_ROUNDING: f64 = 0.5;

/// The function `t ↦ exp(-1/t)` for `t > 0`, extended by 0.
/// It is C^∞ and all its derivatives vanish at 0.
#[inline]
pub fn smooth_base(t: f64) -> f64 {
    if t <= 0. { 0. } else { (-1. / t).exp() }
}

/// Smooth non-decreasing step, 0 for `t ≤ 0` and 1 for `t ≥ 1`.
#[inline]
pub fn smooth_step(t: f64) -> f64 {
    if t <= 0. {
        0.
    } else if t >= 1. {
        1.
    } else {
        // At least one of the two terms is ≥ exp(-2) on ]0, 1[.
        let f = smooth_base(t);
        f / (f + smooth_base(1. - t))
    }
}

/// Smooth bump function, equal to 1 on \[-`inner`, `inner`\] and to 0
/// outside \]-`outer`, `outer`\[.  See [`bump`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bump {
    inner: f64,
    outer: f64,
}

/// Return the bump function ρ such that ρ(x) = 1 if |x| ≤ `inner`,
/// ρ(x) = 0 if |x| ≥ `outer` and ρ is C^∞ in between.
///
/// When `inner == outer`, ρ is the indicator of \[-`inner`, `inner`\]
/// except at the bounds themselves where the argument is shifted by
/// [`EPSILON`]: ρ(`inner`) = 0 and ρ(-`inner`) = 1.
///
/// # Example
///
/// ```
/// let rho = mplwp::bump(1., 2.);
/// assert_eq!(rho.eval(0.5), 1.);
/// assert_eq!(rho.eval(-3.), 0.);
/// assert!(0. < rho.eval(1.5) && rho.eval(1.5) < 1.);
/// ```
pub fn bump(inner: f64, outer: f64) -> Bump {
    Bump { inner, outer }
}

impl Bump {
    pub fn inner(&self) -> f64 { self.inner }

    pub fn outer(&self) -> f64 { self.outer }

    /// Position of `x²` in the transition band, or `None` when the
    /// rescaling is `0/0`.
    fn rescale(&self, x: f64) -> Option<f64> {
        let a2 = self.inner * self.inner;
        let num = x * x - a2;
        let den = self.outer * self.outer - a2;
        if num == 0. && den == 0. {
            None
        } else {
            Some(num / den)
        }
    }

    fn try_eval(&self, x: f64) -> Option<f64> {
        self.rescale(x).map(|t| 1. - smooth_step(t))
    }

    /// Evaluate the bump function at `x`.
    pub fn eval(&self, x: f64) -> f64 {
        match self.try_eval(x) {
            Some(y) => y,
            // Still on the (degenerate) band: that is the outer bound.
            None => self.try_eval(x + EPSILON).unwrap_or(0.),
        }
    }

    /// Evaluate the bump function at each element of `x`.
    ///
    /// # Example
    ///
    /// ```
    /// use ndarray::array;
    /// let y = mplwp::bump(1., 2.).map(&array![0., 3., -1.]);
    /// assert_eq!(y, array![1., 0., 1.]);
    /// ```
    pub fn map<S, D>(&self, x: &ArrayBase<S, D>) -> Array<f64, D>
    where S: Data<Elem = f64>, D: Dimension {
        x.mapv(|x| self.eval(x))
    }

    #[cfg(feature = "curve-sampling")]
    /// Adaptive sampling of the graph of the bump function on the
    /// interval \[`a`, `b`\] using at most `n` evaluations.
    pub fn sampling(&self, a: f64, b: f64, n: usize) -> Sampling {
        Sampling::fun(|x| self.eval(x), a, b).n(n).build()
    }
}

/// Smooth window on \[`left`, `right`\].  See [`one_d_window`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    left: f64,
    right: f64,
    bump: Bump,
}

/// Return a smooth window equal to 1 on
/// \[`left` + `rounding`, `right` - `rounding`\], to 0 outside
/// \]`left`, `right`\[, and C^∞ in between.
///
/// Return an error unless `0 ≤ rounding ≤ (right - left) / 2`.
///
/// # Example
///
/// ```
/// let w = mplwp::one_d_window(-4., -1., 1.)?;
/// assert_eq!(w.eval(-2.5), 1.);
/// assert_eq!(w.eval(0.), 0.);
/// # Ok::<(), mplwp::Error>(())
/// ```
pub fn one_d_window(
    left: f64, right: f64, rounding: f64
) -> Result<Window, Error> {
    let half_width = (right - left) / 2.;
    if !(rounding.is_finite() && half_width.is_finite())
        || rounding < 0. || rounding > half_width {
        return Err(Error::Rounding { rounding, half_width })
    }
    Ok(Window { left, right,
                bump: bump(half_width - rounding, half_width) })
}

impl Window {
    /// Return the window on \[`left`, `right`\] with the default
    /// rounding length [`DEFAULT_ROUNDING`].
    pub fn new(left: f64, right: f64) -> Result<Window, Error> {
        one_d_window(left, right, DEFAULT_ROUNDING)
    }

    pub fn left(&self) -> f64 { self.left }

    pub fn right(&self) -> f64 { self.right }

    pub fn center(&self) -> f64 { (self.left + self.right) / 2. }

    pub fn half_width(&self) -> f64 { (self.right - self.left) / 2. }

    pub fn rounding(&self) -> f64 { self.bump.outer - self.bump.inner }

    /// The bump function centered at 0 that this window translates.
    pub fn bump(&self) -> Bump { self.bump }

    pub fn eval(&self, x: f64) -> f64 {
        self.bump.eval(x - self.center())
    }

    /// Evaluate the window at each element of `x`.
    pub fn map<S, D>(&self, x: &ArrayBase<S, D>) -> Array<f64, D>
    where S: Data<Elem = f64>, D: Dimension {
        x.mapv(|x| self.eval(x))
    }

    #[cfg(feature = "curve-sampling")]
    /// Adaptive sampling of the window on its support extended by
    /// half its width on each side, using at most `n` evaluations.
    pub fn sampling(&self, n: usize) -> Sampling {
        let w = self.half_width();
        Sampling::fun(|x| self.eval(x), self.left - w, self.right + w)
            .n(n).build()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array1};

    #[test]
    fn step_endpoints() {
        assert_eq!(smooth_step(0.), 0.);
        assert_eq!(smooth_step(1.), 1.);
        assert_relative_eq!(smooth_step(0.5), 0.5);
        assert_eq!(smooth_step(f64::INFINITY), 1.);
        assert_eq!(smooth_step(f64::NEG_INFINITY), 0.);
        assert_eq!(smooth_step(1e-300), 0.);
        assert_eq!(smooth_step(1. - 1e-16), 1.);
    }

    #[test]
    fn step_is_monotone() {
        let t = Array1::linspace(-0.5, 1.5, 401);
        let g = t.mapv(smooth_step);
        assert!(g.windows(2).into_iter().all(|w| w[0] <= w[1] + 1e-15));
    }

    #[test]
    fn plateau_and_support() {
        let rho = bump(1., 3.);
        for x in Array1::linspace(-1., 1., 101) {
            assert_eq!(rho.eval(x), 1.);
        }
        for x in [3., -3., 3.5, -10., 1e10, f64::MAX] {
            assert_eq!(rho.eval(x), 0.);
        }
        for x in [1.5, 2., -2.5] {
            let y = rho.eval(x);
            assert!(0. < y && y < 1., "rho({}) = {}", x, y);
        }
    }

    #[test]
    fn symmetric() {
        let rho = bump(0.3, 1.7);
        for x in Array1::linspace(0., 2., 57) {
            assert_eq!(rho.eval(x), rho.eval(-x));
        }
    }

    #[test]
    fn degenerate_bounds() {
        let rho = bump(1., 1.);
        assert_eq!(rho.eval(0.5), 1.);
        assert_eq!(rho.eval(2.), 0.);
        assert_eq!(rho.eval(1.), 0.);
        assert_eq!(rho.eval(-1.), 1.);
        for x in Array1::linspace(-3., 3., 601) {
            let y = rho.eval(x);
            assert!(y == 0. || y == 1., "rho({}) = {}", x, y);
        }
        assert_eq!(bump(0., 0.).eval(0.), 0.);
    }

    #[test]
    fn vectorized() {
        let x = array![[0., 1.], [2., 5.]];
        let y = bump(1., 2.).map(&x);
        assert_eq!(y.shape(), &[2, 2]);
        assert_eq!(y[[0, 0]], 1.);
        assert_eq!(y[[0, 1]], 1.);
        assert_eq!(y[[1, 0]], 0.);
        assert_eq!(y[[1, 1]], 0.);
    }

    #[test]
    fn window_values() -> Result<(), Error> {
        let w = one_d_window(-4., -1., 1.)?;
        assert_eq!(w.center(), -2.5);
        assert_eq!(w.half_width(), 1.5);
        assert_eq!(w.rounding(), 1.);
        assert_eq!(w.eval(-2.5), 1.);
        assert_eq!(w.eval(-3.), 1.);
        assert_eq!(w.eval(-2.), 1.);
        assert_eq!(w.eval(-4.), 0.);
        assert_eq!(w.eval(-1.), 0.);
        assert_eq!(w.eval(100.), 0.);
        let x = Array1::linspace(-5., 5., 500);
        let y = w.map(&x);
        assert!(y.iter().all(|&y| (0. ..= 1.).contains(&y)));
        assert!(x.iter().zip(&y).all(|(&x, &y)| w.eval(x) == y));
        Ok(())
    }

    #[test]
    fn window_default_rounding() -> Result<(), Error> {
        let w = Window::new(0., 4.)?;
        assert_eq!(w.eval(2.), 1.);
        assert_eq!(w.eval(0.5), 1.);
        assert!(w.eval(0.25) < 1.);
        assert_eq!(w.eval(-1.), 0.);
        Ok(())
    }

    #[test]
    fn window_zero_rounding_is_indicator() -> Result<(), Error> {
        let w = one_d_window(0., 2., 0.)?;
        assert_eq!(w.eval(1.), 1.);
        assert_eq!(w.eval(1.9), 1.);
        assert_eq!(w.eval(2.1), 0.);
        Ok(())
    }

    #[test]
    fn window_rejects_bad_rounding() {
        assert!(matches!(one_d_window(0., 1., 0.6),
                         Err(Error::Rounding { .. })));
        assert!(matches!(one_d_window(0., 1., -0.1),
                         Err(Error::Rounding { .. })));
        assert!(matches!(one_d_window(1., 0., 0.),
                         Err(Error::Rounding { .. })));
        assert!(one_d_window(0., 1., f64::NAN).is_err());
        assert!(Window::new(0., 0.5).is_err());
    }

    #[cfg(feature = "curve-sampling")]
    #[test]
    fn sampling_in_unit_interval() {
        let s = bump(1., 2.).sampling(-3., 3., 100);
        let y = s.y();
        assert!(!y.is_empty());
        assert!(y.iter().filter(|y| y.is_finite())
                .all(|&y| (0. ..= 1.).contains(&y)));
    }
}
