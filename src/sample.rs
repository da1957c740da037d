//! Uniform sampling of arrays by position.

use ndarray::{Array1, ArrayBase, Axis, Data, Ix1};
use crate::Error;

/// Return `n` indices evenly spaced between `0` and `len - 1`
/// (inclusive), rounded to the nearest integer.
///
/// Return an error if `n == 0` or `n > len`.
///
/// # Example
///
/// ```
/// let idx = mplwp::uniform_indices(1000, 10)?;
/// assert_eq!(idx, [0, 111, 222, 333, 444, 555, 666, 777, 888, 999]);
/// # Ok::<(), mplwp::Error>(())
/// ```
pub fn uniform_indices(len: usize, n: usize) -> Result<Vec<usize>, Error> {
    if n == 0 || n > len {
        return Err(Error::SampleCount { requested: n, len })
    }
    if n == 1 {
        return Ok(vec![0])
    }
    // round(i (len-1) / (n-1)) without going through floats, so that
    // the last index is exactly `len - 1`.
    let last = (len - 1) as u128;
    let d = (n - 1) as u128;
    Ok((0 .. n as u128)
        .map(|i| ((2 * i * last + d) / (2 * d)) as usize)
        .collect())
}

/// Uniformly sample `n` elements of `array`.  The elements are taken
/// at the positions given by [`uniform_indices`], so the first and
/// last elements of `array` are always part of the result (when
/// `n >= 2`) and no value is interpolated.
///
/// # Example
///
/// ```
/// use ndarray::Array1;
/// let x = Array1::linspace(0., 100., 1000);
/// let s = mplwp::uniform_sample(&x, 10)?;
/// assert_eq!(s.len(), 10);
/// assert_eq!(s[0], 0.);
/// assert_eq!(s[9], x[999]);
/// # Ok::<(), mplwp::Error>(())
/// ```
pub fn uniform_sample<A, S>(
    array: &ArrayBase<S, Ix1>, n: usize
) -> Result<Array1<A>, Error>
where A: Clone, S: Data<Elem = A> {
    let idx = uniform_indices(array.len(), n)?;
    Ok(array.select(Axis(0), &idx))
}

/// Same as [`uniform_sample`] for slices.
pub fn uniform_sample_slice<A>(array: &[A], n: usize) -> Result<Vec<A>, Error>
where A: Clone {
    let idx = uniform_indices(array.len(), n)?;
    Ok(idx.into_iter().map(|i| array[i].clone()).collect())
}


#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn endpoints_and_count() -> Result<(), Error> {
        for len in 1 .. 40 {
            let a: Vec<usize> = (0 .. len).collect();
            for n in 1 ..= len {
                let s = uniform_sample_slice(&a, n)?;
                assert_eq!(s.len(), n);
                assert_eq!(s[0], 0);
                if n >= 2 {
                    assert_eq!(s[n - 1], len - 1);
                }
                assert!(s.windows(2).all(|w| w[0] <= w[1]));
            }
        }
        Ok(())
    }

    #[test]
    fn nearest_index() -> Result<(), Error> {
        // Positions 0, 1.5, 3 -> 0, 2 (half up), 3.
        assert_eq!(uniform_indices(4, 3)?, [0, 2, 3]);
        // Positions 0, 1.6, 3.2, 4.8, 6.4, 8 -> 0, 2, 3, 5, 6, 8.
        assert_eq!(uniform_indices(9, 6)?, [0, 2, 3, 5, 6, 8]);
        assert_eq!(uniform_indices(5, 5)?, [0, 1, 2, 3, 4]);
        assert_eq!(uniform_indices(11, 6)?, [0, 2, 4, 6, 8, 10]);
        Ok(())
    }

    #[test]
    fn single_sample_is_first() -> Result<(), Error> {
        let a = array![3., 1., 4., 1., 5.];
        assert_eq!(uniform_sample(&a, 1)?, array![3.]);
        Ok(())
    }

    #[test]
    fn out_of_range_counts() {
        let a = array![1., 2., 3.];
        assert!(matches!(uniform_sample(&a, 0),
                         Err(Error::SampleCount { requested: 0, len: 3 })));
        assert!(matches!(uniform_sample(&a, 4),
                         Err(Error::SampleCount { requested: 4, len: 3 })));
        let empty: [f64; 0] = [];
        assert!(uniform_sample_slice(&empty, 1).is_err());
    }

    #[test]
    fn linspace_preview() -> Result<(), Error> {
        let x = Array1::linspace(0., 100., 1000);
        let s = uniform_sample(&x, 10)?;
        for (i, v) in s.iter().enumerate() {
            assert!((v - 100. * i as f64 / 9.).abs() < 1e-9);
        }
        Ok(())
    }
}
