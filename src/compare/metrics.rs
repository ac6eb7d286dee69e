//! Discrepancy metrics between two arrays of equal shape
//!
//! Both metrics reduce with a NaN-propagating max, so a NaN anywhere in the
//! inputs shows up in the reported error. An empty array has error 0.

use anyhow::Result;
use ndarray::{ArrayBase, Axis, Data, Dimension};

/// `max(|a - b|)` over all elements
pub fn max_abs_diff<S1, S2, D>(a: &ArrayBase<S1, D>, b: &ArrayBase<S2, D>) -> Result<f64>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
    D: Dimension,
{
    check_shapes(a.shape(), b.shape())?;
    Ok(a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, nan_max))
}

/// Euclidean norm of `a - b` along the last axis, then the max over all
/// remaining axes
///
/// For `[.., 2]` coefficient arrays this is the modulus of the complex
/// difference; for `[n, 3]` G-vector slices it is the length of the
/// difference vector.
pub fn max_row_norm_diff<S1, S2, D>(a: &ArrayBase<S1, D>, b: &ArrayBase<S2, D>) -> Result<f64>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
    D: Dimension,
{
    check_shapes(a.shape(), b.shape())?;
    if a.ndim() == 0 {
        anyhow::bail!("Row norm needs at least one axis");
    }
    let axis = Axis(a.ndim() - 1);
    Ok(a.lanes(axis)
        .into_iter()
        .zip(b.lanes(axis))
        .map(|(x, y)| row_norm(x.iter().zip(y.iter()).map(|(p, q)| p - q)))
        .fold(0.0, nan_max))
}

/// Euclidean norm of a sequence of components
pub fn row_norm<I: IntoIterator<Item = f64>>(components: I) -> f64 {
    components.into_iter().map(|c| c * c).sum::<f64>().sqrt()
}

fn nan_max(acc: f64, x: f64) -> f64 {
    if acc.is_nan() || x.is_nan() {
        f64::NAN
    } else {
        acc.max(x)
    }
}

fn check_shapes(a: &[usize], b: &[usize]) -> Result<()> {
    if a != b {
        anyhow::bail!("Shape mismatch: {:?} vs {:?}", a, b);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2, Array4};
    use proptest::prelude::*;

    #[test]
    fn test_gvecs_error_third_column() {
        let g1 = array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let g2 = array![[1.0, 0.0, 0.0], [0.0, 1.0, 1.0]];
        assert_eq!(max_abs_diff(&g1, &g2).unwrap(), 1.0);
    }

    #[test]
    fn test_wfn_error_single_coefficient() {
        let c1 = Array4::from_shape_vec((1, 1, 1, 2), vec![1.0, 0.0]).unwrap();
        let c2 = Array4::from_shape_vec((1, 1, 1, 2), vec![1.0, 1.0]).unwrap();
        assert_eq!(max_row_norm_diff(&c1, &c2).unwrap(), 1.0);
    }

    #[test]
    fn test_row_norm_uses_whole_row() {
        let a = array![[3.0, 4.0], [0.0, 1.0]];
        let b = Array2::<f64>::zeros((2, 2));
        assert_eq!(max_row_norm_diff(&a, &b).unwrap(), 5.0);
        assert_eq!(max_abs_diff(&a, &b).unwrap(), 4.0);
    }

    #[test]
    fn test_identical_inputs_are_exactly_zero() {
        let c = Array4::from_shape_fn((3, 1, 7, 2), |(b, _, g, k)| (b as f64 + 0.1) * (g as f64 - 2.5) + k as f64);
        assert_eq!(max_row_norm_diff(&c, &c.view()).unwrap(), 0.0);
        assert_eq!(max_abs_diff(&c.view(), &c).unwrap(), 0.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let a = Array2::<f64>::zeros((2, 3));
        let b = Array2::<f64>::zeros((3, 3));
        assert!(max_abs_diff(&a, &b).is_err());
        assert!(max_row_norm_diff(&a, &b).is_err());
    }

    #[test]
    fn test_empty_is_zero() {
        let a = Array2::<f64>::zeros((0, 2));
        assert_eq!(max_row_norm_diff(&a, &a).unwrap(), 0.0);
    }

    #[test]
    fn test_nan_propagates() {
        let a = array![[f64::NAN, 0.0], [5.0, 0.0]];
        let b = Array2::<f64>::zeros((2, 2));
        assert!(max_row_norm_diff(&a, &b).unwrap().is_nan());
        assert!(max_abs_diff(&a, &b).unwrap().is_nan());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_row_norm_is_symmetric(
            rows in 1usize..8,
            values in proptest::collection::vec(-1.0e3f64..1.0e3, 48),
        ) {
            let a = Array2::from_shape_vec((rows, 3), values[..rows * 3].to_vec()).unwrap();
            let b = Array2::from_shape_vec((rows, 3), values[24..24 + rows * 3].to_vec()).unwrap();
            prop_assert_eq!(max_row_norm_diff(&a, &b).unwrap(), max_row_norm_diff(&b, &a).unwrap());
            prop_assert_eq!(max_abs_diff(&a, &b).unwrap(), max_abs_diff(&b, &a).unwrap());
        }
    }
}
