//! Module for creating sampling grids
#![warn(missing_docs)]
use crate::error::{BeamPropError, BpResult};
use log::warn;
use nalgebra::{DVector, Scalar};
use num::{Float, NumCast};

/// Creates a linearly spaced Vector (Matrix with1 column and `num` rows) from `start` to `end`
/// # Attributes
/// - `start`:  Start value of the array
/// - `end`:    end value of the array (included)
/// - `num`:    number of elements
///
/// # Errors
/// This function will return an error if
///  - `start` or `end` are not finite.
///  - `num` cannot be casted to the float type `T`.
pub fn linspace<T: Float + Scalar>(start: T, end: T, num: usize) -> BpResult<DVector<T>> {
    if !start.is_finite() || !end.is_finite() {
        return Err(BeamPropError::Other(
            "start and end values must be finite!".into(),
        ));
    };

    let mut linspace = DVector::<T>::from_element(num, start);
    if num < 2 {
        warn!("Using linspace with less than two elements results in an empty Vector for num=0 or a Vector with one entry being num=start");
        return Ok(linspace);
    }

    let bin_size = (end - start)
        / <T as NumCast>::from(num - 1)
            .ok_or_else(|| BeamPropError::Other("Cannot Cast usize to float type!".into()))?;

    for (step, val) in linspace.iter_mut().enumerate() {
        let step = <T as NumCast>::from(step)
            .ok_or_else(|| BeamPropError::Other("Cannot Cast usize to float type!".into()))?;
        *val = *val + step * bin_size;
    }
    // avoid accumulated rounding on the end point
    linspace[num - 1] = end;
    Ok(linspace)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::test_helper::test_helper::check_warnings;
    use approx::assert_abs_diff_eq;
    #[test]
    fn linspace_test() {
        let x = linspace(1., 3., 3).unwrap();
        assert_eq!(x.len(), 3);
        assert_abs_diff_eq!(x[0], 1.);
        assert_abs_diff_eq!(x[1], 2.);
        assert_abs_diff_eq!(x[2], 3.);

        assert!(linspace(1., f64::NAN, 3).is_err());
        assert!(linspace(f64::NAN, 3., 3).is_err());
        assert!(linspace(f64::INFINITY, 3., 3).is_err());
        assert!(linspace(f64::NEG_INFINITY, 3., 3).is_err());
        assert!(linspace(1., f64::NEG_INFINITY, 3).is_err());
        assert!(linspace(1., f64::INFINITY, 3).is_err());
    }
    #[test]
    fn linspace_end_point() {
        let x = linspace(-0.1, 0.5, 1000).unwrap();
        assert_eq!(x.len(), 1000);
        assert_eq!(x[0], -0.1);
        assert_eq!(x[999], 0.5);
    }
    #[test]
    fn linspace_too_short() {
        testing_logger::setup();
        let x = linspace(1., 3., 1).unwrap();
        assert_eq!(x.len(), 1);
        assert_abs_diff_eq!(x[0], 1.);
        check_warnings(vec!["Using linspace with less than two elements results in an empty Vector for num=0 or a Vector with one entry being num=start"]);
    }
}
