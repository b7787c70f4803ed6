#![warn(missing_docs)]
//! Gaussian beam valid over a bounded axial interval.
//!
//! A [`BeamSegment`] describes an ideal (M² = 1) Gaussian beam by its wavelength, its waist radius
//! and the global axial position of the waist. Several segments are stitched together along the
//! optical axis by a [`BeamPropagation`](crate::propagation::BeamPropagation), each of them valid
//! only in its interval `(z_min, z_max]`.
use crate::{
    error::{BeamPropError, BpResult},
    fitting::curve_fit,
    utils::unit_format::format_scientific,
};
use log::info;
use nalgebra::DVector;
use num::Zero;
use std::f64::consts::PI;
use uom::si::{
    f64::Length,
    length::{meter, micrometer, millimeter},
};

/// A Gaussian beam segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamSegment {
    wavelength: Length,
    waist: Length,
    rayleigh_range: Length,
    /// global position of the focus. The local coordinate is `z - waist_position`.
    waist_position: Length,
    z_min: Length,
    z_max: Length,
}
impl BeamSegment {
    /// Creates a new, unbounded [`BeamSegment`].
    ///
    /// `waist_position` is the global axial position of the beam focus.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the wavelength or the waist radius are not positive and finite.
    ///   - the waist position is not finite.
    pub fn new(wavelength: Length, waist: Length, waist_position: Length) -> BpResult<Self> {
        if !wavelength.is_normal() || wavelength.is_sign_negative() {
            return Err(BeamPropError::InvalidParameter(
                "wavelength must be > 0.0 and finite".into(),
            ));
        }
        if !waist.is_normal() || waist.is_sign_negative() {
            return Err(BeamPropError::InvalidParameter(
                "waist radius must be > 0.0 and finite".into(),
            ));
        }
        if !waist_position.is_finite() {
            return Err(BeamPropError::InvalidParameter(
                "waist position must be finite".into(),
            ));
        }
        Ok(Self {
            wavelength,
            waist,
            rayleigh_range: PI * waist * waist / wavelength,
            waist_position,
            z_min: Length::new::<meter>(f64::NEG_INFINITY),
            z_max: Length::new::<meter>(f64::INFINITY),
        })
    }
    /// Restricts the validity of this [`BeamSegment`] to the interval `(z_min, z_max]`.
    ///
    /// Infinite bounds are allowed.
    ///
    /// # Errors
    ///
    /// This function will return an error if one of the bounds is NaN or if `z_min > z_max`.
    pub fn with_limits(mut self, z_min: Length, z_max: Length) -> BpResult<Self> {
        if z_min.is_nan() || z_max.is_nan() {
            return Err(BeamPropError::InvalidParameter(
                "segment limits must not be NaN".into(),
            ));
        }
        if z_min > z_max {
            return Err(BeamPropError::InvalidParameter(format!(
                "lower segment limit ({} m) must not be larger than the upper limit ({} m)",
                z_min.get::<meter>(),
                z_max.get::<meter>()
            )));
        }
        self.z_min = z_min;
        self.z_max = z_max;
        Ok(self)
    }
    /// Fit a beam to measured spot sizes.
    ///
    /// The unclipped spot size model is fitted to the `(position, size)` pairs with the waist radius
    /// and the waist position as free parameters. The fit starts with a waist of twice the first
    /// measured size located at the first position. The returned segment is unbounded.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - `sizes` and `positions` differ in length, contain less than two values or non-finite values.
    ///   - the fit does not converge ([`BeamPropError::FitDidNotConverge`]).
    ///   - the fitted beam parameters are invalid (see [`BeamSegment::new`]).
    pub fn from_measured_sizes(
        wavelength: Length,
        sizes: &[Length],
        positions: &[Length],
    ) -> BpResult<Self> {
        if sizes.len() != positions.len() {
            return Err(BeamPropError::InvalidParameter(format!(
                "number of sizes ({}) and positions ({}) must be equal",
                sizes.len(),
                positions.len()
            )));
        }
        if sizes.len() < 2 {
            return Err(BeamPropError::InvalidParameter(
                "at least two measured sizes are needed for fitting a beam".into(),
            ));
        }
        if !wavelength.is_normal() || wavelength.is_sign_negative() {
            return Err(BeamPropError::InvalidParameter(
                "wavelength must be > 0.0 and finite".into(),
            ));
        }
        let lambda = wavelength.get::<meter>();
        let z: Vec<f64> = positions.iter().map(|p| p.get::<meter>()).collect();
        let w: Vec<f64> = sizes.iter().map(|s| s.get::<meter>()).collect();
        let model = |z: f64, p: &DVector<f64>| {
            let rayleigh_range = PI * p[0] * p[0] / lambda;
            p[0] * (1.0 + ((z - p[1]) / rayleigh_range).powi(2)).sqrt()
        };
        let fit = curve_fit(model, &z, &w, &[2.0 * w[0], z[0]])?;
        let (waist, waist_position) = (fit.params()[0], fit.params()[1]);
        if let Some(errors) = fit.standard_errors() {
            info!(
                "fitted beam: waist = {} m (± {}), waist position = {} m (± {})",
                format_scientific(waist, 3),
                format_scientific(errors[0], 1),
                format_scientific(waist_position, 3),
                format_scientific(errors[1], 1)
            );
        } else {
            info!(
                "fitted beam: waist = {} m, waist position = {} m",
                format_scientific(waist, 3),
                format_scientific(waist_position, 3)
            );
        }
        Self::new(
            wavelength,
            Length::new::<meter>(waist),
            Length::new::<meter>(waist_position),
        )
    }
    /// Returns the wavelength of this [`BeamSegment`].
    #[must_use]
    pub const fn wavelength(&self) -> Length {
        self.wavelength
    }
    /// Returns the waist radius of this [`BeamSegment`].
    #[must_use]
    pub const fn waist(&self) -> Length {
        self.waist
    }
    /// Returns the Rayleigh range `π·w0²/λ` of this [`BeamSegment`].
    #[must_use]
    pub const fn rayleigh_range(&self) -> Length {
        self.rayleigh_range
    }
    /// Returns the global axial position of the waist of this [`BeamSegment`].
    #[must_use]
    pub const fn waist_position(&self) -> Length {
        self.waist_position
    }
    /// Returns the (exclusive) lower limit of the validity interval.
    #[must_use]
    pub const fn z_min(&self) -> Length {
        self.z_min
    }
    /// Returns the (inclusive) upper limit of the validity interval.
    #[must_use]
    pub const fn z_max(&self) -> Length {
        self.z_max
    }
    /// Check if the given position lies in the validity interval `(z_min, z_max]`.
    ///
    /// The lower bound is exclusive so that a lens position belongs to the segment in front
    /// of the lens.
    #[must_use]
    pub fn contains(&self, z: Length) -> bool {
        z > self.z_min && z <= self.z_max
    }
    /// Returns the spot size (beam radius) at the given axial position.
    ///
    /// If `clip` is true, the spot size is zero outside the validity interval (see
    /// [`contains`](Self::contains)).
    #[must_use]
    pub fn spot_size(&self, z: Length, clip: bool) -> Length {
        if clip && !self.contains(z) {
            return Length::zero();
        }
        let z_local = (z - self.waist_position).get::<meter>() / self.rayleigh_range.get::<meter>();
        self.waist * (1.0 + z_local * z_local).sqrt()
    }
    /// Returns the spot sizes at the given axial positions (all values in meters).
    #[must_use]
    pub fn spot_sizes(&self, z: &[f64], clip: bool) -> DVector<f64> {
        DVector::from_iterator(
            z.len(),
            z.iter()
                .map(|z| self.spot_size(Length::new::<meter>(*z), clip).get::<meter>()),
        )
    }
}
impl std::fmt::Display for BeamSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "waist {:.3} µm at {:.4} m (zR = {:.3} mm), valid in ({} m, {} m]",
            self.waist.get::<micrometer>(),
            self.waist_position.get::<meter>(),
            self.rayleigh_range.get::<millimeter>(),
            self.z_min.get::<meter>(),
            self.z_max.get::<meter>()
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{meter, micrometer, millimeter, nanometer};
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;

    fn test_beam() -> BeamSegment {
        BeamSegment::new(nanometer!(1064.0), micrometer!(100.0), meter!(0.0)).unwrap()
    }
    #[test]
    fn new() {
        let beam = test_beam();
        assert_eq!(beam.wavelength(), nanometer!(1064.0));
        assert_eq!(beam.waist(), micrometer!(100.0));
        assert_eq!(beam.waist_position(), meter!(0.0));
        assert_relative_eq!(
            beam.rayleigh_range().get::<meter>(),
            PI * 1.0e-8 / 1.064e-6,
            max_relative = 1e-12
        );
        assert!(beam.z_min().is_infinite() && beam.z_min().is_sign_negative());
        assert!(beam.z_max().is_infinite() && beam.z_max().is_sign_positive());
    }
    #[test]
    fn new_invalid() {
        let wl = nanometer!(1064.0);
        let w0 = micrometer!(100.0);
        let z0 = meter!(0.0);
        assert_matches!(
            BeamSegment::new(meter!(0.0), w0, z0),
            Err(BeamPropError::InvalidParameter(_))
        );
        assert!(BeamSegment::new(meter!(-1.0e-6), w0, z0).is_err());
        assert!(BeamSegment::new(meter!(f64::NAN), w0, z0).is_err());
        assert!(BeamSegment::new(meter!(f64::INFINITY), w0, z0).is_err());
        assert_matches!(
            BeamSegment::new(wl, meter!(0.0), z0),
            Err(BeamPropError::InvalidParameter(_))
        );
        assert!(BeamSegment::new(wl, meter!(-1.0e-4), z0).is_err());
        assert!(BeamSegment::new(wl, meter!(f64::INFINITY), z0).is_err());
        assert!(BeamSegment::new(wl, w0, meter!(f64::NAN)).is_err());
        assert!(BeamSegment::new(wl, w0, meter!(f64::INFINITY)).is_err());
    }
    #[test]
    fn with_limits() {
        let beam = test_beam().with_limits(meter!(-0.1), meter!(0.2)).unwrap();
        assert_eq!(beam.z_min(), meter!(-0.1));
        assert_eq!(beam.z_max(), meter!(0.2));
        assert!(test_beam()
            .with_limits(meter!(0.2), meter!(0.2))
            .is_ok());
        assert_matches!(
            test_beam().with_limits(meter!(0.3), meter!(0.2)),
            Err(BeamPropError::InvalidParameter(_))
        );
        assert!(test_beam()
            .with_limits(meter!(f64::NAN), meter!(0.2))
            .is_err());
        assert!(test_beam()
            .with_limits(meter!(0.0), meter!(f64::NAN))
            .is_err());
    }
    #[test]
    fn spot_size_at_waist() {
        let beam = BeamSegment::new(nanometer!(1064.0), micrometer!(100.0), meter!(0.05)).unwrap();
        assert_eq!(beam.spot_size(meter!(0.05), false), micrometer!(100.0));
        assert_eq!(beam.spot_size(meter!(0.05), true), micrometer!(100.0));
    }
    #[test]
    fn spot_size_at_rayleigh_range() {
        let beam = test_beam();
        let z_r = beam.rayleigh_range();
        assert_relative_eq!(
            beam.spot_size(z_r, false).get::<meter>(),
            1.0e-4 * 2.0_f64.sqrt(),
            max_relative = 1e-12
        );
        assert_relative_eq!(
            beam.spot_size(-z_r, false).get::<meter>(),
            1.0e-4 * 2.0_f64.sqrt(),
            max_relative = 1e-12
        );
    }
    #[test]
    fn spot_size_not_below_waist() {
        let beam = BeamSegment::new(nanometer!(532.0), micrometer!(50.0), meter!(0.1)).unwrap();
        for i in -100..100 {
            let z = meter!(f64::from(i) * 0.01);
            assert!(beam.spot_size(z, false) >= beam.waist());
        }
    }
    #[test]
    fn spot_size_clipped() {
        let beam = test_beam().with_limits(meter!(0.1), meter!(0.2)).unwrap();
        assert!(beam.spot_size(meter!(0.05), true).is_zero());
        assert!(beam.spot_size(meter!(0.1), true).is_zero());
        assert!(!beam.spot_size(meter!(0.1000001), true).is_zero());
        assert!(!beam.spot_size(meter!(0.2), true).is_zero());
        assert!(beam.spot_size(meter!(0.2000001), true).is_zero());
        assert!(beam.spot_size(meter!(1.0), true).is_zero());
        assert!(!beam.spot_size(meter!(1.0), false).is_zero());
    }
    #[test]
    fn spot_size_infinite_limits() {
        let beam = test_beam();
        assert!(!beam.spot_size(meter!(-1.0e6), true).is_zero());
        assert!(!beam.spot_size(meter!(1.0e6), true).is_zero());
    }
    #[test]
    fn spot_sizes() {
        let beam = test_beam().with_limits(meter!(0.0), meter!(0.5)).unwrap();
        let sizes = beam.spot_sizes(&[-0.1, 0.1, 0.6], true);
        assert_eq!(sizes.len(), 3);
        assert_eq!(sizes[0], 0.0);
        assert_relative_eq!(sizes[1], beam.spot_size(meter!(0.1), false).get::<meter>());
        assert_eq!(sizes[2], 0.0);
        let sizes = beam.spot_sizes(&[-0.1, 0.6], false);
        assert!(sizes.iter().all(|s| *s > 1.0e-4));
    }
    #[test]
    fn contains() {
        let beam = test_beam().with_limits(meter!(0.1), meter!(0.2)).unwrap();
        assert!(!beam.contains(meter!(0.1)));
        assert!(beam.contains(meter!(0.15)));
        assert!(beam.contains(meter!(0.2)));
        assert!(!beam.contains(meter!(0.25)));
    }
    #[test]
    fn from_measured_sizes() {
        let original =
            BeamSegment::new(nanometer!(1064.0), micrometer!(100.0), meter!(0.02)).unwrap();
        let positions = meter!(0.0, 0.02, 0.04, 0.06, 0.08, 0.1);
        let sizes: Vec<Length> = positions
            .iter()
            .map(|z| original.spot_size(*z, false))
            .collect();
        let fitted =
            BeamSegment::from_measured_sizes(nanometer!(1064.0), &sizes, &positions).unwrap();
        assert_relative_eq!(
            fitted.waist().get::<meter>(),
            1.0e-4,
            max_relative = 1e-6
        );
        assert_relative_eq!(
            fitted.waist_position().get::<meter>(),
            0.02,
            max_relative = 1e-6
        );
        assert!(fitted.z_min().is_infinite());
        assert!(fitted.z_max().is_infinite());
    }
    #[test]
    fn from_measured_sizes_invalid() {
        let wl = nanometer!(1064.0);
        assert_matches!(
            BeamSegment::from_measured_sizes(wl, &millimeter!(0.1, 0.2), &meter!(0.0, 0.1, 0.2)),
            Err(BeamPropError::InvalidParameter(_))
        );
        assert_matches!(
            BeamSegment::from_measured_sizes(wl, &[millimeter!(0.1)], &[meter!(0.0)]),
            Err(BeamPropError::InvalidParameter(_))
        );
        assert!(BeamSegment::from_measured_sizes(
            meter!(0.0),
            &millimeter!(0.1, 0.2),
            &meter!(0.0, 0.1)
        )
        .is_err());
        assert!(BeamSegment::from_measured_sizes(
            wl,
            &millimeter!(0.1, f64::NAN),
            &meter!(0.0, 0.1)
        )
        .is_err());
    }
    #[test]
    fn display() {
        let beam = test_beam().with_limits(meter!(0.0), meter!(0.2)).unwrap();
        assert_eq!(
            format!("{beam}"),
            "waist 100.000 µm at 0.0000 m (zR = 29.526 mm), valid in (0 m, 0.2 m]"
        );
    }
}
