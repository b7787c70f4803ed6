#![warn(missing_docs)]
//! Propagation of a Gaussian beam through a sequence of thin lenses.
//!
//! A [`BeamPropagation`] starts with a single, unbounded input [`BeamSegment`]. Lenses and
//! probes are added in any order. Deriving the segments sorts the lenses by position and
//! transforms the beam at each lens using the thin lens equation for Gaussian beams. Every lens
//! closes the validity interval of the segment in front of it and opens a new one behind it, so
//! that the segments partition the optical axis.
use crate::{
    beam_segment::BeamSegment,
    error::{BeamPropError, BpResult},
    optical_element::{Lens, OpticalElement, Probe},
    utils::{
        linspace,
        unit_format::{format_position, format_scientific},
    },
};
use itertools::izip;
use log::{debug, info};
use nalgebra::DVector;
use num::Zero;
use uom::si::{f64::Length, length::meter};

/// Transform a beam segment at a thin lens.
///
/// Returns the incoming segment closed at the lens position and the new segment behind the lens,
/// which is valid from the lens position to +∞.
///
/// With `s` being the distance of the incoming waist in front of the lens, the magnification is
/// `M = Mr / sqrt(1 + r²)` with `r = zR / (s - f)` and `Mr = |f / (s - f)|`. The new waist is
/// `M·w0` and is located `M²·(s - f) + f` behind the lens.
///
/// For `s == f` the magnification is set to exactly 1. Only exact equality is caught: if `s - f`
/// is tiny but non-zero, the magnification may become very large and numerically noisy.
///
/// # Errors
///
/// This function will return an error if the lens lies in front of the lower limit of the
/// incoming segment or if the transformed beam parameters are invalid.
pub fn thin_lens_transform(
    segment: &BeamSegment,
    lens: &Lens,
) -> BpResult<(BeamSegment, BeamSegment)> {
    let focal_length = lens.focal_length();
    let waist_distance = lens.position() - segment.waist_position();
    let magnification = if waist_distance == focal_length {
        debug!(
            "waist distance equals focal length at lens position {} m. Using magnification 1.0",
            lens.position().get::<meter>()
        );
        1.0
    } else {
        let r = (segment.rayleigh_range() / (waist_distance - focal_length)).value;
        let mr = (focal_length / (waist_distance - focal_length)).value.abs();
        mr / r.mul_add(r, 1.0).sqrt()
    };
    let new_waist = segment.waist() * magnification;
    let new_waist_distance =
        (waist_distance - focal_length) * magnification * magnification + focal_length;
    let closed = segment.with_limits(segment.z_min(), lens.position())?;
    let next = BeamSegment::new(
        segment.wavelength(),
        new_waist,
        lens.position() + new_waist_distance,
    )?
    .with_limits(lens.position(), Length::new::<meter>(f64::INFINITY))?;
    Ok((closed, next))
}

/// Sort the lenses by position (stable, so that lenses at the same position keep their order).
#[must_use]
pub fn sort_lenses(lenses: &[Lens]) -> Vec<Lens> {
    let mut sorted = lenses.to_vec();
    sorted.sort_by(|a, b| a.position().value.total_cmp(&b.position().value));
    sorted
}

/// Derive the beam segments behind a sequence of lenses.
///
/// The lenses are sorted by position first. The returned list starts with the (closed) input
/// segment followed by one segment per lens in position order.
///
/// # Errors
///
/// This function will return an error if a lens transformation fails (see [`thin_lens_transform`]).
pub fn derive_segments(input: &BeamSegment, lenses: &[Lens]) -> BpResult<Vec<BeamSegment>> {
    let mut segments = Vec::with_capacity(lenses.len() + 1);
    let mut current = *input;
    for lens in sort_lenses(lenses) {
        let (closed, next) = thin_lens_transform(&current, &lens)?;
        segments.push(closed);
        current = next;
    }
    segments.push(current);
    Ok(segments)
}

/// Spot size reading of a [`Probe`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReading {
    position: Length,
    spot_size: Length,
}
impl ProbeReading {
    /// Returns the position of the probe.
    #[must_use]
    pub const fn position(&self) -> Length {
        self.position
    }
    /// Returns the spot size measured by the probe.
    #[must_use]
    pub const fn spot_size(&self) -> Length {
        self.spot_size
    }
    /// Returns the label of this reading, e.g. `w(0.4) = 1.0e-04`.
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "w({}) = {}",
            format_position(self.position.get::<meter>()),
            format_scientific(self.spot_size.get::<meter>(), 1)
        )
    }
}

/// Spot sizes sampled on a uniform grid along the optical axis (all values in meters).
#[derive(Debug, Clone)]
pub struct BeamProfile {
    positions: DVector<f64>,
    spot_sizes: DVector<f64>,
    segment_curves: Vec<DVector<f64>>,
}
impl BeamProfile {
    /// Returns the sample positions.
    #[must_use]
    pub const fn positions(&self) -> &DVector<f64> {
        &self.positions
    }
    /// Returns the (stitched) spot sizes at the sample positions.
    #[must_use]
    pub const fn spot_sizes(&self) -> &DVector<f64> {
        &self.spot_sizes
    }
    /// Returns the unclipped spot sizes of each segment at the sample positions.
    #[must_use]
    pub fn segment_curves(&self) -> &[DVector<f64>] {
        &self.segment_curves
    }
    /// Returns the upper (+radius) and lower (-radius) beam envelope.
    #[must_use]
    pub fn envelope(&self) -> (DVector<f64>, DVector<f64>) {
        (self.spot_sizes.clone(), -&self.spot_sizes)
    }
    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }
    /// Returns `true` if the profile does not contain any sample.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
    /// Iterate over all `(position, spot size)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        izip!(self.positions.iter(), self.spot_sizes.iter()).map(|(z, w)| (*z, *w))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PropagationState {
    Configuring,
    Derived,
}

/// Propagation of a Gaussian beam through thin lenses.
#[derive(Debug, Clone)]
pub struct BeamPropagation {
    segments: Vec<BeamSegment>,
    lenses: Vec<Lens>,
    probes: Vec<Probe>,
    state: PropagationState,
}
impl BeamPropagation {
    /// Creates a new [`BeamPropagation`] starting with the given input beam.
    #[must_use]
    pub fn new(input_beam: BeamSegment) -> Self {
        Self {
            segments: vec![input_beam],
            lenses: Vec::new(),
            probes: Vec::new(),
            state: PropagationState::Configuring,
        }
    }
    /// Add a [`Lens`] or a [`Probe`] to this [`BeamPropagation`].
    ///
    /// Lenses may be added in any order. Probes keep the order in which they are added.
    ///
    /// # Errors
    ///
    /// This function will return an error if the segments have already been derived.
    pub fn add_element(&mut self, element: impl Into<OpticalElement>) -> BpResult<()> {
        if self.state == PropagationState::Derived {
            return Err(BeamPropError::Propagation(
                "cannot add elements after the segments have been derived".into(),
            ));
        }
        match element.into() {
            OpticalElement::Lens(lens) => self.lenses.push(lens),
            OpticalElement::Probe(probe) => self.probes.push(probe),
        }
        Ok(())
    }
    /// Derive the beam segments behind all lenses.
    ///
    /// The lenses are sorted by position and the input beam is transformed lens by lens. This is a
    /// one-time transition: afterwards no elements can be added anymore.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the segments have already been derived.
    ///   - a lens transformation fails.
    pub fn derive_segments(&mut self) -> BpResult<&[BeamSegment]> {
        if self.state == PropagationState::Derived {
            return Err(BeamPropError::Propagation(
                "segments already derived".into(),
            ));
        }
        let segments = derive_segments(&self.segments[0], &self.lenses)?;
        self.lenses = sort_lenses(&self.lenses);
        self.segments = segments;
        self.state = PropagationState::Derived;
        for (i, segment) in self.segments.iter().enumerate() {
            debug!("segment {i}: {segment}");
        }
        Ok(&self.segments)
    }
    /// Returns `true` if the segments of this [`BeamPropagation`] have been derived.
    #[must_use]
    pub fn is_derived(&self) -> bool {
        self.state == PropagationState::Derived
    }
    /// Returns the input beam of this [`BeamPropagation`].
    #[must_use]
    pub fn input_beam(&self) -> &BeamSegment {
        &self.segments[0]
    }
    /// Returns the beam segments. Before derivation, this is only the input beam.
    #[must_use]
    pub fn segments(&self) -> &[BeamSegment] {
        &self.segments
    }
    /// Returns the lenses. After derivation, they are sorted by position.
    #[must_use]
    pub fn lenses(&self) -> &[Lens] {
        &self.lenses
    }
    /// Returns the probes in the order they were added.
    #[must_use]
    pub fn probes(&self) -> &[Probe] {
        &self.probes
    }
    /// Returns the spot size at the given axial position.
    ///
    /// This is the sum of the clipped spot sizes of all segments. Since the segments partition
    /// the optical axis, exactly one of them contributes.
    #[must_use]
    pub fn spot_size(&self, z: Length) -> Length {
        self.segments
            .iter()
            .fold(Length::zero(), |sum, segment| sum + segment.spot_size(z, true))
    }
    /// Returns the spot sizes at the given axial positions (all values in meters).
    #[must_use]
    pub fn spot_sizes(&self, z: &[f64]) -> DVector<f64> {
        self.segments
            .iter()
            .fold(DVector::zeros(z.len()), |sum, segment| {
                sum + segment.spot_sizes(z, true)
            })
    }
    /// Sample the spot size on a uniform grid of `num` points from `z_min` to `z_max`.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - `z_min` or `z_max` are not finite or `z_min >= z_max`.
    ///   - `num` is smaller than 2.
    pub fn sample(&self, z_min: Length, z_max: Length, num: usize) -> BpResult<BeamProfile> {
        if !z_min.is_finite() || !z_max.is_finite() || z_min >= z_max {
            return Err(BeamPropError::InvalidParameter(
                "sampling range must be finite with z_min < z_max".into(),
            ));
        }
        if num < 2 {
            return Err(BeamPropError::InvalidParameter(
                "at least two samples are needed".into(),
            ));
        }
        let positions = linspace(z_min.get::<meter>(), z_max.get::<meter>(), num)?;
        let spot_sizes = self.spot_sizes(positions.as_slice());
        let segment_curves = self
            .segments
            .iter()
            .map(|segment| segment.spot_sizes(positions.as_slice(), false))
            .collect();
        Ok(BeamProfile {
            positions,
            spot_sizes,
            segment_curves,
        })
    }
    /// Returns the spot size readings of all probes in the order they were added.
    ///
    /// Each reading is also logged on `info` level.
    #[must_use]
    pub fn probe_readings(&self) -> Vec<ProbeReading> {
        self.probes
            .iter()
            .enumerate()
            .map(|(i, probe)| {
                let reading = ProbeReading {
                    position: probe.position(),
                    spot_size: self.spot_size(probe.position()),
                };
                info!("Measure {i}: {}", reading.label());
                reading
            })
            .collect()
    }
}
