#![warn(missing_docs)]
//! Passive optical elements placed along the beam axis.
use crate::error::{BeamPropError, BpResult};
use num::Zero;
use serde::{Deserialize, Serialize};
use uom::si::f64::Length;

/// An ideal thin lens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lens {
    position: Length,
    focal_length: Length,
}
impl Lens {
    /// Creates a new [`Lens`] at the given axial position.
    ///
    /// The focal length is signed: a positive value is a converging lens, a negative value a
    /// diverging lens.
    ///
    /// # Errors
    ///
    /// This function will return an error if the position is not finite or the focal length is
    /// zero or not finite.
    pub fn new(position: Length, focal_length: Length) -> BpResult<Self> {
        let lens = Self {
            position,
            focal_length,
        };
        lens.validate()?;
        Ok(lens)
    }
    /// Returns the axial position of this [`Lens`].
    #[must_use]
    pub const fn position(&self) -> Length {
        self.position
    }
    /// Returns the focal length of this [`Lens`].
    #[must_use]
    pub const fn focal_length(&self) -> Length {
        self.focal_length
    }
    pub(crate) fn validate(&self) -> BpResult<()> {
        if !self.position.is_finite() {
            return Err(BeamPropError::InvalidParameter(
                "lens position must be finite".into(),
            ));
        }
        if self.focal_length.is_zero() || !self.focal_length.is_finite() {
            return Err(BeamPropError::InvalidParameter(
                "focal length must not be 0.0 and finite".into(),
            ));
        }
        Ok(())
    }
}

/// A virtual probe reporting the spot size at its position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probe {
    position: Length,
}
impl Probe {
    /// Creates a new [`Probe`].
    ///
    /// # Errors
    ///
    /// This function will return an error if the position is not finite.
    pub fn new(position: Length) -> BpResult<Self> {
        let probe = Self { position };
        probe.validate()?;
        Ok(probe)
    }
    /// Returns the axial position of this [`Probe`].
    #[must_use]
    pub const fn position(&self) -> Length {
        self.position
    }
    pub(crate) fn validate(&self) -> BpResult<()> {
        if self.position.is_finite() {
            Ok(())
        } else {
            Err(BeamPropError::InvalidParameter(
                "probe position must be finite".into(),
            ))
        }
    }
}

/// Any element that can be added to a [`BeamPropagation`](crate::propagation::BeamPropagation).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OpticalElement {
    /// a thin lens transforming the beam
    Lens(Lens),
    /// a probe reporting the spot size
    Probe(Probe),
}
impl OpticalElement {
    /// Returns the axial position of this element.
    #[must_use]
    pub const fn position(&self) -> Length {
        match self {
            Self::Lens(lens) => lens.position(),
            Self::Probe(probe) => probe.position(),
        }
    }
    /// Checks the element parameters, e.g. after deserialization.
    ///
    /// # Errors
    ///
    /// This function will return an error if the element parameters are invalid.
    pub fn validate(&self) -> BpResult<()> {
        match self {
            Self::Lens(lens) => lens.validate(),
            Self::Probe(probe) => probe.validate(),
        }
    }
}
impl From<Lens> for OpticalElement {
    fn from(lens: Lens) -> Self {
        Self::Lens(lens)
    }
}
impl From<Probe> for OpticalElement {
    fn from(probe: Probe) -> Self {
        Self::Probe(probe)
    }
}
