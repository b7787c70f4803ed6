#![warn(missing_docs)]
//! Setup documents describing a complete beam propagation run.
//!
//! A setup is stored as YAML file containing the input beam, the optical elements and optional
//! plot options. All lengths are given in meters.
use crate::{
    beam_segment::BeamSegment,
    error::{BeamPropError, BpResult},
    optical_element::OpticalElement,
    plottable::PlotOptions,
    propagation::BeamPropagation,
};
use log::info;
use num::Zero;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::Path,
};
use uom::si::f64::Length;

fn default_waist_position() -> Length {
    Length::zero()
}

/// Description of the input beam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BeamDescription {
    /// a beam given by its waist
    Waist {
        /// wavelength of the beam
        wavelength: Length,
        /// waist radius
        waist: Length,
        /// axial position of the waist
        #[serde(default = "default_waist_position")]
        waist_position: Length,
    },
    /// a beam fitted to measured spot sizes
    Measured {
        /// wavelength of the beam
        wavelength: Length,
        /// measured spot sizes (radii)
        sizes: Vec<Length>,
        /// axial positions of the measurements
        positions: Vec<Length>,
    },
}
impl BeamDescription {
    /// Create the (unbounded) input [`BeamSegment`] from this description.
    ///
    /// # Errors
    ///
    /// This function will return an error if the beam parameters are invalid or the fit of
    /// measured sizes fails.
    pub fn to_segment(&self) -> BpResult<BeamSegment> {
        match self {
            Self::Waist {
                wavelength,
                waist,
                waist_position,
            } => BeamSegment::new(*wavelength, *waist, *waist_position),
            Self::Measured {
                wavelength,
                sizes,
                positions,
            } => BeamSegment::from_measured_sizes(*wavelength, sizes, positions),
        }
    }
}

/// A complete beam propagation setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamSetup {
    beam: BeamDescription,
    #[serde(default)]
    elements: Vec<OpticalElement>,
    #[serde(default)]
    plot: PlotOptions,
}
impl BeamSetup {
    /// Creates a new [`BeamSetup`] without elements and with default plot options.
    #[must_use]
    pub fn new(beam: BeamDescription) -> Self {
        Self {
            beam,
            elements: Vec::new(),
            plot: PlotOptions::default(),
        }
    }
    /// Create a new [`BeamSetup`] from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the given path is not found or readable.
    ///   - the parsing of the file failed.
    pub fn from_file(path: &Path) -> BpResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            BeamPropError::Setup(format!("cannot read file {} : {}", path.display(), e))
        })?;
        Self::from_string(&contents)
    }
    /// Create a new [`BeamSetup`] from the given YAML string.
    ///
    /// # Errors
    ///
    /// This function will return an error if the parsing of the string failed.
    pub fn from_string(yaml: &str) -> BpResult<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| BeamPropError::Setup(format!("parsing of setup failed: {e}")))
    }
    /// Return this [`BeamSetup`] as YAML string.
    ///
    /// # Errors
    ///
    /// This function will return an error if the serialization fails.
    pub fn to_yaml_string(&self) -> BpResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| BeamPropError::Setup(format!("serialization of setup failed: {e}")))
    }
    /// Save this [`BeamSetup`] to a YAML file with the given path.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the serialization of the setup failed.
    ///   - the file cannot be created or written.
    pub fn save_to_file(&self, path: &Path) -> BpResult<()> {
        let serialized = self.to_yaml_string()?;
        let mut output = File::create(path).map_err(|e| {
            BeamPropError::Setup(format!(
                "could not create file path: {}: {}",
                path.display(),
                e
            ))
        })?;
        write!(output, "{serialized}").map_err(|e| {
            BeamPropError::Setup(format!(
                "writing to file path {} failed: {}",
                path.display(),
                e
            ))
        })?;
        Ok(())
    }
    /// Returns the input beam description of this [`BeamSetup`].
    #[must_use]
    pub const fn beam(&self) -> &BeamDescription {
        &self.beam
    }
    /// Returns the optical elements of this [`BeamSetup`].
    #[must_use]
    pub fn elements(&self) -> &[OpticalElement] {
        &self.elements
    }
    /// Add an optical element to this [`BeamSetup`].
    pub fn add_element(&mut self, element: impl Into<OpticalElement>) {
        self.elements.push(element.into());
    }
    /// Returns the plot options of this [`BeamSetup`].
    #[must_use]
    pub const fn plot_options(&self) -> &PlotOptions {
        &self.plot
    }
    /// Sets the plot options of this [`BeamSetup`].
    pub fn set_plot_options(&mut self, options: PlotOptions) {
        self.plot = options;
    }
    /// Build the [`BeamPropagation`] described by this setup and derive its segments.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the input beam is invalid or cannot be fitted.
    ///   - an element has invalid parameters.
    ///   - the derivation of the segments fails.
    pub fn build(&self) -> BpResult<BeamPropagation> {
        let mut propagation = BeamPropagation::new(self.beam.to_segment()?);
        for element in &self.elements {
            element.validate()?;
            propagation.add_element(*element)?;
        }
        propagation.derive_segments()?;
        info!(
            "propagation built with {} lenses and {} probes",
            propagation.lenses().len(),
            propagation.probes().len()
        );
        Ok(propagation)
    }
}
