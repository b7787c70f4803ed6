//! This is the documentation for the **beamprop** package. It propagates Gaussian laser beams
//! through a sequence of ideal thin lenses.
//!
//! A [`BeamPropagation`] starts with an input [`BeamSegment`](beam_segment::BeamSegment), either
//! given by its waist or fitted to measured spot sizes. [`Lens`](optical_element::Lens)es
//! transform the beam into a new segment each, [`Probe`](optical_element::Probe)s report the
//! spot size at their position. The resulting profile can be rendered with
//! [`BeamPlot`](plottable::BeamPlot).
#![allow(clippy::module_name_repetitions)]

pub mod beam_segment;
pub mod console;
pub mod error;
pub mod fitting;
pub mod optical_element;
pub mod plottable;
pub mod propagation;
pub mod setup;
pub mod utils;

pub use propagation::BeamPropagation;
pub use setup::BeamSetup;
