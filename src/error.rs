#![warn(missing_docs)]
//! beamprop specific error structures
use std::{error::Error, fmt::Display};

/// beamprop specific Result type
pub type BpResult<T> = std::result::Result<T, BeamPropError>;

/// Errors that can be returned by the various beamprop functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeamPropError {
    /// a physical parameter is out of its valid range (e.g. a non-positive waist or wavelength)
    InvalidParameter(String),
    /// the least-squares solver could not fit a beam to the given measurements
    FitDidNotConverge(String),
    /// errors while building or querying a [`BeamPropagation`](crate::propagation::BeamPropagation)
    Propagation(String),
    /// errors while rendering a plot
    Plot(String),
    /// errors while reading or writing a setup file
    Setup(String),
    /// errors console io
    Console(String),
    /// errors not falling in one of the categories above
    Other(String),
}

impl Display for BeamPropError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidParameter(m) => {
                write!(f, "InvalidParameter:{m}")
            }
            Self::FitDidNotConverge(m) => {
                write!(f, "FitDidNotConverge:{m}")
            }
            Self::Propagation(m) => {
                write!(f, "Propagation:{m}")
            }
            Self::Plot(m) => {
                write!(f, "Plot:{m}")
            }
            Self::Setup(m) => {
                write!(f, "Setup:{m}")
            }
            Self::Console(m) => {
                write!(f, "Console:{m}")
            }
            Self::Other(m) => write!(f, "beamprop Error:Other:{m}"),
        }
    }
}
impl Error for BeamPropError {}

impl std::convert::From<String> for BeamPropError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}
