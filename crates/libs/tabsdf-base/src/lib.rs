//! # tabsdf-base
//! Core library for tabsdf.
//! Contains the tabulated sample grid, the array utilities used to index and
//! interpolate it, and the basic types shared by the other crates.

pub mod array;
pub mod color;
pub mod error;
pub mod grid;
pub mod math;

#[cfg(feature = "cli")]
pub mod cli;

pub use color::ColorModel;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Kind of data stored in a tabulated BSDF.
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Reflectance (BRDF).
    #[default]
    #[cfg_attr(feature = "cli", clap(name = "brdf"))]
    Brdf,
    /// Transmittance (BTDF).
    #[cfg_attr(feature = "cli", clap(name = "btdf"))]
    Btdf,
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Brdf => write!(f, "BRDF"),
            DataType::Btdf => write!(f, "BTDF"),
        }
    }
}

/// Where the tabulated samples come from.
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Measured by a real-world device.
    #[default]
    Measured,
    /// Generated from a model or a simulation.
    Generated,
    /// Edited afterwards by a tool or a user.
    Edited,
}

impl Display for SourceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::Measured => write!(f, "Measured"),
            SourceType::Generated => write!(f, "Generated"),
            SourceType::Edited => write!(f, "Edited"),
        }
    }
}

/// Version of the library, as written into exported files.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
