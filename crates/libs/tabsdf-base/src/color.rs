//! Color models of the tabulated samples.

use glam::{Mat3, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// How the channels of a sample are interpreted.
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorModel {
    /// Linear RGB, three channels.
    #[cfg_attr(feature = "cli", clap(name = "rgb"))]
    Rgb,
    /// CIE XYZ, three channels.
    #[cfg_attr(feature = "cli", clap(name = "xyz"))]
    Xyz,
    /// Single channel.
    #[cfg_attr(feature = "cli", clap(name = "mono"))]
    Monochromatic,
    /// One channel per wavelength.
    #[cfg_attr(feature = "cli", clap(name = "spectral"))]
    Spectral,
}

impl ColorModel {
    /// Number of channels implied by the color model.
    ///
    /// `n_wavelengths` is only used by [`ColorModel::Spectral`].
    pub const fn n_channels(&self, n_wavelengths: usize) -> usize {
        match self {
            ColorModel::Rgb | ColorModel::Xyz => 3,
            ColorModel::Monochromatic => 1,
            ColorModel::Spectral => n_wavelengths,
        }
    }
}

impl Display for ColorModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorModel::Rgb => write!(f, "RGB"),
            ColorModel::Xyz => write!(f, "XYZ"),
            ColorModel::Monochromatic => write!(f, "Monochromatic"),
            ColorModel::Spectral => write!(f, "Spectral"),
        }
    }
}

/// CIE XYZ to linear sRGB (D65), column-major.
const XYZ_TO_SRGB: Mat3 = Mat3::from_cols_array(&[
    3.240_454_2,
    -0.969_266,
    0.055_643_4,
    -1.537_138_5,
    1.876_010_8,
    -0.204_025_9,
    -0.498_531_4,
    0.041_556,
    1.057_225_2,
]);

/// Converts a CIE XYZ triple to linear sRGB.
pub fn xyz_to_srgb(xyz: Vec3) -> Vec3 { XYZ_TO_SRGB * xyz }
