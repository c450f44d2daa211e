//! Transmittance view over a [`Brdf`].

use crate::{brdf::Brdf, model::SpectrumSampler};
use base::{grid::Spectrum, math::Vec3, ColorModel};
use std::sync::Arc;

/// A BTDF stored as a BRDF of the upper hemisphere.
///
/// Outgoing directions of the BTDF point below the surface; they are mirrored
/// to the upper hemisphere before the wrapped BRDF is evaluated. The BRDF is
/// shared and never modified through the view.
#[derive(Debug, Clone)]
pub struct Btdf {
    brdf: Arc<Brdf>,
}

impl Btdf {
    /// Wraps a BRDF.
    pub fn new(brdf: Arc<Brdf>) -> Self { Self { brdf } }

    /// Returns the wrapped BRDF.
    pub fn brdf(&self) -> &Brdf { &self.brdf }

    /// Returns the shared handle to the wrapped BRDF.
    pub fn shared(&self) -> Arc<Brdf> { Arc::clone(&self.brdf) }

    /// Returns the incoming and outgoing directions of a cell of a tabulated
    /// BTDF; the outgoing direction points below the surface.
    pub fn in_out_direction(&self, i0: usize, i1: usize, i2: usize, i3: usize) -> Option<(Vec3, Vec3)> {
        let (in_dir, mut out_dir) = match self.brdf.as_ref() {
            Brdf::Specular(brdf) => brdf.in_out_direction(i0, i1, i2, i3),
            Brdf::Spherical(brdf) => brdf.in_out_direction(i0, i1, i2, i3),
            Brdf::Generic(_) => return None,
        };
        out_dir.z = -out_dir.z;
        Some((in_dir, out_dir))
    }
}

impl From<Brdf> for Btdf {
    fn from(brdf: Brdf) -> Self { Self::new(Arc::new(brdf)) }
}

impl SpectrumSampler for Btdf {
    fn color_model(&self) -> ColorModel { self.brdf.color_model() }

    fn wavelengths(&self) -> &[f32] { self.brdf.wavelengths() }

    fn is_isotropic(&self) -> bool { self.brdf.is_isotropic() }

    fn spectrum(&self, in_dir: &Vec3, out_dir: &Vec3) -> Spectrum {
        let mirrored = Vec3::new(out_dir.x, out_dir.y, out_dir.z.abs());
        self.brdf.spectrum(in_dir, &mirrored)
    }
}
