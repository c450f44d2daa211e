//! Conversion of any [`Brdf`] to specular offset coordinates.

use crate::{
    brdf::{Brdf, CoordinateSystem, SpecularCoords, SpecularCoordsBrdf, SphericalCoordsBrdf},
    model::{populate, SpectrumSampler},
};
use base::{
    array::{create_exponential, linspace},
    grid::SampleGrid,
    SourceType,
};
use std::f32::consts::{FRAC_PI_2, TAU};

/// Smallest number of specular polar angles of a grid resampled from
/// spherical coordinates.
pub const MIN_SPECULAR_POLAR_ANGLES: usize = 181;

/// Smallest number of specular azimuthal angles of a grid resampled from
/// spherical coordinates.
pub const MIN_SPECULAR_AZIMUTHAL_ANGLES: usize = 73;

/// Number of incoming polar angles of a grid sampled from a generic BRDF.
pub const GENERIC_INCOMING_POLAR_ANGLES: usize = 19;

/// Number of incoming azimuthal angles of a grid sampled from an anisotropic
/// generic BRDF.
pub const GENERIC_INCOMING_AZIMUTHAL_ANGLES: usize = 37;

/// Number of specular polar angles of a grid sampled from a generic BRDF.
pub const GENERIC_SPECULAR_POLAR_ANGLES: usize = 91;

/// Number of specular azimuthal angles of a grid sampled from a generic BRDF.
pub const GENERIC_SPECULAR_AZIMUTHAL_ANGLES: usize = 73;

/// Exponent of the specular polar axis of a grid sampled from a generic
/// BRDF; the samples get denser around the specular peak.
pub const GENERIC_SPECULAR_POLAR_EXPONENT: f32 = 2.0;

/// Converts a BRDF to specular offset coordinates.
///
/// Tabulated BRDFs in specular coordinates are copied as is. Others are
/// resampled on a new grid; the cells below the horizon are synthesized
/// afterwards.
pub fn to_specular_coords(brdf: &Brdf) -> SpecularCoordsBrdf {
    match brdf {
        Brdf::Specular(brdf) => brdf.clone(),
        Brdf::Spherical(brdf) => from_spherical_coords(brdf),
        Brdf::Generic(brdf) => from_sampler(brdf.sampler()),
    }
}

fn from_spherical_coords(brdf: &SphericalCoordsBrdf) -> SpecularCoordsBrdf {
    let src = brdf.samples();
    let n_theta_s = MIN_SPECULAR_POLAR_ANGLES.max(src.n_angles(2));
    let n_phi_s = MIN_SPECULAR_AZIMUTHAL_ANGLES.max(src.n_angles(3));
    log::info!(
        "[to_specular_coords] Resampling spherical coordinates onto {}x{}x{}x{} cells",
        src.n_angles(0),
        src.n_angles(1),
        n_theta_s,
        n_phi_s
    );
    let samples = SampleGrid::with_axes(
        [
            src.angles(0).to_vec(),
            src.angles(1).to_vec(),
            linspace(n_theta_s, 0.0, FRAC_PI_2),
            linspace(n_phi_s, 0.0, TAU),
        ],
        src.color_model(),
        src.wavelengths().to_vec(),
    );
    resample(samples, brdf, brdf.source_type())
}

fn from_sampler(sampler: &dyn SpectrumSampler) -> SpecularCoordsBrdf {
    let phi_i = if sampler.is_isotropic() {
        vec![0.0]
    } else {
        linspace(GENERIC_INCOMING_AZIMUTHAL_ANGLES, 0.0, TAU)
    };
    log::info!(
        "[to_specular_coords] Sampling a generic BRDF ({}, {})",
        sampler.color_model(),
        if sampler.is_isotropic() {
            "isotropic"
        } else {
            "anisotropic"
        }
    );
    let samples = SampleGrid::with_axes(
        [
            linspace(GENERIC_INCOMING_POLAR_ANGLES, 0.0, FRAC_PI_2),
            phi_i,
            create_exponential(
                GENERIC_SPECULAR_POLAR_ANGLES,
                FRAC_PI_2,
                GENERIC_SPECULAR_POLAR_EXPONENT,
            ),
            linspace(GENERIC_SPECULAR_AZIMUTHAL_ANGLES, 0.0, TAU),
        ],
        sampler.color_model(),
        sampler.wavelengths().to_vec(),
    );
    resample(samples, sampler, SourceType::Generated)
}

fn resample(
    samples: SampleGrid,
    sampler: &dyn SpectrumSampler,
    source_type: SourceType,
) -> SpecularCoordsBrdf {
    let mut brdf = SpecularCoordsBrdf::from_samples(samples, source_type);
    populate(&mut brdf, sampler, SpecularCoords::FILL_BACK_SIDE);
    brdf.fill_back_side();
    brdf
}
