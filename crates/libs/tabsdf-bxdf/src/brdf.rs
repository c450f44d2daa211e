//! BRDFs tabulated on a [`SampleGrid`].
//!
//! A grid only stores angles; how those angles map to a pair of directions is
//! decided by the [`CoordinateSystem`] of the BRDF. Two systems are provided:
//!
//! - [`SpecularCoords`], the canonical one used for export, where the
//!   outgoing direction is an offset from the mirror direction;
//! - [`SphericalCoords`], plain spherical angles for both directions.

use crate::model::SpectrumSampler;
use base::{
    array::{self, Bounds},
    grid::{SampleGrid, Spectrum, N_AXES},
    math::{cart_to_sph, rotate_z, sph_to_cart, Mat3, Vec3},
    ColorModel, SourceType,
};
use std::{
    f32::consts::{FRAC_PI_2, PI, TAU},
    fmt::Debug,
    marker::PhantomData,
    sync::Arc,
};

/// Axes holding azimuthal angles; they are interpolated periodically.
const AZIMUTH_AXES: [bool; N_AXES] = [false, true, false, true];

/// Directions with a z component below this are under the horizon.
const HORIZON_EPSILON: f32 = 1e-5;

/// Returns true if the direction points clearly below the surface.
pub(crate) fn is_below_horizon(dir: &Vec3) -> bool { dir.z < -HORIZON_EPSILON }

/// Mapping between the four angles of a grid and an (incoming, outgoing)
/// pair of directions.
///
/// Directions point away from the surface; the surface normal is +z.
pub trait CoordinateSystem:
    Debug + Clone + Copy + Default + PartialEq + Send + Sync + 'static
{
    /// Name of the coordinate system.
    const NAME: &'static str;

    /// Largest value of every axis.
    const MAX_ANGLES: [f32; N_AXES];

    /// Whether some cells of the grid describe outgoing directions below the
    /// horizon, which are synthesized instead of sampled.
    const FILL_BACK_SIDE: bool;

    /// Converts four angles to the incoming and outgoing directions.
    fn to_xyz(a0: f32, a1: f32, a2: f32, a3: f32) -> (Vec3, Vec3);

    /// Converts the incoming and outgoing directions to four angles.
    fn from_xyz(in_dir: &Vec3, out_dir: &Vec3) -> [f32; N_AXES];
}

/// Specular offset coordinates: incoming polar and azimuthal angles, then the
/// polar and azimuthal offsets of the outgoing direction from the mirror
/// direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecularCoords;

impl CoordinateSystem for SpecularCoords {
    const NAME: &'static str = "specular";
    const MAX_ANGLES: [f32; N_AXES] = [FRAC_PI_2, TAU, FRAC_PI_2, TAU];
    const FILL_BACK_SIDE: bool = true;

    fn to_xyz(theta_i: f32, phi_i: f32, theta_s: f32, phi_s: f32) -> (Vec3, Vec3) {
        let in_dir = sph_to_cart(theta_i, phi_i);
        let frame = Mat3::from_rotation_z(phi_i + PI) * Mat3::from_rotation_y(theta_i);
        let out_dir = frame * sph_to_cart(theta_s, phi_s);
        (in_dir, out_dir)
    }

    fn from_xyz(in_dir: &Vec3, out_dir: &Vec3) -> [f32; N_AXES] {
        let (theta_i, phi_i) = cart_to_sph(*in_dir);
        let local =
            Mat3::from_rotation_y(-theta_i) * Mat3::from_rotation_z(-(phi_i + PI)) * *out_dir;
        let (theta_s, phi_s) = cart_to_sph(local);
        [theta_i, phi_i, theta_s, phi_s]
    }
}

/// Spherical coordinates of the incoming and the outgoing directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SphericalCoords;

impl CoordinateSystem for SphericalCoords {
    const NAME: &'static str = "spherical";
    const MAX_ANGLES: [f32; N_AXES] = [FRAC_PI_2, TAU, FRAC_PI_2, TAU];
    const FILL_BACK_SIDE: bool = false;

    fn to_xyz(theta_i: f32, phi_i: f32, theta_o: f32, phi_o: f32) -> (Vec3, Vec3) {
        (sph_to_cart(theta_i, phi_i), sph_to_cart(theta_o, phi_o))
    }

    fn from_xyz(in_dir: &Vec3, out_dir: &Vec3) -> [f32; N_AXES] {
        let (theta_i, phi_i) = cart_to_sph(*in_dir);
        let (theta_o, phi_o) = cart_to_sph(*out_dir);
        [theta_i, phi_i, theta_o, phi_o]
    }
}

/// A BRDF tabulated on a [`SampleGrid`] whose angles are interpreted by the
/// coordinate system `C`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordsBrdf<C: CoordinateSystem> {
    samples: SampleGrid,
    source_type: SourceType,
    /// Offsets of the specular peak from the mirror direction, one per
    /// incoming polar angle. Empty when unknown.
    specular_offsets: Vec<f32>,
    _coords: PhantomData<C>,
}

/// BRDF in specular offset coordinates, the canonical representation.
pub type SpecularCoordsBrdf = CoordsBrdf<SpecularCoords>;

/// BRDF in spherical coordinates.
pub type SphericalCoordsBrdf = CoordsBrdf<SphericalCoords>;

impl<C: CoordinateSystem> CoordsBrdf<C> {
    /// Creates a zero-filled BRDF whose axes are evenly spaced from zero to
    /// the maximum of the coordinate system.
    pub fn new(
        n0: usize,
        n1: usize,
        n2: usize,
        n3: usize,
        color_model: ColorModel,
        n_wavelengths: usize,
    ) -> Self {
        let mut samples = SampleGrid::new(n0, n1, n2, n3, color_model, n_wavelengths);
        for (axis, n) in [n0, n1, n2, n3].into_iter().enumerate() {
            samples.set_angles(axis, &array::linspace(n, 0.0, C::MAX_ANGLES[axis]));
        }
        samples.update_angle_attributes();
        Self::from_samples(samples, SourceType::default())
    }

    /// Wraps an existing grid.
    pub fn from_samples(samples: SampleGrid, source_type: SourceType) -> Self {
        Self {
            samples,
            source_type,
            specular_offsets: Vec::new(),
            _coords: PhantomData,
        }
    }

    /// Returns the samples.
    pub fn samples(&self) -> &SampleGrid { &self.samples }

    /// Returns the samples for modification.
    pub fn samples_mut(&mut self) -> &mut SampleGrid { &mut self.samples }

    /// Returns where the samples come from.
    pub fn source_type(&self) -> SourceType { self.source_type }

    /// Sets where the samples come from.
    pub fn set_source_type(&mut self, source_type: SourceType) { self.source_type = source_type; }

    /// Returns the specular offsets, one per incoming polar angle.
    pub fn specular_offsets(&self) -> &[f32] { &self.specular_offsets }

    /// Sets the specular offsets.
    pub fn set_specular_offsets(&mut self, offsets: Vec<f32>) { self.specular_offsets = offsets; }

    /// Returns the incoming and outgoing directions of a cell.
    pub fn in_out_direction(&self, i0: usize, i1: usize, i2: usize, i3: usize) -> (Vec3, Vec3) {
        C::to_xyz(
            self.samples.angle(0, i0),
            self.samples.angle(1, i1),
            self.samples.angle(2, i2),
            self.samples.angle(3, i3),
        )
    }

    fn axis_bounds(&self, axis: usize, value: f32) -> (Bounds<f32>, f32) {
        let angles = self.samples.angles(axis);
        if AZIMUTH_AXES[axis] {
            array::find_bounds_periodic(angles, value, TAU)
        } else {
            let bounds = array::find_bounds(angles, value, self.samples.is_equal_interval(axis));
            (bounds, value)
        }
    }

    /// Evaluates the BRDF for a pair of directions.
    ///
    /// The samples are interpolated linearly along each of the four axes,
    /// periodically along the azimuthal ones. Queries beyond the polar ranges
    /// are extrapolated. Negative results are clamped to zero.
    pub fn spectrum(&self, in_dir: &Vec3, out_dir: &Vec3) -> Spectrum {
        let (in_dir, out_dir) = if self.samples.is_isotropic() {
            let (_, phi_i) = cart_to_sph(*in_dir);
            (rotate_z(*in_dir, -phi_i), rotate_z(*out_dir, -phi_i))
        } else {
            (*in_dir, *out_dir)
        };
        let angles = C::from_xyz(&in_dir, &out_dir);
        let bounds: [(Bounds<f32>, f32); N_AXES] =
            std::array::from_fn(|axis| self.axis_bounds(axis, angles[axis]));

        let mut spectrum = vec![0.0f32; self.samples.n_wavelengths()];
        for corner in 0..(1usize << N_AXES) {
            let mut index = [0usize; N_AXES];
            let mut weight = 1.0f32;
            for (axis, (b, query)) in bounds.iter().enumerate() {
                let w = b.weight(*query);
                if (corner >> axis) & 1 == 1 {
                    index[axis] = b.upper_index;
                    weight *= w;
                } else {
                    index[axis] = b.lower_index;
                    weight *= 1.0 - w;
                }
            }
            if weight == 0.0 {
                continue;
            }
            for (acc, v) in spectrum.iter_mut().zip(self.samples[index].iter()) {
                *acc += weight * v;
            }
        }
        spectrum.iter_mut().for_each(|v| *v = v.max(0.0));
        spectrum.into_boxed_slice()
    }

    /// Synthesizes the cells whose outgoing direction is below the horizon.
    ///
    /// Each of them takes the value of the closest cell above the horizon with
    /// a smaller axis2 angle in the same column, or zero if there is none.
    pub fn fill_back_side(&mut self) {
        let [n0, n1, n2, n3] = self.samples.shape();
        let zeros = vec![0.0; self.samples.n_wavelengths()];
        let mut n_filled = 0usize;
        for i0 in 0..n0 {
            for i1 in 0..n1 {
                for i3 in 0..n3 {
                    let mut last_valid = None;
                    for i2 in 0..n2 {
                        let (_, out_dir) = self.in_out_direction(i0, i1, i2, i3);
                        if !is_below_horizon(&out_dir) {
                            last_valid = Some(i2);
                            continue;
                        }
                        let value = match last_valid {
                            Some(valid) => self.samples.spectrum(i0, i1, valid, i3).to_vec(),
                            None => zeros.clone(),
                        };
                        self.samples.set_spectrum(i0, i1, i2, i3, &value);
                        n_filled += 1;
                    }
                }
            }
        }
        log::debug!("[CoordsBrdf::fill_back_side] {} cells filled", n_filled);
    }
}

impl<C: CoordinateSystem> SpectrumSampler for CoordsBrdf<C> {
    fn color_model(&self) -> ColorModel { self.samples.color_model() }

    fn wavelengths(&self) -> &[f32] { self.samples.wavelengths() }

    fn is_isotropic(&self) -> bool { self.samples.is_isotropic() }

    fn spectrum(&self, in_dir: &Vec3, out_dir: &Vec3) -> Spectrum {
        CoordsBrdf::spectrum(self, in_dir, out_dir)
    }
}

/// A BRDF only known through the sampling contract, e.g. an analytical
/// model.
#[derive(Clone)]
pub struct GenericBrdf {
    sampler: Arc<dyn SpectrumSampler>,
}

impl GenericBrdf {
    /// Wraps a sampler.
    pub fn new(sampler: Arc<dyn SpectrumSampler>) -> Self { Self { sampler } }

    /// Returns the wrapped sampler.
    pub fn sampler(&self) -> &dyn SpectrumSampler { self.sampler.as_ref() }
}

impl Debug for GenericBrdf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericBrdf")
            .field("color_model", &self.sampler.color_model())
            .field("is_isotropic", &self.sampler.is_isotropic())
            .finish()
    }
}

/// Any BRDF that can be exported.
#[derive(Debug, Clone)]
pub enum Brdf {
    /// Tabulated in specular offset coordinates.
    Specular(SpecularCoordsBrdf),
    /// Tabulated in spherical coordinates.
    Spherical(SphericalCoordsBrdf),
    /// Not tabulated.
    Generic(GenericBrdf),
}

impl Brdf {
    /// Returns the samples of tabulated BRDFs.
    pub fn samples(&self) -> Option<&SampleGrid> {
        match self {
            Brdf::Specular(brdf) => Some(brdf.samples()),
            Brdf::Spherical(brdf) => Some(brdf.samples()),
            Brdf::Generic(_) => None,
        }
    }

    /// Returns where the BRDF comes from.
    pub fn source_type(&self) -> SourceType {
        match self {
            Brdf::Specular(brdf) => brdf.source_type(),
            Brdf::Spherical(brdf) => brdf.source_type(),
            Brdf::Generic(_) => SourceType::Generated,
        }
    }

    /// Checks that the samples of a tabulated BRDF are finite. Always true
    /// for generic BRDFs.
    pub fn validate(&self) -> bool { self.samples().map_or(true, SampleGrid::validate) }
}

impl SpectrumSampler for Brdf {
    fn color_model(&self) -> ColorModel {
        match self {
            Brdf::Specular(brdf) => SpectrumSampler::color_model(brdf),
            Brdf::Spherical(brdf) => SpectrumSampler::color_model(brdf),
            Brdf::Generic(brdf) => brdf.sampler.color_model(),
        }
    }

    fn wavelengths(&self) -> &[f32] {
        match self {
            Brdf::Specular(brdf) => SpectrumSampler::wavelengths(brdf),
            Brdf::Spherical(brdf) => SpectrumSampler::wavelengths(brdf),
            Brdf::Generic(brdf) => brdf.sampler.wavelengths(),
        }
    }

    fn is_isotropic(&self) -> bool {
        match self {
            Brdf::Specular(brdf) => SpectrumSampler::is_isotropic(brdf),
            Brdf::Spherical(brdf) => SpectrumSampler::is_isotropic(brdf),
            Brdf::Generic(brdf) => brdf.sampler.is_isotropic(),
        }
    }

    fn spectrum(&self, in_dir: &Vec3, out_dir: &Vec3) -> Spectrum {
        match self {
            Brdf::Specular(brdf) => brdf.spectrum(in_dir, out_dir),
            Brdf::Spherical(brdf) => brdf.spectrum(in_dir, out_dir),
            Brdf::Generic(brdf) => brdf.sampler.spectrum(in_dir, out_dir),
        }
    }
}

impl From<SpecularCoordsBrdf> for Brdf {
    fn from(brdf: SpecularCoordsBrdf) -> Self { Brdf::Specular(brdf) }
}

impl From<SphericalCoordsBrdf> for Brdf {
    fn from(brdf: SphericalCoordsBrdf) -> Self { Brdf::Spherical(brdf) }
}

impl From<GenericBrdf> for Brdf {
    fn from(brdf: GenericBrdf) -> Self { Brdf::Generic(brdf) }
}
