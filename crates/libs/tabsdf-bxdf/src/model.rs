//! Sampling contract, reflectance models and their tabulation.

use crate::brdf::{is_below_horizon, CoordinateSystem, CoordsBrdf};
use base::{error::Error, grid::Spectrum, math::Vec3, ColorModel, DataType};
use rayon::prelude::*;
use std::f32::consts::FRAC_1_PI;

/// Anything that can be evaluated for a pair of directions.
///
/// Directions point away from the surface and are normalised.
pub trait SpectrumSampler: Send + Sync {
    /// Color model of the returned spectra.
    fn color_model(&self) -> ColorModel;

    /// Wavelengths of the channels of the returned spectra.
    fn wavelengths(&self) -> &[f32];

    /// Whether the values don't depend on the incoming azimuth.
    fn is_isotropic(&self) -> bool;

    /// Evaluates the spectrum for a pair of directions.
    fn spectrum(&self, in_dir: &Vec3, out_dir: &Vec3) -> Spectrum;
}

/// An analytical reflectance model evaluated in RGB.
pub trait ReflectanceModel: Send + Sync {
    /// Name of the model.
    fn name(&self) -> &str;

    /// Whether the model doesn't depend on the incoming azimuth.
    fn is_isotropic(&self) -> bool { true }

    /// Evaluates the model for a pair of directions.
    fn eval(&self, vi: &Vec3, vo: &Vec3) -> Vec3;
}

impl<M: ReflectanceModel + ?Sized> ReflectanceModel for &M {
    fn name(&self) -> &str { (**self).name() }

    fn is_isotropic(&self) -> bool { (**self).is_isotropic() }

    fn eval(&self, vi: &Vec3, vo: &Vec3) -> Vec3 { (**self).eval(vi, vo) }
}

/// Lambertian BRDF model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambertianBrdf {
    /// Reflectance of the surface, i.e. the fraction of light that is
    /// reflected.
    pub reflectance: Vec3,
}

impl ReflectanceModel for LambertianBrdf {
    fn name(&self) -> &str { "Lambertian" }

    fn eval(&self, _vi: &Vec3, _vo: &Vec3) -> Vec3 { self.reflectance * FRAC_1_PI }
}

/// Smallest z component of a direction handed to a reflectance model.
pub const MIN_Z: f32 = 0.001;

/// Adapts a [`ReflectanceModel`] to the [`SpectrumSampler`] contract.
///
/// Directions are lifted slightly above the horizon before evaluation, and
/// turned into transmitted directions for BTDF data. The RGB result is
/// reduced to the channels of the color model and bounded by `max_value`.
#[derive(Debug, Clone)]
pub struct ModelSampler<M> {
    model: M,
    color_model: ColorModel,
    data_type: DataType,
    max_value: f32,
    wavelengths: Vec<f32>,
}

impl<M: ReflectanceModel> ModelSampler<M> {
    /// Creates a sampler of the given color model.
    ///
    /// Only RGB and monochromatic data can be produced from a reflectance
    /// model.
    pub fn new(
        model: M,
        color_model: ColorModel,
        data_type: DataType,
        max_value: f32,
    ) -> Result<Self, Error> {
        if !matches!(color_model, ColorModel::Rgb | ColorModel::Monochromatic) {
            log::error!(
                "[ModelSampler::new] Unsupported color model: {}",
                color_model
            );
            return Err(Error::UnsupportedColorModel(color_model));
        }
        Ok(Self {
            model,
            color_model,
            data_type,
            max_value,
            wavelengths: vec![0.0; color_model.n_channels(1)],
        })
    }

    fn guard_directions(&self, in_dir: &Vec3, out_dir: &Vec3) -> (Vec3, Vec3) {
        let mut vi = *in_dir;
        let mut vo = *out_dir;
        vi.z = vi.z.max(MIN_Z);
        vo.z = vo.z.max(MIN_Z);
        if vo.x.abs() <= MIN_Z && vo.y.abs() <= MIN_Z && vo.z <= MIN_Z {
            vo.x = 1.0;
        }
        let vi = vi.normalize();
        let mut vo = vo.normalize();
        if self.data_type == DataType::Btdf {
            vo.z = -vo.z;
        }
        (vi, vo)
    }
}

impl<M: ReflectanceModel> SpectrumSampler for ModelSampler<M> {
    fn color_model(&self) -> ColorModel { self.color_model }

    fn wavelengths(&self) -> &[f32] { &self.wavelengths }

    fn is_isotropic(&self) -> bool { self.model.is_isotropic() }

    fn spectrum(&self, in_dir: &Vec3, out_dir: &Vec3) -> Spectrum {
        let (vi, vo) = self.guard_directions(in_dir, out_dir);
        let rgb = self.model.eval(&vi, &vo);
        debug_assert!(rgb.is_finite(), "{} returned {}", self.model.name(), rgb);
        match self.color_model {
            ColorModel::Monochromatic => {
                vec![(rgb.element_sum() / 3.0).min(self.max_value)].into_boxed_slice()
            },
            _ => rgb.min(Vec3::splat(self.max_value)).to_array().into(),
        }
    }
}

/// Fills every cell of a BRDF by sampling `sampler` at the directions of the
/// cell.
///
/// The axis2 slices of the grid are processed in parallel. With
/// `skip_downward`, cells whose outgoing direction is below the horizon are
/// left untouched.
///
/// # Panics
///
/// Panics if the sampler returns spectra of another length than the grid's.
pub fn populate<C: CoordinateSystem>(
    brdf: &mut CoordsBrdf<C>,
    sampler: &dyn SpectrumSampler,
    skip_downward: bool,
) {
    brdf.samples_mut().par_slices_mut().for_each(|mut slice| {
        let angle2 = slice.angle(2, slice.index2());
        for i0 in 0..slice.n_angles(0) {
            for i1 in 0..slice.n_angles(1) {
                for i3 in 0..slice.n_angles(3) {
                    let (in_dir, out_dir) = C::to_xyz(
                        slice.angle(0, i0),
                        slice.angle(1, i1),
                        angle2,
                        slice.angle(3, i3),
                    );
                    if skip_downward && is_below_horizon(&out_dir) {
                        continue;
                    }
                    let spectrum = sampler.spectrum(&in_dir, &out_dir);
                    slice.set_spectrum(i0, i1, i3, &spectrum);
                }
            }
        }
    });
}

/// Tabulates a reflectance model into an existing BRDF.
///
/// The layout of the grid is kept; only the spectra are overwritten. Cells
/// below the horizon are synthesized from their neighbours when the
/// coordinate system has such cells.
///
/// Fails without writing anything if the color model of the grid is neither
/// RGB nor monochromatic.
pub fn setup_tabular_brdf<M: ReflectanceModel, C: CoordinateSystem>(
    model: &M,
    brdf: &mut CoordsBrdf<C>,
    data_type: DataType,
    max_value: f32,
) -> Result<(), Error> {
    let sampler = ModelSampler::new(model, brdf.samples().color_model(), data_type, max_value)?;
    log::info!(
        "[setup_tabular_brdf] Tabulating {} in {} coordinates",
        model.name(),
        C::NAME
    );
    populate(brdf, &sampler, C::FILL_BACK_SIDE);
    if C::FILL_BACK_SIDE {
        brdf.fill_back_side();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brdf::{SpecularCoordsBrdf, SphericalCoordsBrdf};
    use approx::assert_relative_eq;
    use base::math::sph_to_cart;

    const WHITE: LambertianBrdf = LambertianBrdf {
        reflectance: Vec3::new(0.9, 0.6, 0.3),
    };

    #[test]
    fn lambertian_is_reflectance_over_pi() {
        let v = WHITE.eval(&Vec3::Z, &sph_to_cart(0.5, 1.0));
        assert_relative_eq!(v.x, 0.9 * FRAC_1_PI);
        assert_relative_eq!(v.y, 0.6 * FRAC_1_PI);
        assert_relative_eq!(v.z, 0.3 * FRAC_1_PI);
    }

    #[test]
    fn unsupported_color_models_are_rejected() {
        for cm in [ColorModel::Xyz, ColorModel::Spectral] {
            let mut brdf = SpecularCoordsBrdf::new(2, 1, 3, 4, cm, 5);
            let before = brdf.clone();
            let result = setup_tabular_brdf(&WHITE, &mut brdf, DataType::Brdf, 1.0);
            assert!(matches!(result, Err(Error::UnsupportedColorModel(m)) if m == cm));
            assert_eq!(brdf, before);
        }
    }

    #[test]
    fn rgb_tabulation_is_bounded() {
        let mut brdf = SphericalCoordsBrdf::new(3, 1, 4, 5, ColorModel::Rgb, 0);
        setup_tabular_brdf(&WHITE, &mut brdf, DataType::Brdf, 0.25).unwrap();
        for s in brdf.samples().spectra() {
            assert_relative_eq!(s[0], 0.25);
            assert_relative_eq!(s[1], 0.6 * FRAC_1_PI);
            assert_relative_eq!(s[2], 0.3 * FRAC_1_PI);
        }
    }

    #[test]
    fn monochromatic_tabulation_averages_channels() {
        let mut brdf = SpecularCoordsBrdf::new(4, 1, 5, 7, ColorModel::Monochromatic, 0);
        setup_tabular_brdf(&WHITE, &mut brdf, DataType::Btdf, 10.0).unwrap();
        for s in brdf.samples().spectra() {
            assert_eq!(s.len(), 1);
            assert_relative_eq!(s[0], 0.6 * FRAC_1_PI, epsilon = 1e-6);
        }
    }

    #[test]
    fn directions_are_guarded() {
        let sampler = ModelSampler::new(WHITE, ColorModel::Rgb, DataType::Btdf, 1.0).unwrap();
        let (vi, vo) = sampler.guard_directions(&Vec3::new(1.0, 0.0, -0.2), &Vec3::ZERO);
        assert!(vi.z >= MIN_Z * 0.5);
        assert_relative_eq!(vi.length(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(vo.length(), 1.0, epsilon = 1e-6);
        assert!(vo.z < 0.0);
        assert!(vo.x > 0.99);
    }

    struct Recorder;

    impl SpectrumSampler for Recorder {
        fn color_model(&self) -> ColorModel { ColorModel::Monochromatic }

        fn wavelengths(&self) -> &[f32] { &[0.0] }

        fn is_isotropic(&self) -> bool { true }

        fn spectrum(&self, _in_dir: &Vec3, out_dir: &Vec3) -> Spectrum { Box::new([out_dir.z]) }
    }

    #[test]
    fn populate_skips_cells_below_the_horizon() {
        let mut brdf = SpecularCoordsBrdf::new(3, 1, 4, 3, ColorModel::Monochromatic, 0);
        brdf.samples_mut().spectra_mut().for_each(|s| s[0] = -1.0);
        populate(&mut brdf, &Recorder, true);
        for [i0, i1, i2, i3] in brdf.samples().indices().collect::<Vec<_>>() {
            let (_, out_dir) = brdf.in_out_direction(i0, i1, i2, i3);
            let value = brdf.samples().spectrum(i0, i1, i2, i3)[0];
            if is_below_horizon(&out_dir) {
                assert_eq!(value, -1.0);
            } else {
                assert_relative_eq!(value, out_dir.z, epsilon = 1e-6);
            }
        }
    }
}
