//! Arrangement of a BRDF in specular offset coordinates before export.
//!
//! Measured grids are often partial: a single incoming polar angle, half of
//! the azimuthal rotation, no sample at 2π, values that don't conserve
//! energy. [`arrange`] turns such a grid into one that covers the whole
//! domain, is periodic along its azimuthal axes and is physically plausible.
//!
//! Every step takes the working BRDF by value and returns the next one; the
//! caller's BRDF is never modified.

use crate::brdf::SpecularCoordsBrdf;
use base::{
    array::{self, find_bounds_periodic, is_equal, linspace, position_of},
    error::Error,
    grid::{is_one_sided, SampleGrid, N_AXES},
    DataType,
};
use std::f32::consts::{FRAC_PI_2, TAU};

/// Number of incoming polar angles of a BRDF measured at a single incoming
/// polar angle once expanded.
pub const EXPANDED_INCOMING_POLAR_ANGLES: usize = 10;

/// Bounds applied by the energy conservation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrangeOptions {
    /// Largest value of a channel.
    pub max_value: f32,
    /// Largest directional albedo of a channel.
    pub max_reflectance: f32,
}

impl Default for ArrangeOptions {
    fn default() -> Self {
        Self {
            max_value: f32::MAX,
            max_reflectance: 1.0,
        }
    }
}

impl ArrangeOptions {
    /// Checks that `max_value` is finite and non-negative and that
    /// `max_reflectance` is finite and positive.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.max_value.is_finite() || self.max_value < 0.0 {
            return Err(Error::Config(format!(
                "max_value must be a finite non-negative number, got {}",
                self.max_value
            )));
        }
        if !self.max_reflectance.is_finite() || self.max_reflectance <= 0.0 {
            return Err(Error::Config(format!(
                "max_reflectance must be a finite positive number, got {}",
                self.max_reflectance
            )));
        }
        Ok(())
    }
}

/// Arranges a BRDF for export.
///
/// The steps run in a fixed order:
///
/// 1. [`expand_incoming_angles`]
/// 2. [`equalize_overlaps`]
/// 3. [`fill_symmetric_azimuths`]
/// 4. [`close_azimuth_period`]
/// 5. [`fix_energy_conservation`]
/// 6. [`zero_grazing_incidence`], for BTDF data only.
///
/// The angle attributes of the grid are recomputed first, so that every step
/// sees the same one-sidedness whatever the caller did to the axes.
pub fn arrange(
    brdf: &SpecularCoordsBrdf,
    data_type: DataType,
    options: &ArrangeOptions,
) -> SpecularCoordsBrdf {
    let mut brdf = brdf.clone();
    brdf.samples_mut().update_angle_attributes();
    let brdf = expand_incoming_angles(brdf);
    let brdf = equalize_overlaps(brdf);
    let brdf = fill_symmetric_azimuths(brdf);
    let brdf = close_azimuth_period(brdf);
    let brdf = fix_energy_conservation(brdf, options);
    let brdf = match data_type {
        DataType::Brdf => brdf,
        DataType::Btdf => zero_grazing_incidence(brdf),
    };
    let [n0, n1, n2, n3] = brdf.samples().shape();
    log::info!(
        "[arrange] Arranged {} grid: {}x{}x{}x{} cells",
        data_type,
        n0,
        n1,
        n2,
        n3
    );
    brdf
}

/// Where the value of a cell along a remapped axis comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
enum AxisSample {
    /// The sample at the given index of the old axis.
    At(usize),
    /// Linear interpolation between two samples of the old axis; the weight
    /// is the one of the second sample.
    Between(usize, usize, f32),
}

impl AxisSample {
    fn periodic(angles: &[f32], value: f32) -> Self {
        let (bounds, query) = find_bounds_periodic(angles, value, TAU);
        AxisSample::Between(bounds.lower_index, bounds.upper_index, bounds.weight(query))
    }
}

fn lerp_into(dst: &mut [f32], a: &[f32], b: &[f32], w: f32) {
    for ((d, a), b) in dst.iter_mut().zip(a).zip(b) {
        *d = a * (1.0 - w) + b * w;
    }
}

fn sample_into(dst: &mut [f32], src: &SampleGrid, index: [usize; N_AXES], axis: usize, sample: AxisSample) {
    let mut at = index;
    match sample {
        AxisSample::At(k) => {
            at[axis] = k;
            dst.copy_from_slice(&src[at]);
        },
        AxisSample::Between(k0, k1, w) => {
            let mut other = index;
            at[axis] = k0;
            other[axis] = k1;
            lerp_into(dst, &src[at], &src[other], w);
        },
    }
}

/// Creates a zero-filled BRDF with new axes and everything else taken from
/// `brdf`.
fn with_axes(brdf: &SpecularCoordsBrdf, angles: [Vec<f32>; N_AXES]) -> SpecularCoordsBrdf {
    let src = brdf.samples();
    let samples = SampleGrid::with_axes(angles, src.color_model(), src.wavelengths().to_vec());
    let mut arranged = SpecularCoordsBrdf::from_samples(samples, brdf.source_type());
    arranged.set_specular_offsets(brdf.specular_offsets().to_vec());
    arranged
}

/// Replaces one axis, every cell taking its value from `samples`, indexed by
/// the position along the new axis.
fn remap_axis(
    brdf: &SpecularCoordsBrdf,
    axis: usize,
    angles: Vec<f32>,
    samples: &[AxisSample],
) -> SpecularCoordsBrdf {
    debug_assert_eq!(angles.len(), samples.len());
    let mut axes: [Vec<f32>; N_AXES] =
        std::array::from_fn(|a| brdf.samples().angles(a).to_vec());
    axes[axis] = angles;
    let mut remapped = with_axes(brdf, axes);
    let src = brdf.samples();
    for (index, dst) in remapped.samples_mut().indexed_spectra_mut() {
        sample_into(dst, src, index, axis, samples[index[axis]]);
    }
    remapped
}

/// Expands a BRDF measured at a single incoming polar angle to
/// [`EXPANDED_INCOMING_POLAR_ANGLES`] angles evenly spaced on [0, π/2].
///
/// Every new angle holds a copy of the single measured one.
pub fn expand_incoming_angles(brdf: SpecularCoordsBrdf) -> SpecularCoordsBrdf {
    if brdf.samples().n_angles(0) != 1 {
        return brdf;
    }
    log::debug!(
        "[expand_incoming_angles] Expanding incoming polar angle {} to {} angles",
        brdf.samples().angle(0, 0).to_degrees(),
        EXPANDED_INCOMING_POLAR_ANGLES
    );
    let angles = linspace(EXPANDED_INCOMING_POLAR_ANGLES, 0.0, FRAC_PI_2);
    let samples = vec![AxisSample::At(0); angles.len()];
    let mut expanded = remap_axis(&brdf, 0, angles, &samples);
    if let [offset] = brdf.specular_offsets() {
        expanded.set_specular_offsets(vec![*offset; EXPANDED_INCOMING_POLAR_ANGLES]);
    }
    expanded
}

/// Averages the cells that describe the same pair of directions.
///
/// - At θs = 0, all the φs of a row are the specular direction.
/// - At θi = 0, all the φi describe the normal incidence; each cell becomes
///   the average, over the φi slices, of the same physical outgoing
///   direction. Only done when φs covers the whole rotation.
pub fn equalize_overlaps(mut brdf: SpecularCoordsBrdf) -> SpecularCoordsBrdf {
    let [n0, n1, n2, n3] = brdf.samples().shape();
    let n_wavelengths = brdf.samples().n_wavelengths();

    // Specular direction.
    let specular: Vec<usize> = (0..n2)
        .filter(|&i2| is_equal(brdf.samples().angle(2, i2), 0.0))
        .collect();
    for i2 in specular {
        for i0 in 0..n0 {
            for i1 in 0..n1 {
                let mut average = vec![0.0f32; n_wavelengths];
                for i3 in 0..n3 {
                    let s = brdf.samples().spectrum(i0, i1, i2, i3);
                    average.iter_mut().zip(s).for_each(|(a, v)| *a += v);
                }
                average.iter_mut().for_each(|a| *a /= n3 as f32);
                for i3 in 0..n3 {
                    brdf.samples_mut().set_spectrum(i0, i1, i2, i3, &average);
                }
            }
        }
    }

    // Normal incidence.
    let samples = brdf.samples();
    if n1 > 1 && is_equal(samples.angle(0, 0), 0.0) && !samples.is_one_side() {
        log::debug!("[equalize_overlaps] Averaging {} slices at normal incidence", n1);
        let src = samples.clone();
        let phi_i = src.angles(1);
        let phi_s = src.angles(3);
        let mut average = vec![0.0f32; n_wavelengths];
        let mut value = vec![0.0f32; n_wavelengths];
        for i1 in 0..n1 {
            for i2 in 0..n2 {
                for i3 in 0..n3 {
                    average.fill(0.0);
                    let azimuth = phi_s[i3] + phi_i[i1];
                    for (j1, phi) in phi_i.iter().enumerate() {
                        let sample = AxisSample::periodic(phi_s, azimuth - phi);
                        sample_into(&mut value, &src, [0, j1, i2, 0], 3, sample);
                        average.iter_mut().zip(&value).for_each(|(a, v)| *a += v);
                    }
                    average.iter_mut().for_each(|a| *a /= n1 as f32);
                    brdf.samples_mut().set_spectrum(0, i1, i2, i3, &average);
                }
            }
        }
    }

    brdf
}

/// Where the value of a cell along the mirrored φs axis comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Mirror {
    /// Measured at the given index.
    Measured(usize),
    /// Mirror image of the given index.
    Mirrored(usize),
}

/// Completes a one-sided φs axis with its mirror image.
///
/// The new axis is the union of the measured angles and their images
/// `2π - φs` (2π itself excluded). A mirrored cell takes the value of the
/// cell at `(2π - φi, 2π - φs)`, interpolated along φi for anisotropic data.
pub fn fill_symmetric_azimuths(brdf: SpecularCoordsBrdf) -> SpecularCoordsBrdf {
    let samples = brdf.samples();
    if !samples.is_one_side() {
        return brdf;
    }

    let measured = samples.angles(3);
    let mut axis: Vec<(f32, Mirror)> = measured
        .iter()
        .enumerate()
        .map(|(i, &v)| (v, Mirror::Measured(i)))
        .collect();
    for (i, &v) in measured.iter().enumerate() {
        let image = TAU - v;
        if image >= TAU || is_equal(image, TAU) || array::contains_value(measured, image, 1e-5) {
            continue;
        }
        axis.push((image, Mirror::Mirrored(i)));
    }
    axis.sort_by(|a, b| a.0.total_cmp(&b.0));
    axis.dedup_by(|a, b| is_equal(a.0, b.0));

    if axis.len() == measured.len() {
        log::debug!("[fill_symmetric_azimuths] Nothing to mirror");
        return brdf;
    }
    log::info!(
        "[fill_symmetric_azimuths] Mirroring {} azimuthal angles to {}",
        measured.len(),
        axis.len()
    );

    let phi_i = samples.angles(1);
    let phi_i_images: Vec<AxisSample> = if samples.is_isotropic() {
        vec![AxisSample::At(0)]
    } else {
        phi_i
            .iter()
            .map(|&v| match position_of(phi_i, (TAU - v) % TAU) {
                Some(k) => AxisSample::At(k),
                None => AxisSample::periodic(phi_i, TAU - v),
            })
            .collect()
    };

    let mut axes: [Vec<f32>; N_AXES] = std::array::from_fn(|a| samples.angles(a).to_vec());
    axes[3] = axis.iter().map(|(v, _)| *v).collect();
    let mut mirrored = with_axes(&brdf, axes);
    for (index, dst) in mirrored.samples_mut().indexed_spectra_mut() {
        match axis[index[3]].1 {
            Mirror::Measured(k) => {
                let [i0, i1, i2, _] = index;
                dst.copy_from_slice(samples.spectrum(i0, i1, i2, k));
            },
            Mirror::Mirrored(k) => {
                let [i0, i1, i2, _] = index;
                sample_into(dst, samples, [i0, i1, i2, k], 1, phi_i_images[i1]);
            },
        }
    }
    mirrored
}

/// Closes the period of the azimuthal axes: φs, and φi for anisotropic
/// data.
///
/// An axis with samples in both halves of the rotation that doesn't end at
/// 2π gets a sample at 2π, a copy of the sample at 0. If it doesn't start at
/// 0 either, samples at 0 and 2π are both inserted, interpolated across the
/// gap. Axes covering at most one half are left alone.
pub fn close_azimuth_period(brdf: SpecularCoordsBrdf) -> SpecularCoordsBrdf {
    let brdf = close_axis_period(brdf, 3);
    if brdf.samples().is_isotropic() {
        brdf
    } else {
        close_axis_period(brdf, 1)
    }
}

fn close_axis_period(brdf: SpecularCoordsBrdf, axis: usize) -> SpecularCoordsBrdf {
    let angles = brdf.samples().angles(axis);
    let n = angles.len();
    if is_one_sided(angles) || is_equal(angles[n - 1], TAU) {
        return brdf;
    }

    let (angles, samples) = if is_equal(angles[0], 0.0) {
        let mut samples: Vec<AxisSample> = (0..n).map(AxisSample::At).collect();
        samples.push(AxisSample::At(0));
        (array::append_element(angles, TAU), samples)
    } else {
        let gap = AxisSample::periodic(angles, 0.0);
        let mut samples = Vec::with_capacity(n + 2);
        samples.push(gap);
        samples.extend((0..n).map(AxisSample::At));
        samples.push(gap);
        let mut closed = Vec::with_capacity(n + 2);
        closed.push(0.0);
        closed.extend_from_slice(angles);
        closed.push(TAU);
        (closed, samples)
    };
    log::debug!(
        "[close_azimuth_period] Closing the period of angle{} ({} -> {} angles)",
        axis,
        n,
        angles.len()
    );
    remap_axis(&brdf, axis, angles, &samples)
}

/// Solid angle factors of the polar bands around each sample: the band of a
/// sample spans from the midpoint with its predecessor to the midpoint with
/// its successor, the first and last bands stopping at the first and last
/// samples. A single sample stands for the whole hemisphere.
fn polar_band_factors(theta: &[f32]) -> Vec<f32> {
    let n = theta.len();
    if n == 1 {
        return vec![1.0];
    }
    (0..n)
        .map(|i| {
            let lo = if i == 0 { theta[0] } else { (theta[i - 1] + theta[i]) * 0.5 };
            let hi = if i == n - 1 { theta[n - 1] } else { (theta[i] + theta[i + 1]) * 0.5 };
            lo.cos() - hi.cos()
        })
        .collect()
}

/// Widths of the azimuthal sectors around each sample of a periodic axis.
///
/// A trailing sample at 2π duplicating the sample at 0 gets no width.
fn azimuth_widths(phi: &[f32]) -> Vec<f32> {
    let mut n = phi.len();
    if n > 1 && is_equal(phi[n - 1] - phi[0], TAU) {
        n -= 1;
    }
    let mut widths = vec![0.0; phi.len()];
    if n == 1 {
        widths[0] = TAU;
        return widths;
    }
    for i in 0..n {
        let prev = if i == 0 { phi[n - 1] - TAU } else { phi[i - 1] };
        let next = if i == n - 1 { phi[0] + TAU } else { phi[i + 1] };
        widths[i] = (next - prev) * 0.5;
    }
    widths
}

/// Bounds the values and the directional albedo of the BRDF.
///
/// Every channel value is clamped to `[0, max_value]` (see
/// [`ArrangeOptions::validate`]). Then, for each
/// incoming direction, the albedo of every channel is integrated over the
/// outgoing directions; channels above `max_reflectance` are scaled down
/// proportionally.
pub fn fix_energy_conservation(mut brdf: SpecularCoordsBrdf, options: &ArrangeOptions) -> SpecularCoordsBrdf {
    let mut n_clamped = 0usize;
    for spectrum in brdf.samples_mut().spectra_mut() {
        for v in spectrum.iter_mut() {
            let clamped = v.max(0.0).min(options.max_value);
            if clamped != *v {
                *v = clamped;
                n_clamped += 1;
            }
        }
    }

    let [n0, n1, n2, n3] = brdf.samples().shape();
    let n_wavelengths = brdf.samples().n_wavelengths();
    let bands = polar_band_factors(brdf.samples().angles(2));
    let widths = azimuth_widths(brdf.samples().angles(3));
    let mut n_rescaled = 0usize;
    let mut albedo = vec![0.0f32; n_wavelengths];
    for i0 in 0..n0 {
        for i1 in 0..n1 {
            albedo.fill(0.0);
            for i2 in 0..n2 {
                for i3 in 0..n3 {
                    let (_, out_dir) = brdf.in_out_direction(i0, i1, i2, i3);
                    let weight = out_dir.z.max(0.0) * bands[i2] * widths[i3];
                    if weight <= 0.0 {
                        continue;
                    }
                    let s = brdf.samples().spectrum(i0, i1, i2, i3);
                    albedo.iter_mut().zip(s).for_each(|(a, v)| *a += v * weight);
                }
            }

            let scales: Vec<f32> = albedo
                .iter()
                .map(|&a| {
                    if a > options.max_reflectance && options.max_reflectance > 0.0 {
                        options.max_reflectance / a
                    } else {
                        1.0
                    }
                })
                .collect();
            if scales.iter().all(|&s| s == 1.0) {
                continue;
            }
            n_rescaled += 1;
            for i2 in 0..n2 {
                for i3 in 0..n3 {
                    let s = brdf.samples_mut().spectrum_mut(i0, i1, i2, i3);
                    s.iter_mut().zip(&scales).for_each(|(v, k)| *v *= k);
                }
            }
        }
    }

    if n_clamped > 0 {
        log::warn!(
            "[fix_energy_conservation] {} values clamped to [0, {}]",
            n_clamped,
            options.max_value
        );
    }
    if n_rescaled > 0 {
        log::warn!(
            "[fix_energy_conservation] {} incoming directions rescaled to a reflectance of {}",
            n_rescaled,
            options.max_reflectance
        );
    }
    brdf
}

/// Zeroes every sample at grazing incidence (θi = π/2), where no light is
/// transmitted.
pub fn zero_grazing_incidence(mut brdf: SpecularCoordsBrdf) -> SpecularCoordsBrdf {
    let [n0, n1, n2, n3] = brdf.samples().shape();
    let grazing: Vec<usize> = (0..n0)
        .filter(|&i0| is_equal(brdf.samples().angle(0, i0), FRAC_PI_2))
        .collect();
    for i0 in grazing {
        for i1 in 0..n1 {
            for i2 in 0..n2 {
                for i3 in 0..n3 {
                    brdf.samples_mut().spectrum_mut(i0, i1, i2, i3).fill(0.0);
                }
            }
        }
    }
    brdf
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use base::ColorModel;
    use proptest::prelude::*;
    use std::f32::consts::PI;

    fn deg(values: &[f32]) -> Vec<f32> { values.iter().map(|v| v.to_radians()).collect() }

    fn brdf(angles: [Vec<f32>; N_AXES], color_model: ColorModel) -> SpecularCoordsBrdf {
        let n = color_model.n_channels(1);
        SpecularCoordsBrdf::from_samples(
            SampleGrid::with_axes(angles, color_model, vec![0.0; n]),
            Default::default(),
        )
    }

    #[test]
    fn single_incoming_angle_is_expanded() {
        let mut b = brdf(
            [vec![0.3], vec![0.0], deg(&[0.0, 30.0]), deg(&[0.0, 90.0])],
            ColorModel::Monochromatic,
        );
        b.set_specular_offsets(vec![0.01]);
        for (n, (_, s)) in b.samples_mut().indexed_spectra_mut().enumerate() {
            s[0] = n as f32;
        }
        let expanded = expand_incoming_angles(b.clone());
        assert_eq!(expanded.samples().n_angles(0), EXPANDED_INCOMING_POLAR_ANGLES);
        assert_eq!(expanded.samples().angle(0, 9), FRAC_PI_2);
        assert_eq!(expanded.specular_offsets(), &[0.01; 10]);
        for [i0, i1, i2, i3] in expanded.samples().indices() {
            assert_eq!(
                expanded.samples().spectrum(i0, i1, i2, i3),
                b.samples().spectrum(0, i1, i2, i3)
            );
        }
        // Already expanded grids are left alone.
        assert_eq!(expand_incoming_angles(expanded.clone()), expanded);
    }

    #[test]
    fn specular_direction_is_averaged() {
        let mut b = brdf(
            [deg(&[0.0, 40.0]), vec![0.0], deg(&[0.0, 20.0]), deg(&[0.0, 90.0, 180.0, 270.0])],
            ColorModel::Monochromatic,
        );
        for ([_, _, i2, i3], s) in b.samples_mut().indexed_spectra_mut() {
            s[0] = (i2 * 10 + i3) as f32;
        }
        let b = equalize_overlaps(b);
        for i0 in 0..2 {
            for i3 in 0..4 {
                assert_relative_eq!(b.samples().spectrum(i0, 0, 0, i3)[0], 1.5);
                assert_eq!(b.samples().spectrum(i0, 0, 1, i3)[0], (10 + i3) as f32);
            }
        }
    }

    #[test]
    fn normal_incidence_slices_are_averaged() {
        let phi = deg(&[0.0, 90.0, 180.0, 270.0]);
        let mut b = brdf(
            [deg(&[0.0, 45.0]), phi.clone(), deg(&[0.0, 30.0]), phi],
            ColorModel::Monochromatic,
        );
        // Only the slice φi = 0 is lit.
        for ([_, i1, i2, _], s) in b.samples_mut().indexed_spectra_mut() {
            s[0] = if i1 == 0 && i2 == 1 { 4.0 } else { 0.0 };
        }
        let b = equalize_overlaps(b);
        for i1 in 0..4 {
            for i3 in 0..4 {
                assert_relative_eq!(b.samples().spectrum(0, i1, 1, i3)[0], 1.0, epsilon = 1e-5);
            }
        }
        // Oblique incidence is untouched.
        assert_eq!(b.samples().spectrum(1, 0, 1, 2)[0], 4.0);
        assert_eq!(b.samples().spectrum(1, 1, 1, 2)[0], 0.0);
    }

    fn one_sided_brdf() -> SpecularCoordsBrdf {
        let mut b = brdf(
            [
                deg(&[0.0, 30.0, 60.0]),
                vec![0.0],
                deg(&[0.0, 15.0, 45.0, 90.0]),
                deg(&[0.0, 45.0, 90.0, 135.0, 180.0]),
            ],
            ColorModel::Rgb,
        );
        for ([i0, _, i2, i3], s) in b.samples_mut().indexed_spectra_mut() {
            let v = 0.01 * (i0 + 1) as f32 + 0.001 * (i2 * 5 + i3) as f32;
            s.copy_from_slice(&[v, v * 0.5, v * 0.25]);
        }
        b
    }

    #[test]
    fn one_sided_grids_are_mirrored_and_closed() {
        let b = one_sided_brdf();
        assert!(b.samples().is_one_side());
        let mirrored = fill_symmetric_azimuths(b.clone());
        let phi_s = mirrored.samples().angles(3).to_vec();
        for (a, e) in phi_s.iter().zip(deg(&[0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0])) {
            assert_relative_eq!(*a, e, epsilon = 1e-5);
        }
        assert!(!mirrored.samples().is_one_side());
        for [i0, i1, i2, i3] in mirrored.samples().indices() {
            let image = position_of(b.samples().angles(3), (TAU - phi_s[i3]) % TAU)
                .or_else(|| position_of(b.samples().angles(3), phi_s[i3]))
                .unwrap();
            assert_eq!(
                mirrored.samples().spectrum(i0, i1, i2, i3),
                b.samples().spectrum(i0, i1, i2, image)
            );
        }

        let closed = close_azimuth_period(mirrored);
        let s = closed.samples();
        assert_eq!(s.n_angles(3), 9);
        assert_eq!(s.angle(3, 8), TAU);
        for i0 in 0..s.n_angles(0) {
            for i2 in 0..s.n_angles(2) {
                assert_eq!(s.spectrum(i0, 0, i2, 0), s.spectrum(i0, 0, i2, 8));
            }
        }
        // Closing twice changes nothing.
        assert_eq!(close_azimuth_period(closed.clone()), closed);
    }

    #[test]
    fn in_plane_axes_are_kept() {
        let b = brdf(
            [vec![0.0], vec![0.0], deg(&[0.0, 45.0, 90.0]), deg(&[0.0, 180.0])],
            ColorModel::Rgb,
        );
        let b = close_azimuth_period(fill_symmetric_azimuths(b));
        assert_eq!(b.samples().n_angles(3), 2);
    }

    #[test]
    fn period_is_closed_across_the_gap() {
        let mut b = brdf(
            [vec![0.0], vec![0.0], deg(&[0.0, 45.0]), deg(&[45.0, 135.0, 225.0, 315.0])],
            ColorModel::Monochromatic,
        );
        for ([_, _, _, i3], s) in b.samples_mut().indexed_spectra_mut() {
            s[0] = [1.0, 2.0, 3.0, 5.0][i3];
        }
        let closed = close_azimuth_period(b);
        let s = closed.samples();
        assert_eq!(s.n_angles(3), 6);
        assert_eq!(s.angle(3, 0), 0.0);
        assert_eq!(s.angle(3, 5), TAU);
        // Halfway between 315° (5) and 405° (1).
        assert_relative_eq!(s.spectrum(0, 0, 1, 0)[0], 3.0, epsilon = 1e-5);
        assert_relative_eq!(s.spectrum(0, 0, 1, 5)[0], 3.0, epsilon = 1e-5);
        assert_eq!(s.spectrum(0, 0, 1, 4)[0], 5.0);
    }

    #[test]
    fn anisotropic_incoming_azimuth_is_closed() {
        let b = brdf(
            [
                vec![0.2],
                deg(&[0.0, 90.0, 180.0, 270.0]),
                vec![0.0],
                deg(&[0.0, 120.0, 240.0, 360.0]),
            ],
            ColorModel::Monochromatic,
        );
        let closed = close_azimuth_period(b);
        assert_eq!(closed.samples().n_angles(1), 5);
        assert_eq!(closed.samples().n_angles(3), 4);
    }

    #[test]
    fn widths_and_bands_cover_the_hemisphere() {
        let phi = linspace(73, 0.0, TAU);
        let widths = azimuth_widths(&phi);
        assert_eq!(widths[72], 0.0);
        assert_relative_eq!(widths.iter().sum::<f32>(), TAU, epsilon = 1e-4);
        assert_relative_eq!(azimuth_widths(&deg(&[0.0, 180.0])).iter().sum::<f32>(), TAU, epsilon = 1e-5);

        let theta = linspace(91, 0.0, FRAC_PI_2);
        assert_relative_eq!(polar_band_factors(&theta).iter().sum::<f32>(), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn plausible_data_is_untouched() {
        let b = one_sided_brdf();
        let b = close_azimuth_period(fill_symmetric_azimuths(b));
        let fixed = fix_energy_conservation(b.clone(), &ArrangeOptions::default());
        assert_eq!(fixed, b);
    }

    #[test]
    fn grazing_incidence_is_zeroed_for_transmission() {
        let mut b = one_sided_brdf();
        b.samples_mut().spectra_mut().for_each(|s| s.fill(0.1));
        let arranged = arrange(&b, DataType::Btdf, &ArrangeOptions::default());
        let s = arranged.samples();
        let last = s.n_angles(0) - 1;
        assert_eq!(s.angle(0, last), deg(&[60.0])[0]);

        let mut b = brdf(
            [deg(&[0.0, 90.0]), vec![0.0], deg(&[0.0, 45.0]), deg(&[0.0, 180.0])],
            ColorModel::Rgb,
        );
        b.samples_mut().spectra_mut().for_each(|s| s.fill(0.1));
        let btdf = arrange(&b, DataType::Btdf, &ArrangeOptions::default());
        let brdf = arrange(&b, DataType::Brdf, &ArrangeOptions::default());
        for [i0, i1, i2, i3] in btdf.samples().indices() {
            let expected = if i0 == 1 { 0.0 } else { 0.1 };
            assert!(btdf.samples().spectrum(i0, i1, i2, i3).iter().all(|v| *v == expected));
            assert!(brdf.samples().spectrum(i0, i1, i2, i3).iter().all(|v| *v == 0.1));
        }
    }

    #[test]
    fn stale_azimuth_attributes_are_refreshed() {
        let mut b = SpecularCoordsBrdf::new(2, 1, 3, 5, ColorModel::Rgb, 0);
        assert!(!b.samples().is_one_side());
        b.samples_mut().set_angles(3, &[0.0, 0.7, 1.4, 2.1, PI]);
        b.samples_mut().spectra_mut().for_each(|s| s.fill(0.05));
        let arranged = arrange(&b, DataType::Brdf, &ArrangeOptions::default());
        let s = arranged.samples();
        assert_eq!(s.n_angles(3), 9);
        assert_relative_eq!(s.angle(3, 5), TAU - 2.1, epsilon = 1e-5);
        assert_relative_eq!(s.angle(3, 7), TAU - 0.7, epsilon = 1e-5);
        assert_eq!(s.angle(3, 8), TAU);
        assert!(!s.is_one_side());
    }

    #[test]
    fn out_of_range_bounds_do_not_panic() {
        for max_value in [-1.0, f32::NAN] {
            let mut b = one_sided_brdf();
            b.samples_mut().spectra_mut().for_each(|s| s.fill(0.2));
            let options = ArrangeOptions { max_value, ..Default::default() };
            let fixed = fix_energy_conservation(b, &options);
            assert_eq!(fixed.samples().n_samples(), one_sided_brdf().samples().n_samples());
        }
        let b = one_sided_brdf();
        let options = ArrangeOptions { max_value: 1.0, max_reflectance: -1.0 };
        let fixed = fix_energy_conservation(b.clone(), &options);
        assert!(fixed.samples().spectra().flatten().all(|v| *v >= 0.0));
    }

    #[test]
    fn bounds_are_validated() {
        assert!(ArrangeOptions::default().validate().is_ok());
        assert!(ArrangeOptions { max_value: 0.0, max_reflectance: 0.5 }.validate().is_ok());
        for (max_value, max_reflectance) in [
            (-1.0, 1.0),
            (f32::NAN, 1.0),
            (f32::INFINITY, 1.0),
            (1.0, 0.0),
            (1.0, -0.5),
            (1.0, f32::NAN),
        ] {
            let options = ArrangeOptions { max_value, max_reflectance };
            assert!(
                matches!(options.validate(), Err(Error::Config(_))),
                "{:?} accepted",
                options
            );
        }
    }

    #[test]
    fn arrange_leaves_the_input_alone() {
        let b = one_sided_brdf();
        let before = b.clone();
        let arranged = arrange(&b, DataType::Brdf, &ArrangeOptions::default());
        assert_eq!(b, before);
        assert_eq!(arranged.samples().n_angles(3), 9);
        assert!(arranged.samples().validate());
    }

    proptest! {
        #[test]
        fn energy_is_bounded(
            values in proptest::collection::vec(-5.0f32..50.0, 2 * 3 * 4 * 5 * 3),
            max_value in 0.1f32..20.0,
        ) {
            let mut b = brdf(
                [
                    deg(&[0.0, 50.0]),
                    deg(&[0.0, 120.0, 240.0]),
                    deg(&[0.0, 10.0, 40.0, 90.0]),
                    deg(&[0.0, 72.0, 144.0, 216.0, 288.0]),
                ],
                ColorModel::Rgb,
            );
            for ((_, s), v) in b.samples_mut().indexed_spectra_mut().zip(values.chunks(3)) {
                s.copy_from_slice(v);
            }
            let options = ArrangeOptions { max_value, max_reflectance: 1.0 };
            let fixed = fix_energy_conservation(b, &options);
            for s in fixed.samples().spectra() {
                for v in s {
                    prop_assert!(*v >= 0.0 && *v <= max_value, "{} out of [0, {}]", v, max_value);
                }
            }
            let bands = polar_band_factors(fixed.samples().angles(2));
            let widths = azimuth_widths(fixed.samples().angles(3));
            for i0 in 0..2 {
                for i1 in 0..3 {
                    let mut albedo = [0.0f32; 3];
                    for i2 in 0..4 {
                        for i3 in 0..5 {
                            let (_, o) = fixed.in_out_direction(i0, i1, i2, i3);
                            let w = o.z.max(0.0) * bands[i2] * widths[i3];
                            for (a, v) in albedo.iter_mut().zip(fixed.samples().spectrum(i0, i1, i2, i3)) {
                                *a += v * w;
                            }
                        }
                    }
                    for a in albedo {
                        prop_assert!(a <= 1.0 + 1e-4, "albedo {}", a);
                    }
                }
            }
        }
    }
}
