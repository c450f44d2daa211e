//! Tabulated spectral samples on a four dimensional angle grid.

use crate::{array, ColorModel};
use rayon::prelude::*;
use std::{
    f32::consts::PI,
    fmt::{Display, Formatter},
    ops::{Index, IndexMut},
};

/// Number of angle axes of a [`SampleGrid`].
pub const N_AXES: usize = 4;

/// Channel values of a single sample.
pub type Spectrum = Box<[f32]>;

/// Kind of a non-finite value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonFinite {
    /// Not a number.
    NaN,
    /// Positive or negative infinity.
    Infinite,
}

impl NonFinite {
    fn of(values: &[f32]) -> Option<Self> {
        if values.iter().any(|v| v.is_nan()) {
            Some(NonFinite::NaN)
        } else if values.iter().any(|v| v.is_infinite()) {
            Some(NonFinite::Infinite)
        } else {
            None
        }
    }
}

impl Display for NonFinite {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NonFinite::NaN => write!(f, "NaN"),
            NonFinite::Infinite => write!(f, "+/-INF"),
        }
    }
}

/// A non-finite value found by [`SampleGrid::defects`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Defect {
    /// The spectrum at the given cell contains non-finite values.
    Spectrum {
        /// Index of the cell.
        index: [usize; N_AXES],
        /// What is wrong with it.
        kind: NonFinite,
    },
    /// An angle of an axis is non-finite.
    Angle {
        /// Axis of the angle.
        axis: usize,
        /// Position of the angle inside the axis.
        index: usize,
        /// What is wrong with it.
        kind: NonFinite,
    },
    /// A wavelength is non-finite.
    Wavelength {
        /// Position of the wavelength.
        index: usize,
        /// What is wrong with it.
        kind: NonFinite,
    },
}

impl Display for Defect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Defect::Spectrum { index, kind } => write!(
                f,
                "The spectrum contains {} values at ({}, {}, {}, {}).",
                kind, index[0], index[1], index[2], index[3]
            ),
            Defect::Angle { axis, index, kind } => {
                write!(f, "The angle{} at {} is {}.", axis, index, kind)
            },
            Defect::Wavelength { index, kind } => {
                write!(f, "The wavelength at {} is {}.", index, kind)
            },
        }
    }
}

/// Returns true if the azimuthal angles don't contain samples in both
/// (0, π) and (π, 2π), which means they describe at most one half of the
/// rotation.
pub fn is_one_sided(angles: &[f32]) -> bool {
    let offset = f32::EPSILON * 2.0;
    let mut lower_half = false;
    let mut upper_half = false;
    for &angle in angles {
        if angle > offset && angle < PI - offset * PI {
            lower_half = true;
        }
        if angle > PI + offset * PI && angle < 2.0 * PI - offset * 2.0 * PI {
            upper_half = true;
        }
    }
    !lower_half || !upper_half
}

/// Iterates over the cell indices of a grid of the given shape in storage
/// order.
pub fn indices_of(shape: [usize; N_AXES]) -> impl Iterator<Item = [usize; N_AXES]> {
    let [n0, n1, n2, n3] = shape;
    (0..n2).flat_map(move |i2| {
        (0..n0).flat_map(move |i0| {
            (0..n1).flat_map(move |i1| (0..n3).map(move |i3| [i0, i1, i2, i3]))
        })
    })
}

/// Samples of a tabulated BSDF.
///
/// The grid is made of four ascending angle axes (radians), a wavelength axis
/// and one spectrum per combination of angles. All spectra have as many
/// channels as there are wavelengths.
///
/// The spectra are stored in a single flat array, axis2 being the slowest
/// varying index followed by axis0, axis1 and axis3. Every axis2 slice is
/// therefore a contiguous region, which is what [`Self::par_slices_mut`]
/// hands out to worker threads.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGrid {
    angles: [Vec<f32>; N_AXES],
    wavelengths: Vec<f32>,
    samples: Vec<f32>,
    color_model: ColorModel,
    equal_intervals: [bool; N_AXES],
    one_side: bool,
}

impl SampleGrid {
    /// Creates a zero-filled grid.
    ///
    /// The number of channels is 1 for monochromatic data, 3 for RGB and XYZ
    /// data and `n_wavelengths` for spectral data.
    ///
    /// # Panics
    ///
    /// Panics if any of the axis sizes is zero, or if the resulting channel
    /// count is zero.
    pub fn new(
        n0: usize,
        n1: usize,
        n2: usize,
        n3: usize,
        color_model: ColorModel,
        n_wavelengths: usize,
    ) -> Self {
        let mut grid = Self {
            angles: Default::default(),
            wavelengths: Vec::new(),
            samples: Vec::new(),
            color_model,
            equal_intervals: [false; N_AXES],
            one_side: false,
        };
        grid.resize_angles(n0, n1, n2, n3);
        grid.resize_wavelengths(color_model.n_channels(n_wavelengths));
        grid
    }

    /// Creates a zero-filled grid with the given axes and wavelengths, and
    /// computes its angle attributes.
    pub fn with_axes(
        angles: [Vec<f32>; N_AXES],
        color_model: ColorModel,
        wavelengths: Vec<f32>,
    ) -> Self {
        let [a0, a1, a2, a3] = angles;
        let mut grid = Self::new(
            a0.len(),
            a1.len(),
            a2.len(),
            a3.len(),
            color_model,
            wavelengths.len(),
        );
        assert_eq!(
            grid.n_wavelengths(),
            wavelengths.len(),
            "Wavelength count doesn't match the color model {}",
            color_model
        );
        grid.angles = [a0, a1, a2, a3];
        grid.wavelengths = wavelengths;
        grid.update_angle_attributes();
        grid
    }

    /// Returns the color model of the samples.
    pub fn color_model(&self) -> ColorModel { self.color_model }

    /// Returns the number of angles of every axis.
    pub fn shape(&self) -> [usize; N_AXES] {
        [
            self.angles[0].len(),
            self.angles[1].len(),
            self.angles[2].len(),
            self.angles[3].len(),
        ]
    }

    /// Returns the number of angles of an axis.
    pub fn n_angles(&self, axis: usize) -> usize { self.angles[axis].len() }

    /// Returns the number of cells of the grid.
    pub fn n_samples(&self) -> usize { self.shape().iter().product() }

    /// Returns the number of channels of every spectrum.
    pub fn n_wavelengths(&self) -> usize { self.wavelengths.len() }

    /// Returns the angles of an axis.
    pub fn angles(&self, axis: usize) -> &[f32] { &self.angles[axis] }

    /// Returns the angle at `index` of an axis.
    pub fn angle(&self, axis: usize, index: usize) -> f32 { self.angles[axis][index] }

    /// Sets the angle at `index` of an axis.
    pub fn set_angle(&mut self, axis: usize, index: usize, angle: f32) {
        self.angles[axis][index] = angle;
    }

    /// Replaces all the angles of an axis.
    ///
    /// # Panics
    ///
    /// Panics if the number of angles changes.
    pub fn set_angles(&mut self, axis: usize, angles: &[f32]) {
        assert_eq!(
            self.angles[axis].len(),
            angles.len(),
            "Use resize_angles to change the size of an axis"
        );
        self.angles[axis].copy_from_slice(angles);
    }

    /// Returns the wavelengths.
    pub fn wavelengths(&self) -> &[f32] { &self.wavelengths }

    /// Returns the wavelength at `index`.
    pub fn wavelength(&self, index: usize) -> f32 { self.wavelengths[index] }

    /// Sets the wavelength at `index`.
    pub fn set_wavelength(&mut self, index: usize, wavelength: f32) {
        self.wavelengths[index] = wavelength;
    }

    /// Returns true if the angles of the axis are `0, d, 2d, ...`.
    ///
    /// Only valid after [`Self::update_angle_attributes`].
    pub fn is_equal_interval(&self, axis: usize) -> bool { self.equal_intervals[axis] }

    /// Returns true if axis3 covers at most one half of the rotation.
    ///
    /// Only valid after [`Self::update_angle_attributes`].
    pub fn is_one_side(&self) -> bool { self.one_side }

    /// Returns true if the data doesn't depend on the incoming azimuth.
    pub fn is_isotropic(&self) -> bool { self.angles[1].len() == 1 }

    #[inline]
    fn offset(&self, i0: usize, i1: usize, i2: usize, i3: usize) -> usize {
        let [n0, n1, n2, n3] = self.shape();
        assert!(
            i0 < n0 && i1 < n1 && i2 < n2 && i3 < n3,
            "Index ({}, {}, {}, {}) out of the grid ({}, {}, {}, {})",
            i0,
            i1,
            i2,
            i3,
            n0,
            n1,
            n2,
            n3
        );
        (((i2 * n0 + i0) * n1 + i1) * n3 + i3) * self.n_wavelengths()
    }

    /// Returns the spectrum of a cell.
    pub fn spectrum(&self, i0: usize, i1: usize, i2: usize, i3: usize) -> &[f32] {
        let offset = self.offset(i0, i1, i2, i3);
        &self.samples[offset..offset + self.n_wavelengths()]
    }

    /// Returns the spectrum of a cell for modification.
    pub fn spectrum_mut(&mut self, i0: usize, i1: usize, i2: usize, i3: usize) -> &mut [f32] {
        let offset = self.offset(i0, i1, i2, i3);
        let n = self.n_wavelengths();
        &mut self.samples[offset..offset + n]
    }

    /// Sets the spectrum of a cell.
    ///
    /// # Panics
    ///
    /// Panics if the length of `spectrum` differs from the number of
    /// wavelengths.
    pub fn set_spectrum(&mut self, i0: usize, i1: usize, i2: usize, i3: usize, spectrum: &[f32]) {
        assert_eq!(
            spectrum.len(),
            self.n_wavelengths(),
            "Spectrum length mismatch"
        );
        self.spectrum_mut(i0, i1, i2, i3).copy_from_slice(spectrum);
    }

    /// Iterates over every cell index in storage order.
    pub fn indices(&self) -> impl Iterator<Item = [usize; N_AXES]> { indices_of(self.shape()) }

    /// Iterates mutably over the spectra in storage order, together with the
    /// index of their cell.
    pub fn indexed_spectra_mut(&mut self) -> impl Iterator<Item = ([usize; N_AXES], &mut [f32])> {
        let shape = self.shape();
        let n = self.n_wavelengths();
        indices_of(shape).zip(self.samples.chunks_exact_mut(n))
    }

    /// Iterates over the spectra in storage order.
    pub fn spectra(&self) -> impl Iterator<Item = &[f32]> {
        self.samples.chunks_exact(self.n_wavelengths())
    }

    /// Iterates mutably over the spectra in storage order.
    pub fn spectra_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        let n = self.n_wavelengths();
        self.samples.chunks_exact_mut(n)
    }

    /// Splits the grid into disjoint axis2 slices that can be written in
    /// parallel.
    pub fn par_slices_mut(&mut self) -> impl IndexedParallelIterator<Item = GridSliceMut<'_>> + '_ {
        let [n0, n1, _, n3] = self.shape();
        let n_wavelengths = self.n_wavelengths();
        assert_eq!(
            self.samples.len(),
            self.n_samples() * n_wavelengths,
            "Spectra must be allocated with resize_wavelengths before being written"
        );
        let angles = &self.angles;
        self.samples
            .par_chunks_mut(n0 * n1 * n3 * n_wavelengths)
            .enumerate()
            .map(move |(i2, data)| GridSliceMut {
                i2,
                angles,
                dims: [n0, n1, n3],
                n_wavelengths,
                data,
            })
    }

    /// Checks that every spectrum, angle and wavelength is finite.
    ///
    /// Every problem found is logged; nothing is repaired.
    pub fn validate(&self) -> bool {
        let defects = self.defects();

        let mut spectra_valid = true;
        for defect in &defects {
            if let Defect::Spectrum { .. } = defect {
                spectra_valid = false;
                log::warn!("[SampleGrid::validate] {}", defect);
            }
        }
        if spectra_valid {
            log::info!("[SampleGrid::validate] Spectra are valid.");
        } else {
            log::warn!("[SampleGrid::validate] Invalid spectra are found.");
        }

        for axis in 0..N_AXES {
            let invalid = defects
                .iter()
                .filter(|d| matches!(d, Defect::Angle { axis: a, .. } if *a == axis))
                .inspect(|d| log::warn!("[SampleGrid::validate] {}", d))
                .count();
            if invalid == 0 {
                log::info!("[SampleGrid::validate] The array of angle{} is valid.", axis);
            } else {
                log::warn!(
                    "[SampleGrid::validate] {} invalid angle{}(s) are found.",
                    invalid,
                    axis
                );
            }
        }

        let invalid = defects
            .iter()
            .filter(|d| matches!(d, Defect::Wavelength { .. }))
            .inspect(|d| log::warn!("[SampleGrid::validate] {}", d))
            .count();
        if invalid == 0 {
            log::info!("[SampleGrid::validate] Wavelengths are valid.");
        } else {
            log::warn!(
                "[SampleGrid::validate] {} invalid wavelength(s) are found.",
                invalid
            );
        }

        defects.is_empty()
    }

    /// Lists every non-finite spectrum, angle and wavelength.
    pub fn defects(&self) -> Vec<Defect> {
        let mut defects = Vec::new();
        for (index, spectrum) in self.indices().zip(self.spectra()) {
            if let Some(kind) = NonFinite::of(spectrum) {
                defects.push(Defect::Spectrum { index, kind });
            }
        }
        for (axis, angles) in self.angles.iter().enumerate() {
            for (index, angle) in angles.iter().enumerate() {
                if let Some(kind) = NonFinite::of(std::slice::from_ref(angle)) {
                    defects.push(Defect::Angle { axis, index, kind });
                }
            }
        }
        for (index, wavelength) in self.wavelengths.iter().enumerate() {
            if let Some(kind) = NonFinite::of(std::slice::from_ref(wavelength)) {
                defects.push(Defect::Wavelength { index, kind });
            }
        }
        defects
    }

    /// Recomputes the attributes derived from the angles: the equal interval
    /// flag of every axis and the one-sidedness of axis3.
    ///
    /// Must be called whenever the angles change.
    pub fn update_angle_attributes(&mut self) {
        for (axis, angles) in self.angles.iter().enumerate() {
            self.equal_intervals[axis] = array::is_equal_interval(angles);
            log::debug!(
                "[SampleGrid::update_angle_attributes] Angle{}: equal interval {}",
                axis,
                self.equal_intervals[axis]
            );
        }
        self.one_side = is_one_sided(&self.angles[3]);
        log::debug!(
            "[SampleGrid::update_angle_attributes] One side: {}",
            self.one_side
        );
    }

    /// Resizes the angle axes.
    ///
    /// Every spectrum is discarded; [`Self::resize_wavelengths`] must be
    /// called before the grid is populated again.
    ///
    /// # Panics
    ///
    /// Panics if any of the sizes is zero.
    pub fn resize_angles(&mut self, n0: usize, n1: usize, n2: usize, n3: usize) {
        assert!(
            n0 > 0 && n1 > 0 && n2 > 0 && n3 > 0,
            "Axis sizes must be positive: ({}, {}, {}, {})",
            n0,
            n1,
            n2,
            n3
        );
        for (angles, n) in self.angles.iter_mut().zip([n0, n1, n2, n3]) {
            angles.resize(n, 0.0);
        }
        self.samples = Vec::new();
    }

    /// Resizes the wavelength axis and re-zeros every spectrum.
    ///
    /// # Panics
    ///
    /// Panics if `n_wavelengths` is zero.
    pub fn resize_wavelengths(&mut self, n_wavelengths: usize) {
        assert!(n_wavelengths > 0, "The number of wavelengths must be positive");
        self.samples = vec![0.0; self.n_samples() * n_wavelengths];
        self.wavelengths.resize(n_wavelengths, 0.0);
    }
}

impl Index<[usize; N_AXES]> for SampleGrid {
    type Output = [f32];

    fn index(&self, index: [usize; N_AXES]) -> &Self::Output {
        self.spectrum(index[0], index[1], index[2], index[3])
    }
}

impl IndexMut<[usize; N_AXES]> for SampleGrid {
    fn index_mut(&mut self, index: [usize; N_AXES]) -> &mut Self::Output {
        self.spectrum_mut(index[0], index[1], index[2], index[3])
    }
}

/// Mutable view of the cells of a [`SampleGrid`] sharing the same axis2
/// index.
pub struct GridSliceMut<'a> {
    i2: usize,
    angles: &'a [Vec<f32>; N_AXES],
    /// Sizes of axis0, axis1 and axis3.
    dims: [usize; 3],
    n_wavelengths: usize,
    data: &'a mut [f32],
}

impl GridSliceMut<'_> {
    /// Index of the slice along axis2.
    pub fn index2(&self) -> usize { self.i2 }

    /// Returns the angle at `index` of an axis of the grid.
    pub fn angle(&self, axis: usize, index: usize) -> f32 { self.angles[axis][index] }

    /// Returns the number of angles of an axis of the grid.
    pub fn n_angles(&self, axis: usize) -> usize { self.angles[axis].len() }

    /// Returns the spectrum of the cell (i0, i1, index2, i3) for modification.
    pub fn spectrum_mut(&mut self, i0: usize, i1: usize, i3: usize) -> &mut [f32] {
        let [n0, n1, n3] = self.dims;
        assert!(i0 < n0 && i1 < n1 && i3 < n3, "Index out of the grid slice");
        let offset = ((i0 * n1 + i1) * n3 + i3) * self.n_wavelengths;
        &mut self.data[offset..offset + self.n_wavelengths]
    }

    /// Sets the spectrum of the cell (i0, i1, index2, i3).
    pub fn set_spectrum(&mut self, i0: usize, i1: usize, i3: usize, spectrum: &[f32]) {
        assert_eq!(spectrum.len(), self.n_wavelengths, "Spectrum length mismatch");
        self.spectrum_mut(i0, i1, i3).copy_from_slice(spectrum);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::linspace;

    fn deg(values: &[f32]) -> Vec<f32> { values.iter().map(|v| v.to_radians()).collect() }

    #[test]
    fn construction_is_zero_filled() {
        let grid = SampleGrid::new(2, 3, 4, 5, ColorModel::Rgb, 0);
        assert_eq!(grid.shape(), [2, 3, 4, 5]);
        assert_eq!(grid.n_samples(), 120);
        assert_eq!(grid.n_wavelengths(), 3);
        assert!(grid.spectra().all(|s| s == [0.0, 0.0, 0.0]));
        assert!(!grid.is_isotropic());

        let grid = SampleGrid::new(1, 1, 1, 1, ColorModel::Monochromatic, 8);
        assert_eq!(grid.n_wavelengths(), 1);
        assert!(grid.is_isotropic());

        let grid = SampleGrid::new(1, 1, 2, 1, ColorModel::Spectral, 8);
        assert_eq!(grid.n_wavelengths(), 8);
        assert_eq!(grid.spectrum(0, 0, 1, 0).len(), 8);
    }

    #[test]
    #[should_panic]
    fn zero_sized_axis_is_rejected() { let _ = SampleGrid::new(1, 0, 1, 1, ColorModel::Rgb, 3); }

    #[test]
    #[should_panic]
    fn zero_wavelengths_are_rejected() {
        let _ = SampleGrid::new(1, 1, 1, 1, ColorModel::Spectral, 0);
    }

    #[test]
    #[should_panic]
    fn out_of_range_index_panics() {
        let grid = SampleGrid::new(2, 1, 2, 2, ColorModel::Rgb, 3);
        let _ = grid.spectrum(0, 1, 0, 0);
    }

    #[test]
    fn cells_are_independent() {
        let mut grid = SampleGrid::new(2, 2, 3, 4, ColorModel::Rgb, 3);
        let indices = grid.indices().collect::<Vec<_>>();
        assert_eq!(indices.len(), grid.n_samples());
        for (n, idx) in indices.iter().enumerate() {
            grid[*idx].fill(n as f32);
        }
        for (n, idx) in indices.iter().enumerate() {
            assert_eq!(grid[*idx], [n as f32; 3]);
        }
        grid.set_spectrum(1, 1, 2, 3, &[1.0, 2.0, 3.0]);
        assert_eq!(grid.spectrum(1, 1, 2, 3), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn resize_discards_spectra() {
        let mut grid = SampleGrid::new(2, 1, 2, 2, ColorModel::Rgb, 3);
        grid.spectra_mut().for_each(|s| s.fill(1.0));
        grid.resize_angles(3, 1, 3, 3);
        assert_eq!(grid.spectra().count(), 0);
        grid.resize_wavelengths(5);
        assert_eq!(grid.n_wavelengths(), 5);
        assert_eq!(grid.spectra().count(), 27);
        assert!(grid.spectra().all(|s| s.iter().all(|v| *v == 0.0)));
    }

    #[test]
    fn validate_reports_non_finite_values() {
        let mut grid = SampleGrid::new(2, 1, 3, 2, ColorModel::Rgb, 3);
        assert!(grid.validate());
        assert!(grid.defects().is_empty());

        grid.spectrum_mut(1, 0, 2, 1)[1] = f32::NAN;
        grid.spectrum_mut(0, 0, 1, 0)[0] = f32::NEG_INFINITY;
        grid.set_angle(3, 1, f32::INFINITY);
        grid.set_wavelength(2, f32::NAN);
        assert!(!grid.validate());

        let defects = grid.defects();
        assert_eq!(defects.len(), 4);
        assert!(defects.contains(&Defect::Spectrum {
            index: [1, 0, 2, 1],
            kind: NonFinite::NaN
        }));
        assert!(defects.contains(&Defect::Spectrum {
            index: [0, 0, 1, 0],
            kind: NonFinite::Infinite
        }));
        assert!(defects.contains(&Defect::Angle {
            axis: 3,
            index: 1,
            kind: NonFinite::Infinite
        }));
        assert!(defects.contains(&Defect::Wavelength {
            index: 2,
            kind: NonFinite::NaN
        }));
        // Diagnostic only.
        assert!(grid.spectrum(1, 0, 2, 1)[1].is_nan());
    }

    #[test]
    fn one_sidedness() {
        assert!(is_one_sided(&deg(&[0.0, 30.0, 90.0, 170.0])));
        assert!(is_one_sided(&deg(&[10.0, 170.0])));
        assert!(!is_one_sided(&deg(&[10.0, 90.0, 170.0, 190.0, 270.0, 350.0])));
        assert!(is_one_sided(&deg(&[0.0, 180.0])));
        assert!(is_one_sided(&deg(&[0.0, 180.0, 360.0])));
        assert!(is_one_sided(&deg(&[200.0, 300.0])));

        let mut grid = SampleGrid::new(1, 1, 1, 5, ColorModel::Rgb, 3);
        grid.set_angles(3, &deg(&[0.0, 40.0, 80.0, 120.0, 170.0]));
        grid.update_angle_attributes();
        assert!(grid.is_one_side());
        grid.set_angles(3, &deg(&[10.0, 90.0, 170.0, 190.0, 350.0]));
        grid.update_angle_attributes();
        assert!(!grid.is_one_side());
    }

    #[test]
    fn equal_interval_attributes() {
        let grid = SampleGrid::with_axes(
            [
                linspace(10, 0.0, PI * 0.5),
                vec![0.0],
                vec![0.0, 0.1, 0.5],
                linspace(73, 0.0, PI * 2.0),
            ],
            ColorModel::Monochromatic,
            vec![0.0],
        );
        assert!(grid.is_equal_interval(0));
        assert!(!grid.is_equal_interval(1));
        assert!(!grid.is_equal_interval(2));
        assert!(grid.is_equal_interval(3));
        assert!(!grid.is_one_side());
    }

    #[test]
    fn parallel_slices_cover_the_grid() {
        let mut grid = SampleGrid::new(3, 2, 5, 4, ColorModel::Rgb, 3);
        grid.set_angles(2, &[0.0, 1.0, 2.0, 3.0, 4.0]);
        grid.par_slices_mut().for_each(|mut slice| {
            let value = slice.angle(2, slice.index2());
            for i0 in 0..slice.n_angles(0) {
                for i1 in 0..slice.n_angles(1) {
                    for i3 in 0..slice.n_angles(3) {
                        slice.set_spectrum(i0, i1, i3, &[value, i0 as f32, i3 as f32]);
                    }
                }
            }
        });
        for [i0, i1, i2, i3] in grid.indices().collect::<Vec<_>>() {
            assert_eq!(
                grid.spectrum(i0, i1, i2, i3),
                &[i2 as f32, i0 as f32, i3 as f32]
            );
        }
    }
}
