//! Export to the DDR tabular text format.
//!
//! A DDR file stores a BRDF in specular offset coordinates, one block of
//! values per channel. Angles are written in degrees and values are
//! multiplied by π.

use crate::{
    arrange::{arrange, ArrangeOptions},
    brdf::{Brdf, SpecularCoordsBrdf},
    btdf::Btdf,
    convert::to_specular_coords,
};
use base::{
    color::xyz_to_srgb,
    error::Error,
    math::Vec3,
    ColorModel, DataType, SourceType, VERSION,
};
use std::{
    f32::consts::PI,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

/// Options of the DDR export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DdrOptions {
    /// Free text written in the header.
    pub comment: Option<String>,
    /// Origin of the data written in the header, replacing the one of the
    /// BRDF.
    pub source: Option<SourceType>,
    /// Options of the arrangement preceding the export.
    pub arrange: ArrangeOptions,
}

/// Exports a BRDF to a DDR file.
///
/// The BRDF is validated, converted to specular offset coordinates and
/// arranged before being written. Nothing is left at `path` on failure.
pub fn write_ddr<P: AsRef<Path>>(path: P, brdf: &Brdf, options: &DdrOptions) -> Result<(), Error> {
    write_file(path.as_ref(), brdf, DataType::Brdf, options)
}

/// Exports a BTDF to a DDR file.
///
/// Same as [`write_ddr`], except that the samples at grazing incidence are
/// zeroed.
pub fn write_ddr_btdf<P: AsRef<Path>>(path: P, btdf: &Btdf, options: &DdrOptions) -> Result<(), Error> {
    write_file(path.as_ref(), btdf.brdf(), DataType::Btdf, options)
}

fn write_file(path: &Path, brdf: &Brdf, data_type: DataType, options: &DdrOptions) -> Result<(), Error> {
    options.arrange.validate()?;
    if !brdf.validate() {
        log::error!("[write_ddr] Invalid samples, nothing written to {}", path.display());
        return Err(Error::InvalidSamples);
    }
    let specular = to_specular_coords(brdf);
    if let Brdf::Generic(_) = brdf {
        if !specular.samples().validate() {
            log::error!("[write_ddr] The sampled BRDF contains non-finite values");
            return Err(Error::InvalidSamples);
        }
    }
    let arranged = arrange(&specular, data_type, &options.arrange);

    let mut content = Vec::new();
    write_ddr_to(&mut content, &arranged, options).map_err(|err| Error::io(path, err))?;

    let file = File::create(path).map_err(|err| {
        log::error!("[write_ddr] Could not open: {}", path.display());
        Error::io(path, err)
    })?;
    let mut writer = BufWriter::new(file);
    if let Err(err) = writer.write_all(&content).and_then(|_| writer.flush()) {
        drop(writer);
        if let Err(rm_err) = std::fs::remove_file(path) {
            log::warn!(
                "[write_ddr] Could not remove the partial file {}: {}",
                path.display(),
                rm_err
            );
        }
        return Err(Error::io(path, err));
    }
    log::info!("[write_ddr] {} written to {}", data_type, path.display());
    Ok(())
}

/// Formats a number the way `printf("%g")` does with `precision` significant
/// digits.
pub fn format_g(value: f64, precision: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let precision = precision.max(1);
    let sci = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= precision as i32 {
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            if exponent < 0 { '-' } else { '+' },
            exponent.abs()
        )
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

fn g(value: f32) -> String { format_g(value as f64, 6) }

fn write_degrees<W: Write>(writer: &mut W, angles: &[f32]) -> std::io::Result<()> {
    for angle in angles {
        write!(writer, " {}", g(angle.to_degrees()))?;
    }
    writeln!(writer)
}

/// Writes an arranged BRDF in the DDR format.
///
/// XYZ data is converted to linear sRGB; every written value is bounded to
/// `[0, options.arrange.max_value]` before being multiplied by π.
pub fn write_ddr_to<W: Write>(
    writer: &mut W,
    brdf: &SpecularCoordsBrdf,
    options: &DdrOptions,
) -> std::io::Result<()> {
    let samples = brdf.samples();
    let [n_theta_i, n_phi_i, n_theta_s, n_phi_s] = samples.shape();
    let n_wavelengths = samples.n_wavelengths();

    writeln!(writer, ";; This file is generated by tabsdf-{}.", VERSION)?;
    if let Some(comment) = &options.comment {
        for line in comment.lines() {
            writeln!(writer, ";; {}", line)?;
        }
    }
    writeln!(writer)?;

    writeln!(
        writer,
        "Source {}",
        options.source.unwrap_or(brdf.source_type())
    )?;
    if samples.is_isotropic() {
        writeln!(writer, "TypeSym ASymmetrical")?;
    } else {
        writeln!(writer, "TypeSym ASymmetrical 4D")?;
    }

    let color_model = match samples.color_model() {
        _ if n_wavelengths == 1 => ColorModel::Monochromatic,
        ColorModel::Rgb | ColorModel::Xyz => ColorModel::Rgb,
        _ => ColorModel::Spectral,
    };
    match color_model {
        ColorModel::Monochromatic => writeln!(writer, "TypeColorModel BW")?,
        ColorModel::Rgb => writeln!(writer, "TypeColorModel RGB")?,
        _ => writeln!(writer, "TypeColorModel spectral {}", n_wavelengths)?,
    }
    writeln!(writer, "TypeData Luminance Absolute")?;

    if !samples.is_isotropic() {
        writeln!(writer, "psi {}", n_phi_i)?;
        write_degrees(writer, samples.angles(1))?;
    }

    writeln!(writer, "sigma {}", n_theta_i)?;
    write_degrees(writer, samples.angles(0))?;

    let offsets = brdf.specular_offsets();
    if offsets.len() == n_theta_i {
        writeln!(writer, "sigmat")?;
        let corrected: Vec<f32> = samples
            .angles(0)
            .iter()
            .zip(offsets)
            .map(|(theta, offset)| theta + offset)
            .collect();
        write_degrees(writer, &corrected)?;
    }

    writeln!(writer, "phi {}", n_phi_s)?;
    write_degrees(writer, samples.angles(3))?;

    writeln!(writer, "theta {}", n_theta_s)?;
    write_degrees(writer, samples.angles(2))?;

    let is_xyz = samples.color_model() == ColorModel::Xyz;
    let max_value = options.arrange.max_value;
    for channel in 0..n_wavelengths {
        match color_model {
            ColorModel::Monochromatic => writeln!(writer, "bw")?,
            ColorModel::Rgb => writeln!(writer, "{}", ["red", "green", "blue"][channel.min(2)])?,
            _ => writeln!(writer, "wl {}", g(samples.wavelength(channel)))?,
        }

        writeln!(writer, " kbdf")?;
        write!(writer, " ")?;
        for _ in 0..n_theta_i {
            write!(writer, " 1.0")?;
        }
        writeln!(writer)?;
        writeln!(writer, " def")?;

        for i1 in 0..n_phi_i {
            writeln!(writer, ";; Psi = {}", g(samples.angle(1, i1).to_degrees()))?;
            for i0 in 0..n_theta_i {
                writeln!(writer, ";; Sigma = {}", g(samples.angle(0, i0).to_degrees()))?;
                for i3 in 0..n_phi_s {
                    for i2 in 0..n_theta_s {
                        let spectrum = samples.spectrum(i0, i1, i2, i3);
                        let value = if is_xyz {
                            xyz_to_srgb(Vec3::from_slice(spectrum))[channel]
                        } else {
                            spectrum[channel]
                        };
                        write!(writer, " {}", g(value.max(0.0).min(max_value) * PI))?;
                    }
                    writeln!(writer)?;
                }
            }
        }

        writeln!(writer, " enddef")?;
    }

    Ok(())
}
