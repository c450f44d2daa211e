//! Tabulates a reflectance model and writes it to a DDR file.

mod config;

use base::{
    cli::{self, CommonArgs},
    error::Error,
    grid::Spectrum,
    math::Vec3,
    ColorModel, DataType,
};
use bxdf::{
    arrange::ArrangeOptions,
    brdf::{Brdf, GenericBrdf},
    btdf::Btdf,
    ddr::{self, DdrOptions},
    model::{LambertianBrdf, ModelSampler, SpectrumSampler},
};
use config::ExportConfig;
use std::{path::PathBuf, sync::Arc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, launch_time) = cli::parse_args::<CliArgs>();

    args.common.init_logging(launch_time, &[]);
    log::info!("{}", cli::launch_message("tabsdf-ddr", launch_time));

    let config = match &args.config {
        Some(path) => ExportConfig::load(path)?,
        None => ExportConfig::default(),
    };

    run(args, config).map_err(|err| err.into())
}

/// Reflectance models that can be tabulated.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// Lambertian reflectance.
    #[clap(name = "lambert")]
    Lambert,
}

/// Arguments of the `tabsdf-ddr` command.
#[derive(clap::Parser, Debug, Clone)]
#[clap(
    author,
    version,
    about = "Tabulates a reflectance model and exports it to a DDR file."
)]
pub struct CliArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[clap(short, long, help = "Path of the DDR file to write.")]
    pub output: PathBuf,

    #[clap(
        short,
        long,
        value_enum,
        default_value_t = ModelKind::Lambert,
        help = "Reflectance model to tabulate."
    )]
    pub model: ModelKind,

    #[clap(
        long,
        num_args = 3,
        value_names = ["R", "G", "B"],
        default_values_t = [0.5f32, 0.5, 0.5],
        help = "RGB reflectance of the model."
    )]
    pub reflectance: Vec<f32>,

    #[clap(
        long,
        value_enum,
        default_value_t = ColorModel::Rgb,
        help = "Color model of the tabulated data."
    )]
    pub color_model: ColorModel,

    #[clap(
        long,
        value_enum,
        default_value_t = DataType::Brdf,
        help = "Whether the data is reflectance or transmittance."
    )]
    pub data_type: DataType,

    #[clap(long, help = "Sample the incoming azimuth even for isotropic models.")]
    pub anisotropic: bool,

    #[clap(long, allow_negative_numbers = true, help = "Largest value of a channel.")]
    pub max_value: Option<f32>,

    #[clap(
        long,
        allow_negative_numbers = true,
        help = "Largest directional albedo of a channel."
    )]
    pub max_reflectance: Option<f32>,

    #[clap(long, help = "Comment written in the header of the file.")]
    pub comment: Option<String>,

    #[clap(short, long, help = "Path of a TOML configuration file.")]
    pub config: Option<PathBuf>,
}

/// Reports a sampler as anisotropic, so that the incoming azimuth gets
/// tabulated.
struct Anisotropic<S>(S);

impl<S: SpectrumSampler> SpectrumSampler for Anisotropic<S> {
    fn color_model(&self) -> ColorModel { self.0.color_model() }

    fn wavelengths(&self) -> &[f32] { self.0.wavelengths() }

    fn is_isotropic(&self) -> bool { false }

    fn spectrum(&self, in_dir: &Vec3, out_dir: &Vec3) -> Spectrum { self.0.spectrum(in_dir, out_dir) }
}

fn run(args: CliArgs, config: ExportConfig) -> Result<(), Error> {
    let max_value = args.max_value.or(config.max_value).unwrap_or(f32::MAX);
    let options = DdrOptions {
        comment: args.comment.or(config.comment),
        source: config.source,
        arrange: ArrangeOptions {
            max_value,
            max_reflectance: args
                .max_reflectance
                .or(config.max_reflectance)
                .unwrap_or(1.0),
        },
    };
    options.arrange.validate()?;

    let model = match args.model {
        ModelKind::Lambert => LambertianBrdf {
            reflectance: Vec3::from_slice(&args.reflectance),
        },
    };
    let sampler = ModelSampler::new(model, args.color_model, args.data_type, max_value)?;
    let sampler: Arc<dyn SpectrumSampler> = if args.anisotropic {
        Arc::new(Anisotropic(sampler))
    } else {
        Arc::new(sampler)
    };
    let brdf = Brdf::Generic(GenericBrdf::new(sampler));

    log::info!(
        "Exporting {} {} to {}",
        args.color_model,
        args.data_type,
        args.output.display()
    );
    match args.data_type {
        DataType::Brdf => ddr::write_ddr(&args.output, &brdf, &options),
        DataType::Btdf => ddr::write_ddr_btdf(&args.output, &Btdf::from(brdf), &options),
    }
}
