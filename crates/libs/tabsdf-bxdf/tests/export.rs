use base::{grid::SampleGrid, ColorModel, DataType, SourceType};
use std::{f32::consts::PI, path::PathBuf, sync::Arc};
use tabsdf_bxdf::{
    arrange::{arrange, ArrangeOptions},
    brdf::{Brdf, GenericBrdf, SpecularCoordsBrdf},
    btdf::Btdf,
    ddr::{write_ddr, write_ddr_btdf, write_ddr_to, DdrOptions},
    model::{LambertianBrdf, ModelSampler},
};

fn deg(values: &[f32]) -> Vec<f32> { values.iter().map(|v| v.to_radians()).collect() }

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("tabsdf-export-{}-{}.ddr", name, std::process::id()))
}

fn stored_value(i2: usize, i3: usize, channel: usize) -> f32 {
    if i2 == 0 {
        0.1 + 0.02 * channel as f32
    } else {
        0.05 * (i2 + i3) as f32 + 0.01 * channel as f32
    }
}

fn in_plane_brdf() -> SpecularCoordsBrdf {
    let mut samples = SampleGrid::with_axes(
        [vec![0.0], vec![0.0], deg(&[0.0, 45.0, 90.0]), deg(&[0.0, 180.0])],
        ColorModel::Rgb,
        vec![0.0; 3],
    );
    for ([_, _, i2, i3], s) in samples.indexed_spectra_mut() {
        for (c, v) in s.iter_mut().enumerate() {
            *v = stored_value(i2, i3, c);
        }
    }
    SpecularCoordsBrdf::from_samples(samples, SourceType::Measured)
}

/// Splits the channel blocks of a DDR file into their label and values.
fn channel_blocks(text: &str) -> Vec<(String, Vec<Vec<f32>>)> {
    let mut blocks = Vec::new();
    let mut lines = text.lines().peekable();
    while let Some(line) = lines.next() {
        if lines.peek() != Some(&" kbdf") {
            continue;
        }
        let label = line.to_string();
        let mut rows = Vec::new();
        for row in lines.by_ref().skip(3) {
            if row == " enddef" {
                break;
            }
            if row.starts_with(";;") {
                continue;
            }
            rows.push(row.split_whitespace().map(|v| v.parse().unwrap()).collect());
        }
        blocks.push((label, rows));
    }
    blocks
}

#[test]
fn in_plane_rgb_export() {
    let path = temp_path("in-plane");
    write_ddr(&path, &Brdf::Specular(in_plane_brdf()), &DdrOptions::default()).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let lines: Vec<&str> = text.lines().collect();
    assert!(lines.contains(&"Source Measured"));
    assert!(lines.contains(&"TypeSym ASymmetrical"));
    assert!(lines.contains(&"TypeColorModel RGB"));
    assert!(!text.contains("psi"));
    let sigma = lines.iter().position(|l| *l == "sigma 10").unwrap();
    assert_eq!(lines[sigma + 1], " 0 10 20 30 40 50 60 70 80 90");
    let phi = lines.iter().position(|l| *l == "phi 2").unwrap();
    assert_eq!(lines[phi + 1], " 0 180");
    let theta = lines.iter().position(|l| *l == "theta 3").unwrap();
    assert_eq!(lines[theta + 1], " 0 45 90");

    let blocks = channel_blocks(&text);
    let labels: Vec<&str> = blocks.iter().map(|(l, _)| l.as_str()).collect();
    assert_eq!(labels, ["red", "green", "blue"]);
    for (channel, (_, rows)) in blocks.iter().enumerate() {
        assert_eq!(rows.len(), 10 * 2);
        assert_eq!(rows.iter().map(Vec::len).sum::<usize>(), 10 * 1 * 3 * 2);
        for (r, row) in rows.iter().enumerate() {
            let i3 = r % 2;
            for (i2, v) in row.iter().enumerate() {
                let expected = stored_value(i2, i3, channel) * PI;
                approx::assert_relative_eq!(*v, expected, max_relative = 1e-5);
            }
        }
    }
}

#[test]
fn written_file_matches_the_arranged_grid() {
    let options = DdrOptions {
        comment: Some("in-plane".to_string()),
        source: Some(SourceType::Edited),
        arrange: ArrangeOptions::default(),
    };
    let path = temp_path("arranged");
    write_ddr(&path, &Brdf::Specular(in_plane_brdf()), &options).unwrap();
    let written = std::fs::read(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let arranged = arrange(&in_plane_brdf(), DataType::Brdf, &options.arrange);
    let mut expected = Vec::new();
    write_ddr_to(&mut expected, &arranged, &options).unwrap();
    assert_eq!(written, expected);
    assert!(String::from_utf8(written).unwrap().contains("\nSource Edited\n"));
}

#[test]
fn lambertian_btdf_export() {
    let sampler = ModelSampler::new(
        LambertianBrdf {
            reflectance: base::math::Vec3::splat(0.5),
        },
        ColorModel::Monochromatic,
        DataType::Btdf,
        1.0,
    )
    .unwrap();
    let btdf = Btdf::new(Arc::new(Brdf::Generic(GenericBrdf::new(Arc::new(sampler)))));
    let path = temp_path("btdf");
    write_ddr_btdf(&path, &btdf, &DdrOptions::default()).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert!(text.contains("Source Generated\n"));
    assert!(text.contains("TypeColorModel BW\n"));
    assert!(text.contains("sigma 19\n"));
    assert!(text.contains("phi 73\n"));
    assert!(text.contains("theta 91\n"));

    let blocks = channel_blocks(&text);
    assert_eq!(blocks.len(), 1);
    let rows = &blocks[0].1;
    assert_eq!(rows.len(), 19 * 73);
    // Grazing incidence is dark, the rest is 0.5 / π * π.
    for row in &rows[18 * 73..] {
        assert!(row.iter().all(|v| *v == 0.0));
    }
    for v in rows[0].iter() {
        approx::assert_relative_eq!(*v, 0.5, max_relative = 1e-5);
    }
}
