//
// morphology_workflows.rs
// pxtools
//
// Integration-style tests driving the morphology and cylinder tools through the library API and the CLI entry point.
//
// Thales Matheus Mendonça Santos - November 2025

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use ndarray::{Ix2, Ix3};
use pxtools::cylinder::{self, CylinderParameters};
use pxtools::imageio::{ImageIo, RawImage};
use pxtools::morphology::{self, dispatch, RawParameters};
use pxtools::toolkit::{Geometry, Samples};
use pxtools::{run_from, ToolError};
use tempfile::{tempdir, TempDir};

fn write_image(dir: &TempDir, name: &str, size: &[usize], samples: Samples) -> PathBuf {
    // Small MetaImage volumes with identity geometry unless a test overrides it.
    let path = dir.path().join(name);
    let image = RawImage {
        size: size.to_vec(),
        geometry: Geometry::identity(size.len()),
        components: 1,
        samples,
    };
    ImageIo::with_default_formats()
        .write_raw(&image, &path, false)
        .expect("write fixture");
    path
}

/// 7x7x7 volume of 100 with a single 0 in the middle.
fn build_scan(dir: &TempDir) -> PathBuf {
    let mut voxels = vec![100u8; 343];
    voxels[3 * 49 + 3 * 7 + 3] = 0;
    write_image(dir, "scan.mhd", &[7, 7, 7], Samples::U8(voxels))
}

fn args(parts: &[&str], input: &Path) -> Vec<OsString> {
    let mut out: Vec<OsString> = vec!["pxtools".into(), "morphology".into(), "-in".into()];
    out.push(input.as_os_str().to_owned());
    out.extend(parts.iter().map(OsString::from));
    out
}

/// Runs the built binary inside `dir`, where synthesized output names land.
fn run_in(dir: &TempDir, parts: &[&str], input: &Path) -> i32 {
    Command::new(env!("CARGO_BIN_EXE_pxtools"))
        .args(args(parts, input).into_iter().skip(1))
        .current_dir(dir.path())
        .status()
        .expect("spawn pxtools")
        .code()
        .unwrap_or(-1)
}

fn params(input: &Path, op: &str, radius: &[i64]) -> RawParameters {
    RawParameters {
        input: Some(input.to_path_buf()),
        operation: Some(op.to_string()),
        radius: Some(radius.to_vec()),
        ..RawParameters::default()
    }
}

#[test]
fn erosion_uses_the_type_maximum_outside_the_image() {
    let dir = tempdir().expect("tempdir");
    let input = build_scan(&dir);

    let code = run_in(&dir, &["-op", "erosion", "-r", "2"], &input);
    assert_eq!(code, 0);

    let output = dir.path().join("scan_erosion_grayscale.mhd");
    assert!(output.exists());
    let eroded = ImageIo::with_default_formats()
        .read::<u8, Ix3>(&output)
        .expect("read output");
    let data = eroded.data();
    assert_eq!(data[[3, 3, 3]], 0);
    assert_eq!(data[[3, 3, 1]], 0);
    assert_eq!(data[[3, 1, 3]], 0);
    assert_eq!(data[[3, 3, 0]], 100);
    assert_eq!(data[[1, 1, 3]], 100);
    // A darker outside would have eaten the border.
    assert_eq!(data[[0, 0, 0]], 100);
    assert_eq!(data[[6, 6, 6]], 100);
}

#[test]
fn explicit_output_path_wins() {
    let dir = tempdir().expect("tempdir");
    let input = build_scan(&dir);
    let output = dir.path().join("custom.mha");

    let mut raw = params(&input, "Dilation", &[1]);
    raw.output = Some(output.clone());
    raw.compress = true;
    let written = morphology::run(raw, &ImageIo::with_default_formats()).expect("dilation");

    assert_eq!(written, output);
    assert!(output.exists());
    assert!(!Path::new("scan_dilation_grayscale.mhd").exists());
}

#[test]
fn out_of_range_algorithm_fails_without_writing() {
    let dir = tempdir().expect("tempdir");
    let input = build_scan(&dir);

    let code = run_in(&dir, &["-op", "gradient", "-r", "1", "-a", "5"], &input);
    assert_eq!(code, 1);
    assert!(!dir.path().join("scan_gradient_grayscale.mhd").exists());

    let mut raw = params(&input, "gradient", &[1]);
    raw.algorithm = Some(-1);
    let err = morphology::run(raw, &ImageIo::with_default_formats()).unwrap_err();
    assert!(matches!(err, ToolError::InvalidAlgorithm(-1)));
}

#[test]
fn binary_values_need_a_pair() {
    let dir = tempdir().expect("tempdir");
    let input = build_scan(&dir);

    let code = run_from(args(
        &["-op", "dilation", "-type", "binary", "-r", "1", "-bin", "255"],
        &input,
    ));
    assert_eq!(code, 1);

    let mut raw = params(&input, "dilation", &[1]);
    raw.element_class = Some("binary".to_string());
    raw.binary_values = Some(vec!["255".to_string()]);
    let err = morphology::run(raw, &ImageIo::with_default_formats()).unwrap_err();
    assert!(matches!(err, ToolError::InvalidBinaryValues(1)));
}

#[test]
fn four_dimensional_input_is_unsupported() {
    let dir = tempdir().expect("tempdir");
    let input = write_image(&dir, "series.mhd", &[2, 2, 2, 2], Samples::U8(vec![1; 16]));

    let err = morphology::run(params(&input, "erosion", &[1]), &ImageIo::with_default_formats())
        .unwrap_err();
    match &err {
        ToolError::UnsupportedDimensionOrType {
            component_type,
            dimension,
        } => {
            assert_eq!(*dimension, 4);
            assert_eq!(component_type, "unsigned char");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.to_string().contains("dimension = 4"));
    assert_eq!(run_from(args(&["-op", "erosion", "-r", "1"], &input)), 1);
}

#[test]
fn radius_count_is_checked_against_the_image_dimension() {
    let dir = tempdir().expect("tempdir");
    let input = build_scan(&dir);
    let io = ImageIo::with_default_formats();

    let err = morphology::run(params(&input, "erosion", &[1, 2]), &io).unwrap_err();
    assert!(matches!(err, ToolError::InvalidRadius(_)));
    let err = morphology::run(params(&input, "erosion", &[1, 0, 1]), &io).unwrap_err();
    assert!(matches!(err, ToolError::InvalidRadius(_)));
    assert_eq!(run_from(args(&["-op", "erosion", "-r", "-2"], &input)), 1);
}

#[test]
fn unreadable_input_stops_at_the_probe() {
    let dir = tempdir().expect("tempdir");
    let missing = dir.path().join("missing.mhd");

    let err = morphology::run(params(&missing, "erosion", &[1]), &ImageIo::with_default_formats())
        .unwrap_err();
    assert!(matches!(err, ToolError::ImageProbe { .. }));
}

#[test]
fn corrupt_headers_fail_instead_of_allocating() {
    let dir = tempdir().expect("tempdir");
    let io = ImageIo::with_default_formats();

    let overflowing = dir.path().join("overflow.mha");
    std::fs::write(
        &overflowing,
        "NDims = 3\nDimSize = 4294967296 4294967296 4294967296\nElementType = MET_UCHAR\nElementDataFile = LOCAL\n",
    )
    .expect("header");
    let err = morphology::run(params(&overflowing, "erosion", &[1]), &io).unwrap_err();
    assert!(matches!(err, ToolError::ImageProbe { .. }));

    let mut packed = ZlibEncoder::new(Vec::new(), Compression::default());
    packed.write_all(&[7u8; 16]).expect("deflate");
    let payload = packed.finish().expect("deflate");
    let huge = dir.path().join("huge.mha");
    let mut contents = b"NDims = 3\nDimSize = 1000000 1000000 1000000\nCompressedData = True\nElementType = MET_UCHAR\nElementDataFile = LOCAL\n".to_vec();
    contents.extend_from_slice(&payload);
    std::fs::write(&huge, contents).expect("header");

    let err = morphology::run(params(&huge, "erosion", &[1]), &io).unwrap_err();
    assert!(matches!(err, ToolError::ToolkitExecutionFailure(_)));
    assert_eq!(run_from(args(&["-op", "erosion", "-r", "1"], &huge)), 1);
}

#[test]
fn vector_images_are_rejected() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("rgb.mhd");
    let image = RawImage {
        size: vec![2, 2],
        geometry: Geometry::identity(2),
        components: 3,
        samples: Samples::U8(vec![0; 12]),
    };
    ImageIo::with_default_formats()
        .write_raw(&image, &path, false)
        .expect("write fixture");

    let err = morphology::run(params(&path, "erosion", &[1]), &ImageIo::with_default_formats())
        .unwrap_err();
    assert!(matches!(err, ToolError::UnsupportedImageKind(3)));
}

#[test]
fn boundary_that_does_not_fit_the_pixel_type_fails_before_reading() {
    let dir = tempdir().expect("tempdir");
    let input = build_scan(&dir);

    let mut raw = params(&input, "erosion", &[1]);
    raw.boundary = Some("1000".to_string());
    let err = morphology::run(raw, &ImageIo::with_default_formats()).unwrap_err();
    assert!(matches!(err, ToolError::InvalidOption { option: "bc", .. }));
    assert!(!Path::new("scan_erosion_grayscale.mhd").exists());
}

#[test]
fn float_override_has_no_compiled_path() {
    let dir = tempdir().expect("tempdir");
    let input = build_scan(&dir);

    let mut raw = params(&input, "erosion", &[1]);
    raw.component_type = Some("float".to_string());
    let err = morphology::run(raw, &ImageIo::with_default_formats()).unwrap_err();
    assert!(matches!(
        err,
        ToolError::UnsupportedDimensionOrType { dimension: 3, .. }
    ));
}

#[test]
fn every_operation_and_class_runs_for_every_supported_type() {
    let dir = tempdir().expect("tempdir");
    let planar = write_image(
        &dir,
        "planar.mhd",
        &[5, 4],
        Samples::U8((0..20).map(|v| (v % 3) as u8).collect()),
    );
    let volume = write_image(
        &dir,
        "volume.mhd",
        &[3, 3, 3],
        Samples::U8((0..27).map(|v| (v % 2) as u8).collect()),
    );
    let io = ImageIo::with_default_formats();

    for (input, dimension) in [(&planar, 2usize), (&volume, 3)] {
        for component in ["unsigned_char", "char", "unsigned_short", "short"] {
            assert!(dispatch::is_supported(dimension, component));
            for op in ["erosion", "dilation", "opening", "closing", "gradient"] {
                for class in ["grayscale", "binary", "parabolic"] {
                    let output = dir
                        .path()
                        .join(format!("{dimension}_{component}_{op}_{class}.mhd"));
                    let mut raw = params(input, op, &[1]);
                    raw.element_class = Some(class.to_string());
                    raw.component_type = Some(component.to_string());
                    raw.output = Some(output.clone());

                    morphology::run(raw, &io).unwrap_or_else(|e| {
                        panic!("{dimension}D {component} {op} {class}: {e}")
                    });
                    let descriptor = io.probe(&output).expect("probe output");
                    assert_eq!(descriptor.component_type, component);
                    assert_eq!(descriptor.dimension, dimension);
                }
            }
        }
    }
}

#[test]
fn binary_dilation_grows_a_single_label_into_the_ball() {
    let dir = tempdir().expect("tempdir");
    let mut pixels = vec![0u8; 49];
    pixels[3 * 7 + 3] = 1;
    let input = write_image(&dir, "dot.mhd", &[7, 7], Samples::U8(pixels));

    let code = run_in(&dir, &["-op", "dilation", "-type", "binary", "-r", "1"], &input);
    assert_eq!(code, 0);

    let dilated = ImageIo::with_default_formats()
        .read::<u8, Ix2>(&dir.path().join("dot_dilation_binary.mhd"))
        .expect("read output");
    assert_eq!(dilated.data().iter().filter(|&&v| v == 1).count(), 9);
    assert_eq!(dilated.data()[[2, 2]], 1);
    assert_eq!(dilated.data()[[1, 3]], 0);
}

#[test]
fn cylinder_mask_is_a_disc_in_2d() {
    let dir = tempdir().expect("tempdir");
    let reference = write_image(&dir, "plane.mhd", &[9, 9], Samples::I16(vec![0; 81]));
    let output = dir.path().join("disc.mhd");

    let written = cylinder::run(
        CylinderParameters {
            input: Some(reference),
            output: Some(output.clone()),
            center: Some(vec![4, 4]),
            radius: Some(2.0),
            compress: false,
        },
        &ImageIo::with_default_formats(),
    )
    .expect("cylinder");
    assert_eq!(written, output);

    let mask = ImageIo::with_default_formats()
        .read::<u8, Ix2>(&output)
        .expect("read mask");
    assert_eq!(mask.data().iter().map(|&v| v as usize).sum::<usize>(), 13);
    assert_eq!(mask.data()[[4, 6]], 1);
    assert_eq!(mask.data()[[5, 6]], 0);
    assert_eq!(
        io_component(&output),
        "unsigned_char",
        "mask is always unsigned char"
    );
}

fn io_component(path: &Path) -> String {
    ImageIo::with_default_formats()
        .probe(path)
        .expect("probe")
        .component_type
}

#[test]
fn cylinder_extends_along_the_last_axis() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("grid.mhd");
    let reference = RawImage {
        size: vec![5, 5, 3],
        geometry: Geometry {
            spacing: vec![1.0, 1.0, 2.0],
            origin: vec![-2.0, -2.0, 0.0],
            direction: Geometry::identity(3).direction,
        },
        components: 1,
        samples: Samples::U8(vec![0; 75]),
    };
    ImageIo::with_default_formats()
        .write_raw(&reference, &path, false)
        .expect("write reference");
    let output = dir.path().join("cylinder.mha");

    let code = run_from([
        OsString::from("pxtools"),
        "create-cylinder".into(),
        "-in".into(),
        path.into_os_string(),
        "-out".into(),
        output.clone().into_os_string(),
        "-c".into(),
        "2".into(),
        "2".into(),
        "0".into(),
        "-r".into(),
        "1.5".into(),
        "-z".into(),
    ]);
    assert_eq!(code, 0);

    let mask = ImageIo::with_default_formats()
        .read_raw(&output)
        .expect("read mask");
    assert_eq!(mask.geometry.spacing, vec![1.0, 1.0, 2.0]);
    assert_eq!(mask.geometry.origin, vec![-2.0, -2.0, 0.0]);
    // A 3x3 cross-section with corners at distance sqrt(2) on each of the 3 slices.
    assert_eq!(mask.samples.cast::<u8>().iter().map(|&v| v as usize).sum::<usize>(), 27);
}

#[test]
fn cylinder_needs_only_the_reference_header() {
    let dir = tempdir().expect("tempdir");
    let header = dir.path().join("header_only.mhd");
    std::fs::write(
        &header,
        "NDims = 2\nDimSize = 6 4\nElementSpacing = 0.5 0.5\nElementType = MET_SHORT\nElementDataFile = absent.raw\n",
    )
    .expect("header");
    let output = dir.path().join("mask.mhd");

    cylinder::run(
        CylinderParameters {
            input: Some(header),
            output: Some(output.clone()),
            center: Some(vec![2, 2]),
            radius: Some(0.6),
            compress: false,
        },
        &ImageIo::with_default_formats(),
    )
    .expect("cylinder");

    let mask = ImageIo::with_default_formats()
        .read_raw(&output)
        .expect("read mask");
    assert_eq!(mask.size, vec![6, 4]);
    assert_eq!(mask.geometry.spacing, vec![0.5, 0.5]);
    // Center plus its four neighbors, 0.5 away in physical space.
    assert_eq!(mask.samples.cast::<u8>().iter().map(|&v| v as usize).sum::<usize>(), 5);
}

#[test]
fn cylinder_rejects_bad_center_and_radius() {
    let dir = tempdir().expect("tempdir");
    let reference = write_image(&dir, "plane.mhd", &[9, 9], Samples::U8(vec![0; 81]));
    let io = ImageIo::with_default_formats();
    let base = CylinderParameters {
        input: Some(reference),
        output: Some(dir.path().join("never.mhd")),
        center: Some(vec![4, 4]),
        radius: Some(2.0),
        compress: false,
    };

    let mut bad_center = base.clone();
    bad_center.center = Some(vec![4, 4, 4]);
    assert!(matches!(
        cylinder::run(bad_center, &io),
        Err(ToolError::InvalidCenter(_))
    ));

    let mut bad_radius = base;
    bad_radius.radius = Some(0.0);
    assert!(matches!(
        cylinder::run(bad_radius, &io),
        Err(ToolError::InvalidRadius(_))
    ));
    assert!(!dir.path().join("never.mhd").exists());
}
