mod common;

use common::init_logging;
use common::synthetic_image::{gradient_bgr, vertical_step_bgr};
use ndarray::Array3;
use stag_pipeline::filters::{color_science, edge};
use stag_pipeline::{apply_filters, Depth, FilterStep, Params};

fn run(img: &Array3<u8>, command: &str, params: Params) -> Array3<u8> {
    apply_filters(img.view(), &[FilterStep::with_params(command, params)]).unwrap()
}

fn weights(x: i64, y: i64) -> Params {
    Params::new().with("x", x).with("y", y)
}

#[test]
fn prewitt_weights_are_percentages() {
    init_logging();
    let img = gradient_bgr(8, 10);

    let horizontal = run(&img, "PREWITT", weights(100, 0));
    assert_eq!(horizontal, edge::prewitt_u8(img.view(), 1.0, 0.0));

    let blended = run(&img, "PREWITT", weights(50, 50));
    assert_eq!(blended, edge::prewitt_u8(img.view(), 0.5, 0.5));
    assert_ne!(blended, run(&img, "PREWITT", Params::new()));
}

#[test]
fn roberts_weights_are_percentages() {
    init_logging();
    let img = gradient_bgr(8, 10);

    let diagonal = run(&img, "ROBERTS", weights(0, 100));
    assert_eq!(diagonal, edge::roberts_u8(img.view(), 0.0, 1.0));

    let blended = run(&img, "ROBERTS", weights(50, 50));
    assert_eq!(blended, edge::roberts_u8(img.view(), 0.5, 0.5));
    assert_ne!(blended, run(&img, "ROBERTS", Params::new()));
}

#[test]
fn unweighted_directional_filters_are_black() {
    init_logging();
    let img = vertical_step_bgr(6, 6);
    assert!(run(&img, "PREWITT", Params::new()).iter().all(|&v| v == 0));
    assert!(run(&img, "ROBERTS", Params::new()).iter().all(|&v| v == 0));
}

#[test]
fn canny_reads_both_thresholds() {
    init_logging();
    let img = vertical_step_bgr(8, 8);

    // The step's L1 gradient peaks at 4 * 255 = 1020, below the upper threshold
    let strict = Params::new().with("Threshold 1", 2000i64).with("Threshold 2", 1000i64);
    let strict_out = run(&img, "CANNY", strict);
    assert_eq!(strict_out.dim(), (8, 8, 1));
    assert!(strict_out.iter().all(|&v| v == 0));

    let loose = run(&img, "CANNY", Params::new());
    assert!(loose.iter().any(|&v| v == 255));
    assert_eq!(loose, edge::canny_u8(img.view(), 0.0, 0.0));

    let text = Params::new().with("Threshold 1", "10").with("Threshold 2", "100");
    assert_eq!(run(&img, "CANNY", text), edge::canny_u8(img.view(), 10.0, 100.0));
}

#[test]
fn laplacian_honours_depth_symbol() {
    init_logging();
    let img = vertical_step_bgr(6, 6);
    let out = run(&img, "LAPLACIAN", Params::new().with("ddepth", "cv2.CV_16S"));

    assert_eq!(out.dim(), (6, 6, 1));
    assert_eq!(out, edge::laplacian_u8(img.view(), Depth::I16).unwrap());
    assert!(out.iter().any(|&v| v > 0));
}

#[test]
fn sobel_honours_depth_symbol() {
    init_logging();
    let img = vertical_step_bgr(6, 6);
    let signed = run(&img, "SOBEL", Params::new().with("ddepth", "cv2.CV_64F"));
    assert_eq!(signed, edge::sobel_u8(img.view(), Depth::F64));
    assert_eq!(signed.dim(), (6, 6, 3));
}

#[test]
fn colorspace_conversions_keep_three_channels() {
    init_logging();
    let img = gradient_bgr(5, 7);
    let conversions: [(&str, fn(ndarray::ArrayView3<u8>) -> Array3<u8>); 3] = [
        ("COLOR_RGB2HSV", color_science::bgr_to_hsv_u8),
        ("COLOR_RGB2YUV", color_science::bgr_to_yuv_u8),
        ("COLOR_RGB2LAB", color_science::bgr_to_lab_u8),
    ];

    for (command, convert) in conversions {
        let out = run(&img, command, Params::new());
        assert_eq!(out.dim(), (5, 7, 3), "{command}");
        assert_eq!(out, convert(img.view()), "{command}");
        assert_ne!(out, img, "{command}");
    }
}
