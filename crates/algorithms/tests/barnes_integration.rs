//! End-to-end tests: samples in, analysed grid out.
//!
//! The reference scenario uses three samples on the diagonal of the
//! 140E..160E, 60S..40S box with the recommended parameters
//! (2 x 4 grid, spacing 10.21 x 6.58 degrees, L = 3.333 grid units).

use std::ops::ControlFlow;

use barnes_algorithms::analysis::{
    analyze, analyze_with_config, analyze_with_defaults, analyze_with_first_guess,
    analyze_with_observer, barnes, interpolate_at, point_residuals, recommend_parameters,
    BarnesConfig, BarnesParams, GridSpec,
};
use barnes_core::io::{read_geotiff, read_samples_csv, write_geotiff, write_residuals_csv};
use barnes_core::{BoundingBox, Grid, GridAxes, GridAxis, SamplePoint, SampleSet};
use ndarray::Array2;

fn reference_box() -> BoundingBox {
    BoundingBox::new(140.0, -60.0, 160.0, -40.0)
}

fn reference_samples() -> SampleSet {
    SampleSet::from_points(&[
        SamplePoint::new(140.0, -40.0, 1.0),
        SamplePoint::new(150.0, -50.0, 2.0),
        SamplePoint::new(160.0, -60.0, 3.0),
    ])
}

/// Alternating +10/-10 samples scattered over a 20 x 20 unit grid
fn checkerboard_samples() -> SampleSet {
    (0..30)
        .map(|k| {
            let x = ((k * 7) % 19) as f64 + 0.3;
            let y = ((k * 11) % 19) as f64 + 0.6;
            SamplePoint::new(x, y, if k % 2 == 0 { 10.0 } else { -10.0 })
        })
        .collect()
}

fn unit_axes(nx: usize, ny: usize) -> GridAxes {
    GridAxes::new(
        GridAxis::new(0.0, 1.0, nx).unwrap(),
        GridAxis::new(0.0, 1.0, ny).unwrap(),
    )
}

// ---------------------------------------------------------------------------
// Reference scenario
// ---------------------------------------------------------------------------

#[test]
fn reference_scenario_orders_cells_like_samples() {
    let grid = analyze_with_defaults(&reference_box(), &reference_samples(), 3).unwrap();
    assert_eq!(grid.shape(), (2, 4));

    // Cells nearest each sample, in sample order
    let near_1 = grid.get(0, 3).unwrap();
    let near_2 = grid.get(1, 2).unwrap();
    let near_3 = grid.get(1, 0).unwrap();
    assert!(near_1 < near_2 && near_2 < near_3, "{near_1} {near_2} {near_3}");

    assert!((near_1 - 1.0).abs() < (near_1 - 3.0).abs());
    assert!((near_3 - 3.0).abs() < (near_3 - 1.0).abs());

    for &v in grid.values().iter() {
        assert!(v.is_finite());
    }
}

#[test]
fn reference_scenario_rmse_falls_each_pass() {
    let params = BarnesParams {
        grid: GridSpec::Recommended {
            bbox: Some(reference_box()),
        },
        config: BarnesConfig {
            report_rms: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let result = barnes(&reference_samples(), params).unwrap();

    let rmse: Vec<f64> = result.pass_rmse.iter().map(|&(_, r)| r).collect();
    assert_eq!(rmse.len(), 3);
    assert!((rmse[0] - 0.5391).abs() < 1e-3, "pass 1 RMSE {}", rmse[0]);
    assert!(rmse[0] > rmse[1] && rmse[1] > rmse[2], "{rmse:?}");

    let ap = result.parameters.unwrap();
    assert_eq!(ap, recommend_parameters(&reference_box(), &reference_samples()).unwrap());
}

#[test]
fn explicit_grid_matches_recommended() {
    let samples = reference_samples();
    let ap = recommend_parameters(&reference_box(), &samples).unwrap();

    let explicit = analyze(&samples, &ap.axes, ap.scale_length, 1.0, 3).unwrap();
    let recommended = analyze_with_defaults(&reference_box(), &samples, 3).unwrap();
    assert_eq!(explicit, recommended);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn single_sample_fills_grid() {
    let samples = SampleSet::from_points(&[SamplePoint::new(5.5, 2.25, -7.5)]);
    let grid = analyze(&samples, &unit_axes(12, 9), 1.5, 0.5, 4).unwrap();
    for &v in grid.values().iter() {
        assert!((v + 7.5).abs() < 1e-12, "expected -7.5, got {v}");
    }
}

#[test]
fn identical_runs_are_bit_identical() {
    let samples = checkerboard_samples();
    let a = analyze(&samples, &unit_axes(20, 20), 2.5, 0.6, 3).unwrap();
    let b = analyze(&samples, &unit_axes(20, 20), 2.5, 0.6, 3).unwrap();
    for (x, y) in a.values().iter().zip(b.values().iter()) {
        assert_eq!(x.to_bits(), y.to_bits());
    }
}

#[test]
fn larger_scale_length_is_smoother() {
    let samples = checkerboard_samples();
    let sharp = analyze(&samples, &unit_axes(20, 20), 2.0, 1.0, 1).unwrap();
    let smooth = analyze(&samples, &unit_axes(20, 20), 8.0, 1.0, 1).unwrap();
    assert!(
        smooth.first_difference_variance() < sharp.first_difference_variance(),
        "L=8: {}, L=2: {}",
        smooth.first_difference_variance(),
        sharp.first_difference_variance()
    );
}

#[test]
fn observer_sees_every_pass() {
    let mut seen = Vec::new();
    let result = analyze_with_observer(
        &checkerboard_samples(),
        &unit_axes(20, 20),
        3.0,
        0.5,
        3,
        BarnesConfig::default(),
        |report| {
            seen.push((report.pass, report.passes, report.scale_length));
            ControlFlow::Continue(())
        },
    )
    .unwrap();
    assert_eq!(result.passes_completed, 3);
    assert_eq!(seen, vec![(1, 3, 3.0), (2, 3, 1.5), (3, 3, 1.5)]);
}

#[test]
fn early_stop_returns_last_complete_grid() {
    let samples = checkerboard_samples();
    let stopped = analyze_with_observer(
        &samples,
        &unit_axes(20, 20),
        3.0,
        1.0,
        5,
        BarnesConfig::default(),
        |_| ControlFlow::Break(()),
    )
    .unwrap();
    assert_eq!(stopped.passes_completed, 1);

    let one_pass = analyze(&samples, &unit_axes(20, 20), 3.0, 1.0, 1).unwrap();
    assert_eq!(stopped.grid, one_pass);
}

#[test]
fn influence_cutoff_leaves_distant_cells_at_mean() {
    // Two clusters far apart with a short reach: the gap keeps the mean
    let samples = SampleSet::from_points(&[
        SamplePoint::new(0.0, 0.0, 1.0),
        SamplePoint::new(29.0, 29.0, 5.0),
    ]);
    let config = BarnesConfig {
        influence_cutoff: Some(1e-3),
        ..Default::default()
    };
    let result = analyze_with_config(&samples, &unit_axes(30, 30), 1.0, 1.0, 2, config).unwrap();
    assert_eq!(result.grid.get(15, 15).unwrap(), 3.0);
    assert!((result.grid.get(0, 0).unwrap() - 1.0).abs() < 1e-9);
}

#[test]
fn residuals_match_interpolated_values() {
    let samples = checkerboard_samples();
    let grid = analyze(&samples, &unit_axes(20, 20), 2.0, 1.0, 3).unwrap();
    let residuals = point_residuals(&samples, &grid).unwrap();
    for (p, d) in samples.points().zip(&residuals) {
        let estimate = interpolate_at(&grid, p.lon, p.lat).unwrap();
        assert!((p.value - estimate - d).abs() < 1e-12);
    }
}

#[test]
fn first_guess_seeded_with_pass_one_matches_full_analysis() {
    let samples = checkerboard_samples();
    let axes = unit_axes(20, 20);
    let pass_one = analyze(&samples, &axes, 3.0, 0.5, 1).unwrap();

    let seeded =
        analyze_with_first_guess(&samples, &pass_one, 3.0, 0.5, 3, BarnesConfig::default())
            .unwrap();
    assert_eq!(seeded.grid, analyze(&samples, &axes, 3.0, 0.5, 3).unwrap());
}

// ---------------------------------------------------------------------------
// I/O
// ---------------------------------------------------------------------------

#[test]
fn csv_to_geotiff_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("samples.csv");
    std::fs::write(
        &csv_path,
        "lon,lat,value\n140,-40,1\n150,-50,2\n160,-60,3\n",
    )
    .unwrap();

    let samples = read_samples_csv(&csv_path).unwrap();
    assert_eq!(samples, reference_samples());

    let result = barnes(
        &samples,
        BarnesParams {
            grid: GridSpec::Recommended {
                bbox: Some(reference_box()),
            },
            config: BarnesConfig {
                report_rms: true,
                ..Default::default()
            },
            ..Default::default()
        },
    )
    .unwrap();

    let tif_path = dir.path().join("grid.tif");
    write_geotiff(&result.grid, &tif_path).unwrap();
    let reloaded = read_geotiff(&tif_path).unwrap();
    assert_eq!(reloaded.shape(), result.grid.shape());
    for i in 0..2 {
        for j in 0..4 {
            let a = result.grid.get(i, j).unwrap();
            let b = reloaded.get(i, j).unwrap();
            assert!((a - b).abs() < 1e-5, "cell ({i},{j}): {a} vs {b}");
        }
    }

    let residuals = result.residuals.unwrap();
    let res_path = dir.path().join("residuals.csv");
    write_residuals_csv(&res_path, &samples, &residuals).unwrap();
    let text = std::fs::read_to_string(&res_path).unwrap();
    assert_eq!(text.lines().count(), 4);
    assert!(text.starts_with("lon,lat,value,residual"));
}

#[test]
fn first_guess_from_geotiff_is_corrected() {
    let dir = tempfile::tempdir().unwrap();
    let samples = reference_samples();
    let ap = recommend_parameters(&reference_box(), &samples).unwrap();

    // Background a constant 1.5 too warm, with one missing cell
    let mut background = Array2::from_elem(ap.axes.shape(), 3.5);
    background[[0, 0]] = f64::NAN;
    let tif_path = dir.path().join("background.tif");
    write_geotiff(&Grid::new(background, ap.axes).unwrap(), &tif_path).unwrap();
    let first_guess = read_geotiff(&tif_path).unwrap();

    let config = BarnesConfig {
        report_rms: true,
        ..Default::default()
    };
    let result =
        analyze_with_first_guess(&samples, &first_guess, ap.scale_length, 1.0, 3, config).unwrap();

    assert_eq!(result.grid.shape(), ap.axes.shape());
    for &v in result.grid.values().iter() {
        assert!(v.is_finite());
    }
    let rmse: Vec<f64> = result.pass_rmse.iter().map(|&(_, r)| r).collect();
    assert_eq!(rmse.len(), 3);
    assert!(rmse[2] < rmse[0], "{rmse:?}");
}
