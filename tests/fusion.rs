mod common;

use common::synthetic_volume::{checker_u16, ramp_x_f32, ramp_z_f32};
use view_fusion::blend::{content_coverage, BlendingCurve};
use view_fusion::fusion::{FusedVolume, Fuser};
use view_fusion::portion::divide_into_portions;
use view_fusion::prelude::*;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn line_x(volume: &FusedVolume, y: usize, z: usize) -> Vec<f64> {
    (0..volume.dims()[0]).map(|x| volume.value([x, y, z])).collect()
}

#[test]
fn overlapping_views_blend_without_seam() {
    init_logger();
    let left = Volume::<f32>::filled([12, 21, 21], 100.0);
    let right = Volume::<f32>::filled([12, 21, 21], 200.0).with_origin([8, 0, 0]);
    let w_left = weights_for_volume(&left, None, 6.0).unwrap();
    let w_right = weights_for_volume(&right, None, 6.0).unwrap();

    let plan = FusionPlan::new(left.bounds().union(&right.bounds()));
    let inputs = vec![
        FusionInput::detail(&left, Some(&w_left)),
        FusionInput::detail(&right, Some(&w_right)),
    ];
    let result = fuse(plan, FusionParams::default(), inputs).unwrap();
    assert_eq!(result.volume.dims(), [20, 21, 21]);
    assert_eq!(result.report.background_voxels, 0);

    let line = line_x(&result.volume, 10, 10);
    for &v in &line[..8] {
        assert!((v - 100.0).abs() < 1e-3, "left-only voxel {v}");
    }
    for &v in &line[12..] {
        assert!((v - 200.0).abs() < 1e-3, "right-only voxel {v}");
    }
    for x in 8..12 {
        assert!(line[x] > 100.0 && line[x] < 200.0, "overlap voxel {x} = {}", line[x]);
    }
    for pair in line.windows(2) {
        assert!(pair[1] > pair[0] - 1e-6, "not monotone: {pair:?}");
    }
}

#[test]
fn unweighted_views_blend_over_the_configured_range() {
    let left = Volume::<f32>::filled([12, 21, 21], 100.0);
    let right = Volume::<f32>::filled([12, 21, 21], 200.0).with_origin([8, 0, 0]);
    let plan = FusionPlan::new(left.bounds().union(&right.bounds()));
    let run = |blending_range: f64| {
        let params = FusionParams {
            blending_range,
            ..Default::default()
        };
        let inputs = vec![
            FusionInput::detail(&left, None),
            FusionInput::detail(&right, None),
        ];
        fuse(plan.clone(), params, inputs).unwrap().volume
    };

    // every covered voxel is at least one step from the edge: flat weights
    let hard = line_x(&run(1.0), 10, 10);
    for x in 8..12 {
        assert!((hard[x] - 150.0).abs() < 1e-3, "x={x}: {}", hard[x]);
    }

    let soft = line_x(&run(6.0), 10, 10);
    assert_ne!(hard, soft, "blending range must shape the overlap");
    assert!(soft[8] < 150.0 && soft[11] > 150.0, "overlap {:?}", &soft[8..12]);
    for pair in soft.windows(2) {
        assert!(pair[1] > pair[0] - 1e-6, "not monotone: {pair:?}");
    }
}

#[test]
fn output_is_identical_for_any_worker_count() {
    init_logger();
    let a = checker_u16([24, 20, 16], 3, 100, 900);
    let b = checker_u16([24, 20, 16], 5, 50, 1200).with_origin([10, 4, 0]);
    let c = checker_u16([30, 30, 20], 6, 300, 600).with_origin([-2, -2, -2]);
    let w_a = weights_for_volume(&a, None, 8.0).unwrap();
    let w_b = weights_for_volume(&b, None, 8.0).unwrap();

    let bounds = a.bounds().union(&b.bounds());
    let run = |threads: usize| {
        let inputs = vec![
            FusionInput::base(&c),
            FusionInput::detail(&a, Some(&w_a)),
            FusionInput::detail(&b, Some(&w_b)),
        ];
        let params = FusionParams {
            threads,
            ..Default::default()
        };
        fuse(FusionPlan::new(bounds), params, inputs).unwrap()
    };

    let single = run(1);
    assert_eq!(single.report.portions, 1);
    for threads in [2, 3, 4, 0] {
        let multi = run(threads);
        assert_eq!(multi.volume, single.volume, "threads={threads}");
        assert_eq!(multi.report.covered_voxels, single.report.covered_voxels);
    }
}

#[test]
fn custom_portions_match_default_schedule() {
    let view = ramp_x_f32([17, 9, 5], [0, 0, 0], 1.0);
    let weights = weights_for_volume(&view, None, 4.0).unwrap();
    let fuser = Fuser::new(
        FusionPlan::new(view.bounds()),
        FusionParams::default(),
        vec![FusionInput::detail(&view, Some(&weights))],
    )
    .unwrap();
    let expected = fuser.fuse().unwrap();
    let portions = divide_into_portions(fuser.geometry().num_voxels(), 7);
    assert_eq!(portions.len(), 7);
    let custom = fuser.fuse_portions(&portions).unwrap();
    assert_eq!(custom.volume, expected.volume);
    assert_eq!(custom.report.portions, 7);
}

#[test]
fn base_view_fills_in_only_where_detail_is_weak() {
    init_logger();
    let base = Volume::<f32>::filled([31, 31, 31], 1000.0);
    let detail = Volume::<f32>::filled([21, 21, 21], 10.0).with_origin([5, 5, 5]);
    let weights = weights_for_volume(&detail, None, 10.0).unwrap();

    let plan = FusionPlan::new(base.bounds());
    let inputs = vec![
        FusionInput::base(&base),
        FusionInput::detail(&detail, Some(&weights)),
    ];
    let result = fuse(plan, FusionParams::default(), inputs).unwrap();
    let out = result.volume.as_f32().unwrap();

    // outside the detail view only the base remains
    assert!((out.get([0, 0, 0]) - 1000.0).abs() < 1e-3);
    // deep inside the detail view its weight saturates
    assert!((out.get([15, 15, 15]) - 10.0).abs() < 1e-4);
    // three voxels from the edge the detail weight already exceeds 0.2
    assert!((out.get([7, 15, 15]) - 10.0).abs() < 1e-4);

    // on the edge the base tops the detail weight up to the threshold
    let w = BlendingCurve::new(10.0).unwrap().weight(1.0) as f32 as f64;
    assert!(w < 0.2);
    let base_w = 0.2 - w;
    let expected = (10.0 * w + 1000.0 * base_w) / (w + base_w);
    let got = out.get([5, 15, 15]) as f64;
    assert!((got - expected).abs() < 1e-2, "got {got}, expected {expected}");
}

#[test]
fn integer_outputs_round_and_saturate() {
    let view = Volume::<f32>::filled([3, 3, 3], 300.4);
    for (pixel_type, expected) in [(PixelType::UInt16, 300.0), (PixelType::UInt8, 255.0)] {
        let plan = FusionPlan::new(view.bounds()).with_pixel_type(pixel_type);
        let result = fuse(plan, FusionParams::default(), vec![FusionInput::detail(&view, None)])
            .unwrap();
        assert_eq!(result.volume.pixel_type(), pixel_type);
        assert_eq!(result.report.pixel_type, pixel_type);
        assert_eq!(result.volume.value([1, 1, 1]), expected);
    }
}

#[test]
fn downsampled_grid_samples_every_other_world_voxel() {
    let view = ramp_x_f32([10, 4, 4], [0, 0, 0], 0.0);
    let plan = FusionPlan::new(view.bounds()).with_downsampling(2.0);
    let result = fuse(plan, FusionParams::default(), vec![FusionInput::detail(&view, None)])
        .unwrap();
    assert_eq!(result.volume.dims(), [5, 2, 2]);
    assert_eq!(line_x(&result.volume, 0, 0), vec![0.0, 2.0, 4.0, 6.0, 8.0]);
}

#[test]
fn preserved_anisotropy_steps_through_z() {
    let view = ramp_z_f32([4, 4, 10], [0, 0, 0]);
    let plan = FusionPlan::new(view.bounds()).with_anisotropy(2.0);
    let result = fuse(plan, FusionParams::default(), vec![FusionInput::detail(&view, None)])
        .unwrap();
    assert_eq!(result.volume.dims(), [4, 4, 6]);
    let column: Vec<f64> = (0..6).map(|z| result.volume.value([1, 1, z])).collect();
    // last slice lands at world z = 10, past the view
    assert_eq!(column, vec![0.0, 2.0, 4.0, 6.0, 8.0, 0.0]);
    assert_eq!(result.report.background_voxels, 16);
}

#[test]
fn zero_padding_is_excluded_from_coverage() {
    let mut view = Volume::<u16>::new([10, 4, 4]);
    for z in 0..4 {
        for y in 0..4 {
            for x in 0..6 {
                view.set([x, y, z], 50);
            }
        }
    }
    let mask = content_coverage(&view, None, 2).unwrap();
    assert_eq!(mask.get([5, 1, 1]), 1);
    assert_eq!(mask.get([6, 1, 1]), 0);

    let weights = weights_for_volume(&view, Some(&mask), 3.0).unwrap();
    let plan = FusionPlan::new(view.bounds()).with_pixel_type(PixelType::UInt16);
    let result = fuse(
        plan,
        FusionParams::default(),
        vec![FusionInput::detail(&view, Some(&weights))],
    )
    .unwrap();
    let out = result.volume.as_u16().unwrap();
    assert_eq!(out.get([0, 2, 2]), 50);
    assert_eq!(out.get([5, 2, 2]), 50);
    assert_eq!(out.get([6, 2, 2]), 0);
    assert_eq!(out.get([9, 2, 2]), 0);
    assert_eq!(result.report.covered_voxels, 6 * 4 * 4);
}

#[test]
fn invalid_configuration_is_rejected_before_fusing() {
    let view = Volume::<u8>::filled([2, 2, 2], 1);
    let params = FusionParams {
        blending_range: 0.0,
        ..Default::default()
    };
    let err = Fuser::new(
        FusionPlan::new(view.bounds()),
        params,
        vec![FusionInput::detail(&view, None)],
    )
    .err()
    .unwrap();
    assert!(matches!(err, FusionError::InvalidBlendingRange { .. }));

    let empty = FusionPlan::new(BoundingBox::new([0, 0, 0], [3, -1, 3]));
    let err = fuse(
        empty,
        FusionParams::default(),
        vec![FusionInput::detail(&view, None)],
    )
    .unwrap_err();
    assert!(matches!(err, FusionError::EmptyBoundingBox { .. }));
}
