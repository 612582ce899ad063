use glam::Vec2;
use image_target_tracker::projector::search_point;
use image_target_tracker::synthetic::{
    frame_from_intensity, fronto_parallel_model_view, random_texture, single_level_target,
    translate, uniform_frame,
};
use image_target_tracker::{Target, Tracker, TrackerConfig, TrackerError};
use nalgebra as na;

const W: u32 = 100;
const H: u32 = 100;
const FEATURES: [(f32, f32); 5] = [
    (30.0, 30.0),
    (50.0, 50.0),
    (70.0, 30.0),
    (30.0, 70.0),
    (65.0, 60.0),
];

fn make_target(seed: u64) -> (Vec<u8>, Target) {
    let pixels = random_texture(W, H, seed);
    let target = single_level_target(pixels.clone(), W, H, 1.0, &FEATURES).unwrap();
    (pixels, target)
}

fn make_tracker(targets: Vec<Target>) -> Tracker {
    Tracker::new(targets, na::Matrix3::identity(), W, H, TrackerConfig::default()).unwrap()
}

#[test]
fn test_recovers_translation() {
    let (pixels, target) = make_target(5);
    let features = target.features().to_vec();
    let tracker = make_tracker(vec![target]);
    let model_view = fronto_parallel_model_view(H as f64, 1.0);
    let frame = frame_from_intensity(&translate(&pixels, W, H, 3, 2, 0), W, H).unwrap();

    let result = tracker.track(&frame, &model_view, 0).unwrap().unwrap();
    assert!(result.len() >= 4);
    assert_eq!(result.len(), features.len());
    for (c, f) in result.iter().zip(&features) {
        assert!(c.similarity > 0.99, "similarity {}", c.similarity);
        let projected = search_point(f, &model_view, 1e-6).unwrap();
        assert_eq!(c.p2d, projected.as_vec2() + Vec2::new(3.0, 2.0));
        assert_eq!(c.p3d.truncate(), f.marker);
        assert_eq!(c.p3d.z, 0.0);
    }
}

#[test]
fn test_uniform_frame_is_lost() {
    let (_, target) = make_target(6);
    let tracker = make_tracker(vec![target]);
    let model_view = fronto_parallel_model_view(H as f64, 1.0);
    let frame = uniform_frame(W, H, [0.5, 0.5, 0.5]).unwrap();

    let result = tracker.track_detailed(&frame, &model_view, 0).unwrap();
    assert!(result.correspondences.is_none());
    assert!(result.matches.iter().all(Option::is_none));
}

#[test]
fn test_tracking_is_deterministic() {
    let (pixels, target) = make_target(7);
    let tracker = make_tracker(vec![target]);
    let model_view = fronto_parallel_model_view(H as f64, 1.0);
    let frame = frame_from_intensity(&translate(&pixels, W, H, -2, 4, 17), W, H).unwrap();

    let first = tracker.track_detailed(&frame, &model_view, 0).unwrap();
    for _ in 0..3 {
        let again = tracker.track_detailed(&frame, &model_view, 0).unwrap();
        assert_eq!(again.correspondences, first.correspondences);
        assert_eq!(again.matches, first.matches);
    }
}

#[test]
fn test_track_detailed_reports_every_feature() {
    let (pixels, target) = make_target(8);
    let tracker = make_tracker(vec![target]);
    let model_view = fronto_parallel_model_view(H as f64, 1.0);
    let frame = frame_from_intensity(&pixels, W, H).unwrap();

    let result = tracker.track_detailed(&frame, &model_view, 0).unwrap();
    assert_eq!(result.matches.len(), FEATURES.len());
    assert!(result.timing.total_ms() >= 0.0);
    let correspondences = result.correspondences.unwrap();
    for (c, &(x, y)) in correspondences.iter().zip(&FEATURES) {
        assert_eq!(c.p2d, Vec2::new(x, y));
    }
}

#[test]
fn test_boundary_errors() {
    let (_, target) = make_target(9);
    let tracker = make_tracker(vec![target]);
    let model_view = fronto_parallel_model_view(H as f64, 1.0);

    let frame = uniform_frame(W, H, [0.0, 0.0, 0.0]).unwrap();
    let err = tracker.track(&frame, &model_view, 1).unwrap_err();
    assert!(matches!(err, TrackerError::TargetIndexOutOfRange { index: 1, len: 1 }));

    let small = uniform_frame(W / 2, H, [0.0, 0.0, 0.0]).unwrap();
    let err = tracker.track(&small, &model_view, 0).unwrap_err();
    assert!(matches!(err, TrackerError::FrameSizeMismatch { .. }));
}

#[test]
fn test_far_projection_is_lost() {
    let (_, target) = make_target(10);
    let tracker = make_tracker(vec![target]);
    let frame = uniform_frame(W, H, [0.25, 0.5, 0.75]).unwrap();

    // every feature lands at roughly (1e10, 1e10), far past i32 range
    let mut model_view = na::Matrix3x4::zeros();
    model_view[(0, 3)] = 1e4;
    model_view[(1, 3)] = 1e4;
    model_view[(2, 3)] = 1e-6;
    let result = tracker.track_detailed(&frame, &model_view, 0).unwrap();
    assert!(result.correspondences.is_none());
    assert!(result.matches.iter().all(Option::is_none));

    model_view[(0, 3)] = -1e4;
    model_view[(1, 3)] = -1e4;
    assert_eq!(tracker.track(&frame, &model_view, 0).unwrap(), None);
}

#[test]
fn test_invalid_config_is_rejected() {
    let (_, target) = make_target(11);
    let config = TrackerConfig {
        search_half_size: 1 << 30,
        ..Default::default()
    };
    let err = Tracker::new(vec![target.clone()], na::Matrix3::identity(), W, H, config);
    assert!(matches!(err, Err(TrackerError::InvalidConfig(_))));

    let config = TrackerConfig {
        template_half_size: u32::MAX,
        ..Default::default()
    };
    let err = Tracker::new(vec![target.clone()], na::Matrix3::identity(), W, H, config);
    assert!(matches!(err, Err(TrackerError::InvalidConfig(_))));

    let config = TrackerConfig {
        projection_epsilon: f64::NAN,
        ..Default::default()
    };
    let err = Tracker::new(vec![target], na::Matrix3::identity(), W, H, config);
    assert!(matches!(err, Err(TrackerError::InvalidConfig(_))));
}
