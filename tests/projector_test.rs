use glam::{IVec2, Vec2};
use image_target_tracker::projection::{marker_to_screen, round_half_up, screen_to_marker};
use image_target_tracker::projector::{compute_search_points, search_point};
use image_target_tracker::synthetic::fronto_parallel_model_view;
use image_target_tracker::target::MarkerFeature;
use nalgebra as na;

fn feature(x: f32, y: f32) -> MarkerFeature {
    MarkerFeature {
        marker: Vec2::new(x, y),
        level: 0,
    }
}

#[test]
fn test_round_half_up() {
    assert_eq!(round_half_up(79.5), 80.0);
    assert_eq!(round_half_up(10.49), 10.0);
    assert_eq!(round_half_up(-2.5), -2.0);
    assert_eq!(round_half_up(-2.51), -3.0);
}

#[test]
fn test_project_fronto_parallel() {
    let mvp = fronto_parallel_model_view(100.0, 1.0);
    let sp = search_point(&feature(10.4, 20.5), &mvp, 1e-6);
    assert_eq!(sp, Some(IVec2::new(10, 80)));
}

#[test]
fn test_perspective_divide() {
    let mut mvp = fronto_parallel_model_view(100.0, 1.0);
    mvp[(2, 3)] = 2.0;
    let sp = search_point(&feature(40.0, 60.0), &mvp, 1e-6);
    assert_eq!(sp, Some(IVec2::new(20, 20)));
}

#[test]
fn test_degenerate_depth() {
    let mut mvp = fronto_parallel_model_view(100.0, 1.0);
    mvp[(2, 3)] = 0.0;
    assert_eq!(search_point(&feature(1.0, 2.0), &mvp, 1e-6), None);

    mvp[(2, 3)] = 1e-7;
    assert_eq!(search_point(&feature(1.0, 2.0), &mvp, 1e-6), None);

    // exactly at the epsilon the divide is accepted
    mvp[(2, 3)] = 1e-6;
    let p = marker_to_screen(&mvp, 1.0, 2.0, 1e-6).unwrap();
    assert!(p.x.is_finite() && p.y.is_finite());
}

#[test]
fn test_search_points_keep_feature_order() {
    let mvp = fronto_parallel_model_view(50.0, 2.0);
    let features = vec![feature(1.0, 1.0), feature(5.0, 10.0), feature(20.0, 3.0)];
    let points = compute_search_points(&features, &mvp, 1e-6);
    assert_eq!(
        points,
        vec![
            Some(IVec2::new(2, 48)),
            Some(IVec2::new(10, 30)),
            Some(IVec2::new(40, 44)),
        ]
    );
}

#[test]
fn test_screen_to_marker_inverts_projection() {
    let projection = na::Matrix3::new(500.0, 0.0, 160.0, 0.0, 500.0, 120.0, 0.0, 0.0, 1.0);
    let rotation = na::Rotation3::from_euler_angles(0.1, -0.2, 0.05);
    let mut model_view = na::Matrix3x4::zeros();
    model_view.fixed_view_mut::<3, 3>(0, 0).copy_from(rotation.matrix());
    model_view.set_column(3, &na::Vector3::new(-20.0, 10.0, 400.0));
    let mvp = projection * model_view;

    let s = marker_to_screen(&mvp, 33.0, -12.0, 1e-6).unwrap();
    let m = screen_to_marker(&mvp, s.x, s.y);
    assert!((m.x - 33.0).abs() < 1e-6);
    assert!((m.y + 12.0).abs() < 1e-6);
}
