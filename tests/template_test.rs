use glam::IVec2;
use image_target_tracker::synthetic::{
    fronto_parallel_model_view, random_texture, single_level_target,
};
use image_target_tracker::target::{FeatureCoord, FeatureSet, Target, TargetImage};
use image_target_tracker::template::build_templates;
use nalgebra as na;

const T: u32 = 6;

#[test]
fn test_interior_template_is_complete() {
    let pixels = random_texture(100, 100, 11);
    let target = single_level_target(pixels.clone(), 100, 100, 1.0, &[(40.0, 55.0)]).unwrap();
    let mvp = fronto_parallel_model_view(100.0, 1.0);
    let sp = IVec2::new(40, 55);

    let templates = build_templates(&target, &[Some(sp)], &mvp, T);
    assert_eq!(templates.stride(), 169);
    let patch = templates.feature(0);
    assert!(patch.iter().all(Option::is_some));

    for j in 0..13 {
        for i in 0..13 {
            let x = (sp.x + i - 6) as usize;
            let y = (sp.y + j - 6) as usize;
            assert_eq!(
                patch[(j * 13 + i) as usize],
                Some(pixels[y * 100 + x] as f32),
                "cell ({i}, {j})"
            );
        }
    }
}

#[test]
fn test_cells_outside_level_are_invalid() {
    let pixels = random_texture(100, 100, 12);
    let target = single_level_target(pixels, 100, 100, 1.0, &[(2.0, 50.0)]).unwrap();
    let mvp = fronto_parallel_model_view(100.0, 1.0);

    let templates = build_templates(&target, &[Some(IVec2::new(2, 50))], &mvp, T);
    let patch = templates.feature(0);
    // columns 0..4 map to x = -4..-1
    assert_eq!(patch.iter().filter(|c| c.is_none()).count(), 4 * 13);
    for j in 0..13 {
        for i in 0..13 {
            assert_eq!(patch[j * 13 + i].is_none(), i < 4);
        }
    }
}

#[test]
fn test_missing_search_point_gives_empty_template() {
    let features = [(20.0, 20.0), (25.0, 25.0)];
    let target = single_level_target(random_texture(50, 50, 1), 50, 50, 1.0, &features).unwrap();
    let mvp = fronto_parallel_model_view(50.0, 1.0);
    let templates = build_templates(&target, &[None, Some(IVec2::new(25, 25))], &mvp, T);
    assert!(templates.feature(0).iter().all(Option::is_none));
    assert!(templates.feature(1).iter().all(Option::is_some));
}

#[test]
fn test_singular_transform_rejects_every_cell() {
    let target =
        single_level_target(random_texture(50, 50, 2), 50, 50, 1.0, &[(20.0, 20.0)]).unwrap();
    let mvp = na::Matrix3x4::zeros();
    let templates = build_templates(&target, &[Some(IVec2::new(20, 20))], &mvp, T);
    assert!(templates.feature(0).iter().all(Option::is_none));
}

#[test]
fn test_samples_from_feature_level() {
    // level 0: 100x100 at 1 dpi, level 1: 50x50 at 0.5 dpi, same marker size
    let level0 = TargetImage {
        width: 100,
        height: 100,
        dpi: 1.0,
        pixels: vec![10; 100 * 100],
    };
    let level1 = TargetImage {
        width: 50,
        height: 50,
        dpi: 0.5,
        pixels: vec![200; 50 * 50],
    };
    let sets = [
        FeatureSet {
            coords: vec![FeatureCoord { mx: 50.0, my: 50.0 }],
        },
        FeatureSet {
            coords: vec![FeatureCoord { mx: 40.0, my: 60.0 }],
        },
    ];
    let target = Target::from_levels(&sets, &[level0, level1]).unwrap();
    let mvp = fronto_parallel_model_view(100.0, 1.0);

    let templates = build_templates(
        &target,
        &[Some(IVec2::new(50, 50)), Some(IVec2::new(40, 40))],
        &mvp,
        T,
    );
    assert!(templates.feature(0).iter().all(|c| *c == Some(10.0)));
    assert!(templates.feature(1).iter().all(|c| *c == Some(200.0)));
}
