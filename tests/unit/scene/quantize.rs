use super::*;
use glam::Vec3;

fn stream(ys: &[f32]) -> Vec<MeshUpdate> {
    ys.iter()
        .enumerate()
        .map(|(i, &y)| {
            MeshUpdate::geometry(
                "tri".to_string(),
                format!("tri-{i}"),
                i as u32,
                &[Vec3::ZERO, Vec3::X, Vec3::new(0.0, y, 0.0)],
                None,
                None,
            )
            .unwrap()
        })
        .collect()
}

fn run(updates: &mut [MeshUpdate], opts: &QuantizeOpts) -> QuantizationInfo {
    let range = opts.representable_range(1.0).unwrap();
    let mut refs: Vec<&mut MeshUpdate> = updates.iter_mut().collect();
    quantize_stream("tri", &mut refs, range, opts).unwrap()
}

#[test]
fn representable_range_uses_the_tighter_threshold() {
    let abs = QuantizeOpts::absolute(1e-3);
    assert!((abs.representable_range(100.0).unwrap() - 65.535).abs() < 1e-3);

    let rel = QuantizeOpts::relative(1e-4);
    assert!((rel.representable_range(10.0).unwrap() - 65.535).abs() < 1e-3);

    let both = QuantizeOpts {
        relative_error_threshold: 1e-4,
        absolute_error_threshold: 1e-4,
        ..QuantizeOpts::default()
    };
    assert!((both.representable_range(0.5).unwrap() - 3.27675).abs() < 1e-4);

    let neither = QuantizeOpts::absolute(0.0);
    assert!(matches!(
        neither.representable_range(1.0),
        Err(SceneError::Validation(_))
    ));
}

#[test]
fn first_update_is_always_a_keyframe() {
    let mut updates = stream(&[0.0, 0.01, 0.02]);
    let info = run(&mut updates, &QuantizeOpts::absolute(1e-3));
    assert_eq!(info.keyframe_count, 1);
    assert!(!updates[0].is_quantized());
    assert_eq!(updates[1].keyframe_index(), Some(0));
    assert_eq!(updates[2].keyframe_index(), Some(0));
}

#[test]
fn span_beyond_representable_range_promotes_a_keyframe() {
    let mut updates = stream(&[0.0, 0.5, 1.0, 1.2]);
    // representable span 0.65535
    let info = run(&mut updates, &QuantizeOpts::absolute(1e-5));
    assert_eq!(info.keyframe_count, 2);
    assert_eq!(updates[1].keyframe_index(), Some(0));
    assert!(!updates[2].is_quantized());
    assert_eq!(updates[3].keyframe_index(), Some(2));
}

#[test]
fn delta_budget_forces_keyframes() {
    let mut updates = stream(&[0.0; 7]);
    let opts = QuantizeOpts::absolute(1e-3).max_deltas_per_keyframe(2);
    let info = run(&mut updates, &opts);
    assert_eq!(info.keyframe_count, 3);
    let keyframes: Vec<bool> = updates.iter().map(|u| !u.is_quantized()).collect();
    assert_eq!(
        keyframes,
        vec![true, false, false, true, false, false, true]
    );
}

#[test]
fn report_errors_and_size_ratio() {
    let mut updates = stream(&[0.0, 0.1, 0.2, 0.3]);
    let info = run(&mut updates, &QuantizeOpts::absolute(1e-5));
    assert_eq!(info.keyframe_count, 1);
    assert!((info.max_error - 0.3 / QUANTIZATION_BINS).abs() < 1e-9);
    assert!((info.mean_error - 0.2 / QUANTIZATION_BINS).abs() < 1e-9);
    assert!((info.estimated_size_ratio - (4.0 + 3.0 * 2.0) / 16.0).abs() < 1e-6);

    let mut shared = stream(&[0.0, 0.1, 0.2, 0.3]);
    let info = run(
        &mut shared,
        &QuantizeOpts::absolute(1e-5).per_frame_range(false),
    );
    assert!((info.max_error - 1e-5).abs() < 1e-9);
    assert!((info.estimated_size_ratio - (4.0 + 3.0 * 2.0 * 0.75) / 16.0).abs() < 1e-6);
    assert!(info.to_string().starts_with("QuantizationInfo(keyframe_count=1"));
}

#[test]
fn keyframe_only_stream_has_zero_mean_error() {
    let mut updates = stream(&[0.0]);
    let info = run(&mut updates, &QuantizeOpts::absolute(1e-5));
    assert_eq!(info.keyframe_count, 1);
    assert_eq!(info.mean_error, 0.0);
    assert_eq!(info.estimated_size_ratio, 1.0);
}

#[test]
fn column_change_starts_a_new_keyframe() {
    let mut updates = stream(&[0.0, 0.0]);
    let normals = vec![Vec3::Z; 3];
    updates.push(
        MeshUpdate::geometry(
            "tri".into(),
            "tri-2".into(),
            2,
            &[Vec3::ZERO, Vec3::X, Vec3::Y],
            Some(&normals),
            None,
        )
        .unwrap(),
    );
    let info = run(&mut updates, &QuantizeOpts::absolute(1e-3));
    assert_eq!(info.keyframe_count, 2);
    assert!(!updates[2].is_quantized());
}

#[test]
fn stream_validation_reports_the_offending_update() {
    let mut updates = stream(&[0.0]);
    updates.push(
        MeshUpdate::geometry(
            "tri".into(),
            "short".into(),
            1,
            &[Vec3::ZERO],
            None,
            None,
        )
        .unwrap(),
    );
    let refs: Vec<&mut MeshUpdate> = updates.iter_mut().collect();
    let err = validate_stream("tri", &refs).unwrap_err();
    assert!(err.to_string().contains("short"));
    assert!(matches!(
        err,
        SceneError::ShapeMismatch {
            expected: 3,
            actual: 1,
            ..
        }
    ));
}
