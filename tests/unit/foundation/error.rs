use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SceneError::invalid_topology("x")
            .to_string()
            .contains("invalid topology:")
    );
    assert!(
        SceneError::out_of_range("x")
            .to_string()
            .contains("out of range:")
    );
    assert!(
        SceneError::invalid_state("x")
            .to_string()
            .contains("invalid state:")
    );
    assert!(
        SceneError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        SceneError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn shape_mismatch_names_context_and_counts() {
    let msg = SceneError::shape_mismatch("update 'Mesh-3' of 'cloth'", 42, 40).to_string();
    assert!(msg.contains("cloth"));
    assert!(msg.contains("expected 42"));
    assert!(msg.contains("got 40"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SceneError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_map_to_serde() {
    let err: SceneError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, SceneError::Serde(_)));
}
