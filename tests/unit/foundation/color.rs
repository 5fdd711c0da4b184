use super::*;

#[test]
fn new_rejects_channels_outside_unit_interval() {
    assert!(Color::new(0.0, 0.5, 1.0).is_ok());
    assert!(matches!(
        Color::new(1.2, 0.0, 0.0),
        Err(SceneError::OutOfRange(_))
    ));
    assert!(matches!(
        Color::new(0.0, -0.1, 0.0),
        Err(SceneError::OutOfRange(_))
    ));
    assert!(Color::new(0.0, 0.0, f32::NAN).is_err());
}

#[test]
fn hex_parse_and_format_agree() {
    let c = Color::from_hex("#ff8000").unwrap();
    assert_eq!(c.to_bytes(), [255, 128, 0]);
    assert_eq!(c.to_html_hex(), "#ff8000");
    assert_eq!(Color::from_hex("00ff00").unwrap(), Color::GREEN);
    assert!(Color::from_hex("#ff80").is_err());
    assert!(Color::from_hex("#gg0000").is_err());
}
