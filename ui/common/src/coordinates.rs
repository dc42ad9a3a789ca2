/// Formats a coordinate pair as `"<lat>, <lng>"` with six fractional digits.
///
/// The seventh decimal rounds half up on the exact binary value, so
/// `55.7558267` becomes `55.755827`. Negative zero prints without a sign.
pub fn format_coordinates(lat: f64, lng: f64) -> String {
    // -0.0 + 0.0 == +0.0
    format!("{:.6}, {:.6}", lat + 0.0, lng + 0.0)
}

#[test]
fn test_format_coordinates() {
    assert_eq!(format_coordinates(55.755826, 37.617299), "55.755826, 37.617299");
    assert_eq!(
        format_coordinates(55.7558263456789, 37.6172994567890),
        "55.755826, 37.617299"
    );
    assert_eq!(format_coordinates(55.75, 37.61), "55.750000, 37.610000");
    assert_eq!(format_coordinates(55.0, 37.0), "55.000000, 37.000000");
    assert_eq!(format_coordinates(180.0, 90.0), "180.000000, 90.000000");
    assert_eq!(format_coordinates(0.000001, 0.000001), "0.000001, 0.000001");
}

#[test]
fn test_format_coordinates_sign() {
    assert_eq!(format_coordinates(-55.755826, -37.617299), "-55.755826, -37.617299");
    assert_eq!(format_coordinates(0.0, 0.0), "0.000000, 0.000000");
    assert_eq!(format_coordinates(-0.0, -0.0), "0.000000, 0.000000");
}

#[test]
fn test_format_coordinates_rounding() {
    // 7th decimal >= 5
    assert_eq!(format_coordinates(55.7558267, 37.6172995), "55.755827, 37.617300");
    // 7th decimal < 5
    assert_eq!(format_coordinates(55.7558264, 37.6172994), "55.755826, 37.617299");
}
