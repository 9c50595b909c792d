/// Geographic position in decimal degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns `None` unless both coordinates are finite.
    pub fn finite(lat: f64, lng: f64) -> Option<Self> {
        (lat.is_finite() && lng.is_finite()).then_some(Self { lat, lng })
    }

    /// Rounds both coordinates to `dp` decimal places.
    pub fn rounded(self, dp: u32) -> Self {
        Self {
            lat: round_to(self.lat, dp),
            lng: round_to(self.lng, dp),
        }
    }
}

/// Rounds half away from zero to `dp` decimal places.
///
/// Non-finite input is returned unchanged.
pub fn round_to(value: f64, dp: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let p = 10f64.powi(dp as i32);
    let rounded = (value * p).round() / p;
    // Avoid "-0" leaking into serialized URLs.
    if rounded == 0.0 { 0.0 } else { rounded }
}
