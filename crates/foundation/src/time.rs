/// Event timestamp in milliseconds.
///
/// Timers in this workspace never read the wall clock themselves; callers
/// pass the current time in so behavior can be replayed in tests.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Millis(pub u64);

impl Millis {
    pub fn saturating_add(self, ms: u64) -> Self {
        Millis(self.0.saturating_add(ms))
    }

    pub fn saturating_sub(self, earlier: Millis) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Converts a JS-style floating timestamp, clamping negatives to zero.
    pub fn from_f64(ms: f64) -> Self {
        if ms.is_finite() && ms > 0.0 {
            Millis(ms as u64)
        } else {
            Millis(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Millis;

    #[test]
    fn arithmetic_saturates() {
        assert_eq!(Millis(5).saturating_sub(Millis(10)), 0);
        assert_eq!(Millis(u64::MAX).saturating_add(1), Millis(u64::MAX));
        assert_eq!(Millis::from_f64(-3.0), Millis(0));
        assert_eq!(Millis::from_f64(1500.7), Millis(1500));
    }
}
