/// Amplitude in Decibels (dB).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Decibels(pub f32);

impl std::fmt::Display for Decibels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} dB", self.0)
    }
}

impl Decibels {
    /// Floor used for silent bands so meters never see `-inf`.
    pub const FLOOR: Decibels = Decibels(-60.0);

    /// Convert linear amplitude to decibels, clamped at [`Decibels::FLOOR`].
    /// For voltage/amplitude: dB = 20 * log10(linear)
    pub fn from_linear(linear: f32) -> Self {
        let db = 20.0 * linear.abs().log10();
        Self(db.max(Self::FLOOR.0))
    }

    /// Convert decibels to linear amplitude.
    pub fn to_linear(self) -> f32 {
        10.0_f32.powf(self.0 / 20.0)
    }

    /// Position of this level between the floor and 0 dB, in `0.0..=1.0`.
    pub fn normalized(self) -> f32 {
        ((self.0 - Self::FLOOR.0) / -Self::FLOOR.0).clamp(0.0, 1.0)
    }

    pub const fn as_db(self) -> f32 {
        self.0
    }
}

impl From<f32> for Decibels {
    fn from(db: f32) -> Self {
        Self(db)
    }
}

impl From<Decibels> for f32 {
    fn from(db: Decibels) -> Self {
        db.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_clamps_to_floor() {
        assert_eq!(Decibels::from_linear(0.0), Decibels::FLOOR);
        assert_eq!(Decibels::from_linear(0.0).normalized(), 0.0);
    }

    #[test]
    fn unity_is_zero_db() {
        let db = Decibels::from_linear(1.0);
        assert!(db.as_db().abs() < 1e-6);
        assert_eq!(db.normalized(), 1.0);
        assert!((db.to_linear() - 1.0).abs() < 1e-6);
    }
}
