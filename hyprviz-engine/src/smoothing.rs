use hyprviz_messages::AudioSnapshot;

const MAX_ALPHA: f32 = 0.99;

/// Exponential smoothing applied to every band before publishing.
///
/// `out = alpha * previous + (1 - alpha) * raw`. With `alpha == 0.0`
/// snapshots pass through untouched.
#[derive(Debug)]
pub struct Smoother {
    alpha: f32,
    previous: Option<Vec<f32>>,
}

impl Smoother {
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, MAX_ALPHA),
            previous: None,
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn apply(&mut self, raw: AudioSnapshot) -> AudioSnapshot {
        if self.alpha == 0.0 {
            return raw;
        }

        let smoothed: Vec<f32> = match &self.previous {
            Some(previous) if previous.len() == raw.len() => previous
                .iter()
                .zip(raw.bands())
                .map(|(prev, new)| self.alpha * prev + (1.0 - self.alpha) * new)
                .collect(),
            _ => raw.bands().to_vec(),
        };

        self.previous = Some(smoothed.clone());
        AudioSnapshot::from_bands(smoothed)
    }

    /// Forget history; the next snapshot passes through unchanged.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}
