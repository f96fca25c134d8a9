use crate::ConfigError;

/// One complete set of band values produced from a single decoded record.
///
/// Snapshots are immutable once built. A newer record replaces the whole
/// snapshot, it never patches individual bands.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSnapshot {
    /// 0 for the initial all-zero snapshot, then incremented on every publish.
    sequence: u64,
    bands: Box<[f32]>,
}

impl AudioSnapshot {
    /// The snapshot readers see before anything has been received.
    pub fn zeroed(len: usize) -> Self {
        Self {
            sequence: 0,
            bands: vec![0.0; len].into_boxed_slice(),
        }
    }

    pub fn from_bands(bands: Vec<f32>) -> Self {
        Self {
            sequence: 0,
            bands: bands.into_boxed_slice(),
        }
    }

    pub(crate) fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn bands(&self) -> &[f32] {
        &self.bands
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.bands.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

/// Ordered band names. The name of each band is also the shader uniform
/// its value is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandLayout {
    names: Vec<String>,
}

impl BandLayout {
    pub fn new<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(ConfigError::EmptyLayout);
        }
        Ok(Self { names })
    }

    /// A single `loudness` band.
    pub fn loudness_only() -> Self {
        Self {
            names: vec!["loudness".to_owned()],
        }
    }

    /// Loudness followed by five fixed frequency ranges.
    pub fn five_band() -> Self {
        Self {
            names: ["loudness", "sub_bass", "bass", "low_mids", "mids", "highs"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }

    /// Loudness followed by `bands` mel-scale bands, addressed as the
    /// GLSL array `bands[i]`.
    pub fn mel(bands: usize) -> Self {
        let names = std::iter::once("loudness".to_owned())
            .chain((0..bands).map(|i| format!("bands[{i}]")))
            .collect();
        Self { names }
    }

    /// Pick a preset from the number of fields per record.
    pub fn from_count(count: usize) -> Result<Self, ConfigError> {
        match count {
            0 => Err(ConfigError::EmptyLayout),
            1 => Ok(Self::loudness_only()),
            6 => Ok(Self::five_band()),
            n => Ok(Self::mel(n - 1)),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }
}

impl Default for BandLayout {
    fn default() -> Self {
        Self::mel(12)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_is_loudness_plus_twelve_mel_bands() {
        let layout = BandLayout::default();
        assert_eq!(layout.len(), 13);
        assert_eq!(layout.name(0), Some("loudness"));
        assert_eq!(layout.name(1), Some("bands[0]"));
        assert_eq!(layout.name(12), Some("bands[11]"));
        assert_eq!(layout.name(13), None);
    }

    #[test]
    fn from_count_picks_presets() {
        assert_eq!(BandLayout::from_count(1).unwrap(), BandLayout::loudness_only());
        assert_eq!(BandLayout::from_count(6).unwrap(), BandLayout::five_band());
        assert_eq!(BandLayout::from_count(13).unwrap(), BandLayout::mel(12));
        assert!(matches!(
            BandLayout::from_count(0),
            Err(ConfigError::EmptyLayout)
        ));
    }

    #[test]
    fn custom_layout_rejects_empty_names() {
        let empty: [&str; 0] = [];
        assert!(BandLayout::new(empty).is_err());
        let layout = BandLayout::new(["kick", "snare"]).unwrap();
        assert_eq!(layout.names(), ["kick".to_owned(), "snare".to_owned()]);
    }

    #[test]
    fn zeroed_snapshot_has_sequence_zero() {
        let snapshot = AudioSnapshot::zeroed(3);
        assert_eq!(snapshot.sequence(), 0);
        assert_eq!(snapshot.bands(), &[0.0, 0.0, 0.0]);
        assert_eq!(snapshot.get(3), None);
    }
}
