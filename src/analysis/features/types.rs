// Types module - Data structures for the feature pipeline
//
// Spectrogram containers passed between pipeline stages, the canonical
// 53-slot feature layout and the assembled FeatureVector.

use serde::Serialize;

/// Number of MFCC coefficients reported (mean across frames)
pub const N_MFCC: usize = 13;

/// Length of the assembled feature vector
pub const FEATURE_COUNT: usize = 53;

/// Frame-major power spectrogram
///
/// Every frame holds the same number of bins; an input shorter than one
/// window produces zero frames but still remembers its bin count.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    frames: Vec<Vec<f32>>,
    n_bins: usize,
}

impl Spectrogram {
    /// Empty spectrogram whose (absent) frames would carry `n_bins` bins
    pub fn empty(n_bins: usize) -> Self {
        Self {
            frames: Vec::new(),
            n_bins,
        }
    }

    /// Build from frames that all hold `n_bins` values
    pub fn from_frames(frames: Vec<Vec<f32>>, n_bins: usize) -> Self {
        debug_assert!(frames.iter().all(|frame| frame.len() == n_bins));
        Self { frames, n_bins }
    }

    pub fn frames(&self) -> &[Vec<f32>] {
        &self.frames
    }

    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// All values in frame-major order
    pub fn flatten(&self) -> Vec<f32> {
        self.frames.iter().flatten().copied().collect()
    }
}

/// Mel spectrogram: frames × mel bands, same layout as [`Spectrogram`]
pub type MelSpectrogram = Spectrogram;

/// Grouping of feature slots for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureCategory {
    /// Mean mel-frequency cepstral coefficients
    Mfcc,
    /// Power-spectrum shape descriptors
    Spectral,
    /// Waveform energy descriptors
    Energy,
    /// Onset and (not yet implemented) tempo descriptors
    Rhythm,
    /// Impact-sound descriptors: pitch, band balance and reserved timbre slots
    Impact,
    /// Statistics of the flattened mel spectrogram
    MelStatistics,
}

impl FeatureCategory {
    pub fn label(&self) -> &'static str {
        match self {
            FeatureCategory::Mfcc => "MFCC",
            FeatureCategory::Spectral => "Spectral",
            FeatureCategory::Energy => "Energy",
            FeatureCategory::Rhythm => "Rhythm",
            FeatureCategory::Impact => "Impact",
            FeatureCategory::MelStatistics => "Mel statistics",
        }
    }
}

/// One named position of the feature vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureSlot {
    pub name: &'static str,
    pub category: FeatureCategory,
    /// `false` for placeholders that are always emitted as 0.0
    pub implemented: bool,
}

const fn slot(name: &'static str, category: FeatureCategory) -> FeatureSlot {
    FeatureSlot {
        name,
        category,
        implemented: true,
    }
}

const fn placeholder(name: &'static str, category: FeatureCategory) -> FeatureSlot {
    FeatureSlot {
        name,
        category,
        implemented: false,
    }
}

use FeatureCategory::{Energy, Impact, MelStatistics, Mfcc, Rhythm, Spectral};

/// Canonical slot layout. Consumers index the vector positionally, so
/// entries are only ever appended, never reordered.
pub static FEATURE_SLOTS: [FeatureSlot; FEATURE_COUNT] = [
    // 0..13
    slot("mfcc_0", Mfcc),
    slot("mfcc_1", Mfcc),
    slot("mfcc_2", Mfcc),
    slot("mfcc_3", Mfcc),
    slot("mfcc_4", Mfcc),
    slot("mfcc_5", Mfcc),
    slot("mfcc_6", Mfcc),
    slot("mfcc_7", Mfcc),
    slot("mfcc_8", Mfcc),
    slot("mfcc_9", Mfcc),
    slot("mfcc_10", Mfcc),
    slot("mfcc_11", Mfcc),
    slot("mfcc_12", Mfcc),
    // 13..20
    slot("spectral_centroid", Spectral),
    slot("spectral_bandwidth", Spectral),
    slot("spectral_contrast", Spectral),
    slot("spectral_flatness", Spectral),
    slot("spectral_rolloff", Spectral),
    slot("spectral_entropy", Spectral),
    slot("zero_crossing_rate", Spectral),
    // 20..24
    slot("rms_energy", Energy),
    slot("peak_amplitude", Energy),
    slot("dynamic_range", Energy),
    slot("energy_entropy", Energy),
    // 24..27
    placeholder("tempo", Rhythm),
    placeholder("beat_strength", Rhythm),
    slot("onset_strength_mean", Rhythm),
    // 27..35
    placeholder("attack_time", Impact),
    placeholder("decay_time", Impact),
    placeholder("sustain_level", Impact),
    placeholder("release_time", Impact),
    placeholder("brightness", Impact),
    placeholder("roughness", Impact),
    placeholder("hollowness", Impact),
    placeholder("resonance_damping", Impact),
    // 35..51
    slot("mel_mean", MelStatistics),
    slot("mel_std", MelStatistics),
    slot("mel_min", MelStatistics),
    slot("mel_max", MelStatistics),
    slot("mel_median", MelStatistics),
    slot("mel_q25", MelStatistics),
    slot("mel_q75", MelStatistics),
    slot("mel_skewness", MelStatistics),
    slot("mel_kurtosis", MelStatistics),
    slot("mel_energy", MelStatistics),
    slot("mel_entropy", MelStatistics),
    slot("mel_rms", MelStatistics),
    slot("mel_peak", MelStatistics),
    slot("mel_crest_factor", MelStatistics),
    slot("mel_spectral_slope", MelStatistics),
    slot("mel_harmonic_mean", MelStatistics),
    // 51..53
    slot("fundamental_frequency", Impact),
    slot("sub_band_energy_ratio", Impact),
];

/// Slot names in vector order
pub fn feature_names() -> impl Iterator<Item = &'static str> {
    FEATURE_SLOTS.iter().map(|slot| slot.name)
}

/// Position of a named slot
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_SLOTS.iter().position(|slot| slot.name == name)
}

/// Assembled 53-value descriptor vector
///
/// Created once per analyzed recording and immutable afterwards. No names
/// travel with the values; use [`FEATURE_SLOTS`] to interpret positions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector {
    values: Vec<f32>,
}

impl FeatureVector {
    /// Wrap assembled values
    ///
    /// # Panics
    /// If `values` does not hold exactly [`FEATURE_COUNT`] entries. A
    /// miscounted vector would silently shift every downstream index.
    pub fn from_values(values: Vec<f32>) -> Self {
        assert_eq!(
            values.len(),
            FEATURE_COUNT,
            "feature assembler produced {} values, expected {}",
            values.len(),
            FEATURE_COUNT
        );
        Self { values }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a named slot
    pub fn get(&self, name: &str) -> Option<f32> {
        feature_index(name).map(|index| self.values[index])
    }

    /// Mean MFCCs (slots 0..13)
    pub fn mfcc(&self) -> &[f32] {
        &self.values[..N_MFCC]
    }

    /// Pair each value with its slot descriptor
    pub fn named(&self) -> impl Iterator<Item = (&'static FeatureSlot, f32)> + '_ {
        FEATURE_SLOTS.iter().zip(self.values.iter().copied())
    }
}

impl std::ops::Index<usize> for FeatureVector {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.values[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_slot_table_layout() {
        let count = |category| {
            FEATURE_SLOTS
                .iter()
                .filter(|slot| slot.category == category)
                .count()
        };
        assert_eq!(count(Mfcc), 13);
        assert_eq!(count(Spectral), 7);
        assert_eq!(count(Energy), 4);
        assert_eq!(count(Rhythm), 3);
        assert_eq!(count(Impact), 10);
        assert_eq!(count(MelStatistics), 16);

        let placeholders = FEATURE_SLOTS.iter().filter(|slot| !slot.implemented).count();
        assert_eq!(placeholders, 10, "2 rhythm + 8 impact placeholders");
    }

    #[test]
    fn test_slot_names_are_unique() {
        let names: HashSet<&str> = feature_names().collect();
        assert_eq!(names.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_contract_positions() {
        assert_eq!(feature_index("mfcc_0"), Some(0));
        assert_eq!(feature_index("spectral_centroid"), Some(13));
        assert_eq!(feature_index("rms_energy"), Some(20));
        assert_eq!(feature_index("onset_strength_mean"), Some(26));
        assert_eq!(feature_index("mel_mean"), Some(35));
        assert_eq!(feature_index("fundamental_frequency"), Some(51));
        assert_eq!(feature_index("sub_band_energy_ratio"), Some(52));
        assert_eq!(feature_index("no_such_feature"), None);
    }

    #[test]
    fn test_feature_vector_accessors() {
        let values: Vec<f32> = (0..FEATURE_COUNT).map(|i| i as f32).collect();
        let vector = FeatureVector::from_values(values);
        assert_eq!(vector.len(), FEATURE_COUNT);
        assert_eq!(vector.get("rms_energy"), Some(20.0));
        assert_eq!(vector[52], 52.0);
        assert_eq!(vector.mfcc().len(), N_MFCC);
        assert_eq!(vector.named().count(), FEATURE_COUNT);
    }

    #[test]
    #[should_panic(expected = "expected 53")]
    fn test_feature_vector_rejects_wrong_length() {
        FeatureVector::from_values(vec![0.0; 52]);
    }

    #[test]
    fn test_spectrogram_shape() {
        let spec = Spectrogram::from_frames(vec![vec![1.0, 2.0], vec![3.0, 4.0]], 2);
        assert_eq!(spec.n_frames(), 2);
        assert_eq!(spec.n_bins(), 2);
        assert_eq!(spec.flatten(), vec![1.0, 2.0, 3.0, 4.0]);

        let empty = Spectrogram::empty(1024);
        assert!(empty.is_empty());
        assert_eq!(empty.n_bins(), 1024);
        assert!(empty.flatten().is_empty());
    }
}
