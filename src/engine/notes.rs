//! Quantity to pitch mapping.
//!
//! The default mapping normalises a size into a z-score against the side's
//! rolling window and picks a note from one half of [`NOTE_SCALE`]: the upper
//! half for bids, the lower half (inverted) for asks. The band mapping is the
//! older fixed-threshold scheme over a ten note pentatonic.

use serde::Deserialize;

use crate::engine::types::{Side, SideStats};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub name: &'static str,
    pub frequency: f64,
}

const fn note(name: &'static str, frequency: f64) -> Note {
    Note { name, frequency }
}

/// D minor pentatonic over three octaves, D3 to C6.
pub const NOTE_SCALE: [Note; 15] = [
    note("D3", 146.83),
    note("F3", 174.61),
    note("G3", 196.00),
    note("A3", 220.00),
    note("C4", 261.63),
    note("D4", 293.66),
    note("F4", 349.23),
    note("G4", 392.00),
    note("A4", 440.00),
    note("C5", 523.25),
    note("D5", 587.33),
    note("F5", 698.46),
    note("G5", 783.99),
    note("A5", 880.00),
    note("C6", 1046.50),
];

/// A minor pentatonic, A3 to G5, used by the band mapping.
pub const BAND_SCALE: [Note; 10] = [
    note("A3", 220.00),
    note("C4", 261.63),
    note("D4", 293.66),
    note("E4", 329.63),
    note("G4", 392.00),
    note("A4", 440.00),
    note("C5", 523.25),
    note("D5", 587.33),
    note("E5", 659.25),
    note("G5", 783.99),
];

const Z_CLAMP: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingMode {
    #[default]
    ZScore,
    Bands,
}

/// Index into `scale_len` notes for a size on `side`.
///
/// With fewer than two observations the statistics carry no information, so
/// the side's fixed fallback note is used.
pub fn note_index(
    side: Side,
    quantity: f64,
    stats: SideStats,
    window_size: usize,
    scale_len: usize,
) -> usize {
    let half = scale_len / 2;
    if window_size < 2 {
        let fallback = match side {
            Side::Bid => 0.75,
            Side::Ask => 0.25,
        };
        return (fallback * scale_len as f64).floor() as usize;
    }

    let std_dev = if stats.std_dev == 0.0 {
        1.0
    } else {
        stats.std_dev
    };
    let z = ((quantity - stats.mean) / std_dev).clamp(-Z_CLAMP, Z_CLAMP);
    let t = (z + Z_CLAMP) / (2.0 * Z_CLAMP);

    match side {
        Side::Bid => {
            let offset = (t * (scale_len - half) as f64).floor() as usize;
            (half + offset).clamp(half, scale_len - 1)
        }
        Side::Ask => {
            let index = ((1.0 - t) * half as f64).floor() as usize;
            index.min(half.saturating_sub(1))
        }
    }
}

/// Frequency for a size on `side`, always one of [`NOTE_SCALE`].
pub fn map_to_note(side: Side, quantity: f64, stats: SideStats, window_size: usize) -> f64 {
    NOTE_SCALE[note_index(side, quantity, stats, window_size, NOTE_SCALE.len())].frequency
}

/// Fixed-threshold index into [`BAND_SCALE`]; side and history are ignored.
pub fn band_index(quantity: f64) -> usize {
    let index: i64 = if quantity < 0.1 {
        (quantity * 20.0).floor() as i64 % 2
    } else if quantity < 1.0 {
        (quantity * 4.0).floor() as i64 % 4
    } else if quantity < 10.0 {
        2 + (quantity.log2() * 2.0).floor() as i64
    } else if quantity < 100.0 {
        5 + quantity.log10().floor() as i64
    } else {
        8
    };
    index.clamp(0, BAND_SCALE.len() as i64 - 1) as usize
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoteMapper {
    mode: MappingMode,
}

impl NoteMapper {
    pub fn new(mode: MappingMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> MappingMode {
        self.mode
    }

    pub fn map(&self, side: Side, quantity: f64, stats: SideStats, window_size: usize) -> Note {
        match self.mode {
            MappingMode::ZScore => {
                NOTE_SCALE[note_index(side, quantity, stats, window_size, NOTE_SCALE.len())]
            }
            MappingMode::Bands => BAND_SCALE[band_index(quantity)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WARM: usize = 10;

    #[test]
    fn test_scale_is_ascending() {
        assert_eq!(NOTE_SCALE[0].frequency, 146.83);
        assert_eq!(NOTE_SCALE[14].frequency, 1046.50);
        assert!(NOTE_SCALE.windows(2).all(|w| w[0].frequency < w[1].frequency));
    }

    #[test]
    fn test_cold_start_fallbacks() {
        let stats = SideStats::new(50.0, 3.0);
        for qty in [0.001, 1.0, 1e9] {
            assert_eq!(note_index(Side::Bid, qty, stats, 0, 15), 11);
            assert_eq!(note_index(Side::Ask, qty, stats, 1, 15), 3);
        }
        assert_eq!(map_to_note(Side::Bid, 7.0, stats, 1), 698.46);
        assert_eq!(map_to_note(Side::Ask, 7.0, stats, 0), 220.00);
    }

    #[test]
    fn test_bid_one_sigma_above_mean() {
        // z = 1, t = 0.75, index = 7 + floor(0.75 * 8) = 13
        let stats = SideStats::new(1.0, 1.0);
        assert_eq!(note_index(Side::Bid, 2.0, stats, WARM, 15), 13);
        assert_eq!(map_to_note(Side::Bid, 2.0, stats, WARM), 880.00);
    }

    #[test]
    fn test_saturation_stays_in_half() {
        let stats = SideStats::new(1.0, 1.0);
        assert_eq!(note_index(Side::Bid, 1e6, stats, WARM, 15), 14);
        assert_eq!(note_index(Side::Bid, -1e6, stats, WARM, 15), 7);
        assert_eq!(note_index(Side::Ask, 1e6, stats, WARM, 15), 0);
        assert_eq!(note_index(Side::Ask, -1e6, stats, WARM, 15), 6);
    }

    #[test]
    fn test_zero_std_dev_uses_unit_denominator() {
        let stats = SideStats::new(5.0, 0.0);
        // at the mean: t = 0.5
        assert_eq!(note_index(Side::Bid, 5.0, stats, WARM, 15), 11);
        assert_eq!(note_index(Side::Ask, 5.0, stats, WARM, 15), 3);
        // one unit above: z = 1
        assert_eq!(note_index(Side::Bid, 6.0, stats, WARM, 15), 13);
    }

    #[test]
    fn test_bigger_asks_sound_lower() {
        let stats = SideStats::new(10.0, 2.0);
        let small = note_index(Side::Ask, 7.0, stats, WARM, 15);
        let large = note_index(Side::Ask, 13.0, stats, WARM, 15);
        assert!(large < small);
    }

    #[test]
    fn test_band_mapping() {
        assert_eq!(band_index(0.01), 0);
        assert_eq!(band_index(0.06), 1);
        assert_eq!(band_index(0.3), 1);
        assert_eq!(band_index(1.0), 2);
        assert_eq!(band_index(4.0), 6);
        assert_eq!(band_index(9.9), 8);
        assert_eq!(band_index(50.0), 6);
        assert_eq!(band_index(5000.0), 8);
        let mapper = NoteMapper::new(MappingMode::Bands);
        let note = mapper.map(Side::Ask, 4.0, SideStats::default(), 0);
        assert_eq!(note.name, "C5");
    }
}
