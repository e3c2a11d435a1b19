//! Property-based tests for the statistics window, note mapping and the
//! playback rate limit.
//!
//! Run with: cargo test --test properties

use market_melody::audio::RecordingSynth;
use market_melody::engine::notes::{map_to_note, note_index, NoteMapper, NOTE_SCALE};
use market_melody::engine::scheduler::{
    Playback, PlaybackScheduler, SidePolicy, MIN_TIME_BETWEEN_SOUNDS,
};
use market_melody::engine::types::{Side, SideStats, TickDeltas};
use market_melody::engine::window::{QuantityWindow, RollingStats, MAX_HISTORY_SIZE};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

const N: usize = NOTE_SCALE.len();

fn side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Bid), Just(Side::Ask)]
}

// ============================================================================
// Window properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn window_never_exceeds_capacity(values in prop::collection::vec(0.001..1e6f64, 0..350)) {
        let mut window = QuantityWindow::new();
        for v in &values {
            window.push(*v);
            prop_assert!(window.len() <= MAX_HISTORY_SIZE);
        }
        prop_assert_eq!(window.len(), values.len().min(MAX_HISTORY_SIZE));
    }

    #[test]
    fn window_keeps_most_recent(values in prop::collection::vec(0.001..1e6f64, 101..300)) {
        let mut window = QuantityWindow::new();
        for v in &values {
            window.push(*v);
        }
        let expected = &values[values.len() - MAX_HISTORY_SIZE..];
        let kept: Vec<f64> = window.iter().collect();
        prop_assert_eq!(kept.as_slice(), expected);
    }

    /// Window stats agree with a direct population computation.
    #[test]
    fn stats_match_direct_computation(values in prop::collection::vec(0.001..1e4f64, 1..250)) {
        let mut stats = RollingStats::new();
        for v in &values {
            stats.observe(Side::Ask, *v);
        }
        let tail = &values[values.len().saturating_sub(MAX_HISTORY_SIZE)..];
        let n = tail.len() as f64;
        let mean = tail.iter().sum::<f64>() / n;
        let var = tail.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        let got = stats.stats(Side::Ask);
        let std_dev = var.sqrt();
        prop_assert!(
            (got.mean - mean).abs() <= 1e-9 * mean.abs().max(1.0),
            "mean {} vs {}",
            got.mean,
            mean
        );
        prop_assert!(
            (got.std_dev - std_dev).abs() <= 1e-6 * std_dev.max(1.0),
            "std {} vs {}",
            got.std_dev,
            std_dev
        );
        prop_assert_eq!(stats.len(Side::Bid), 0);
    }
}

// ============================================================================
// Note mapping properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn cold_start_ignores_quantity(
        side in side(),
        qty in 0.0..1e9f64,
        mean in 0.0..1e3f64,
        std_dev in 0.0..1e3f64,
        window in 0usize..2,
    ) {
        let expected = match side {
            Side::Bid => NOTE_SCALE[11].frequency,
            Side::Ask => NOTE_SCALE[3].frequency,
        };
        prop_assert_eq!(map_to_note(side, qty, SideStats { mean, std_dev }, window), expected);
    }

    #[test]
    fn mapped_note_stays_in_side_half(
        side in side(),
        qty in 0.0..1e6f64,
        mean in 0.0..1e3f64,
        std_dev in 0.0..1e3f64,
        window in 2usize..=100,
    ) {
        let index = note_index(side, qty, SideStats { mean, std_dev }, window, N);
        match side {
            Side::Bid => prop_assert!((N / 2..N).contains(&index)),
            Side::Ask => prop_assert!(index < N / 2),
        }
        let freq = map_to_note(side, qty, SideStats { mean, std_dev }, window);
        prop_assert!(NOTE_SCALE.iter().any(|n| n.frequency == freq));
    }

    /// Bigger bids never sound lower; bigger asks never sound higher.
    #[test]
    fn mapping_is_monotonic(
        a in 0.0..1e3f64,
        b in 0.0..1e3f64,
        mean in 0.0..1e3f64,
        std_dev in 0.0..500.0f64,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let stats = SideStats { mean, std_dev };
        let index = |side, qty| note_index(side, qty, stats, 10, N);
        prop_assert!(index(Side::Bid, lo) <= index(Side::Bid, hi));
        prop_assert!(index(Side::Ask, lo) >= index(Side::Ask, hi));
    }
}

// ============================================================================
// Rate limiting
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn close_requests_play_once(
        start in 0.125..1e3f64,
        gap in 0.0..(MIN_TIME_BETWEEN_SOUNDS - 1e-6),
        bid in 0.0..10.0f64,
        ask in 0.001..10.0f64,
        seed in any::<u64>(),
    ) {
        let rng = StdRng::seed_from_u64(seed);
        let mut scheduler = PlaybackScheduler::with_rng(SidePolicy::Random, rng);
        let mut synth = RecordingSynth::default();
        let stats = RollingStats::new();
        let mapper = NoteMapper::default();
        let deltas = TickDeltas { bid, ask };

        let first = scheduler.schedule_playback(deltas, start, &stats, &mapper, &mut synth);
        prop_assert!(matches!(first, Playback::Played(_)));
        let second = scheduler.schedule_playback(deltas, start + gap, &stats, &mapper, &mut synth);
        prop_assert!(matches!(second, Playback::Suppressed(_)));
        prop_assert_eq!(synth.notes.len(), 1);
    }
}
