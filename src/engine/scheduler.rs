use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::audio::ToneGenerator;
use crate::engine::notes::NoteMapper;
use crate::engine::types::{PlayedNote, Side, TickDeltas};
use crate::engine::window::RollingStats;

/// Minimum audio-clock gap between two notes, in seconds.
pub const MIN_TIME_BETWEEN_SOUNDS: f64 = 0.125;
pub const NOTE_DURATION: f64 = 0.15;
/// Constant note gain regardless of size.
pub const NOTE_GAIN_DB: f64 = -12.0;

pub fn note_amplitude() -> f64 {
    10f64.powf(NOTE_GAIN_DB / 20.0)
}

/// Who plays when both sides grew on the same tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SidePolicy {
    /// Preferred side, re-drawn uniformly after every contested play.
    #[default]
    Random,
    /// Preferred side, flipped after every contested play.
    Alternate,
    /// The side with the larger delta; ties go to the preferred side.
    Larger,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    pub last_play_time: f64,
    pub next_preferred_side: Side,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            last_play_time: 0.0,
            next_preferred_side: Side::Bid,
        }
    }
}

/// Outcome of one scheduling decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Playback {
    /// Neither side grew.
    Silent,
    /// A side was due but the minimum gap had not elapsed.
    Suppressed(Side),
    /// The tone generator refused the note.
    Failed(Side),
    Played(PlayedNote),
}

#[derive(Debug)]
pub struct PlaybackScheduler {
    state: PlaybackState,
    policy: SidePolicy,
    rng: StdRng,
}

impl PlaybackScheduler {
    pub fn new(policy: SidePolicy) -> Self {
        Self::with_rng(policy, StdRng::from_entropy())
    }

    pub fn with_rng(policy: SidePolicy, rng: StdRng) -> Self {
        Self {
            state: PlaybackState::default(),
            policy,
            rng,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn policy(&self) -> SidePolicy {
        self.policy
    }

    /// Side that would play for these deltas, ignoring the rate limit.
    pub fn choose_side(&self, deltas: TickDeltas) -> Option<Side> {
        match (deltas.bid > 0.0, deltas.ask > 0.0) {
            (false, false) => None,
            (true, false) => Some(Side::Bid),
            (false, true) => Some(Side::Ask),
            (true, true) => Some(match self.policy {
                SidePolicy::Larger if deltas.bid > deltas.ask => Side::Bid,
                SidePolicy::Larger if deltas.ask > deltas.bid => Side::Ask,
                _ => self.state.next_preferred_side,
            }),
        }
    }

    fn random_side(&mut self) -> Side {
        if self.rng.gen_bool(0.5) {
            Side::Bid
        } else {
            Side::Ask
        }
    }

    /// Decide whether a note plays this tick and hand it to `generator`.
    ///
    /// Statistics must already include this tick's deltas. Nothing in the
    /// playback state changes unless the generator accepted the note.
    pub fn schedule_playback(
        &mut self,
        deltas: TickDeltas,
        clock_time: f64,
        stats: &RollingStats,
        mapper: &NoteMapper,
        generator: &mut dyn ToneGenerator,
    ) -> Playback {
        let Some(side) = self.choose_side(deltas) else {
            return Playback::Silent;
        };
        if clock_time - self.state.last_play_time < MIN_TIME_BETWEEN_SOUNDS {
            debug!(
                %side,
                clock_time,
                last = self.state.last_play_time,
                "note suppressed by rate limit"
            );
            return Playback::Suppressed(side);
        }

        let quantity = deltas.get(side);
        let note = mapper.map(side, quantity, stats.stats(side), stats.len(side));
        let played = PlayedNote {
            side,
            quantity,
            frequency: note.frequency,
            duration: NOTE_DURATION,
            amplitude: note_amplitude(),
            start_time: clock_time,
        };

        if let Err(e) = generator.play(
            played.frequency,
            played.duration,
            played.start_time,
            played.amplitude,
        ) {
            warn!(%side, frequency = played.frequency, error = %e, "sound playback error");
            return Playback::Failed(side);
        }

        self.state.last_play_time = clock_time;
        if deltas.is_contested() {
            self.state.next_preferred_side = match self.policy {
                SidePolicy::Random => self.random_side(),
                SidePolicy::Alternate => side.opposite(),
                SidePolicy::Larger => self.state.next_preferred_side,
            };
        }
        debug!(%side, quantity, note = note.name, frequency = note.frequency, "note played");
        Playback::Played(played)
    }
}
