use rand::rngs::StdRng;
use serde::Deserialize;
use tracing::trace;

use crate::audio::ToneGenerator;
use crate::engine::notes::{MappingMode, NoteMapper};
use crate::engine::scheduler::{Playback, PlaybackScheduler, PlaybackState, SidePolicy};
use crate::engine::types::{Effect, Effects, Quote, Side, SideStats, TickDeltas};
use crate::engine::window::RollingStats;

/// How long a side stays highlighted after its price moves, in seconds.
pub const FLASH_DURATION: f64 = 0.5;

/// What counts as a side's signal on each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaPolicy {
    /// Only increases in resting size over the previous quote.
    #[default]
    Difference,
    /// The absolute resting size.
    Raw,
}

/// Size added on `side` since `previous`; shrinking or unchanged sizes give zero.
pub fn delta(current: &Quote, previous: &Quote, side: Side) -> f64 {
    (current.qty(side) - previous.qty(side)).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionOptions {
    pub delta_policy: DeltaPolicy,
    pub mapping: MappingMode,
    pub side_policy: SidePolicy,
}

/// Everything accumulated for the selected instrument. Replaced wholesale
/// on an instrument switch.
///
/// Two baselines are kept. `previous_quote` is the last quote that got past
/// the playback rate limit and is what the audible delta is measured
/// against, so growth on a suppressed tick is still heard on the next one.
/// `last_quote` is the last quote processed at all; statistics and price
/// flashes compare against it so every increase is recorded exactly once.
#[derive(Debug)]
pub struct SessionState {
    symbol: String,
    options: SessionOptions,
    previous_quote: Quote,
    last_quote: Quote,
    stats: RollingStats,
    scheduler: PlaybackScheduler,
    mapper: NoteMapper,
}

impl SessionState {
    pub fn new(symbol: impl Into<String>, options: SessionOptions) -> Self {
        Self::with_scheduler(symbol, options, PlaybackScheduler::new(options.side_policy))
    }

    /// Same as [`SessionState::new`] with a caller-seeded side picker.
    pub fn with_rng(symbol: impl Into<String>, options: SessionOptions, rng: StdRng) -> Self {
        let scheduler = PlaybackScheduler::with_rng(options.side_policy, rng);
        Self::with_scheduler(symbol, options, scheduler)
    }

    fn with_scheduler(
        symbol: impl Into<String>,
        options: SessionOptions,
        scheduler: PlaybackScheduler,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            options,
            previous_quote: Quote::default(),
            last_quote: Quote::default(),
            stats: RollingStats::new(),
            scheduler,
            mapper: NoteMapper::new(options.mapping),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    /// Baseline for the audible delta.
    pub fn previous_quote(&self) -> &Quote {
        &self.previous_quote
    }

    /// Most recently processed quote.
    pub fn last_quote(&self) -> &Quote {
        &self.last_quote
    }

    pub fn stats(&self) -> &RollingStats {
        &self.stats
    }

    pub fn side_stats(&self, side: Side) -> SideStats {
        self.stats.stats(side)
    }

    pub fn playback(&self) -> PlaybackState {
        self.scheduler.state()
    }

    pub fn mapper(&self) -> &NoteMapper {
        &self.mapper
    }

    /// Deltas a note would be chosen from for `quote`.
    pub fn deltas(&self, quote: &Quote) -> TickDeltas {
        self.deltas_since(quote, &self.previous_quote)
    }

    fn deltas_since(&self, quote: &Quote, baseline: &Quote) -> TickDeltas {
        match self.options.delta_policy {
            DeltaPolicy::Difference => TickDeltas {
                bid: delta(quote, baseline, Side::Bid),
                ask: delta(quote, baseline, Side::Ask),
            },
            DeltaPolicy::Raw => TickDeltas {
                bid: quote.bid_qty.max(0.0),
                ask: quote.ask_qty.max(0.0),
            },
        }
    }

    /// Process one quote: flash moved prices, grow both windows, maybe play
    /// one note, then move the baselines forward.
    pub fn on_quote(
        &mut self,
        quote: Quote,
        clock_time: f64,
        generator: &mut dyn ToneGenerator,
    ) -> Effects {
        let mut effects = Effects::new();
        let observed = self.deltas_since(&quote, &self.last_quote);
        let deltas = self.deltas(&quote);

        for side in Side::BOTH {
            if quote.price(side) != self.last_quote.price(side) {
                effects.push(Effect::Flash {
                    side,
                    until: clock_time + FLASH_DURATION,
                });
            }
        }

        // every positive delta is recorded, whether or not it ends up audible
        for side in Side::BOTH {
            let quantity = observed.get(side);
            if self.stats.observe(side, quantity) {
                effects.push(Effect::Observed { side, quantity });
            }
        }

        let outcome = self.scheduler.schedule_playback(
            deltas,
            clock_time,
            &self.stats,
            &self.mapper,
            generator,
        );
        match outcome {
            Playback::Played(note) => effects.push(Effect::Played(note)),
            Playback::Suppressed(side) => effects.push(Effect::Suppressed { side }),
            Playback::Silent | Playback::Failed(_) => {}
        }

        trace!(symbol = %self.symbol, ?deltas, effects = effects.len(), "quote processed");
        if !matches!(outcome, Playback::Suppressed(_)) {
            self.previous_quote = quote;
        }
        self.last_quote = quote;
        effects
    }
}
