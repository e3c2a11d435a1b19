use std::collections::VecDeque;

use tracing::trace;

use crate::engine::types::{Side, SideStats};

pub const MAX_HISTORY_SIZE: usize = 100;

/// Bounded FIFO of positive order sizes, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantityWindow {
    values: VecDeque<f64>,
    stats: SideStats,
}

impl Default for QuantityWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl QuantityWindow {
    pub fn new() -> Self {
        Self {
            values: VecDeque::with_capacity(MAX_HISTORY_SIZE),
            stats: SideStats::default(),
        }
    }

    /// Append a quantity, evicting the oldest one once full, and recompute
    /// the statistics over the whole window. Negative and non-finite values
    /// are rejected and leave the window untouched.
    pub fn push(&mut self, quantity: f64) -> bool {
        if !quantity.is_finite() || quantity < 0.0 {
            return false;
        }
        if self.values.len() >= MAX_HISTORY_SIZE {
            self.values.pop_front();
        }
        self.values.push_back(quantity);
        self.stats = population_stats(self.values.iter().copied());
        true
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn stats(&self) -> SideStats {
        self.stats
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }
}

/// Population (not sample) mean and standard deviation.
pub fn population_stats(values: impl Iterator<Item = f64> + Clone) -> SideStats {
    let mut count = 0usize;
    let mut sum = 0.0;
    for v in values.clone() {
        count += 1;
        sum += v;
    }
    if count == 0 {
        return SideStats::default();
    }
    let n = count as f64;
    let mean = sum / n;
    let variance = values.map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    SideStats::new(mean, variance.sqrt())
}

/// Rolling statistics for both sides of one instrument.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RollingStats {
    bid: QuantityWindow,
    ask: QuantityWindow,
}

impl RollingStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new-order size for `side`. Non-positive and non-finite
    /// quantities are ignored and return `false`.
    pub fn observe(&mut self, side: Side, quantity: f64) -> bool {
        if quantity <= 0.0 {
            return false;
        }
        let window = self.window_mut(side);
        if !window.push(quantity) {
            return false;
        }
        trace!(
            %side,
            quantity,
            len = window.len(),
            mean = window.stats.mean,
            std_dev = window.stats.std_dev,
            "observed"
        );
        true
    }

    pub fn window(&self, side: Side) -> &QuantityWindow {
        match side {
            Side::Bid => &self.bid,
            Side::Ask => &self.ask,
        }
    }

    fn window_mut(&mut self, side: Side) -> &mut QuantityWindow {
        match side {
            Side::Bid => &mut self.bid,
            Side::Ask => &mut self.ask,
        }
    }

    pub fn stats(&self, side: Side) -> SideStats {
        self.window(side).stats()
    }

    pub fn len(&self, side: Side) -> usize {
        self.window(side).len()
    }
}
