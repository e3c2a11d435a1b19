use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// One side of the top of book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Bid,
    Ask,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Bid, Side::Ask];

    pub fn opposite(self) -> Side {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Bid => "bid",
            Side::Ask => "ask",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Best bid/ask snapshot, already parsed from the wire decimal strings.
/// Values are only used for perceptual mapping, so `f64` is enough.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Quote {
    pub bid_price: f64,
    pub bid_qty: f64,
    pub ask_price: f64,
    pub ask_qty: f64,
}

impl Quote {
    pub fn new(bid_price: f64, bid_qty: f64, ask_price: f64, ask_qty: f64) -> Self {
        Self {
            bid_price,
            bid_qty,
            ask_price,
            ask_qty,
        }
    }

    pub fn qty(&self, side: Side) -> f64 {
        match side {
            Side::Bid => self.bid_qty,
            Side::Ask => self.ask_qty,
        }
    }

    pub fn price(&self, side: Side) -> f64 {
        match side {
            Side::Bid => self.bid_price,
            Side::Ask => self.ask_price,
        }
    }
}

/// Population mean / standard deviation of one side's window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SideStats {
    pub mean: f64,
    pub std_dev: f64,
}

impl SideStats {
    pub const fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }
}

/// Per-tick size increases, zero when a side did not grow.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickDeltas {
    pub bid: f64,
    pub ask: f64,
}

impl TickDeltas {
    pub fn get(&self, side: Side) -> f64 {
        match side {
            Side::Bid => self.bid,
            Side::Ask => self.ask,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bid <= 0.0 && self.ask <= 0.0
    }

    pub fn is_contested(&self) -> bool {
        self.bid > 0.0 && self.ask > 0.0
    }
}

/// A note that was handed to the tone generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayedNote {
    pub side: Side,
    pub quantity: f64,
    pub frequency: f64,
    pub duration: f64,
    pub amplitude: f64,
    pub start_time: f64,
}

/// Side effects of processing one quote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// A positive delta was added to the side's window.
    Observed { side: Side, quantity: f64 },
    /// The side's price moved; highlight it until `until` (audio clock seconds).
    Flash { side: Side, until: f64 },
    Played(PlayedNote),
    /// A note was due but the minimum gap had not elapsed.
    Suppressed { side: Side },
}

pub type Effects = SmallVec<[Effect; 6]>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedQuoteError {
    #[error("message is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` is not a decimal: {value:?}")]
    NotDecimal { field: &'static str, value: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ToneError {
    #[error("tone generator unavailable: {0}")]
    Unavailable(String),
    #[error("tone generator already disposed")]
    Disposed,
    #[error("score i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("score write failure: {0}")]
    Csv(#[from] csv::Error),
}
