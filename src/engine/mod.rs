// Sonification core: statistics, note mapping, playback arbitration
pub mod types;      // quotes, sides, effects, errors
pub mod window;     // bounded per-side size windows + population stats
pub mod notes;      // z-score and band note mapping
pub mod scheduler;  // rate limiting and side arbitration
pub mod session;    // per-instrument state and the quote handler
