// Market data module entrypoint
pub mod adapters;    // venue-specific streams (Binance bookTicker)
pub mod normaliser;  // converts wire strings -> quotes
pub mod catalog;     // selectable trading pairs
pub mod throttle;    // receive-side rate limit
pub mod router;      // player lifecycle + event loop
