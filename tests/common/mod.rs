//! Shared fixtures: an in-memory quote source and a counting generator factory.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use market_melody::audio::{RecordedNote, ToneGenerator, ToneGeneratorFactory, Voice};
use market_melody::engine::types::ToneError;
use market_melody::market_data::adapters::{QuoteSource, StreamError, StreamEvent, Subscription};
use market_melody::market_data::catalog;

/// Hands out channel-backed subscriptions; tests push frames through the senders.
#[derive(Clone, Default)]
pub struct ChannelSource {
    senders: Arc<Mutex<Vec<(String, mpsc::Sender<StreamEvent>)>>>,
}

impl ChannelSource {
    pub fn subscriptions(&self) -> Vec<String> {
        self.senders.lock().iter().map(|(s, _)| s.clone()).collect()
    }

    /// Sender of the most recent subscription to `symbol`.
    pub fn sender(&self, symbol: &str) -> mpsc::Sender<StreamEvent> {
        self.senders
            .lock()
            .iter()
            .rev()
            .find(|(s, _)| s == symbol)
            .map(|(_, tx)| tx.clone())
            .expect("symbol was never subscribed")
    }
}

#[async_trait::async_trait]
impl QuoteSource for ChannelSource {
    async fn subscribe(&self, symbol: &str) -> Result<Subscription, StreamError> {
        let instrument = catalog::lookup(symbol)
            .ok_or_else(|| StreamError::UnknownSymbol(symbol.to_string()))?;
        let (tx, rx) = mpsc::channel(64);
        self.senders.lock().push((instrument.symbol.to_string(), tx));
        Ok(Subscription::new(instrument.symbol, rx, None))
    }
}

#[derive(Clone, Default)]
pub struct CountingFactory {
    pub created: Arc<AtomicUsize>,
    pub disposed: Arc<AtomicUsize>,
    pub notes: Arc<Mutex<Vec<RecordedNote>>>,
}

impl CountingFactory {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn disposed(&self) -> usize {
        self.disposed.load(Ordering::SeqCst)
    }

    pub fn notes(&self) -> Vec<RecordedNote> {
        self.notes.lock().clone()
    }
}

struct SharedSynth {
    disposed: bool,
    disposed_count: Arc<AtomicUsize>,
    notes: Arc<Mutex<Vec<RecordedNote>>>,
}

impl ToneGenerator for SharedSynth {
    fn play(
        &mut self,
        frequency: f64,
        duration: f64,
        start_time: f64,
        amplitude: f64,
    ) -> Result<(), ToneError> {
        if self.disposed {
            return Err(ToneError::Disposed);
        }
        self.notes.lock().push(RecordedNote {
            frequency,
            duration,
            start_time,
            amplitude,
        });
        Ok(())
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.disposed_count.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl ToneGeneratorFactory for CountingFactory {
    fn create(&self, _voice: &Voice) -> Result<Box<dyn ToneGenerator>, ToneError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SharedSynth {
            disposed: false,
            disposed_count: Arc::clone(&self.disposed),
            notes: Arc::clone(&self.notes),
        }))
    }
}

pub fn book_ticker(bid_price: &str, bid_qty: &str, ask_price: &str, ask_qty: &str) -> StreamEvent {
    StreamEvent::Message(format!(
        r#"{{"u":1,"s":"BTCUSDT","b":"{bid_price}","B":"{bid_qty}",
             "a":"{ask_price}","A":"{ask_qty}"}}"#
    ))
}
