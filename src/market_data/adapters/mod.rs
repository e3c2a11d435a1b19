// Shared trait + events for quote stream adapters

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// What a subscription delivers, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Connected,
    // Raw text frame, normalised by the consumer
    Message(String),
    Disconnected { reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("unknown symbol {0:?}")]
    UnknownSymbol(String),
    /// The adapter cannot open a stream at all, e.g. a misconfigured endpoint.
    #[error("subscription failed: {0}")]
    Subscribe(String),
}

/// Live handle on one symbol's stream. Dropping it closes the stream.
pub struct Subscription {
    symbol: String,
    events: mpsc::Receiver<StreamEvent>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(
        symbol: impl Into<String>,
        events: mpsc::Receiver<StreamEvent>,
        task: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            events,
            task,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.events.recv().await
    }

    /// Stop the reader and discard anything still queued.
    pub fn unsubscribe(mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.events.close();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

#[async_trait::async_trait]
pub trait QuoteSource: Send + Sync {
    /// Open a stream for `symbol`. Connection problems after this returns are
    /// reported through `StreamEvent::Disconnected`.
    async fn subscribe(&self, symbol: &str) -> Result<Subscription, StreamError>;
}

pub mod binance;
pub mod binance_types;
