// Binance bookTicker adapter: one websocket per subscribed symbol

use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use super::{QuoteSource, StreamError, StreamEvent, Subscription};
use crate::market_data::catalog;

pub const DEFAULT_WS_BASE_URL: &str = "wss://stream.binance.com:9443/ws";

const CHANNEL_CAPACITY: usize = 1024;
const RECONNECT_INITIAL_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct BinanceAdapter {
    pub ws_base_url: String, // "wss://stream.binance.com:9443/ws"
    pub reconnect: bool,
    pub reconnect_max_delay: Duration,
}

impl Default for BinanceAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_WS_BASE_URL)
    }
}

impl BinanceAdapter {
    pub fn new(ws_base_url: &str) -> Self {
        Self {
            ws_base_url: ws_base_url.trim_end_matches('/').to_string(),
            reconnect: false,
            reconnect_max_delay: Duration::from_secs(30),
        }
    }

    pub fn with_reconnect(mut self, enabled: bool, max_delay: Duration) -> Self {
        self.reconnect = enabled;
        self.reconnect_max_delay = max_delay;
        self
    }

    pub fn stream_url(&self, symbol: &str) -> String {
        format!("{}/{}@bookTicker", self.ws_base_url, symbol.to_lowercase())
    }

    async fn run(self, url: String, tx: mpsc::Sender<StreamEvent>) {
        let mut delay = RECONNECT_INITIAL_DELAY;
        loop {
            let reason = match stream_book_ticker(&url, &tx, &mut delay).await {
                Some(reason) => reason,
                None => {
                    debug!(%url, "subscriber went away, stopping reader");
                    return;
                }
            };

            warn!(%url, %reason, "bookTicker stream disconnected");
            if tx.send(StreamEvent::Disconnected { reason }).await.is_err() || !self.reconnect {
                return;
            }

            info!(%url, delay_ms = delay.as_millis() as u64, "reconnecting");
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(self.reconnect_max_delay);
        }
    }
}

// Returns the disconnect reason, or None once the subscriber is gone.
async fn stream_book_ticker(
    url: &str,
    tx: &mpsc::Sender<StreamEvent>,
    delay: &mut Duration,
) -> Option<String> {
    let (mut ws_stream, response) = match tokio_tungstenite::connect_async(url).await {
        Ok(connected) => connected,
        Err(e) => return Some(format!("connect failed: {e}")),
    };
    info!(%url, status = %response.status(), "connected to bookTicker stream");
    *delay = RECONNECT_INITIAL_DELAY;
    tx.send(StreamEvent::Connected).await.ok()?;

    // tungstenite queues pong replies for incoming pings on its own
    while let Some(msg) = ws_stream.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                tx.send(StreamEvent::Message(text)).await.ok()?;
            }
            Ok(Message::Close(frame)) => {
                let reason = frame.map(|f| f.reason.to_string()).unwrap_or_default();
                return Some(format!("closed by server {reason}").trim_end().to_string());
            }
            Ok(other) => {
                debug!(kind = ?other, "ignoring non-text frame");
            }
            Err(e) => return Some(format!("read failed: {e}")),
        }
    }
    Some("stream ended".to_string())
}

#[async_trait::async_trait]
impl QuoteSource for BinanceAdapter {
    async fn subscribe(&self, symbol: &str) -> Result<Subscription, StreamError> {
        let instrument = catalog::lookup(symbol)
            .ok_or_else(|| StreamError::UnknownSymbol(symbol.to_string()))?;
        let url = self.stream_url(instrument.symbol);
        if !url.starts_with("ws://") && !url.starts_with("wss://") {
            return Err(StreamError::Subscribe(format!("{url} is not a websocket url")));
        }
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        info!(symbol = instrument.symbol, %url, "subscribing");
        let task = tokio::spawn(self.clone().run(url, tx));
        Ok(Subscription::new(instrument.symbol, rx, Some(task)))
    }
}
