// Router orchestrates quote source + session + tone generator
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::audio::{AudioClock, ToneGenerator, ToneGeneratorFactory, Voice};
use crate::engine::session::{SessionOptions, SessionState};
use crate::engine::types::{Effect, ToneError};
use crate::market_data::adapters::{QuoteSource, StreamError, StreamEvent, Subscription};
use crate::market_data::catalog::{self, Instrument};
use crate::market_data::normaliser;
use crate::market_data::throttle::{ReceiveThrottle, RECEIVE_THROTTLE};
use crate::ui::ticker::{ConnectionStatus, TickerView};

pub type SharedView = Arc<Mutex<TickerView>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Toggle,
    Switch(String),
    NextSymbol,
    PreviousSymbol,
    Quit,
}

#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error(transparent)]
    Stream(#[from] StreamError),
    #[error(transparent)]
    Tone(#[from] ToneError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerConfig {
    pub options: SessionOptions,
    pub voice: Voice,
    pub receive_throttle: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            options: SessionOptions::default(),
            voice: Voice::default(),
            receive_throttle: RECEIVE_THROTTLE,
        }
    }
}

// Everything that only exists while sound is on
struct Running {
    generator: Box<dyn ToneGenerator>,
    subscription: Subscription,
    stream_closed: bool,
    session: SessionState,
    throttle: ReceiveThrottle,
    clock: AudioClock,
}

pub struct Player<S, F> {
    source: S,
    factory: F,
    config: PlayerConfig,
    symbol: &'static str,
    running: Option<Running>,
    view: SharedView,
}

impl<S: QuoteSource, F: ToneGeneratorFactory> Player<S, F> {
    pub fn new(
        source: S,
        factory: F,
        symbol: &str,
        config: PlayerConfig,
    ) -> Result<Self, StreamError> {
        let instrument = lookup(symbol)?;
        let view = Arc::new(Mutex::new(TickerView::new(instrument)));
        Ok(Self {
            source,
            factory,
            config,
            symbol: instrument.symbol,
            running: None,
            view,
        })
    }

    pub fn view(&self) -> SharedView {
        Arc::clone(&self.view)
    }

    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    pub fn is_playing(&self) -> bool {
        self.running.is_some()
    }

    pub fn session(&self) -> Option<&SessionState> {
        self.running.as_ref().map(|r| &r.session)
    }

    /// Create a fresh generator and subscribe to the selected instrument.
    pub async fn start(&mut self) -> Result<(), PlayerError> {
        if self.running.is_some() {
            return Ok(());
        }

        let mut generator = self.factory.create(&self.config.voice)?;
        let subscription = match self.source.subscribe(self.symbol).await {
            Ok(sub) => sub,
            Err(e) => {
                generator.dispose();
                return Err(e.into());
            }
        };

        self.running = Some(Running {
            generator,
            subscription,
            stream_closed: false,
            session: SessionState::new(self.symbol, self.config.options),
            throttle: ReceiveThrottle::new(self.config.receive_throttle),
            clock: AudioClock::start(),
        });
        self.view.lock().start(ConnectionStatus::Connecting);
        metrics::gauge!("melody_playing").set(1.0);
        info!(symbol = self.symbol, "audio started");
        Ok(())
    }

    /// Dispose the generator and close the stream. Nothing queued on the old
    /// subscription is processed afterwards.
    pub fn stop(&mut self) {
        if let Some(mut running) = self.running.take() {
            running.generator.dispose();
            running.subscription.unsubscribe();
            self.view.lock().stop();
            metrics::gauge!("melody_playing").set(0.0);
            info!(symbol = self.symbol, "audio stopped");
        }
    }

    pub async fn toggle(&mut self) -> Result<(), PlayerError> {
        if self.is_playing() {
            self.stop();
            Ok(())
        } else {
            self.start().await
        }
    }

    /// Select another instrument. When playing, the session is replaced with
    /// a fresh one and the stream is redirected; the generator is kept.
    pub async fn switch_instrument(&mut self, symbol: &str) -> Result<(), PlayerError> {
        let instrument = lookup(symbol)?;
        if instrument.symbol == self.symbol {
            return Ok(());
        }

        info!(from = self.symbol, to = instrument.symbol, "switching instrument");
        self.symbol = instrument.symbol;
        self.view.lock().select(instrument);

        let Some(running) = self.running.as_mut() else {
            return Ok(());
        };
        running.session = SessionState::new(instrument.symbol, self.config.options);
        running.throttle = ReceiveThrottle::new(self.config.receive_throttle);

        match self.source.subscribe(instrument.symbol).await {
            Ok(subscription) => {
                // dropping the old handle closes the previous stream
                running.subscription = subscription;
                running.stream_closed = false;
                self.view.lock().status = ConnectionStatus::Connecting;
                Ok(())
            }
            Err(e) => {
                warn!(symbol = instrument.symbol, error = %e, "resubscribe failed, stopping");
                self.stop();
                Err(e.into())
            }
        }
    }

    pub fn handle_event(&mut self, event: StreamEvent) {
        let Some(running) = self.running.as_mut() else {
            return;
        };

        match event {
            StreamEvent::Connected => {
                info!(symbol = self.symbol, "stream connected");
                self.view.lock().status = ConnectionStatus::Connected;
            }
            StreamEvent::Disconnected { reason } => {
                warn!(symbol = self.symbol, %reason, "stream disconnected");
                self.view.lock().status = ConnectionStatus::Disconnected(reason);
            }
            StreamEvent::Message(text) => {
                metrics::counter!("melody_quotes_received").increment(1);
                if !running.throttle.admit(Instant::now()) {
                    metrics::counter!("melody_quotes_throttled").increment(1);
                    return;
                }

                let quote = match normaliser::normalize(&text) {
                    Ok(quote) => quote,
                    Err(e) => {
                        metrics::counter!("melody_quotes_malformed").increment(1);
                        warn!(symbol = self.symbol, error = %e, "dropping malformed quote");
                        return;
                    }
                };

                let now = running.clock.now();
                let effects = running.session.on_quote(quote, now, running.generator.as_mut());
                metrics::counter!("melody_quotes_processed").increment(1);

                let mut view = self.view.lock();
                view.quote = Some(quote);
                for effect in &effects {
                    match *effect {
                        Effect::Flash { side, until } => {
                            view.flash(side, running.clock.instant_at(until))
                        }
                        Effect::Played(note) => {
                            metrics::counter!("melody_notes_played", "side" => note.side.as_str())
                                .increment(1);
                            view.last_note = Some(note);
                            view.notes_played += 1;
                        }
                        Effect::Suppressed { .. } => {
                            metrics::counter!("melody_notes_suppressed").increment(1);
                        }
                        Effect::Observed { .. } => {}
                    }
                }
            }
        }
    }

    pub async fn apply(&mut self, command: Command) -> Result<(), PlayerError> {
        debug!(?command, "command");
        match command {
            Command::Start => self.start().await,
            Command::Stop | Command::Quit => {
                self.stop();
                Ok(())
            }
            Command::Toggle => self.toggle().await,
            Command::Switch(symbol) => self.switch_instrument(&symbol).await,
            Command::NextSymbol => {
                let next = catalog::next(self.symbol);
                self.switch_instrument(next.symbol).await
            }
            Command::PreviousSymbol => {
                let previous = catalog::previous(self.symbol);
                self.switch_instrument(previous.symbol).await
            }
        }
    }

    /// Process commands and stream events one at a time until `Quit` or the
    /// command channel closes.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        loop {
            tokio::select! {
                biased;
                command = commands.recv() => match command {
                    None | Some(Command::Quit) => break,
                    Some(command) => {
                        if let Err(e) = self.apply(command).await {
                            warn!(error = %e, "command failed");
                        }
                    }
                },
                event = next_stream_event(&mut self.running) => {
                    if let Some(event) = event {
                        self.handle_event(event);
                    }
                }
            }
        }
        self.stop();
    }
}

fn lookup(symbol: &str) -> Result<&'static Instrument, StreamError> {
    catalog::lookup(symbol).ok_or_else(|| StreamError::UnknownSymbol(symbol.to_string()))
}

async fn next_stream_event(running: &mut Option<Running>) -> Option<StreamEvent> {
    match running {
        Some(r) if !r.stream_closed => {
            let event = r.subscription.recv().await;
            if event.is_none() {
                debug!(symbol = r.subscription.symbol(), "subscription closed");
                r.stream_closed = true;
            }
            event
        }
        _ => std::future::pending().await,
    }
}
