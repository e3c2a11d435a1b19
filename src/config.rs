//! Layered settings: defaults, optional `market-melody.toml`, `MELODY_*`
//! environment variables, then command-line overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::audio::{BuiltinSynthFactory, Envelope, OscillatorShape, SynthKind, Voice};
use crate::engine::notes::MappingMode;
use crate::engine::scheduler::SidePolicy;
use crate::engine::session::{DeltaPolicy, SessionOptions};
use crate::market_data::adapters::binance::{BinanceAdapter, DEFAULT_WS_BASE_URL};
use crate::market_data::catalog::{self, DEFAULT_SYMBOL};
use crate::market_data::router::PlayerConfig;

pub const DEFAULT_CONFIG_FILE: &str = "market-melody";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("symbol {0:?} is not in the instrument catalog")]
    UnknownSymbol(String),
    #[error("invalid voice: {0}")]
    InvalidVoice(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub symbol: String,
    pub ws_base_url: String,
    pub delta_policy: DeltaPolicy,
    pub mapping: MappingMode,
    pub side_policy: SidePolicy,
    pub synth: SynthKind,
    pub score_path: PathBuf,
    pub oscillator: OscillatorShape,
    pub base_volume_db: f64,
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
    pub reconnect: bool,
    pub reconnect_max_delay_secs: u64,
    pub log_filter: String,
    pub log_file: PathBuf,
    pub ui: bool,
    pub metrics_port: u16,
}

/// Values given on the command line win over every other source.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub symbol: Option<String>,
    pub delta_policy: Option<String>,
    pub mapping: Option<String>,
    pub side_policy: Option<String>,
    pub synth: Option<String>,
    pub score_path: Option<String>,
    pub oscillator: Option<String>,
    pub reconnect: Option<bool>,
    pub ui: Option<bool>,
}

impl Settings {
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Self, SettingsError> {
        let file_source = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        let voice = Voice::default();

        let settings: Settings = Config::builder()
            .set_default("symbol", DEFAULT_SYMBOL)?
            .set_default("ws_base_url", DEFAULT_WS_BASE_URL)?
            .set_default("delta_policy", "difference")?
            .set_default("mapping", "zscore")?
            .set_default("side_policy", "random")?
            .set_default("synth", "log")?
            .set_default("score_path", "market-melody-score.csv")?
            .set_default("oscillator", voice.shape.as_str())?
            .set_default("base_volume_db", voice.base_volume_db)?
            .set_default("attack", voice.envelope.attack)?
            .set_default("decay", voice.envelope.decay)?
            .set_default("sustain", voice.envelope.sustain)?
            .set_default("release", voice.envelope.release)?
            .set_default("reconnect", false)?
            .set_default("reconnect_max_delay_secs", 30)?
            .set_default("log_filter", "info")?
            .set_default("log_file", "market-melody.log")?
            .set_default("ui", false)?
            .set_default("metrics_port", 9000)?
            .add_source(file_source)
            .add_source(Environment::with_prefix("MELODY").try_parsing(true))
            .set_override_option("symbol", overrides.symbol.clone())?
            .set_override_option("delta_policy", overrides.delta_policy.clone())?
            .set_override_option("mapping", overrides.mapping.clone())?
            .set_override_option("side_policy", overrides.side_policy.clone())?
            .set_override_option("synth", overrides.synth.clone())?
            .set_override_option("score_path", overrides.score_path.clone())?
            .set_override_option("oscillator", overrides.oscillator.clone())?
            .set_override_option("reconnect", overrides.reconnect)?
            .set_override_option("ui", overrides.ui)?
            .build()?
            .try_deserialize()?;

        settings.validated()
    }

    fn validated(mut self) -> Result<Self, SettingsError> {
        let instrument = catalog::lookup(&self.symbol)
            .ok_or_else(|| SettingsError::UnknownSymbol(self.symbol.clone()))?;
        self.symbol = instrument.symbol.to_string();

        for (name, value) in [
            ("attack", self.attack),
            ("decay", self.decay),
            ("release", self.release),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SettingsError::InvalidVoice(format!("{name} = {value}")));
            }
        }
        if !(0.0..=1.0).contains(&self.sustain) {
            let msg = format!("sustain = {} (expected 0..=1)", self.sustain);
            return Err(SettingsError::InvalidVoice(msg));
        }
        if !self.base_volume_db.is_finite() {
            let msg = format!("base_volume_db = {}", self.base_volume_db);
            return Err(SettingsError::InvalidVoice(msg));
        }
        Ok(self)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            delta_policy: self.delta_policy,
            mapping: self.mapping,
            side_policy: self.side_policy,
        }
    }

    pub fn voice(&self) -> Voice {
        Voice {
            envelope: Envelope {
                attack: self.attack,
                decay: self.decay,
                sustain: self.sustain,
                release: self.release,
            },
            shape: self.oscillator,
            base_volume_db: self.base_volume_db,
        }
    }

    pub fn player_config(&self) -> PlayerConfig {
        PlayerConfig {
            options: self.session_options(),
            voice: self.voice(),
            ..PlayerConfig::default()
        }
    }

    pub fn adapter(&self) -> BinanceAdapter {
        let max_delay = Duration::from_secs(self.reconnect_max_delay_secs);
        BinanceAdapter::new(&self.ws_base_url).with_reconnect(self.reconnect, max_delay)
    }

    pub fn synth_factory(&self) -> BuiltinSynthFactory {
        BuiltinSynthFactory {
            kind: self.synth,
            score_path: self.score_path.clone(),
        }
    }
}
