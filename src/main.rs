use std::path::PathBuf;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info};

use market_melody::config::{Overrides, Settings};
use market_melody::market_data::catalog;
use market_melody::market_data::router::{Command, Player};
use market_melody::{telemetry, ui};

/// Listen to a trading pair's top of book.
#[derive(Debug, Parser)]
#[command(name = "market-melody", version)]
struct Cli {
    /// Settings file (defaults to ./market-melody.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Trading pair, e.g. BTCUSDT
    #[arg(long)]
    symbol: Option<String>,
    /// difference | raw
    #[arg(long)]
    delta_policy: Option<String>,
    /// zscore | bands
    #[arg(long)]
    mapping: Option<String>,
    /// random | alternate | larger
    #[arg(long)]
    side_policy: Option<String>,
    /// log | score
    #[arg(long)]
    synth: Option<String>,
    #[arg(long)]
    score_path: Option<String>,
    /// sine | triangle | square | sawtooth
    #[arg(long)]
    oscillator: Option<String>,
    /// Reconnect with backoff when the stream drops
    #[arg(long)]
    reconnect: bool,
    /// Show the terminal ticker
    #[arg(long)]
    ui: bool,
    /// Print the instrument catalog and exit
    #[arg(long)]
    list: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            symbol: self.symbol.clone(),
            delta_policy: self.delta_policy.clone(),
            mapping: self.mapping.clone(),
            side_policy: self.side_policy.clone(),
            synth: self.synth.clone(),
            score_path: self.score_path.clone(),
            oscillator: self.oscillator.clone(),
            reconnect: self.reconnect.then_some(true),
            ui: self.ui.then_some(true),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok(); // load .env
    let cli = Cli::parse();

    if cli.list {
        for instrument in catalog::CATALOG {
            println!(
                "{:<10} {:<5} {}",
                instrument.symbol, instrument.group, instrument.name
            );
        }
        return Ok(());
    }

    let settings = Settings::load(cli.config.as_deref(), &cli.overrides())?;
    let log_file = settings.ui.then_some(settings.log_file.as_path());
    telemetry::init_tracing(&settings.log_filter, log_file)?;
    telemetry::init_metrics(settings.metrics_port)?;
    info!(
        symbol = %settings.symbol,
        mapping = ?settings.mapping,
        side_policy = ?settings.side_policy,
        oscillator = settings.oscillator.as_str(),
        "market melody"
    );

    let player = Player::new(
        settings.adapter(),
        settings.synth_factory(),
        &settings.symbol,
        settings.player_config(),
    )?;
    let (tx, rx) = mpsc::channel::<Command>(32);

    if settings.ui {
        let view = player.view();
        // the ticker owns the only sender; closing it ends the player
        let ui_task = tokio::task::spawn_blocking(move || ui::ticker::run_terminal(view, tx));
        player.run(rx).await;
        ui_task.await??;
    } else {
        tx.send(Command::Start).await?;
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for ctrl-c");
            }
            let _ = tx.send(Command::Quit).await;
        });
        player.run(rx).await;
    }

    info!("Goodbye!");
    Ok(())
}
