//! Minimal terminal ticker: selected pair, connection status, bid/ask
//! columns that flash when their price moves, and the last note played.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use parking_lot::Mutex;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::engine::types::{PlayedNote, Quote, Side};
use crate::market_data::catalog::Instrument;
use crate::market_data::router::Command;

const FRAME_INTERVAL: Duration = Duration::from_millis(50);
const KEYS_PLAYING: &str = "space: stop   ←/→: instrument   q: quit";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Idle,
    Connecting,
    Connected,
    Disconnected(String),
}

impl ConnectionStatus {
    fn label(&self) -> String {
        match self {
            Self::Idle => "stopped".to_string(),
            Self::Connecting => "connecting…".to_string(),
            Self::Connected => "live".to_string(),
            Self::Disconnected(reason) => format!("disconnected ({reason})"),
        }
    }
}

/// Display state shared between the player and the renderer.
#[derive(Debug, Clone)]
pub struct TickerView {
    pub instrument: &'static Instrument,
    pub status: ConnectionStatus,
    pub playing: bool,
    pub quote: Option<Quote>,
    pub flash_until: [Option<Instant>; 2],
    pub last_note: Option<PlayedNote>,
    pub notes_played: u64,
}

impl TickerView {
    pub fn new(instrument: &'static Instrument) -> Self {
        Self {
            instrument,
            status: ConnectionStatus::Idle,
            playing: false,
            quote: None,
            flash_until: [None; 2],
            last_note: None,
            notes_played: 0,
        }
    }

    pub fn start(&mut self, status: ConnectionStatus) {
        self.playing = true;
        self.status = status;
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.status = ConnectionStatus::Idle;
        self.clear_market();
    }

    pub fn select(&mut self, instrument: &'static Instrument) {
        self.instrument = instrument;
        self.clear_market();
    }

    fn clear_market(&mut self) {
        self.quote = None;
        self.flash_until = [None; 2];
        self.last_note = None;
    }

    pub fn flash(&mut self, side: Side, until: Instant) {
        self.flash_until[side_slot(side)] = Some(until);
    }

    pub fn is_flashing(&self, side: Side, now: Instant) -> bool {
        self.flash_until[side_slot(side)].is_some_and(|until| now < until)
    }
}

fn side_slot(side: Side) -> usize {
    match side {
        Side::Bid => 0,
        Side::Ask => 1,
    }
}

pub fn render(frame: &mut Frame, view: &TickerView, now: Instant) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(frame.size());

    let header = Line::from(format!(
        "♫ MarketMelody  │  {}  │  {}",
        view.instrument.name,
        view.status.label()
    ));
    frame.render_widget(Paragraph::new(header).block(bordered()), rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);
    render_side(frame, columns[0], view, Side::Bid, now);
    render_side(frame, columns[1], view, Side::Ask, now);

    let footer = match (view.playing, view.last_note) {
        (false, _) => "space: start   ←/→: instrument   q: quit".to_string(),
        (true, Some(note)) => format!(
            "last note {:.2} Hz ({} {:.4})  │  {} played  │  {KEYS_PLAYING}",
            note.frequency, note.side, note.quantity, view.notes_played
        ),
        (true, None) => "waiting for the first note…   space: stop   q: quit".to_string(),
    };
    frame.render_widget(Paragraph::new(footer).block(bordered()), rows[2]);
}

fn bordered() -> Block<'static> {
    Block::default().borders(Borders::ALL)
}

fn render_side(frame: &mut Frame, area: Rect, view: &TickerView, side: Side, now: Instant) {
    let (title, color) = match side {
        Side::Bid => ("Bid", Color::Green),
        Side::Ask => ("Ask", Color::Red),
    };
    let lines = match view.quote {
        Some(q) if view.playing => vec![
            Line::from(format!("{:.2}", q.price(side))),
            Line::from(format!("Qty: {:.2}", q.qty(side))),
        ],
        _ => vec![Line::from("—")],
    };
    let mut style = Style::default().fg(color);
    if view.is_flashing(side, now) {
        style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
    }
    let block = bordered().title(title);
    frame.render_widget(Paragraph::new(lines).style(style).block(block), area);
}

fn key_command(code: KeyCode, modifiers: KeyModifiers) -> Option<Command> {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
        KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char(' ') | KeyCode::Enter => Some(Command::Toggle),
        KeyCode::Right | KeyCode::Char(']') => Some(Command::NextSymbol),
        KeyCode::Left | KeyCode::Char('[') => Some(Command::PreviousSymbol),
        _ => None,
    }
}

/// Blocking render/input loop. Returns after sending `Command::Quit` or when
/// the player is gone.
pub fn run_terminal(
    view: std::sync::Arc<Mutex<TickerView>>,
    commands: mpsc::Sender<Command>,
) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = event_loop(&mut terminal, &view, &commands);

    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    view: &Mutex<TickerView>,
    commands: &mpsc::Sender<Command>,
) -> io::Result<()> {
    loop {
        let snapshot = view.lock().clone();
        terminal.draw(|frame| render(frame, &snapshot, Instant::now()))?;

        if !event::poll(FRAME_INTERVAL)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(command) = key_command(key.code, key.modifiers) {
                let quit = command == Command::Quit;
                if commands.blocking_send(command).is_err() || quit {
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::catalog;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_flash_expires() {
        let mut view = TickerView::new(&catalog::CATALOG[0]);
        let now = Instant::now();
        view.flash(Side::Ask, now + Duration::from_millis(500));
        assert!(view.is_flashing(Side::Ask, now));
        assert!(!view.is_flashing(Side::Bid, now));
        assert!(!view.is_flashing(Side::Ask, now + Duration::from_millis(500)));
    }

    #[test]
    fn test_keys() {
        let plain = |code| key_command(code, KeyModifiers::NONE);
        assert_eq!(plain(KeyCode::Char('q')), Some(Command::Quit));
        assert_eq!(plain(KeyCode::Char(' ')), Some(Command::Toggle));
        assert_eq!(plain(KeyCode::Right), Some(Command::NextSymbol));
        assert_eq!(plain(KeyCode::Char('x')), None);
        let ctrl_c = key_command(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(ctrl_c, Some(Command::Quit));
    }

    #[test]
    fn test_render_prices() {
        let mut view = TickerView::new(catalog::lookup("ETHUSDT").unwrap());
        view.start(ConnectionStatus::Connected);
        view.quote = Some(Quote::new(3012.456, 1.5, 3012.5, 0.25));

        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        terminal.draw(|f| render(f, &view, Instant::now())).unwrap();
        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Ethereum (ETH/USDT)"));
        assert!(text.contains("3012.46"));
        assert!(text.contains("Qty: 0.25"));
        assert!(text.contains("live"));
    }
}
