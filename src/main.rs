//! A page-flip book reader for the terminal.
//!
//! Run the binary to open a generated demo book. Hover a page corner to
//! peek the fold, drag it to turn by hand, click or use the arrow keys
//! for an animated turn.

mod app;
mod core;
mod ui;

use std::io::{self, stderr};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    widgets::{Block, Borders, Paragraph},
    Terminal,
};

use crate::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    state::AppState,
};
use crate::core::render::{Orientation, RenderSink};
use crate::core::settings::{Settings, SizeMode};
use crate::ui::{book_widget::BookWidget, content::SampleBook, layout::AppLayout, theme::Theme};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Page-flip book reader for the terminal")]
struct Cli {
    /// Number of pages in the generated demo book.
    #[arg(long, default_value_t = 24)]
    pages: usize,

    /// Force the single-page (portrait) view.
    #[arg(long, conflicts_with = "landscape")]
    portrait: bool,

    /// Force the two-page (landscape) view.
    #[arg(long)]
    landscape: bool,

    /// Lay the first and last pages out as ordinary sheets instead of
    /// stiff covers shown alone.
    #[arg(long = "no-cover")]
    no_cover: bool,

    /// Pretend the book has this many turnable positions, looping the
    /// middle spread to fill the difference.
    #[arg(long = "virtual")]
    virtual_pages: Option<usize>,

    /// Duration of a full page turn, in milliseconds.
    #[arg(long = "flip-ms", default_value_t = 700)]
    flip_ms: u64,

    /// Corner hit zones span diagonal / this divisor.
    #[arg(long, default_value_t = 5.0)]
    corner_divisor: f64,

    /// Duration of the hard-cover hover lift, in milliseconds.
    #[arg(long = "lift-ms", default_value_t = 300)]
    lift_ms: u64,

    /// Disable the hard-cover hover lift.
    #[arg(long = "no-lift")]
    no_lift: bool,

    /// Only turn pages on clicks inside the corner zones.
    #[arg(long = "corner-click-only")]
    corner_click_only: bool,

    /// Fixed page size as COLSxROWS (for example 40x20); stretches to
    /// the terminal when omitted.
    #[arg(long, value_parser = parse_size)]
    size: Option<(u16, u16)>,
}

fn parse_size(raw: &str) -> Result<(u16, u16), String> {
    let (w, h) = raw
        .split_once(&['x', 'X'][..])
        .ok_or_else(|| format!("expected COLSxROWS, got `{raw}`"))?;
    let width = w
        .trim()
        .parse()
        .map_err(|_| format!("bad column count `{w}`"))?;
    let height = h
        .trim()
        .parse()
        .map_err(|_| format!("bad row count `{h}`"))?;
    Ok((width, height))
}

fn settings_from(cli: &Cli) -> Settings {
    Settings {
        flip_duration: Duration::from_millis(cli.flip_ms),
        corner_sensitivity: cli.corner_divisor,
        cover_lift: (!cli.no_lift).then(|| Duration::from_millis(cli.lift_ms)),
        disable_flip_by_click: cli.corner_click_only,
        show_cover: !cli.no_cover,
        total_virtual_pages: cli.virtual_pages.unwrap_or(0),
        size: match cli.size {
            Some((width, height)) => SizeMode::Fixed { width, height },
            None => SizeMode::Stretch,
        },
    }
}

fn status_line(state: &AppState) -> String {
    let orientation = state.view.orientation();
    let position = state.collection.current_position(orientation) + 1;
    let count = state.collection.position_count(orientation);
    let page = state.collection.current_page() + 1;
    let pages = state.collection.page_count();
    format!("page {page}/{pages} | position {position}/{count} | arrows: turn | Home/End: jump | q: quit")
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing (only active when RUST_LOG is set).
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr) // never pollute stdout
        .init();

    let cli = Cli::parse();

    // ── build the book ────────────────────────────────────────
    let settings = settings_from(&cli).validate().context("invalid settings")?;
    let forced = if cli.portrait {
        Some(Orientation::Portrait)
    } else if cli.landscape {
        Some(Orientation::Landscape)
    } else {
        None
    };
    let book = SampleBook::generate(cli.pages);
    let mut state = AppState::new(book, settings, forced).context("could not open the book")?;

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    // Animation frames ride the tick, so keep it around 60 fps.
    let mut events = spawn_event_reader(Duration::from_millis(16));

    // ── event loop ────────────────────────────────────────────
    loop {
        // Draw first so the book is on screen before any input lands.
        terminal.draw(|frame| {
            let layout = AppLayout::from_area(frame.area());

            let book_block = Block::default()
                .title(format!(" {} ", state.book.title()))
                .title_style(Theme::title_style())
                .borders(Borders::ALL)
                .border_style(Theme::border_style());
            frame.render_widget(book_block, layout.book_area);

            if state.view.layout(layout.book_area) {
                // The book moved or switched orientation; any in-flight
                // turn geometry is stale.
                state.flip.reset(&mut state.collection, &mut state.view);
            }
            let orientation = state.view.orientation();
            state.collection.show_spread(orientation, &mut state.view);

            frame.render_widget(
                BookWidget::new(&state.collection, &state.view, &state.book),
                layout.book_area,
            );

            let summary = status_line(&state);
            let text = state.status_message.as_deref().unwrap_or(&summary);
            let status = Paragraph::new(text).style(Theme::status_bar_style());
            frame.render_widget(status, layout.status_area);
        })?;

        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                match event {
                    AppEvent::Key(k) => handler::handle_key(&mut state, k),
                    AppEvent::Mouse(m) => handler::handle_mouse(&mut state, m),
                    AppEvent::Resize(_, _) => {}
                    AppEvent::Tick => {
                        state.flip.tick(
                            &mut state.collection,
                            &mut state.view,
                            Instant::now(),
                        );
                    }
                }
            }
        }

        if state.should_quit {
            break;
        }
    }

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}
