mod app;
mod event;
mod logging;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph};
use tracing::{error, info, warn};

use expandable::config::Config;
use expandable::form::FormController;

use app::App;
use event::{AppEvent, EventHandler};
use logging::LogTarget;
use ui::form_view::FormView;
use ui::theme::Theme;

#[derive(Parser)]
#[command(name = "expandable", version, about = "Terminal form with collapsible row groups")]
struct Cli {
    #[arg(short, long, help = "Descriptor file to load instead of the bundled sample")]
    descriptor: Option<PathBuf>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Print the loaded descriptor document as JSON and exit")]
    dump: bool,

    #[arg(long, help = "Write logs to this file")]
    log_file: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity")]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let target = match (&cli.log_file, cli.dump) {
        (Some(path), _) => LogTarget::File(path.clone()),
        (None, true) => LogTarget::Stderr,
        (None, false) => LogTarget::Off,
    };
    logging::init(target, logging::level_from_verbosity(cli.verbose))?;

    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("ignoring unreadable config file: {e:#}");
        Config::default()
    });
    if let Some(path) = cli.descriptor {
        config.descriptor_path = Some(path);
    }

    let form = FormController::from_config(&config).context("failed to load form descriptors")?;
    info!(sections = form.section_count(), "form ready");

    if cli.dump {
        println!("{}", form.document().to_json()?);
        return Ok(());
    }

    let theme = cli
        .theme
        .as_deref()
        .and_then(Theme::load)
        .unwrap_or_default();
    let mut app = App::new(form, theme);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(250));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        error!("form aborted: {err:#}");
    }
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key)?,
            AppEvent::Tick | AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) -> Result<()> {
    if key.kind != KeyEventKind::Press {
        return Ok(());
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return Ok(());
    }

    if app.editing.is_some() {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Tab => app.finish_editing(),
            KeyCode::Backspace => app.backspace()?,
            KeyCode::Char(ch) => app.type_char(ch)?,
            _ => {}
        }
        return Ok(());
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.move_up(),
        KeyCode::Down | KeyCode::Char('j') => app.move_down(),
        KeyCode::Left | KeyCode::Char('h') => app.adjust(-1)?,
        KeyCode::Right | KeyCode::Char('l') => app.adjust(1)?,
        KeyCode::Enter | KeyCode::Char(' ') => app.activate()?,
        _ => {}
    }
    Ok(())
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    frame.render_widget(FormView::new(app), layout[0]);

    let help = if app.editing.is_some() {
        " type to edit  [Enter/Esc] done"
    } else {
        " [j/k] move  [Enter] select  [h/l] adjust  [q] quit"
    };
    let footer = Paragraph::new(Line::from(help)).style(Style::default().fg(colors.dim()));
    frame.render_widget(footer, layout[1]);
}
