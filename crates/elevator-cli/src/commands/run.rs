use std::io;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{
        self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
        SetTitle,
    },
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use elevator_core::AppConfig;
use elevator_tui::{
    event::{AppEvent, EventHandler},
    input::handle_key_event,
    keymap::Keymap,
    widgets::{PageWidget, StatusBarWidget},
    App,
};

pub async fn run(config: AppConfig) -> Result<()> {
    // Create keymap from config
    let keymap = Keymap::from_config(&config.keymap);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, SetTitle("Elevator"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // The status bar takes the last row
    let (width, height) = terminal::size()?;
    let mut app = App::new(&config, width, height.saturating_sub(1));
    tracing::info!(
        "Demo started ({}x{}), sound on {}",
        width,
        height,
        app.sound_output()
    );

    // Create event handler with animation FPS support
    let event_handler =
        EventHandler::with_animation_fps(config.ui.tick_rate_ms, config.ui.animation_fps);

    // Main loop
    loop {
        // Advance the ride before drawing so each frame shows the new offset
        app.tick();

        // Draw UI
        terminal.draw(|frame| {
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .split(frame.area());

            app.resize(layout[0].width, layout[0].height);
            PageWidget::render(frame, layout[0], &app);
            StatusBarWidget::render(frame, layout[1], &app);
        })?;

        // Handle events (use faster tick rate while a frame is pending)
        let event = if app.is_animating() {
            event_handler.next_animation()?
        } else {
            event_handler.next()?
        };
        if let Some(event) = event {
            match event {
                AppEvent::Key(key) => {
                    let action = handle_key_event(key, &keymap);
                    app.handle_action(action);
                }
                AppEvent::FocusLost => app.focus_lost(),
                AppEvent::FocusGained | AppEvent::Resize(_, _) | AppEvent::Tick => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    // Disables focus reporting before the screen is restored
    drop(app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    tracing::info!("Demo closed");

    Ok(())
}
