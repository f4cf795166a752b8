// src/ui/mod.rs

pub mod chat;
pub mod footer;
pub mod header;
pub mod judge_modal;

use crate::{
    api::BackendClient,
    app::{App, AppState},
    config::Config,
    constants::{INPUT_POLL_MS, TICK_RATE_MS},
    errors::ChatResult,
    key_handlers::handle_key,
    models::PromptResponse,
    session::{dispatch, PendingPrompt},
};
use crossterm::{
    event::{self, Event as CEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::{
    io,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;

/// Events delivered to the UI loop.
enum Event {
    Input(CEvent),
    Tick,
    Response(ChatResult<PromptResponse>),
}

/// Runs the terminal UI until the user quits.
pub async fn run_ui(config: &Config) -> ChatResult<()> {
    let client = BackendClient::new(config)?;
    log::info!("Using backend {}", client.prompt_url());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(config.backend_url.clone());
    let res = run_app(&mut terminal, app, client).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    client: BackendClient,
) -> ChatResult<()> {
    let (tx, mut rx) = mpsc::channel::<Event>(100);

    let input_tx = tx.clone();
    tokio::task::spawn_blocking(move || {
        let mut last_tick = Instant::now();
        let tick_rate = Duration::from_millis(TICK_RATE_MS);
        loop {
            match event::poll(Duration::from_millis(INPUT_POLL_MS)) {
                Ok(true) => match event::read() {
                    Ok(event) => {
                        if input_tx.blocking_send(Event::Input(event)).is_err() {
                            return;
                        }
                    }
                    Err(e) => log::warn!("Failed to read terminal event: {}", e),
                },
                Ok(false) => {}
                Err(e) => {
                    log::error!("Terminal polling failed: {}", e);
                    return;
                }
            }

            if last_tick.elapsed() >= tick_rate {
                if input_tx.blocking_send(Event::Tick).is_err() {
                    return;
                }
                last_tick = Instant::now();
            }
        }
    });

    loop {
        terminal.draw(|f| draw(f, &mut app))?;

        let Some(event) = rx.recv().await else {
            break;
        };
        match event {
            Event::Input(CEvent::Key(key)) => {
                if let Some(pending) = handle_key(key, &mut app) {
                    spawn_request(&client, pending, tx.clone());
                }
            }
            Event::Input(_) => {}
            Event::Tick => app.on_tick(),
            Event::Response(outcome) => app.session.resolve(outcome),
        }

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}

fn spawn_request(client: &BackendClient, pending: PendingPrompt, tx: mpsc::Sender<Event>) {
    log::info!("Dispatching prompt ({} chars)", pending.payload().len());
    let client = client.clone();
    tokio::spawn(async move {
        let outcome = dispatch(&client, pending).await;
        if tx.send(Event::Response(outcome)).await.is_err() {
            log::debug!("UI closed before the response arrived");
        }
    });
}

/// Renders one frame.
pub fn draw(f: &mut Frame<'_>, app: &mut App) {
    let input_height = chat::input_height(app, f.area().width);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(input_height),
            Constraint::Length(1),
        ])
        .split(f.area());

    header::draw_header(f, chunks[0], app);
    chat::draw_messages(f, chunks[1], app);
    app.status_indicator.render(f, chunks[2], &app.session);
    chat::draw_input(f, chunks[3], app);
    footer::draw_footer(f, chunks[4], app);

    if app.state == AppState::JudgeModal {
        if let Some(judge) = app.session.last_judged() {
            judge_modal::draw_judge_modal(f, judge, app.modal_scroll);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JudgeResponse;
    use ratatui::backend::TestBackend;

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_draw_shows_transcript_and_status() {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        let mut app = App::new("http://localhost:8000");
        app.session.submit_text("hello").unwrap();

        terminal.draw(|f| draw(f, &mut app)).unwrap();
        let text = screen(&terminal);
        assert!(text.contains("hello"));
        assert!(text.contains("Waiting for response..."));
        assert!(text.contains("http://localhost:8000"));
    }

    #[test]
    fn test_draw_shows_judge_modal() {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        let mut app = App::new("http://localhost:8000");
        app.session.submit_text("q").unwrap();
        app.session.complete(PromptResponse {
            message: "answer".to_string(),
            judge_data: Some(JudgeResponse {
                verdict: "REJECTED".to_string(),
                score: 2.0,
                overall_feedback: "Wrong formula".to_string(),
                recommended_changes: "Use the chain rule".to_string(),
            }),
        });
        app.open_judge_modal();

        terminal.draw(|f| draw(f, &mut app)).unwrap();
        let text = screen(&terminal);
        assert!(text.contains("REJECTED"));
        assert!(text.contains("Wrong formula"));
        assert!(text.contains("Use the chain rule"));
    }
}
