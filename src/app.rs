use crate::session::ChatSession;
use crate::status_indicator::StatusIndicator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Chat,
    JudgeModal,
    Quit,
}

/// Everything the terminal view needs between frames.
#[derive(Debug)]
pub struct App {
    pub state: AppState,
    pub session: ChatSession,
    pub status_indicator: StatusIndicator,
    pub backend_url: String,
    pub chat_scroll: u16,
    pub modal_scroll: u16,
    follow_tail: bool,
    seen_revision: u64,
}

impl App {
    pub fn new(backend_url: impl Into<String>) -> App {
        App {
            state: AppState::Chat,
            session: ChatSession::new(),
            status_indicator: StatusIndicator::new(),
            backend_url: backend_url.into(),
            chat_scroll: 0,
            modal_scroll: 0,
            follow_tail: true,
            seen_revision: 0,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.state == AppState::Quit
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
        self.follow_tail = false;
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    /// Clamps the transcript scroll for this frame. Any change to the message
    /// list snaps the view back to the bottom.
    pub fn sync_scroll(&mut self, total_lines: usize, viewport: u16) -> u16 {
        let revision = self.session.revision();
        if revision != self.seen_revision {
            self.seen_revision = revision;
            self.follow_tail = true;
        }

        let max_scroll = u16::try_from(total_lines.saturating_sub(viewport as usize))
            .unwrap_or(u16::MAX);
        if self.follow_tail || self.chat_scroll >= max_scroll {
            self.chat_scroll = max_scroll;
            self.follow_tail = true;
        }
        self.chat_scroll
    }

    pub fn on_tick(&mut self) {
        if self.session.is_waiting() {
            self.status_indicator.update_spinner();
        }
    }

    pub fn open_judge_modal(&mut self) -> bool {
        if self.session.last_judged().is_none() {
            return false;
        }
        self.state = AppState::JudgeModal;
        self.modal_scroll = 0;
        true
    }

    pub fn close_modal(&mut self) {
        self.state = AppState::Chat;
    }
}
