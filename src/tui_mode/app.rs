use chrono::{DateTime, Utc};
use cybercalc::calc_engine::Step;
use cybercalc::calculator::format_number;
use cybercalc::session::{Reply, Session};
use cybercalc::themes::Theme;
use std::time::{Duration, Instant};

/// How long a status message stays on screen.
pub const FLASH_DURATION: Duration = Duration::from_secs(3);

pub struct HistoryEntry {
    pub input: String,
    pub result: f64,
    pub detailed_steps: Vec<Step>,
    pub detailed_mode: bool,
    pub duration: Duration,
    pub timestamp: DateTime<Utc>,
}

pub struct Flash {
    pub text: String,
    pub is_error: bool,
    pub since: Instant,
}

pub struct App {
    pub session: Session,
    pub input: String,
    pub cursor_position: usize,
    pub input_scroll: usize,
    pub history: Vec<HistoryEntry>,
    pub cursor_history: usize,
    pub should_quit: bool,
    pub show_help: bool,
    pub help_scroll: usize,
    pub list_height: usize,
    pub item_start_indices: Vec<usize>,
    pub history_scroll: usize,
    pub scroll_to_bottom: bool,
    pub terminal_too_small: bool,
    pub flash: Option<Flash>,
}

impl App {
    pub fn new(session: Session) -> Self {
        // Stored newest first, shown oldest first.
        let history: Vec<HistoryEntry> = session
            .history
            .items()
            .iter()
            .rev()
            .map(|item| HistoryEntry {
                input: item.expression.clone(),
                result: item.result,
                detailed_steps: Vec::new(),
                detailed_mode: false,
                duration: Duration::ZERO,
                timestamp: item.timestamp,
            })
            .collect();

        App {
            session,
            input: String::new(),
            cursor_position: 0,
            input_scroll: 0,
            cursor_history: history.len().saturating_sub(1),
            scroll_to_bottom: !history.is_empty(),
            history,
            should_quit: false,
            show_help: false,
            help_scroll: 0,
            list_height: 5,
            item_start_indices: Vec::new(),
            history_scroll: 0,
            terminal_too_small: false,
            flash: None,
        }
    }

    pub fn theme(&self) -> Theme {
        self.session.theme()
    }

    pub fn adjust_input_scroll(&mut self, visible_width: usize) {
        let total_chars = self.input.chars().count();
        let cursor_pos = self.cursor_position;

        if cursor_pos < self.input_scroll {
            self.input_scroll = cursor_pos;
        }
        else if cursor_pos >= self.input_scroll + visible_width {
            self.input_scroll = cursor_pos - visible_width + 1;
        }

        if self.input_scroll > total_chars.saturating_sub(visible_width) {
            self.input_scroll = total_chars.saturating_sub(visible_width);
        }
    }

    pub fn submit(&mut self) {
        let input = self.input.trim().to_string();
        if input.is_empty() {
            return;
        }

        match self.session.submit(&input) {
            Reply::Nothing => {}
            Reply::Quit => self.should_quit = true,
            Reply::Cleared => {
                self.history.clear();
                self.cursor_history = 0;
                self.history_scroll = 0;
                self.clear_input();
            }
            Reply::ShowHelp => {
                self.show_help = true;
                self.clear_input();
            }
            Reply::ThemeChanged(theme) => {
                self.set_flash(format!("Theme: {}", theme), false);
                self.clear_input();
            }
            Reply::Memory(value) => {
                self.set_flash(format!("M = {}", format_number(value)), false);
                self.clear_input();
            }
            Reply::Insert(text) => {
                self.input = text;
                self.cursor_position = self.input.chars().count();
            }
            Reply::Exported { path, count } => {
                self.set_flash(format!("Exported {} entries to {}", count, path.display()), false);
                self.clear_input();
            }
            Reply::Error(message) => self.set_flash(message, true),
            Reply::Evaluated(evaluation) => match evaluation.result {
                Ok(result) => {
                    self.history.push(HistoryEntry {
                        input: evaluation.input,
                        result,
                        detailed_steps: evaluation.steps,
                        detailed_mode: evaluation.detailed,
                        duration: evaluation.duration,
                        timestamp: Utc::now(),
                    });
                    self.cursor_history = self.history.len().saturating_sub(1);
                    self.flash = None;
                    self.clear_input();
                    self.scroll_to_bottom = true;
                }
                // The input stays as typed so it can be fixed.
                Err(message) => self.set_flash(message, true),
            },
        }
    }

    pub fn cycle_theme(&mut self) {
        let theme = self.session.cycle_theme();
        self.set_flash(format!("Theme: {}", theme), false);
    }

    pub fn set_flash(&mut self, text: String, is_error: bool) {
        self.flash = Some(Flash {
            text,
            is_error,
            since: Instant::now(),
        });
    }

    /// Drops the status message once it has been shown long enough.
    pub fn expire_flash(&mut self) {
        if self.flash.as_ref().is_some_and(|f| f.since.elapsed() >= FLASH_DURATION) {
            self.flash = None;
        }
    }

    pub fn insert_text(&mut self, text: &str) {
        let byte_idx = App::char_index_to_byte_index(&self.input, self.cursor_position);
        self.input.insert_str(byte_idx, text);
        self.cursor_position += text.chars().count();
    }

    pub fn move_cursor(&mut self, direction: i32) {
        match direction {
            -1 => self.cursor_position = self.cursor_position.saturating_sub(1),
            1 => self.cursor_position = (self.cursor_position + 1).min(self.input.chars().count()),
            _ => {}
        }
    }

    pub fn move_cursor_by_words(&mut self, direction: i32) {
        let input_chars: Vec<char> = self.input.chars().collect();
        let mut pos = self.cursor_position;

        if direction < 0 {
            while pos > 0 && input_chars[pos - 1].is_whitespace() {
                pos -= 1;
            }
            while pos > 0 && !input_chars[pos - 1].is_whitespace() {
                pos -= 1;
            }
        } else {
            let len = input_chars.len();
            while pos < len && !input_chars[pos].is_whitespace() {
                pos += 1;
            }
            while pos < len && input_chars[pos].is_whitespace() {
                pos += 1;
            }
        }

        self.cursor_position = pos.min(input_chars.len());
    }

    pub fn navigate_history(&mut self, direction: i32) {
        if direction < 0 && self.cursor_history > 0 {
            self.cursor_history -= 1;
        } else if direction > 0 && self.cursor_history < self.history.len().saturating_sub(1) {
            self.cursor_history += 1;
        }

        if self.cursor_history < self.history.len() {
            self.input = self.history[self.cursor_history].input.clone();
        } else {
            self.input.clear();
        }
        self.cursor_position = self.input.chars().count();
        self.input_scroll = 0;
        self.scroll_to_bottom = false;
    }

    pub fn scroll_history(&mut self, direction: i32) {
        let step = self.list_height.saturating_sub(1);
        if direction < 0 {
            self.cursor_history = self.cursor_history.saturating_sub(step);
        } else {
            self.cursor_history = self.cursor_history.saturating_add(step)
                .min(self.history.len().saturating_sub(1));
        }

        if self.cursor_history < self.history.len() {
            self.input = self.history[self.cursor_history].input.clone();
        }
        self.cursor_position = self.input.chars().count();
        self.input_scroll = 0;
        self.scroll_to_bottom = false;
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.cursor_position = 0;
        self.input_scroll = 0;
    }

    pub fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
        s.char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(s.len())
    }
}
