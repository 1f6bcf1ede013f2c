//! Main application state and logic

use touie_core::render::{self, EMPTY_PROMPT, GENERATING};
use touie_core::{Category, Generation, HistoryRecord, HistorySnapshot, StudioError};

use crate::ui::theme::StudioTheme;

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Welcome,
    Studio,
}

/// Tabs of the studio screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Creator,
    History,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Creator => "Crear",
            Tab::History => "Historial",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Tab::Creator => Tab::History,
            Tab::History => Tab::Creator,
        }
    }
}

/// What the output panel shows
#[derive(Debug, Clone, PartialEq)]
pub enum OutputView {
    /// Nothing generated yet
    Placeholder,
    /// Waiting for the backend
    Loading(Category),
    /// Rendered result, heading first
    Result { category: Category, lines: Vec<String> },
    Error(String),
}

/// Main application state
pub struct App {
    pub screen: Screen,
    pub tab: Tab,
    pub theme: StudioTheme,

    // Input state
    input_buffer: String,
    cursor_position: usize,

    // Output
    pub output: OutputView,
    pub output_scroll: usize,

    // History tab
    pub history: HistorySnapshot,
    pub history_focus: Category,
    pub history_scroll: usize,

    // Status
    status_message: Option<String>,
    pub backend_name: String,
    pub should_quit: bool,

    // Animation
    pub animation_frame: u8,
}

impl App {
    pub fn new(backend_name: impl Into<String>, history: HistorySnapshot) -> Self {
        Self {
            screen: Screen::Welcome,
            tab: Tab::Creator,
            theme: StudioTheme::default(),
            input_buffer: String::new(),
            cursor_position: 0,
            output: OutputView::Placeholder,
            output_scroll: 0,
            history,
            history_focus: Category::Pictogram,
            history_scroll: 0,
            status_message: None,
            backend_name: backend_name.into(),
            should_quit: false,
            animation_frame: 0,
        }
    }

    /// Leave the welcome screen
    pub fn enter_studio(&mut self) {
        self.screen = Screen::Studio;
        self.tab = Tab::Creator;
    }

    pub fn switch_tab(&mut self) {
        self.tab = self.tab.next();
        if self.tab == Tab::History {
            self.history_scroll = 0;
        }
    }

    /// Advance animations
    pub fn tick(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
    }

    pub fn is_generating(&self) -> bool {
        matches!(self.output, OutputView::Loading(_))
    }

    /// Begin a generation. Returns the prompt as typed, or `None` when there
    /// is nothing to send; the output panel explains why.
    pub fn start_generation(&mut self, category: Category) -> Option<String> {
        if self.is_generating() {
            return None;
        }

        if self.input_buffer.trim().is_empty() {
            self.output = OutputView::Error(EMPTY_PROMPT.to_string());
            return None;
        }

        self.output = OutputView::Loading(category);
        self.output_scroll = 0;
        self.set_status(GENERATING);
        Some(self.input_buffer.clone())
    }

    /// Show the outcome of a generation and the refreshed history.
    pub fn finish_generation(
        &mut self,
        category: Category,
        outcome: Result<Generation, StudioError>,
        history: HistorySnapshot,
    ) {
        self.output = match outcome {
            Ok(generation) => {
                self.set_status(format!(
                    "{} lista ({})",
                    render::category_title(category),
                    generation.record.date
                ));
                OutputView::Result {
                    category,
                    lines: render::result_lines(&generation),
                }
            }
            Err(e) => {
                self.clear_status();
                OutputView::Error(render::error_message(category, &e))
            }
        };
        self.output_scroll = 0;
        self.history = history;
    }

    /// Records shown in the history column for `category`
    pub fn history_of(&self, category: Category) -> &[HistoryRecord] {
        self.history.all_of(category)
    }

    /// Focus a history column, scrolled to its top
    pub fn focus_history(&mut self, category: Category) {
        self.history_focus = category;
        self.history_scroll = 0;
    }

    pub fn focus_next_history(&mut self) {
        self.focus_history(match self.history_focus {
            Category::Pictogram => Category::Audio,
            Category::Audio => Category::Text,
            Category::Text => Category::Pictogram,
        });
    }

    pub fn focus_prev_history(&mut self) {
        self.focus_history(match self.history_focus {
            Category::Pictogram => Category::Text,
            Category::Audio => Category::Pictogram,
            Category::Text => Category::Audio,
        });
    }

    pub fn scroll_up(&mut self, lines: usize) {
        match self.tab {
            Tab::Creator => self.output_scroll = self.output_scroll.saturating_sub(lines),
            Tab::History => self.history_scroll = self.history_scroll.saturating_sub(lines),
        }
    }

    pub fn scroll_down(&mut self, lines: usize) {
        // Widgets cap the value to what fits
        match self.tab {
            Tab::Creator => self.output_scroll = self.output_scroll.saturating_add(lines),
            Tab::History => self.history_scroll = self.history_scroll.saturating_add(lines),
        }
    }

    // Input editing. The cursor counts characters, not bytes.

    pub fn input_buffer(&self) -> &str {
        &self.input_buffer
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    fn byte_index(&self) -> usize {
        self.input_buffer
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.input_buffer.len())
    }

    pub fn type_char(&mut self, c: char) {
        let index = self.byte_index();
        self.input_buffer.insert(index, c);
        self.cursor_position += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let index = self.byte_index();
            self.input_buffer.remove(index);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor_position < self.input_buffer.chars().count() {
            let index = self.byte_index();
            self.input_buffer.remove(index);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        if self.cursor_position < self.input_buffer.chars().count() {
            self.cursor_position += 1;
        }
    }

    pub fn cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor_position = self.input_buffer.chars().count();
    }

    pub fn clear_input(&mut self) {
        self.input_buffer.clear();
        self.cursor_position = 0;
    }

    // Status line

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}
