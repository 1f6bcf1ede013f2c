//! Color theme and styling for the studio TUI

use ratatui::style::{Color, Modifier, Style};
use touie_core::Category;

/// Studio color theme
#[derive(Debug, Clone)]
pub struct StudioTheme {
    // Base colors
    pub foreground: Color,
    pub border: Color,
    pub border_focused: Color,
    pub accent: Color,

    // Text colors
    pub prompt_text: Color,
    pub story_text: Color,
    pub error_text: Color,
    pub hint_text: Color,

    // One color per story format
    pub pictogram: Color,
    pub audio: Color,
    pub text: Color,
}

impl Default for StudioTheme {
    fn default() -> Self {
        Self {
            foreground: Color::White,
            border: Color::DarkGray,
            border_focused: Color::LightBlue,
            accent: Color::LightYellow,

            prompt_text: Color::Cyan,
            story_text: Color::White,
            error_text: Color::LightRed,
            hint_text: Color::DarkGray,

            pictogram: Color::LightGreen,
            audio: Color::LightMagenta,
            text: Color::LightBlue,
        }
    }
}

impl StudioTheme {
    /// Style for story text
    pub fn story_style(&self) -> Style {
        Style::default().fg(self.story_text)
    }

    /// Style for what the user typed
    pub fn prompt_style(&self) -> Style {
        Style::default()
            .fg(self.prompt_text)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn error_style(&self) -> Style {
        Style::default()
            .fg(self.error_text)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for placeholders and hints
    pub fn hint_style(&self) -> Style {
        Style::default()
            .fg(self.hint_text)
            .add_modifier(Modifier::DIM)
    }

    pub fn category_color(&self, category: Category) -> Color {
        match category {
            Category::Pictogram => self.pictogram,
            Category::Audio => self.audio,
            Category::Text => self.text,
        }
    }

    /// Style for a result heading
    pub fn heading_style(&self, category: Category) -> Style {
        Style::default()
            .fg(self.category_color(category))
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.border_focused
        } else {
            self.border
        })
    }

    pub fn title_style(&self, focused: bool) -> Style {
        let style = Style::default().fg(if focused {
            self.accent
        } else {
            self.foreground
        });

        if focused {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }
}
