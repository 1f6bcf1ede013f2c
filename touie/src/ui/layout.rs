//! Screen layout for the studio TUI

use ratatui::layout::{Constraint, Direction, Flex, Layout, Rect};

/// Areas of the studio screen
pub struct AppLayout {
    pub title_area: Rect,
    pub tabs_area: Rect,
    pub body_area: Rect,
    pub status_bar: Rect,
    pub hotkey_bar: Rect,
}

impl AppLayout {
    pub fn calculate(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Length(1), // Tabs
                Constraint::Min(6),    // Body
                Constraint::Length(1), // Status
                Constraint::Length(1), // Hotkeys
            ])
            .split(area);

        Self {
            title_area: chunks[0],
            tabs_area: chunks[1],
            body_area: chunks[2],
            status_bar: chunks[3],
            hotkey_bar: chunks[4],
        }
    }
}

/// Areas of the creator tab: the idea input above the output panel
pub struct CreatorLayout {
    pub input_area: Rect,
    pub output_area: Rect,
}

impl CreatorLayout {
    pub fn calculate(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(area);

        Self {
            input_area: chunks[0],
            output_area: chunks[1],
        }
    }
}

/// Three equal columns, one per story format
pub fn history_columns(area: Rect) -> [Rect; 3] {
    Layout::horizontal([Constraint::Ratio(1, 3); 3]).areas(area)
}

/// A `width` x `height` rectangle centered in `area`, clamped to fit
pub fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    rect
}
