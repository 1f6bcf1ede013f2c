//! Event handling for the studio TUI

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};

use touie_core::Category;

use crate::app::{App, Screen, Tab};

/// Result of handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    NeedsRedraw,
    /// Generate a story in this format from the current input
    Generate(Category),
}

/// Handle a terminal event
pub fn handle_event(app: &mut App, event: Event) -> EventResult {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key_event(app, key),
        Event::Mouse(mouse) => handle_mouse_event(app, mouse),
        Event::Resize(_, _) => EventResult::NeedsRedraw,
        _ => EventResult::Continue,
    }
}

fn handle_mouse_event(app: &mut App, mouse: MouseEvent) -> EventResult {
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            app.scroll_up(3);
            EventResult::NeedsRedraw
        }
        MouseEventKind::ScrollDown => {
            app.scroll_down(3);
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent) -> EventResult {
    // Global shortcuts (always work)
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
    {
        return EventResult::Quit;
    }

    match app.screen {
        Screen::Welcome => handle_welcome(app, key),
        Screen::Studio => match app.tab {
            Tab::Creator => handle_creator(app, key),
            Tab::History => handle_history(app, key),
        },
    }
}

fn handle_welcome(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => {
            app.enter_studio();
            EventResult::NeedsRedraw
        }
        KeyCode::Esc | KeyCode::Char('q') => EventResult::Quit,
        _ => EventResult::Continue,
    }
}

/// Generation shortcuts, shared by the creator keys and the hotkey bar.
fn generation_key(key: &KeyEvent) -> Option<Category> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::F(1) => Some(Category::Pictogram),
        KeyCode::F(2) => Some(Category::Audio),
        KeyCode::F(3) => Some(Category::Text),
        KeyCode::Char('p') if ctrl => Some(Category::Pictogram),
        KeyCode::Char('a') if ctrl => Some(Category::Audio),
        KeyCode::Char('t') if ctrl => Some(Category::Text),
        _ => None,
    }
}

fn handle_creator(app: &mut App, key: KeyEvent) -> EventResult {
    if let Some(category) = generation_key(&key) {
        return EventResult::Generate(category);
    }

    match key.code {
        KeyCode::Enter => EventResult::Generate(Category::Text),
        KeyCode::Tab | KeyCode::BackTab => {
            app.switch_tab();
            EventResult::NeedsRedraw
        }
        KeyCode::Esc => {
            app.clear_input();
            EventResult::NeedsRedraw
        }

        // Output scrolling
        KeyCode::Up => {
            app.scroll_up(1);
            EventResult::NeedsRedraw
        }
        KeyCode::Down => {
            app.scroll_down(1);
            EventResult::NeedsRedraw
        }
        KeyCode::PageUp => {
            app.scroll_up(10);
            EventResult::NeedsRedraw
        }
        KeyCode::PageDown => {
            app.scroll_down(10);
            EventResult::NeedsRedraw
        }

        // Input editing
        KeyCode::Left => {
            app.cursor_left();
            EventResult::NeedsRedraw
        }
        KeyCode::Right => {
            app.cursor_right();
            EventResult::NeedsRedraw
        }
        KeyCode::Home => {
            app.cursor_home();
            EventResult::NeedsRedraw
        }
        KeyCode::End => {
            app.cursor_end();
            EventResult::NeedsRedraw
        }
        KeyCode::Backspace => {
            app.backspace();
            EventResult::NeedsRedraw
        }
        KeyCode::Delete => {
            app.delete();
            EventResult::NeedsRedraw
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.type_char(c);
            EventResult::NeedsRedraw
        }

        _ => EventResult::Continue,
    }
}

fn handle_history(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Esc => {
            app.switch_tab();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('q') => EventResult::Quit,

        KeyCode::Right | KeyCode::Char('l') => {
            app.focus_next_history();
            EventResult::NeedsRedraw
        }
        KeyCode::Left | KeyCode::Char('h') => {
            app.focus_prev_history();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('1') => {
            app.focus_history(Category::Pictogram);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('2') => {
            app.focus_history(Category::Audio);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('3') => {
            app.focus_history(Category::Text);
            EventResult::NeedsRedraw
        }

        KeyCode::Char('j') | KeyCode::Down => {
            app.scroll_down(1);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.scroll_up(1);
            EventResult::NeedsRedraw
        }
        KeyCode::PageDown => {
            app.scroll_down(10);
            EventResult::NeedsRedraw
        }
        KeyCode::PageUp => {
            app.scroll_up(10);
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}
