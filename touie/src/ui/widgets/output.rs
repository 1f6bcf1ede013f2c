//! Output panel widget

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    symbols::scrollbar,
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
        StatefulWidget, Widget, Wrap,
    },
};

use touie_core::render::GENERATING;

use crate::app::OutputView;
use crate::ui::theme::StudioTheme;

const PLACEHOLDER: &str = "Escribe una idea y elige: F1 pictogramas, F2 audio, F3 texto.";

/// Frames of the loading spinner
const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Shows the placeholder, the loading state, a result or an error
pub struct OutputWidget<'a> {
    view: &'a OutputView,
    scroll: usize,
    theme: &'a StudioTheme,
    frame: u8,
}

impl<'a> OutputWidget<'a> {
    pub fn new(view: &'a OutputView, theme: &'a StudioTheme) -> Self {
        Self {
            view,
            scroll: 0,
            theme,
            frame: 0,
        }
    }

    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Animation frame for the loading spinner
    pub fn frame(mut self, frame: u8) -> Self {
        self.frame = frame;
        self
    }

    fn lines(&self) -> Vec<Line<'static>> {
        match self.view {
            OutputView::Placeholder => vec![Line::from(Span::styled(
                PLACEHOLDER,
                self.theme.hint_style(),
            ))],
            OutputView::Loading(category) => {
                let spinner = SPINNER[self.frame as usize % SPINNER.len()];
                vec![Line::from(Span::styled(
                    format!("{spinner} {GENERATING}"),
                    self.theme.heading_style(*category),
                ))]
            }
            OutputView::Error(message) => message
                .lines()
                .map(|l| Line::from(Span::styled(l.to_string(), self.theme.error_style())))
                .collect(),
            OutputView::Result { category, lines } => {
                let mut out = Vec::with_capacity(lines.len() + 1);
                let mut rest = lines.iter();
                if let Some(heading) = rest.next() {
                    out.push(Line::from(Span::styled(
                        heading.clone(),
                        self.theme.heading_style(*category),
                    )));
                    out.push(Line::from(""));
                }
                out.extend(
                    rest.map(|l| Line::from(Span::styled(l.clone(), self.theme.story_style()))),
                );
                out
            }
        }
    }
}

impl Widget for OutputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Tu historia ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(false));

        let inner = block.inner(area);
        block.render(area, buf);

        let lines = self.lines();

        let visible_height = inner.height as usize;
        let total_lines = lines.len();
        let max_scroll = total_lines.saturating_sub(visible_height);
        let scroll = self.scroll.min(max_scroll);

        let alignment = match self.view {
            OutputView::Loading(_) => Alignment::Center,
            _ => Alignment::Left,
        };

        Paragraph::new(lines)
            .alignment(alignment)
            .scroll((scroll as u16, 0))
            .wrap(Wrap { trim: false })
            .render(inner, buf);

        // Render scrollbar if content exceeds visible area
        if total_lines > visible_height {
            let scrollbar_area = Rect {
                x: inner.x + inner.width.saturating_sub(1),
                y: inner.y,
                width: 1,
                height: inner.height,
            };

            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .symbols(scrollbar::VERTICAL)
                .thumb_style(Style::default().fg(Color::DarkGray))
                .track_style(Style::default().fg(Color::Black))
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"));

            let mut scrollbar_state = ScrollbarState::new(max_scroll).position(scroll);
            scrollbar.render(scrollbar_area, buf, &mut scrollbar_state);

            if scroll < max_scroll {
                let hint = format!(" ↓{} más ", max_scroll - scroll);
                let hint_y = inner.y + inner.height.saturating_sub(1);
                let hint_style = Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::DIM);
                for (i, ch) in hint.chars().enumerate() {
                    let x = inner.x + (i as u16);
                    if x < inner.x + inner.width.saturating_sub(2) {
                        buf[(x, hint_y)].set_char(ch).set_style(hint_style);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use touie_core::Category;

    fn text(buf: &Buffer) -> String {
        let area = buf.area;
        (area.y..area.y + area.height)
            .map(|y| {
                (area.x..area.x + area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_result_shows_heading_and_story() {
        let theme = StudioTheme::default();
        let view = OutputView::Result {
            category: Category::Text,
            lines: vec!["Tu Historia en Texto".to_string(), "Había una vez.".to_string()],
        };
        let area = Rect::new(0, 0, 40, 8);
        let mut buf = Buffer::empty(area);
        OutputWidget::new(&view, &theme).render(area, &mut buf);

        let rendered = text(&buf);
        assert!(rendered.contains("Tu Historia en Texto"));
        assert!(rendered.contains("Había una vez."));
    }

    #[test]
    fn test_error_is_shown() {
        let theme = StudioTheme::default();
        let view = OutputView::Error("¡Ups! Primero escribe tu idea arriba.".to_string());
        let area = Rect::new(0, 0, 50, 5);
        let mut buf = Buffer::empty(area);
        OutputWidget::new(&view, &theme).render(area, &mut buf);
        assert!(text(&buf).contains("¡Ups! Primero escribe tu idea arriba."));
    }
}
