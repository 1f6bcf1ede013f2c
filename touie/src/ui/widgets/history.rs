//! History column widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use touie_core::render;
use touie_core::{Category, HistoryRecord};

use crate::ui::theme::StudioTheme;

/// One category of the history, newest first
pub struct HistoryColumnWidget<'a> {
    category: Category,
    records: &'a [HistoryRecord],
    theme: &'a StudioTheme,
    focused: bool,
    scroll: usize,
}

impl<'a> HistoryColumnWidget<'a> {
    pub fn new(category: Category, records: &'a [HistoryRecord], theme: &'a StudioTheme) -> Self {
        Self {
            category,
            records,
            theme,
            focused: false,
            scroll: 0,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }
}

impl Widget for HistoryColumnWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!(
            " {} ({}) ",
            render::category_title(self.category),
            self.records.len()
        );
        let block = Block::default()
            .title(Span::styled(title, self.theme.heading_style(self.category)))
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.focused));

        let inner = block.inner(area);
        block.render(area, buf);

        let lines: Vec<Line> = if self.records.is_empty() {
            vec![Line::from(Span::styled(
                render::empty_history(self.category),
                self.theme.hint_style(),
            ))]
        } else {
            self.records
                .iter()
                .flat_map(|record| {
                    let [date, idea] = render::history_entry(record);
                    [
                        Line::from(Span::styled(date, self.theme.title_style(false))),
                        Line::from(Span::styled(idea, self.theme.prompt_style())),
                        Line::from(""),
                    ]
                })
                .collect()
        };

        let max_scroll = lines.len().saturating_sub(inner.height as usize);
        let scroll = self.scroll.min(max_scroll);

        Paragraph::new(lines)
            .scroll((scroll as u16, 0))
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(buf: &Buffer) -> String {
        let area = buf.area;
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_empty_column_placeholder() {
        let theme = StudioTheme::default();
        let area = Rect::new(0, 0, 45, 5);
        let mut buf = Buffer::empty(area);
        HistoryColumnWidget::new(Category::Audio, &[], &theme).render(area, &mut buf);

        let rendered = text(&buf);
        assert!(rendered.contains("Audio (0)"));
        assert!(rendered.contains("Aún no hay historias de audio."));
    }

    #[test]
    fn test_records_newest_first() {
        let theme = StudioTheme::default();
        let records = vec![
            HistoryRecord::new(2, "02/05/2024", "una ballena"),
            HistoryRecord::new(1, "01/05/2024", "un pez"),
        ];
        let area = Rect::new(0, 0, 30, 10);
        let mut buf = Buffer::empty(area);
        HistoryColumnWidget::new(Category::Text, &records, &theme).render(area, &mut buf);

        let rendered = text(&buf);
        let newest = rendered.find("Idea: una ballena").unwrap();
        let oldest = rendered.find("Idea: un pez").unwrap();
        assert!(newest < oldest);
        assert!(rendered.contains("02/05/2024"));
    }
}
