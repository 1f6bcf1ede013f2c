//! Render orchestration for the studio TUI

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use touie_core::render::category_title;
use touie_core::Category;

use crate::app::{App, Screen, Tab};
use crate::ui::layout::{centered_rect_fixed, history_columns, AppLayout, CreatorLayout};
use crate::ui::widgets::{HistoryColumnWidget, InputWidget, OutputWidget};

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    match app.screen {
        Screen::Welcome => render_welcome(frame, app, area),
        Screen::Studio => render_studio(frame, app, area),
    }
}

fn render_welcome(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect_fixed(52, 12, area);

    let category_line = Line::from(
        Category::ALL
            .iter()
            .flat_map(|c| {
                [
                    Span::styled(category_title(*c), app.theme.heading_style(*c)),
                    Span::raw("   "),
                ]
            })
            .collect::<Vec<_>>(),
    );

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Touie",
            app.theme.title_style(true).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Historias tranquilas y sencillas"),
        Line::from("para contar, escuchar y ver."),
        Line::from(""),
        category_line,
        Line::from(""),
        Line::from(Span::styled(
            "Pulsa Enter para empezar",
            app.theme.hint_style(),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(app.theme.border_style(true));

    frame.render_widget(
        Paragraph::new(text).alignment(Alignment::Center).block(block),
        popup_area,
    );
}

fn render_studio(frame: &mut Frame, app: &App, area: Rect) {
    let layout = AppLayout::calculate(area);

    render_title_bar(frame, app, layout.title_area);
    render_tabs(frame, app, layout.tabs_area);

    match app.tab {
        Tab::Creator => render_creator(frame, app, layout.body_area),
        Tab::History => render_history(frame, app, layout.body_area),
    }

    render_status_bar(frame, app, layout.status_bar);
    render_hotkey_bar(frame, app, layout.hotkey_bar);
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" Touie ", app.theme.title_style(true)),
        Span::styled(
            format!("| {}", app.backend_name),
            app.theme.hint_style(),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for tab in [Tab::Creator, Tab::History] {
        let selected = tab == app.tab;
        let style = if selected {
            app.theme
                .title_style(true)
                .add_modifier(Modifier::UNDERLINED)
        } else {
            app.theme.title_style(false)
        };
        spans.push(Span::styled(format!(" {} ", tab.title()), style));
        spans.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_creator(frame: &mut Frame, app: &App, area: Rect) {
    let layout = CreatorLayout::calculate(area);

    let input = InputWidget::new(app.input_buffer(), &app.theme)
        .cursor_position(app.cursor_position())
        .active(!app.is_generating());
    frame.render_widget(input, layout.input_area);

    let output = OutputWidget::new(&app.output, &app.theme)
        .scroll(app.output_scroll)
        .frame(app.animation_frame);
    frame.render_widget(output, layout.output_area);
}

fn render_history(frame: &mut Frame, app: &App, area: Rect) {
    for (category, column) in Category::ALL.into_iter().zip(history_columns(area)) {
        let focused = category == app.history_focus;
        let widget = HistoryColumnWidget::new(category, app.history_of(category), &app.theme)
            .focused(focused)
            .scroll(if focused { app.history_scroll } else { 0 });
        frame.render_widget(widget, column);
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let message = app.status_message().unwrap_or("");
    let line = Line::from(Span::styled(
        format!(" {message}"),
        Style::default().fg(app.theme.foreground),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

fn render_hotkey_bar(frame: &mut Frame, app: &App, area: Rect) {
    let keys: &[(&str, &str)] = match app.tab {
        Tab::Creator => &[
            ("F1", "Pictogramas"),
            ("F2", "Audio"),
            ("F3/Enter", "Texto"),
            ("Tab", "Historial"),
            ("Esc", "Borrar"),
            ("Ctrl+C", "Salir"),
        ],
        Tab::History => &[
            ("←/→", "Columna"),
            ("j/k", "Desplazar"),
            ("Tab", "Crear"),
            ("q", "Salir"),
        ],
    };

    let key_style = Style::default()
        .fg(app.theme.accent)
        .add_modifier(Modifier::BOLD);
    let spans: Vec<Span> = keys
        .iter()
        .flat_map(|(key, action)| {
            [
                Span::styled(format!(" {key}"), key_style),
                Span::styled(format!(" {action} "), app.theme.hint_style()),
            ]
        })
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
