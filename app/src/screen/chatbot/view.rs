use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::Stylize,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Padding, Paragraph, Wrap},
};

use super::{ChatLine, Model};
use crate::{
    api::chatbot::ChatbotApiT,
    focus::ControlId,
    screen::{
        common::{self, BackgroundWidget},
        controls::Controls,
        resources::Resources,
    },
};

pub(super) fn render<C: ChatbotApiT>(
    model: &Model<C>,
    controls: &Controls,
    frame: &mut Frame<'_>,
    area: Rect,
    resources: &Resources,
) {
    let area = common::centered_area(area, area.width * 3 / 4, area.height * 3 / 4);
    let focused = controls.focused();

    let block = Block::new()
        .border_type(BorderType::Double)
        .borders(Borders::all())
        .border_style(resources.accent_color)
        .padding(Padding::horizontal(1))
        .title("Chatbot")
        .title_alignment(Alignment::Center);
    let inner = block.inner(area);

    frame.render_widget(BackgroundWidget::new(resources.background_color), area);
    frame.render_widget(block, area);

    let [history_area, input_area, buttons_area] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let mut lines: Vec<Line> = model
        .lines()
        .iter()
        .map(|line| match line {
            ChatLine::User(text) => Line::from(vec![
                Span::raw("You: ").bold().fg(resources.accent_color),
                Span::raw(text.as_str()).fg(resources.main_color),
            ]),
            ChatLine::Bot(text) => Line::from(vec![
                Span::raw("Bot: ").bold().fg(resources.secondary_color),
                Span::raw(text.as_str()).fg(resources.main_color),
            ]),
            ChatLine::Error(text) => Line::raw(text.as_str()).fg(resources.error_color),
        })
        .collect();

    if model.is_waiting() {
        lines.push(Line::raw("...").fg(resources.secondary_color));
    }

    let visible = history_area.height as usize;
    let scroll = lines.len().saturating_sub(visible) as u16;

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0)),
        history_area,
    );

    frame.render_widget(
        common::text_field(ControlId::ChatbotInput, controls, false, resources),
        input_area,
    );

    frame.render_widget(
        Line::from(vec![
            common::button(ControlId::ChatbotSend, focused, resources),
            Span::raw("  "),
            common::button(ControlId::ChatbotClose, focused, resources),
        ])
        .alignment(Alignment::Right),
        buttons_area,
    );
}
