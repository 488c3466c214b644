use ratatui::{
    Frame,
    layout::Rect,
    style::Stylize,
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Padding, Paragraph},
};

use super::Model;
use crate::{
    api::auth::AuthApiT,
    focus::ControlId,
    screen::{
        common::{self, BackgroundWidget},
        controls::Controls,
        resources::Resources,
    },
};

pub(super) fn render<A: AuthApiT>(
    model: &Model<A>,
    controls: &Controls,
    frame: &mut Frame<'_>,
    area: Rect,
    resources: &Resources,
) {
    let area = common::centered_area(area, 48, 11);
    let focused = controls.focused();

    let block = Block::new()
        .border_type(BorderType::Double)
        .borders(Borders::all())
        .border_style(resources.accent_color)
        .padding(Padding::uniform(1))
        .title("Log in")
        .title_alignment(ratatui::layout::Alignment::Center);

    let status = match (model.is_pending(), model.error()) {
        (true, _) => Line::raw("Logging in...").fg(resources.secondary_color),
        (false, Some(error)) => Line::raw(error.to_string()).fg(resources.error_color),
        (false, None) => Line::default(),
    };

    let text = Text::from(vec![
        common::text_field(ControlId::Email, controls, false, resources),
        Line::default(),
        common::text_field(ControlId::Password, controls, true, resources),
        Line::default(),
        Line::from(vec![
            common::button(ControlId::LoginButton, focused, resources),
            Span::raw("  "),
            common::button(ControlId::BackButton, focused, resources),
        ])
        .centered(),
        Line::default(),
        status.centered(),
    ]);

    frame.render_widget(BackgroundWidget::new(resources.background_color), area);
    frame.render_widget(Paragraph::new(text).block(block), area);
}
