use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Stylize,
    text::{Line, Span},
    widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};

use super::Model;
use crate::{
    api::{live::LiveApiT, live_feed::LiveFeedT},
    focus::{ControlId, Section},
    screen::{common, controls::Controls, resources::Resources},
};

pub(super) fn render<L: LiveApiT, F: LiveFeedT>(
    model: &Model<L, F>,
    controls: &Controls,
    active: bool,
    frame: &mut Frame<'_>,
    area: Rect,
    resources: &Resources,
) {
    let focused = controls.focused();

    let title = Section::Comments.to_string();
    let block = common::panel_block(&title, active, resources);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [list_area, input_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(inner);

    let visible_rows = list_area.height as usize;
    model.visible_rows.set(visible_rows);

    let comments = model.comments();
    let first = model
        .scroll()
        .min(comments.len().saturating_sub(visible_rows));

    let lines: Vec<Line> = comments
        .iter()
        .skip(first)
        .take(visible_rows)
        .map(|comment| {
            Line::from(vec![
                Span::raw(comment.created_at.format("%H:%M ").to_string())
                    .fg(resources.secondary_color),
                Span::raw(comment.author().to_string())
                    .bold()
                    .fg(resources.accent_color),
                Span::raw(": "),
                Span::raw(comment.comment.as_str()).fg(resources.main_color),
            ])
        })
        .collect();

    if lines.is_empty() {
        common::render_centered_text(
            frame,
            list_area,
            Line::raw("No comments yet").fg(resources.secondary_color).into(),
        );
    } else {
        frame.render_widget(Paragraph::new(lines), list_area);
    }

    if comments.len() > visible_rows {
        let mut state = ScrollbarState::new(comments.len().saturating_sub(visible_rows))
            .position(first);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            list_area,
            &mut state,
        );
    }

    let [field_area, button_area] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(10)]).areas(input_area);

    frame.render_widget(
        common::text_field(ControlId::CommentInput, controls, false, resources),
        field_area,
    );

    let send = if model.is_sending() {
        Span::raw("sending…").fg(resources.secondary_color)
    } else {
        common::button(ControlId::SendComment, focused, resources)
    };
    frame.render_widget(Line::from(send).right_aligned(), button_area);
}
