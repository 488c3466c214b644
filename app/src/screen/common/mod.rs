use input_mapping_common::InputMapping;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Margin, Rect},
    style::{Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Padding},
};

use crate::focus::ControlId;

use super::controls::Controls;

mod api_task;
pub use api_task::*;

mod background_widget;
pub use background_widget::*;

mod navigation_help_widget;
pub use navigation_help_widget::*;

use super::resources::Resources;

pub fn render_centered_text(frame: &mut Frame, area: Rect, text: Text) {
    let [area] = Layout::horizontal([Constraint::Length(text.width() as u16)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([Constraint::Length(text.height() as u16)])
        .flex(Flex::Center)
        .areas(area);

    frame.render_widget(text, area);
}

/// Area of `width` x `height` cells in the middle of `area`, shrunk to fit.
pub fn centered_area(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);

    area
}

pub fn control_style(control: ControlId, focused: Option<ControlId>, resources: &Resources) -> Style {
    if focused == Some(control) {
        Style::new()
            .bold()
            .fg(resources.background_color)
            .bg(resources.focus_color)
    } else {
        Style::new().fg(resources.main_color)
    }
}

/// `[ label ]` button, highlighted when focused.
pub fn button(control: ControlId, focused: Option<ControlId>, resources: &Resources) -> Span<'static> {
    Span::styled(
        format!("[ {} ]", control.label()),
        control_style(control, focused, resources),
    )
}

/// Single-line text field: `label: value` with a cursor when focused.
pub fn text_field<'a>(
    control: ControlId,
    controls: &Controls,
    masked: bool,
    resources: &Resources,
) -> Line<'a> {
    let value = controls.text(control).unwrap_or_default();
    let focused = controls.focused();

    let shown = if masked {
        "•".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    let cursor = if focused == Some(control) { "▏" } else { " " };

    Line::from(vec![
        Span::raw(format!("{}: ", control.label())).fg(resources.secondary_color),
        Span::styled(
            format!("{shown}{cursor}"),
            control_style(control, focused, resources),
        ),
    ])
}

pub fn panel_block<'a>(title: &'a str, active: bool, resources: &Resources) -> Block<'a> {
    let border_color = if active {
        resources.focus_color
    } else {
        resources.secondary_color
    };

    Block::new()
        .border_type(BorderType::Rounded)
        .borders(Borders::all())
        .border_style(border_color)
        .padding(Padding::horizontal(1))
        .title(title)
        .title_alignment(Alignment::Center)
}

pub fn render_navigation_help(
    input_mapping: InputMapping,
    frame: &mut Frame<'_>,
    resources: &Resources,
) {
    let area = frame.area();

    let widget = NavigationHelpWidget::new(
        input_mapping.labelled(),
        resources.accent_color,
        resources.main_color,
    );

    let block_area = area.inner(Margin::new(8, 4));

    let width = widget.min_width().max(block_area.width as usize / 2);
    let height = widget.height();

    let block = Block::new()
        .border_type(BorderType::Double)
        .borders(Borders::all())
        .border_style(resources.main_color)
        .padding(Padding::proportional(1))
        .title("Help")
        .title_alignment(Alignment::Center)
        .reset()
        .bg(resources.background_color)
        .fg(resources.main_color);

    let block_inner = block.inner(block_area);
    let widget_area = centered_area(block_inner, width as u16, height as u16);

    frame.render_widget(
        BackgroundWidget::new(resources.background_color),
        block_area,
    );
    frame.render_widget(block, block_area);

    frame.render_widget(widget, widget_area);
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    #[test]
    fn test_centered_area_fits_inside() {
        let sizes = [0_u16, 1, 10, 80, 200];

        for (width, height) in sizes.into_iter().cartesian_product(sizes) {
            let outer = Rect::new(2, 3, 80, 24);
            let inner = centered_area(outer, width, height);

            assert!(inner.width <= outer.width && inner.height <= outer.height);
            assert!(inner.x >= outer.x && inner.right() <= outer.right());
            assert!(inner.y >= outer.y && inner.bottom() <= outer.bottom());
        }
    }

    #[test]
    fn test_password_is_masked() {
        let resources = Resources::default();
        let mut controls = Controls::default();
        controls.password = "hunter2".to_string();
        let line = text_field(ControlId::Password, &controls, true, &resources);

        assert_eq!(line.spans[1].content, "••••••• ");
    }
}
