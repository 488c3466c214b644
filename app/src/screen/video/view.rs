use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Stylize,
    text::{Line, Span},
    widgets::{Gauge, Paragraph},
};

use super::Model;
use crate::{
    api::live::LiveApiT,
    focus::{ControlId, Section},
    screen::{common, controls::Controls, resources::Resources},
};

pub(super) fn render<L: LiveApiT>(
    model: &Model<L>,
    controls: &Controls,
    active: bool,
    frame: &mut Frame<'_>,
    area: Rect,
    resources: &Resources,
) {
    let focused = controls.focused();
    let player = model.player();

    let title = if player.is_fullscreen() {
        format!("{} (fullscreen)", Section::Video)
    } else {
        Section::Video.to_string()
    };
    let block = common::panel_block(&title, active, resources);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [screen_area, timeline_area, buttons_area, volume_area] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let channel = model.selected_channel().unwrap_or("-");
    let status = match (model.is_loading(), model.error(), player.source()) {
        (true, _, _) => Line::raw(format!("Loading {channel}...")).fg(resources.secondary_color),
        (false, Some(error), _) => Line::raw(error.to_string()).fg(resources.error_color),
        (false, None, Some(source)) => Line::from(vec![
            Span::raw(format!("{} ", if player.is_playing() { "▶" } else { "⏸" }))
                .fg(resources.accent_color),
            Span::raw(format!("{channel} [{}]", source.kind_label())).bold(),
            Span::raw(format!("  {}", source.url())).fg(resources.secondary_color),
        ]),
        (false, None, None) => Line::raw("No stream").fg(resources.secondary_color),
    };
    common::render_centered_text(frame, screen_area, status.into());

    let timeline = format!("{} / live", clock(player.position()));
    frame.render_widget(Line::raw(timeline).centered(), timeline_area);

    let mut buttons = vec![
        Span::styled(
            selector_label(model.channels(), model.selected_channel()),
            common::control_style(ControlId::ChannelSelector, focused, resources),
        ),
        Span::raw(" "),
    ];
    for control in [
        ControlId::Replay,
        ControlId::PlayPause,
        ControlId::Rewind,
        ControlId::Forward,
        ControlId::Mute,
        ControlId::Fullscreen,
        ControlId::ChatbotButton,
    ] {
        buttons.push(common::button(control, focused, resources));
        buttons.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(buttons)), buttons_area);

    let volume_label = if player.is_muted() {
        "Volume (muted)".to_string()
    } else {
        format!("Volume {:.0}%", player.volume() * 100.0)
    };
    frame.render_widget(
        Gauge::default()
            .ratio(player.volume().clamp(0.0, 1.0))
            .label(volume_label)
            .gauge_style(common::control_style(
                ControlId::VolumeBar,
                focused,
                resources,
            )),
        volume_area,
    );
}

/// Channel selector text with the position of the selection, e.g. `‹ france24 2/5 ›`.
fn selector_label(channels: &[String], selected: Option<&str>) -> String {
    let position = selected.and_then(|selected| channels.iter().position(|channel| channel == selected));

    match (selected, position) {
        (Some(channel), Some(index)) => format!("‹ {channel} {}/{} ›", index + 1, channels.len()),
        _ => "‹ - ›".to_string(),
    }
}

fn clock(duration: Duration) -> String {
    let seconds = duration.as_secs();
    format!("{:02}:{:02}:{:02}", seconds / 3600, seconds / 60 % 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock() {
        assert_eq!(clock(Duration::ZERO), "00:00:00");
        assert_eq!(clock(Duration::from_secs(3725)), "01:02:05");
    }

    #[test]
    fn test_selector_label() {
        let channels = vec!["tv5monde".to_string(), "france24".to_string()];

        assert_eq!(selector_label(&channels, Some("france24")), "‹ france24 2/2 ›");
        assert_eq!(selector_label(&channels, None), "‹ - ›");
        assert_eq!(selector_label(&[], Some("tv5monde")), "‹ - ›");
    }
}
