use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Stylize,
    text::{Line, Span, Text},
    widgets::Paragraph,
};

use super::Model;
use crate::{
    api::{common_types::WeatherReport, weather::WeatherApiT},
    focus::{ControlId, Section},
    screen::{common, controls::Controls, resources::Resources},
};

pub(super) fn render<W: WeatherApiT>(
    model: &Model<W>,
    controls: &Controls,
    active: bool,
    frame: &mut Frame<'_>,
    area: Rect,
    resources: &Resources,
) {
    let focused = controls.focused();

    let title = Section::Weather.to_string();
    let block = common::panel_block(&title, active, resources);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [report_area, city_area, buttons_area] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let text = match (model.is_loading(), model.error(), model.report()) {
        (true, _, _) => Text::from(Line::raw("Loading...").fg(resources.secondary_color)),
        (false, Some(error), _) => Text::from(Line::raw(error.to_string()).fg(resources.error_color)),
        (false, None, Some(report)) => report_text(report, resources),
        (false, None, None) => Text::default(),
    };
    frame.render_widget(Paragraph::new(text), report_area);

    frame.render_widget(
        common::text_field(ControlId::WeatherCity, controls, false, resources),
        city_area,
    );
    frame.render_widget(
        Line::from(vec![
            common::button(ControlId::WeatherSubmit, focused, resources),
            Span::raw(" "),
            common::button(ControlId::WeatherGeolocation, focused, resources),
        ]),
        buttons_area,
    );
}

fn report_text<'a>(report: &WeatherReport, resources: &Resources) -> Text<'a> {
    let place = match (&report.city, &report.country) {
        (Some(city), Some(country)) => format!("{city}, {country}"),
        (Some(city), None) => city.clone(),
        (None, _) => "Unknown place".to_string(),
    };

    let mut lines = vec![Line::raw(place).bold().fg(resources.accent_color)];

    let rows = [
        ("Temperature", report.temperature.map(|t| format!("{t:.1} °C"))),
        ("Sky", report.description.clone()),
        ("Humidity", report.humidity.map(|h| format!("{h:.0} %"))),
        ("Wind", report.wind_speed.map(|w| format!("{w:.1} m/s"))),
        ("Sunrise", report.sunrise.clone()),
        ("Sunset", report.sunset.clone()),
    ];

    lines.extend(rows.into_iter().filter_map(|(label, value)| {
        Some(Line::from(vec![
            Span::raw(format!("{label}: ")).fg(resources.secondary_color),
            Span::raw(value?).fg(resources.main_color),
        ]))
    }));

    Text::from(lines)
}
