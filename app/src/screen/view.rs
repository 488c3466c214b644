use input_mapping_common::InputMappingT;
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::Stylize,
    text::{Line, Span},
};

use super::{Page, controller};
use crate::{
    api::{
        auth::AuthApiT, chatbot::ChatbotApiT, live::LiveApiT, live_feed::LiveFeedT,
        weather::WeatherApiT,
    },
    focus::{Screen, Section},
    screen::{
        common::{self, BackgroundWidget},
        resources::Resources,
    },
};

pub(super) fn render<A, L, W, C, F>(
    model: &Page<A, L, W, C, F>,
    frame: &mut Frame<'_>,
    resources: &Resources,
) where
    A: AuthApiT,
    L: LiveApiT,
    W: WeatherApiT,
    C: ChatbotApiT,
    F: LiveFeedT,
{
    let area = frame.area();
    frame.render_widget(BackgroundWidget::new(resources.background_color), area);

    let [main_area, status_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);

    let state = model.focus.state();
    let active = |section: Section| state.screen == Screen::Main && state.section == section.index();

    if model.video.player().is_fullscreen() {
        model.video.render(
            &model.controls,
            active(Section::Video),
            frame,
            main_area,
            resources,
        );
    } else {
        let [video_area, side_area] =
            Layout::horizontal([Constraint::Fill(2), Constraint::Fill(1)]).areas(main_area);
        let [comments_area, weather_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(11)]).areas(side_area);

        model.video.render(
            &model.controls,
            active(Section::Video),
            frame,
            video_area,
            resources,
        );
        model.comments.render(
            &model.controls,
            active(Section::Comments),
            frame,
            comments_area,
            resources,
        );
        model.weather.render(
            &model.controls,
            active(Section::Weather),
            frame,
            weather_area,
            resources,
        );
    }

    match state.screen {
        Screen::Login => model.login.render(&model.controls, frame, main_area, resources),
        Screen::ChatbotModal => model.chatbot.render(&model.controls, frame, main_area, resources),
        Screen::Main => {}
    }

    let session = match model.state.session.expires_at() {
        Some(expires_at) if model.state.session.is_valid() => {
            format!("Logged in until {}", expires_at.format("%H:%M"))
        }
        _ => "Not logged in".to_string(),
    };
    let feed = if model.feed.is_connected() {
        Span::raw("● live").fg(resources.accent_color)
    } else {
        Span::raw("○ offline").fg(resources.secondary_color)
    };

    let mut status = vec![
        feed,
        Span::raw(format!("  {session}  ")).fg(resources.secondary_color),
    ];
    match &model.notice {
        Some(notice) => status.push(Span::raw(notice.as_str()).bold().fg(resources.error_color)),
        None => status.push(Span::raw("F1 help").fg(resources.secondary_color)),
    }
    frame.render_widget(Line::from(status), status_area);

    if model.show_navigation_help {
        let mapping = controller::InputEvent::get_mapping();
        common::render_navigation_help(mapping, frame, resources);
    }
}
