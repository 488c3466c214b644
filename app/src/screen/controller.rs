use input_mapping_common::InputMappingT;
use input_mapping_derive::InputMapping;
use ratatui::crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};

use super::{OutgoingMessage, Page};
use crate::{
    api::{
        auth::AuthApiT, chatbot::ChatbotApiT, live::LiveApiT, live_feed::LiveFeedT,
        weather::WeatherApiT,
    },
    focus::{ControlKind, Direction},
};

#[derive(InputMapping)]
pub enum InputEvent {
    #[key = "KeyCode::Up"]
    #[description = "Move focus up / scroll comments"]
    Up,

    #[key = "KeyCode::Down"]
    #[description = "Move focus down / scroll comments"]
    Down,

    #[key = "KeyCode::Left"]
    #[description = "Previous control"]
    Left,

    #[key = "KeyCode::Right"]
    #[description = "Next control"]
    Right,

    #[key = "KeyCode::Enter"]
    #[description = "Activate focused button"]
    Enter,

    #[key = "KeyCode::Esc"]
    #[description = "Back / close / log in"]
    Escape,

    #[key = "KeyCode::Tab"]
    #[description = "Finish text entry"]
    FinishEntry,

    #[key = "KeyCode::F(1)"]
    #[description = "Open/close navigation help"]
    NavigationHelp,

    #[key = "KeyCode::F(10)"]
    #[description = "Quit application"]
    Quit,
}

pub(super) fn process_input<A, L, W, C, F>(
    event: &Event,
    model: &mut Page<A, L, W, C, F>,
) -> Option<OutgoingMessage>
where
    A: AuthApiT,
    L: LiveApiT,
    W: WeatherApiT,
    C: ChatbotApiT,
    F: LiveFeedT,
{
    let Event::Key(key_event) = event else {
        return None;
    };
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    model.notice = None;

    let Some(input) = InputEvent::map_event(event.clone()) else {
        if !key_event
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            edit_focused(key_event.code, model);
        }

        return None;
    };

    let direction = match input {
        InputEvent::Quit => return Some(OutgoingMessage::Exit),
        InputEvent::NavigationHelp => {
            model.show_navigation_help ^= true;
            return None;
        }
        InputEvent::FinishEntry => {
            let focused = model.focus.focused();
            model.focus.on_blur(focused, &mut model.controls);
            return None;
        }
        InputEvent::Up => Direction::Up,
        InputEvent::Down => Direction::Down,
        InputEvent::Left => Direction::Left,
        InputEvent::Right => Direction::Right,
        InputEvent::Enter => Direction::Enter,
        InputEvent::Escape => Direction::Escape,
    };

    model
        .focus
        .handle_directional_key(direction, &model.state.session, &mut model.controls);

    None
}

/// Keys not bound to navigation go to the focused control.
fn edit_focused<A, L, W, C, F>(code: KeyCode, model: &mut Page<A, L, W, C, F>)
where
    A: AuthApiT,
    L: LiveApiT,
    W: WeatherApiT,
    C: ChatbotApiT,
    F: LiveFeedT,
{
    let focused = model.focus.focused();

    if let Some(text) = model.controls.text_mut(focused) {
        match code {
            KeyCode::Char(c) => text.push(c),
            KeyCode::Backspace => {
                text.pop();
            }
            _ => {}
        }

        return;
    }

    let steps = match code {
        KeyCode::Char('+') => 1,
        KeyCode::Char('-') => -1,
        _ => return,
    };

    match focused.kind() {
        ControlKind::Selection => model.video.cycle_channel(steps),
        ControlKind::Range => model.video.adjust_volume(steps),
        ControlKind::TextInput | ControlKind::Button => {}
    }
}
