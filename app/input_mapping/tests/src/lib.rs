#![cfg(test)]

use std::collections::HashMap;

use input_mapping_common::InputMappingT;
use input_mapping_derive::InputMapping;
use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(InputMapping, Debug, PartialEq)]
enum RemoteEvent {
    #[key = 'm']
    Mute,

    #[description = "Open menu"]
    Open,

    Navigation(DPad),
}

#[derive(InputMapping, Debug, PartialEq)]
enum DPad {
    #[key = "KeyCode::Up"]
    #[description = "Move up"]
    Up,

    #[key = "KeyCode::F(1)"]
    #[description = "Help"]
    Help,

    Select,
}

fn press(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

#[test]
fn test_mapping_collects_nested_entries() {
    let mapping: HashMap<_, _> = RemoteEvent::get_mapping()
        .mapping
        .into_iter()
        .map(|map| (map.key, map.description))
        .collect();

    assert_eq!(mapping.len(), 5);
    assert_eq!(mapping.get(&KeyCode::Char('m')), Some(&"".to_string()));
    assert_eq!(mapping.get(&KeyCode::Char('o')), Some(&"Open menu".to_string()));
    assert_eq!(mapping.get(&KeyCode::Up), Some(&"Move up".to_string()));
    assert_eq!(mapping.get(&KeyCode::F(1)), Some(&"Help".to_string()));
    assert_eq!(mapping.get(&KeyCode::Char('s')), Some(&"".to_string()));
}

#[test]
fn test_events_are_mapped() {
    assert_eq!(
        RemoteEvent::map_event(press(KeyCode::Char('m'))),
        Some(RemoteEvent::Mute)
    );
    assert_eq!(
        RemoteEvent::map_event(press(KeyCode::F(1))),
        Some(RemoteEvent::Navigation(DPad::Help))
    );
    assert_eq!(
        RemoteEvent::map_event(press(KeyCode::Char('s'))),
        Some(RemoteEvent::Navigation(DPad::Select))
    );
    assert_eq!(RemoteEvent::map_event(press(KeyCode::Char('x'))), None);
}

#[test]
fn test_key_release_is_ignored() {
    let mut release = KeyEvent::new(KeyCode::Up, KeyModifiers::NONE);
    release.kind = KeyEventKind::Release;

    assert_eq!(DPad::map_event(Event::Key(release)), None);
}
