use ratatui::crossterm::event::{Event, KeyCode};

pub trait InputMappingT: Sized {
    fn get_mapping() -> InputMapping;

    fn map_event(event: Event) -> Option<Self>;
}

#[derive(Debug, Default)]
pub struct InputMapping {
    pub mapping: Vec<MappingEntry>,
}

impl InputMapping {
    pub fn merge(mut self, mut other: InputMapping) -> Self {
        self.mapping.append(&mut other.mapping);
        self
    }

    /// Key bindings as printable `(key, description)` pairs, in declaration order.
    pub fn labelled(&self) -> Vec<(String, String)> {
        self.mapping
            .iter()
            .map(|entry| (key_label(entry.key), entry.description.clone()))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct MappingEntry {
    pub key: KeyCode,
    pub description: String,
}

pub fn key_label(key: KeyCode) -> String {
    match key {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::F(n) => format!("F{n}"),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_labels() {
        assert_eq!(key_label(KeyCode::F(10)), "F10");
        assert_eq!(key_label(KeyCode::Char('+')), "+");
        assert_eq!(key_label(KeyCode::Esc), "Esc");
    }

    #[test]
    fn test_merge_keeps_order() {
        let first = InputMapping {
            mapping: vec![MappingEntry {
                key: KeyCode::Up,
                description: "up".into(),
            }],
        };
        let second = InputMapping {
            mapping: vec![MappingEntry {
                key: KeyCode::Enter,
                description: "press".into(),
            }],
        };

        let labelled = first.merge(second).labelled();
        assert_eq!(
            labelled,
            vec![
                ("↑".to_string(), "up".to_string()),
                ("Enter".to_string(), "press".to_string())
            ]
        );
    }
}
