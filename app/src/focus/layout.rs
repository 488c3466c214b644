use std::collections::HashSet;

use strum::Display;
use thiserror::Error;

use super::control::ControlId;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display)]
pub enum Screen {
    Login,
    ChatbotModal,
    Main,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display)]
pub enum Section {
    Video,
    Comments,
    Weather,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Video, Section::Comments, Section::Weather];

    pub fn index(self) -> usize {
        match self {
            Self::Video => 0,
            Self::Comments => 1,
            Self::Weather => 2,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Control list of {0} is empty")]
    EmptyList(String),
    #[error("Control {0} is listed more than once")]
    DuplicateControl(ControlId),
    #[error("Blur override of {control} points outside of its control list")]
    OverrideOutOfRange { control: ControlId },
}

/// Ordered control lists of every screen and `Main` section. Fixed after construction.
#[derive(Clone, Debug)]
pub struct ControlLayout {
    login: Vec<ControlId>,
    chatbot: Vec<ControlId>,
    sections: [Vec<ControlId>; 3],
}

impl ControlLayout {
    pub fn new(
        login: Vec<ControlId>,
        chatbot: Vec<ControlId>,
        sections: [Vec<ControlId>; 3],
    ) -> Result<Self, LayoutError> {
        let named_lists = [
            (Screen::Login.to_string(), &login),
            (Screen::ChatbotModal.to_string(), &chatbot),
        ]
        .into_iter()
        .chain(
            Section::ALL
                .iter()
                .map(|section| (section.to_string(), &sections[section.index()])),
        );

        let mut seen = HashSet::new();
        for (name, list) in named_lists {
            if list.is_empty() {
                return Err(LayoutError::EmptyList(name));
            }

            for control in list {
                if !seen.insert(*control) {
                    return Err(LayoutError::DuplicateControl(*control));
                }
            }
        }

        Ok(Self {
            login,
            chatbot,
            sections,
        })
    }

    /// Layout of the live page.
    pub fn standard() -> Result<Self, LayoutError> {
        use ControlId::*;

        Self::new(
            vec![Email, Password, LoginButton, BackButton],
            vec![ChatbotInput, ChatbotSend, ChatbotClose],
            [
                vec![
                    ChannelSelector,
                    Replay,
                    PlayPause,
                    Rewind,
                    Forward,
                    Mute,
                    VolumeBar,
                    Fullscreen,
                    ChatbotButton,
                ],
                vec![CommentInput, SendComment],
                vec![WeatherCity, WeatherSubmit, WeatherGeolocation],
            ],
        )
    }

    pub fn section(&self, index: usize) -> &[ControlId] {
        &self.sections[index.min(self.sections.len() - 1)]
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Control list active for `screen`; `section` is only consulted for `Main`.
    pub fn controls(&self, screen: Screen, section: usize) -> &[ControlId] {
        match screen {
            Screen::Login => &self.login,
            Screen::ChatbotModal => &self.chatbot,
            Screen::Main => self.section(section),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_layout_is_valid() {
        let layout = ControlLayout::standard().unwrap();

        assert_eq!(layout.section_count(), 3);
        assert_eq!(layout.controls(Screen::Login, 0).len(), 4);
        assert_eq!(layout.controls(Screen::ChatbotModal, 2).len(), 3);
        assert_eq!(layout.section(Section::Video.index()).len(), 9);
        assert_eq!(
            layout.section(Section::Comments.index()),
            &[ControlId::CommentInput, ControlId::SendComment]
        );
    }

    #[test]
    fn test_empty_section_is_rejected() {
        let error = ControlLayout::new(
            vec![ControlId::Email],
            vec![ControlId::ChatbotClose],
            [vec![ControlId::PlayPause], vec![], vec![ControlId::WeatherCity]],
        )
        .unwrap_err();

        assert_eq!(error, LayoutError::EmptyList("Comments".to_string()));
    }

    #[test]
    fn test_duplicate_control_is_rejected() {
        let error = ControlLayout::new(
            vec![ControlId::Email],
            vec![ControlId::ChatbotClose],
            [
                vec![ControlId::PlayPause],
                vec![ControlId::CommentInput],
                vec![ControlId::PlayPause],
            ],
        )
        .unwrap_err();

        assert_eq!(error, LayoutError::DuplicateControl(ControlId::PlayPause));
    }

    #[test]
    fn test_section_indices_follow_layout_order() {
        let indices: Vec<_> = Section::ALL.iter().map(|section| section.index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }
}
