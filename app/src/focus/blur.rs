use std::collections::HashMap;

use super::{
    FocusState,
    control::ControlId,
    layout::{Screen, Section},
};

/// Fixed focus targets forced when a control loses focus after text entry.
#[derive(Clone, Debug, Default)]
pub struct BlurOverrides(HashMap<ControlId, FocusState>);

impl BlurOverrides {
    pub fn new(entries: impl IntoIterator<Item = (ControlId, FocusState)>) -> Self {
        Self(entries.into_iter().collect())
    }

    pub fn standard() -> Self {
        Self::new([
            (
                ControlId::CommentInput,
                FocusState::main(Section::Comments.index(), 1),
            ),
            (
                ControlId::WeatherCity,
                FocusState::main(Section::Weather.index(), 1),
            ),
            (ControlId::Email, FocusState::flat(Screen::Login, 1)),
            (ControlId::Password, FocusState::flat(Screen::Login, 2)),
            (
                ControlId::ChatbotInput,
                FocusState::flat(Screen::ChatbotModal, 1),
            ),
        ])
    }

    pub fn get(&self, control: ControlId) -> Option<FocusState> {
        self.0.get(&control).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ControlId, FocusState)> + '_ {
        self.0.iter().map(|(control, target)| (*control, *target))
    }
}
