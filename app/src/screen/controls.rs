use std::collections::VecDeque;

use crate::focus::{ControlId, ControlSurface};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Activation {
    Click(ControlId),
    Scroll(i32),
}

/// Form values of the page and the activations raised by the focus controller, handled
/// once the current input event has been processed.
#[derive(Default)]
pub struct Controls {
    focused: Option<ControlId>,

    pub email: String,
    pub password: String,
    pub chatbot_input: String,
    pub comment: String,
    pub city: String,

    pending: VecDeque<Activation>,
}

impl Controls {
    pub fn focused(&self) -> Option<ControlId> {
        self.focused
    }

    pub fn text(&self, control: ControlId) -> Option<&str> {
        match control {
            ControlId::Email => Some(&self.email),
            ControlId::Password => Some(&self.password),
            ControlId::ChatbotInput => Some(&self.chatbot_input),
            ControlId::CommentInput => Some(&self.comment),
            ControlId::WeatherCity => Some(&self.city),
            _ => None,
        }
    }

    pub fn text_mut(&mut self, control: ControlId) -> Option<&mut String> {
        match control {
            ControlId::Email => Some(&mut self.email),
            ControlId::Password => Some(&mut self.password),
            ControlId::ChatbotInput => Some(&mut self.chatbot_input),
            ControlId::CommentInput => Some(&mut self.comment),
            ControlId::WeatherCity => Some(&mut self.city),
            _ => None,
        }
    }

    pub fn take_pending(&mut self) -> Vec<Activation> {
        self.pending.drain(..).collect()
    }
}

impl ControlSurface for Controls {
    fn focus(&mut self, control: ControlId) {
        self.focused = Some(control);
    }

    fn click(&mut self, control: ControlId) {
        self.pending.push_back(Activation::Click(control));
    }

    fn scroll_comments(&mut self, delta: i32) {
        self.pending.push_back(Activation::Scroll(delta));
    }
}
