//! Directional (D-pad) focus navigation across the login overlay, the chatbot modal and
//! the sections of the main page.

use crate::session::Session;

pub mod blur;
pub mod control;
pub mod layout;

pub use blur::BlurOverrides;
pub use control::{ControlId, ControlKind, ControlSurface};
pub use layout::{ControlLayout, LayoutError, Screen, Section};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Escape,
}

/// Position of the input focus. `section` is meaningful only on [`Screen::Main`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FocusState {
    pub screen: Screen,
    pub section: usize,
    pub control: usize,
}

impl FocusState {
    pub fn main(section: usize, control: usize) -> Self {
        Self {
            screen: Screen::Main,
            section,
            control,
        }
    }

    pub fn flat(screen: Screen, control: usize) -> Self {
        Self {
            screen,
            section: 0,
            control,
        }
    }
}

pub struct FocusController {
    layout: ControlLayout,
    overrides: BlurOverrides,
    state: FocusState,
    comment_scroll_step: i32,
}

impl FocusController {
    pub fn new(
        layout: ControlLayout,
        overrides: BlurOverrides,
        comment_scroll_step: i32,
        initial_screen: Screen,
    ) -> Result<Self, LayoutError> {
        for (control, target) in overrides.iter() {
            let in_range = (target.screen != Screen::Main
                || target.section < layout.section_count())
                && target.control < layout.controls(target.screen, target.section).len();

            if !in_range {
                return Err(LayoutError::OverrideOutOfRange { control });
            }
        }

        Ok(Self {
            layout,
            overrides,
            state: FocusState::flat(initial_screen, 0),
            comment_scroll_step,
        })
    }

    pub fn state(&self) -> FocusState {
        self.state
    }

    pub fn screen(&self) -> Screen {
        self.state.screen
    }

    #[cfg(test)]
    pub fn layout(&self) -> &ControlLayout {
        &self.layout
    }

    pub fn focused(&self) -> ControlId {
        self.active_controls()[self.state.control]
    }

    pub fn apply_focus(&self, surface: &mut impl ControlSurface) {
        surface.focus(self.focused());
    }

    pub fn set_active_screen(&mut self, screen: Screen, surface: &mut impl ControlSurface) {
        log::debug!("Switching active screen to {screen}");

        self.state = FocusState::flat(screen, 0);
        self.apply_focus(surface);
    }

    /// Moves focus to `target`, clamping indices that fall outside of the control lists.
    pub fn refocus(&mut self, target: FocusState, surface: &mut impl ControlSurface) {
        let section = if target.screen == Screen::Main {
            target.section.min(self.layout.section_count() - 1)
        } else {
            0
        };

        self.state = FocusState {
            screen: target.screen,
            section,
            control: target.control,
        };
        self.clamp_control();
        self.apply_focus(surface);
    }

    pub fn on_blur(&mut self, control: ControlId, surface: &mut impl ControlSurface) {
        let Some(target) = self.overrides.get(control) else {
            return;
        };

        if target.screen != self.state.screen {
            return;
        }

        log::debug!("{control} lost focus, forcing focus to {target:?}");

        self.state = target;
        self.apply_focus(surface);
    }

    pub fn handle_directional_key(
        &mut self,
        direction: Direction,
        session: &Session,
        surface: &mut impl ControlSurface,
    ) {
        match self.state.screen {
            Screen::Login | Screen::ChatbotModal => self.handle_flat_key(direction, surface),
            Screen::Main => self.handle_main_key(direction, session, surface),
        }
    }

    fn handle_flat_key(&mut self, direction: Direction, surface: &mut impl ControlSurface) {
        let (activatable, cancel) = match self.state.screen {
            Screen::Login => (
                [ControlId::LoginButton, ControlId::BackButton],
                ControlId::BackButton,
            ),
            _ => (
                [ControlId::ChatbotSend, ControlId::ChatbotClose],
                ControlId::ChatbotClose,
            ),
        };

        match direction {
            Direction::Left | Direction::Up => {
                self.state.control = wrap_prev(self.state.control, self.active_controls().len());
                self.apply_focus(surface);
            }
            Direction::Right | Direction::Down => {
                self.state.control = wrap_next(self.state.control, self.active_controls().len());
                self.apply_focus(surface);
            }
            Direction::Enter => {
                let focused = self.focused();
                if activatable.contains(&focused) {
                    surface.click(focused);
                }
            }
            Direction::Escape => surface.click(cancel),
        }
    }

    fn handle_main_key(
        &mut self,
        direction: Direction,
        session: &Session,
        surface: &mut impl ControlSurface,
    ) {
        let section_count = self.layout.section_count();
        let on_comment_input = self.state.section == Section::Comments.index()
            && self.focused() == ControlId::CommentInput;

        match direction {
            Direction::Left => {
                self.state.control = wrap_prev(self.state.control, self.active_controls().len());
                self.apply_focus(surface);
            }
            Direction::Right => {
                self.state.control = wrap_next(self.state.control, self.active_controls().len());
                self.apply_focus(surface);
            }
            Direction::Up if on_comment_input => surface.scroll_comments(-self.comment_scroll_step),
            Direction::Down if on_comment_input => surface.scroll_comments(self.comment_scroll_step),
            Direction::Up => {
                self.state.section = wrap_prev(self.state.section, section_count);
                self.clamp_control();
                self.apply_focus(surface);
            }
            Direction::Down => {
                self.state.section = wrap_next(self.state.section, section_count);
                self.clamp_control();
                self.apply_focus(surface);
            }
            Direction::Enter => {
                let focused = self.focused();
                if !focused.kind().accepts_direct_input() {
                    surface.click(focused);
                }
            }
            Direction::Escape => {
                if session.is_valid() {
                    self.set_active_screen(Screen::Login, surface);
                }
            }
        }
    }

    fn active_controls(&self) -> &[ControlId] {
        self.layout.controls(self.state.screen, self.state.section)
    }

    fn clamp_control(&mut self) {
        let len = self.active_controls().len();
        self.state.control = self.state.control.min(len - 1);
    }
}

fn wrap_prev(index: usize, len: usize) -> usize {
    (index + len - 1) % len
}

fn wrap_next(index: usize, len: usize) -> usize {
    (index + 1) % len
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use proptest::prelude::*;

    use super::*;

    #[derive(Default)]
    struct RecordingSurface {
        focused: Option<ControlId>,
        clicks: Vec<ControlId>,
        scrolled: i32,
    }

    impl ControlSurface for RecordingSurface {
        fn focus(&mut self, control: ControlId) {
            self.focused = Some(control);
        }

        fn click(&mut self, control: ControlId) {
            self.clicks.push(control);
        }

        fn scroll_comments(&mut self, delta: i32) {
            self.scrolled += delta;
        }
    }

    fn controller(initial: Screen) -> FocusController {
        FocusController::new(
            ControlLayout::standard().unwrap(),
            BlurOverrides::standard(),
            50,
            initial,
        )
        .unwrap()
    }

    fn logged_in() -> Session {
        Session::new("token".into(), Duration::minutes(10))
    }

    #[test]
    fn test_sections_switch_preserves_position() {
        use ControlId::*;

        let layout = ControlLayout::new(
            vec![Email],
            vec![ChatbotClose],
            [
                vec![ChannelSelector, Replay, PlayPause, Rewind, Forward, Mute, VolumeBar],
                vec![CommentInput, SendComment],
                vec![WeatherCity, WeatherSubmit, WeatherGeolocation],
            ],
        )
        .unwrap();
        let mut focus =
            FocusController::new(layout, BlurOverrides::default(), 50, Screen::Main).unwrap();
        let mut surface = RecordingSurface::default();
        let session = Session::default();

        focus.refocus(FocusState::main(0, 5), &mut surface);
        assert_eq!(surface.focused, Some(Mute));

        focus.handle_directional_key(Direction::Down, &session, &mut surface);
        assert_eq!(focus.state(), FocusState::main(1, 1));
        assert_eq!(surface.focused, Some(SendComment));

        focus.handle_directional_key(Direction::Down, &session, &mut surface);
        assert_eq!(focus.state(), FocusState::main(2, 1));
        assert_eq!(surface.focused, Some(WeatherSubmit));
    }

    #[test]
    fn test_chatbot_wraps_and_closes() {
        let mut focus = controller(Screen::Main);
        let mut surface = RecordingSurface::default();
        let session = logged_in();

        focus.set_active_screen(Screen::ChatbotModal, &mut surface);
        assert_eq!(surface.focused, Some(ControlId::ChatbotInput));

        focus.handle_directional_key(Direction::Left, &session, &mut surface);
        assert_eq!(focus.state().control, 2);
        assert_eq!(focus.focused(), ControlId::ChatbotClose);

        focus.handle_directional_key(Direction::Enter, &session, &mut surface);
        assert_eq!(surface.clicks, vec![ControlId::ChatbotClose]);
    }

    #[test]
    fn test_enter_on_flat_inputs_does_nothing() {
        let mut focus = controller(Screen::Login);
        let mut surface = RecordingSurface::default();
        let session = Session::default();

        focus.handle_directional_key(Direction::Enter, &session, &mut surface);
        focus.handle_directional_key(Direction::Down, &session, &mut surface);
        focus.handle_directional_key(Direction::Enter, &session, &mut surface);
        assert!(surface.clicks.is_empty());

        focus.handle_directional_key(Direction::Down, &session, &mut surface);
        focus.handle_directional_key(Direction::Enter, &session, &mut surface);
        assert_eq!(surface.clicks, vec![ControlId::LoginButton]);
    }

    #[test]
    fn test_escape_activates_cancel_control() {
        let mut focus = controller(Screen::Login);
        let mut surface = RecordingSurface::default();
        let session = Session::default();

        focus.handle_directional_key(Direction::Escape, &session, &mut surface);

        focus.set_active_screen(Screen::ChatbotModal, &mut surface);
        focus.handle_directional_key(Direction::Escape, &session, &mut surface);

        assert_eq!(
            surface.clicks,
            vec![ControlId::BackButton, ControlId::ChatbotClose]
        );
    }

    #[test]
    fn test_comment_input_scrolls_instead_of_moving() {
        let mut focus = controller(Screen::Main);
        let mut surface = RecordingSurface::default();
        let session = Session::default();

        focus.refocus(FocusState::main(Section::Comments.index(), 0), &mut surface);
        let before = focus.state();

        focus.handle_directional_key(Direction::Up, &session, &mut surface);
        assert_eq!(focus.state(), before);
        assert_eq!(surface.scrolled, -50);

        focus.handle_directional_key(Direction::Down, &session, &mut surface);
        focus.handle_directional_key(Direction::Down, &session, &mut surface);
        assert_eq!(focus.state(), before);
        assert_eq!(surface.scrolled, 50);
    }

    #[test]
    fn test_escape_in_main_requires_valid_token() {
        let mut focus = controller(Screen::Main);
        let mut surface = RecordingSurface::default();

        focus.refocus(FocusState::main(2, 2), &mut surface);
        focus.handle_directional_key(Direction::Escape, &Session::default(), &mut surface);
        assert_eq!(focus.state(), FocusState::main(2, 2));

        focus.handle_directional_key(Direction::Escape, &logged_in(), &mut surface);
        assert_eq!(focus.state(), FocusState::flat(Screen::Login, 0));
        assert_eq!(surface.focused, Some(ControlId::Email));
    }

    #[test]
    fn test_enter_in_main_skips_direct_input_controls() {
        let mut focus = controller(Screen::Main);
        let mut surface = RecordingSurface::default();
        let session = Session::default();

        // ChannelSelector, then VolumeBar.
        focus.handle_directional_key(Direction::Enter, &session, &mut surface);
        focus.refocus(FocusState::main(0, 6), &mut surface);
        focus.handle_directional_key(Direction::Enter, &session, &mut surface);
        assert!(surface.clicks.is_empty());

        focus.refocus(FocusState::main(0, 8), &mut surface);
        focus.handle_directional_key(Direction::Enter, &session, &mut surface);
        assert_eq!(surface.clicks, vec![ControlId::ChatbotButton]);
    }

    #[test]
    fn test_set_active_screen_is_idempotent() {
        let mut focus = controller(Screen::Main);
        let mut surface = RecordingSurface::default();

        focus.refocus(FocusState::main(1, 1), &mut surface);
        focus.set_active_screen(Screen::Login, &mut surface);
        let once = focus.state();
        focus.set_active_screen(Screen::Login, &mut surface);

        assert_eq!(focus.state(), once);
        assert_eq!(once, FocusState::flat(Screen::Login, 0));
    }

    #[test]
    fn test_blur_overrides() {
        let mut focus = controller(Screen::Login);
        let mut surface = RecordingSurface::default();

        focus.on_blur(ControlId::Email, &mut surface);
        assert_eq!(focus.focused(), ControlId::Password);
        focus.on_blur(ControlId::Password, &mut surface);
        assert_eq!(focus.focused(), ControlId::LoginButton);

        // Overrides of other screens are ignored.
        focus.on_blur(ControlId::CommentInput, &mut surface);
        assert_eq!(focus.focused(), ControlId::LoginButton);

        focus.set_active_screen(Screen::Main, &mut surface);
        focus.on_blur(ControlId::CommentInput, &mut surface);
        assert_eq!(focus.state(), FocusState::main(1, 1));
        focus.on_blur(ControlId::WeatherCity, &mut surface);
        assert_eq!(focus.state(), FocusState::main(2, 1));

        // No entry, no change.
        focus.on_blur(ControlId::PlayPause, &mut surface);
        assert_eq!(focus.state(), FocusState::main(2, 1));

        focus.set_active_screen(Screen::ChatbotModal, &mut surface);
        focus.on_blur(ControlId::ChatbotInput, &mut surface);
        assert_eq!(surface.focused, Some(ControlId::ChatbotSend));
    }

    #[test]
    fn test_out_of_range_override_is_rejected() {
        let overrides =
            BlurOverrides::new([(ControlId::Email, FocusState::flat(Screen::Login, 4))]);

        let result = FocusController::new(
            ControlLayout::standard().unwrap(),
            overrides,
            50,
            Screen::Login,
        );

        assert!(matches!(
            result,
            Err(LayoutError::OverrideOutOfRange {
                control: ControlId::Email
            })
        ));
    }

    #[test]
    fn test_refocus_clamps() {
        let mut focus = controller(Screen::Main);
        let mut surface = RecordingSurface::default();

        focus.refocus(FocusState::main(7, 9), &mut surface);
        assert_eq!(focus.state(), FocusState::main(2, 2));

        focus.refocus(FocusState::flat(Screen::ChatbotModal, 5), &mut surface);
        assert_eq!(focus.state(), FocusState::flat(Screen::ChatbotModal, 2));
    }

    proptest! {
        #[test]
        fn prop_horizontal_moves_wrap(
            section in 0usize..3,
            start in 0usize..9,
            presses in 0usize..40,
            left in any::<bool>(),
        ) {
            let mut focus = controller(Screen::Main);
            let mut surface = RecordingSurface::default();
            let session = Session::default();

            focus.refocus(FocusState::main(section, start), &mut surface);
            let len = focus.layout().section(section).len();
            let start = focus.state().control;

            let direction = if left { Direction::Left } else { Direction::Right };
            for _ in 0..presses {
                focus.handle_directional_key(direction, &session, &mut surface);
            }

            let offset = if left { -(presses as i64) } else { presses as i64 };
            let expected = (start as i64 + offset).rem_euclid(len as i64) as usize;
            prop_assert_eq!(focus.state(), FocusState::main(section, expected));
        }

        #[test]
        fn prop_vertical_moves_clamp(
            section in 0usize..3,
            start in 0usize..9,
            up in any::<bool>(),
        ) {
            let mut focus = controller(Screen::Main);
            let mut surface = RecordingSurface::default();
            let session = Session::default();

            focus.refocus(FocusState::main(section, start), &mut surface);
            prop_assume!(focus.focused() != ControlId::CommentInput);
            let old_index = focus.state().control;

            let (direction, new_section) = if up {
                (Direction::Up, (section + 2) % 3)
            } else {
                (Direction::Down, (section + 1) % 3)
            };
            focus.handle_directional_key(direction, &session, &mut surface);

            let new_len = focus.layout().section(new_section).len();
            prop_assert_eq!(
                focus.state(),
                FocusState::main(new_section, old_index.min(new_len - 1))
            );
            prop_assert_eq!(surface.focused, Some(focus.focused()));
        }
    }
}
