//! The live page: video, comments and weather panels under a login overlay and a chatbot
//! modal, driven by the directional focus controller.

use ratatui::{Frame, crossterm::event::Event};
use tokio::time::Instant;

use resources::Resources;

use crate::{
    api::{
        auth::AuthApiT,
        chatbot::ChatbotApiT,
        common_types::WeatherQuery,
        live::LiveApiT,
        live_feed::{FeedEvent, LiveFeedT},
        weather::WeatherApiT,
    },
    app::{ApiRegistry, StateRegistry},
    config::{Config, Location},
    focus::{
        BlurOverrides, ControlId, ControlLayout, FocusController, FocusState, LayoutError, Screen,
        Section,
    },
    player::Player,
    session::Session,
};

mod chatbot;
mod comments;
mod common;
mod controller;
mod controls;
mod login;
pub mod resources;
mod video;
mod view;
mod weather;

use comments::SendOutcome;
use controls::{Activation, Controls};

pub enum OutgoingMessage {
    Exit,
}

struct PageSettings {
    session_ttl: chrono::Duration,
    default_city: String,
    location: Option<Location>,
}

pub struct Page<A, L, W, C, F>
where
    A: AuthApiT,
    L: LiveApiT,
    W: WeatherApiT,
    C: ChatbotApiT,
    F: LiveFeedT,
{
    focus: FocusController,
    controls: Controls,

    login: login::Model<A>,
    chatbot: chatbot::Model<C>,
    video: video::Model<L>,
    comments: comments::Model<L, F>,
    weather: weather::Model<W>,
    feed: F,

    state: StateRegistry,
    settings: PageSettings,
    show_navigation_help: bool,
    notice: Option<String>,
    last_tick: Instant,
}

impl<A, L, W, C, F> Page<A, L, W, C, F>
where
    A: AuthApiT,
    L: LiveApiT,
    W: WeatherApiT,
    C: ChatbotApiT,
    F: LiveFeedT,
{
    /// Builds the page and starts the initial weather, comments and stream requests.
    pub fn construct(
        state: StateRegistry,
        apis: ApiRegistry<A, L, W, C>,
        feed: F,
        config: &Config,
    ) -> Result<Self, LayoutError> {
        let initial_screen = if state.session.is_valid() {
            Screen::Main
        } else {
            Screen::Login
        };

        let focus = FocusController::new(
            ControlLayout::standard()?,
            BlurOverrides::standard(),
            config.comment_scroll_step,
            initial_screen,
        )?;

        let mut page = Self {
            focus,
            controls: Controls::default(),

            login: login::Model::new(apis.auth_api),
            chatbot: chatbot::Model::new(apis.chatbot_api),
            video: video::Model::new(
                apis.live_api.clone(),
                config.channels.clone(),
                Player::new(config.player_command.clone()),
            ),
            comments: comments::Model::new(
                apis.live_api,
                feed.clone(),
                config.max_comments,
                config.comment_fallback_delay(),
            ),
            weather: weather::Model::new(apis.weather_api),
            feed,

            state,
            settings: PageSettings {
                session_ttl: config.session_ttl(),
                default_city: config.default_city.clone(),
                location: config.location,
            },
            show_navigation_help: false,
            notice: None,
            last_tick: Instant::now(),
        };

        page.focus.apply_focus(&mut page.controls);

        let query = page.local_weather_query();
        page.weather.request(query);
        page.comments.reload(page.token());
        page.video.select_channel(0);

        Ok(page)
    }

    pub fn session(&self) -> &Session {
        &self.state.session
    }

    pub fn render(&self, frame: &mut Frame<'_>, resources: &Resources) {
        view::render(self, frame, resources);
    }

    pub async fn tick(&mut self, event: Option<Event>) -> Option<OutgoingMessage> {
        self.tick_logic().await;

        let message = controller::process_input(event.as_ref()?, self);
        self.dispatch_activations();

        message
    }

    pub fn deconstruct(mut self) -> StateRegistry {
        self.video.shutdown();
        self.feed.shutdown();

        self.state
    }

    async fn tick_logic(&mut self) {
        let now = Instant::now();
        self.video.tick_logic(now - self.last_tick).await;
        self.last_tick = now;

        if let Some(token) = self.login.poll().await {
            self.on_login(token);
        }

        if self.chatbot.tick_logic().await {
            self.controls.chatbot_input.clear();
            self.focus
                .refocus(FocusState::flat(Screen::ChatbotModal, 0), &mut self.controls);
        }

        match self.comments.tick_logic().await {
            Some(SendOutcome::Sent) => {
                self.controls.comment.clear();
                self.focus.refocus(
                    FocusState::main(Section::Comments.index(), 0),
                    &mut self.controls,
                );

                if !self.feed.is_connected() {
                    self.comments.reload(self.token());
                }
            }
            Some(SendOutcome::Rejected(reason)) => self.notice = Some(reason),
            None => {}
        }

        self.weather.tick_logic().await;

        while let Some(event) = self.feed.try_next_event() {
            self.on_feed_event(event);
        }
    }

    fn on_feed_event(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::NewComment(comment) => self.comments.push(comment),
            FeedEvent::ReconnectFailed => {
                self.notice = Some("Live comments lost, using HTTP.".to_string());
            }
            FeedEvent::ServerError(message) => {
                log::warn!("Live feed server error: {message}");
                self.notice = Some(message);
            }
            FeedEvent::Reconnected { attempt } => {
                log::info!("Live feed reconnected after {attempt} attempts");
                self.comments.reload(self.token());
            }
            FeedEvent::Connected => log::info!("Live feed connected"),
            FeedEvent::Disconnected => log::warn!("Live feed disconnected"),
            FeedEvent::ConnectError(error) => log::debug!("Live feed connect error: {error}"),
        }
    }

    fn on_login(&mut self, token: String) {
        log::info!("Logged in");

        self.state.session = Session::new(token.clone(), self.settings.session_ttl);
        self.controls.password.clear();
        self.notice = None;

        self.feed.restart(Some(token.clone()));
        self.comments.reload(Some(token));
        self.focus.set_active_screen(Screen::Main, &mut self.controls);
    }

    fn dispatch_activations(&mut self) {
        for activation in self.controls.take_pending() {
            match activation {
                Activation::Click(control) => self.activate(control),
                Activation::Scroll(delta) => self.comments.scroll_by(delta),
            }
        }
    }

    fn activate(&mut self, control: ControlId) {
        log::debug!("Activating {control}");

        match control {
            ControlId::LoginButton => {
                let email = self.controls.email.trim().to_string();
                let password = self.controls.password.clone();
                self.login.submit(email, password);
            }
            ControlId::BackButton | ControlId::ChatbotClose => {
                self.focus.set_active_screen(Screen::Main, &mut self.controls);
            }
            ControlId::ChatbotButton => {
                let Some(token) = self.valid_token() else {
                    return self.require_login();
                };

                self.focus
                    .set_active_screen(Screen::ChatbotModal, &mut self.controls);
                self.chatbot.load_history(token);
            }
            ControlId::ChatbotSend => {
                let message = self.controls.chatbot_input.trim().to_string();
                if message.is_empty() {
                    return;
                }

                let Some(token) = self.valid_token() else {
                    return self.require_login();
                };

                self.chatbot.send(token, message);
            }
            ControlId::SendComment => {
                let comment = self.controls.comment.trim().to_string();
                if comment.is_empty() {
                    return;
                }

                let Some(token) = self.valid_token() else {
                    return self.require_login();
                };

                if !self.comments.send(token, comment) {
                    log::debug!("A comment is already being sent");
                }
            }
            ControlId::WeatherSubmit => {
                let city = self.controls.city.trim().to_string();
                if !city.is_empty() {
                    self.weather.request(WeatherQuery::City(city));
                }
            }
            ControlId::WeatherGeolocation => {
                if self.settings.location.is_none() {
                    self.notice = Some(format!(
                        "Location unavailable, showing {}.",
                        self.settings.default_city
                    ));
                }

                let query = self.local_weather_query();
                self.weather.request(query);
            }
            ControlId::PlayPause
            | ControlId::Replay
            | ControlId::Rewind
            | ControlId::Forward
            | ControlId::Mute
            | ControlId::Fullscreen => self.video.activate(control),
            _ => {}
        }
    }

    fn require_login(&mut self) {
        log::info!("Session missing or expired, asking to log in");

        self.state.session.clear();
        self.focus.set_active_screen(Screen::Login, &mut self.controls);
    }

    fn valid_token(&self) -> Option<String> {
        self.state
            .session
            .is_valid()
            .then(|| self.token())
            .flatten()
    }

    fn token(&self) -> Option<String> {
        self.state.session.token().map(str::to_string)
    }

    fn local_weather_query(&self) -> WeatherQuery {
        match self.settings.location {
            Some(Location { lat, lon }) => WeatherQuery::Coordinates { lat, lon },
            None => WeatherQuery::City(self.settings.default_city.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use ratatui::crossterm::event::{
        Event, KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers,
    };

    use super::*;
    use crate::api::{
        auth::mock::AuthApiMock,
        chatbot::mock::ChatbotApiMock,
        live::mock::LiveApiMock,
        live_feed::{CommentAck, mock::LiveFeedMock},
        weather::mock::WeatherApiMock,
    };

    type MockPage = Page<AuthApiMock, LiveApiMock, WeatherApiMock, ChatbotApiMock, LiveFeedMock>;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn page(session: Session, feed: LiveFeedMock) -> MockPage {
        let apis = ApiRegistry {
            auth_api: AuthApiMock::new(),
            live_api: LiveApiMock::new(),
            weather_api: WeatherApiMock,
            chatbot_api: ChatbotApiMock::new(),
        };

        Page::construct(StateRegistry { session }, apis, feed, &Config::default()).unwrap()
    }

    fn logged_in() -> Session {
        Session::new("token".to_string(), chrono::Duration::minutes(10))
    }

    async fn press(page: &mut MockPage, code: KeyCode) -> Option<OutgoingMessage> {
        page.tick(Some(key(code))).await
    }

    async fn type_text(page: &mut MockPage, text: &str) {
        for c in text.chars() {
            press(page, KeyCode::Char(c)).await;
        }
    }

    async fn settle(page: &mut MockPage) {
        for _ in 0..100 {
            tokio::task::yield_now().await;
            page.tick(None).await;
        }
    }

    #[tokio::test]
    async fn test_starts_on_login_without_session() {
        let mut page = page(Session::default(), LiveFeedMock::new());
        settle(&mut page).await;

        assert_eq!(page.focus.screen(), Screen::Login);
        assert_eq!(page.controls.focused(), Some(ControlId::Email));
        assert_eq!(page.comments.comments().len(), 2);
        assert!(page.weather.report().is_some());
        assert!(page.video.player().source().is_some());
    }

    #[tokio::test]
    async fn test_login_flow() {
        let feed = LiveFeedMock::new();
        let mut page = page(Session::default(), feed.clone());

        type_text(&mut page, "viewer@example.com").await;
        press(&mut page, KeyCode::Tab).await;
        assert_eq!(page.focus.state(), FocusState::flat(Screen::Login, 1));

        type_text(&mut page, "wrong").await;
        press(&mut page, KeyCode::Tab).await;
        assert_eq!(page.controls.focused(), Some(ControlId::LoginButton));

        press(&mut page, KeyCode::Enter).await;
        settle(&mut page).await;
        assert_eq!(page.focus.screen(), Screen::Login);
        assert_eq!(page.login.error(), Some("Invalid credentials"));

        page.controls.password = "secret".to_string();
        press(&mut page, KeyCode::Enter).await;
        settle(&mut page).await;

        assert_eq!(page.focus.state(), FocusState::flat(Screen::Main, 0));
        assert!(page.session().is_valid());
        assert!(page.controls.password.is_empty());
        assert_eq!(
            feed.token().as_deref(),
            Some("mock-token-viewer@example.com")
        );
    }

    #[tokio::test]
    async fn test_back_button_leaves_login() {
        let mut page = page(Session::default(), LiveFeedMock::new());

        press(&mut page, KeyCode::Esc).await;

        assert_eq!(page.focus.state(), FocusState::flat(Screen::Main, 0));
        assert_eq!(page.controls.focused(), Some(ControlId::ChannelSelector));
    }

    #[tokio::test]
    async fn test_chatbot_requires_session() {
        let mut page = page(Session::default(), LiveFeedMock::new());
        press(&mut page, KeyCode::Esc).await;

        press(&mut page, KeyCode::Left).await;
        assert_eq!(page.controls.focused(), Some(ControlId::ChatbotButton));

        press(&mut page, KeyCode::Enter).await;
        assert_eq!(page.focus.screen(), Screen::Login);
    }

    #[tokio::test]
    async fn test_chatbot_round_trip() {
        let mut page = page(logged_in(), LiveFeedMock::new());
        assert_eq!(page.focus.screen(), Screen::Main);

        press(&mut page, KeyCode::Left).await;
        press(&mut page, KeyCode::Enter).await;
        assert_eq!(page.focus.state(), FocusState::flat(Screen::ChatbotModal, 0));
        settle(&mut page).await;

        type_text(&mut page, "bonjour").await;
        press(&mut page, KeyCode::Right).await;
        press(&mut page, KeyCode::Enter).await;
        settle(&mut page).await;

        assert!(page.controls.chatbot_input.is_empty());
        assert_eq!(page.focus.state(), FocusState::flat(Screen::ChatbotModal, 0));
        assert_eq!(page.chatbot.lines().len(), 2);

        press(&mut page, KeyCode::Left).await;
        assert_eq!(page.controls.focused(), Some(ControlId::ChatbotClose));
        press(&mut page, KeyCode::Enter).await;

        assert_eq!(page.focus.state(), FocusState::flat(Screen::Main, 0));
    }

    #[tokio::test]
    async fn test_reopening_chatbot_keeps_single_conversation() {
        let mut page = page(logged_in(), LiveFeedMock::new());

        press(&mut page, KeyCode::Left).await;
        press(&mut page, KeyCode::Enter).await;
        settle(&mut page).await;

        type_text(&mut page, "bonjour").await;
        press(&mut page, KeyCode::Right).await;
        press(&mut page, KeyCode::Enter).await;
        settle(&mut page).await;
        assert_eq!(page.chatbot.lines().len(), 2);

        press(&mut page, KeyCode::Esc).await;
        assert_eq!(page.focus.screen(), Screen::Main);

        press(&mut page, KeyCode::Left).await;
        press(&mut page, KeyCode::Enter).await;
        assert_eq!(page.focus.screen(), Screen::ChatbotModal);
        settle(&mut page).await;

        assert_eq!(
            page.chatbot.lines(),
            &[
                chatbot::ChatLine::User("bonjour".into()),
                chatbot::ChatLine::Bot("You said: bonjour".into())
            ]
        );
    }

    #[tokio::test]
    async fn test_comment_input_scrolls_and_sends() {
        let feed = LiveFeedMock::new();
        feed.set_connected(true, Some(CommentAck::Accepted));
        let mut page = page(logged_in(), feed.clone());
        settle(&mut page).await;

        for second in 0..10 {
            page.comments.push(crate::api::common_types::Comment {
                id: None,
                username: None,
                comment: format!("#{second}"),
                created_at: chrono::NaiveDate::from_ymd_opt(2020, 1, 1)
                    .and_then(|date| date.and_hms_opt(0, 0, second))
                    .unwrap(),
            });
        }
        let bottom = page.comments.scroll();

        press(&mut page, KeyCode::Down).await;
        assert_eq!(page.controls.focused(), Some(ControlId::CommentInput));

        press(&mut page, KeyCode::Up).await;
        assert_eq!(page.controls.focused(), Some(ControlId::CommentInput));
        assert_eq!(page.comments.scroll(), bottom - 3);

        type_text(&mut page, "Hello live").await;
        press(&mut page, KeyCode::Tab).await;
        assert_eq!(page.controls.focused(), Some(ControlId::SendComment));

        press(&mut page, KeyCode::Enter).await;
        settle(&mut page).await;

        assert_eq!(feed.emitted(), vec!["Hello live".to_string()]);
        assert!(page.controls.comment.is_empty());
        assert_eq!(
            page.focus.state(),
            FocusState::main(Section::Comments.index(), 0)
        );
        assert_eq!(
            page.comments.comments().last().map(|c| c.comment.as_str()),
            Some("Hello live")
        );
    }

    #[tokio::test]
    async fn test_escape_in_main_needs_session() {
        let mut page = page(Session::default(), LiveFeedMock::new());
        press(&mut page, KeyCode::Esc).await;
        press(&mut page, KeyCode::Esc).await;
        assert_eq!(page.focus.screen(), Screen::Main);

        let mut page = self::page(logged_in(), LiveFeedMock::new());
        press(&mut page, KeyCode::Esc).await;
        assert_eq!(page.focus.screen(), Screen::Login);
    }

    #[tokio::test]
    async fn test_selection_and_range_keys() {
        let mut page = page(logged_in(), LiveFeedMock::new());
        settle(&mut page).await;

        press(&mut page, KeyCode::Char('+')).await;
        assert_eq!(page.video.selected_channel(), Some("france24"));

        for _ in 0..6 {
            press(&mut page, KeyCode::Right).await;
        }
        assert_eq!(page.controls.focused(), Some(ControlId::VolumeBar));

        press(&mut page, KeyCode::Char('-')).await;
        assert_eq!(page.video.player().volume(), 0.9);
    }

    #[tokio::test]
    async fn test_feed_events_reach_the_page() {
        let feed = LiveFeedMock::new();
        let mut page = page(logged_in(), feed.clone());

        feed.push_event(FeedEvent::ReconnectFailed);
        page.tick(None).await;

        assert_eq!(page.notice.as_deref(), Some("Live comments lost, using HTTP."));
    }

    #[tokio::test]
    async fn test_quit() {
        let mut page = page(logged_in(), LiveFeedMock::new());

        assert!(matches!(
            press(&mut page, KeyCode::F(10)).await,
            Some(OutgoingMessage::Exit)
        ));
    }
}
