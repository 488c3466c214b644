use std::io::stdout;

use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
    crossterm::{
        ExecutableCommand, event,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
};

use crate::{
    api::{
        Backend as HttpBackend,
        auth::{AuthApi, AuthApiT, mock::AuthApiMock},
        chatbot::{ChatbotApi, ChatbotApiT, mock::ChatbotApiMock},
        live::{LiveApi, LiveApiT, mock::LiveApiMock},
        live_feed::{CommentAck, FeedSettings, LiveFeed, LiveFeedT, mock::LiveFeedMock},
        storage::{StorageApi, StorageApiT, mock::StorageApiMock},
        weather::{WeatherApi, WeatherApiT, mock::WeatherApiMock},
    },
    config::Config,
    error::AppError,
    screen::{OutgoingMessage, Page, resources::Resources},
    session::Session,
};

const SESSION_FILE: &str = "session.json";

pub struct App {
    config: Config,
}

pub(crate) struct StateRegistry {
    pub session: Session,
}

pub(crate) struct ApiRegistry<A, L, W, C>
where
    A: AuthApiT,
    L: LiveApiT,
    W: WeatherApiT,
    C: ChatbotApiT,
{
    pub auth_api: A,
    pub live_api: L,
    pub weather_api: W,
    pub chatbot_api: C,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn run(self) -> Result<(), AppError> {
        let mut storage: Box<dyn StorageApiT> = match &self.config.session_dir {
            Some(dir) => Box::new(StorageApi::new(dir.clone())?),
            None => Box::new(StorageApiMock::new()),
        };

        let session = load_session(storage.as_mut()).await;
        let state = StateRegistry { session };

        if self.config.use_mock_apis {
            log::info!("Using mock backend");

            let apis = ApiRegistry {
                auth_api: AuthApiMock::new(),
                live_api: LiveApiMock::new(),
                weather_api: WeatherApiMock,
                chatbot_api: ChatbotApiMock::new(),
            };
            let feed = LiveFeedMock::new();
            feed.set_connected(true, Some(CommentAck::Accepted));

            self.run_page(state, apis, feed, storage).await
        } else {
            let backend_url = self.config.backend_url()?;
            log::info!("Using backend at {backend_url}");

            let backend = HttpBackend::new(backend_url.clone());
            let apis = ApiRegistry {
                auth_api: AuthApi::new(backend.clone()),
                live_api: LiveApi::new(backend.clone()),
                weather_api: WeatherApi::new(backend.clone()),
                chatbot_api: ChatbotApi::new(backend),
            };
            let feed = LiveFeed::spawn(FeedSettings {
                url: FeedSettings::socket_url(&backend_url)?,
                namespace: self.config.live_namespace.clone(),
                token: state
                    .session
                    .is_valid()
                    .then(|| state.session.token().map(str::to_string))
                    .flatten(),
                reconnection_attempts: self.config.reconnection_attempts,
                reconnection_delay: self.config.reconnection_delay(),
                connect_timeout: self.config.connect_timeout(),
            });

            self.run_page(state, apis, feed, storage).await
        }
    }

    async fn run_page<A, L, W, C, F>(
        &self,
        state: StateRegistry,
        apis: ApiRegistry<A, L, W, C>,
        feed: F,
        storage: Box<dyn StorageApiT>,
    ) -> Result<(), AppError>
    where
        A: AuthApiT,
        L: LiveApiT,
        W: WeatherApiT,
        C: ChatbotApiT,
        F: LiveFeedT,
    {
        let page = Page::construct(state, apis, feed, &self.config)?;

        stdout().execute(EnterAlternateScreen)?;
        enable_raw_mode()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        terminal.clear()?;

        let result = self.main_loop(&mut terminal, page, storage).await;

        stdout().execute(LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    async fn main_loop<B, A, L, W, C, F>(
        &self,
        terminal: &mut Terminal<B>,
        mut page: Page<A, L, W, C, F>,
        mut storage: Box<dyn StorageApiT>,
    ) -> Result<(), AppError>
    where
        B: Backend,
        A: AuthApiT,
        L: LiveApiT,
        W: WeatherApiT,
        C: ChatbotApiT,
        F: LiveFeedT,
    {
        let resources = Resources::default();
        let mut saved_session = page.session().clone();

        loop {
            terminal.draw(|frame| page.render(frame, &resources))?;

            let event = event::poll(self.config.tick_rate())?
                .then(event::read)
                .transpose()?;

            let msg = page.tick(event).await;

            if *page.session() != saved_session {
                saved_session = page.session().clone();
                save_session(storage.as_mut(), &saved_session).await;
            }

            if let Some(OutgoingMessage::Exit) = msg {
                log::info!("Exiting");
                page.deconstruct();
                return Ok(());
            }
        }
    }
}

async fn load_session(storage: &mut dyn StorageApiT) -> Session {
    let raw = match storage.load(SESSION_FILE).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return Session::default(),
        Err(error) => {
            log::warn!("Failed to load session: {error}");
            return Session::default();
        }
    };

    match serde_json::from_str::<Session>(&raw) {
        Ok(session) if session.is_valid() => {
            log::info!("Restored session");
            session
        }
        Ok(_) => Session::default(),
        Err(error) => {
            log::warn!("Ignoring malformed session file: {error}");
            Session::default()
        }
    }
}

async fn save_session(storage: &mut dyn StorageApiT, session: &Session) {
    let result = if session.token().is_some() {
        match serde_json::to_string(session) {
            Ok(raw) => storage.save(SESSION_FILE, raw).await,
            Err(error) => {
                log::error!("Failed to serialize session: {error}");
                return;
            }
        }
    } else {
        storage.remove(SESSION_FILE).await
    };

    if let Err(error) = result {
        log::error!("Failed to persist session: {error}");
    }
}
