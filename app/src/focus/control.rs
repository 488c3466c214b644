use strum::{Display, EnumIter};

/// Focusable element of the live page.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display, EnumIter)]
pub enum ControlId {
    Email,
    Password,
    LoginButton,
    BackButton,

    ChatbotInput,
    ChatbotSend,
    ChatbotClose,

    ChannelSelector,
    Replay,
    PlayPause,
    Rewind,
    Forward,
    Mute,
    VolumeBar,
    Fullscreen,
    ChatbotButton,

    CommentInput,
    SendComment,

    WeatherCity,
    WeatherSubmit,
    WeatherGeolocation,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ControlKind {
    TextInput,
    Selection,
    Range,
    Button,
}

impl ControlKind {
    /// Controls of these kinds take input directly and are never clicked by Enter.
    pub fn accepts_direct_input(self) -> bool {
        !matches!(self, Self::Button)
    }
}

impl ControlId {
    pub fn kind(self) -> ControlKind {
        match self {
            Self::Email
            | Self::Password
            | Self::ChatbotInput
            | Self::CommentInput
            | Self::WeatherCity => ControlKind::TextInput,
            Self::ChannelSelector => ControlKind::Selection,
            Self::VolumeBar => ControlKind::Range,
            Self::LoginButton
            | Self::BackButton
            | Self::ChatbotSend
            | Self::ChatbotClose
            | Self::Replay
            | Self::PlayPause
            | Self::Rewind
            | Self::Forward
            | Self::Mute
            | Self::Fullscreen
            | Self::ChatbotButton
            | Self::SendComment
            | Self::WeatherSubmit
            | Self::WeatherGeolocation => ControlKind::Button,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Password => "Password",
            Self::LoginButton => "Log in",
            Self::BackButton => "Back",
            Self::ChatbotInput => "Message",
            Self::ChatbotSend => "Send",
            Self::ChatbotClose => "Close",
            Self::ChannelSelector => "Channel",
            Self::Replay => "⏮",
            Self::PlayPause => "⏯",
            Self::Rewind => "⏪ 10s",
            Self::Forward => "10s ⏩",
            Self::Mute => "Mute",
            Self::VolumeBar => "Volume",
            Self::Fullscreen => "Fullscreen",
            Self::ChatbotButton => "Chatbot",
            Self::CommentInput => "Comment",
            Self::SendComment => "Send",
            Self::WeatherCity => "City",
            Self::WeatherSubmit => "Search",
            Self::WeatherGeolocation => "My location",
        }
    }
}

/// What the focus controller drives: the host that actually owns the widgets.
pub trait ControlSurface {
    fn focus(&mut self, control: ControlId);

    fn click(&mut self, control: ControlId);

    fn scroll_comments(&mut self, delta: i32);
}
