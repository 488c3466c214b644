//! Live comment feed: a Socket.IO client running on its own task.
//!
//! The page talks to the task through [`LiveFeedT`]; the task reports back with
//! [`FeedEvent`]s and resolves comment acknowledgements over one-shot channels.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use thiserror::Error;
use tokio::{
    net::TcpStream,
    sync::{mpsc, oneshot},
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};
use url::Url;

use super::common_types::Comment;

pub mod packet;

use packet::{EnginePacket, Handshake, PacketError, SocketPacket};

const NEW_COMMENT_EVENT: &str = "new_comment";
const ERROR_EVENT: &str = "error";

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("WebSocket failure: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error(transparent)]
    Packet(#[from] PacketError),
    #[error("Connection refused by server: {0}")]
    Refused(String),
    #[error("Connection closed during handshake")]
    Closed,
    #[error("Backend url `{0}` has no WebSocket equivalent")]
    Url(Url),
    #[error("No handshake from server within {0:?}")]
    Timeout(Duration),
}

#[derive(Clone, Debug, PartialEq)]
pub enum FeedEvent {
    Connected,
    Disconnected,
    NewComment(Comment),
    ServerError(String),
    ConnectError(String),
    Reconnected { attempt: u32 },
    ReconnectFailed,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CommentAck {
    Accepted,
    Rejected(String),
}

impl CommentAck {
    fn from_payload(data: &Value) -> Self {
        let reply = data.as_array().and_then(|args| args.first()).unwrap_or(data);

        match reply.get("error") {
            Some(Value::String(error)) => Self::Rejected(error.clone()),
            Some(error) if !error.is_null() => Self::Rejected(error.to_string()),
            _ => Self::Accepted,
        }
    }
}

#[derive(Debug)]
enum FeedCommand {
    EmitComment {
        text: String,
        ack: oneshot::Sender<CommentAck>,
    },
    Reconnect,
    Restart {
        token: Option<String>,
    },
    Shutdown,
}

pub trait LiveFeedT: Clone + Send + Sync + 'static {
    fn is_connected(&self) -> bool;

    /// The receiver is dropped without a value when the comment could not be delivered.
    fn emit_comment(&self, text: String) -> oneshot::Receiver<CommentAck>;

    fn reconnect(&self);

    /// Drops the current connection and connects again with `token`.
    fn restart(&self, token: Option<String>);

    fn try_next_event(&self) -> Option<FeedEvent>;

    fn shutdown(&self);
}

#[derive(Clone, Debug)]
pub struct FeedSettings {
    pub url: Url,
    pub namespace: String,
    pub token: Option<String>,
    pub reconnection_attempts: u32,
    pub reconnection_delay: Duration,
    /// Bound on a single attempt, from TCP connect to the namespace reply.
    pub connect_timeout: Duration,
}

impl FeedSettings {
    /// Derives the Engine.IO WebSocket endpoint from the backend's HTTP url.
    pub fn socket_url(backend: &Url) -> Result<Url, FeedError> {
        let mut url = backend.clone();

        let scheme = match backend.scheme() {
            "https" | "wss" => "wss",
            _ => "ws",
        };
        url.set_scheme(scheme)
            .map_err(|_| FeedError::Url(backend.clone()))?;

        url.path_segments_mut()
            .map_err(|_| FeedError::Url(backend.clone()))?
            .pop_if_empty()
            .extend(["socket.io", ""]);

        url.query_pairs_mut()
            .clear()
            .append_pair("EIO", "4")
            .append_pair("transport", "websocket");

        Ok(url)
    }
}

#[derive(Clone)]
pub struct LiveFeed {
    commands: mpsc::UnboundedSender<FeedCommand>,
    events: Arc<Mutex<mpsc::UnboundedReceiver<FeedEvent>>>,
    connected: Arc<AtomicBool>,
}

impl LiveFeed {
    /// Spawns the feed task on the current tokio runtime.
    pub fn spawn(settings: FeedSettings) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(false));

        let task = FeedTask::new(settings, command_rx, event_tx, connected.clone());
        tokio::spawn(task.run());

        Self {
            commands: command_tx,
            events: Arc::new(Mutex::new(event_rx)),
            connected,
        }
    }

    fn send(&self, command: FeedCommand) {
        if self.commands.send(command).is_err() {
            log::warn!("Live feed task is gone, command dropped");
        }
    }
}

impl LiveFeedT for LiveFeed {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn emit_comment(&self, text: String) -> oneshot::Receiver<CommentAck> {
        let (ack, receiver) = oneshot::channel();
        self.send(FeedCommand::EmitComment { text, ack });
        receiver
    }

    fn reconnect(&self) {
        self.send(FeedCommand::Reconnect);
    }

    fn restart(&self, token: Option<String>) {
        self.send(FeedCommand::Restart { token });
    }

    fn try_next_event(&self) -> Option<FeedEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .try_recv()
            .ok()
    }

    fn shutdown(&self) {
        self.send(FeedCommand::Shutdown);
    }
}

enum Interrupt {
    Shutdown,
    Restart { token: Option<String> },
    Lost,
}

struct FeedTask {
    settings: FeedSettings,
    token: Option<String>,
    commands: mpsc::UnboundedReceiver<FeedCommand>,
    events: mpsc::UnboundedSender<FeedEvent>,
    connected: Arc<AtomicBool>,
    next_ack_id: u64,
    pending_acks: HashMap<u64, oneshot::Sender<CommentAck>>,
}

impl FeedTask {
    fn new(
        settings: FeedSettings,
        commands: mpsc::UnboundedReceiver<FeedCommand>,
        events: mpsc::UnboundedSender<FeedEvent>,
        connected: Arc<AtomicBool>,
    ) -> Self {
        Self {
            token: settings.token.clone(),
            settings,
            commands,
            events,
            connected,
            next_ack_id: 0,
            pending_acks: HashMap::new(),
        }
    }

    async fn run(mut self) {
        let mut was_connected = false;

        loop {
            let (socket, handshake) = match self.connect_with_retries(was_connected).await {
                Ok(Some(connection)) => connection,
                Ok(None) => {
                    self.emit(FeedEvent::ReconnectFailed);
                    match self.idle().await {
                        Interrupt::Shutdown => return,
                        Interrupt::Restart { token } => self.token = token,
                        Interrupt::Lost => {}
                    }
                    was_connected = false;
                    continue;
                }
                Err(Interrupt::Restart { token }) => {
                    self.token = token;
                    was_connected = false;
                    continue;
                }
                Err(_) => return,
            };

            was_connected = true;

            let interrupt = self.serve(socket, &handshake).await;

            self.connected.store(false, Ordering::Release);
            self.pending_acks.clear();

            match interrupt {
                Interrupt::Shutdown => return,
                Interrupt::Restart { token } => {
                    self.token = token;
                    was_connected = false;
                }
                Interrupt::Lost => self.emit(FeedEvent::Disconnected),
            }
        }
    }

    /// `Ok(None)` once every attempt failed; `Err` when a command interrupted the attempts.
    async fn connect_with_retries(
        &mut self,
        was_connected: bool,
    ) -> Result<Option<(Socket, Handshake)>, Interrupt> {
        let mut attempt = 0;

        loop {
            match self.connect_or_interrupt().await? {
                Ok(connection) => {
                    log::info!("Live feed connected to {}", self.settings.namespace);

                    self.connected.store(true, Ordering::Release);
                    self.emit(FeedEvent::Connected);
                    if was_connected || attempt > 0 {
                        self.emit(FeedEvent::Reconnected { attempt });
                    }

                    return Ok(Some(connection));
                }
                Err(error) => {
                    log::warn!("Live feed connection attempt {attempt} failed: {error}");
                    self.emit(FeedEvent::ConnectError(error.to_string()));
                }
            }

            if attempt >= self.settings.reconnection_attempts {
                log::error!("Live feed gave up after {attempt} reconnection attempts");
                return Ok(None);
            }
            attempt += 1;

            let delay = tokio::time::sleep(self.settings.reconnection_delay);
            tokio::pin!(delay);

            loop {
                tokio::select! {
                    _ = &mut delay => break,
                    command = self.commands.recv() => {
                        if let Some(interrupt) = offline_interrupt(command) {
                            return Err(interrupt);
                        }
                    }
                }
            }
        }
    }

    /// One bounded connection attempt that still answers restart and shutdown requests.
    async fn connect_or_interrupt(
        &mut self,
    ) -> Result<Result<(Socket, Handshake), FeedError>, Interrupt> {
        let connecting = tokio::time::timeout(
            self.settings.connect_timeout,
            connect(&self.settings, self.token.as_deref()),
        );
        tokio::pin!(connecting);

        loop {
            tokio::select! {
                result = &mut connecting => {
                    let timeout = self.settings.connect_timeout;
                    return Ok(result.unwrap_or(Err(FeedError::Timeout(timeout))));
                }
                command = self.commands.recv() => {
                    if let Some(interrupt) = offline_interrupt(command) {
                        return Err(interrupt);
                    }
                }
            }
        }
    }

    async fn idle(&mut self) -> Interrupt {
        loop {
            match self.commands.recv().await {
                Some(FeedCommand::Reconnect) => return Interrupt::Lost,
                command => {
                    if let Some(interrupt) = offline_interrupt(command) {
                        return interrupt;
                    }
                }
            }
        }
    }

    async fn serve(&mut self, socket: Socket, handshake: &Handshake) -> Interrupt {
        let (mut sink, mut stream) = socket.split();

        let liveness = handshake.liveness();
        let silence = tokio::time::sleep(liveness.unwrap_or(Duration::MAX));
        tokio::pin!(silence);

        loop {
            tokio::select! {
                _ = &mut silence, if liveness.is_some() => {
                    log::warn!("Live feed server went silent");
                    return Interrupt::Lost;
                }
                frame = stream.next() => {
                    let text = match frame {
                        Some(Ok(Message::Text(text))) => text,
                        Some(Ok(Message::Close(_))) | None => return Interrupt::Lost,
                        Some(Ok(_)) => continue,
                        Some(Err(error)) => {
                            log::warn!("Live feed socket failed: {error}");
                            return Interrupt::Lost;
                        }
                    };

                    if let Some(liveness) = liveness {
                        silence.as_mut().reset(tokio::time::Instant::now() + liveness);
                    }

                    match self.handle_frame(&text) {
                        Ok(Some(reply)) => {
                            if let Err(error) = sink.send(Message::Text(reply)).await {
                                log::warn!("Live feed failed to answer: {error}");
                                return Interrupt::Lost;
                            }
                        }
                        Ok(None) => {}
                        Err(interrupt) => return interrupt,
                    }
                }
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        let _ = sink.close().await;
                        return Interrupt::Shutdown;
                    };

                    match command {
                        FeedCommand::EmitComment { text, ack } => {
                            let id = self.next_ack_id;
                            self.next_ack_id += 1;

                            let packet = SocketPacket::event(
                                &self.settings.namespace,
                                Some(id),
                                NEW_COMMENT_EVENT,
                                vec![json!({ "comment": text })],
                            );

                            let frame = EnginePacket::Message(packet.encode()).encode();

                            match sink.send(Message::Text(frame)).await {
                                Ok(()) => self.track_ack(id, ack),
                                Err(error) => {
                                    log::warn!("Live feed failed to emit comment: {error}");
                                    return Interrupt::Lost;
                                }
                            }
                        }
                        FeedCommand::Reconnect => {}
                        FeedCommand::Restart { token } => {
                            let _ = sink.close().await;
                            return Interrupt::Restart { token };
                        }
                        FeedCommand::Shutdown => {
                            let _ = sink.close().await;
                            return Interrupt::Shutdown;
                        }
                    }
                }
            }
        }
    }

    /// Registers `ack` under `id`, dropping acknowledgements nobody waits for anymore.
    fn track_ack(&mut self, id: u64, ack: oneshot::Sender<CommentAck>) {
        self.pending_acks.retain(|_, pending| !pending.is_closed());
        self.pending_acks.insert(id, ack);
    }

    /// Handles one incoming frame, returning the frame to send back if any.
    fn handle_frame(&mut self, text: &str) -> Result<Option<String>, Interrupt> {
        let packet = match EnginePacket::parse(text) {
            Ok(packet) => packet,
            Err(error) => {
                log::warn!("Dropping malformed Engine.IO frame: {error}");
                return Ok(None);
            }
        };

        let body = match packet {
            EnginePacket::Ping => return Ok(Some(EnginePacket::Pong.encode())),
            EnginePacket::Close => return Err(Interrupt::Lost),
            EnginePacket::Message(body) => body,
            _ => return Ok(None),
        };

        let packet = match SocketPacket::parse(&body) {
            Ok(packet) => packet,
            Err(error) => {
                log::warn!("Dropping malformed Socket.IO packet: {error}");
                return Ok(None);
            }
        };

        if packet.namespace() != self.settings.namespace {
            return Ok(None);
        }

        match &packet {
            SocketPacket::Event { .. } => self.handle_event(&packet),
            SocketPacket::Ack { id, data, .. } => {
                if let Some(ack) = self.pending_acks.remove(id) {
                    let _ = ack.send(CommentAck::from_payload(data));
                }
            }
            SocketPacket::Disconnect { .. } => return Err(Interrupt::Lost),
            SocketPacket::ConnectError { data, .. } => {
                self.emit(FeedEvent::ServerError(error_message(data)));
            }
            SocketPacket::Connect { .. } => {}
        }

        Ok(None)
    }

    fn handle_event(&self, packet: &SocketPacket) {
        let Some((name, payload)) = packet.event_parts() else {
            return;
        };

        match name {
            NEW_COMMENT_EVENT => {
                let comment = payload
                    .cloned()
                    .map(serde_json::from_value::<Comment>)
                    .transpose();

                match comment {
                    Ok(Some(comment)) => self.emit(FeedEvent::NewComment(comment)),
                    Ok(None) => log::warn!("Received new_comment without payload"),
                    Err(error) => log::warn!("Received malformed comment: {error}"),
                }
            }
            ERROR_EVENT => {
                let message = payload.map(error_message).unwrap_or_default();
                self.emit(FeedEvent::ServerError(message));
            }
            other => log::debug!("Ignoring live feed event `{other}`"),
        }
    }

    fn emit(&self, event: FeedEvent) {
        let _ = self.events.send(event);
    }
}

async fn connect(
    settings: &FeedSettings,
    token: Option<&str>,
) -> Result<(Socket, Handshake), FeedError> {
    let (mut socket, _) = tokio_tungstenite::connect_async(settings.url.as_str()).await?;

    let handshake = loop {
        if let EnginePacket::Open(handshake) = next_engine_packet(&mut socket).await? {
            log::debug!("Engine.IO session {} opened", handshake.sid);
            break handshake;
        }
    };

    let connect = SocketPacket::Connect {
        namespace: settings.namespace.clone(),
        data: token.map(|token| json!({ "token": token })),
    };
    socket
        .send(Message::Text(EnginePacket::Message(connect.encode()).encode()))
        .await?;

    loop {
        match next_engine_packet(&mut socket).await? {
            EnginePacket::Ping => {
                socket
                    .send(Message::Text(EnginePacket::Pong.encode()))
                    .await?;
            }
            EnginePacket::Message(body) => {
                let packet = SocketPacket::parse(&body)?;
                if packet.namespace() != settings.namespace {
                    continue;
                }

                match packet {
                    SocketPacket::Connect { .. } => return Ok((socket, handshake)),
                    SocketPacket::ConnectError { data, .. } => {
                        return Err(FeedError::Refused(error_message(&data)));
                    }
                    _ => {}
                }
            }
            EnginePacket::Close => return Err(FeedError::Closed),
            _ => {}
        }
    }
}

/// Maps a command received while offline to the interrupt it causes, if any.
fn offline_interrupt(command: Option<FeedCommand>) -> Option<Interrupt> {
    match command {
        // Dropping the sender tells the caller the comment was not delivered.
        Some(FeedCommand::EmitComment { .. }) => None,
        Some(FeedCommand::Reconnect) => None,
        Some(FeedCommand::Restart { token }) => Some(Interrupt::Restart { token }),
        Some(FeedCommand::Shutdown) | None => Some(Interrupt::Shutdown),
    }
}

async fn next_engine_packet(socket: &mut Socket) -> Result<EnginePacket, FeedError> {
    loop {
        match socket.next().await {
            Some(Ok(Message::Text(text))) => return Ok(EnginePacket::parse(&text)?),
            Some(Ok(Message::Close(_))) | None => return Err(FeedError::Closed),
            Some(Ok(_)) => {}
            Some(Err(error)) => return Err(error.into()),
        }
    }
}

fn error_message(data: &Value) -> String {
    match data.get("message") {
        Some(Value::String(message)) => message.clone(),
        _ => data.to_string(),
    }
}

pub mod mock {
    use std::collections::VecDeque;

    use super::*;

    #[derive(Default)]
    struct MockState {
        connected: bool,
        events: VecDeque<FeedEvent>,
        emitted: Vec<String>,
        reconnects: u32,
        token: Option<String>,
        ack: Option<CommentAck>,
    }

    /// In-memory feed. Comments are acknowledged with the configured reply, or not delivered
    /// when none is set. Accepted comments are echoed back as feed events.
    #[derive(Clone, Default)]
    pub struct LiveFeedMock {
        state: Arc<Mutex<MockState>>,
    }

    impl LiveFeedMock {
        pub fn new() -> Self {
            Self::default()
        }

        fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
            self.state
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
        }

        pub fn set_connected(&self, connected: bool, ack: Option<CommentAck>) {
            let mut state = self.state();
            state.connected = connected;
            state.ack = ack;
        }

        pub fn push_event(&self, event: FeedEvent) {
            self.state().events.push_back(event);
        }

        pub fn emitted(&self) -> Vec<String> {
            self.state().emitted.clone()
        }

        pub fn reconnects(&self) -> u32 {
            self.state().reconnects
        }

        pub fn token(&self) -> Option<String> {
            self.state().token.clone()
        }
    }

    impl LiveFeedT for LiveFeedMock {
        fn is_connected(&self) -> bool {
            self.state().connected
        }

        fn emit_comment(&self, text: String) -> oneshot::Receiver<CommentAck> {
            let (sender, receiver) = oneshot::channel();
            let mut state = self.state();

            if state.connected {
                if let Some(ack) = state.ack.clone() {
                    if ack == CommentAck::Accepted {
                        state.events.push_back(FeedEvent::NewComment(Comment {
                            id: None,
                            username: Some("you".into()),
                            comment: text.clone(),
                            created_at: chrono::Utc::now().naive_utc(),
                        }));
                    }
                    state.emitted.push(text);
                    let _ = sender.send(ack);
                }
            }

            receiver
        }

        fn reconnect(&self) {
            self.state().reconnects += 1;
        }

        fn restart(&self, token: Option<String>) {
            self.state().token = token;
        }

        fn try_next_event(&self) -> Option<FeedEvent> {
            self.state().events.pop_front()
        }

        fn shutdown(&self) {
            self.state().connected = false;
        }
    }
}
