use ratatui::{Frame, layout::Rect};

use super::{common::ApiTask, controls::Controls, resources::Resources};
use crate::api::{
    ApiError,
    chatbot::ChatbotApiT,
    common_types::{ChatExchange, ChatReply},
};

mod view;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatLine {
    User(String),
    Bot(String),
    Error(String),
}

pub struct Model<C: ChatbotApiT> {
    lines: Vec<ChatLine>,
    /// Lines from this index on were added after the history request started.
    history_start: usize,

    send_task: ApiTask<C, Result<ChatReply, ApiError>>,
    history_task: ApiTask<C, Result<Vec<ChatExchange>, ApiError>>,
}

impl<C: ChatbotApiT> Model<C> {
    pub fn new(chatbot_api: C) -> Self {
        Self {
            lines: vec![],
            history_start: 0,

            send_task: ApiTask::new(chatbot_api.clone()),
            history_task: ApiTask::new(chatbot_api),
        }
    }

    pub fn lines(&self) -> &[ChatLine] {
        &self.lines
    }

    pub fn is_waiting(&self) -> bool {
        self.send_task.is_running()
    }

    pub fn load_history(&mut self, token: String) {
        self.history_start = self.lines.len();
        self.history_task.restart(|chatbot_api| async move {
            log::info!("Requesting chatbot history");
            chatbot_api.history(&token).await
        });
    }

    /// Sends `message` unless a reply is still pending. Returns whether it was sent.
    pub fn send(&mut self, token: String, message: String) -> bool {
        let line = ChatLine::User(message.clone());

        let started = self.send_task.start(|chatbot_api| async move {
            chatbot_api.send(&token, &message).await
        });

        if started {
            self.lines.push(line);
        }

        started
    }

    /// Polls both requests. Returns `true` when a reply to a sent message arrived.
    pub async fn tick_logic(&mut self) -> bool {
        if let Some(history) = self.history_task.poll().await {
            match history {
                Ok(history) => {
                    log::info!("Loaded {} chatbot exchanges", history.len());

                    let start = self.history_start.min(self.lines.len());
                    let pending: Vec<_> = self.lines.drain(start..).collect();
                    self.lines = history
                        .into_iter()
                        .flat_map(|exchange| {
                            [ChatLine::User(exchange.message), ChatLine::Bot(exchange.response)]
                        })
                        .chain(pending)
                        .collect();
                }
                Err(error) => log::warn!("Failed to load chatbot history: {error}"),
            }
        }

        let Some(reply) = self.send_task.poll().await else {
            return false;
        };

        match reply {
            Ok(reply) => {
                let response = reply
                    .response
                    .unwrap_or_else(|| "(empty response)".to_string());
                self.lines.push(ChatLine::Bot(response));

                true
            }
            Err(error) => {
                log::error!("Chatbot request failed: {error}");

                let message = error
                    .server_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| "Unable to reach the chatbot.".to_string());
                self.lines.push(ChatLine::Error(message));

                false
            }
        }
    }

    pub(super) fn render(
        &self,
        controls: &Controls,
        frame: &mut Frame<'_>,
        area: Rect,
        resources: &Resources,
    ) {
        view::render(self, controls, frame, area, resources);
    }
}
