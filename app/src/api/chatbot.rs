use async_trait::async_trait;

use super::{
    ApiError, Backend,
    common_types::{ChatExchange, ChatMessage, ChatReply},
};

#[async_trait]
pub trait ChatbotApiT: Clone + Send + Sync + 'static {
    async fn send(&self, token: &str, message: &str) -> Result<ChatReply, ApiError>;

    async fn history(&self, token: &str) -> Result<Vec<ChatExchange>, ApiError>;
}

#[derive(Clone)]
pub struct ChatbotApi {
    backend: Backend,
}

impl ChatbotApi {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ChatbotApiT for ChatbotApi {
    async fn send(&self, token: &str, message: &str) -> Result<ChatReply, ApiError> {
        let url = self.backend.endpoint(&["chat", "send"])?;
        let request = self
            .backend
            .post(url, Some(token))
            .json(&ChatMessage { message });

        self.backend.send(request).await
    }

    async fn history(&self, token: &str) -> Result<Vec<ChatExchange>, ApiError> {
        let url = self.backend.endpoint(&["chat", "history"])?;

        self.backend.send(self.backend.get(url, Some(token))).await
    }
}

pub mod mock {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone)]
    pub struct ChatbotApiMock {
        history: Arc<Mutex<Vec<ChatExchange>>>,
    }

    impl ChatbotApiMock {
        pub fn new() -> Self {
            Self {
                history: Arc::new(Mutex::new(vec![])),
            }
        }
    }

    #[async_trait]
    impl ChatbotApiT for ChatbotApiMock {
        async fn send(&self, _token: &str, message: &str) -> Result<ChatReply, ApiError> {
            let response = format!("You said: {message}");

            self.history
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(ChatExchange {
                    message: message.into(),
                    response: response.clone(),
                    created_at: None,
                });

            Ok(ChatReply {
                response: Some(response),
                created_at: None,
            })
        }

        async fn history(&self, _token: &str) -> Result<Vec<ChatExchange>, ApiError> {
            Ok(self
                .history
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone())
        }
    }
}
