use ratatui::{Frame, layout::Rect};

use super::{common::ApiTask, controls::Controls, resources::Resources};
use crate::api::{ApiError, auth::AuthApiT, common_types::LoginResponse};

mod view;

pub struct Model<A: AuthApiT> {
    task: ApiTask<A, Result<LoginResponse, ApiError>>,
    error: Option<String>,
}

impl<A: AuthApiT> Model<A> {
    pub fn new(auth_api: A) -> Self {
        Self {
            task: ApiTask::new(auth_api),
            error: None,
        }
    }

    pub fn submit(&mut self, email: String, password: String) {
        self.error = None;

        let started = self.task.start(|auth_api| async move {
            log::info!("Logging in as {email}");
            auth_api.login(&email, &password).await
        });

        if !started {
            log::debug!("Login already in progress");
        }
    }

    pub fn is_pending(&self) -> bool {
        self.task.is_running()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Token of a finished successful login. A failed one is kept as the form error.
    pub async fn poll(&mut self) -> Option<String> {
        let result = self.task.poll().await?;

        let failure = match result {
            Ok(LoginResponse {
                access_token: Some(token),
                ..
            }) if !token.is_empty() => return Some(token),
            Ok(response) => response
                .message
                .unwrap_or_else(|| "Login failed".to_string()),
            Err(error) => {
                log::error!("Login request failed: {error}");
                error
                    .server_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| "Unable to reach the server".to_string())
            }
        };

        log::warn!("Login rejected: {failure}");
        self.error = Some(failure);

        None
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
