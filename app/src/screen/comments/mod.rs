use std::{cell::Cell, time::Duration};

use itertools::Itertools;
use ratatui::{Frame, layout::Rect};

use super::{common::ApiTask, controls::Controls, resources::Resources};
use crate::api::{
    ApiError,
    common_types::Comment,
    live::LiveApiT,
    live_feed::{CommentAck, LiveFeedT},
};

mod view;

const ACK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, PartialEq)]
pub enum SendOutcome {
    Sent,
    Rejected(String),
}

pub struct Model<L: LiveApiT, F: LiveFeedT> {
    comments: Vec<Comment>,
    max_comments: usize,
    /// First visible row.
    scroll: usize,
    visible_rows: Cell<usize>,
    fallback_delay: Duration,

    load_task: ApiTask<L, Result<Vec<Comment>, ApiError>>,
    send_task: ApiTask<(L, F), Result<CommentAck, ApiError>>,
}

impl<L: LiveApiT, F: LiveFeedT> Model<L, F> {
    pub fn new(live_api: L, feed: F, max_comments: usize, fallback_delay: Duration) -> Self {
        Self {
            comments: vec![],
            max_comments,
            scroll: 0,
            visible_rows: Cell::new(0),
            fallback_delay,

            load_task: ApiTask::new(live_api.clone()),
            send_task: ApiTask::new((live_api, feed)),
        }
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn is_sending(&self) -> bool {
        self.send_task.is_running()
    }

    pub fn reload(&mut self, token: Option<String>) {
        self.load_task.restart(|live_api| async move {
            log::info!("Requesting live comments");
            live_api.comments(token.as_deref()).await
        });
    }

    /// Appends `comment` unless it is already shown, dropping the oldest past the cap.
    pub fn push(&mut self, comment: Comment) {
        let key = comment.key();
        if self.comments.iter().any(|existing| existing.key() == key) {
            log::debug!("Dropping duplicate comment from {}", comment.author());
            return;
        }

        self.comments.push(comment);

        let overflow = self.comments.len().saturating_sub(self.max_comments);
        self.comments.drain(..overflow);

        self.scroll_to_bottom();
    }

    pub fn scroll_by(&mut self, delta: i32) {
        let scroll = (self.scroll as i64 + delta as i64).clamp(0, self.max_scroll() as i64);
        self.scroll = scroll as usize;
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll = self.max_scroll();
    }

    fn max_scroll(&self) -> usize {
        self.comments
            .len()
            .saturating_sub(self.visible_rows.get())
    }

    /// Emits over the live feed when it is (or quickly becomes) connected, otherwise
    /// posts over HTTP. Returns whether the send was started.
    pub fn send(&mut self, token: String, text: String) -> bool {
        let fallback_delay = self.fallback_delay;

        self.send_task.start(|(live_api, feed)| async move {
            if !feed.is_connected() {
                log::warn!("Live feed is down, asking it to reconnect");
                feed.reconnect();
                tokio::time::sleep(fallback_delay).await;
            }

            if feed.is_connected() {
                match tokio::time::timeout(ACK_TIMEOUT, feed.emit_comment(text.clone())).await {
                    Ok(Ok(ack)) => return Ok(ack),
                    Ok(Err(_)) => log::warn!("Comment was not delivered over the live feed"),
                    Err(_) => log::warn!("Comment was not acknowledged in time"),
                }
            }

            log::info!("Posting comment over HTTP");
            live_api
                .post_comment(&token, &text)
                .await
                .map(|()| CommentAck::Accepted)
        })
    }

    /// Applies finished requests. Returns the outcome of a finished send, if any.
    pub async fn tick_logic(&mut self) -> Option<SendOutcome> {
        if let Some(result) = self.load_task.poll().await {
            match result {
                Ok(comments) => {
                    log::info!("Loaded {} comments", comments.len());

                    self.comments.clear();
                    for comment in comments
                        .into_iter()
                        .sorted_by_key(|comment| comment.created_at)
                    {
                        self.push(comment);
                    }
                    self.scroll_to_bottom();
                }
                Err(error) => log::error!("Failed to load comments: {error}"),
            }
        }

        let result = self.send_task.poll().await?;

        Some(match result {
            Ok(CommentAck::Accepted) => SendOutcome::Sent,
            Ok(CommentAck::Rejected(reason)) => SendOutcome::Rejected(reason),
            Err(error) => {
                log::error!("Failed to send comment: {error}");
                SendOutcome::Rejected(
                    error
                        .server_message()
                        .map(str::to_string)
                        .unwrap_or_else(|| "Unable to send the comment.".to_string()),
                )
            }
        })
    }

    pub(super) fn render(
        &self,
        controls: &Controls,
        active: bool,
        frame: &mut Frame<'_>,
        area: Rect,
        resources: &Resources,
    ) {
        view::render(self, controls, active, frame, area, resources);
    }
}
