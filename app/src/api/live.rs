use async_trait::async_trait;

use super::{
    ApiError, Backend,
    common_types::{Comment, NewComment, StreamInfo},
};

#[async_trait]
pub trait LiveApiT: Clone + Send + Sync + 'static {
    async fn stream_url(&self, channel: &str) -> Result<String, ApiError>;

    async fn comments(&self, token: Option<&str>) -> Result<Vec<Comment>, ApiError>;

    /// HTTP path for posting a comment, used when the live feed is down.
    async fn post_comment(&self, token: &str, comment: &str) -> Result<(), ApiError>;
}

#[derive(Clone)]
pub struct LiveApi {
    backend: Backend,
}

impl LiveApi {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl LiveApiT for LiveApi {
    async fn stream_url(&self, channel: &str) -> Result<String, ApiError> {
        let url = self.backend.endpoint(&["live", "stream", channel])?;
        let info: StreamInfo = self.backend.send(self.backend.get(url, None)).await?;

        Ok(info.stream_url)
    }

    async fn comments(&self, token: Option<&str>) -> Result<Vec<Comment>, ApiError> {
        let url = self.backend.endpoint(&["live", "comments"])?;

        self.backend.send(self.backend.get(url, token)).await
    }

    async fn post_comment(&self, token: &str, comment: &str) -> Result<(), ApiError> {
        let url = self.backend.endpoint(&["live", "comment"])?;
        let request = self
            .backend
            .post(url, Some(token))
            .json(&NewComment { comment });

        self.backend
            .send::<serde_json::Value>(request)
            .await
            .map(|_| ())
    }
}

pub mod mock {
    use std::sync::{Arc, Mutex};

    use chrono::Utc;

    use super::*;

    #[derive(Clone)]
    pub struct LiveApiMock {
        comments: Arc<Mutex<Vec<Comment>>>,
    }

    impl LiveApiMock {
        pub fn new() -> Self {
            let now = Utc::now().naive_utc();
            let comments = ["Bonsoir tout le monde", "Great stream tonight"]
                .into_iter()
                .enumerate()
                .map(|(idx, text)| Comment {
                    id: Some(idx.to_string()),
                    username: Some("viewer".into()),
                    comment: text.into(),
                    created_at: now,
                })
                .collect();

            Self {
                comments: Arc::new(Mutex::new(comments)),
            }
        }

        fn stored(&self) -> std::sync::MutexGuard<'_, Vec<Comment>> {
            self.comments
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
        }
    }

    #[async_trait]
    impl LiveApiT for LiveApiMock {
        async fn stream_url(&self, channel: &str) -> Result<String, ApiError> {
            match channel {
                "animesama" => Ok("https://example.com/animesama/episode.mp4".into()),
                "" => Err(ApiError::Status {
                    status: 404,
                    message: Some("Unknown channel".into()),
                }),
                channel => Ok(format!("https://example.com/{channel}/index.m3u8")),
            }
        }

        async fn comments(&self, _token: Option<&str>) -> Result<Vec<Comment>, ApiError> {
            Ok(self.stored().clone())
        }

        async fn post_comment(&self, _token: &str, comment: &str) -> Result<(), ApiError> {
            if comment.trim().is_empty() {
                return Err(ApiError::Rejected("Comment cannot be empty".into()));
            }

            let mut comments = self.stored();
            let id = comments.len().to_string();

            comments.push(Comment {
                id: Some(id),
                username: Some("viewer".into()),
                comment: comment.into(),
                created_at: Utc::now().naive_utc(),
            });

            Ok(())
        }
    }
}
