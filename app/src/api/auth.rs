use async_trait::async_trait;

use super::{
    ApiError, Backend,
    common_types::{Credentials, LoginResponse},
};

#[async_trait]
pub trait AuthApiT: Clone + Send + Sync + 'static {
    /// Rejected credentials are not an error: the response carries the server's message instead
    /// of a token.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError>;
}

#[derive(Clone)]
pub struct AuthApi {
    backend: Backend,
}

impl AuthApi {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl AuthApiT for AuthApi {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let url = self.backend.endpoint(&["auth", "login"])?;

        let response = self
            .backend
            .post(url, None)
            .json(&Credentials { email, password })
            .send()
            .await?;

        log::info!("Login request answered with {}", response.status());

        Ok(response.json().await?)
    }
}

pub mod mock {
    use std::collections::HashMap;

    use super::*;

    #[derive(Clone)]
    pub struct AuthApiMock {
        accounts: HashMap<String, String>,
    }

    impl AuthApiMock {
        pub fn new() -> Self {
            Self {
                accounts: HashMap::from([("viewer@example.com".into(), "secret".into())]),
            }
        }
    }

    #[async_trait]
    impl AuthApiT for AuthApiMock {
        async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
            if self.accounts.get(email).map(String::as_str) == Some(password) {
                Ok(LoginResponse {
                    access_token: Some(format!("mock-token-{email}")),
                    role: Some("user".into()),
                    message: None,
                })
            } else {
                Ok(LoginResponse {
                    message: Some("Invalid credentials".into()),
                    ..Default::default()
                })
            }
        }
    }
}
