/// Task service client
///
/// [`TaskApi`] is everything the board controller needs from the server.
/// [`HttpTaskApi`] speaks the HTTP contract with `reqwest`; tests and demos
/// use [`crate::mock::MockTaskApi`] instead.
///
/// # Example
///
/// ```no_run
/// use taskboard_client::api::{HttpTaskApi, TaskApi};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let api = HttpTaskApi::new("http://localhost:8080")?.with_token("eyJ...");
/// for task in api.list().await? {
///     println!("{} [{}] {}", task.id, task.status, task.title);
/// }
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use taskboard_shared::models::task::{PositionUpdate, Task, TaskStatus, UpdateTask};
use uuid::Uuid;

use crate::config::PublicConfig;

/// Client error types
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Request never completed or the body could not be read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with an error status
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Base URL could not be parsed
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// HTTP status for server-side failures
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// `POST /api/tasks` body sent by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub status: TaskStatus,
    pub position: i32,
}

/// Server operations used by the board
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Fetches the caller's tasks
    async fn list(&self) -> Result<Vec<Task>, ClientError>;

    /// Creates a task
    async fn create(&self, request: &CreateTaskRequest) -> Result<Task, ClientError>;

    /// Partially updates a task
    async fn update(&self, id: Uuid, changes: &UpdateTask) -> Result<Task, ClientError>;

    /// Deletes a task, returning its last state
    async fn delete(&self, id: Uuid) -> Result<Task, ClientError>;

    /// Applies a reposition batch
    async fn reposition(&self, updates: &[PositionUpdate]) -> Result<(), ClientError>;

    /// Fetches the public client configuration
    async fn public_config(&self) -> Result<PublicConfig, ClientError>;
}

#[derive(Serialize)]
struct RepositionBody<'a> {
    updates: &'a [PositionUpdate],
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// `reqwest` implementation of [`TaskApi`]
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    client: reqwest::Client,
    base_url: reqwest::Url,
    token: Option<String>,
}

impl HttpTaskApi {
    /// Creates a client for the server at `base_url`
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = reqwest::Url::parse(base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            token: None,
        })
    }

    /// Sends `Authorization: Bearer <token>` with every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", path, e)))?;

        let builder = self.client.request(method, url);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body
                .message
                .or(body.error)
                .unwrap_or_else(|| default_message(status)),
            Err(_) => default_message(status),
        };

        tracing::debug!(status = status.as_u16(), %message, "Task API request failed");

        Err(ClientError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

fn default_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn list(&self) -> Result<Vec<Task>, ClientError> {
        let response = self.request(Method::GET, "/api/tasks")?.send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn create(&self, request: &CreateTaskRequest) -> Result<Task, ClientError> {
        let response = self
            .request(Method::POST, "/api/tasks")?
            .json(request)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn update(&self, id: Uuid, changes: &UpdateTask) -> Result<Task, ClientError> {
        let response = self
            .request(Method::PUT, &format!("/api/tasks/{}", id))?
            .json(changes)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete(&self, id: Uuid) -> Result<Task, ClientError> {
        let response = self
            .request(Method::DELETE, &format!("/api/tasks/{}", id))?
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn reposition(&self, updates: &[PositionUpdate]) -> Result<(), ClientError> {
        let response = self
            .request(Method::POST, "/api/tasks/positions")?
            .json(&RepositionBody { updates })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn public_config(&self) -> Result<PublicConfig, ClientError> {
        let response = self.request(Method::GET, "/api/config")?.send().await?;
        Ok(Self::check(response).await?.json().await?)
    }
}
