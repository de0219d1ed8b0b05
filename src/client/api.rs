//! Chat HTTP Client
//!
//! Typed wrapper around the `/api/messages` routes and the realtime stream.
//! Failing responses are decoded back into `ChatError` from the `kind` field
//! of the error body, so callers can tell a validation failure from a
//! rejected lifecycle transition.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::shared::error::ChatError;
use crate::shared::message::{DeleteScope, Message};
use crate::shared::messaging::{
    DeleteMessageRequest, DeleteMessageResponse, EditMessageRequest, ErrorResponse,
    SendMessageRequest, TypingRequest, UserSummary,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ChatError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api(e) => e.message().to_string(),
            ClientError::Unauthorized(message) => message.clone(),
            ClientError::Transport(_) => "Could not reach the server".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct ChatApiClient {
    client: Client,
    base_url: String,
    token: String,
}

impl ChatApiClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, token)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.token)
    }

    pub async fn list_users(&self) -> Result<Vec<UserSummary>, ClientError> {
        let request = self.client.get(self.url("/api/messages/users"));
        decode(self.authorized(request).send().await?).await
    }

    pub async fn fetch_conversation(&self, counterpart_id: Uuid) -> Result<Vec<Message>, ClientError> {
        let request = self
            .client
            .get(self.url(&format!("/api/messages/{}", counterpart_id)));
        decode(self.authorized(request).send().await?).await
    }

    pub async fn send_message(
        &self,
        receiver_id: Uuid,
        body: &SendMessageRequest,
    ) -> Result<Message, ClientError> {
        let request = self
            .client
            .post(self.url(&format!("/api/messages/send/{}", receiver_id)))
            .json(body);
        decode(self.authorized(request).send().await?).await
    }

    pub async fn edit_message(&self, message_id: Uuid, text: &str) -> Result<Message, ClientError> {
        let request = self
            .client
            .put(self.url(&format!("/api/messages/edit/{}", message_id)))
            .json(&EditMessageRequest {
                text: text.to_string(),
            });
        decode(self.authorized(request).send().await?).await
    }

    pub async fn delete_message(
        &self,
        message_id: Uuid,
        scope: DeleteScope,
    ) -> Result<DeleteMessageResponse, ClientError> {
        let request = self
            .client
            .delete(self.url(&format!("/api/messages/delete/{}", message_id)))
            .json(&DeleteMessageRequest {
                delete_type: scope.as_str().to_string(),
            });
        decode(self.authorized(request).send().await?).await
    }

    pub async fn send_typing(&self, receiver_id: Uuid, is_typing: bool) -> Result<(), ClientError> {
        let request = self
            .client
            .post(self.url("/api/messages/typing"))
            .json(&TypingRequest {
                receiver_id,
                is_typing,
            });
        let response = self.authorized(request).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from(response).await)
        }
    }

    /// Open the realtime event stream; the caller reads its body
    pub async fn open_event_stream(&self) -> Result<Response, ClientError> {
        let request = self
            .client
            .get(self.url("/api/realtime"))
            .header(reqwest::header::ACCEPT, "text/event-stream");
        let response = self.authorized(request).send().await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from(response).await)
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    if !response.status().is_success() {
        return Err(error_from(response).await);
    }
    Ok(response.json::<T>().await?)
}

async fn error_from(response: Response) -> ClientError {
    let status = response.status();
    let body = response.json::<ErrorResponse>().await.ok();

    if status == StatusCode::UNAUTHORIZED {
        let message = body.map_or_else(|| "Unauthorized".to_string(), |b| b.error);
        return ClientError::Unauthorized(message);
    }

    match body {
        Some(body) => {
            let kind = body.kind.as_deref().unwrap_or("internal");
            ClientError::Api(ChatError::from_kind(kind, body.error))
        }
        None => {
            tracing::warn!(status = %status, "Error response without a JSON body");
            ClientError::Api(ChatError::internal())
        }
    }
}
