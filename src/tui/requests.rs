//! Background requests for the TUI.
//!
//! Network calls run as tasks on the tokio runtime. Their results come back
//! over a channel that the event loop drains between frames, so drawing and
//! key handling never wait on the server.

use crate::api::{ApiClient, ApiError};
use crate::auth::{self, AuthError, CredentialStore};
use crate::message::{BotMessage, UserMessage};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use tokio::runtime::Handle;

/// A finished request.
#[derive(Debug)]
pub enum Reply {
    Chat(Result<BotMessage, String>),
    Greeting(Result<BotMessage, String>),
}

/// Spawns requests and collects their replies.
pub struct RequestWorker {
    handle: Handle,
    client: ApiClient,
    store: CredentialStore,
    sender: Sender<Reply>,
    receiver: Receiver<Reply>,
}

impl RequestWorker {
    pub fn new(handle: Handle, client: ApiClient, store: CredentialStore) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            handle,
            client,
            store,
            sender,
            receiver,
        }
    }

    /// Send a chat message. The reply arrives as [`Reply::Chat`].
    pub fn send_chat(&self, request: UserMessage) {
        let client = self.client.clone();
        let store = self.store.clone();
        let sender = self.sender.clone();
        self.handle.spawn(async move {
            let result = chat(&client, &store, &request).await;
            if let Err(e) = &result {
                tracing::error!("chat request failed: {e}");
            }
            let _ = sender.send(Reply::Chat(result));
        });
    }

    /// Fetch the server greeting. The reply arrives as [`Reply::Greeting`].
    pub fn fetch_greeting(&self) {
        let client = self.client.clone();
        let store = self.store.clone();
        let sender = self.sender.clone();
        self.handle.spawn(async move {
            let result = greeting(&client, &store).await;
            if let Err(e) = &result {
                tracing::warn!("greeting request failed: {e}");
            }
            let _ = sender.send(Reply::Greeting(result));
        });
    }

    /// Handle for delivering replies without a request.
    #[cfg(test)]
    pub(crate) fn sender(&self) -> Sender<Reply> {
        self.sender.clone()
    }

    /// Drain every reply that has arrived since the last call.
    pub fn check_for_replies(&self) -> Vec<Reply> {
        let mut replies = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(reply) => replies.push(reply),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        replies
    }
}

async fn chat(
    client: &ApiClient,
    store: &CredentialStore,
    request: &UserMessage,
) -> Result<BotMessage, String> {
    let token = auth::valid_token(store).await.map_err(auth_message)?;
    client.send_message(request, &token).await.map_err(api_message)
}

async fn greeting(client: &ApiClient, store: &CredentialStore) -> Result<BotMessage, String> {
    let token = auth::valid_token(store).await.map_err(auth_message)?;
    client.greeting(&token).await.map_err(api_message)
}

fn auth_message(error: AuthError) -> String {
    match error {
        AuthError::NotLoggedIn => ApiError::Unauthenticated.to_string(),
        other => other.to_string(),
    }
}

fn api_message(error: ApiError) -> String {
    if error.is_unauthorized() {
        return AuthError::SessionExpired.to_string();
    }
    error.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageType;

    #[test]
    fn test_error_messages() {
        assert_eq!(auth_message(AuthError::NotLoggedIn), "Please log in to the server.");
        assert_eq!(
            api_message(ApiError::Status {
                status: 401,
                reason: "Unauthorized".into()
            }),
            "session expired, please log in again"
        );
        assert_eq!(
            api_message(ApiError::Status {
                status: 500,
                reason: "Internal Server Error".into()
            }),
            "server replied 500: Internal Server Error"
        );
    }

    #[test]
    fn test_replies_are_drained() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let worker = RequestWorker::new(
            runtime.handle().clone(),
            ApiClient::new("http://localhost:8000").unwrap(),
            CredentialStore::new(dir.path().join("auth.json")),
        );

        worker
            .sender
            .send(Reply::Greeting(Ok(BotMessage::quick(MessageType::Text, "Hi"))))
            .unwrap();
        assert_eq!(worker.check_for_replies().len(), 1);
        assert!(worker.check_for_replies().is_empty());
    }

    #[test]
    fn test_logged_out_chat_reports_error() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let worker = RequestWorker::new(
            runtime.handle().clone(),
            ApiClient::new("http://localhost:8000").unwrap(),
            CredentialStore::new(dir.path().join("auth.json")),
        );

        worker.fetch_greeting();
        let reply = worker.receiver.recv_timeout(std::time::Duration::from_secs(5)).unwrap();
        match reply {
            Reply::Greeting(Err(message)) => assert_eq!(message, "Please log in to the server."),
            other => panic!("unexpected reply: {other:?}"),
        }
    }
}
