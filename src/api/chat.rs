use super::{ApiClient, ApiError};
use crate::message::{BotMessage, UserMessage};

impl ApiClient {
    /// Send the conversation and get the next reply.
    ///
    /// The reply is returned as the server sent it; callers sectionize it.
    pub async fn send_message(
        &self,
        request: &UserMessage,
        token: &str,
    ) -> Result<BotMessage, ApiError> {
        tracing::debug!(history = request.message_history.len(), "sending chat message");
        self.post_authed("/chat/message", request, token).await
    }

    /// The server's opening message for a new chat.
    pub async fn greeting(&self, token: &str) -> Result<BotMessage, ApiError> {
        self.get_authed("/chat/greeting", token).await
    }
}
