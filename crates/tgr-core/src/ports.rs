use async_trait::async_trait;

use crate::{
    domain::{Dialog, Message, Participant, PeerRef, Reply, Sent, SessionToken},
    Result,
};

/// Interactive input needed to sign in a fresh session.
#[async_trait]
pub trait LoginPrompt: Send + Sync {
    /// The login code Telegram sent to the account.
    async fn login_code(&self) -> Result<String>;

    /// The two-step verification password.
    async fn password(&self, hint: Option<&str>) -> Result<String>;
}

/// Hexagonal port for the external Telegram user client.
///
/// MTProto lives in the adapter crate; the session facade only sees this trait.
#[async_trait]
pub trait UserClient: Send + Sync {
    /// Connect (and sign in if needed), returning the session to persist.
    async fn connect(
        &self,
        saved: Option<SessionToken>,
        prompt: &dyn LoginPrompt,
    ) -> Result<SessionToken>;

    async fn is_connected(&self) -> bool;

    async fn dialogs(&self, limit: usize) -> Result<Vec<Dialog>>;
    async fn participants(&self, chat: &PeerRef, limit: usize) -> Result<Vec<Participant>>;
    async fn messages(&self, chat: &PeerRef, limit: usize) -> Result<Vec<Message>>;

    /// Comments under `post_id` in a channel's linked discussion.
    async fn replies(&self, channel: &PeerRef, post_id: i32, limit: usize) -> Result<Vec<Reply>>;

    async fn send_message(&self, peer: &PeerRef, text: &str) -> Result<Sent>;

    async fn disconnect(&self) -> Result<()>;
}
