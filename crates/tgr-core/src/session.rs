use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::{
    domain::PeerRef,
    errors::Error,
    ports::{LoginPrompt, UserClient},
    store::SessionStore,
    views::{CommentView, DialogView, MemberView, MessageView, PostView, SentView},
    Result,
};

/// Lifecycle of the single client handle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LifecycleState {
    #[default]
    Uninitialized,
    Initializing,
    Connected,
}

/// Session facade over the external user client.
///
/// Owns the persisted session file and gates every call on the client having
/// been initialized. Results are reshaped into the JSON views.
pub struct TelegramSession {
    client: Arc<dyn UserClient>,
    store: SessionStore,
    state: RwLock<LifecycleState>,
}

impl TelegramSession {
    pub fn new(client: Arc<dyn UserClient>, store: SessionStore) -> Self {
        Self {
            client,
            store,
            state: RwLock::new(LifecycleState::Uninitialized),
        }
    }

    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    pub async fn is_initialized(&self) -> bool {
        self.state().await == LifecycleState::Connected
    }

    pub async fn is_connected(&self) -> bool {
        self.is_initialized().await && self.client.is_connected().await
    }

    /// Connect the client, reusing the saved session when there is one.
    ///
    /// On failure the facade goes back to `Uninitialized` and the error is returned.
    pub async fn initialize(&self, prompt: &dyn LoginPrompt) -> Result<()> {
        {
            let mut st = self.state.write().await;
            if *st != LifecycleState::Uninitialized {
                return Err(Error::External(format!(
                    "session cannot be initialized while {:?}",
                    *st
                )));
            }
            *st = LifecycleState::Initializing;
        }

        let saved = match self.store.load() {
            Ok(saved) => saved,
            Err(e) => {
                warn!(path = %self.store.path().display(), error = %e, "error loading session");
                None
            }
        };

        info!(resumed = saved.is_some(), "connecting to Telegram");
        let token = match self.client.connect(saved, prompt).await {
            Ok(token) => token,
            Err(e) => {
                *self.state.write().await = LifecycleState::Uninitialized;
                return Err(e);
            }
        };
        info!("connected to Telegram");

        match self.store.save(&token) {
            Ok(()) => info!(path = %self.store.path().display(), "session saved"),
            Err(e) => warn!(path = %self.store.path().display(), error = %e, "error saving session"),
        }

        *self.state.write().await = LifecycleState::Connected;
        Ok(())
    }

    pub async fn disconnect(&self) -> Result<()> {
        let mut st = self.state.write().await;
        if *st == LifecycleState::Connected {
            self.client.disconnect().await?;
            info!("disconnected from Telegram");
        }
        *st = LifecycleState::Uninitialized;
        Ok(())
    }

    pub async fn dialogs(&self, limit: usize) -> Result<Vec<DialogView>> {
        self.ensure_connected().await?;
        let dialogs = self.client.dialogs(limit).await?;
        Ok(dialogs.into_iter().map(DialogView::from).collect())
    }

    /// At most `limit` members, however many the client hands back.
    pub async fn chat_members(&self, chat: &PeerRef, limit: usize) -> Result<Vec<MemberView>> {
        self.ensure_connected().await?;
        let members = self
            .client
            .participants(chat, limit)
            .await
            .map_err(|e| e.context("Failed to get chat members"))?;
        Ok(members
            .into_iter()
            .take(limit)
            .map(MemberView::from)
            .collect())
    }

    pub async fn messages(&self, chat: &PeerRef, limit: usize) -> Result<Vec<MessageView>> {
        self.ensure_connected().await?;
        let messages = self
            .client
            .messages(chat, limit)
            .await
            .map_err(|e| e.context("Failed to get messages"))?;
        Ok(messages.into_iter().map(MessageView::from).collect())
    }

    /// The last `limit` channel posts, keeping only those with comments.
    pub async fn channel_posts(&self, channel: &PeerRef, limit: usize) -> Result<Vec<PostView>> {
        self.ensure_connected().await?;
        let messages = self
            .client
            .messages(channel, limit)
            .await
            .map_err(|e| e.context("Failed to get channel posts"))?;
        Ok(messages
            .into_iter()
            .filter_map(PostView::with_comments)
            .collect())
    }

    pub async fn post_comments(
        &self,
        channel: &PeerRef,
        post_id: i32,
        limit: usize,
    ) -> Result<Vec<CommentView>> {
        self.ensure_connected().await?;
        let replies = self
            .client
            .replies(channel, post_id, limit)
            .await
            .map_err(|e| e.context("Failed to get post comments"))?;
        Ok(replies.into_iter().map(CommentView::from).collect())
    }

    pub async fn send_message(&self, peer: &PeerRef, text: &str) -> Result<SentView> {
        self.ensure_connected().await?;
        let sent = self
            .client
            .send_message(peer, text)
            .await
            .map_err(|e| e.context("Failed to send message"))?;
        Ok(sent.into())
    }

    async fn ensure_connected(&self) -> Result<()> {
        if self.is_initialized().await {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }
}
