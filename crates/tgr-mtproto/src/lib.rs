//! Telegram user-account adapter (grammers, MTProto).
//!
//! This crate implements the `tgr-core` UserClient port over a signed-in user session.

use std::collections::HashMap;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use grammers_client::{Client, Config, InitParams, SignInError};
use grammers_session::{PackedChat, PackedType, Session};
use grammers_tl_types as tl;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

pub mod prompt;
mod replies;

pub use prompt::StdinPrompt;

use tgr_core::{
    config::Credentials,
    domain::{Dialog, Message, Participant, PeerKind, PeerRef, Reply, Sent, SessionToken},
    errors::Error,
    ports::{LoginPrompt, UserClient},
    Result,
};

pub struct MtprotoClient {
    creds: Credentials,
    client: RwLock<Option<Client>>,
    /// Packed chats seen so far, by bare id. Numeric peers can only be
    /// addressed once their access hash is known.
    peers: Mutex<HashMap<i64, PackedChat>>,
}

impl MtprotoClient {
    pub fn new(creds: Credentials) -> Self {
        Self {
            creds,
            client: RwLock::new(None),
            peers: Mutex::new(HashMap::new()),
        }
    }

    async fn handle(&self) -> Result<Client> {
        self.client.read().await.clone().ok_or(Error::NotInitialized)
    }

    async fn sign_in(&self, client: &Client, prompt: &dyn LoginPrompt) -> Result<()> {
        let token = client
            .request_login_code(&self.creds.phone)
            .await
            .map_err(|e| Error::External(format!("failed to request login code: {e}")))?;
        let code = prompt.login_code().await?;

        match client.sign_in(&token, code.trim()).await {
            Ok(_) => Ok(()),
            Err(SignInError::PasswordRequired(password_token)) => {
                let password = match &self.creds.password {
                    Some(p) => p.clone(),
                    None => {
                        let hint = password_token.hint().map(|h| h.to_string());
                        prompt.password(hint.as_deref()).await?
                    }
                };
                client
                    .check_password(password_token, password.trim())
                    .await
                    .map_err(|e| Error::External(format!("password check failed: {e}")))?;
                Ok(())
            }
            Err(e) => Err(Error::External(format!("sign in failed: {e}"))),
        }
    }

    async fn remember(&self, packed: PackedChat) {
        self.peers.lock().await.insert(packed.id, packed);
    }

    async fn resolve(&self, client: &Client, peer: &PeerRef) -> Result<PackedChat> {
        match peer {
            PeerRef::Username(name) => {
                let chat = client
                    .resolve_username(name)
                    .await
                    .map_err(external)?
                    .ok_or_else(|| not_found(peer))?;
                let packed = chat.pack();
                self.remember(packed.clone()).await;
                Ok(packed)
            }
            PeerRef::Id { id, .. } => {
                let cached = self.peers.lock().await.get(id).cloned();
                if let Some(packed) = cached.filter(|p| peer.matches(peer_kind(p.ty), p.id)) {
                    return Ok(packed);
                }

                debug!(%peer, "peer not cached, walking dialogs");
                let mut dialogs = client.iter_dialogs();
                while let Some(dialog) = dialogs.next().await.map_err(external)? {
                    let packed = dialog.chat().pack();
                    self.remember(packed.clone()).await;
                    if peer.matches(peer_kind(packed.ty), packed.id) {
                        return Ok(packed);
                    }
                }
                Err(not_found(peer))
            }
        }
    }
}

#[async_trait]
impl UserClient for MtprotoClient {
    async fn connect(
        &self,
        saved: Option<SessionToken>,
        prompt: &dyn LoginPrompt,
    ) -> Result<SessionToken> {
        let session = saved.map(|t| decode_session(&t)).unwrap_or_else(Session::new);

        let client = Client::connect(Config {
            session,
            api_id: self.creds.api_id,
            api_hash: self.creds.api_hash.clone(),
            params: InitParams::default(),
        })
        .await
        .map_err(|e| Error::External(format!("failed to connect: {e}")))?;

        if !client.is_authorized().await.map_err(external)? {
            info!("session is not authorized, signing in");
            self.sign_in(&client, prompt).await?;
        }

        let token = SessionToken(STANDARD.encode(client.session().save()));
        *self.client.write().await = Some(client);
        Ok(token)
    }

    async fn is_connected(&self) -> bool {
        self.client.read().await.is_some()
    }

    async fn dialogs(&self, limit: usize) -> Result<Vec<Dialog>> {
        let client = self.handle().await?;
        let mut iter = client.iter_dialogs().limit(limit);

        let mut out = Vec::new();
        while let Some(dialog) = iter.next().await.map_err(external)? {
            let chat = dialog.chat();
            let packed = chat.pack();
            out.push(Dialog {
                kind: peer_kind(packed.ty),
                id: packed.id,
                title: chat.name().to_string(),
                is_group: matches!(packed.ty, PackedType::Chat | PackedType::Megagroup),
            });
            self.remember(packed).await;
        }
        Ok(out)
    }

    async fn participants(&self, chat: &PeerRef, limit: usize) -> Result<Vec<Participant>> {
        let client = self.handle().await?;
        let packed = self.resolve(&client, chat).await?;
        // The participant iterator has no built-in limit.
        let mut iter = client.iter_participants(packed);

        let mut out = Vec::new();
        while out.len() < limit {
            let Some(participant) = iter.next().await.map_err(external)? else {
                break;
            };
            let user = &participant.user;
            out.push(Participant {
                id: user.id(),
                username: user.username().map(str::to_string),
                first_name: Some(user.first_name().to_string()).filter(|s| !s.is_empty()),
                last_name: user.last_name().map(str::to_string),
                phone: user.phone().map(str::to_string),
                bot: user.is_bot(),
            });
        }
        Ok(out)
    }

    async fn messages(&self, chat: &PeerRef, limit: usize) -> Result<Vec<Message>> {
        let client = self.handle().await?;
        let packed = self.resolve(&client, chat).await?;
        let mut iter = client.iter_messages(packed).limit(limit);

        let mut out = Vec::new();
        while let Some(msg) = iter.next().await.map_err(external)? {
            out.push(Message {
                id: msg.id(),
                text: msg.text().to_string(),
                sender_id: msg.sender().map(|s| s.id()),
                date: msg.date(),
                reply_count: msg.reply_count(),
            });
        }
        Ok(out)
    }

    async fn replies(&self, channel: &PeerRef, post_id: i32, limit: usize) -> Result<Vec<Reply>> {
        let client = self.handle().await?;
        let packed = self.resolve(&client, channel).await?;

        let request = tl::functions::messages::GetReplies {
            peer: packed.to_input_peer(),
            msg_id: post_id,
            offset_id: 0,
            offset_date: 0,
            add_offset: 0,
            limit: i32::try_from(limit).unwrap_or(i32::MAX),
            max_id: 0,
            min_id: 0,
            hash: 0,
        };
        let response = client.invoke(&request).await.map_err(external)?;
        Ok(replies::from_response(response))
    }

    async fn send_message(&self, peer: &PeerRef, text: &str) -> Result<Sent> {
        let client = self.handle().await?;
        let packed = self.resolve(&client, peer).await?;
        let sent = client.send_message(packed, text).await.map_err(external)?;
        Ok(Sent {
            id: sent.id(),
            date: sent.date(),
        })
    }

    async fn disconnect(&self) -> Result<()> {
        // Dropping the last handle closes the connection.
        if self.client.write().await.take().is_some() {
            self.peers.lock().await.clear();
        }
        Ok(())
    }
}

fn peer_kind(ty: PackedType) -> PeerKind {
    match ty {
        PackedType::User | PackedType::Bot => PeerKind::User,
        PackedType::Chat => PeerKind::Group,
        _ => PeerKind::Channel,
    }
}

fn decode_session(token: &SessionToken) -> Session {
    let loaded = STANDARD
        .decode(token.0.trim())
        .ok()
        .and_then(|bytes| Session::load(&bytes).ok());
    match loaded {
        Some(session) => session,
        None => {
            warn!("stored session is unreadable, starting a new one");
            Session::new()
        }
    }
}

fn external(e: impl std::fmt::Display) -> Error {
    Error::External(e.to_string())
}

fn not_found(peer: &PeerRef) -> Error {
    Error::External(format!("Could not find the input entity for {peer}"))
}
