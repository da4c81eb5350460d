use std::fmt;

use chrono::{DateTime, Utc};

use crate::{errors::Error, Result};

/// Offset Telegram adds to channel ids in the "marked" (`-100…`) form.
const CHANNEL_ID_OFFSET: i64 = 1_000_000_000_000;

/// How a peer's bare id is marked when shown to API callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PeerKind {
    /// Users and bots: the id as is.
    User,
    /// Basic (non-super) groups: `-id`.
    Group,
    /// Broadcast channels and supergroups: `-100id`.
    Channel,
}

impl PeerKind {
    pub fn marked_id(self, id: i64) -> i64 {
        match self {
            PeerKind::User => id,
            PeerKind::Group => -id,
            PeerKind::Channel => -(CHANNEL_ID_OFFSET + id),
        }
    }
}

/// A chat as named by an API caller: a (possibly marked) numeric id or a username.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PeerRef {
    /// `kind` is `None` for positive ids, which may be a user or an unmarked chat id.
    Id { kind: Option<PeerKind>, id: i64 },
    Username(String),
}

impl PeerRef {
    pub fn parse(raw: &str) -> Result<Self> {
        let s = raw.trim();
        let digits = s.strip_prefix('-').unwrap_or(s);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            let marked = s.parse::<i64>().map_err(|_| out_of_range(s))?;
            return Self::from_marked(marked);
        }

        let name = s.strip_prefix('@').unwrap_or(s);
        if !is_username(name) {
            return Err(Error::InvalidInput(
                "peer must be a numeric id or a username".to_string(),
            ));
        }
        Ok(Self::Username(name.to_string()))
    }

    pub fn from_marked(marked: i64) -> Result<Self> {
        let (kind, id) = if marked >= 0 {
            (None, Some(marked))
        } else if marked <= -CHANNEL_ID_OFFSET {
            (
                Some(PeerKind::Channel),
                marked
                    .checked_neg()
                    .and_then(|n| n.checked_sub(CHANNEL_ID_OFFSET)),
            )
        } else {
            (Some(PeerKind::Group), marked.checked_neg())
        };
        let id = id.ok_or_else(|| out_of_range(&marked.to_string()))?;
        Ok(Self::Id { kind, id })
    }

    /// Whether a resolved peer (`kind`, bare `id`) is the one this reference names.
    pub fn matches(&self, kind: PeerKind, id: i64) -> bool {
        match self {
            PeerRef::Id {
                kind: wanted,
                id: wanted_id,
            } => *wanted_id == id && wanted.map_or(true, |k| k == kind),
            PeerRef::Username(_) => false,
        }
    }
}

fn out_of_range(raw: &str) -> Error {
    Error::InvalidInput(format!("peer id is out of range: {raw}"))
}

/// Letters, digits and underscores, starting with a letter.
fn is_username(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_alphabetic())
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

impl fmt::Display for PeerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerRef::Id { kind: Some(k), id } => write!(f, "{}", k.marked_id(*id)),
            PeerRef::Id { kind: None, id } => write!(f, "{id}"),
            PeerRef::Username(name) => write!(f, "@{name}"),
        }
    }
}

/// Opaque session blob produced by the client adapter.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(pub String);

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken(<{} bytes>)", self.0.len())
    }
}

/// A conversation from the account's dialog list.
#[derive(Clone, Debug, PartialEq)]
pub struct Dialog {
    pub kind: PeerKind,
    pub id: i64,
    pub title: String,
    /// Basic groups and supergroups.
    pub is_group: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Participant {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub bot: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub id: i32,
    pub text: String,
    pub sender_id: Option<i64>,
    pub date: DateTime<Utc>,
    /// Comment count for channel posts with a linked discussion.
    pub reply_count: Option<i32>,
}

/// A comment under a channel post.
#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
    pub id: i32,
    pub text: String,
    pub sender_id: Option<i64>,
    pub date: DateTime<Utc>,
    pub sender_username: Option<String>,
    pub sender_first_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sent {
    pub id: i32,
    pub date: DateTime<Utc>,
}
