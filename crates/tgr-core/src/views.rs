//! JSON projections returned by the HTTP surface.
//!
//! Field names are camelCase; absent optionals are omitted. Dates are unix seconds.

use serde::Serialize;

use crate::domain::{Dialog, Message, Participant, PeerKind, Reply, Sent};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogView {
    /// Marked id, as a string.
    pub id: String,
    pub title: String,
    pub is_group: bool,
    pub is_channel: bool,
    pub is_user: bool,
}

impl From<Dialog> for DialogView {
    fn from(d: Dialog) -> Self {
        Self {
            id: d.kind.marked_id(d.id).to_string(),
            title: d.title,
            is_group: d.is_group,
            is_channel: d.kind == PeerKind::Channel,
            is_user: d.kind == PeerKind::User,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub bot: bool,
}

impl From<Participant> for MemberView {
    fn from(p: Participant) -> Self {
        Self {
            id: p.id.to_string(),
            username: p.username,
            first_name: p.first_name,
            last_name: p.last_name,
            phone: p.phone,
            bot: p.bot,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    pub date: i64,
}

impl From<Message> for MessageView {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            message: m.text,
            sender_id: m.sender_id.map(|id| id.to_string()),
            date: m.date.timestamp(),
        }
    }
}

/// A channel post that has comments.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: i32,
    pub message: String,
    pub date: i64,
    pub comments_count: i32,
}

impl PostView {
    /// `None` unless the message has at least one comment.
    pub fn with_comments(m: Message) -> Option<Self> {
        let comments_count = m.reply_count.filter(|n| *n > 0)?;
        Some(Self {
            id: m.id,
            message: m.text,
            date: m.date.timestamp(),
            comments_count,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    pub date: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_first_name: Option<String>,
}

impl From<Reply> for CommentView {
    fn from(r: Reply) -> Self {
        Self {
            id: r.id,
            message: r.text,
            sender_id: r.sender_id.map(|id| id.to_string()),
            date: r.date.timestamp(),
            sender_username: r.sender_username,
            sender_first_name: r.sender_first_name,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentView {
    pub success: bool,
    pub message_id: i32,
    pub date: i64,
}

impl From<Sent> for SentView {
    fn from(s: Sent) -> Self {
        Self {
            success: true,
            message_id: s.id,
            date: s.date.timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use serde_json::json;

    #[test]
    fn dialog_flags_follow_peer_kind() {
        let supergroup = DialogView::from(Dialog {
            kind: PeerKind::Channel,
            id: 1_234_567_890,
            title: "Rustaceans".to_string(),
            is_group: true,
        });
        assert_eq!(
            serde_json::to_value(&supergroup).unwrap(),
            json!({
                "id": "-1001234567890",
                "title": "Rustaceans",
                "isGroup": true,
                "isChannel": true,
                "isUser": false,
            })
        );

        let user = DialogView::from(Dialog {
            kind: PeerKind::User,
            id: 42,
            title: "Alice".to_string(),
            is_group: false,
        });
        assert_eq!(user.id, "42");
        assert!(user.is_user && !user.is_channel && !user.is_group);
    }

    #[test]
    fn member_view_omits_missing_fields() {
        let view = MemberView::from(Participant {
            id: 7,
            username: None,
            first_name: Some("Bob".to_string()),
            last_name: None,
            phone: None,
            bot: true,
        });
        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            json!({ "id": "7", "firstName": "Bob", "bot": true })
        );
    }

    #[test]
    fn posts_without_comments_are_dropped() {
        let date = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let msg = |reply_count| Message {
            id: 1,
            text: "post".to_string(),
            sender_id: None,
            date,
            reply_count,
        };
        assert!(PostView::with_comments(msg(None)).is_none());
        assert!(PostView::with_comments(msg(Some(0))).is_none());

        let post = PostView::with_comments(msg(Some(3))).unwrap();
        assert_eq!(
            serde_json::to_value(&post).unwrap(),
            json!({ "id": 1, "message": "post", "date": 1_700_000_000, "commentsCount": 3 })
        );
    }
}
