use std::collections::HashMap;

use chrono::DateTime;
use grammers_tl_types as tl;

use tgr_core::domain::Reply;

/// Flatten a `messages.getReplies` response into comments.
///
/// The sender is the `from_id` user, else the `peer_id` user; names come from
/// the users bundled with the response.
pub(crate) fn from_response(response: tl::enums::messages::Messages) -> Vec<Reply> {
    use tl::enums::messages::Messages;

    let (messages, users) = match response {
        Messages::Messages(m) => (m.messages, m.users),
        Messages::Slice(m) => (m.messages, m.users),
        Messages::ChannelMessages(m) => (m.messages, m.users),
        Messages::NotModified(_) => return Vec::new(),
    };

    let users: HashMap<i64, _> = users
        .into_iter()
        .filter_map(|u| match u {
            tl::enums::User::User(u) => Some((u.id, u)),
            tl::enums::User::Empty(_) => None,
        })
        .collect();

    messages
        .into_iter()
        .filter_map(|m| match m {
            tl::enums::Message::Message(m) => Some(m),
            _ => None,
        })
        .map(|m| {
            let sender_id = user_id(m.from_id.as_ref()).or_else(|| user_id(Some(&m.peer_id)));
            let sender = sender_id.and_then(|id| users.get(&id));
            Reply {
                id: m.id,
                text: m.message,
                sender_id,
                date: DateTime::from_timestamp(i64::from(m.date), 0).unwrap_or_default(),
                sender_username: sender.and_then(|u| u.username.clone()),
                sender_first_name: sender.and_then(|u| u.first_name.clone()),
            }
        })
        .collect()
}

fn user_id(peer: Option<&tl::enums::Peer>) -> Option<i64> {
    match peer {
        Some(tl::enums::Peer::User(p)) => Some(p.user_id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tl::enums::{messages::Messages, Peer};

    fn message(id: i32, from: Option<Peer>, peer: Peer, text: &str) -> tl::enums::Message {
        tl::enums::Message::Message(tl::types::Message {
            out: false,
            mentioned: false,
            media_unread: false,
            silent: false,
            post: false,
            from_scheduled: false,
            legacy: false,
            edit_hide: false,
            pinned: false,
            noforwards: false,
            invert_media: false,
            offline: false,
            id,
            from_id: from,
            from_boosts_applied: None,
            peer_id: peer,
            saved_peer_id: None,
            fwd_from: None,
            via_bot_id: None,
            via_business_bot_id: None,
            reply_to: None,
            date: 1_700_000_000,
            message: text.to_string(),
            media: None,
            reply_markup: None,
            entities: None,
            views: None,
            forwards: None,
            replies: None,
            edit_date: None,
            post_author: None,
            grouped_id: None,
            reactions: None,
            restriction_reason: None,
            ttl_period: None,
            quick_reply_shortcut_id: None,
            effect: None,
            factcheck: None,
        })
    }

    fn user(id: i64, username: Option<&str>, first_name: Option<&str>) -> tl::enums::User {
        tl::enums::User::User(tl::types::User {
            is_self: false,
            contact: false,
            mutual_contact: false,
            deleted: false,
            bot: false,
            bot_chat_history: false,
            bot_nochats: false,
            verified: false,
            restricted: false,
            min: false,
            bot_inline_geo: false,
            support: false,
            scam: false,
            apply_min_photo: false,
            fake: false,
            bot_attach_menu: false,
            premium: false,
            attach_menu_enabled: false,
            bot_can_edit: false,
            close_friend: false,
            stories_hidden: false,
            stories_unavailable: false,
            contact_require_premium: false,
            bot_business: false,
            bot_has_main_app: false,
            id,
            access_hash: None,
            first_name: first_name.map(str::to_string),
            last_name: None,
            username: username.map(str::to_string),
            phone: None,
            photo: None,
            status: None,
            bot_info_version: None,
            restriction_reason: None,
            bot_inline_placeholder: None,
            lang_code: None,
            emoji_status: None,
            usernames: None,
            stories_max_id: None,
            color: None,
            profile_color: None,
            bot_active_users: None,
        })
    }

    fn peer_user(user_id: i64) -> Peer {
        Peer::User(tl::types::PeerUser { user_id })
    }

    fn peer_channel(channel_id: i64) -> Peer {
        Peer::Channel(tl::types::PeerChannel { channel_id })
    }

    fn channel_messages(
        messages: Vec<tl::enums::Message>,
        users: Vec<tl::enums::User>,
    ) -> Messages {
        Messages::ChannelMessages(tl::types::messages::ChannelMessages {
            inexact: false,
            pts: 1,
            count: messages.len() as i32,
            offset_id_offset: None,
            messages,
            topics: Vec::new(),
            chats: Vec::new(),
            users,
        })
    }

    #[test]
    fn sender_comes_from_from_id_with_bundled_names() {
        let response = channel_messages(
            vec![message(
                5,
                Some(peer_user(7)),
                peer_channel(100),
                "nice post",
            )],
            vec![user(7, Some("alice"), Some("Alice"))],
        );

        let replies = from_response(response);
        assert_eq!(replies.len(), 1);
        let reply = &replies[0];
        assert_eq!(reply.id, 5);
        assert_eq!(reply.text, "nice post");
        assert_eq!(reply.sender_id, Some(7));
        assert_eq!(reply.sender_username.as_deref(), Some("alice"));
        assert_eq!(reply.sender_first_name.as_deref(), Some("Alice"));
        assert_eq!(reply.date.timestamp(), 1_700_000_000);
    }

    #[test]
    fn sender_falls_back_to_a_user_peer_id() {
        let response = Messages::Messages(tl::types::messages::Messages {
            messages: vec![message(6, None, peer_user(9), "hello")],
            chats: Vec::new(),
            users: vec![user(9, None, Some("Bob"))],
        });

        let replies = from_response(response);
        assert_eq!(replies[0].sender_id, Some(9));
        assert_eq!(replies[0].sender_username, None);
        assert_eq!(replies[0].sender_first_name.as_deref(), Some("Bob"));
    }

    #[test]
    fn channel_authored_comments_have_no_sender() {
        let response = channel_messages(
            vec![message(
                8,
                Some(peer_channel(100)),
                peer_channel(100),
                "from the channel",
            )],
            vec![user(100, Some("not_a_match"), None)],
        );

        let replies = from_response(response);
        assert_eq!(replies[0].sender_id, None);
        assert_eq!(replies[0].sender_username, None);
    }

    #[test]
    fn senders_missing_from_the_bundle_have_no_names() {
        let response = channel_messages(
            vec![message(
                9,
                Some(peer_user(3)),
                peer_channel(100),
                "hi",
            )],
            vec![tl::enums::User::Empty(tl::types::UserEmpty { id: 3 })],
        );

        let replies = from_response(response);
        assert_eq!(replies[0].sender_id, Some(3));
        assert_eq!(replies[0].sender_username, None);
        assert_eq!(replies[0].sender_first_name, None);
    }

    #[test]
    fn empty_entries_and_not_modified_are_skipped() {
        let response = channel_messages(
            vec![
                tl::enums::Message::Empty(tl::types::MessageEmpty {
                    id: 1,
                    peer_id: None,
                }),
                message(2, Some(peer_user(7)), peer_channel(100), "kept"),
            ],
            Vec::new(),
        );
        let replies = from_response(response);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].id, 2);

        let not_modified =
            Messages::NotModified(tl::types::messages::MessagesNotModified { count: 4 });
        assert!(from_response(not_modified).is_empty());
    }
}
