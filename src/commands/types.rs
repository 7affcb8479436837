//! Command types and parsing.

use std::fmt;

use crate::telegram::{ChatKind, Update};

/// Token that sets the day count; the count follows after the space.
pub const SET_COUNT: &str = "setCount ";
/// Token that makes the current chat the notification target.
pub const SET_GROUP: &str = "setGroup";
/// Token that adds the replied-to user as an admin.
pub const SET_ADMIN: &str = "setAdmin";
/// Token that removes the replied-to user from the admins.
pub const REMOVE_ADMIN: &str = "removeAdmin";

/// A chat message reduced to what command handling needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub sender_id: i64,
    pub chat_id: i64,
    pub chat_kind: ChatKind,
    pub text: String,
    /// Sender of the message this one replies to.
    pub reply_to_sender_id: Option<i64>,
}

impl InboundEvent {
    /// Extracts an event from a webhook update.
    ///
    /// Returns `None` for updates without a message, sender or text.
    #[must_use]
    pub fn from_update(update: &Update) -> Option<Self> {
        let message = update.message.as_ref()?;
        let sender = message.from.as_ref()?;
        let text = message.text.as_deref()?.trim();
        if text.is_empty() {
            return None;
        }

        Some(Self {
            sender_id: sender.id,
            chat_id: message.chat.id,
            chat_kind: message.chat.kind,
            text: text.to_owned(),
            reply_to_sender_id: message
                .reply_to_message
                .as_ref()
                .and_then(|reply| reply.from.as_ref())
                .map(|user| user.id),
        })
    }
}

/// A state change requested by an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Overwrite the day count.
    SetDayCount(u64),

    /// Send notifications to this chat.
    SetGroup(i64),

    /// Grant admin rights to a user.
    AddAdmin(i64),

    /// Revoke admin rights from a user.
    RemoveAdmin(i64),
}

impl Action {
    /// Parses every action contained in a message.
    ///
    /// Tokens are matched as case-sensitive substrings anywhere in the text
    /// and checked in a fixed order; each one that matches and has a valid
    /// argument yields an action. Invalid arguments silently drop that
    /// action. An empty result means the message is not a command.
    #[must_use]
    pub fn parse(event: &InboundEvent) -> Vec<Self> {
        let text = event.text.trim();
        let mut actions = Vec::new();

        if let Some(count) = parse_count(text) {
            actions.push(Self::SetDayCount(count));
        }

        if text.contains(SET_GROUP) && event.chat_kind == ChatKind::Group {
            actions.push(Self::SetGroup(event.chat_id));
        }

        if text.contains(SET_ADMIN)
            && let Some(target) = event.reply_to_sender_id
        {
            actions.push(Self::AddAdmin(target));
        }

        if text.contains(REMOVE_ADMIN)
            && let Some(target) = event.reply_to_sender_id
        {
            actions.push(Self::RemoveAdmin(target));
        }

        actions
    }

    /// Returns the command name as typed in chat.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetDayCount(_) => "setCount",
            Self::SetGroup(_) => SET_GROUP,
            Self::AddAdmin(_) => SET_ADMIN,
            Self::RemoveAdmin(_) => REMOVE_ADMIN,
        }
    }

    /// Confirmation shown in the group after the action is applied.
    #[must_use]
    pub fn confirmation(&self) -> String {
        match self {
            Self::SetDayCount(count) => format!("[BOT]: Day count set to {count}."),
            Self::SetGroup(_) => "[BOT]: This group has been set to the default.".to_owned(),
            Self::AddAdmin(id) => format!("[BOT]: ID {id} ADDED TO ADMIN LIST."),
            Self::RemoveAdmin(id) => format!("[BOT]: ID {id} REMOVED FROM ADMIN LIST."),
        }
    }
}

/// Reads the first word after `setCount ` as a count.
fn parse_count(text: &str) -> Option<u64> {
    let (_, rest) = text.split_once(SET_COUNT)?;
    rest.split_whitespace().next()?.parse().ok()
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetDayCount(count) => write!(f, "setCount {count}"),
            Self::SetGroup(chat_id) => write!(f, "setGroup ({chat_id})"),
            Self::AddAdmin(user_id) => write!(f, "setAdmin ({user_id})"),
            Self::RemoveAdmin(user_id) => write!(f, "removeAdmin ({user_id})"),
        }
    }
}

/// Outcome of handling one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Actions parsed from the message.
    pub actions: Vec<Action>,

    /// Whether the actions were applied.
    pub executed: bool,
}

impl CommandResult {
    /// The message contained no command.
    #[must_use]
    pub const fn noop() -> Self {
        Self {
            actions: Vec::new(),
            executed: false,
        }
    }

    /// Commands were parsed but the sender is not an admin.
    #[must_use]
    pub const fn unauthorized(actions: Vec<Action>) -> Self {
        Self {
            actions,
            executed: false,
        }
    }

    /// Commands were parsed and applied.
    #[must_use]
    pub const fn executed(actions: Vec<Action>) -> Self {
        Self {
            actions,
            executed: true,
        }
    }

    /// Checks whether the message produced no command at all.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(text: &str) -> InboundEvent {
        InboundEvent {
            sender_id: 1,
            chat_id: -100,
            chat_kind: ChatKind::Group,
            text: text.to_owned(),
            reply_to_sender_id: None,
        }
    }

    fn reply(text: &str, target: i64) -> InboundEvent {
        InboundEvent {
            reply_to_sender_id: Some(target),
            ..event(text)
        }
    }

    #[test]
    fn test_parse_set_count() {
        assert_eq!(Action::parse(&event("setCount 42")), vec![Action::SetDayCount(42)]);
        assert_eq!(
            Action::parse(&event("  setCount   7  ")),
            vec![Action::SetDayCount(7)]
        );
    }

    #[test]
    fn test_parse_set_count_anywhere_in_text() {
        assert_eq!(
            Action::parse(&event("please setCount 15 thanks")),
            vec![Action::SetDayCount(15)]
        );
    }

    #[test]
    fn test_parse_set_count_invalid_argument() {
        assert!(Action::parse(&event("setCount abc")).is_empty());
        assert!(Action::parse(&event("setCount -3")).is_empty());
        assert!(Action::parse(&event("setCount 1.5")).is_empty());
        assert!(Action::parse(&event("setCount")).is_empty());
    }

    #[test]
    fn test_parse_case_sensitive() {
        assert!(Action::parse(&event("setcount 4")).is_empty());
        assert!(Action::parse(&event("SETGROUP")).is_empty());
    }

    #[test]
    fn test_parse_set_group_requires_group_chat() {
        assert_eq!(Action::parse(&event("setGroup")), vec![Action::SetGroup(-100)]);

        let private = InboundEvent {
            chat_kind: ChatKind::Private,
            chat_id: 1,
            ..event("setGroup")
        };
        assert!(Action::parse(&private).is_empty());

        let supergroup = InboundEvent {
            chat_kind: ChatKind::Supergroup,
            ..event("setGroup")
        };
        assert!(Action::parse(&supergroup).is_empty());
    }

    #[test]
    fn test_parse_admin_commands_need_reply() {
        assert!(Action::parse(&event("setAdmin")).is_empty());
        assert!(Action::parse(&event("removeAdmin")).is_empty());
        assert_eq!(Action::parse(&reply("setAdmin", 99)), vec![Action::AddAdmin(99)]);
        assert_eq!(
            Action::parse(&reply("removeAdmin", 99)),
            vec![Action::RemoveAdmin(99)]
        );
    }

    #[test]
    fn test_parse_multiple_tokens_fire_in_order() {
        assert_eq!(
            Action::parse(&reply("setAdmin setGroup setCount 3", 5)),
            vec![
                Action::SetDayCount(3),
                Action::SetGroup(-100),
                Action::AddAdmin(5),
            ]
        );
    }

    #[test]
    fn test_parse_plain_chatter() {
        assert!(Action::parse(&event("good morning")).is_empty());
    }

    #[test]
    fn test_confirmation_text() {
        assert_eq!(
            Action::SetDayCount(12).confirmation(),
            "[BOT]: Day count set to 12."
        );
        assert_eq!(
            Action::RemoveAdmin(3).confirmation(),
            "[BOT]: ID 3 REMOVED FROM ADMIN LIST."
        );
    }

    #[test]
    fn test_event_from_update() {
        let update: Update = serde_json::from_value(serde_json::json!({
            "update_id": 1,
            "message": {
                "message_id": 5,
                "chat": {"id": 1, "type": "private"},
                "from": {"id": 1, "is_bot": false},
                "text": "  setCount 3  "
            }
        }))
        .unwrap();
        let event = InboundEvent::from_update(&update).unwrap();
        assert_eq!(event.text, "setCount 3");
        assert_eq!(event.chat_kind, ChatKind::Private);
        assert_eq!(event.reply_to_sender_id, None);
    }

    #[test]
    fn test_event_from_update_without_text() {
        let update: Update = serde_json::from_value(serde_json::json!({
            "update_id": 1,
            "message": {
                "message_id": 5,
                "chat": {"id": 1, "type": "group"},
                "from": {"id": 1, "is_bot": false}
            }
        }))
        .unwrap();
        assert!(InboundEvent::from_update(&update).is_none());
    }
}
