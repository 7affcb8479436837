//! Telegram Bot API wire types.
//!
//! Only the fields the bot reads are modelled; everything else in an update
//! is ignored during deserialization.

use serde::{Deserialize, Serialize};

/// Incoming webhook update.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

/// A chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub reply_to_message: Option<Box<Message>>,
}

/// Chat a message was sent in.
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ChatKind,
}

/// Kind of chat, as reported by the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
    #[serde(other)]
    Unknown,
}

/// Message sender.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
}

/// A message the bot sent, as returned by `sendMessage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SentMessage {
    pub message_id: i64,
}

/// Envelope around every Bot API response.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i32>,
    #[serde(default)]
    pub parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseParameters {
    #[serde(default)]
    pub retry_after: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SendMessageParams<'a> {
    pub chat_id: i64,
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteMessageParams {
    pub chat_id: i64,
    pub message_id: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct SetWebhookParams<'a> {
    pub url: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_group_reply_update() {
        let json = r#"{
            "update_id": 1,
            "message": {
                "message_id": 10,
                "date": 1700000000,
                "chat": {"id": -500, "type": "group", "title": "Friends"},
                "from": {"id": 1, "is_bot": false, "first_name": "A"},
                "text": "setAdmin",
                "reply_to_message": {
                    "message_id": 9,
                    "chat": {"id": -500, "type": "group"},
                    "from": {"id": 99, "is_bot": false, "first_name": "B"},
                    "text": "hi"
                }
            }
        }"#;
        let update: Update = serde_json::from_str(json).unwrap();
        let message = update.message.unwrap();
        assert_eq!(message.chat.kind, ChatKind::Group);
        assert_eq!(message.from.unwrap().id, 1);
        assert_eq!(message.reply_to_message.unwrap().from.unwrap().id, 99);
    }

    #[test]
    fn test_unknown_chat_kind() {
        let chat: Chat = serde_json::from_str(r#"{"id": 1, "type": "forum"}"#).unwrap();
        assert_eq!(chat.kind, ChatKind::Unknown);
    }

    #[test]
    fn test_update_without_message() {
        let update: Update =
            serde_json::from_str(r#"{"update_id": 2, "edited_message": {}}"#).unwrap();
        assert!(update.message.is_none());
    }

    #[test]
    fn test_error_envelope() {
        let json = r#"{"ok":false,"error_code":429,"description":"Too Many Requests","parameters":{"retry_after":12}}"#;
        let response: ApiResponse<SentMessage> = serde_json::from_str(json).unwrap();
        assert!(!response.ok);
        assert!(response.result.is_none());
        assert_eq!(response.parameters.unwrap().retry_after, Some(12));
    }
}
