//! The persisted group state document.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// State of the tracked group, stored as a single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupState {
    /// Fixed document identifier.
    #[serde(rename = "_id")]
    pub id: String,

    /// Chat that receives the daily count, unset until `setGroup` is used.
    #[serde(default)]
    pub chat_id: Option<i64>,

    /// Users allowed to issue commands.
    #[serde(default)]
    pub admins: BTreeSet<i64>,

    /// Current day count.
    #[serde(default)]
    pub day_count: u64,
}

impl GroupState {
    /// Creates an empty document with the given id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            chat_id: None,
            admins: BTreeSet::new(),
            day_count: 0,
        }
    }

    /// Checks whether the user is in the admin set.
    #[must_use]
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admins.contains(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_empty() {
        let state = GroupState::new("doc");
        assert_eq!(state.id, "doc");
        assert_eq!(state.chat_id, None);
        assert!(state.admins.is_empty());
        assert_eq!(state.day_count, 0);
    }

    #[test]
    fn test_deserialize_document_shape() {
        let json = r#"{"_id":"doc","chat_id":-42,"admins":[7,3,7],"day_count":10}"#;
        let state: GroupState = serde_json::from_str(json).unwrap();
        assert_eq!(state.chat_id, Some(-42));
        assert_eq!(state.admins.len(), 2);
        assert!(state.is_admin(3));
        assert_eq!(state.day_count, 10);
    }

    #[test]
    fn test_deserialize_missing_fields_default() {
        let state: GroupState = serde_json::from_str(r#"{"_id":"doc"}"#).unwrap();
        assert_eq!(state, GroupState::new("doc"));
    }
}
