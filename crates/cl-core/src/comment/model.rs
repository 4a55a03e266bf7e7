//! Comment listing response model

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept an identifier sent either as a JSON string or a number
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

/// Author of a comment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Member {
    #[serde(deserialize_with = "string_or_number")]
    pub mid: String,
    #[serde(default)]
    pub uname: String,
    #[serde(default)]
    pub avatar: String,
}

/// What the post's owner did with a comment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct UpAction {
    #[serde(default)]
    pub like: bool,
    #[serde(default)]
    pub reply: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CommentContent {
    #[serde(default)]
    pub message: String,
}

/// One comment record
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Reply {
    #[serde(default)]
    pub rpid: i64,
    #[serde(default)]
    pub ctime: i64,
    /// 0 normal, 1 liked by the viewer, 2 disliked by the viewer
    #[serde(default)]
    pub action: i64,
    pub member: Member,
    #[serde(default)]
    pub content: CommentContent,
    #[serde(default)]
    pub up_action: UpAction,
}

impl Reply {
    pub fn liked_by_self(&self) -> bool {
        self.action == 1
    }

    pub fn liked_by_up(&self) -> bool {
        self.up_action.like
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PaginationReply {
    #[serde(default)]
    pub next_offset: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Cursor {
    #[serde(default)]
    pub is_begin: bool,
    pub is_end: bool,
    #[serde(default)]
    pub pagination_reply: PaginationReply,
    #[serde(default)]
    pub all_count: i64,
}

/// `data` of a comment listing response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommentPageData {
    pub cursor: Cursor,
    /// `null` when the listing is empty
    #[serde(default)]
    pub replies: Option<Vec<Reply>>,
}

/// A page yielded by the comment source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentPage {
    /// 1-based position in the listing
    pub number: usize,
    pub replies: Vec<Reply>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_page() {
        let data: CommentPageData = serde_json::from_value(json!({
            "cursor": {
                "is_begin": true,
                "is_end": false,
                "pagination_reply": {"next_offset": "abc"},
                "mode": 2,
                "all_count": 7
            },
            "replies": [{
                "rpid": 1,
                "oid": 123,
                "type": 11,
                "ctime": 1700000000,
                "action": 1,
                "member": {"mid": "42", "uname": "alice", "avatar": "https://i0/a.jpg",
                           "level_info": {"current_level": 5}},
                "content": {"message": "me!"},
                "up_action": {"like": true, "reply": false}
            }]
        }))
        .unwrap();

        assert_eq!(data.cursor.pagination_reply.next_offset.as_deref(), Some("abc"));
        let replies = data.replies.unwrap();
        assert_eq!(replies[0].member.mid, "42");
        assert!(replies[0].liked_by_self());
        assert!(replies[0].liked_by_up());
        assert_eq!(replies[0].content.message, "me!");
    }

    #[test]
    fn test_null_replies_and_numeric_mid() {
        let data: CommentPageData = serde_json::from_value(json!({
            "cursor": {"is_end": true, "pagination_reply": {}},
            "replies": null
        }))
        .unwrap();
        assert!(data.replies.is_none());
        assert_eq!(data.cursor.pagination_reply.next_offset, None);

        let member: Member = serde_json::from_value(json!({"mid": 42, "uname": "bob"})).unwrap();
        assert_eq!(member.mid, "42");
        assert_eq!(member.avatar, "");
    }

    #[test]
    fn test_missing_member_is_rejected() {
        let result = serde_json::from_value::<Reply>(json!({"action": 0}));
        assert!(result.is_err());
    }
}
