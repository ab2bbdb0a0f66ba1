//! Comment lifecycle events
//!
//! `CommentEvent` is what subscribers receive. On the wire it is a JSON object
//! with a `type` tag and a `data` payload:
//!
//! ```json
//! { "type": "new_comment",
//!   "data": { "id": 1, "content": "hi", "author": 7, "post_id": 42 } }
//! ```
//!
//! Deletions only carry the comment id.

use serde::{Deserialize, Serialize};

use crate::hub::TopicId;

pub type CommentId = i64;
pub type UserId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum CommentEvent {
    NewComment(CommentPayload),
    UpdateComment(CommentPayload),
    DeleteComment(CommentRef),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentPayload {
    pub id: CommentId,
    pub content: String,
    pub author: UserId,
    pub post_id: TopicId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRef {
    pub id: CommentId,
}

impl CommentEvent {
    pub fn comment_id(&self) -> CommentId {
        match self {
            Self::NewComment(payload) | Self::UpdateComment(payload) => payload.id,
            Self::DeleteComment(comment) => comment.id,
        }
    }

    /// The `type` tag as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NewComment(_) => "new_comment",
            Self::UpdateComment(_) => "update_comment",
            Self::DeleteComment(_) => "delete_comment",
        }
    }
}
