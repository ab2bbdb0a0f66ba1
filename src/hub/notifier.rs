//! Producer-side helpers for the comment service.
//!
//! After the article store commits a comment write it hands the committed row
//! to `CommentNotifier`, which builds the matching event and publishes it on
//! the comment's post.

use std::sync::Arc;

use crate::hub::TopicId;
use crate::hub::engine::{Delivery, Hub};
use crate::hub::event::{CommentEvent, CommentId, CommentPayload, CommentRef, UserId};

/// A committed comment as the article store returns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: TopicId,
    pub author_id: UserId,
    pub content: String,
}

impl Comment {
    fn payload(&self) -> CommentPayload {
        CommentPayload {
            id: self.id,
            content: self.content.clone(),
            author: self.author_id,
            post_id: self.post_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommentNotifier {
    hub: Arc<Hub>,
}

impl CommentNotifier {
    pub fn new(hub: Arc<Hub>) -> Self {
        Self { hub }
    }

    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }

    pub async fn comment_created(&self, comment: &Comment) -> Delivery {
        let event = CommentEvent::NewComment(comment.payload());
        self.hub.publish(comment.post_id, &event).await
    }

    pub async fn comment_updated(&self, comment: &Comment) -> Delivery {
        let event = CommentEvent::UpdateComment(comment.payload());
        self.hub.publish(comment.post_id, &event).await
    }

    /// The row is gone by now, so the caller supplies the post it belonged to.
    pub async fn comment_deleted(&self, post_id: TopicId, comment_id: CommentId) -> Delivery {
        let event = CommentEvent::DeleteComment(CommentRef { id: comment_id });
        self.hub.publish(post_id, &event).await
    }
}
