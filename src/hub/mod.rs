//! The `hub` module is the real-time comment broadcast core.
//!
//! - `registry`: concurrent topic -> connections map
//! - `engine`: `Hub`, the connect / disconnect / publish entry point
//! - `event`: the comment lifecycle events sent to subscribers
//! - `notifier`: helpers the comment service calls after a committed write

pub mod engine;
pub mod event;
pub mod notifier;
pub mod registry;

/// Topics are post ids.
pub type TopicId = i64;

pub use engine::{Delivery, Hub};
pub use event::{CommentEvent, CommentPayload, CommentRef};
pub use notifier::{Comment, CommentNotifier};
pub use registry::TopicRegistry;
