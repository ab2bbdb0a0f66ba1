//! # livecomments
//!
//! `livecomments` is the real-time comment broadcast hub of a blog backend.
//! Readers of a post open a WebSocket on `/comments/{post_id}`; whenever the
//! comment service commits a create, update or delete it publishes an event
//! to the hub, which fans it out to every socket subscribed to that post.
//!
//! Delivery is best-effort: no history, no acks, no retries. A subscriber
//! that cannot keep up or has gone away is dropped and must reconnect.
//!
//! ## Core Modules
//!
//! - `hub`: the broadcast hub, topic registry and comment events.
//! - `connection`: a live subscriber's bounded outbound queue and liveness.
//! - `transport`: the WebSocket endpoint feeding sockets into the hub.
//! - `config`: server and hub settings from files and environment.
//! - `utils`: error types and logging setup.

pub mod config;
pub mod connection;
pub mod hub;
pub mod transport;
pub mod utils;

pub use connection::Connection;
pub use hub::{CommentEvent, CommentNotifier, Hub};
