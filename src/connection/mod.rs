//! The `connection` module defines a live subscriber.
//!
//! It provides `Connection`, the owning sender for one subscriber's outbound
//! queue, the registry's non-owning `WeakConnection`, and `Outbound`, the
//! receiving half driven by the transport's socket writer.

pub mod subscriber;

pub use subscriber::{Connection, ConnectionId, Liveness, Outbound, WeakConnection};

#[cfg(test)]
mod tests;
