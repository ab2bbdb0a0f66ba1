//! The `utils` module provides shared definitions used across `livecomments`:
//! error types and logging setup.

pub mod error;
pub mod logging;

pub use error::{HubError, SendError, TransportError};
