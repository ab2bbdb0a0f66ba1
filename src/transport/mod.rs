//! The `transport` module is the network-facing endpoint: it accepts
//! WebSocket subscribers for a post and bridges their sockets to the hub.

pub mod route;
pub mod websocket;


pub use websocket::{serve, start_websocket_server};
