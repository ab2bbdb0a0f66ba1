//! Subscriber connection
//!
//! A `Connection` is the sending side of one subscriber's bounded outbound
//! queue, bound to a single topic for its whole life. The transport owns the
//! `Connection` and the matching `Outbound`; the registry only ever holds a
//! `WeakConnection`, so once the transport drops its handle no frame can be
//! queued for that subscriber again.
//!
//! Liveness is shared between all handles: `Alive`, then optionally `Failed`
//! (the socket writer hit an I/O error), then `Removed`. `Removed` is terminal
//! and reached exactly once.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::sync::mpsc::{self, Receiver, Sender, WeakSender};
use tokio::sync::mpsc::error::SendTimeoutError;
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

use crate::hub::TopicId;
use crate::utils::SendError;

pub type ConnectionId = Uuid;

const ALIVE: u8 = 0;
const FAILED: u8 = 1;
const REMOVED: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    Failed,
    Removed,
}

#[derive(Debug)]
struct ConnectionState {
    status: AtomicU8,
    changed: Notify,
}

impl ConnectionState {
    fn new() -> Self {
        Self {
            status: AtomicU8::new(ALIVE),
            changed: Notify::new(),
        }
    }

    fn liveness(&self) -> Liveness {
        match self.status.load(Ordering::Acquire) {
            ALIVE => Liveness::Alive,
            FAILED => Liveness::Failed,
            _ => Liveness::Removed,
        }
    }

    fn fail(&self) {
        if self
            .status
            .compare_exchange(ALIVE, FAILED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.changed.notify_waiters();
        }
    }

    fn mark_removed(&self) -> bool {
        let first = self.status.swap(REMOVED, Ordering::AcqRel) != REMOVED;
        if first {
            self.changed.notify_waiters();
        }
        first
    }

    async fn closed(&self) {
        loop {
            // Registered before the check so a transition in between is not missed.
            let notified = self.changed.notified();
            if self.liveness() != Liveness::Alive {
                return;
            }
            notified.await;
        }
    }
}

/// Owning handle to a subscriber's outbound queue.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    topic: TopicId,
    sender: Sender<WsMessage>,
    state: Arc<ConnectionState>,
}

/// Non-owning handle stored by the registry.
#[derive(Debug, Clone)]
pub struct WeakConnection {
    id: ConnectionId,
    topic: TopicId,
    sender: WeakSender<WsMessage>,
    state: Arc<ConnectionState>,
}

/// The transport's half: frames queued for the socket writer.
#[derive(Debug)]
pub struct Outbound {
    id: ConnectionId,
    receiver: Receiver<WsMessage>,
    state: Arc<ConnectionState>,
}

impl Connection {
    /// Create a connection for `topic` whose queue holds up to `capacity` frames.
    pub fn open(topic: TopicId, capacity: usize) -> (Self, Outbound) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let id = Uuid::new_v4();
        let state = Arc::new(ConnectionState::new());

        let connection = Self {
            id,
            topic,
            sender,
            state: state.clone(),
        };
        let outbound = Outbound {
            id,
            receiver,
            state,
        };
        (connection, outbound)
    }

    /// Unique id, shared with the `Outbound` and every `WeakConnection`.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// The post this connection was opened for. Fixed for its whole life.
    pub fn topic(&self) -> TopicId {
        self.topic
    }

    /// Current state, as seen by every handle of this connection.
    pub fn liveness(&self) -> Liveness {
        self.state.liveness()
    }

    /// `false` after the writer failed or the hub removed the connection.
    pub fn is_alive(&self) -> bool {
        self.liveness() == Liveness::Alive
    }

    /// Queue `frame` for the subscriber, waiting at most `timeout` for room.
    pub async fn send(&self, frame: WsMessage, timeout: Duration) -> Result<(), SendError> {
        match self.state.liveness() {
            Liveness::Alive => {}
            Liveness::Failed => return Err(SendError::TransportFailure),
            Liveness::Removed => return Err(SendError::Closed),
        }

        match self.sender.send_timeout(frame, timeout).await {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Timeout(_)) => Err(SendError::Timeout(timeout)),
            Err(SendTimeoutError::Closed(_)) => Err(SendError::Closed),
        }
    }

    pub fn downgrade(&self) -> WeakConnection {
        WeakConnection {
            id: self.id,
            topic: self.topic,
            sender: self.sender.downgrade(),
            state: self.state.clone(),
        }
    }

    /// Terminal transition. Returns `true` only for the call that performed it.
    pub fn mark_removed(&self) -> bool {
        self.state.mark_removed()
    }

    /// Resolves once the connection has failed or been removed.
    pub async fn closed(&self) {
        self.state.closed().await
    }
}

impl WeakConnection {
    /// Id of the connection this handle points to.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Topic of the underlying connection.
    pub fn topic(&self) -> TopicId {
        self.topic
    }

    /// Liveness check that does not need the owning handle.
    pub fn is_alive(&self) -> bool {
        self.state.liveness() == Liveness::Alive
    }

    /// `None` once every owning handle has been dropped.
    pub fn upgrade(&self) -> Option<Connection> {
        self.sender.upgrade().map(|sender| Connection {
            id: self.id,
            topic: self.topic,
            sender,
            state: self.state.clone(),
        })
    }

    /// Same transition as `Connection::mark_removed`.
    pub fn mark_removed(&self) -> bool {
        self.state.mark_removed()
    }
}

impl Outbound {
    /// Id of the connection this queue belongs to.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Next queued frame, or `None` once the connection is no longer alive or
    /// every sender is gone.
    pub async fn recv(&mut self) -> Option<WsMessage> {
        if self.state.liveness() != Liveness::Alive {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.state.closed() => None,
            frame = self.receiver.recv() => frame,
        }
    }

    /// Record that the socket write failed; pending and future sends error out.
    pub fn fail(&self) {
        self.state.fail();
    }

    /// Resolves once the connection has failed or been removed.
    pub async fn closed(&self) {
        self.state.closed().await
    }
}
