//! Topic registry
//!
//! Maps a topic (post id) to the connections currently subscribed to it. The
//! map is a `DashMap`, so each topic's set is guarded by its shard lock:
//! mutations of the same topic are mutually exclusive while unrelated topics
//! on other shards proceed in parallel.
//!
//! A topic exists only while it has at least one connection; the removal that
//! empties a set deletes the entry under the same lock.

use std::collections::HashMap;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::connection::{ConnectionId, WeakConnection};
use crate::hub::TopicId;

#[derive(Debug, Default)]
pub struct TopicRegistry {
    topics: DashMap<TopicId, HashMap<ConnectionId, WeakConnection>>,
}

impl TopicRegistry {
    pub fn new() -> Self {
        Self {
            topics: DashMap::new(),
        }
    }

    /// Add a connection to the topic, creating the topic if needed.
    /// Returns `false` if it was already registered.
    pub fn add(&self, topic: TopicId, connection: WeakConnection) -> bool {
        self.topics
            .entry(topic)
            .or_default()
            .insert(connection.id(), connection)
            .is_none()
    }

    /// Remove a connection from the topic. Absent topics and connections are
    /// ignored. Returns whether anything was removed.
    pub fn remove(&self, topic: TopicId, id: &ConnectionId) -> bool {
        match self.topics.entry(topic) {
            Entry::Occupied(mut entry) => {
                let removed = entry.get_mut().remove(id).is_some();
                if entry.get().is_empty() {
                    entry.remove();
                }
                removed
            }
            Entry::Vacant(_) => false,
        }
    }

    /// Point-in-time copy of the topic's subscribers, in no particular order.
    pub fn snapshot(&self, topic: TopicId) -> Vec<WeakConnection> {
        self.topics
            .get(&topic)
            .map(|set| set.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, topic: TopicId, id: &ConnectionId) -> bool {
        self.topics
            .get(&topic)
            .is_some_and(|set| set.contains_key(id))
    }

    pub fn connection_count(&self, topic: TopicId) -> usize {
        self.topics.get(&topic).map_or(0, |set| set.len())
    }

    /// Number of topics with at least one subscriber.
    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}
