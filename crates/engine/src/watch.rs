//! Change notification.
//!
//! Each group gets a broadcast channel created on first subscription. Every
//! committed write publishes the new snapshot. Dropping the receiver
//! unsubscribes; a subscriber that falls behind skips to newer snapshots.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use tokio::sync::broadcast;

use crate::Group;

const CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Default)]
pub(crate) struct Watchers {
    channels: Mutex<HashMap<String, broadcast::Sender<Group>>>,
}

impl Watchers {
    pub(crate) fn subscribe(&self, group_id: &str) -> broadcast::Receiver<Group> {
        let mut channels = self.lock();
        // Drop channels whose subscribers all went away.
        channels.retain(|_, sender| sender.receiver_count() > 0);
        channels
            .entry(group_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    pub(crate) fn publish(&self, group: &Group) {
        let mut channels = self.lock();
        let Some(sender) = channels.get(&group.id) else {
            return;
        };
        match sender.send(group.clone()) {
            Ok(receivers) => {
                tracing::debug!(group_id = %group.id, receivers, "group change published");
            }
            Err(_) => {
                // Nobody listens anymore.
                channels.remove(&group.id);
            }
        }
    }

    /// Drop the channel of a deleted group, closing every receiver.
    pub(crate) fn close(&self, group_id: &str) {
        self.lock().remove(group_id);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, broadcast::Sender<Group>>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
