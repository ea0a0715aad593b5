use crate::event::SessionEvent;
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

/// Set of usernames whose session events are suppressed.
///
/// Clones share the same set, so the owner can replace it while a monitor
/// worker reads it. Every replacement swaps the whole set under the write
/// lock; readers never see a partial update.
#[derive(Debug, Clone, Default)]
pub struct IgnoreFilter {
    users: Arc<RwLock<HashSet<String>>>,
}

impl IgnoreFilter {
    pub fn new<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            users: Arc::new(RwLock::new(users.into_iter().map(Into::into).collect())),
        }
    }

    pub fn is_ignored(&self, username: &str) -> bool {
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(username)
    }

    /// True if the event should reach a consumer.
    pub fn accepts(&self, event: &SessionEvent) -> bool {
        !self.is_ignored(event.username())
    }

    /// Replace the whole set.
    pub fn replace<I, S>(&self, users: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let next: HashSet<String> = users.into_iter().map(Into::into).collect();
        *self.users.write().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Sorted copy of the current members.
    pub fn snapshot(&self) -> Vec<String> {
        let mut users: Vec<String> = self
            .users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect();
        users.sort();
        users
    }

    pub fn len(&self) -> usize {
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
