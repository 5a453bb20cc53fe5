//! Single-threaded observable values.
//!
//! A subscriber sees the current value as soon as it subscribes and then
//! every change after that. Setting an equal value is not a change.

use std::sync::atomic::{AtomicU64, Ordering};

type Subscriber<T> = Box<dyn FnMut(&T) + Send>;

// Unique across every observable so a holder of several can route an id back.
static NEXT_SUBSCRIPTION: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct Observable<T> {
    value: T,
    subscribers: Vec<(SubscriptionId, Subscriber<T>)>,
}

impl<T: PartialEq> Observable<T> {
    pub const fn new(value: T) -> Self {
        Self {
            value,
            subscribers: Vec::new(),
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Stores `value`, notifying subscribers only if it differs from the current one.
    pub fn set(&mut self, value: T) {
        if self.value == value {
            return;
        }
        self.value = value;
        self.notify();
    }

    pub fn update<F>(&mut self, updater: F)
    where
        F: FnOnce(&T) -> T,
    {
        let next = updater(&self.value);
        self.set(next);
    }

    pub fn subscribe<F>(&mut self, mut callback: F) -> SubscriptionId
    where
        F: FnMut(&T) + Send + 'static,
    {
        let id = SubscriptionId(NEXT_SUBSCRIPTION.fetch_add(1, Ordering::Relaxed));
        callback(&self.value);
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn notify(&mut self) {
        let value = &self.value;
        for (_, callback) in self.subscribers.iter_mut() {
            callback(value);
        }
    }
}

impl<T: Default + PartialEq> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
