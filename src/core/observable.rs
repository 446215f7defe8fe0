//! Observable value with synchronous subscriber callbacks.
//!
//! Callbacks run on the thread that calls [`Observable::set`], once per call,
//! in unspecified order. Callbacks may subscribe and unsubscribe; those changes
//! take effect from the next `set`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Handle returned by [`Observable::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct Observable<T> {
    value: Mutex<Option<T>>,
    callbacks: Mutex<HashMap<SubscriptionId, Callback<T>>>,
    next_id: AtomicU64,
}

impl<T: Clone> Observable<T> {
    pub fn new() -> Self {
        Self::with_value(None)
    }

    pub fn with_value(initial: Option<T>) -> Self {
        Self {
            value: Mutex::new(initial),
            callbacks: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.callbacks).insert(id, Arc::new(callback));
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        lock(&self.callbacks).remove(&id).is_some()
    }

    /// Store `value` and notify every subscriber.
    pub fn set(&self, value: T) {
        *lock(&self.value) = Some(value.clone());

        // Run the callbacks unlocked so they can re-enter the registry.
        let callbacks: Vec<Callback<T>> = lock(&self.callbacks).values().cloned().collect();
        for callback in callbacks {
            callback(&value);
        }
    }

    pub fn get(&self) -> Option<T> {
        lock(&self.value).clone()
    }

    /// Clear the value without notifying.
    pub fn unset(&self) {
        *lock(&self.value) = None;
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.callbacks).len()
    }
}

impl<T: Clone> Default for Observable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.get())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

// A panicking subscriber must not wedge every later notification.
fn lock<V>(mutex: &Mutex<V>) -> std::sync::MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_notifies_each_subscriber_once() {
        let observable = Observable::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        observable.subscribe(move |v: &String| sink.lock().unwrap().push(format!("a:{}", v)));
        let sink = Arc::clone(&seen);
        observable.subscribe(move |v: &String| sink.lock().unwrap().push(format!("b:{}", v)));

        observable.set("connected".to_string());

        let mut seen = seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec!["a:connected", "b:connected"]);
        assert_eq!(observable.get().as_deref(), Some("connected"));
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let observable = Observable::new();
        let count = Arc::new(AtomicU64::new(0));

        let counter = Arc::clone(&count);
        let id = observable.subscribe(move |_: &u8| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        observable.set(1);
        assert!(observable.unsubscribe(id));
        assert!(!observable.unsubscribe(id));
        observable.set(2);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(observable.subscriber_count(), 0);
    }

    #[test]
    fn test_unset_does_not_notify() {
        let observable = Observable::with_value(Some(5u8));
        let count = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&count);
        observable.subscribe(move |_: &u8| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        observable.unset();
        assert_eq!(observable.get(), None);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_callback_can_change_subscriptions() {
        let observable = Arc::new(Observable::new());
        let own_id = Arc::new(Mutex::new(None));
        let count = Arc::new(AtomicU64::new(0));

        let registry = Arc::clone(&observable);
        let slot = Arc::clone(&own_id);
        let counter = Arc::clone(&count);
        let id = observable.subscribe(move |_: &u8| {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(id) = slot.lock().unwrap().take() {
                registry.unsubscribe(id);
            }
            let counter = Arc::clone(&counter);
            registry.subscribe(move |_: &u8| {
                counter.fetch_add(10, Ordering::SeqCst);
            });
        });
        *own_id.lock().unwrap() = Some(id);

        observable.set(1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(observable.subscriber_count(), 1);

        observable.set(2);
        assert_eq!(count.load(Ordering::SeqCst), 11);
    }
}
