//! Observable ordered collection of records.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Listener notified with the full contents after every mutation.
pub type UpdateListener<T> = Arc<dyn Fn(&[T]) + Send + Sync>;

/// Handle returned by `on_update`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

struct ListInner<T> {
    items: RwLock<Vec<T>>,
    listeners: RwLock<Vec<(Subscription, UpdateListener<T>)>>,
    next_subscription: AtomicU64,
}

/// Shared list that notifies subscribers after each mutation.
///
/// Listeners run after the lock is released and receive a snapshot, so they
/// may read or even mutate the list again.
pub struct ObservableList<T> {
    inner: Arc<ListInner<T>>,
}

impl<T> Clone for ObservableList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items = self.inner.items.read().unwrap_or_else(|p| p.into_inner());
        f.debug_struct("ObservableList")
            .field("items", &*items)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<T: Clone> Default for ObservableList<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> ObservableList<T> {
    /// Remove a subscription. Returns whether it existed.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut listeners = self.inner.listeners.write().unwrap_or_else(|p| p.into_inner());
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != subscription);
        listeners.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .listeners
            .read()
            .map(|l| l.len())
            .unwrap_or(0)
    }
}

impl<T: Clone> ObservableList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            inner: Arc::new(ListInner {
                items: RwLock::new(items),
                listeners: RwLock::new(Vec::new()),
                next_subscription: AtomicU64::new(0),
            }),
        }
    }

    /// Subscribe to mutations.
    pub fn on_update<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&[T]) + Send + Sync + 'static,
    {
        let id = Subscription(self.inner.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.inner
            .listeners
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .push((id, Arc::new(listener)));
        id
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.inner
            .items
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.inner
            .items
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .get(index)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner
            .items
            .read()
            .map(|items| items.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push(&self, item: T) {
        self.mutate(|items| items.push(item));
    }

    /// Insert at `index`, clamped to the end of the list.
    pub fn insert(&self, index: usize, item: T) {
        self.mutate(|items| {
            let index = index.min(items.len());
            items.insert(index, item);
        });
    }

    pub fn remove(&self, index: usize) -> Option<T> {
        let removed = {
            let mut items = self.inner.items.write().unwrap_or_else(|p| p.into_inner());
            (index < items.len()).then(|| items.remove(index))
        };
        if removed.is_some() {
            self.notify();
        }
        removed
    }

    /// Replace the item at `index`; out-of-range indices are ignored.
    pub fn set(&self, index: usize, item: T) -> bool {
        let replaced = {
            let mut items = self.inner.items.write().unwrap_or_else(|p| p.into_inner());
            match items.get_mut(index) {
                Some(slot) => {
                    *slot = item;
                    true
                }
                None => false,
            }
        };
        if replaced {
            self.notify();
        }
        replaced
    }

    /// Replace the whole contents.
    pub fn replace_all(&self, items: Vec<T>) {
        self.mutate(|current| *current = items);
    }

    pub fn clear(&self) {
        self.mutate(Vec::clear);
    }

    /// Arbitrary in-place mutation, notified once.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Vec<T>),
    {
        self.mutate(f);
    }

    fn mutate<F>(&self, f: F)
    where
        F: FnOnce(&mut Vec<T>),
    {
        {
            let mut items = self.inner.items.write().unwrap_or_else(|p| p.into_inner());
            f(&mut items);
        }
        self.notify();
    }

    fn notify(&self) {
        let listeners: Vec<UpdateListener<T>> = self
            .inner
            .listeners
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        if listeners.is_empty() {
            return;
        }
        let snapshot = self.to_vec();
        for listener in listeners {
            listener(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_listener_sees_contents_after_mutation() {
        let list = ObservableList::new(vec![1, 2]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        list.on_update(move |items| s.lock().unwrap().push(items.to_vec()));

        list.push(3);
        list.remove(0);

        assert_eq!(*seen.lock().unwrap(), vec![vec![1, 2, 3], vec![2, 3]]);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let list = ObservableList::new(Vec::<u8>::new());
        let count = Arc::new(AtomicU64::new(0));
        let c = Arc::clone(&count);
        let sub = list.on_update(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        list.push(1);
        assert!(list.unsubscribe(sub));
        list.push(2);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!list.unsubscribe(sub));
    }

    #[test]
    fn test_out_of_range_writes_do_not_notify() {
        let list = ObservableList::new(vec!["a"]);
        let count = Arc::new(AtomicU64::new(0));
        let c = Arc::clone(&count);
        list.on_update(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!list.set(5, "b"));
        assert_eq!(list.remove(5), None);

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
