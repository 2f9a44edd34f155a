use std::fmt;
use std::sync::{Arc, RwLock};

type OnChange = Arc<dyn Fn() + Send + Sync>;

/// Observable property with on-write invalidation.
///
/// `Observable<T>` wraps a value in `Arc<RwLock<T>>`, making it cheap to
/// clone and safe to hand to async tasks. Every write runs the `on_change`
/// callback, either only when the value actually changed or unconditionally,
/// depending on how the property was created. The callback runs after the
/// lock is released, so it may read the property again.
///
/// # Example
///
/// ```ignore
/// struct Label {
///     base: WidgetBase,
///     text: Observable<String>,
/// }
///
/// impl Label {
///     fn new() -> Self {
///         let base = WidgetBase::new();
///         let text = observable(String::new(), base.invalidator().callback());
///         Self { base, text }
///     }
/// }
///
/// label.text.set("hello".into()); // schedules one re-render
/// ```
pub struct Observable<T> {
    inner: Arc<RwLock<T>>,
    on_change: OnChange,
    equals: Option<fn(&T, &T) -> bool>,
}

/// Create a property that invalidates only when a write changes its value.
pub fn observable<T, F>(initial: T, on_change: F) -> Observable<T>
where
    T: PartialEq,
    F: Fn() + Send + Sync + 'static,
{
    Observable {
        inner: Arc::new(RwLock::new(initial)),
        on_change: Arc::new(on_change),
        equals: Some(<T as PartialEq>::eq),
    }
}

/// Create a property that invalidates on every write.
pub fn observable_always<T, F>(initial: T, on_change: F) -> Observable<T>
where
    F: Fn() + Send + Sync + 'static,
{
    Observable {
        inner: Arc::new(RwLock::new(initial)),
        on_change: Arc::new(on_change),
        equals: None,
    }
}

impl<T> Observable<T> {
    /// Get a clone of the current value
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.inner
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Borrow the current value for the duration of `f`.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        match self.inner.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    /// Set a new value
    pub fn set(&self, value: T) {
        self.replace(value);
    }

    /// Set a new value, returning the previous one.
    pub fn replace(&self, value: T) -> T {
        let (previous, changed) = {
            let mut guard = self.inner.write().unwrap_or_else(|p| p.into_inner());
            let changed = self.equals.is_none_or(|eq| !eq(&guard, &value));
            (std::mem::replace(&mut *guard, value), changed)
        };
        if changed {
            (self.on_change)();
        }
        previous
    }

    /// Update the value in place. Always invalidates.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        {
            let mut guard = self.inner.write().unwrap_or_else(|p| p.into_inner());
            f(&mut guard);
        }
        (self.on_change)();
    }

    /// Whether writes of an equal value are skipped.
    pub fn is_change_only(&self) -> bool {
        self.equals.is_some()
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            on_change: Arc::clone(&self.on_change),
            equals: self.equals,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with(|value| {
            f.debug_struct("Observable")
                .field("value", value)
                .field("change_only", &self.is_change_only())
                .finish()
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        (count, move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_equal_write_does_not_invalidate() {
        let (count, cb) = counter();
        let prop = observable(1, cb);

        prop.set(1);
        assert_eq!(count.load(Ordering::SeqCst), 0);

        prop.set(2);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(prop.get(), 2);
    }

    #[test]
    fn test_always_invalidates_on_every_write() {
        let (count, cb) = counter();
        let prop = observable_always("a".to_string(), cb);

        prop.set("a".to_string());
        prop.set("a".to_string());

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_replace_returns_previous() {
        let (_, cb) = counter();
        let prop = observable(vec![1], cb);

        assert_eq!(prop.replace(vec![2, 3]), vec![1]);
        assert_eq!(prop.with(|v| v.len()), 2);
    }

    #[test]
    fn test_callback_can_read_the_property() {
        let seen = Arc::new(AtomicUsize::new(0));
        let slot: Arc<RwLock<Option<Observable<usize>>>> = Arc::new(RwLock::new(None));
        let (s, reader) = (Arc::clone(&seen), Arc::clone(&slot));
        let prop = observable(0usize, move || {
            if let Some(p) = reader.read().unwrap().as_ref() {
                s.store(p.get(), Ordering::SeqCst);
            }
        });
        *slot.write().unwrap() = Some(prop.clone());

        prop.update(|v| *v = 7);

        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }
}
