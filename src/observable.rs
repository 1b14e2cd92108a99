//! Minimal observer primitives: a listener registry and an observable cell.
//!
//! Delivery is synchronous and single-threaded. Listeners run over a snapshot
//! of the registry, so a listener may add or remove listeners (itself
//! included) while being notified.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

// Single static counter for every listener and subscription handle
static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Handle returned when registering a listener, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Registry of listeners receiving `&A`.
pub struct Listeners<A: ?Sized> {
    entries: RefCell<Vec<(ListenerId, Rc<dyn Fn(&A)>)>>,
}

impl<A: ?Sized> Default for Listeners<A> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
        }
    }
}

impl<A: ?Sized> fmt::Debug for Listeners<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} listeners>", self.entries.borrow().len())
    }
}

impl<A: ?Sized> Listeners<A> {
    pub fn add(&self, listener: impl Fn(&A) + 'static) -> ListenerId {
        let id = ListenerId::next();
        self.entries.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Invokes every listener registered at the time of the call exactly once.
    pub fn notify(&self, value: &A) {
        let snapshot: Vec<_> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(value);
        }
    }
}

/// A value with change notification on write.
pub struct ObservableCell<T> {
    value: T,
    listeners: Listeners<T>,
}

impl<T: fmt::Debug> fmt::Debug for ObservableCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableCell")
            .field("value", &self.value)
            .field("listeners", &self.listeners)
            .finish()
    }
}

impl<T: Default> Default for ObservableCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> ObservableCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            listeners: Listeners::default(),
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }
}

impl<T: Clone + PartialEq> ObservableCell<T> {
    pub fn get(&self) -> T {
        self.value.clone()
    }

    /// Stores `value`; listeners run only when it differs from the current one.
    /// Returns whether the value changed.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        self.listeners.notify(&self.value);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn cell_notifies_only_on_change() {
        let hits = Rc::new(Cell::new(0));
        let mut cell = ObservableCell::new(false);
        let counter = Rc::clone(&hits);
        cell.subscribe(move |_| counter.set(counter.get() + 1));

        assert!(!cell.set(false));
        assert!(cell.set(true));
        assert!(!cell.set(true));
        assert_eq!(hits.get(), 1);
        assert!(cell.get());
    }

    #[test]
    fn listener_may_remove_itself_during_notify() {
        let listeners: Rc<Listeners<u32>> = Rc::new(Listeners::default());
        let seen = Rc::new(Cell::new(0));
        let own_id = Rc::new(Cell::new(None));

        let registry = Rc::clone(&listeners);
        let slot = Rc::clone(&own_id);
        let id = listeners.add(move |_| {
            if let Some(id) = slot.get() {
                registry.remove(id);
            }
        });
        own_id.set(Some(id));
        let counter = Rc::clone(&seen);
        listeners.add(move |v| counter.set(counter.get() + *v));

        listeners.notify(&2);
        assert_eq!(seen.get(), 2);
        assert_eq!(listeners.len(), 1);
    }
}
