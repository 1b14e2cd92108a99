use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::observable::{ListenerId, Listeners};

/// The set of currently selected items.
///
/// `SelectionModel` is a shared handle: clones point at the same selection,
/// so the canvas, the gesture handlers and a bound list widget can all hold
/// one. Order is kept only so that [`first`](Self::first) is meaningful;
/// membership has set semantics.
///
/// Listeners receive the new contents after every change. A bulk
/// [`set`](Self::set) notifies at most once.
pub struct SelectionModel<T> {
    inner: Rc<Inner<T>>,
}

struct Inner<T> {
    items: RefCell<Vec<T>>,
    listeners: Listeners<[T]>,
    suppressed: Cell<bool>,
}

impl<T> Clone for SelectionModel<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + PartialEq> Default for SelectionModel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for SelectionModel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionModel")
            .field("items", &self.inner.items.borrow())
            .field("listeners", &self.inner.listeners)
            .finish()
    }
}

impl<T: Clone + PartialEq> SelectionModel<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                items: RefCell::new(Vec::new()),
                listeners: Listeners::default(),
                suppressed: Cell::new(false),
            }),
        }
    }

    /// Replaces the whole selection. Duplicates in `items` collapse to one
    /// entry. Listeners run once if the contents changed and not at all
    /// otherwise.
    pub fn set(&self, items: impl IntoIterator<Item = T>) {
        let before = self.items();
        self.inner.suppressed.set(true);
        self.inner.items.borrow_mut().clear();
        for item in items {
            self.add(item);
        }
        self.inner.suppressed.set(false);
        if *self.inner.items.borrow() != before {
            self.notify();
        }
    }

    /// Adds `item` unless already selected. Returns whether it was added.
    pub fn add(&self, item: T) -> bool {
        {
            let mut items = self.inner.items.borrow_mut();
            if items.contains(&item) {
                return false;
            }
            items.push(item);
        }
        self.notify();
        true
    }

    pub fn remove(&self, item: &T) -> bool {
        {
            let mut items = self.inner.items.borrow_mut();
            let Some(index) = items.iter().position(|i| i == item) else {
                return false;
            };
            items.remove(index);
        }
        self.notify();
        true
    }

    /// Adds `item` if absent, removes it otherwise. Returns whether it is
    /// selected afterwards.
    pub fn toggle(&self, item: T) -> bool {
        if self.remove(&item) {
            false
        } else {
            self.add(item)
        }
    }

    /// Empties the selection; notifies only if it was non-empty.
    pub fn clear(&self) {
        {
            let mut items = self.inner.items.borrow_mut();
            if items.is_empty() {
                return;
            }
            items.clear();
        }
        self.notify();
    }

    pub fn contains(&self, item: &T) -> bool {
        self.inner.items.borrow().contains(item)
    }

    /// Snapshot of the current selection in insertion order.
    pub fn items(&self) -> Vec<T> {
        self.inner.items.borrow().clone()
    }

    pub fn first(&self) -> Option<T> {
        self.inner.items.borrow().first().cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.items.borrow().is_empty()
    }

    pub fn on_change(&self, listener: impl Fn(&[T]) + 'static) -> ListenerId {
        self.inner.listeners.add(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.listeners.remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    fn notify(&self) {
        if self.inner.suppressed.get() {
            return;
        }
        // Listeners may mutate the selection, so never hold the borrow here
        let snapshot = self.items();
        self.inner.listeners.notify(&snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting(model: &SelectionModel<u32>) -> Rc<Cell<usize>> {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        model.on_change(move |_| counter.set(counter.get() + 1));
        hits
    }

    #[test]
    fn set_notifies_once_for_bulk_replace() {
        let model = SelectionModel::new();
        let hits = counting(&model);

        model.set([1, 2, 3, 2]);
        assert_eq!(hits.get(), 1);
        assert_eq!(model.items(), vec![1, 2, 3]);

        model.set([1, 2, 3]);
        assert_eq!(hits.get(), 1, "identical contents must not notify");

        model.set([]);
        assert_eq!(hits.get(), 2);
        assert!(model.is_empty());
    }

    #[test]
    fn toggle_adds_then_removes() {
        let model = SelectionModel::new();
        assert!(model.toggle(7));
        assert!(model.contains(&7));
        assert!(!model.toggle(7));
        assert!(!model.contains(&7));
    }

    #[test]
    fn clear_on_empty_is_silent() {
        let model = SelectionModel::new();
        let hits = counting(&model);
        model.clear();
        assert_eq!(hits.get(), 0);
        model.add(4);
        model.clear();
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn first_tracks_insertion_order() {
        let model = SelectionModel::new();
        model.set([5, 3]);
        model.add(9);
        assert_eq!(model.first(), Some(5));
        model.remove(&5);
        assert_eq!(model.first(), Some(3));
    }

    #[test]
    fn clones_share_state_and_listener_sees_new_contents() {
        let model = SelectionModel::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        model.on_change(move |items: &[u32]| *sink.borrow_mut() = items.to_vec());

        let other = model.clone();
        other.add(1);
        assert!(model.contains(&1));
        assert_eq!(*seen.borrow(), vec![1]);
    }

    #[test]
    fn listener_may_mutate_selection() {
        let model = SelectionModel::new();
        let inner = model.clone();
        // Keep at most one item selected
        model.on_change(move |items: &[u32]| {
            if items.len() > 1 {
                inner.set([items[items.len() - 1]]);
            }
        });
        model.add(1);
        model.add(2);
        assert_eq!(model.items(), vec![2]);
    }
}
