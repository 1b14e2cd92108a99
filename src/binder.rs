//! Two-way synchronization of two selection stores, typically a list widget
//! and the canvas [`SelectionModel`].
//!
//! Each side notifies on change, so naive syncing echoes forever: left
//! updates right, right's listener updates left, and so on. The binder keeps
//! one flag per direction. While an update flows from one side, change
//! notifications coming back from the other side are dropped.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::observable::{ListenerId, Listeners};
use crate::selection::SelectionModel;

/// One side of a [`SelectionBinder`].
pub trait SelectionSide<T> {
    fn selected(&self) -> Vec<T>;

    /// Replaces the selection with `items`.
    fn replace(&self, items: &[T]);

    /// Registers a change listener.
    fn add_listener(&self, listener: Rc<dyn Fn()>) -> ListenerId;

    fn remove_listener(&self, id: ListenerId) -> bool;
}

impl<T: Clone + PartialEq + 'static> SelectionSide<T> for SelectionModel<T> {
    fn selected(&self) -> Vec<T> {
        self.items()
    }

    fn replace(&self, items: &[T]) {
        self.set(items.iter().cloned());
    }

    fn add_listener(&self, listener: Rc<dyn Fn()>) -> ListenerId {
        self.on_change(move |_| listener())
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        SelectionModel::remove_listener(self, id)
    }
}

/// Multi-selection state of a list widget. Unlike [`SelectionModel`] it
/// notifies once per elementary change, so replacing the selection produces
/// a clear notification followed by one per selected item.
pub struct ListSelection<T> {
    selected: Rc<RefCell<Vec<T>>>,
    listeners: Rc<Listeners<()>>,
}

impl<T> Clone for ListSelection<T> {
    fn clone(&self) -> Self {
        Self {
            selected: Rc::clone(&self.selected),
            listeners: Rc::clone(&self.listeners),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ListSelection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListSelection")
            .field("selected", &self.selected.borrow())
            .finish()
    }
}

impl<T: Clone + PartialEq> Default for ListSelection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq> ListSelection<T> {
    pub fn new() -> Self {
        Self {
            selected: Rc::new(RefCell::new(Vec::new())),
            listeners: Rc::new(Listeners::default()),
        }
    }

    pub fn select(&self, item: T) {
        {
            let mut selected = self.selected.borrow_mut();
            if selected.contains(&item) {
                return;
            }
            selected.push(item);
        }
        self.listeners.notify(&());
    }

    pub fn deselect(&self, item: &T) {
        {
            let mut selected = self.selected.borrow_mut();
            let Some(index) = selected.iter().position(|i| i == item) else {
                return;
            };
            selected.remove(index);
        }
        self.listeners.notify(&());
    }

    pub fn clear_selection(&self) {
        {
            let mut selected = self.selected.borrow_mut();
            if selected.is_empty() {
                return;
            }
            selected.clear();
        }
        self.listeners.notify(&());
    }

    pub fn is_selected(&self, item: &T) -> bool {
        self.selected.borrow().contains(item)
    }

    pub fn selected_items(&self) -> Vec<T> {
        self.selected.borrow().clone()
    }

    /// Drops selected items not in `items`, e.g. after the list contents changed.
    pub fn retain_items(&self, items: &[T]) {
        let stale: Vec<T> = self
            .selected
            .borrow()
            .iter()
            .filter(|i| !items.contains(i))
            .cloned()
            .collect();
        for item in &stale {
            self.deselect(item);
        }
    }
}

impl<T: Clone + PartialEq> SelectionSide<T> for ListSelection<T> {
    fn selected(&self) -> Vec<T> {
        self.selected_items()
    }

    fn replace(&self, items: &[T]) {
        self.clear_selection();
        for item in items {
            self.select(item.clone());
        }
    }

    fn add_listener(&self, listener: Rc<dyn Fn()>) -> ListenerId {
        self.listeners.add(move |_| listener())
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }
}

/// Raises `flag` for its lifetime.
struct Raised(Rc<Cell<bool>>);

impl Raised {
    fn new(flag: &Rc<Cell<bool>>) -> Self {
        flag.set(true);
        Self(Rc::clone(flag))
    }
}

impl Drop for Raised {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Runs `action` unless `blocked` is raised, keeping `own` raised meanwhile.
fn guarded(blocked: &Cell<bool>, own: &Rc<Cell<bool>>, action: impl FnOnce()) {
    if blocked.get() {
        return;
    }
    let _raised = Raised::new(own);
    action();
}

/// Keeps `left` and `right` selecting the same items while bound.
pub struct SelectionBinder<T, L, R> {
    left: L,
    right: R,
    /// Raised while an update flows from left to right
    from_left: Rc<Cell<bool>>,
    /// Raised while an update flows from right to left
    from_right: Rc<Cell<bool>>,
    listeners: Option<(ListenerId, ListenerId)>,
    _item: PhantomData<fn() -> T>,
}

impl<T, L, R> fmt::Debug for SelectionBinder<T, L, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionBinder")
            .field("bound", &self.listeners.is_some())
            .finish()
    }
}

impl<T, L, R> SelectionBinder<T, L, R>
where
    T: 'static,
    L: SelectionSide<T> + Clone + 'static,
    R: SelectionSide<T> + Clone + 'static,
{
    pub fn new(left: L, right: R) -> Self {
        Self {
            left,
            right,
            from_left: Rc::new(Cell::new(false)),
            from_right: Rc::new(Cell::new(false)),
            listeners: None,
            _item: PhantomData,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.listeners.is_some()
    }

    pub fn left(&self) -> &L {
        &self.left
    }

    pub fn right(&self) -> &R {
        &self.right
    }

    /// Starts syncing; `left` first takes over the selection of `right`.
    /// Returns `false` if already bound.
    pub fn bind(&mut self) -> bool {
        if self.is_bound() {
            return false;
        }

        let (left, right) = (self.left.clone(), self.right.clone());
        let (blocked, own) = (Rc::clone(&self.from_right), Rc::clone(&self.from_left));
        let left_changed: Rc<dyn Fn()> = Rc::new(move || {
            guarded(&blocked, &own, || right.replace(&left.selected()));
        });

        let (left, right) = (self.left.clone(), self.right.clone());
        let (blocked, own) = (Rc::clone(&self.from_left), Rc::clone(&self.from_right));
        let right_changed: Rc<dyn Fn()> = Rc::new(move || {
            guarded(&blocked, &own, || left.replace(&right.selected()));
        });

        right_changed();
        let left_id = self.left.add_listener(left_changed);
        let right_id = self.right.add_listener(right_changed);
        self.listeners = Some((left_id, right_id));
        log::debug!("Selection binder bound");
        true
    }

    /// Stops syncing. Returns `false` if not bound.
    pub fn unbind(&mut self) -> bool {
        let Some((left_id, right_id)) = self.listeners.take() else {
            return false;
        };
        self.left.remove_listener(left_id);
        self.right.remove_listener(right_id);
        log::debug!("Selection binder unbound");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_changes<T: Clone + PartialEq + 'static>(side: &impl SelectionSide<T>) -> Rc<Cell<usize>> {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        side.add_listener(Rc::new(move || counter.set(counter.get() + 1)));
        hits
    }

    #[test]
    fn guard_blocks_echo_and_resets() {
        let from_left = Rc::new(Cell::new(false));
        let from_right = Rc::new(Cell::new(false));
        let mut ran = 0;
        guarded(&from_right, &from_left, || {
            assert!(from_left.get());
            guarded(&from_left, &from_right, || panic!("echo must be blocked"));
            ran += 1;
        });
        assert_eq!(ran, 1);
        assert!(!from_left.get());
    }

    #[test]
    fn list_replace_notifies_per_item() {
        let list = ListSelection::new();
        list.select(1);
        let hits = count_changes(&list);
        list.replace(&[2, 3]);
        assert_eq!(hits.get(), 3);
        assert_eq!(list.selected_items(), vec![2, 3]);
    }

    #[test]
    fn bind_takes_over_right_selection_and_is_idempotent() {
        let list: ListSelection<u32> = ListSelection::new();
        let model = SelectionModel::new();
        model.set([4, 5]);

        let mut binder = SelectionBinder::new(list.clone(), model.clone());
        assert!(binder.bind());
        assert!(!binder.bind());
        assert_eq!(list.selected_items(), vec![4, 5]);

        assert!(binder.unbind());
        assert!(!binder.unbind());
        model.set([6]);
        assert_eq!(list.selected_items(), vec![4, 5]);
    }
}
