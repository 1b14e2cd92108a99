use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::event::{EditorEvent, EventKind};
use crate::observable::ListenerId;

/// Token identifying one subscription on an [`EventBus`].
pub type SubscriptionId = ListenerId;

type Handler = Rc<dyn Fn(&EditorEvent)>;

/// Synchronous publish/subscribe channel between the editing engine and the
/// view layer. Shared as `Rc<EventBus>`; every method takes `&self`.
///
/// Handlers run on the publisher's call stack, in subscription order, over a
/// snapshot of the subscriber list taken when `publish` starts. A handler may
/// therefore subscribe, unsubscribe or publish again without disturbing the
/// delivery in progress. A panicking handler propagates to the publisher.
#[derive(Default)]
pub struct EventBus {
    handlers: RefCell<HashMap<EventKind, Vec<(SubscriptionId, Handler)>>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count: usize = self.handlers.borrow().values().map(Vec::len).sum();
        f.debug_struct("EventBus")
            .field("handlers", &format!("<{count} handlers>"))
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for events of `kind`.
    pub fn subscribe(
        &self,
        kind: EventKind,
        handler: impl Fn(&EditorEvent) + 'static,
    ) -> SubscriptionId {
        let id = ListenerId::next();
        self.handlers
            .borrow_mut()
            .entry(kind)
            .or_default()
            .push((id, Rc::new(handler)));
        log::trace!("subscribed {id:?} to {kind:?}");
        id
    }

    /// Removes a subscription. Unknown ids are ignored and report `false`.
    pub fn unsubscribe(&self, kind: EventKind, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let Some(list) = handlers.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(entry, _)| *entry != id);
        list.len() != before
    }

    /// Delivers `event` to every handler subscribed to its kind.
    pub fn publish(&self, event: &EditorEvent) {
        let kind = event.kind();
        let snapshot: Vec<Handler> = match self.handlers.borrow().get(&kind) {
            Some(list) => list.iter().map(|(_, h)| Rc::clone(h)).collect(),
            None => return,
        };
        log::trace!("publishing {kind:?} to {} handlers", snapshot.len());
        for handler in snapshot {
            handler(event);
        }
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.handlers.borrow().get(&kind).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ShapeId;
    use std::cell::Cell;

    fn band_event() -> EditorEvent {
        EditorEvent::SelectionBand { bounds: None }
    }

    #[test]
    fn delivers_only_to_matching_kind_in_order() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&log);
        bus.subscribe(EventKind::SelectionBand, move |_| first.borrow_mut().push(1));
        let second = Rc::clone(&log);
        bus.subscribe(EventKind::SelectionBand, move |_| second.borrow_mut().push(2));
        let other = Rc::clone(&log);
        bus.subscribe(EventKind::ShapeHover, move |_| other.borrow_mut().push(99));

        bus.publish(&band_event());
        assert_eq!(*log.borrow(), vec![1, 2]);
    }

    #[test]
    fn unsubscribe_is_token_based() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let id = bus.subscribe(EventKind::SelectionBand, move |_| counter.set(counter.get() + 1));

        assert!(!bus.unsubscribe(EventKind::ShapeHover, id));
        assert!(bus.unsubscribe(EventKind::SelectionBand, id));
        assert!(!bus.unsubscribe(EventKind::SelectionBand, id));

        bus.publish(&band_event());
        assert_eq!(hits.get(), 0);
        assert_eq!(bus.subscriber_count(EventKind::SelectionBand), 0);
    }

    #[test]
    fn handler_unsubscribing_itself_does_not_skip_others() {
        let bus = Rc::new(EventBus::new());
        let own_id = Rc::new(Cell::new(None));
        let hits = Rc::new(Cell::new(0));

        let inner_bus = Rc::clone(&bus);
        let slot = Rc::clone(&own_id);
        let id = bus.subscribe(EventKind::SelectionBand, move |_| {
            if let Some(id) = slot.get() {
                inner_bus.unsubscribe(EventKind::SelectionBand, id);
            }
        });
        own_id.set(Some(id));
        let counter = Rc::clone(&hits);
        bus.subscribe(EventKind::SelectionBand, move |_| counter.set(counter.get() + 1));

        bus.publish(&band_event());
        assert_eq!(hits.get(), 1);
        assert_eq!(bus.subscriber_count(EventKind::SelectionBand), 1);

        bus.publish(&band_event());
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn subscribing_during_publish_affects_next_publish_only() {
        let bus = Rc::new(EventBus::new());
        let late_hits = Rc::new(Cell::new(0));

        let inner_bus = Rc::clone(&bus);
        let counter = Rc::clone(&late_hits);
        bus.subscribe(EventKind::SelectionBand, move |_| {
            let counter = Rc::clone(&counter);
            inner_bus.subscribe(EventKind::SelectionBand, move |_| counter.set(counter.get() + 1));
        });

        bus.publish(&band_event());
        assert_eq!(late_hits.get(), 0);
        bus.publish(&band_event());
        assert_eq!(late_hits.get(), 1);
    }

    #[test]
    fn handler_can_publish_reentrantly() {
        let bus = Rc::new(EventBus::new());
        let hovered = Rc::new(Cell::new(false));

        let inner_bus = Rc::clone(&bus);
        bus.subscribe(EventKind::SelectionBand, move |_| {
            inner_bus.publish(&EditorEvent::ShapeHover {
                shape: ShapeId::new(),
                on: true,
            });
        });
        let flag = Rc::clone(&hovered);
        bus.subscribe(EventKind::ShapeHover, move |_| flag.set(true));

        bus.publish(&band_event());
        assert!(hovered.get());
    }
}
