//! Event Channel
//!
//! Synchronous publish/subscribe fan-out. A publisher owns an
//! [`EventChannel<T>`]; listeners register closures and get a [`ListenerId`]
//! back for later removal.
//!
//! Delivery is in-line: [`EventChannel::publish`] calls every listener, in
//! subscription order, before it returns. Listeners only see a shared borrow of
//! the event and keep whatever they need in their own captured state.
//!
//! # Example
//!
//! ```ignore
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use bottle_range_engine::core::EventChannel;
//!
//! let hits = Rc::new(Cell::new(0));
//! let mut channel = EventChannel::<u32>::new();
//!
//! let counter = Rc::clone(&hits);
//! channel.subscribe(move |_| counter.set(counter.get() + 1));
//!
//! channel.publish(&7);
//! assert_eq!(hits.get(), 1);
//! ```

use std::fmt;

use tracing::debug;

/// Identifies one subscription on one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Raw id value, unique per channel.
    pub fn raw(self) -> u64 {
        self.0
    }
}

type Listener<T> = Box<dyn FnMut(&T)>;

/// Ordered list of listeners for events of type `T`.
pub struct EventChannel<T> {
    listeners: Vec<(ListenerId, Listener<T>)>,
    next_id: u64,
}

impl<T> Default for EventChannel<T> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T> fmt::Debug for EventChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("listeners", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl<T> EventChannel<T> {
    /// Creates a channel with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` at the end of the delivery order.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&T) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        debug!(listener = id.0, total = self.listeners.len(), "listener subscribed");
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        let removed = self.listeners.len() != before;
        if removed {
            debug!(listener = id.0, "listener unsubscribed");
        }
        removed
    }

    /// Delivers `event` to every listener and returns how many were called.
    pub fn publish(&mut self, event: &T) -> usize {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
        self.listeners.len()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// True when nobody is listening.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Drops every listener.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_publish_reaches_listeners_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut channel = EventChannel::<i32>::new();

        let first = Rc::clone(&log);
        channel.subscribe(move |e| first.borrow_mut().push(("first", *e)));
        let second = Rc::clone(&log);
        channel.subscribe(move |e| second.borrow_mut().push(("second", *e)));

        assert_eq!(channel.publish(&3), 2);
        assert_eq!(*log.borrow(), vec![("first", 3), ("second", 3)]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let count = Rc::new(RefCell::new(0));
        let mut channel = EventChannel::<()>::new();

        let counter = Rc::clone(&count);
        let id = channel.subscribe(move |_| *counter.borrow_mut() += 1);

        channel.publish(&());
        assert!(channel.unsubscribe(id));
        assert!(!channel.unsubscribe(id));
        channel.publish(&());

        assert_eq!(*count.borrow(), 1);
        assert!(channel.is_empty());
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut channel = EventChannel::<()>::new();
        let a = channel.subscribe(|_| {});
        channel.unsubscribe(a);
        let b = channel.subscribe(|_| {});
        assert_ne!(a, b);
        assert!(b.raw() > a.raw());
    }

    #[test]
    fn test_publish_without_listeners() {
        let mut channel = EventChannel::<u8>::new();
        assert_eq!(channel.publish(&1), 0);
        assert_eq!(channel.listener_count(), 0);
    }
}
