// File: src/observable.rs
// Latest-value cell with synchronous listeners

pub type SubscriptionId = usize;

type Listener<T> = Box<dyn FnMut(&T)>;

/// Holds the current value of one piece of engine state.
///
/// `publish` commits the new value first and then calls every listener in
/// subscription order, so a listener reading back through `get` sees the
/// same value it was handed.
pub struct Observable<T> {
    value: T,
    listeners: Vec<(SubscriptionId, Listener<T>)>,
    next_id: SubscriptionId,
}

impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Registers a listener for every value published from now on.
    pub fn subscribe(&mut self, listener: impl FnMut(&T) + 'static) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn publish(&mut self, value: T) {
        self.value = value;
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.value);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_publish_reaches_listeners_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut cell = Observable::new(0);

        let log = Rc::clone(&seen);
        cell.subscribe(move |v| log.borrow_mut().push(("first", *v)));
        let log = Rc::clone(&seen);
        cell.subscribe(move |v| log.borrow_mut().push(("second", *v)));

        cell.publish(1);
        cell.publish(2);
        assert_eq!(*cell.get(), 2);
        assert_eq!(
            *seen.borrow(),
            vec![("first", 1), ("second", 1), ("first", 2), ("second", 2)]
        );
    }

    #[test]
    fn test_subscribe_does_not_replay_and_unsubscribe_stops_delivery() {
        let count = Rc::new(RefCell::new(0));
        let mut cell = Observable::new("start".to_string());
        cell.publish("before".to_string());

        let c = Rc::clone(&count);
        let id = cell.subscribe(move |_| *c.borrow_mut() += 1);
        assert_eq!(*count.borrow(), 0);

        cell.publish("after".to_string());
        assert!(cell.unsubscribe(id));
        assert!(!cell.unsubscribe(id));
        cell.publish("ignored".to_string());

        assert_eq!(*count.borrow(), 1);
        assert_eq!(cell.subscriber_count(), 0);
    }
}
