//! Input events and the keyboard/mouse subscriber lists.

use crate::math::Vector2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Platform key code
    pub key: u32,
    pub state: ButtonState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    /// Platform button code
    pub button: u32,
    pub state: ButtonState,
    pub position: Vector2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Stops the engine loop
    Quit,
}

/// Handle returned on subscription, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

type Callback<E> = Box<dyn FnMut(&E)>;

/// Callbacks invoked synchronously in registration order
pub struct Subscribers<E> {
    next_id: u64,
    callbacks: Vec<(CallbackId, Callback<E>)>,
}

impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            callbacks: Vec::new(),
        }
    }
}

impl<E> Subscribers<E> {
    pub fn add(&mut self, callback: impl FnMut(&E) + 'static) -> CallbackId {
        let id = CallbackId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Returns false if the callback was not registered
    pub fn remove(&mut self, id: CallbackId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(current, _)| *current != id);
        self.callbacks.len() != before
    }

    pub fn dispatch(&mut self, event: &E) {
        for (_, callback) in self.callbacks.iter_mut() {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn key(key: u32) -> KeyEvent {
        KeyEvent { key, state: ButtonState::Pressed }
    }

    #[test]
    fn dispatch_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut subscribers = Subscribers::default();

        for name in ["first", "second", "third"] {
            let log = log.clone();
            subscribers.add(move |event: &KeyEvent| log.borrow_mut().push((name, event.key)));
        }
        subscribers.dispatch(&key(7));

        assert_eq!(*log.borrow(), [("first", 7), ("second", 7), ("third", 7)]);
    }

    #[test]
    fn removal_is_by_identity() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let mut subscribers = Subscribers::default();

        let ids: Vec<_> = (0..3)
            .map(|n| {
                let hits = hits.clone();
                subscribers.add(move |_: &KeyEvent| hits.borrow_mut().push(n))
            })
            .collect();

        assert!(subscribers.remove(ids[1]));
        assert!(!subscribers.remove(ids[1]));
        subscribers.dispatch(&key(1));

        assert_eq!(*hits.borrow(), [0, 2]);
        assert_eq!(subscribers.len(), 2);
    }
}
