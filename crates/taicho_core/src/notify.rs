//! Typed in-process publish/subscribe.
//!
//! Every subscriber gets its own `mpsc` receiver. Publishing is synchronous:
//! when `publish` returns, each live receiver already holds the value.
//! Receivers that were dropped are pruned on the next publish.

use std::cell::RefCell;
use std::sync::mpsc::{self, Receiver, Sender};

/// Broadcast channel delivering clones of each published value.
#[derive(Debug)]
pub struct Publisher<T: Clone> {
    subscribers: RefCell<Vec<Sender<T>>>,
}

impl<T: Clone> Publisher<T> {
    pub fn new() -> Self {
        Self {
            subscribers: RefCell::new(Vec::new()),
        }
    }

    /// Returns a receiver for every value published from now on.
    pub fn subscribe(&self) -> Receiver<T> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.borrow_mut().push(tx);
        rx
    }

    /// Sends `value` to all live subscribers; returns how many received it.
    pub fn publish(&self, value: T) -> usize {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|tx| tx.send(value.clone()).is_ok());
        subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

impl<T: Clone> Default for Publisher<T> {
    fn default() -> Self {
        Self::new()
    }
}
