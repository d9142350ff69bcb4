//! Event bus between the chat client and the UI.
//!
//! Single-threaded (WASM constraint), interior mutability via RefCell.
//! Events queue up until the UI drains them on its next frame. The queue is
//! bounded: a background tab stops repainting, so the oldest events are
//! dropped instead of growing without limit.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use chat_types::event::ChatEvent;

const DEFAULT_CAPACITY: usize = 256;

/// Shared event bus, clone-cheap via Rc.
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<RefCell<VecDeque<ChatEvent>>>,
    capacity: usize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Rc::new(RefCell::new(VecDeque::new())),
            capacity: capacity.max(1),
        }
    }

    /// Publish an event. Called by the chat client.
    pub fn emit(&self, event: ChatEvent) {
        let mut queue = self.inner.borrow_mut();
        if queue.len() == self.capacity {
            if let Some(dropped) = queue.pop_front() {
                log::debug!("Event queue full, dropping {:?}", dropped);
            }
        }
        queue.push_back(event);
    }

    /// Take every pending event, oldest first. Called by the UI each frame.
    pub fn drain(&self) -> Vec<ChatEvent> {
        self.inner.borrow_mut().drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.inner.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
