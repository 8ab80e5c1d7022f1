//! Frame scheduling between the engine and its host.
//!
//! The engine never loops on its own. It asks a [`FrameScheduler`] for one
//! frame at a time and the host calls back into
//! [`Engine::on_frame`](crate::Engine::on_frame) with the handle it was
//! given once the next display refresh comes around.

use std::cell::RefCell;
use std::rc::Rc;

/// Identifies one outstanding frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Host-side "call me after the next refresh" service.
pub trait FrameScheduler {
    /// Request a callback after the next display refresh.
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraw a request. Cancelling a handle that already fired, or was
    /// already cancelled, does nothing.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

impl<S: FrameScheduler + ?Sized> FrameScheduler for &mut S {
    fn request_frame(&mut self) -> FrameHandle {
        (**self).request_frame()
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        (**self).cancel_frame(handle);
    }
}

#[derive(Debug, Default)]
struct QueueState {
    next_id: u64,
    pending: Vec<FrameHandle>,
}

/// Single-threaded frame request queue.
///
/// Clones share the same queue: the engine keeps one to make requests and
/// the host keeps another to drain them once per refresh.
#[derive(Debug, Clone, Default)]
pub struct FrameQueue {
    state: Rc<RefCell<QueueState>>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every request made so far, oldest first.
    ///
    /// Requests made while the returned frames are being delivered are left
    /// for the next refresh.
    pub fn take_due(&self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.state.borrow_mut().pending)
    }

    /// Number of requests waiting for the next refresh.
    pub fn pending(&self) -> usize {
        self.state.borrow().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameHandle {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let handle = FrameHandle(state.next_id);
        state.pending.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.state.borrow_mut().pending.retain(|&h| h != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_unique() {
        let mut queue = FrameQueue::new();
        let a = queue.request_frame();
        let b = queue.request_frame();
        assert_ne!(a, b);
        assert_eq!(queue.pending(), 2);
    }

    #[test]
    fn test_clones_share_requests() {
        let host = FrameQueue::new();
        let mut engine_side = host.clone();
        let handle = engine_side.request_frame();
        assert_eq!(host.take_due(), vec![handle]);
        assert!(host.is_empty());
        assert!(engine_side.is_empty());
    }

    #[test]
    fn test_cancel_removes_request() {
        let mut queue = FrameQueue::new();
        let a = queue.request_frame();
        let b = queue.request_frame();
        queue.cancel_frame(a);
        queue.cancel_frame(a);
        assert_eq!(queue.take_due(), vec![b]);
    }

    #[test]
    fn test_requests_during_delivery_wait() {
        let mut queue = FrameQueue::new();
        let first = queue.request_frame();
        let due = queue.take_due();
        let second = queue.request_frame();
        assert_eq!(due, vec![first]);
        assert_eq!(queue.take_due(), vec![second]);
    }
}
