//! # Workspace
//!
//! The host-side container a block lives in: constructs blocks by type id,
//! tracks whether a drag is in progress, and owns the change-notification
//! stream. Listeners are dispatched from a snapshot so a listener may
//! deregister itself mid-dispatch, which is exactly what the one-shot
//! deferred-init listener does.

use crate::block::Block;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// Identifies a registered change listener for later removal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(usize);

struct WorkspaceState {
    dragging: bool,
    listeners: Vec<(ListenerId, Rc<dyn Fn()>)>,
    next_listener: usize,
    created_blocks: usize,
}

/// Handle to a workspace
#[derive(Clone)]
pub struct Workspace {
    inner: Rc<RefCell<WorkspaceState>>,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(WorkspaceState {
                dragging: false,
                listeners: Vec::new(),
                next_listener: 0,
                created_blocks: 0,
            })),
        }
    }

    /// Construct a new block instance by type id
    pub fn new_block(&self, type_id: &str) -> Block {
        self.inner.borrow_mut().created_blocks += 1;
        Block::new(self.clone(), type_id)
    }

    /// Total number of blocks this workspace has ever constructed
    pub fn created_block_count(&self) -> usize {
        self.inner.borrow().created_blocks
    }

    /// Whether the workspace is currently in a drag operation
    pub fn is_dragging(&self) -> bool {
        self.inner.borrow().dragging
    }

    pub fn set_dragging(&self, dragging: bool) {
        self.inner.borrow_mut().dragging = dragging;
    }

    /// Subscribe to the change-notification stream
    pub fn add_change_listener(&self, listener: impl Fn() + 'static) -> ListenerId {
        let mut state = self.inner.borrow_mut();
        let id = ListenerId(state.next_listener);
        state.next_listener += 1;
        state.listeners.push((id, Rc::new(listener)));
        id
    }

    /// Unsubscribe. Unknown ids are ignored (the listener may already have
    /// removed itself).
    pub fn remove_change_listener(&self, id: ListenerId) {
        self.inner
            .borrow_mut()
            .listeners
            .retain(|(listener_id, _)| *listener_id != id);
    }

    /// Number of currently registered listeners
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Fire a workspace-changed notification to every listener.
    ///
    /// Dispatches from a snapshot: listeners added or removed during
    /// dispatch take effect on the next notification.
    pub fn notify_change(&self) {
        let snapshot: Vec<Rc<dyn Fn()>> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        debug!(listeners = snapshot.len(), "workspace change notification");
        for listener in snapshot {
            listener();
        }
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}
