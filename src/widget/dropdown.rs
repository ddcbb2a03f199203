//! Dropdown state machine
//!
//! `Closed -> OpenCollapsed -> OpenExpanded`, back to `Closed` on toggle,
//! outside pointer-down or item selection. The outside-click listener is
//! attached on entry to an open state and detached on exit, and is never
//! attached while `Closed`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Number of notifications shown before "view all"
pub const COLLAPSED_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownState {
    Closed,
    OpenCollapsed,
    OpenExpanded,
}

impl DropdownState {
    pub fn is_open(self) -> bool {
        !matches!(self, Self::Closed)
    }
}

/// Host hook for the document-level pointer-down listener.
pub trait OutsideClickListener: Send + Sync {
    fn attach(&self);
    fn detach(&self);
}

/// Listener that only records whether it is attached.
///
/// Hosts poll `is_attached()` to decide whether to forward outside clicks.
#[derive(Debug, Clone, Default)]
pub struct ListenerFlag {
    attached: Arc<AtomicBool>,
}

impl ListenerFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }
}

impl OutsideClickListener for ListenerFlag {
    fn attach(&self) {
        self.attached.store(true, Ordering::SeqCst);
    }

    fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
    }
}

pub struct Dropdown {
    state: DropdownState,
    listener: Arc<dyn OutsideClickListener>,
    attached: bool,
    collapsed_limit: usize,
}

impl Dropdown {
    pub fn new(listener: Arc<dyn OutsideClickListener>, collapsed_limit: usize) -> Self {
        Self {
            state: DropdownState::Closed,
            listener,
            attached: false,
            collapsed_limit,
        }
    }

    pub fn state(&self) -> DropdownState {
        self.state
    }

    pub fn listener_attached(&self) -> bool {
        self.attached
    }

    /// Bell click.
    pub fn toggle(&mut self) -> DropdownState {
        let next = match self.state {
            DropdownState::Closed => DropdownState::OpenCollapsed,
            DropdownState::OpenCollapsed | DropdownState::OpenExpanded => DropdownState::Closed,
        };
        self.transition(next);
        self.state
    }

    pub fn can_view_all(&self, total: usize) -> bool {
        self.state == DropdownState::OpenCollapsed && total > self.collapsed_limit
    }

    /// "View all". Returns `false` when not applicable in the current state.
    pub fn view_all(&mut self, total: usize) -> bool {
        if !self.can_view_all(total) {
            return false;
        }
        self.transition(DropdownState::OpenExpanded);
        true
    }

    /// Pointer-down outside the widget. Returns `true` if it closed the dropdown.
    pub fn outside_interaction(&mut self) -> bool {
        if !self.attached {
            return false;
        }
        self.transition(DropdownState::Closed);
        true
    }

    pub fn force_close(&mut self) {
        self.transition(DropdownState::Closed);
    }

    /// The part of `items` the current state displays.
    pub fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        match self.state {
            DropdownState::Closed => &[],
            DropdownState::OpenCollapsed => &items[..items.len().min(self.collapsed_limit)],
            DropdownState::OpenExpanded => items,
        }
    }

    fn transition(&mut self, next: DropdownState) {
        let prev = self.state;
        if prev == next {
            return;
        }

        if prev.is_open() && !next.is_open() && self.attached {
            self.listener.detach();
            self.attached = false;
        }
        if !prev.is_open() && next.is_open() && !self.attached {
            self.listener.attach();
            self.attached = true;
        }

        self.state = next;
        tracing::trace!(from = ?prev, to = ?next, "Dropdown transition");
    }
}

impl Drop for Dropdown {
    fn drop(&mut self) {
        if self.attached {
            self.listener.detach();
        }
    }
}
