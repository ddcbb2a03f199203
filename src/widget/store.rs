//! Notification store
//!
//! Single owner of the notification collection and its cached unread count.
//! All mutations take the lock once and finish before releasing it, so a
//! reader never sees a collection and an unread count that disagree.

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

use crate::domain::notifications::{Notification, NotificationId, NotificationPayload, NotificationStatus};

/// Ticket handed out when a poll is issued; see `NotificationStore::begin_poll`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PollTicket(u64);

#[derive(Default)]
pub struct NotificationStore {
    inner: Mutex<StoreState>,
}

#[derive(Default)]
struct StoreState {
    items: Vec<Notification>,
    unread: usize,
    closed: bool,
    next_ticket: u64,
    /// Highest ticket whose result has been applied
    applied_ticket: Option<u64>,
    /// Confirmed reads, keyed to the last ticket issued before confirmation
    confirmed_reads: HashMap<NotificationId, u64>,
}

impl StoreState {
    /// `ticket` is the poll the data came from; its result cannot know about
    /// reads confirmed after it was issued.
    fn replace(&mut self, fetched: Vec<NotificationPayload>, ticket: Option<u64>) {
        let mut seen = HashSet::with_capacity(fetched.len());
        let mut items: Vec<Notification> = Vec::with_capacity(fetched.len());

        for payload in fetched {
            let Some(mut notification) = Notification::from_payload(payload) else {
                tracing::warn!("Skipping notification without an id");
                continue;
            };
            if !seen.insert(notification.id.clone()) {
                tracing::debug!(notification_id = %notification.id, "Dropping duplicate notification");
                continue;
            }
            if let Some(ticket) = ticket {
                let confirmed_after = self
                    .confirmed_reads
                    .get(&notification.id)
                    .is_some_and(|&issued| issued >= ticket);
                if confirmed_after && notification.is_unread() {
                    notification.status = NotificationStatus::Read;
                }
            }
            items.push(notification);
        }

        match ticket {
            Some(ticket) => self.confirmed_reads.retain(|_, issued| *issued >= ticket),
            None => self.confirmed_reads.clear(),
        }

        // Stable sort: equal timestamps keep the service's order
        items.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));

        self.unread = items.iter().filter(|n| n.is_unread()).count();
        self.items = items;
    }
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the collection wholesale with `fetched`.
    ///
    /// Returns `false` if the store has been closed.
    pub fn reconcile(&self, fetched: Vec<NotificationPayload>) -> bool {
        let mut state = self.inner.lock();
        if state.closed {
            return false;
        }
        state.replace(fetched, None);
        tracing::debug!(
            total = state.items.len(),
            unread_count = state.unread,
            "Notifications reconciled"
        );
        true
    }

    /// Issue a ticket for a poll about to be sent.
    pub fn begin_poll(&self) -> PollTicket {
        let mut state = self.inner.lock();
        state.next_ticket += 1;
        PollTicket(state.next_ticket)
    }

    /// Reconcile the result of the poll identified by `ticket`.
    ///
    /// A result is discarded if a later-issued poll has already been applied,
    /// so an older, slower response cannot overwrite a fresher view. Reads
    /// confirmed after the poll was issued stay read.
    pub fn reconcile_polled(&self, ticket: PollTicket, fetched: Vec<NotificationPayload>) -> bool {
        let mut state = self.inner.lock();
        if state.closed {
            return false;
        }
        if state.applied_ticket.is_some_and(|applied| applied > ticket.0) {
            tracing::debug!(
                ticket = ticket.0,
                applied = state.applied_ticket,
                "Discarding stale poll result"
            );
            return false;
        }
        state.replace(fetched, Some(ticket.0));
        state.applied_ticket = Some(ticket.0);
        tracing::debug!(
            ticket = ticket.0,
            total = state.items.len(),
            unread_count = state.unread,
            "Notifications reconciled"
        );
        true
    }

    /// Mark `id` read after the service confirmed it.
    ///
    /// Returns `true` only if an unread notification changed state.
    pub fn mark_read(&self, id: &NotificationId) -> bool {
        let mut state = self.inner.lock();
        if state.closed {
            return false;
        }
        let Some(notification) = state
            .items
            .iter_mut()
            .find(|n| &n.id == id && n.is_unread())
        else {
            return false;
        };
        notification.status = NotificationStatus::Read;
        state.unread = state.unread.saturating_sub(1);
        let issued = state.next_ticket;
        state.confirmed_reads.insert(id.clone(), issued);
        true
    }

    /// Discard the collection. Every later mutation is ignored.
    pub fn close(&self) {
        let mut state = self.inner.lock();
        state.closed = true;
        state.items.clear();
        state.unread = 0;
        state.confirmed_reads.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Ordered collection, newest first.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.inner.lock().items.clone()
    }

    pub fn unread_count(&self) -> usize {
        self.inner.lock().unread
    }

    /// Collection and unread count taken under one lock, so they always agree.
    pub fn read(&self) -> (Vec<Notification>, usize) {
        let state = self.inner.lock();
        (state.items.clone(), state.unread)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &NotificationId) -> Option<Notification> {
        self.inner.lock().items.iter().find(|n| &n.id == id).cloned()
    }
}
