//! Mountable notification bell
//!
//! Ties the store, dropdown, poller and navigation together. Handles are
//! cheap to clone; the widget tears itself down on `unmount`, when the gate
//! reports the user signed out, or when the last handle is dropped.

use chrono::{DateTime, TimeZone};
use parking_lot::Mutex;
use std::fmt::Display;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::dropdown::{Dropdown, DropdownState, OutsideClickListener};
use super::navigation::{self, Router};
use super::poller::{poll_once, Poller, Teardown};
use super::store::NotificationStore;
use super::time_format::format_relative;
use super::WidgetConfig;
use crate::auth::AuthGate;
use crate::domain::notifications::{Notification, NotificationId};
use crate::services::NotificationService;

/// External collaborators the widget consults.
#[derive(Clone)]
pub struct Collaborators {
    pub service: Arc<dyn NotificationService>,
    pub auth: Arc<dyn AuthGate>,
    pub router: Arc<dyn Router>,
    pub listener: Arc<dyn OutsideClickListener>,
}

/// What selecting a notification did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// The service confirmed the read and the store recorded it
    pub marked_read: bool,
    /// Route handed to the router, if any
    pub route: Option<String>,
}

/// Render model for one notification row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    pub id: NotificationId,
    pub glyph: &'static str,
    pub title: String,
    pub message: String,
    pub age: String,
    pub unread: bool,
}

/// Render model for the whole widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BellView {
    pub unread_count: usize,
    pub state: DropdownState,
    pub items: Vec<ItemView>,
    pub total: usize,
    pub show_view_all: bool,
}

#[derive(Clone)]
pub struct NotificationBell {
    inner: Arc<BellInner>,
}

struct BellInner {
    store: Arc<NotificationStore>,
    dropdown: Arc<Mutex<Dropdown>>,
    service: Arc<dyn NotificationService>,
    auth: Arc<dyn AuthGate>,
    router: Arc<dyn Router>,
    teardown: Teardown,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for BellInner {
    fn drop(&mut self) {
        self.teardown.run("dropped");
    }
}

impl NotificationBell {
    /// Mount the widget and start polling.
    ///
    /// Must be called inside a tokio runtime. If the gate reports the user
    /// signed out, the widget mounts inactive and never polls; mount again
    /// after sign-in.
    pub fn mount(collaborators: Collaborators, config: WidgetConfig) -> Self {
        let Collaborators {
            service,
            auth,
            router,
            listener,
        } = collaborators;

        let store = Arc::new(NotificationStore::new());
        let dropdown = Arc::new(Mutex::new(Dropdown::new(listener, config.collapsed_limit)));
        let teardown = Teardown::new(store.clone(), dropdown.clone());

        let poller = if auth.is_authenticated() {
            let handle = Poller {
                store: store.clone(),
                service: service.clone(),
                auth: auth.clone(),
                teardown: teardown.clone(),
                interval: config.poll_interval,
            }
            .spawn();
            info!(
                poll_interval_ms = config.poll_interval.as_millis() as u64,
                "Notification widget mounted"
            );
            Some(handle)
        } else {
            info!("Not authenticated; notification widget mounted inactive");
            teardown.run("not authenticated");
            None
        };

        Self {
            inner: Arc::new(BellInner {
                store,
                dropdown,
                service,
                auth,
                router,
                teardown,
                poller: Mutex::new(poller),
            }),
        }
    }

    /// Tear the widget down and wait for the poller to stop.
    pub async fn unmount(self) {
        self.inner.teardown.run("unmounted");
        let handle = self.inner.poller.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Notification poller ended abnormally");
            }
        }
    }

    /// Mounted, not torn down, and the user is signed in.
    ///
    /// Seeing the gate report signed out tears the widget down on the spot
    /// instead of waiting for the next poll tick.
    pub fn is_active(&self) -> bool {
        if self.inner.teardown.is_done() {
            return false;
        }
        if !self.inner.auth.is_authenticated() {
            self.inner.teardown.run("signed out");
            return false;
        }
        true
    }

    pub fn store(&self) -> &NotificationStore {
        &self.inner.store
    }

    pub fn unread_count(&self) -> usize {
        self.inner.store.unread_count()
    }

    pub fn state(&self) -> DropdownState {
        self.inner.dropdown.lock().state()
    }

    pub fn listener_attached(&self) -> bool {
        self.inner.dropdown.lock().listener_attached()
    }

    /// Bell click.
    pub fn toggle(&self) -> DropdownState {
        if !self.is_active() {
            return DropdownState::Closed;
        }
        self.inner.dropdown.lock().toggle()
    }

    /// "View all" link.
    pub fn view_all(&self) -> bool {
        if !self.is_active() {
            return false;
        }
        let total = self.inner.store.len();
        self.inner.dropdown.lock().view_all(total)
    }

    /// Pointer-down outside the widget's region.
    pub fn pointer_down_outside(&self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.inner.dropdown.lock().outside_interaction()
    }

    /// Select a notification: confirm the read with the service, navigate to
    /// its related entity, then close the dropdown.
    ///
    /// The store only changes after the service acknowledges the read.
    pub async fn select(&self, id: &NotificationId) -> Selection {
        let mut selection = Selection::default();

        let Some(notification) = self.inner.store.get(id) else {
            debug!(notification_id = %id, "Selected notification is no longer in the feed");
            self.inner.dropdown.lock().force_close();
            return selection;
        };

        if notification.is_unread() {
            match self.inner.service.mark_read(id).await {
                Ok(ack) if ack.success => {
                    selection.marked_read = self.inner.store.mark_read(id);
                }
                Ok(_) => {
                    warn!(notification_id = %id, "Service declined to mark notification read");
                }
                Err(e) => {
                    warn!(
                        notification_id = %id,
                        error = %e,
                        error_code = e.error_code(),
                        "Failed to mark notification read"
                    );
                }
            }
        }

        if self.inner.teardown.is_done() {
            debug!(notification_id = %id, "Widget torn down during selection");
            return selection;
        }

        selection.route =
            navigation::dispatch(self.inner.router.as_ref(), notification.related.as_ref());
        self.inner.dropdown.lock().force_close();
        selection
    }

    /// Run one polling cycle now.
    pub async fn refresh(&self) -> bool {
        if !self.is_active() {
            return false;
        }
        poll_once(&self.inner.store, self.inner.service.as_ref()).await
    }

    /// Mark everything read on the service, then re-reconcile.
    ///
    /// Not bound to any dropdown transition.
    pub async fn mark_all_read(&self) -> bool {
        if !self.is_active() {
            return false;
        }
        match self.inner.service.mark_all_read().await {
            Ok(ack) => {
                info!(marked_count = ack.marked_count, "Marked all notifications read");
                self.refresh().await;
                true
            }
            Err(e) => {
                warn!(error = %e, error_code = e.error_code(), "Failed to mark all notifications read");
                false
            }
        }
    }

    /// Delete a notification on the service, then re-reconcile.
    pub async fn delete(&self, id: &NotificationId) -> bool {
        if !self.is_active() {
            return false;
        }
        match self.inner.service.delete(id).await {
            Ok(_) => {
                info!(notification_id = %id, "Deleted notification");
                self.refresh().await;
                true
            }
            Err(e) => {
                warn!(notification_id = %id, error = %e, error_code = e.error_code(), "Failed to delete notification");
                false
            }
        }
    }

    /// Render model at `now`, or `None` when the widget should not be shown.
    pub fn view<Tz>(&self, now: &DateTime<Tz>) -> Option<BellView>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        if !self.is_active() {
            return None;
        }

        let (items, unread_count) = self.inner.store.read();
        let dropdown = self.inner.dropdown.lock();

        Some(BellView {
            unread_count,
            state: dropdown.state(),
            items: dropdown
                .visible(&items)
                .iter()
                .map(|n| item_view(n, now))
                .collect(),
            total: items.len(),
            show_view_all: dropdown.can_view_all(items.len()),
        })
    }
}

fn item_view<Tz>(notification: &Notification, now: &DateTime<Tz>) -> ItemView
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    ItemView {
        id: notification.id.clone(),
        glyph: notification.kind.glyph(),
        title: notification.title.clone(),
        message: notification.message.clone(),
        age: format_relative(now, notification.created_at),
        unread: notification.is_unread(),
    }
}
