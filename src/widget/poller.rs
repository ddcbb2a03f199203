//! Polling scheduler
//!
//! One task per mounted widget: fetch immediately, then every interval, until
//! the shutdown token fires or the gate reports the user signed out. A failed
//! cycle is logged and the next one runs on schedule.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::dropdown::Dropdown;
use super::store::NotificationStore;
use crate::auth::AuthGate;
use crate::services::NotificationService;

/// Everything that has to happen, exactly once, when the widget goes away.
#[derive(Clone)]
pub(crate) struct Teardown {
    token: CancellationToken,
    store: Arc<NotificationStore>,
    dropdown: Arc<Mutex<Dropdown>>,
    done: Arc<AtomicBool>,
}

impl Teardown {
    pub(crate) fn new(store: Arc<NotificationStore>, dropdown: Arc<Mutex<Dropdown>>) -> Self {
        Self {
            token: CancellationToken::new(),
            store,
            dropdown,
            done: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub(crate) fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }

    /// Cancel polling, close the dropdown (detaching its listener) and
    /// discard the store. Returns `false` if it already ran.
    pub(crate) fn run(&self, reason: &'static str) -> bool {
        if self.done.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.token.cancel();
        self.dropdown.lock().force_close();
        self.store.close();
        info!(reason = reason, "Notification widget torn down");
        true
    }
}

/// Run one fetch-and-reconcile cycle. Returns `true` if the store changed.
pub(crate) async fn poll_once(store: &NotificationStore, service: &dyn NotificationService) -> bool {
    let ticket = store.begin_poll();
    match service.list().await {
        Ok(fetched) => store.reconcile_polled(ticket, fetched),
        Err(e) => {
            warn!(error = %e, error_code = e.error_code(), "Notification poll failed");
            false
        }
    }
}

pub(crate) struct Poller {
    pub store: Arc<NotificationStore>,
    pub service: Arc<dyn NotificationService>,
    pub auth: Arc<dyn AuthGate>,
    pub teardown: Teardown,
    pub interval: Duration,
}

impl Poller {
    pub(crate) fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let token = self.teardown.token().clone();
        let mut ticker = tokio::time::interval(self.interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cycle: u64 = 0;

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            if !self.auth.is_authenticated() {
                info!("Session no longer authenticated; stopping notification polling");
                self.teardown.run("signed out");
                break;
            }

            cycle += 1;
            debug!(cycle = cycle, "Polling notifications");

            // Dropping an in-flight list call on shutdown leaves the store untouched
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = poll_once(&self.store, self.service.as_ref()) => {}
            }
        }

        debug!(cycles = cycle, "Notification poller stopped");
    }
}
