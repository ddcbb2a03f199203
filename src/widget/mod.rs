//! The notification bell widget and its parts.

pub mod bell;
pub mod dropdown;
pub mod navigation;
mod poller;
pub mod store;
pub mod time_format;

use std::time::Duration;

use crate::config::Settings;

pub use bell::{BellView, Collaborators, ItemView, NotificationBell, Selection};
pub use dropdown::{DropdownState, ListenerFlag, OutsideClickListener, COLLAPSED_LIMIT};
pub use navigation::{LoggingRouter, Route, Router};
pub use store::NotificationStore;
pub use time_format::format_relative;

/// Default refresh period for the polling scheduler
pub const POLL_INTERVAL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone)]
pub struct WidgetConfig {
    pub poll_interval: Duration,
    pub collapsed_limit: usize,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            collapsed_limit: COLLAPSED_LIMIT,
        }
    }
}

impl From<&Settings> for WidgetConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            poll_interval: settings.poll_interval,
            ..Self::default()
        }
    }
}
