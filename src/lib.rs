//! Client-side notification bell.
//!
//! Keeps a notification feed in step with the notification service by
//! polling, tracks read state, and routes the user to related content when a
//! notification is selected.

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod services;
pub mod widget;

pub use error::{ClientError, ClientResult};
pub use widget::{Collaborators, NotificationBell, WidgetConfig};
