//! Service layer modules for external integrations.
//!
//! Contains the notification service contract and its HTTP client.

pub mod notification_client;

pub use notification_client::{HttpNotificationClient, NotificationService};
