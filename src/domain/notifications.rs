//! Notification domain types
//!
//! `NotificationPayload` is what the service sends, with every field optional
//! and loosely typed. `Notification` is the normalized record the store keeps;
//! all fallback chains live in `Notification::from_payload` and nowhere else.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

/// Opaque notification identifier, used as the reconciliation key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NotificationId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NotificationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for NotificationId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

/// Read status of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationStatus {
    Unread,
    Read,
}

impl NotificationStatus {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UNREAD" => Some(Self::Unread),
            "READ" => Some(Self::Read),
            _ => None,
        }
    }
}

/// Notification category. Only used to pick a display glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationType {
    BookingConfirmed,
    BookingCancelled,
    ChargingStarted,
    ChargingCompleted,
    PaymentSuccess,
    PaymentFailed,
    Other(String),
}

impl NotificationType {
    pub fn parse(s: &str) -> Self {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "BOOKING_CONFIRMED" => Self::BookingConfirmed,
            "BOOKING_CANCELLED" | "BOOKING_CANCELED" => Self::BookingCancelled,
            "CHARGING_STARTED" => Self::ChargingStarted,
            "CHARGING_COMPLETED" => Self::ChargingCompleted,
            "PAYMENT_SUCCESS" => Self::PaymentSuccess,
            "PAYMENT_FAILED" => Self::PaymentFailed,
            _ => Self::Other(s.to_string()),
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Self::BookingConfirmed => "✅",
            Self::BookingCancelled => "❌",
            Self::ChargingStarted => "⚡",
            Self::ChargingCompleted => "🔋",
            Self::PaymentSuccess => "💳",
            Self::PaymentFailed => "⚠️",
            Self::Other(_) => "🔔",
        }
    }
}

/// Kind of domain object a notification points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelatedEntityType {
    Booking,
    Transaction,
    Session,
}

impl RelatedEntityType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BOOKING" => Some(Self::Booking),
            "TRANSACTION" => Some(Self::Transaction),
            "SESSION" | "CHARGING_SESSION" => Some(Self::Session),
            _ => None,
        }
    }
}

/// Reference from a notification to the object it concerns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedEntity {
    pub kind: RelatedEntityType,
    pub id: String,
}

/// Notification as received from the service
///
/// Services disagree on field spelling, and some send both camelCase and
/// snake_case. Each spelling gets its own field so a record carrying both
/// still deserializes; `Notification::from_payload` prefers camelCase.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub notification_type: Option<String>,
    #[serde(default, rename = "notification_type", deserialize_with = "lenient_string")]
    pub notification_type_snake: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_read: Option<bool>,
    #[serde(default, rename = "is_read", deserialize_with = "lenient_bool")]
    pub is_read_snake: Option<bool>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub related_entity_type: Option<String>,
    #[serde(default, rename = "related_entity_type", deserialize_with = "lenient_string")]
    pub related_entity_type_snake: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub related_entity_id: Option<String>,
    #[serde(default, rename = "related_entity_id", deserialize_with = "lenient_string")]
    pub related_entity_id_snake: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "created_at", deserialize_with = "lenient_timestamp")]
    pub created_at_snake: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Normalized notification record held by the store
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub message: String,
    pub kind: NotificationType,
    pub status: NotificationStatus,
    pub related: Option<RelatedEntity>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Normalize a payload. Returns `None` only when there is no id to key it by.
    pub fn from_payload(payload: NotificationPayload) -> Option<Self> {
        let id = payload.id.filter(|id| !id.is_empty())?;

        let status = match payload.status.as_deref().and_then(NotificationStatus::parse) {
            Some(status) => status,
            None => match payload.is_read.or(payload.is_read_snake) {
                Some(false) => NotificationStatus::Unread,
                _ => NotificationStatus::Read,
            },
        };

        let related = match (
            payload.related_entity_type.or(payload.related_entity_type_snake),
            payload.related_entity_id.or(payload.related_entity_id_snake),
        ) {
            (Some(kind), Some(id)) if !id.is_empty() => {
                RelatedEntityType::parse(&kind).map(|kind| RelatedEntity { kind, id })
            }
            _ => None,
        };

        Some(Self {
            id: NotificationId(id),
            title: payload.title.unwrap_or_default(),
            message: payload
                .message
                .or(payload.description)
                .unwrap_or_default(),
            kind: payload
                .kind
                .or(payload.notification_type)
                .or(payload.notification_type_snake)
                .as_deref()
                .map(NotificationType::parse)
                .unwrap_or_else(|| NotificationType::Other(String::new())),
            status,
            related,
            created_at: payload
                .created_at
                .or(payload.created_at_snake)
                .or(payload.timestamp),
        })
    }

    pub fn is_unread(&self) -> bool {
        self.status == NotificationStatus::Unread
    }

    /// Ordering key; a missing timestamp orders as the epoch.
    pub fn sort_key(&self) -> DateTime<Utc> {
        self.created_at.unwrap_or_default()
    }
}

/// Acknowledgement for write operations
#[derive(Debug, Clone, Deserialize)]
pub struct Ack {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub marked_count: Option<u64>,
    #[serde(default)]
    pub deleted_count: Option<u64>,
}

impl Default for Ack {
    fn default() -> Self {
        Self {
            success: true,
            marked_count: None,
            deleted_count: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Bool(b) => Some(b),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => parse_timestamp(&s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    }))
}

/// RFC 3339, or a zone-less ISO date-time read as UTC.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
