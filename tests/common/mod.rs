#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;

use notification_bell::auth::StaticGate;
use notification_bell::domain::notifications::{Ack, NotificationId, NotificationPayload};
use notification_bell::services::NotificationService;
use notification_bell::widget::{
    Collaborators, ListenerFlag, NotificationBell, Router, WidgetConfig,
};
use notification_bell::{ClientError, ClientResult};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
}

/// Wire record created `age_secs` before `t0()`.
pub fn record(id: u64, status: &str, age_secs: i64) -> Value {
    json!({
        "id": id,
        "title": format!("Notification {id}"),
        "message": format!("Body {id}"),
        "type": "BOOKING_CONFIRMED",
        "status": status,
        "createdAt": (t0() - Duration::seconds(age_secs)).to_rfc3339(),
    })
}

pub fn with_entity(mut record: Value, kind: &str, id: &str) -> Value {
    record["relatedEntityType"] = json!(kind);
    record["relatedEntityId"] = json!(id);
    record
}

/// In-memory stand-in for the notification service.
#[derive(Default)]
pub struct FakeService {
    feed: Mutex<Vec<Value>>,
    list_calls: AtomicUsize,
    mark_read_calls: Mutex<Vec<String>>,
    fail_list: AtomicBool,
    fail_mark_read: AtomicBool,
    decline_mark_read: AtomicBool,
    held_mark_read: Mutex<Option<oneshot::Receiver<()>>>,
}

impl FakeService {
    pub fn with_feed(feed: Vec<Value>) -> Arc<Self> {
        let service = Self::default();
        *service.feed.lock() = feed;
        Arc::new(service)
    }

    pub fn set_feed(&self, feed: Vec<Value>) {
        *self.feed.lock() = feed;
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn mark_read_calls(&self) -> Vec<String> {
        self.mark_read_calls.lock().clone()
    }

    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn fail_mark_read(&self, fail: bool) {
        self.fail_mark_read.store(fail, Ordering::SeqCst);
    }

    /// Answer mark-read with `success: false` instead of an error.
    pub fn decline_mark_read(&self, decline: bool) {
        self.decline_mark_read.store(decline, Ordering::SeqCst);
    }

    /// Make the next mark-read call wait until the returned sender fires.
    pub fn hold_mark_read(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.held_mark_read.lock() = Some(rx);
        tx
    }

    fn set_status(&self, id: &NotificationId, status: &str) {
        for record in self.feed.lock().iter_mut() {
            if record["id"].to_string().trim_matches('"') == id.as_str() {
                record["status"] = json!(status);
            }
        }
    }
}

fn unavailable() -> ClientError {
    ClientError::Service {
        status: 503,
        message: "service unavailable".to_string(),
    }
}

#[async_trait]
impl NotificationService for FakeService {
    async fn list(&self) -> ClientResult<Vec<NotificationPayload>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let feed = self.feed.lock().clone();
        Ok(feed
            .into_iter()
            .map(|record| serde_json::from_value(record).expect("fake record should decode"))
            .collect())
    }

    async fn mark_read(&self, id: &NotificationId) -> ClientResult<Ack> {
        self.mark_read_calls.lock().push(id.to_string());
        let held = self.held_mark_read.lock().take();
        if let Some(rx) = held {
            let _ = rx.await;
        }
        if self.fail_mark_read.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        if self.decline_mark_read.load(Ordering::SeqCst) {
            return Ok(Ack {
                success: false,
                ..Ack::default()
            });
        }
        self.set_status(id, "READ");
        Ok(Ack::default())
    }

    async fn mark_all_read(&self) -> ClientResult<Ack> {
        let mut feed = self.feed.lock();
        for record in feed.iter_mut() {
            record["status"] = json!("READ");
        }
        Ok(Ack {
            marked_count: Some(feed.len() as u64),
            ..Ack::default()
        })
    }

    async fn delete(&self, id: &NotificationId) -> ClientResult<Ack> {
        let mut feed = self.feed.lock();
        let before = feed.len();
        feed.retain(|record| record["id"].to_string().trim_matches('"') != id.as_str());
        if feed.len() == before {
            return Err(ClientError::NotFound("Notification not found".to_string()));
        }
        Ok(Ack {
            deleted_count: Some(1),
            ..Ack::default()
        })
    }
}

#[derive(Default)]
pub struct RecordingRouter {
    routes: Mutex<Vec<String>>,
}

impl RecordingRouter {
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().clone()
    }
}

impl Router for RecordingRouter {
    fn navigate_to(&self, route: &str) {
        self.routes.lock().push(route.to_string());
    }
}

pub struct Harness {
    pub bell: NotificationBell,
    pub service: Arc<FakeService>,
    pub gate: Arc<StaticGate>,
    pub router: Arc<RecordingRouter>,
    pub listener: ListenerFlag,
}

pub fn mount(service: Arc<FakeService>) -> Harness {
    mount_with_gate(service, Arc::new(StaticGate::new(true)))
}

pub fn mount_with_gate(service: Arc<FakeService>, gate: Arc<StaticGate>) -> Harness {
    let router = Arc::new(RecordingRouter::default());
    let listener = ListenerFlag::new();
    let bell = NotificationBell::mount(
        Collaborators {
            service: service.clone(),
            auth: gate.clone(),
            router: router.clone(),
            listener: Arc::new(listener.clone()),
        },
        WidgetConfig::default(),
    );
    Harness {
        bell,
        service,
        gate,
        router,
        listener,
    }
}

/// Let the poller finish whatever is ready without crossing a poll boundary.
pub async fn settle() {
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
}

pub fn ids(bell: &NotificationBell) -> Vec<String> {
    bell.store()
        .snapshot()
        .iter()
        .map(|n| n.id.to_string())
        .collect()
}
