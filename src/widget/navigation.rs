//! Navigation dispatch for notifications that point at another object

use std::fmt;

use crate::domain::notifications::{RelatedEntity, RelatedEntityType};

/// External page router. Fire-and-forget.
pub trait Router: Send + Sync {
    fn navigate_to(&self, route: &str);
}

/// Router that only logs the destination.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingRouter;

impl Router for LoggingRouter {
    fn navigate_to(&self, route: &str) {
        tracing::info!(route = route, "Navigate");
    }
}

/// Detail pages a notification can lead to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Booking(String),
    Transaction(String),
    ChargingSession(String),
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Booking(id) => write!(f, "/bookings/{}", id),
            Self::Transaction(id) => write!(f, "/transactions/{}", id),
            Self::ChargingSession(id) => write!(f, "/charging-sessions/{}", id),
        }
    }
}

pub fn route_for(entity: &RelatedEntity) -> Route {
    let id = entity.id.clone();
    match entity.kind {
        RelatedEntityType::Booking => Route::Booking(id),
        RelatedEntityType::Transaction => Route::Transaction(id),
        RelatedEntityType::Session => Route::ChargingSession(id),
    }
}

/// Navigate to the entity's route, if there is one. Returns the route taken.
pub fn dispatch(router: &dyn Router, entity: Option<&RelatedEntity>) -> Option<String> {
    let route = route_for(entity?).to_string();
    router.navigate_to(&route);
    Some(route)
}
