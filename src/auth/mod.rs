pub mod claims;
pub mod gate;
pub mod session;

pub use claims::Claims;
pub use gate::{AuthGate, Clock, SessionGate, StaticGate};
pub use session::Session;
