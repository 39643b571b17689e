//! Session Controller and shared session state

pub mod controller;
pub mod factory;
pub mod state;

pub use controller::{SessionController, SessionFactory, SessionParts};
pub use factory::SystemFactory;
pub use state::{RunState, SessionPhase, SessionState, SharedSessionState};
