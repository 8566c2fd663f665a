//! Session application services.
//!
//! This module contains the runtime session (controller plus animations),
//! the factory that builds sessions from configuration, and the manager
//! that keeps them.

mod factory;
mod manager;
mod runner;

pub use factory::SessionFactory;
pub use manager::{SessionInfo, SessionManager};
pub use runner::{FunnelSession, SessionStatus};
