//! Application layer for funnel.
//!
//! Couples the synchronous flow controller from `funnel-core` with the
//! timed animations from `funnel-execution`.

pub mod session;

pub use session::{FunnelSession, SessionFactory, SessionInfo, SessionManager, SessionStatus};
