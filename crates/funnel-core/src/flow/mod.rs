//! Flow domain module.
//!
//! The step state machine and its collaborators.
//!
//! # Module Structure
//!
//! - `controller`: the state machine (`FlowController`, `FlowOptions`)
//! - `session`: per-session state (`FlowSession`, `StepEntry`, `AnimationTicket`)
//! - `event`: input events and dispatch results (`FlowEvent`, `Dispatched`)
//! - `renderer`: presentation hooks (`FlowRenderer`, `NullRenderer`)
//! - `recording`: a renderer that records calls (`RecordingRenderer`)
//! - `address`: page address reflection (`PageAddress`)

mod address;
mod controller;
mod event;
mod recording;
mod renderer;
mod session;

pub use address::{DEFAULT_STEP_PARAM, PageAddress};
pub use controller::{FlowController, FlowOptions};
pub use event::{Dispatched, FlowEvent};
pub use recording::{RecordingRenderer, RenderCall};
pub use renderer::{FlowRenderer, NullRenderer};
pub use session::{AnimationTicket, FlowSession, PendingPrompt, StepEntry};
