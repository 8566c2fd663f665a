//! Runtime side of the analysis stages.
//!
//! [`ProgressAnimator`] turns the pure counter model from `funnel-core` into
//! a timed, cancellable tokio task.

pub mod animator;

pub use animator::{AnimationHandle, AnimatorEvent, ProgressAnimator};
