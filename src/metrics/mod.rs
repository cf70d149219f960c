//! Metric sink seam: the [`Target`] trait, its concrete sinks, and the
//! read-side snapshot.

mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use metrics_impl::{CounterTarget, NoopTarget};
pub use snapshot::TargetSnapshot;
pub use traits::Target;
