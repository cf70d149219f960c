pub use crate::builder::InertiaCacheBuilder;
pub use crate::error::ConfigError;
pub use crate::inertia::{EvictCallback, InertiaCache};
pub use crate::metrics::{CounterTarget, NoopTarget, Target, TargetSnapshot};
