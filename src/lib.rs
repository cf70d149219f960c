//! inertia-cache: bounded negative-caching LRU with coalesced refresh.
//!
//! See the [`inertia`] module docs for the locking discipline and lookup flow.

pub mod error;
pub mod metrics;
pub mod policy;

pub mod builder;
pub mod inertia;
pub mod prelude;

pub use inertia::{EvictCallback, InertiaCache};
