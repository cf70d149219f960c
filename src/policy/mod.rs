//! Eviction policy cores.

pub mod lru;

pub use lru::LruCore;
