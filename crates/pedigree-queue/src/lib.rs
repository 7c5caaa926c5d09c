//! Generic d-ary priority queue for the pedigree simulation.
//!
//! One heap implementation serves three roles: the engine's event clock
//! (min-heap by event time), the two living-population indices (min-heap by
//! death time) and the coalescence analysis' ancestor frontier (max-heap by
//! birth time). Ordering is never taken from the element type; every queue is
//! built with an explicit comparator.
//!
//! # Modules
//!
//! - [`heap`] -- [`PriorityQueue`] and [`HeapMode`]
//! - [`error`] -- [`QueueError`]

pub mod error;
pub mod heap;

pub use error::QueueError;
pub use heap::{Comparator, HeapMode, PriorityQueue};
