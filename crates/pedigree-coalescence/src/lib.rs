//! Coalescence of ancestral lines for the pedigree simulation.
//!
//! Starting from the people alive at the end of a run, each line is traced
//! backward through a single parent (fathers for males, mothers for
//! females). Whenever two lines reach the same ancestor they merge, and the
//! merge is recorded as a [`CoalescencePoint`](pedigree_types::CoalescencePoint).
//!
//! # Modules
//!
//! - [`analyzer`] -- [`CoalescenceAnalyzer`] and the per-sex [`Lineages`]
//! - [`error`] -- [`CoalescenceError`]

pub mod analyzer;
pub mod error;

pub use analyzer::{CoalescenceAnalyzer, Lineages, analyze, analyze_lineages};
pub use error::CoalescenceError;
