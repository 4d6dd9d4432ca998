//! Core value types of a traffic light.
//!
//! This module contains the pure part of the crate:
//! - The two-valued `Phase` and its flip rule
//! - `PhaseTransition` records describing each flip
//! - Guard predicates that blocking waits are expressed with
//!
//! Nothing in this module blocks or spawns threads.

mod guard;
mod phase;

pub use guard::Guard;
pub use phase::{Phase, PhaseTransition};
