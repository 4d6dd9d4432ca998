//! Stoplight: a simulated traffic light for multi-threaded programs
//!
//! A [`TrafficLight`] alternates between red and green on a background
//! thread, holding each phase for a duration drawn at random from a bounded
//! range. Any number of threads can read the current phase without blocking
//! or block until the light turns green.
//!
//! # Core Concepts
//!
//! - **Phase**: `Red` or `Green`, flipped on every cycle
//! - **PhaseChannel**: blocking queue each flip is published to; every
//!   event goes to exactly one receiver
//! - **Guards**: predicates a waiter blocks on until the light satisfies them
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::thread;
//! use std::time::Duration;
//! use stoplight::{CycleConfig, Phase, TrafficLight};
//!
//! let config = CycleConfig::new(Duration::from_millis(10), Duration::from_millis(20)).unwrap();
//! let light = Arc::new(TrafficLight::with_config(config));
//! light.simulate().unwrap();
//!
//! let vehicles: Vec<_> = (0..3)
//!     .map(|_| {
//!         let light = Arc::clone(&light);
//!         thread::spawn(move || light.wait_for_green())
//!     })
//!     .collect();
//!
//! for vehicle in vehicles {
//!     vehicle.join().unwrap().unwrap();
//! }
//!
//! assert_eq!(light.phase_events().receive(), Phase::Green);
//! ```

pub mod channel;
pub mod core;
pub mod light;

// Re-export commonly used types
pub use crate::channel::PhaseChannel;
pub use crate::core::{Guard, Phase, PhaseTransition};
pub use crate::light::{ConfigError, CycleConfig, LightError, TrafficLight};
