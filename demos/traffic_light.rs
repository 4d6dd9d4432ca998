//! Traffic Light Simulation
//!
//! This example runs one light on its own thread and has several vehicles
//! wait for green before crossing.
//!
//! Key concepts:
//! - Randomized cycle durations from a bounded range
//! - Lock-free reads of the current phase
//! - Every waiting vehicle is released by the same green phase
//! - Orderly shutdown with stop()
//!
//! Run with: RUST_LOG=stoplight=debug cargo run --example traffic_light

use std::sync::Arc;
use std::thread;
use std::time::Duration;
use stoplight::{CycleConfig, TrafficLight};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    println!("=== Traffic Light Simulation ===\n");

    let config = CycleConfig::new(Duration::from_millis(400), Duration::from_millis(600))
        .expect("valid cycle range");
    let light = Arc::new(TrafficLight::with_config(config));

    println!("Light {} starts {}", light.id(), light.current_phase());
    light.simulate().expect("light starts once");

    let vehicles: Vec<_> = (1..=4)
        .map(|n| {
            let light = Arc::clone(&light);
            thread::spawn(move || {
                for trip in 1..=3 {
                    println!("vehicle {n}: waiting at the light (trip {trip})");
                    if light.wait_for_green().is_err() {
                        println!("vehicle {n}: light switched off");
                        return;
                    }
                    println!("vehicle {n}: crossing on {}", light.current_phase());
                    thread::sleep(Duration::from_millis(700));
                }
            })
        })
        .collect();

    for vehicle in vehicles {
        vehicle.join().expect("vehicle thread panicked");
    }

    light.stop();
    if let Some(last) = light.last_transition() {
        println!(
            "\nLight flipped {} times, last {} -> {} after {:?}",
            last.cycle, last.from, last.to, last.duration
        );
    }

    println!("\n=== Example Complete ===");
}
