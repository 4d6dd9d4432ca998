//! The cycling loop run on each light's background thread.

use super::{CycleConfig, Shared};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;
use tracing::{debug, info, trace};

/// Flip the light every drawn cycle duration until it is stopped.
pub(super) fn run(shared: &Shared, config: &CycleConfig) {
    let mut rng = match config.seed() {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    info!(
        light = %shared.id,
        min = ?config.min(),
        max = ?config.max(),
        "traffic light cycling"
    );

    let mut cycle = config.draw(&mut rng);
    let mut last = Instant::now();

    while shared.sleep_until(last.checked_add(cycle)) {
        let transition = shared.flip(cycle);
        debug!(
            light = %shared.id,
            from = %transition.from,
            to = %transition.to,
            cycle = transition.cycle,
            after = ?cycle,
            "phase changed"
        );

        last = Instant::now();
        cycle = config.draw(&mut rng);
        trace!(light = %shared.id, next = ?cycle, "drew next cycle duration");
    }

    debug!(light = %shared.id, "cycling loop exited");
}
