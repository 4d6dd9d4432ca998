//! Property-based tests for phases, the phase channel and cycle config.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use stoplight::{ConfigError, CycleConfig, Guard, Phase, PhaseChannel};

prop_compose! {
    fn arbitrary_phase()(green in any::<bool>()) -> Phase {
        if green { Phase::Green } else { Phase::Red }
    }
}

prop_compose! {
    fn arbitrary_config()(min in 1u64..10_000, extra in 0u64..10_000, seed in any::<u64>()) -> CycleConfig {
        CycleConfig::new(Duration::from_millis(min), Duration::from_millis(min + extra))
            .unwrap()
            .with_seed(seed)
    }
}

proptest! {
    #[test]
    fn flipped_is_an_involution(phase in arbitrary_phase()) {
        prop_assert_ne!(phase.flipped(), phase);
        prop_assert_eq!(phase.flipped().flipped(), phase);
    }

    #[test]
    fn guard_is_deterministic(phase in arbitrary_phase()) {
        let guard = Guard::new(|p: &Phase| p.is_green());
        prop_assert_eq!(guard.check(&phase), guard.check(&phase));
    }

    #[test]
    fn channel_preserves_values_in_fifo_order(
        values in prop::collection::vec(arbitrary_phase(), 0..64)
    ) {
        let channel = PhaseChannel::new();
        for value in &values {
            channel.send(*value);
        }
        prop_assert_eq!(channel.len(), values.len());

        let received: Vec<Phase> = (0..values.len()).map(|_| channel.receive()).collect();

        prop_assert_eq!(received, values);
        prop_assert!(channel.is_empty());
        prop_assert_eq!(channel.try_receive(), None);
    }

    #[test]
    fn channel_interleaved_sends_and_receives(
        ops in prop::collection::vec(any::<Option<u16>>(), 0..64)
    ) {
        // Some(v) sends v, None receives if anything is pending.
        let channel = PhaseChannel::new();
        let mut model = std::collections::VecDeque::new();

        for op in ops {
            match op {
                Some(value) => {
                    channel.send(value);
                    model.push_back(value);
                }
                None => prop_assert_eq!(channel.try_receive(), model.pop_front()),
            }
        }
        prop_assert_eq!(channel.len(), model.len());
    }

    #[test]
    fn config_accepts_exactly_ordered_nonzero_ranges(min in 0u64..1000, max in 0u64..1000) {
        let result = CycleConfig::new(Duration::from_millis(min), Duration::from_millis(max));

        match result {
            Ok(config) => {
                prop_assert!(min > 0 && min <= max);
                prop_assert_eq!(config.min(), Duration::from_millis(min));
                prop_assert_eq!(config.max(), Duration::from_millis(max));
            }
            Err(ConfigError::ZeroDuration) => prop_assert!(min == 0 || max == 0),
            Err(ConfigError::InvertedRange { .. }) => prop_assert!(min > max),
            Err(err @ ConfigError::TooLong(_)) => prop_assert!(false, "unexpected {}", err),
        }
    }

    #[test]
    fn draws_stay_within_range(config in arbitrary_config()) {
        let mut rng = StdRng::seed_from_u64(config.seed().unwrap_or_default());

        for _ in 0..32 {
            let drawn = config.draw(&mut rng);
            prop_assert!(drawn >= config.min());
            prop_assert!(drawn <= config.max());
        }
    }

    #[test]
    fn seeded_draws_are_reproducible(config in arbitrary_config(), seed in any::<u64>()) {
        let mut a = StdRng::seed_from_u64(seed);
        let mut b = StdRng::seed_from_u64(seed);

        for _ in 0..8 {
            prop_assert_eq!(config.draw(&mut a), config.draw(&mut b));
        }
    }

    #[test]
    fn config_roundtrip_serialization(config in arbitrary_config()) {
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: CycleConfig = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(config, deserialized);
    }
}
