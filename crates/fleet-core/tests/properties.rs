//! Property tests for the vehicle state machine.

use fleet_core::mission::{cruise_altitude_m, generate_mission};
use fleet_core::{FleetRules, MissionState, Vehicle, VehicleClass};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn class_strategy() -> impl Strategy<Value = VehicleClass> {
    prop_oneof![Just(VehicleClass::RotaryWing), Just(VehicleClass::FixedWing)]
}

/// Tick lengths with the occasional pause/resume/RTB/loiter command mixed in.
#[derive(Debug, Clone)]
enum Step {
    Tick(f64),
    Pause,
    Resume,
    ReturnToBase,
    Loiter,
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        8 => (0.0f64..120.0).prop_map(Step::Tick),
        1 => Just(Step::Pause),
        1 => Just(Step::Resume),
        1 => Just(Step::ReturnToBase),
        1 => Just(Step::Loiter),
    ]
}

proptest! {
    #[test]
    fn energy_stays_in_bounds(
        id in "[A-Z]{3,8}-[0-9]{2}",
        class in class_strategy(),
        steps in prop::collection::vec(step_strategy(), 1..80),
        seed in any::<u64>(),
    ) {
        let rules = FleetRules::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut vehicle = Vehicle::new(id, class, 12.84, 80.15, "Prop");
        let mut was_emergency = false;

        for step in steps {
            match step {
                Step::Tick(dt) => vehicle.update(dt, &rules, &mut rng),
                Step::Pause => vehicle.pause(),
                Step::Resume => vehicle.resume(),
                Step::ReturnToBase => vehicle.return_to_base(),
                Step::Loiter => vehicle.loiter_here(),
            }

            prop_assert!((0.0..=100.0).contains(&vehicle.battery_pct()));
            if let Some(fuel) = vehicle.fuel_pct() {
                prop_assert!((0.0..=100.0).contains(&fuel));
            }
            prop_assert!(vehicle.waypoint_index() <= vehicle.waypoints().len());
            prop_assert!(vehicle.trail_len() <= rules.trail_capacity);

            if was_emergency {
                prop_assert_eq!(vehicle.state(), MissionState::Emergency);
            }
            was_emergency = vehicle.state() == MissionState::Emergency;
        }
    }

    #[test]
    fn emergency_declared_same_tick_energy_drops(
        class in class_strategy(),
        dt in 0.0f64..5_000.0,
    ) {
        let rules = FleetRules::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut vehicle = Vehicle::new("PROBE-01", class, 12.84, 80.15, "Prop");
        vehicle.update(dt, &rules, &mut rng);

        let fuel_low = vehicle.fuel_pct().is_some_and(|fuel| fuel < rules.emergency_fuel_pct);
        if vehicle.battery_pct() < rules.emergency_battery_pct || fuel_low {
            prop_assert_eq!(vehicle.state(), MissionState::Emergency);
        }
    }

    #[test]
    fn mission_generation_is_deterministic(
        id in "[A-Za-z0-9-]{1,16}",
        class in class_strategy(),
    ) {
        let alt = cruise_altitude_m(&id, class);
        let first = generate_mission(&id, class, 12.84, 80.15, alt);
        let second = generate_mission(&id, class, 12.84, 80.15, alt);
        prop_assert_eq!(first, second);
    }
}
