use charger_core::filter::{Direction, FilterState};
use proptest::prelude::*;
use std::time::{Duration, Instant};

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Charging),
        Just(Direction::Discharging),
        Just(Direction::Idle),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256, .. ProptestConfig::default()
    })]

    #[test]
    fn display_moves_at_most_one_point_and_stays_in_range(
        initial in -20i32..140,
        steps in prop::collection::vec((-50i32..200, direction(), 0u64..900), 1..200),
    ) {
        let t0 = Instant::now();
        let mut now = t0;
        let mut st = FilterState::new(initial, t0);
        prop_assert!((0..=100).contains(&st.display_soc));

        for (raw, dir, dt) in steps {
            now += Duration::from_secs(dt);
            let before = st.display_soc;
            st.update(raw, dir, now);
            prop_assert!((st.display_soc - before).abs() <= 1);
            prop_assert!((0..=100).contains(&st.display_soc));
            prop_assert!((0.0..=100.0).contains(&st.smoothed_soc));
        }
    }

    #[test]
    fn steps_are_spaced_by_the_minimum_interval(
        steps in prop::collection::vec((0i32..=100, direction(), 1u64..120), 1..300),
    ) {
        let t0 = Instant::now();
        let mut now = t0;
        let mut st = FilterState::new(50, t0);
        let mut last_step = t0;

        for (raw, dir, dt) in steps {
            now += Duration::from_secs(dt);
            let before = st.display_soc;
            st.update(raw, dir, now);
            if st.display_soc != before {
                prop_assert!(now.duration_since(last_step) >= Duration::from_secs(60));
                last_step = now;
            }
        }
    }

    #[test]
    fn matching_input_is_a_fixed_point(
        soc in 0i32..=100,
        dir in direction(),
        n in 1usize..100,
    ) {
        let t0 = Instant::now();
        let mut st = FilterState::new(soc, t0);
        for i in 0..n {
            st.update(soc, dir, t0 + Duration::from_secs(60 * i as u64));
            prop_assert_eq!(st.display_soc, soc);
        }
    }
}
