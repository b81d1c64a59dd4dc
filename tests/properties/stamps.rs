//! Property tests for prepare stamps.

use proptest::prelude::*;

use tether::prepare_info::next_stamp;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 96,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: the next stamp is strictly greater than any parseable
    /// previous stamp.
    #[test]
    fn property_stamps_strictly_increase(prev in 0i64..=i64::MAX - 1) {
        let prev_str = prev.to_string();
        let next = next_stamp(Some(&prev_str));
        prop_assert!(next.parse::<i64>().unwrap() > prev);
    }

    /// PROPERTY: a garbage previous stamp still yields a parseable one.
    #[test]
    fn property_garbage_prev_yields_wall_clock(prev in "[a-zA-Z ]{0,12}") {
        let next = next_stamp(Some(&prev));
        prop_assert!(next.parse::<i64>().is_ok());
    }
}

#[test]
fn chained_stamps_form_a_strict_chain() {
    let mut prev = next_stamp(None);
    for _ in 0..100 {
        let next = next_stamp(Some(&prev));
        assert!(next.parse::<i64>().unwrap() > prev.parse::<i64>().unwrap());
        prev = next;
    }
}
