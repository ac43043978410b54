//! Float helpers that keep NaN flowing through calculations. Each returns the first argument
//! unless the second compares strictly better, so a NaN in first position always survives.

pub fn max_of_2<T: PartialOrd + Copy>(first: T, second: T) -> T {
    if second > first {
        second
    } else {
        first
    }
}

pub fn min_of_2<T: PartialOrd + Copy>(first: T, second: T) -> T {
    if second < first {
        second
    } else {
        first
    }
}

/// Clamp `value` into `[lower, upper]`, returning `value` unchanged if it is NaN. Inverted
/// bounds do not panic; the upper bound wins.
pub(crate) fn clamp_between(value: f64, lower: f64, upper: f64) -> f64 {
    min_of_2(max_of_2(value, lower), upper)
}

pub(crate) fn is_near_zero(value: f64) -> bool {
    value.abs() < 1e-14
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(2., 4., 4.)]
    #[case(4., 2., 4.)]
    #[case(-1., -3., -1.)]
    fn should_pick_larger_of_two(#[case] first: f64, #[case] second: f64, #[case] expected: f64) {
        assert_eq!(max_of_2(first, second), expected);
    }

    #[rstest]
    fn should_pick_smaller_of_two_ints() {
        assert_eq!(min_of_2(4, 2), 2);
        assert_eq!(min_of_2(2, 4), 2);
    }

    #[rstest]
    fn max_of_2_keeps_nan_in_first_position() {
        assert!(max_of_2(f64::NAN, 0.).is_nan());
        assert_eq!(max_of_2(0., f64::NAN), 0.);
    }

    #[rstest]
    #[case(295., 290., 300., 295.)]
    #[case(285., 290., 300., 290.)]
    #[case(305., 290., 300., 300.)]
    fn should_clamp_into_band(
        #[case] value: f64,
        #[case] lower: f64,
        #[case] upper: f64,
        #[case] expected: f64,
    ) {
        assert_eq!(clamp_between(value, lower, upper), expected);
    }

    #[rstest]
    fn clamp_passes_nan_through() {
        assert!(clamp_between(f64::NAN, 0., 1.).is_nan());
    }

    #[rstest]
    fn should_detect_near_zero() {
        assert!(is_near_zero(1e-15));
        assert!(!is_near_zero(1e-10));
    }
}
