pub const SECONDS_PER_HOUR: u32 = 3_600;
pub const HOURS_PER_DAY: u32 = 24;
pub const DAYS_PER_WEEK: u32 = 7;
pub const WATTS_PER_KILOWATT: u32 = 1_000;
pub const KILOJOULES_PER_KILOWATT_HOUR: u32 = 3_600;
pub const PERCENT: f64 = 100.;

/// Offset between the Celsius and Kelvin scales.
pub const KELVIN_OFFSET: f64 = 273.15;

// Temperatures are carried in Kelvin; the comfort evaluator and the psychrometric
// correlations work in Celsius.
pub fn kelvin_to_celsius(temp_k: f64) -> f64 {
    temp_k - KELVIN_OFFSET
}

pub fn celsius_to_kelvin(temp_c: f64) -> f64 {
    temp_c + KELVIN_OFFSET
}

/// Convert seconds-of-day into fractional hour-of-day.
pub fn seconds_to_hours(seconds: f64) -> f64 {
    seconds / SECONDS_PER_HOUR as f64
}

/// Convert a sequence of hourly-resolution power values (W m-2) into an energy total in
/// kWh m-2, given the length of each step in seconds.
pub fn power_series_to_kwh(values: impl IntoIterator<Item = f64>, step_seconds: f64) -> f64 {
    let step_hours = seconds_to_hours(step_seconds);
    values.into_iter().sum::<f64>() * step_hours / WATTS_PER_KILOWATT as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn should_round_trip_celsius() {
        assert_relative_eq!(kelvin_to_celsius(celsius_to_kelvin(21.3)), 21.3);
        assert_eq!(kelvin_to_celsius(273.15), 0.);
    }

    #[rstest]
    fn should_leave_unphysical_temperatures_alone() {
        assert_eq!(kelvin_to_celsius(-10.), -283.15);
        assert!(kelvin_to_celsius(f64::NAN).is_nan());
    }

    #[rstest]
    fn should_convert_seconds_of_day_to_hours() {
        assert_eq!(seconds_to_hours(27_000.), 7.5);
    }

    #[rstest]
    fn should_total_hourly_power_as_kwh() {
        assert_relative_eq!(power_series_to_kwh([500., 1500., 1000.], 3600.), 3.0);
        assert_relative_eq!(power_series_to_kwh([1000.; 4], 900.), 1.0);
    }
}
