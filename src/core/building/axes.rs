// Independent axes of the per-timestep decision table, each derived from the clock, the
// configuration or the demands.

use crate::compare_floats::is_near_zero;
use crate::core::units::DAYS_PER_WEEK;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use strum::{Display, EnumIter};

#[derive(Clone, Copy, Debug, Display, EnumIter, Eq, Hash, PartialEq)]
pub enum DayPeriod {
    Night,
    Day,
}

impl DayPeriod {
    /// Classify an hour of day against the configured night window.
    ///
    /// The night window wraps midnight: it is night before `night_end` or from
    /// `night_start` onwards.
    pub fn from_hour(hour: f64, night_start: f64, night_end: f64) -> Self {
        if hour < night_end || hour > night_start || is_near_zero(hour - night_start) {
            Self::Night
        } else {
            Self::Day
        }
    }
}

/// Hours of day bounding the night period, in h
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NightWindow {
    pub start: f64,
    pub end: f64,
}

impl NightWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn period(&self, hour: f64) -> DayPeriod {
        DayPeriod::from_hour(hour, self.start, self.end)
    }
}

impl Default for NightWindow {
    fn default() -> Self {
        Self::new(19., 7.)
    }
}

#[derive(Clone, Copy, Debug, Display, EnumIter, Eq, Hash, PartialEq)]
pub enum DayType {
    Weekday,
    Saturday,
    Sunday,
}

impl DayType {
    pub fn from_julian_day(julian_day: u32) -> Self {
        match julian_day % DAYS_PER_WEEK {
            0 => Self::Sunday,
            6 => Self::Saturday,
            _ => Self::Weekday,
        }
    }

    pub fn is_weekend(&self) -> bool {
        !matches!(self, Self::Weekday)
    }
}

/// Season used for time-of-use pricing and clothing insulation
#[derive(
    Clone, Copy, Debug, Deserialize_repr, Display, EnumIter, Eq, Hash, PartialEq, Serialize_repr,
)]
#[repr(u8)]
pub enum Season {
    Winter = 0,
    Summer = 1,
}

/// Whether a thermostat or humidistat follows the fixed day/night schedule or the fuzzy
/// smart controller
#[derive(
    Clone, Copy, Debug, Default, Deserialize_repr, Display, Eq, Hash, PartialEq, Serialize_repr,
)]
#[repr(u8)]
pub enum ControlMode {
    #[default]
    Fixed = 0,
    Smart = 1,
}

/// Condenser type of the cooling plant
#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum CondenserType {
    #[default]
    #[serde(rename = "AIR")]
    #[strum(serialize = "AIR")]
    AirCooled,
    #[serde(rename = "WAT")]
    #[strum(serialize = "WAT")]
    WaterCooled,
}

#[derive(Clone, Copy, Debug, Display, EnumIter, Eq, Hash, PartialEq)]
pub enum HvacMode {
    Cooling,
    Heating,
    Neutral,
}

impl HvacMode {
    /// Above this canyon air temperature the plant may cool, below it may heat, in K
    pub const AMBIENT_THRESHOLD: f64 = 288.;

    pub fn resolve(
        sensible_cooling_demand: f64,
        sensible_heating_demand: f64,
        canyon_temperature: f64,
    ) -> Self {
        if sensible_cooling_demand > 0. && canyon_temperature > Self::AMBIENT_THRESHOLD {
            Self::Cooling
        } else if sensible_heating_demand > 0. && canyon_temperature < Self::AMBIENT_THRESHOLD {
            Self::Heating
        } else {
            Self::Neutral
        }
    }
}

#[derive(Clone, Copy, Debug, Display, EnumIter, Eq, Hash, PartialEq)]
pub enum HumidityMode {
    Dehumidifying,
    Humidifying,
    Neutral,
}

impl HumidityMode {
    /// Dehumidification wins when both demands are positive.
    pub fn resolve(dehumidification_demand: f64, humidification_demand: f64) -> Self {
        if dehumidification_demand > 0. {
            Self::Dehumidifying
        } else if humidification_demand > 0. {
            Self::Humidifying
        } else {
            Self::Neutral
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use strum::IntoEnumIterator;

    #[rstest]
    #[case(0., DayPeriod::Night)]
    #[case(6.5, DayPeriod::Night)]
    #[case(7., DayPeriod::Day)]
    #[case(12., DayPeriod::Day)]
    #[case(19., DayPeriod::Night)]
    #[case(23.5, DayPeriod::Night)]
    fn should_classify_day_period(#[case] hour: f64, #[case] expected: DayPeriod) {
        assert_eq!(DayPeriod::from_hour(hour, 19., 7.), expected);
    }

    #[rstest]
    fn night_window_wraps_midnight() {
        let window = NightWindow::new(22., 6.);
        assert_eq!(window.period(5.9), DayPeriod::Night);
        assert_eq!(window.period(21.9), DayPeriod::Day);
        assert_eq!(window.period(22.), DayPeriod::Night);
        assert_eq!(NightWindow::default().period(12.), DayPeriod::Day);
    }

    #[rstest]
    #[case(0, DayType::Sunday)]
    #[case(6, DayType::Saturday)]
    #[case(7, DayType::Sunday)]
    #[case(8, DayType::Weekday)]
    #[case(153, DayType::Saturday)]
    fn should_classify_day_type(#[case] julian_day: u32, #[case] expected: DayType) {
        assert_eq!(DayType::from_julian_day(julian_day), expected);
    }

    #[rstest]
    fn only_saturday_and_sunday_are_weekend() {
        let weekend = DayType::iter().filter(DayType::is_weekend).collect::<Vec<_>>();
        assert_eq!(weekend, vec![DayType::Saturday, DayType::Sunday]);
    }

    #[rstest]
    #[case(10., 0., 295., HvacMode::Cooling)]
    #[case(10., 0., 288., HvacMode::Neutral)]
    #[case(0., 10., 280., HvacMode::Heating)]
    #[case(0., 10., 290., HvacMode::Neutral)]
    #[case(10., 10., 280., HvacMode::Heating)]
    #[case(0., 0., 280., HvacMode::Neutral)]
    fn should_resolve_hvac_mode(
        #[case] cooling: f64,
        #[case] heating: f64,
        #[case] canyon_temperature: f64,
        #[case] expected: HvacMode,
    ) {
        assert_eq!(HvacMode::resolve(cooling, heating, canyon_temperature), expected);
    }

    #[rstest]
    #[case(1., 0., HumidityMode::Dehumidifying)]
    #[case(1., 1., HumidityMode::Dehumidifying)]
    #[case(0., 1., HumidityMode::Humidifying)]
    #[case(0., 0., HumidityMode::Neutral)]
    fn should_resolve_humidity_mode(
        #[case] dehumidification: f64,
        #[case] humidification: f64,
        #[case] expected: HumidityMode,
    ) {
        assert_eq!(HumidityMode::resolve(dehumidification, humidification), expected);
    }

    #[rstest]
    fn should_deserialize_flags_from_integers() {
        let season: Season = serde_json::from_str("1").unwrap();
        assert_eq!(season, Season::Summer);
        let mode: ControlMode = serde_json::from_str("0").unwrap();
        assert_eq!(mode, ControlMode::Fixed);
        let condenser: CondenserType = serde_json::from_str("\"WAT\"").unwrap();
        assert_eq!(condenser, CondenserType::WaterCooled);
        assert_eq!(condenser.to_string(), "WAT");
    }
}
