use crate::core::units::{kelvin_to_celsius, KELVIN_OFFSET, PERCENT};

// Moist air property relations, following ASHRAE Fundamentals (2009) chapter 1.

/// ratio of molecular masses of water vapour and dry air used for humidity ratio <-> vapour
/// pressure conversion (ASHRAE)
const MOLECULAR_MASS_RATIO: f64 = 0.621945;
/// ratio of molecular masses used by the Tetens set point conversion
const MOLECULAR_MASS_RATIO_TETENS: f64 = 0.622;
/// specific heat capacity of dry air, J/(kg.K)
const C_AIR: f64 = 1006.;
/// latent heat of vaporisation at 0 degC, J/kg
const H_LG: f64 = 2_501_000.;
/// specific heat capacity of water vapour, J/(kg.K)
const C_VAPOUR: f64 = 1860.;
/// specific gas constant of dry air, kJ/(kg.K)
const R_DRY_AIR: f64 = 0.287042;
/// ratio of gas constants of water vapour and dry air
const VAPOUR_VOLUME_FACTOR: f64 = 1.607858;

/// State of moist air as reported by [`psychrometrics`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoistAirState {
    /// dry bulb temperature, in deg C
    pub dry_bulb_temperature: f64,
    /// humidity ratio, in kg water / kg dry air
    pub humidity_ratio: f64,
    /// relative humidity, in %
    pub relative_humidity: f64,
    /// specific enthalpy, in J / kg dry air
    pub enthalpy: f64,
    /// dew point temperature, in deg C (correlation valid between 0 and 93 degC)
    pub dew_point_temperature: f64,
    /// specific volume, in m3 / kg dry air
    pub specific_volume: f64,
}

/// Calculate moist air properties from dry bulb temperature, humidity ratio and pressure
///
/// Arguments:
/// * `dry_bulb_temperature` - in K
/// * `humidity_ratio` - in kg/kg
/// * `pressure` - in Pa
pub fn psychrometrics(dry_bulb_temperature: f64, humidity_ratio: f64, pressure: f64) -> MoistAirState {
    let pressure_kpa = pressure / 1000.;
    let t_db = kelvin_to_celsius(dry_bulb_temperature);
    let w = humidity_ratio;

    let vapour_pressure = partial_vapour_pressure(w, pressure_kpa);
    let relative_humidity = vapour_pressure / saturation_pressure(t_db) * PERCENT;

    let enthalpy = C_AIR * t_db + w * (H_LG + C_VAPOUR * t_db);

    let specific_volume =
        R_DRY_AIR * (t_db + KELVIN_OFFSET) * (1. + VAPOUR_VOLUME_FACTOR * w) / pressure_kpa;

    let alpha = vapour_pressure.ln();
    let dew_point_temperature = 6.54
        + 14.526 * alpha
        + 0.7389 * alpha.powi(2)
        + 0.09486 * alpha.powi(3)
        + 0.4569 * vapour_pressure.powf(0.1984);

    MoistAirState {
        dry_bulb_temperature: t_db,
        humidity_ratio: w,
        relative_humidity,
        enthalpy,
        dew_point_temperature,
        specific_volume,
    }
}

/// Partial pressure of water vapour, in the same units as `pressure`
fn partial_vapour_pressure(humidity_ratio: f64, pressure: f64) -> f64 {
    humidity_ratio * pressure / (MOLECULAR_MASS_RATIO + humidity_ratio)
}

/// Saturation vapour pressure (Hyland-Wexler), in kPa
///
/// Arguments:
/// * `temperature` - dry bulb temperature, in deg C. Below freezing the pressure over ice
///                   is returned, otherwise over liquid water.
pub fn saturation_pressure(temperature: f64) -> f64 {
    let t = temperature + KELVIN_OFFSET;

    let pws = if t < KELVIN_OFFSET {
        (-5674.5359 / t
            + 6.3925247
            + -0.9677843e-2 * t
            + 0.62215701e-6 * t.powi(2)
            + 0.20747825e-8 * t.powi(3)
            + -0.9484024e-12 * t.powi(4)
            + 4.1635019 * t.ln())
        .exp()
    } else {
        (-5800.2206 / t
            + 1.3914993
            + -0.048640239 * t
            + 0.41764768e-4 * t.powi(2)
            + -0.14452093e-7 * t.powi(3)
            + 6.5459673 * t.ln())
        .exp()
    };

    pws / 1000.
}

/// Moist air density, in kg/m3
///
/// Arguments:
/// * `pressure` - in Pa
/// * `dry_bulb_temperature` - in K
/// * `humidity_ratio` - in kg/kg
pub fn moist_air_density(pressure: f64, dry_bulb_temperature: f64, humidity_ratio: f64) -> f64 {
    pressure / (1000. * R_DRY_AIR * dry_bulb_temperature * (1. + VAPOUR_VOLUME_FACTOR * humidity_ratio))
}

/// Saturation vapour pressure from the Tetens equation, in Pa
///
/// Arguments:
/// * `temperature` - in K
pub fn tetens_saturation_pressure(temperature: f64) -> f64 {
    let t_c = kelvin_to_celsius(temperature);
    610.78 * (17.27 * t_c / (t_c + 237.3)).exp()
}

/// Convert a relative humidity set point into a humidity ratio, in kg/kg
///
/// Arguments:
/// * `relative_humidity` - in %
/// * `temperature` - temperature at which the relative humidity applies, in K
/// * `pressure` - ambient pressure, in Pa
pub fn humidity_ratio_from_relative_humidity(
    relative_humidity: f64,
    temperature: f64,
    pressure: f64,
) -> f64 {
    let p_sat = tetens_saturation_pressure(temperature);
    let phi = relative_humidity / PERCENT;
    MOLECULAR_MASS_RATIO_TETENS * phi * p_sat / (pressure - phi * p_sat)
}
