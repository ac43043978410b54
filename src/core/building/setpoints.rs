use crate::core::building::axes::{ControlMode, DayPeriod, Season};
use crate::core::controls::smart_setpoint::{
    ComfortBand, ControlContext, SetpointFunction, SmartSetpointController,
};
use crate::core::psychrometrics::humidity_ratio_from_relative_humidity;
use crate::errors::ConfigurationError;
use serde::Deserialize;
use serde_valid::Validate;
use tracing::debug;

/// Scheduled day/night setpoints used when a controller is not in smart mode
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct FixedSetpoints {
    /// in K
    pub heating_day: f64,
    pub heating_night: f64,
    pub cooling_day: f64,
    pub cooling_night: f64,
    /// in %
    #[validate(minimum = 0.)]
    #[validate(maximum = 100.)]
    pub dehumidification_rh_day: f64,
    #[validate(minimum = 0.)]
    #[validate(maximum = 100.)]
    pub dehumidification_rh_night: f64,
    #[validate(minimum = 0.)]
    #[validate(maximum = 100.)]
    pub humidification_rh_day: f64,
    #[validate(minimum = 0.)]
    #[validate(maximum = 100.)]
    pub humidification_rh_night: f64,
}

impl FixedSetpoints {
    fn heating(&self, period: DayPeriod) -> f64 {
        match period {
            DayPeriod::Day => self.heating_day,
            DayPeriod::Night => self.heating_night,
        }
    }

    fn cooling(&self, period: DayPeriod) -> f64 {
        match period {
            DayPeriod::Day => self.cooling_day,
            DayPeriod::Night => self.cooling_night,
        }
    }

    fn dehumidification_rh(&self, period: DayPeriod) -> f64 {
        match period {
            DayPeriod::Day => self.dehumidification_rh_day,
            DayPeriod::Night => self.dehumidification_rh_night,
        }
    }

    fn humidification_rh(&self, period: DayPeriod) -> f64 {
        match period {
            DayPeriod::Day => self.humidification_rh_day,
            DayPeriod::Night => self.humidification_rh_night,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct SmartBuildingParameters {
    /// selects the time-of-use tariff and clothing level
    pub season: Season,
    #[serde(default)]
    pub thermostat: ControlMode,
    #[serde(default)]
    pub humidistat: ControlMode,
    #[validate]
    pub fixed_setpoints: FixedSetpoints,
    /// in K
    pub heating_band: ComfortBand,
    /// in K
    pub cooling_band: ComfortBand,
    /// in %, shared by humidification and dehumidification
    pub humidity_band: ComfortBand,
}

impl SmartBuildingParameters {
    pub fn check_bands(&self) -> Result<(), ConfigurationError> {
        self.heating_band.check_order("heating")?;
        self.cooling_band.check_order("cooling")?;
        self.humidity_band.check_order("humidity")
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmartThermostat {
    pub heating_weight: f64,
    pub cooling_weight: f64,
    pub heating_band: ComfortBand,
    pub cooling_band: ComfortBand,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmartHumidistat {
    pub humidification_weight: f64,
    pub dehumidification_weight: f64,
    /// in %
    pub relative_humidity_band: ComfortBand,
    /// in kg/kg, at the previous indoor temperature
    pub humidity_ratio_band: ComfortBand,
}

/// Setpoints governing one timestep
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Setpoints {
    /// in K
    pub heating: f64,
    pub cooling: f64,
    /// humidity ratios, in kg/kg
    pub humidification: f64,
    pub dehumidification: f64,
    /// in %
    pub humidification_rh: f64,
    pub dehumidification_rh: f64,
    pub thermostat: Option<SmartThermostat>,
    pub humidistat: Option<SmartHumidistat>,
}

/// Conditions the setpoint selection reads
pub(crate) struct SelectionInputs {
    pub period: DayPeriod,
    pub context: ControlContext,
    pub canyon_temperature: f64,
    pub canyon_humidity: f64,
    /// indoor temperature at the start of the timestep, in K
    pub indoor_temperature: f64,
    pub pressure: f64,
}

pub(crate) fn select_setpoints(
    parameters: &SmartBuildingParameters,
    controller: &SmartSetpointController,
    inputs: &SelectionInputs,
) -> Setpoints {
    let fixed = &parameters.fixed_setpoints;
    debug!(
        "{} setpoints at hour {}",
        inputs.period, inputs.context.hour_of_day
    );

    let (heating, cooling, thermostat) = match parameters.thermostat {
        ControlMode::Fixed => (fixed.heating(inputs.period), fixed.cooling(inputs.period), None),
        ControlMode::Smart => {
            let heating = controller.temperature_setpoint(
                SetpointFunction::Heating,
                &inputs.context,
                inputs.canyon_temperature,
                &parameters.heating_band,
            );
            let cooling = controller.temperature_setpoint(
                SetpointFunction::Cooling,
                &inputs.context,
                inputs.canyon_temperature,
                &parameters.cooling_band,
            );
            (
                heating.setpoint,
                cooling.setpoint,
                Some(SmartThermostat {
                    heating_weight: heating.weight,
                    cooling_weight: cooling.weight,
                    heating_band: parameters.heating_band,
                    cooling_band: parameters.cooling_band,
                }),
            )
        }
    };

    match parameters.humidistat {
        ControlMode::Fixed => {
            let dehumidification_rh = fixed.dehumidification_rh(inputs.period);
            let humidification_rh = fixed.humidification_rh(inputs.period);
            Setpoints {
                heating,
                cooling,
                // dehumidification happens alongside cooling and humidification alongside
                // heating, so each is referred to that setpoint temperature
                dehumidification: humidity_ratio_from_relative_humidity(
                    dehumidification_rh,
                    cooling,
                    inputs.pressure,
                ),
                humidification: humidity_ratio_from_relative_humidity(
                    humidification_rh,
                    heating,
                    inputs.pressure,
                ),
                dehumidification_rh,
                humidification_rh,
                thermostat,
                humidistat: None,
            }
        }
        ControlMode::Smart => {
            let humidify = controller.humidity_setpoint(
                SetpointFunction::Humidification,
                &inputs.context,
                inputs.canyon_humidity,
                &parameters.humidity_band,
                inputs.indoor_temperature,
                inputs.pressure,
            );
            let dehumidify = controller.humidity_setpoint(
                SetpointFunction::Dehumidification,
                &inputs.context,
                inputs.canyon_humidity,
                &parameters.humidity_band,
                inputs.indoor_temperature,
                inputs.pressure,
            );
            Setpoints {
                heating,
                cooling,
                dehumidification: dehumidify.setpoint,
                humidification: humidify.setpoint,
                dehumidification_rh: dehumidify.relative_humidity,
                humidification_rh: humidify.relative_humidity,
                thermostat,
                humidistat: Some(SmartHumidistat {
                    humidification_weight: humidify.weight,
                    dehumidification_weight: dehumidify.weight,
                    relative_humidity_band: parameters.humidity_band,
                    humidity_ratio_band: humidify.band,
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::building::axes::DayType;
    use crate::core::building::building::tests::{controller, smart_parameters};
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn inputs(period: DayPeriod, occupancy: f64) -> SelectionInputs {
        SelectionInputs {
            period,
            context: ControlContext {
                occupancy,
                hour_of_day: if period == DayPeriod::Day { 10. } else { 2. },
                day_type: DayType::Weekday,
                season: Season::Winter,
            },
            canyon_temperature: 297.,
            canyon_humidity: 0.002,
            indoor_temperature: 293.15,
            pressure: 101_325.,
        }
    }

    #[rstest]
    #[case(DayPeriod::Day, 294.15, 297.15, 50., 40.)]
    #[case(DayPeriod::Night, 290.15, 299.15, 60., 30.)]
    fn fixed_mode_follows_schedule(
        smart_parameters: SmartBuildingParameters,
        controller: SmartSetpointController,
        #[case] period: DayPeriod,
        #[case] heating: f64,
        #[case] cooling: f64,
        #[case] dehumidification_rh: f64,
        #[case] humidification_rh: f64,
    ) {
        let setpoints = select_setpoints(&smart_parameters, &controller, &inputs(period, 0.04));

        assert_eq!(setpoints.heating, heating);
        assert_eq!(setpoints.cooling, cooling);
        assert_eq!(setpoints.dehumidification_rh, dehumidification_rh);
        assert_eq!(setpoints.humidification_rh, humidification_rh);
        assert_relative_eq!(
            setpoints.dehumidification,
            humidity_ratio_from_relative_humidity(dehumidification_rh, cooling, 101_325.)
        );
        assert_relative_eq!(
            setpoints.humidification,
            humidity_ratio_from_relative_humidity(humidification_rh, heating, 101_325.)
        );
        assert_eq!(setpoints.thermostat, None);
        assert_eq!(setpoints.humidistat, None);
    }

    #[rstest]
    fn smart_mode_reports_weights_and_bands(
        smart_parameters: SmartBuildingParameters,
        controller: SmartSetpointController,
    ) {
        let parameters = SmartBuildingParameters {
            thermostat: ControlMode::Smart,
            humidistat: ControlMode::Smart,
            ..smart_parameters
        };

        let setpoints = select_setpoints(&parameters, &controller, &inputs(DayPeriod::Day, 0.04));

        let thermostat = setpoints.thermostat.unwrap();
        assert!(thermostat.heating_weight > 0.);
        assert!(thermostat.cooling_weight > 0.);
        // canyon at 297 K lies above the heating band and below the cooling band, so a
        // positive weight pulls each setpoint to the nearer edge
        assert_eq!(setpoints.heating, parameters.heating_band.high);
        assert_eq!(setpoints.cooling, parameters.cooling_band.low);

        let humidistat = setpoints.humidistat.unwrap();
        assert_eq!(humidistat.relative_humidity_band, parameters.humidity_band);
        assert_eq!(setpoints.humidification, humidistat.humidity_ratio_band.low);
        assert!(setpoints.dehumidification >= humidistat.humidity_ratio_band.low_low);
        assert!(setpoints.dehumidification <= humidistat.humidity_ratio_band.high_high);
    }

    #[rstest]
    fn should_reject_out_of_order_bands(smart_parameters: SmartBuildingParameters) {
        assert!(smart_parameters.check_bands().is_ok());

        let inverted = SmartBuildingParameters {
            cooling_band: ComfortBand::new(300., 299., 298., 297.),
            ..smart_parameters
        };
        assert!(matches!(
            inverted.check_bands(),
            Err(ConfigurationError::SetpointBandOutOfOrder { band: "cooling", .. })
        ));
    }
}
