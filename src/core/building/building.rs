use crate::compare_floats::max_of_2;
use crate::core::building::axes::{
    CondenserType, DayPeriod, DayType, HumidityMode, HvacMode, NightWindow,
};
use crate::core::building::envelope::{
    Envelope, SurfaceTemperatures, ThermalCoupling, CEILING_CONVECTIVE_COEFFICIENT,
    MASS_CONVECTIVE_COEFFICIENT, WALL_CONVECTIVE_COEFFICIENT,
};
use crate::core::building::results::{
    BuildingTimestep, EnergyUse, Fluxes, GoverningHumidity, HvacOutcome,
};
use crate::core::building::setpoints::{select_setpoints, SelectionInputs, SmartBuildingParameters};
use crate::core::comfort::{predicted_mean_vote, OccupantConditions};
use crate::core::controls::smart_setpoint::{ControlContext, SmartSetpointController};
use crate::core::material_properties::{
    service_hot_water_temperature, AirProperties, WATER_SPECIFIC_HEAT_CAPACITY,
};
use crate::core::psychrometrics::{moist_air_density, psychrometrics};
use crate::core::units::{kelvin_to_celsius, seconds_to_hours, SECONDS_PER_HOUR};
use crate::errors::ConfigurationError;
use serde::Deserialize;
use serde_valid::Validate;
use tracing::{debug, warn};

/// Share of the compressor work rejected by a water-cooled condenser that leaves as latent heat
const EVAPORATIVE_EFFICIENCY: f64 = 1.;

fn default_initial_indoor_humidity() -> f64 {
    // 40 % relative humidity at 20 degC
    0.006
}

/// Envelope and plant description of the building archetype
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct BuildingParameters {
    /// in m
    #[validate(exclusive_minimum = 0.)]
    pub floor_height: f64,
    /// internal sensible gains per unit floor area, in W/m2
    #[validate(minimum = 0.)]
    pub internal_gain_day: f64,
    #[validate(minimum = 0.)]
    pub internal_gain_night: f64,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub internal_gain_radiant_fraction: f64,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub internal_gain_latent_fraction: f64,
    /// air changes per hour
    #[validate(minimum = 0.)]
    pub infiltration: f64,
    /// in m3/s per m2 floor area
    #[validate(minimum = 0.)]
    pub ventilation: f64,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub glazing_ratio: f64,
    /// including film coefficients, in W/(m2.K)
    #[validate(minimum = 0.)]
    pub window_u_value: f64,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub window_shgc: f64,
    #[serde(default)]
    pub condenser_type: CondenserType,
    #[validate(minimum = 0.)]
    pub cop: f64,
    /// fraction of fuel energy delivered as heat
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub heating_efficiency: f64,
    /// in K
    pub initial_indoor_temperature: f64,
    /// in kg/kg
    #[serde(default = "default_initial_indoor_humidity")]
    #[validate(minimum = 0.)]
    pub initial_indoor_humidity: f64,
}

/// Urban canyon air and geometry
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CanyonConditions {
    /// in K
    pub temperature: f64,
    /// in kg/kg
    pub humidity_ratio: f64,
    /// canyon (building) height, in m
    pub height: f64,
    /// roof width, in m
    pub roof_width: f64,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Meteorology {
    /// in Pa
    pub pressure: f64,
    /// mains water temperature, in K
    pub water_temperature: f64,
}

/// Shortwave radiation received by the facades, in W/m2
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FacadeIrradiance {
    pub sunlit_wall: f64,
    pub shaded_wall: f64,
}

/// Interior surface temperatures supplied by the envelope conduction model, in K
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct InteriorSurfaces {
    pub sunlit_wall: f64,
    pub shaded_wall: f64,
    pub impervious_roof: f64,
    pub vegetated_roof: f64,
    /// outer layer of the internal thermal mass
    pub mass: f64,
    pub impervious_roof_fraction: f64,
    pub vegetated_roof_fraction: f64,
}

/// Non-HVAC loads per unit floor area
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AuxiliaryLoads {
    /// in W/m2
    pub electricity: f64,
    pub lighting: f64,
    pub gas: f64,
    /// service hot water draw, in kg/h per m2
    pub solar_hot_water: f64,
}

/// Boundary conditions for one timestep
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TimestepInput {
    pub julian_day: u32,
    pub seconds_of_day: f64,
    /// in persons/m2
    pub occupancy: f64,
    pub canyon: CanyonConditions,
    pub meteorology: Meteorology,
    pub irradiance: FacadeIrradiance,
    pub surfaces: InteriorSurfaces,
    pub loads: AuxiliaryLoads,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndoorState {
    /// in K
    pub temperature: f64,
    /// in kg/kg
    pub humidity_ratio: f64,
}

/// A building archetype whose indoor air carries over between timesteps
#[derive(Clone, Debug)]
pub struct Building {
    parameters: BuildingParameters,
    smart: SmartBuildingParameters,
    controller: SmartSetpointController,
    air: AirProperties,
    night: NightWindow,
    state: IndoorState,
}

impl Building {
    pub fn new(
        parameters: BuildingParameters,
        smart: SmartBuildingParameters,
        controller: SmartSetpointController,
        air: AirProperties,
        night: NightWindow,
    ) -> Result<Self, ConfigurationError> {
        smart.check_bands()?;

        Ok(Self {
            state: IndoorState {
                temperature: parameters.initial_indoor_temperature,
                humidity_ratio: parameters.initial_indoor_humidity,
            },
            parameters,
            smart,
            controller,
            air,
            night,
        })
    }

    pub fn indoor_state(&self) -> IndoorState {
        self.state
    }

    /// Evaluate a timestep and carry the new indoor state into the next one.
    pub fn step(&mut self, input: &TimestepInput) -> BuildingTimestep {
        let result = self.evaluate(input);

        if !(result.indoor_temperature.is_finite() && result.indoor_humidity.is_finite()) {
            warn!(
                "Non-finite indoor state on day {} at {} s: {} K, {} kg/kg",
                input.julian_day,
                input.seconds_of_day,
                result.indoor_temperature,
                result.indoor_humidity
            );
        }

        self.state = IndoorState {
            temperature: result.indoor_temperature,
            humidity_ratio: result.indoor_humidity,
        };

        result
    }

    /// Evaluate a timestep against the current indoor state without changing it.
    pub fn evaluate(&self, input: &TimestepInput) -> BuildingTimestep {
        let parameters = &self.parameters;
        let previous = self.state;
        let canyon = &input.canyon;
        let pressure = input.meteorology.pressure;

        let hour = seconds_to_hours(input.seconds_of_day);
        let day_period = self.night.period(hour);
        let day_type = DayType::from_julian_day(input.julian_day);

        let outdoor_rh_at_canyon_temperature =
            psychrometrics(canyon.temperature, canyon.humidity_ratio, pressure).relative_humidity;
        let outdoor_rh_at_indoor_temperature =
            psychrometrics(previous.temperature, canyon.humidity_ratio, pressure)
                .relative_humidity;

        let envelope = Envelope::new(parameters, canyon);
        let floors = envelope.floor_count;
        let surfaces = SurfaceTemperatures::from(&input.surfaces);
        let density = moist_air_density(pressure, previous.temperature, previous.humidity_ratio);
        let coupling = ThermalCoupling::new(
            envelope,
            surfaces,
            canyon.temperature,
            parameters.window_u_value,
            &self.air,
            density,
        );

        let setpoints = select_setpoints(
            &self.smart,
            &self.controller,
            &SelectionInputs {
                period: day_period,
                context: ControlContext {
                    occupancy: input.occupancy,
                    hour_of_day: hour,
                    day_type,
                    season: self.smart.season,
                },
                canyon_temperature: canyon.temperature,
                canyon_humidity: canyon.humidity_ratio,
                indoor_temperature: previous.temperature,
                pressure,
            },
        );

        let internal_gain = match day_period {
            DayPeriod::Day => parameters.internal_gain_day,
            DayPeriod::Night => parameters.internal_gain_night,
        } * floors;
        let latent_internal_gain = internal_gain * parameters.internal_gain_latent_fraction;
        let window_solar_gain = (input.irradiance.sunlit_wall + input.irradiance.shaded_wall) / 2.
            * parameters.window_shgc
            * envelope.window_area;

        // sensible heat the plant must remove to hold indoor air at `t`
        let sensible_load =
            |t: f64| coupling.breakdown_at(t).total() + internal_gain + window_solar_gain;
        let mut sensible_cooling_demand = max_of_2(sensible_load(setpoints.cooling), 0.);
        let mut sensible_heating_demand = max_of_2(-sensible_load(setpoints.heating), 0.);

        let latent_conductance = self
            .air
            .latent_conductance(envelope.outdoor_air_flow(), density);
        let moisture_load = |q: f64| {
            latent_conductance * (canyon.humidity_ratio - q) + latent_internal_gain
        };
        let mut dehumidification_demand =
            max_of_2(moisture_load(setpoints.dehumidification), 0.);
        let mut humidification_demand = max_of_2(-moisture_load(setpoints.humidification), 0.);

        let humidity_mode = HumidityMode::resolve(dehumidification_demand, humidification_demand);
        let governing_humidity = match humidity_mode {
            HumidityMode::Dehumidifying => {
                humidification_demand = 0.;
                Some(GoverningHumidity {
                    humidity_ratio: setpoints.dehumidification,
                    relative_humidity: setpoints.dehumidification_rh,
                })
            }
            HumidityMode::Humidifying => {
                dehumidification_demand = 0.;
                Some(GoverningHumidity {
                    humidity_ratio: setpoints.humidification,
                    relative_humidity: setpoints.humidification_rh,
                })
            }
            HumidityMode::Neutral => None,
        };
        let latent_load = dehumidification_demand - humidification_demand;

        let mode = HvacMode::resolve(
            sensible_cooling_demand,
            sensible_heating_demand,
            canyon.temperature,
        );
        debug!(
            "{mode} with {humidity_mode} humidity at canyon temperature {} K",
            canyon.temperature
        );
        let hvac = match mode {
            HvacMode::Cooling => {
                sensible_heating_demand = 0.;
                let removed = max_of_2(sensible_cooling_demand + dehumidification_demand, 0.);
                // coefficient of performance: heat removed per unit of work
                let consumption = removed / parameters.cop;
                // the removed heat is reported on both sides of a water-cooled condenser; only
                // the compressor work is split by the evaporative efficiency
                let (sensible_waste, latent_waste) = match parameters.condenser_type {
                    CondenserType::AirCooled => (removed + consumption, 0.),
                    CondenserType::WaterCooled => (
                        removed + consumption * (1. - EVAPORATIVE_EFFICIENCY),
                        removed + consumption * EVAPORATIVE_EFFICIENCY,
                    ),
                };
                HvacOutcome::Cooling {
                    setpoint: setpoints.cooling,
                    breakdown: coupling.breakdown_at(setpoints.cooling),
                    consumption,
                    sensible_waste,
                    latent_waste,
                }
            }
            HvacMode::Heating => {
                sensible_cooling_demand = 0.;
                let delivered = sensible_heating_demand + humidification_demand;
                let consumption = delivered / parameters.heating_efficiency;
                HvacOutcome::Heating {
                    setpoint: setpoints.heating,
                    breakdown: coupling.breakdown_at(setpoints.heating),
                    consumption,
                    sensible_waste: consumption - delivered,
                }
            }
            HvacMode::Neutral => {
                // only reachable with both positive when the setpoints are inverted
                if sensible_cooling_demand > 0. && sensible_heating_demand > 0. {
                    sensible_cooling_demand = 0.;
                    sensible_heating_demand = 0.;
                }
                HvacOutcome::Neutral
            }
        };

        let net_heat_removal =
            -internal_gain - window_solar_gain - sensible_heating_demand + sensible_cooling_demand;
        let indoor_temperature = coupling.balance_temperature(net_heat_removal);

        let net_moisture_removal = latent_load - latent_internal_gain;
        let indoor_humidity = (latent_conductance * canyon.humidity_ratio - net_moisture_removal)
            / latent_conductance;

        let indoor_relative_humidity =
            psychrometrics(indoor_temperature, indoor_humidity, pressure).relative_humidity;
        let mean_radiant_temperature = surfaces.mean_radiant_temperature(&envelope);
        let comfort = predicted_mean_vote(
            kelvin_to_celsius(indoor_temperature),
            indoor_relative_humidity,
            OccupantConditions::for_season(self.smart.season),
            kelvin_to_celsius(mean_radiant_temperature),
        );

        let t_prev = previous.temperature;
        let radiant_internal_gain = internal_gain * parameters.internal_gain_radiant_fraction;
        let fluxes = Fluxes {
            wall: WALL_CONVECTIVE_COEFFICIENT * (t_prev - surfaces.wall),
            roof: CEILING_CONVECTIVE_COEFFICIENT * (t_prev - surfaces.ceiling),
            mass: MASS_CONVECTIVE_COEFFICIENT * (t_prev - surfaces.mass)
                + radiant_internal_gain / envelope.mass_area,
            solar: window_solar_gain / floors,
            window: coupling.window_conductance() * (canyon.temperature - t_prev) / floors,
            interior: radiant_internal_gain * (1. - parameters.internal_gain_latent_fraction)
                / floors,
            infiltration: coupling.infiltration_conductance() * (canyon.temperature - t_prev)
                / floors,
            ventilation: coupling.ventilation_conductance() * (canyon.temperature - t_prev)
                / floors,
        };

        let energy = self.energy_use(input, floors, &hvac);

        BuildingTimestep {
            day_period,
            day_type,
            floor_count: floors,
            setpoints,
            outdoor_rh_at_canyon_temperature,
            outdoor_rh_at_indoor_temperature,
            internal_gain,
            window_solar_gain,
            sensible_cooling_demand,
            sensible_heating_demand,
            dehumidification_demand,
            humidification_demand,
            latent_load,
            humidity_mode,
            governing_humidity,
            hvac,
            indoor_temperature,
            indoor_humidity,
            indoor_relative_humidity,
            mean_radiant_temperature,
            comfort,
            fluxes,
            energy,
        }
    }

    fn energy_use(&self, input: &TimestepInput, floors: f64, hvac: &HvacOutcome) -> EnergyUse {
        let loads = &input.loads;
        let efficiency = self.parameters.heating_efficiency;

        let hot_water_mass_flow = loads.solar_hot_water * floors / SECONDS_PER_HOUR as f64;
        let water_heating_demand = hot_water_mass_flow
            * WATER_SPECIFIC_HEAT_CAPACITY
            * (service_hot_water_temperature() - input.meteorology.water_temperature);
        let water_waste_heat = (1. / efficiency - 1.) * water_heating_demand;
        let gas_waste_heat = loads.gas * (1. - efficiency) * floors;

        EnergyUse {
            electricity_total: hvac.cooling_consumption() / floors
                + loads.electricity
                + loads.lighting,
            domestic_electricity: floors * (loads.electricity + loads.lighting),
            water_heating_demand,
            water_waste_heat,
            gas_waste_heat,
            sensible_waste_total: hvac.sensible_waste() + water_waste_heat + gas_waste_heat,
            gas_total: loads.gas
                + water_heating_demand / floors / efficiency
                + hvac.heating_consumption() / floors,
        }
    }
}
