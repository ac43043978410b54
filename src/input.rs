use crate::core::building::axes::NightWindow;
use crate::core::building::building::{
    AuxiliaryLoads, BuildingParameters, CanyonConditions, FacadeIrradiance, InteriorSurfaces,
    Meteorology, TimestepInput,
};
use crate::core::building::setpoints::SmartBuildingParameters;
use crate::core::controls::fuzzy::{Implication, Tier};
use crate::core::material_properties::{AirProperties, AIR};
use crate::errors::ConfigurationError;
use crate::simulation_time::{SimulationTime, SimulationTimeIteration};
use serde::Deserialize;
use serde_valid::Validate;
use std::io::Read;

/// Read, validate and cross-check a JSON input before anything is simulated.
pub fn ingest_for_processing(json: impl Read) -> Result<Input, ConfigurationError> {
    let input: Input = serde_json::from_reader(json)
        .map_err(|err| ConfigurationError::Unreadable(err.to_string()))?;
    input
        .validate()
        .map_err(|err| ConfigurationError::OutOfRange(err.to_string()))?;
    input.check()?;

    Ok(input)
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Input {
    #[validate]
    pub simulation_time: SimulationTime,
    #[serde(default)]
    #[validate]
    pub simulation: SimulationSettings,
    #[validate]
    pub building: BuildingParameters,
    #[validate]
    pub smart_control: SmartBuildingParameters,
    pub time_of_use: TimeOfUse,
    /// one record per timestep of `simulation_time`
    pub forcing: Vec<Forcing>,
}

impl Input {
    /// Cross-field checks that field-level validation cannot express
    pub fn check(&self) -> Result<(), ConfigurationError> {
        if self.forcing.is_empty() {
            return Err(ConfigurationError::NoTimesteps);
        }
        let expected = self.simulation_time.total_steps();
        if expected != self.forcing.len() {
            return Err(ConfigurationError::ForcingLengthMismatch {
                expected,
                found: self.forcing.len(),
            });
        }

        self.smart_control.check_bands()
    }
}

fn default_night_start() -> f64 {
    19.
}

fn default_night_end() -> f64 {
    7.
}

fn default_air_specific_heat_capacity() -> f64 {
    AIR.specific_heat_capacity()
}

fn default_latent_heat_of_vaporisation() -> f64 {
    AIR.latent_heat_of_vaporisation()
}

fn default_spin_up_days() -> u32 {
    3
}

fn default_averaging_window_steps() -> usize {
    24
}

/// Run-wide settings, all of which have defaults
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct SimulationSettings {
    /// hour of day at which night begins
    #[serde(default = "default_night_start")]
    #[validate(minimum = 0.)]
    #[validate(maximum = 24.)]
    pub night_start: f64,
    /// hour of day at which night ends
    #[serde(default = "default_night_end")]
    #[validate(minimum = 0.)]
    #[validate(maximum = 24.)]
    pub night_end: f64,
    /// in J/(kg.K)
    #[serde(default = "default_air_specific_heat_capacity")]
    #[validate(exclusive_minimum = 0.)]
    pub air_specific_heat_capacity: f64,
    /// in J/kg
    #[serde(default = "default_latent_heat_of_vaporisation")]
    #[validate(exclusive_minimum = 0.)]
    pub latent_heat_of_vaporisation: f64,
    /// days discarded from the start of a run before summarising
    #[serde(default = "default_spin_up_days")]
    pub spin_up_days: u32,
    /// timesteps per window of the averaged results
    #[serde(default = "default_averaging_window_steps")]
    #[validate(minimum = 1)]
    pub averaging_window_steps: usize,
    #[serde(default)]
    pub implication: Implication,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            night_start: default_night_start(),
            night_end: default_night_end(),
            air_specific_heat_capacity: default_air_specific_heat_capacity(),
            latent_heat_of_vaporisation: default_latent_heat_of_vaporisation(),
            spin_up_days: default_spin_up_days(),
            averaging_window_steps: default_averaging_window_steps(),
            implication: Default::default(),
        }
    }
}

impl SimulationSettings {
    pub fn night_window(&self) -> NightWindow {
        NightWindow::new(self.night_start, self.night_end)
    }

    pub fn air_properties(&self) -> AirProperties {
        AirProperties::new(
            self.air_specific_heat_capacity,
            self.latent_heat_of_vaporisation,
        )
    }
}

/// Hour boundaries of the three price tiers, as 2 or 4 values each. A pair `[s, e]` covers
/// hours `s..=e`; four values describe two such windows.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PriceWindows {
    pub low: Vec<f64>,
    pub medium: Vec<f64>,
    pub high: Vec<f64>,
}

impl PriceWindows {
    pub fn for_tier(&self, tier: Tier) -> &[f64] {
        match tier {
            Tier::Low => &self.low,
            Tier::Medium => &self.medium,
            Tier::High => &self.high,
        }
    }
}

/// Time-of-use tariff schedule
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TimeOfUse {
    pub summer: PriceWindows,
    pub winter: PriceWindows,
}

/// Per-timestep boundary conditions, with the clock supplied by the simulation time
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Forcing {
    /// in persons/m2
    pub occupancy: f64,
    pub canyon: CanyonConditions,
    pub meteorology: Meteorology,
    pub irradiance: FacadeIrradiance,
    pub surfaces: InteriorSurfaces,
    pub loads: AuxiliaryLoads,
}

impl Forcing {
    pub fn at(&self, clock: &SimulationTimeIteration) -> TimestepInput {
        TimestepInput {
            julian_day: clock.julian_day(),
            seconds_of_day: clock.seconds_of_day(),
            occupancy: self.occupancy,
            canyon: self.canyon,
            meteorology: self.meteorology,
            irradiance: self.irradiance,
            surfaces: self.surfaces,
            loads: self.loads,
        }
    }
}
