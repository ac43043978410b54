use crate::core::units::celsius_to_kelvin;

/// This module contains data on the physical properties of moist air and water used by the
/// building energy balance.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AirProperties {
    /// specific heat capacity of air at constant pressure, J/(kg.K)
    specific_heat_capacity: f64,
    /// latent heat of vaporisation of water, J/kg
    latent_heat_of_vaporisation: f64,
}

impl AirProperties {
    pub fn new(specific_heat_capacity: f64, latent_heat_of_vaporisation: f64) -> Self {
        Self {
            specific_heat_capacity,
            latent_heat_of_vaporisation,
        }
    }

    pub fn specific_heat_capacity(&self) -> f64 {
        self.specific_heat_capacity
    }

    pub fn latent_heat_of_vaporisation(&self) -> f64 {
        self.latent_heat_of_vaporisation
    }

    /// Sensible heat carried per kelvin by a volumetric air flow, in W/K per m2 of footprint
    ///
    /// Arguments:
    /// * `volumetric_flow` - air volume flow rate, in m3/s per m2 of footprint
    /// * `density` - moist air density, in kg/m3
    pub fn sensible_conductance(&self, volumetric_flow: f64, density: f64) -> f64 {
        volumetric_flow * density * self.specific_heat_capacity
    }

    /// Latent heat carried per unit humidity ratio by a volumetric air flow, in W per m2 of
    /// footprint per (kg/kg)
    pub fn latent_conductance(&self, volumetric_flow: f64, density: f64) -> f64 {
        volumetric_flow * density * self.latent_heat_of_vaporisation
    }
}

impl Default for AirProperties {
    fn default() -> Self {
        AIR
    }
}

pub const AIR: AirProperties = AirProperties {
    specific_heat_capacity: 1004.,
    latent_heat_of_vaporisation: 2.26e6,
};

/// specific heat capacity of water, J/(kg.K)
pub const WATER_SPECIFIC_HEAT_CAPACITY: f64 = 4200.;

/// Temperature of service hot water, assuming no storage, in K
pub fn service_hot_water_temperature() -> f64 {
    celsius_to_kelvin(49.)
}
