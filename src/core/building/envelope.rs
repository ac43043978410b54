// Envelope geometry normalised to unit building footprint, and the sensible heat exchange
// between indoor air and each element at a trial indoor temperature.

use crate::compare_floats::max_of_2;
use crate::core::building::building::{BuildingParameters, CanyonConditions, InteriorSurfaces};
use crate::core::material_properties::AirProperties;
use crate::core::units::SECONDS_PER_HOUR;

/// Indoor convective heat transfer coefficients, in W/(m2.K). Taken as independent of the
/// surface-to-air temperature difference.
pub(crate) const WALL_CONVECTIVE_COEFFICIENT: f64 = 3.076;
pub(crate) const MASS_CONVECTIVE_COEFFICIENT: f64 = 0.948;
pub(crate) const CEILING_CONVECTIVE_COEFFICIENT: f64 = 0.948;

/// Areas (m2) and air flows (m3/s) per m2 of building footprint
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Envelope {
    pub floor_count: f64,
    pub wall_area: f64,
    pub window_area: f64,
    /// floors and intermediate ceilings, both faces
    pub mass_area: f64,
    pub ceiling_area: f64,
    pub infiltration_flow: f64,
    pub ventilation_flow: f64,
}

impl Envelope {
    pub fn new(parameters: &BuildingParameters, canyon: &CanyonConditions) -> Self {
        let floor_count = max_of_2(canyon.height / parameters.floor_height, 1.);
        let facade_area = 2. * canyon.height / canyon.roof_width.abs();

        Self {
            floor_count,
            wall_area: facade_area * (1. - parameters.glazing_ratio),
            window_area: facade_area * parameters.glazing_ratio,
            mass_area: 2. * floor_count - 1.,
            ceiling_area: 1.,
            infiltration_flow: parameters.infiltration * canyon.height / SECONDS_PER_HOUR as f64,
            ventilation_flow: parameters.ventilation * floor_count,
        }
    }

    pub fn outdoor_air_flow(&self) -> f64 {
        self.infiltration_flow + self.ventilation_flow
    }
}

/// Representative interior surface temperatures, in K
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SurfaceTemperatures {
    pub wall: f64,
    pub ceiling: f64,
    pub mass: f64,
}

impl From<&InteriorSurfaces> for SurfaceTemperatures {
    fn from(surfaces: &InteriorSurfaces) -> Self {
        Self {
            wall: (surfaces.sunlit_wall + surfaces.shaded_wall) / 2.,
            ceiling: surfaces.impervious_roof_fraction * surfaces.impervious_roof
                + surfaces.vegetated_roof_fraction * surfaces.vegetated_roof,
            mass: surfaces.mass,
        }
    }
}

impl SurfaceTemperatures {
    /// Area-weighted mean of wall, ceiling and mass surface temperatures, in K
    pub fn mean_radiant_temperature(&self, envelope: &Envelope) -> f64 {
        (self.wall * envelope.wall_area
            + self.ceiling * envelope.ceiling_area
            + self.mass * envelope.mass_area)
            / (envelope.wall_area + envelope.ceiling_area + envelope.mass_area)
    }
}

/// Sensible heat flowing into the indoor air from each element, in W per m2 of footprint
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LoadBreakdown {
    pub wall: f64,
    pub mass: f64,
    pub window: f64,
    pub ceiling: f64,
    pub infiltration: f64,
    pub ventilation: f64,
}

impl LoadBreakdown {
    pub fn total(&self) -> f64 {
        self.wall + self.mass + self.window + self.ceiling + self.infiltration + self.ventilation
    }
}

/// Linear coupling of indoor air to the envelope surfaces and to canyon air.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ThermalCoupling {
    envelope: Envelope,
    surfaces: SurfaceTemperatures,
    canyon_temperature: f64,
    window_u_value: f64,
    infiltration_conductance: f64,
    ventilation_conductance: f64,
}

impl ThermalCoupling {
    pub fn new(
        envelope: Envelope,
        surfaces: SurfaceTemperatures,
        canyon_temperature: f64,
        window_u_value: f64,
        air: &AirProperties,
        air_density: f64,
    ) -> Self {
        Self {
            envelope,
            surfaces,
            canyon_temperature,
            window_u_value,
            infiltration_conductance: air
                .sensible_conductance(envelope.infiltration_flow, air_density),
            ventilation_conductance: air
                .sensible_conductance(envelope.ventilation_flow, air_density),
        }
    }

    /// Heat gained by indoor air held at `indoor_temperature`, per element
    pub fn breakdown_at(&self, indoor_temperature: f64) -> LoadBreakdown {
        let t = indoor_temperature;
        let t_can = self.canyon_temperature;
        LoadBreakdown {
            wall: self.envelope.wall_area * WALL_CONVECTIVE_COEFFICIENT * (self.surfaces.wall - t),
            mass: self.envelope.mass_area * MASS_CONVECTIVE_COEFFICIENT * (self.surfaces.mass - t),
            window: self.envelope.window_area * self.window_u_value * (t_can - t),
            ceiling: self.envelope.ceiling_area
                * CEILING_CONVECTIVE_COEFFICIENT
                * (self.surfaces.ceiling - t),
            infiltration: self.infiltration_conductance * (t_can - t),
            ventilation: self.ventilation_conductance * (t_can - t),
        }
    }

    /// Sum of conductances coupling indoor air to its surroundings, in W/K per m2 footprint
    fn total_conductance(&self) -> f64 {
        self.envelope.wall_area * WALL_CONVECTIVE_COEFFICIENT
            + self.envelope.mass_area * MASS_CONVECTIVE_COEFFICIENT
            + self.envelope.ceiling_area * CEILING_CONVECTIVE_COEFFICIENT
            + self.envelope.window_area * self.window_u_value
            + self.infiltration_conductance
            + self.ventilation_conductance
    }

    /// Conductance-weighted sum of the temperatures indoor air is coupled to
    fn weighted_boundary_temperature(&self) -> f64 {
        self.surfaces.wall * self.envelope.wall_area * WALL_CONVECTIVE_COEFFICIENT
            + self.surfaces.mass * self.envelope.mass_area * MASS_CONVECTIVE_COEFFICIENT
            + self.surfaces.ceiling * self.envelope.ceiling_area * CEILING_CONVECTIVE_COEFFICIENT
            + self.canyon_temperature * self.envelope.window_area * self.window_u_value
            + self.canyon_temperature * (self.infiltration_conductance + self.ventilation_conductance)
    }

    /// Indoor air temperature at which the envelope exchange balances `net_removal`, the heat
    /// removed from the air net of gains (W per m2 footprint). No air capacitance is modelled.
    pub fn balance_temperature(&self, net_removal: f64) -> f64 {
        (self.weighted_boundary_temperature() - net_removal) / self.total_conductance()
    }

    pub fn window_conductance(&self) -> f64 {
        self.envelope.window_area * self.window_u_value
    }

    pub fn infiltration_conductance(&self) -> f64 {
        self.infiltration_conductance
    }

    pub fn ventilation_conductance(&self) -> f64 {
        self.ventilation_conductance
    }
}
