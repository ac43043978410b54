use crate::core::building::axes::{DayPeriod, DayType, HumidityMode, HvacMode};
use crate::core::building::envelope::LoadBreakdown;
use crate::core::building::setpoints::Setpoints;
use crate::core::comfort::ThermalComfort;
use crate::core::controls::smart_setpoint::ComfortBand;
use indexmap::IndexMap;

/// What the HVAC plant did during a timestep
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HvacOutcome {
    Cooling {
        /// temperature the plant held, in K
        setpoint: f64,
        breakdown: LoadBreakdown,
        /// electricity drawn by the refrigeration cycle, in W per m2 footprint
        consumption: f64,
        sensible_waste: f64,
        latent_waste: f64,
    },
    Heating {
        setpoint: f64,
        breakdown: LoadBreakdown,
        /// fuel drawn by the heating plant, in W per m2 footprint
        consumption: f64,
        sensible_waste: f64,
    },
    Neutral,
}

impl HvacOutcome {
    pub fn mode(&self) -> HvacMode {
        match self {
            Self::Cooling { .. } => HvacMode::Cooling,
            Self::Heating { .. } => HvacMode::Heating,
            Self::Neutral => HvacMode::Neutral,
        }
    }

    pub fn setpoint(&self) -> Option<f64> {
        match *self {
            Self::Cooling { setpoint, .. } | Self::Heating { setpoint, .. } => Some(setpoint),
            Self::Neutral => None,
        }
    }

    pub fn cooling_consumption(&self) -> f64 {
        match *self {
            Self::Cooling { consumption, .. } => consumption,
            _ => 0.,
        }
    }

    pub fn heating_consumption(&self) -> f64 {
        match *self {
            Self::Heating { consumption, .. } => consumption,
            _ => 0.,
        }
    }

    /// Sensible heat rejected to the canyon by cooling, heating and dehumidification
    pub fn sensible_waste(&self) -> f64 {
        match *self {
            Self::Cooling { sensible_waste, .. } | Self::Heating { sensible_waste, .. } => {
                sensible_waste
            }
            Self::Neutral => 0.,
        }
    }

    pub fn latent_waste(&self) -> f64 {
        match *self {
            Self::Cooling { latent_waste, .. } => latent_waste,
            _ => 0.,
        }
    }

    fn cooling_breakdown(&self) -> Option<&LoadBreakdown> {
        match self {
            Self::Cooling { breakdown, .. } => Some(breakdown),
            _ => None,
        }
    }

    fn heating_breakdown(&self) -> Option<&LoadBreakdown> {
        match self {
            Self::Heating { breakdown, .. } => Some(breakdown),
            _ => None,
        }
    }
}

/// Humidity setpoint that governed the latent demand
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GoverningHumidity {
    /// in kg/kg
    pub humidity_ratio: f64,
    /// in %
    pub relative_humidity: f64,
}

/// Heat fluxes for element calculations and record keeping, evaluated at the indoor
/// temperature from the start of the timestep
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fluxes {
    /// per unit wall area, in W/m2
    pub wall: f64,
    /// per unit ceiling area
    pub roof: f64,
    /// per unit mass area, including the radiant share of internal gains
    pub mass: f64,
    /// the remainder are per unit floor area
    pub solar: f64,
    pub window: f64,
    pub interior: f64,
    pub infiltration: f64,
    pub ventilation: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnergyUse {
    /// cooling plus appliances and lighting, in W per m2 floor
    pub electricity_total: f64,
    /// appliances and lighting, in W per m2 footprint
    pub domestic_electricity: f64,
    /// service hot water heating demand, in W per m2 footprint
    pub water_heating_demand: f64,
    pub water_waste_heat: f64,
    pub gas_waste_heat: f64,
    /// all sensible waste heat released to the canyon, in W per m2 footprint
    pub sensible_waste_total: f64,
    /// in W per m2 floor
    pub gas_total: f64,
}

/// Everything the building engine reports for one timestep. Power densities are per m2 of
/// building footprint unless noted otherwise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildingTimestep {
    pub day_period: DayPeriod,
    pub day_type: DayType,
    pub floor_count: f64,
    pub setpoints: Setpoints,
    /// in %
    pub outdoor_rh_at_canyon_temperature: f64,
    pub outdoor_rh_at_indoor_temperature: f64,
    pub internal_gain: f64,
    pub window_solar_gain: f64,
    pub sensible_cooling_demand: f64,
    pub sensible_heating_demand: f64,
    pub dehumidification_demand: f64,
    pub humidification_demand: f64,
    /// dehumidification less humidification
    pub latent_load: f64,
    pub humidity_mode: HumidityMode,
    pub governing_humidity: Option<GoverningHumidity>,
    pub hvac: HvacOutcome,
    /// in K
    pub indoor_temperature: f64,
    /// in kg/kg
    pub indoor_humidity: f64,
    /// in %
    pub indoor_relative_humidity: f64,
    /// in K
    pub mean_radiant_temperature: f64,
    pub comfort: ThermalComfort,
    pub fluxes: Fluxes,
    pub energy: EnergyUse,
}

pub type ResultColumns = IndexMap<&'static str, f64>;

impl BuildingTimestep {
    /// Flatten into named columns, writing NaN for values that do not apply this timestep.
    pub fn columns(&self) -> ResultColumns {
        let mut columns = ResultColumns::new();
        let mut put = |name: &'static str, value: f64| {
            columns.insert(name, value);
        };
        let absent = f64::NAN;
        let hvac = &self.hvac;
        let mode = hvac.mode();

        put("Night [-]", flag(self.day_period == DayPeriod::Night));
        put("Weekend [-]", flag(self.day_type.is_weekend()));
        put("Floors [-]", self.floor_count);
        put("Heating setpoint [K]", self.setpoints.heating);
        put("Cooling setpoint [K]", self.setpoints.cooling);
        put("Humidification setpoint [kg kg-1]", self.setpoints.humidification);
        put("Dehumidification setpoint [kg kg-1]", self.setpoints.dehumidification);
        put("Humidification RH setpoint [%]", self.setpoints.humidification_rh);
        put("Dehumidification RH setpoint [%]", self.setpoints.dehumidification_rh);
        put("Smart temperature setpoint [K]", hvac.setpoint().unwrap_or(absent));

        // smart diagnostics only apply while the plant is running
        let running = mode != HvacMode::Neutral;
        let thermostat = self.setpoints.thermostat.filter(|_| running);
        put("Heating weight [-]", thermostat.map_or(absent, |t| t.heating_weight));
        put("Cooling weight [-]", thermostat.map_or(absent, |t| t.cooling_weight));
        put_band(
            &mut put,
            ["Heating LowLow [K]", "Heating Low [K]", "Heating High [K]", "Heating HighHigh [K]"],
            thermostat
                .filter(|_| mode == HvacMode::Heating)
                .map(|t| t.heating_band),
        );
        put_band(
            &mut put,
            ["Cooling LowLow [K]", "Cooling Low [K]", "Cooling High [K]", "Cooling HighHigh [K]"],
            thermostat
                .filter(|_| mode == HvacMode::Cooling)
                .map(|t| t.cooling_band),
        );

        let humidistat = self.setpoints.humidistat.filter(|_| running);
        put("Humidification weight [-]", humidistat.map_or(absent, |h| h.humidification_weight));
        put(
            "Dehumidification weight [-]",
            humidistat.map_or(absent, |h| h.dehumidification_weight),
        );
        put_band(
            &mut put,
            ["RH LowLow [%]", "RH Low [%]", "RH High [%]", "RH HighHigh [%]"],
            humidistat.map(|h| h.relative_humidity_band),
        );
        put_band(
            &mut put,
            [
                "Humidity LowLow [kg kg-1]",
                "Humidity Low [kg kg-1]",
                "Humidity High [kg kg-1]",
                "Humidity HighHigh [kg kg-1]",
            ],
            humidistat.map(|h| h.humidity_ratio_band),
        );

        put("Outdoor RH at canyon temperature [%]", self.outdoor_rh_at_canyon_temperature);
        put("Outdoor RH at indoor temperature [%]", self.outdoor_rh_at_indoor_temperature);
        put("Internal gain [W m-2]", self.internal_gain);
        put("Window solar gain [W m-2]", self.window_solar_gain);
        put("Sensible cooling demand [W m-2]", self.sensible_cooling_demand);
        put("Sensible heating demand [W m-2]", self.sensible_heating_demand);
        put("Dehumidification demand [W m-2]", self.dehumidification_demand);
        put("Humidification demand [W m-2]", self.humidification_demand);
        put("Latent load [W m-2]", self.latent_load);
        put(
            "Governing humidity setpoint [kg kg-1]",
            self.governing_humidity.map_or(absent, |g| g.humidity_ratio),
        );
        put(
            "Governing RH setpoint [%]",
            self.governing_humidity.map_or(absent, |g| g.relative_humidity),
        );

        put("HVAC mode [-]", mode_code(mode));
        put_breakdown(
            &mut put,
            [
                "Wall cooling load [W m-2]",
                "Mass cooling load [W m-2]",
                "Window cooling load [W m-2]",
                "Ceiling cooling load [W m-2]",
                "Infiltration cooling load [W m-2]",
                "Ventilation cooling load [W m-2]",
            ],
            hvac.cooling_breakdown(),
        );
        put_breakdown(
            &mut put,
            [
                "Wall heating load [W m-2]",
                "Mass heating load [W m-2]",
                "Window heating load [W m-2]",
                "Ceiling heating load [W m-2]",
                "Infiltration heating load [W m-2]",
                "Ventilation heating load [W m-2]",
            ],
            hvac.heating_breakdown(),
        );
        put("Cooling consumption [W m-2]", hvac.cooling_consumption());
        put("Heating consumption [W m-2]", hvac.heating_consumption());
        put("HVAC sensible waste [W m-2]", hvac.sensible_waste());
        put("HVAC latent waste [W m-2]", hvac.latent_waste());

        put("Indoor temperature [K]", self.indoor_temperature);
        put("Indoor humidity [kg kg-1]", self.indoor_humidity);
        put("Indoor RH [%]", self.indoor_relative_humidity);
        put("Mean radiant temperature [K]", self.mean_radiant_temperature);
        put("PMV [-]", self.comfort.pmv);
        put("PPD [%]", self.comfort.ppd);

        let fluxes = &self.fluxes;
        put("Wall flux [W m-2]", fluxes.wall);
        put("Roof flux [W m-2]", fluxes.roof);
        put("Mass flux [W m-2]", fluxes.mass);
        put("Solar flux [W m-2]", fluxes.solar);
        put("Window flux [W m-2]", fluxes.window);
        put("Interior flux [W m-2]", fluxes.interior);
        put("Infiltration flux [W m-2]", fluxes.infiltration);
        put("Ventilation flux [W m-2]", fluxes.ventilation);

        let energy = &self.energy;
        put("Total electricity [W m-2]", energy.electricity_total);
        put("Domestic electricity [W m-2]", energy.domestic_electricity);
        put("Water heating demand [W m-2]", energy.water_heating_demand);
        put("Water heating waste [W m-2]", energy.water_waste_heat);
        put("Gas waste [W m-2]", energy.gas_waste_heat);
        put("Total sensible waste [W m-2]", energy.sensible_waste_total);
        put("Total gas [W m-2]", energy.gas_total);

        columns
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.
    } else {
        0.
    }
}

/// 1 cooling, -1 heating, 0 neutral
fn mode_code(mode: HvacMode) -> f64 {
    match mode {
        HvacMode::Cooling => 1.,
        HvacMode::Heating => -1.,
        HvacMode::Neutral => 0.,
    }
}

fn put_band(put: &mut impl FnMut(&'static str, f64), names: [&'static str; 4], band: Option<ComfortBand>) {
    let values = band.map_or([f64::NAN; 4], |b| [b.low_low, b.low, b.high, b.high_high]);
    for (name, value) in names.into_iter().zip(values) {
        put(name, value);
    }
}

fn put_breakdown(
    put: &mut impl FnMut(&'static str, f64),
    names: [&'static str; 6],
    breakdown: Option<&LoadBreakdown>,
) {
    let values = breakdown.map_or([f64::NAN; 6], |b| {
        [b.wall, b.mass, b.window, b.ceiling, b.infiltration, b.ventilation]
    });
    for (name, value) in names.into_iter().zip(values) {
        put(name, value);
    }
}
