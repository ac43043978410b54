//! Monthly performance totals and window averages over the results of a run.
use crate::core::building::results::ResultColumns;
use crate::core::units::{power_series_to_kwh, KILOJOULES_PER_KILOWATT_HOUR, SECONDS_PER_HOUR};
use crate::corpus::{RunResults, TimestepRecord};
use itertools::Itertools;
use statrs::statistics::Statistics;

/// Energy in a cubic metre of natural gas, in kJ/m3
pub const NATURAL_GAS_HEATING_VALUE: f64 = 37_000.;

/// Energy totals for one calendar month of a run, per m2 of building footprint. Demands and
/// electricity are in kWh/m2, gas in m3/m2.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonthlySummary {
    /// one-based
    pub month: usize,
    pub timesteps: usize,
    pub sensible_heating_demand: f64,
    pub heating_gas: f64,
    pub sensible_cooling_demand: f64,
    pub cooling_electricity: f64,
    pub dehumidification_demand: f64,
    pub water_heating_demand: f64,
    /// gas burned for service hot water: the delivered demand plus the heater's waste heat,
    /// not the waste heat alone
    pub water_heating_gas: f64,
    pub domestic_electricity: f64,
    /// NaN-skipping means, in K and dimensionless
    pub mean_indoor_temperature: f64,
    pub mean_pmv: f64,
}

impl MonthlySummary {
    fn from_records(month: usize, records: &[&TimestepRecord], step_seconds: f64) -> Self {
        let total = |value: fn(&TimestepRecord) -> f64| {
            power_series_to_kwh(records.iter().map(|record| value(record)), step_seconds)
        };
        let gas = |kwh: f64| kwh * KILOJOULES_PER_KILOWATT_HOUR as f64 / NATURAL_GAS_HEATING_VALUE;

        Self {
            month,
            timesteps: records.len(),
            sensible_heating_demand: total(|r| r.result.sensible_heating_demand),
            heating_gas: gas(total(|r| r.result.hvac.heating_consumption())),
            sensible_cooling_demand: total(|r| r.result.sensible_cooling_demand),
            cooling_electricity: total(|r| r.result.hvac.cooling_consumption()),
            dehumidification_demand: total(|r| r.result.dehumidification_demand.abs()),
            water_heating_demand: total(|r| r.result.energy.water_heating_demand),
            water_heating_gas: gas(total(|r| {
                r.result.energy.water_heating_demand + r.result.energy.water_waste_heat
            })),
            domestic_electricity: total(|r| r.result.energy.domestic_electricity),
            mean_indoor_temperature: nan_mean(records.iter().map(|r| r.result.indoor_temperature)),
            mean_pmv: nan_mean(records.iter().map(|r| r.result.comfort.pmv)),
        }
    }

    pub fn columns(&self) -> ResultColumns {
        ResultColumns::from([
            ("Month [-]", self.month as f64),
            ("Timesteps [-]", self.timesteps as f64),
            ("Sensible heating demand [kWh m-2]", self.sensible_heating_demand),
            ("Heating gas [m3 m-2]", self.heating_gas),
            ("Sensible cooling demand [kWh m-2]", self.sensible_cooling_demand),
            ("Cooling electricity [kWh m-2]", self.cooling_electricity),
            ("Dehumidification demand [kWh m-2]", self.dehumidification_demand),
            ("Water heating demand [kWh m-2]", self.water_heating_demand),
            ("Water heating gas [m3 m-2]", self.water_heating_gas),
            ("Domestic electricity [kWh m-2]", self.domestic_electricity),
            ("Mean indoor temperature [K]", self.mean_indoor_temperature),
            ("Mean PMV [-]", self.mean_pmv),
        ])
    }
}

/// Totals per calendar month, after discarding the spin-up period at the start of the run
pub fn monthly_summaries(results: &RunResults) -> Vec<MonthlySummary> {
    let step_seconds = results.step * SECONDS_PER_HOUR as f64;

    results
        .timesteps
        .iter()
        .skip(results.spin_up_steps())
        .chunk_by(|record| record.clock.current_month())
        .into_iter()
        .map(|(month, records)| {
            MonthlySummary::from_records(month + 1, &records.collect_vec(), step_seconds)
        })
        .collect()
}

/// Mean of every column over consecutive windows of `window` rows, ignoring NaN entries. A
/// column with no finite entries in a window averages to NaN.
pub fn window_averages(rows: &[ResultColumns], window: usize) -> Vec<ResultColumns> {
    if window == 0 {
        return vec![];
    }

    rows.chunks(window)
        .map(|chunk| {
            chunk[0]
                .keys()
                .map(|&name| {
                    let values = chunk.iter().filter_map(|row| row.get(name).copied());
                    (name, nan_mean(values))
                })
                .collect()
        })
        .collect()
}

fn nan_mean(values: impl IntoIterator<Item = f64>) -> f64 {
    values
        .into_iter()
        .filter(|value| !value.is_nan())
        .collect_vec()
        .mean()
}
