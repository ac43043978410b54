use crate::core::building::building::Building;
use crate::core::building::results::{BuildingTimestep, ResultColumns};
use crate::core::controls::smart_setpoint::SmartSetpointController;
use crate::errors::ConfigurationError;
use crate::input::{Forcing, Input, SimulationSettings};
use crate::simulation_time::{SimulationTime, SimulationTimeIteration};
use crate::statistics::window_averages;
use indexmap::IndexMap;
use rayon::prelude::*;
use std::hash::Hash;
use tracing::{debug, info};

/// A configured building archetype together with the forcing series it is driven by
#[derive(Clone, Debug)]
pub struct Simulation {
    simulation_time: SimulationTime,
    settings: SimulationSettings,
    building: Building,
    forcing: Vec<Forcing>,
}

impl Simulation {
    pub fn from_input(input: Input) -> Result<Self, ConfigurationError> {
        input.check()?;

        let controller =
            SmartSetpointController::new(&input.time_of_use, input.simulation.implication)?;
        let building = Building::new(
            input.building,
            input.smart_control,
            controller,
            input.simulation.air_properties(),
            input.simulation.night_window(),
        )?;

        Ok(Self {
            simulation_time: input.simulation_time,
            settings: input.simulation,
            building,
            forcing: input.forcing,
        })
    }

    /// Step the building through every timestep in order.
    pub fn run(mut self) -> RunResults {
        info!(
            "Running {} timesteps of {} h",
            self.forcing.len(),
            self.simulation_time.step()
        );

        let timesteps = self
            .simulation_time
            .iter()
            .zip(self.forcing.iter())
            .map(|(clock, forcing)| {
                let result = self.building.step(&forcing.at(&clock));
                debug!(
                    "Timestep {}: {} at {} K indoors",
                    clock.index,
                    result.hvac.mode(),
                    result.indoor_temperature
                );
                TimestepRecord {
                    clock,
                    occupancy: forcing.occupancy,
                    result,
                }
            })
            .collect();

        RunResults {
            step: self.simulation_time.step(),
            spin_up_days: self.settings.spin_up_days,
            averaging_window_steps: self.settings.averaging_window_steps,
            timesteps,
        }
    }
}

/// Run independent cases concurrently, each with its own building. Results keep the order of
/// `cases`.
pub fn run_cases_in_parallel<K: Eq + Hash + Send>(
    cases: Vec<(K, Input)>,
) -> IndexMap<K, Result<RunResults, ConfigurationError>> {
    info!("Running {} cases in parallel", cases.len());

    cases
        .into_par_iter()
        .map(|(key, input)| {
            let results = Simulation::from_input(input).map(Simulation::run);
            (key, results)
        })
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
}

#[derive(Clone, Debug)]
pub struct TimestepRecord {
    pub clock: SimulationTimeIteration,
    /// in persons/m2
    pub occupancy: f64,
    pub result: BuildingTimestep,
}

impl TimestepRecord {
    pub fn columns(&self) -> ResultColumns {
        let mut columns = ResultColumns::new();
        columns.insert("Time [h]", self.clock.time);
        columns.insert("Month [-]", (self.clock.current_month() + 1) as f64);
        columns.insert("Occupancy [persons m-2]", self.occupancy);
        columns.extend(self.result.columns());
        columns
    }
}

#[derive(Clone, Debug)]
pub struct RunResults {
    /// in hours
    pub step: f64,
    pub spin_up_days: u32,
    pub averaging_window_steps: usize,
    pub timesteps: Vec<TimestepRecord>,
}

impl RunResults {
    /// Number of leading timesteps treated as spin-up
    pub fn spin_up_steps(&self) -> usize {
        (self.spin_up_days as f64 * 24. / self.step).round() as usize
    }

    /// Every timestep's columns averaged over consecutive windows of
    /// `averaging_window_steps`, spin-up included
    pub fn window_averages(&self) -> Vec<ResultColumns> {
        let rows = self.timesteps.iter().map(TimestepRecord::columns).collect::<Vec<_>>();
        window_averages(&rows, self.averaging_window_steps)
    }
}
