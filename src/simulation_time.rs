use crate::core::units::{HOURS_PER_DAY, SECONDS_PER_HOUR};
use serde::Deserialize;
use serde_valid::Validate;

const HOURS_PER_YEAR: f64 = 8760.;

// Hour of the year at which each month starts; the 13th entry closes December.
const MONTH_START_END_HOURS: [u32; 13] = [
    0, 744, 1416, 2160, 2880, 3624, 4344, 5088, 5832, 6552, 7296, 8016, 8760,
];

/// Simulated period, in hours from the start of the year
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct SimulationTime {
    #[serde(rename(deserialize = "start"))]
    start_time: f64,
    #[serde(rename(deserialize = "end"))]
    end_time: f64,
    #[validate(exclusive_minimum = 0.)]
    step: f64,
}

impl SimulationTime {
    pub fn new(start_time: f64, end_time: f64, step: f64) -> Self {
        Self {
            start_time,
            end_time,
            step,
        }
    }

    pub fn total_steps(&self) -> usize {
        ((self.end_time - self.start_time) / self.step).ceil().max(0.) as usize
    }

    /// Length of a timestep, in hours
    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn step_in_seconds(&self) -> f64 {
        self.step * SECONDS_PER_HOUR as f64
    }

    pub fn iter(&self) -> SimulationTimeIterator {
        SimulationTimeIterator::from(*self)
    }
}

#[derive(Clone, Debug)]
pub struct SimulationTimeIterator {
    current_index: usize,
    total_steps: usize,
    simulation_time: SimulationTime,
}

impl SimulationTimeIterator {
    fn from(simulation_time: SimulationTime) -> Self {
        SimulationTimeIterator {
            current_index: 0,
            total_steps: simulation_time.total_steps(),
            simulation_time,
        }
    }
}

impl Iterator for SimulationTimeIterator {
    type Item = SimulationTimeIteration;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_index >= self.total_steps {
            return None;
        }
        let index = self.current_index;
        self.current_index += 1;

        Some(SimulationTimeIteration {
            index,
            time: self.simulation_time.start_time + index as f64 * self.simulation_time.step,
            timestep: self.simulation_time.step,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total_steps - self.current_index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SimulationTimeIterator {}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationTimeIteration {
    pub index: usize,
    /// hours since the start of the year
    pub time: f64,
    pub timestep: f64,
}

impl SimulationTimeIteration {
    pub fn current_hour(&self) -> u32 {
        self.time.floor() as u32
    }

    /// Fractional hour of day
    pub fn hour_of_day(&self) -> f64 {
        self.time.rem_euclid(HOURS_PER_DAY as f64)
    }

    pub fn seconds_of_day(&self) -> f64 {
        self.hour_of_day() * SECONDS_PER_HOUR as f64
    }

    /// Zero-based day since the start of the year
    pub fn current_day(&self) -> u32 {
        self.current_hour() / HOURS_PER_DAY
    }

    /// One-based day of year, as the weekday/weekend rule expects
    pub fn julian_day(&self) -> u32 {
        self.current_day() + 1
    }

    /// Zero-based month, wrapping into the following year
    pub fn current_month(&self) -> usize {
        let hour_of_year = self.time.rem_euclid(HOURS_PER_YEAR).floor() as u32;
        MONTH_START_END_HOURS
            .iter()
            .position(|end_hour| hour_of_year < *end_hour)
            .map_or(0, |i| i.saturating_sub(1))
    }
}
