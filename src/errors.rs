use crate::core::building::axes::Season;
use crate::core::controls::fuzzy::Tier;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SmartBemError {
    #[error("Input was considered invalid due to error: {0}")]
    InvalidConfiguration(#[from] ConfigurationError),
    #[error("Error during postprocessing: {0}")]
    ErrorInPostprocessing(PostprocessingError),
}

/// Contradictions in a configuration, reported before any timestep runs
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("Setpoint band {band} is out of order: expected LowLow ({low_low}) <= Low ({low}) <= High ({high}) <= HighHigh ({high_high})")]
    SetpointBandOutOfOrder {
        band: &'static str,
        low_low: f64,
        low: f64,
        high: f64,
        high_high: f64,
    },
    #[error("{tier} price windows for season {season} are invalid: {reason}")]
    InvalidPriceWindows {
        season: Season,
        tier: Tier,
        reason: String,
    },
    #[error("Forcing series is empty")]
    NoTimesteps,
    #[error("Simulation time spans {expected} timesteps but {found} forcing records were supplied")]
    ForcingLengthMismatch { expected: usize, found: usize },
    #[error("Input values out of range: {0}")]
    OutOfRange(String),
    #[error("Input could not be read: {0}")]
    Unreadable(String),
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct PostprocessingError {
    error: anyhow::Error,
}

impl PostprocessingError {
    pub fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}
