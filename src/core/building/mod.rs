pub mod axes;
#[allow(clippy::module_inception)]
pub mod building;
pub mod envelope;
pub mod results;
pub mod setpoints;
