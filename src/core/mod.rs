pub mod building;
pub mod comfort;
pub mod controls;
pub mod material_properties;
pub mod psychrometrics;
pub mod units;
