pub mod fuzzy;
pub mod smart_setpoint;
