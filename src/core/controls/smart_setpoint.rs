use crate::compare_floats::clamp_between;
use crate::core::building::axes::{DayType, Season};
use crate::core::controls::fuzzy::{
    consequent_strengths, FuzzySet, Implication, InputVariable, MembershipFunction,
    OutputVariable, Rule, Tier, Universe,
    WeightTerm::{Negative, Positive, Zero},
};
use crate::core::psychrometrics::{humidity_ratio_from_relative_humidity, psychrometrics};
use crate::errors::ConfigurationError;
use crate::input::{PriceWindows, TimeOfUse};
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::warn;

/// Guarded comfort band: a setpoint is pulled towards `low`/`high` and never leaves
/// `[low_low, high_high]`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ComfortBand {
    pub low_low: f64,
    pub low: f64,
    pub high: f64,
    pub high_high: f64,
}

impl ComfortBand {
    pub fn new(low_low: f64, low: f64, high: f64, high_high: f64) -> Self {
        Self {
            low_low,
            low,
            high,
            high_high,
        }
    }

    pub fn check_order(&self, band: &'static str) -> Result<(), ConfigurationError> {
        let Self {
            low_low,
            low,
            high,
            high_high,
        } = *self;
        if low_low <= low && low <= high && high <= high_high {
            Ok(())
        } else {
            Err(ConfigurationError::SetpointBandOutOfOrder {
                band,
                low_low,
                low,
                high,
                high_high,
            })
        }
    }

    /// Adapt a setpoint to the ambient value given the controller weight.
    ///
    /// Outside the band a non-negative weight pulls the setpoint to the nearer edge (`low`
    /// or `high`) while a negative weight lets it follow the ambient value. Inside the band
    /// the setpoint follows the ambient value. The result is always clamped to
    /// `[low_low, high_high]`.
    pub fn adapt(&self, ambient: f64, weight: f64) -> f64 {
        let setpoint = if ambient < self.low {
            if weight >= 0. {
                self.low
            } else {
                ambient
            }
        } else if ambient > self.high {
            if weight >= 0. {
                self.high
            } else {
                ambient
            }
        } else {
            ambient
        };

        clamp_between(setpoint, self.low_low, self.high_high)
    }

    pub(crate) fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self::new(f(self.low_low), f(self.low), f(self.high), f(self.high_high))
    }
}

/// The four adaptive setpoints the controller can produce
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum SetpointFunction {
    Heating,
    Cooling,
    Humidification,
    Dehumidification,
}

/// Everything the rule tables are conditioned on for one timestep
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlContext {
    /// occupant density, in persons/m2
    pub occupancy: f64,
    pub hour_of_day: f64,
    pub day_type: DayType,
    pub season: Season,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmartSetpoint {
    pub setpoint: f64,
    pub weight: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmartHumiditySetpoint {
    /// humidity ratio setpoint, in kg/kg
    pub setpoint: f64,
    /// the setpoint expressed as relative humidity at the indoor temperature, in %
    pub relative_humidity: f64,
    pub weight: f64,
    /// the relative humidity band converted to humidity ratios, in kg/kg
    pub band: ComfortBand,
}

const OCCUPANCY_RULES: [Rule; 3] = [
    Rule::when_occupancy(Tier::Low, Negative),
    Rule::when_occupancy(Tier::Medium, Zero),
    Rule::when_occupancy(Tier::High, Positive),
];

const WEEKDAY_COOLING_RULES: [Rule; 9] = [
    Rule::when_occupancy_and_price(Tier::Low, Tier::Low, Negative),
    Rule::when_occupancy_and_price(Tier::Low, Tier::Medium, Negative),
    Rule::when_occupancy_and_price(Tier::Low, Tier::High, Negative),
    Rule::when_occupancy_and_price(Tier::Medium, Tier::Low, Zero),
    Rule::when_occupancy_and_price(Tier::Medium, Tier::Medium, Zero),
    Rule::when_occupancy_and_price(Tier::Medium, Tier::High, Zero),
    Rule::when_occupancy_and_price(Tier::High, Tier::Low, Positive),
    Rule::when_occupancy_and_price(Tier::High, Tier::Medium, Positive),
    Rule::when_occupancy_and_price(Tier::High, Tier::High, Positive),
];

const WEEKDAY_DEHUMIDIFICATION_RULES: [Rule; 9] = [
    Rule::when_occupancy_and_price(Tier::Low, Tier::Low, Negative),
    Rule::when_occupancy_and_price(Tier::Low, Tier::Medium, Negative),
    Rule::when_occupancy_and_price(Tier::Low, Tier::High, Negative),
    Rule::when_occupancy_and_price(Tier::Medium, Tier::Low, Negative),
    Rule::when_occupancy_and_price(Tier::Medium, Tier::Medium, Zero),
    Rule::when_occupancy_and_price(Tier::Medium, Tier::High, Positive),
    Rule::when_occupancy_and_price(Tier::High, Tier::Low, Positive),
    Rule::when_occupancy_and_price(Tier::High, Tier::Medium, Positive),
    Rule::when_occupancy_and_price(Tier::High, Tier::High, Positive),
];

/// Heating and humidification see a flat tariff, so only cooling and dehumidification on
/// weekdays consult the price.
fn rule_table(function: SetpointFunction, day_type: DayType) -> &'static [Rule] {
    match (function, day_type.is_weekend()) {
        (SetpointFunction::Cooling, false) => &WEEKDAY_COOLING_RULES,
        (SetpointFunction::Dehumidification, false) => &WEEKDAY_DEHUMIDIFICATION_RULES,
        _ => &OCCUPANCY_RULES,
    }
}

/// Fuzzy-logic setpoint controller.
///
/// Built once from the time-of-use schedule; evaluation never mutates it.
#[derive(Clone, Debug)]
pub struct SmartSetpointController {
    occupancy: InputVariable,
    summer_price: InputVariable,
    winter_price: InputVariable,
    weight: OutputVariable,
    implication: Implication,
}

impl SmartSetpointController {
    pub fn new(
        time_of_use: &TimeOfUse,
        implication: Implication,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            occupancy: occupancy_variable(),
            summer_price: price_variable(&time_of_use.summer, Season::Summer)?,
            winter_price: price_variable(&time_of_use.winter, Season::Winter)?,
            weight: OutputVariable::adjustment_weight(),
            implication,
        })
    }

    fn price(&self, season: Season) -> &InputVariable {
        match season {
            Season::Summer => &self.summer_price,
            Season::Winter => &self.winter_price,
        }
    }

    /// Signed adjustment weight in [-1, 1]
    pub fn weight(&self, function: SetpointFunction, context: &ControlContext) -> f64 {
        let rules = rule_table(function, context.day_type);
        let occupancy = self.occupancy.fuzzify(context.occupancy);
        let price = rules
            .iter()
            .any(|rule| rule.price.is_some())
            .then(|| self.price(context.season).fuzzify(context.hour_of_day));

        let strengths = consequent_strengths(rules, &occupancy, price.as_ref());

        self.weight
            .defuzzify(strengths, self.implication)
            .unwrap_or_else(|| {
                warn!(
                    "No {function} rule fired for occupancy {} at hour {}; using a weight of zero",
                    context.occupancy, context.hour_of_day
                );
                0.
            })
    }

    /// Adaptive heating or cooling setpoint, in K
    ///
    /// Arguments:
    /// * `function` - heating or cooling
    /// * `context` - occupancy and clock
    /// * `canyon_temperature` - in K
    /// * `band` - guarded temperature band, in K
    pub fn temperature_setpoint(
        &self,
        function: SetpointFunction,
        context: &ControlContext,
        canyon_temperature: f64,
        band: &ComfortBand,
    ) -> SmartSetpoint {
        let weight = self.weight(function, context);
        SmartSetpoint {
            setpoint: band.adapt(canyon_temperature, weight),
            weight,
        }
    }

    /// Adaptive humidification or dehumidification setpoint, as a humidity ratio
    ///
    /// Arguments:
    /// * `function` - humidification or dehumidification
    /// * `context` - occupancy and clock
    /// * `canyon_humidity` - canyon humidity ratio, in kg/kg
    /// * `relative_humidity_band` - guarded band, in %
    /// * `indoor_temperature` - temperature at which the band applies, in K
    /// * `pressure` - ambient pressure, in Pa
    pub fn humidity_setpoint(
        &self,
        function: SetpointFunction,
        context: &ControlContext,
        canyon_humidity: f64,
        relative_humidity_band: &ComfortBand,
        indoor_temperature: f64,
        pressure: f64,
    ) -> SmartHumiditySetpoint {
        let band = relative_humidity_band
            .map(|rh| humidity_ratio_from_relative_humidity(rh, indoor_temperature, pressure));
        let weight = self.weight(function, context);
        let setpoint = band.adapt(canyon_humidity, weight);

        SmartHumiditySetpoint {
            setpoint,
            relative_humidity: psychrometrics(indoor_temperature, setpoint, pressure)
                .relative_humidity,
            weight,
            band,
        }
    }
}

fn occupancy_variable() -> InputVariable {
    InputVariable::new(
        Universe::new(0., 1., 0.01),
        [
            MembershipFunction::Trapezoidal(0., 0., 0.01, 0.02).into(),
            MembershipFunction::Triangular(0.01, 0.02, 0.03).into(),
            MembershipFunction::Trapezoidal(0.02, 0.03, 1., 1.).into(),
        ],
    )
}

fn price_variable(windows: &PriceWindows, season: Season) -> Result<InputVariable, ConfigurationError> {
    let [low, medium, high] =
        [Tier::Low, Tier::Medium, Tier::High].map(|tier| price_set(windows.for_tier(tier), season, tier));

    Ok(InputVariable::new(
        Universe::new(0., 24., 1.),
        [low?, medium?, high?],
    ))
}

/// Each consecutive pair of hour boundaries is one rectangular window; the tier is their
/// union.
pub(crate) fn price_set(
    bounds: &[f64],
    season: Season,
    tier: Tier,
) -> Result<FuzzySet, ConfigurationError> {
    let invalid = |reason: String| ConfigurationError::InvalidPriceWindows {
        season,
        tier,
        reason,
    };

    if bounds.len() != 2 && bounds.len() != 4 {
        return Err(invalid(format!(
            "expected 2 or 4 hour boundaries, found {}",
            bounds.len()
        )));
    }

    bounds
        .chunks_exact(2)
        .map(|window| {
            let (start, end) = (window[0], window[1]);
            if !(0. ..=24.).contains(&start) || !(0. ..=24.).contains(&end) {
                Err(invalid(format!("window {start}-{end} lies outside 0-24 h")))
            } else if start > end {
                Err(invalid(format!("window {start}-{end} ends before it starts")))
            } else {
                Ok(MembershipFunction::Trapezoidal(start, start, end, end))
            }
        })
        .collect::<Result<Vec<_>, _>>()
        .map(FuzzySet::new)
}
