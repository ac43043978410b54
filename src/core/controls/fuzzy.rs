// Mamdani fuzzy inference over three-term linguistic variables.
//
// Membership functions are sampled once on a discretised universe when a variable is built;
// crisp inputs are then graded by linear interpolation between samples, and the output is
// defuzzified by the discrete centroid of the aggregated output set. Nothing here holds
// per-call state.

use crate::compare_floats::{max_of_2, min_of_2};
use serde::Deserialize;
use strum::{Display, EnumIter};

/// The three linguistic terms used for occupancy and electricity price
#[derive(Clone, Copy, Debug, Display, EnumIter, Eq, PartialEq)]
pub enum Tier {
    Low,
    Medium,
    High,
}

/// The three linguistic terms of a setpoint adjustment weight
#[derive(Clone, Copy, Debug, Display, EnumIter, Eq, PartialEq)]
pub enum WeightTerm {
    Negative,
    Zero,
    Positive,
}

/// Membership grades of one crisp value, indexed by term
pub type Grades = [f64; 3];

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MembershipFunction {
    /// feet at `a` and `c`, peak at `b`
    Triangular(f64, f64, f64),
    /// feet at `a` and `d`, plateau between `b` and `c`
    Trapezoidal(f64, f64, f64, f64),
}

impl MembershipFunction {
    pub fn grade(&self, x: f64) -> f64 {
        match *self {
            Self::Triangular(a, b, c) => trapezoid(x, a, b, b, c),
            Self::Trapezoidal(a, b, c, d) => trapezoid(x, a, b, c, d),
        }
    }
}

// A vertical edge (a == b or c == d) belongs to the plateau.
fn trapezoid(x: f64, a: f64, b: f64, c: f64, d: f64) -> f64 {
    if x < a || x > d {
        0.
    } else if x < b {
        (x - a) / (b - a)
    } else if x <= c {
        1.
    } else {
        (d - x) / (d - c)
    }
}

/// A fuzzy set made of one or more membership functions joined by union
#[derive(Clone, Debug, PartialEq)]
pub struct FuzzySet(Vec<MembershipFunction>);

impl FuzzySet {
    pub fn new(parts: Vec<MembershipFunction>) -> Self {
        Self(parts)
    }

    pub fn single(part: MembershipFunction) -> Self {
        Self(vec![part])
    }

    pub fn grade(&self, x: f64) -> f64 {
        self.0
            .iter()
            .map(|part| part.grade(x))
            .fold(0., max_of_2)
    }
}

impl From<MembershipFunction> for FuzzySet {
    fn from(part: MembershipFunction) -> Self {
        Self::single(part)
    }
}

/// Evenly spaced sample points `start, start + step, ...` up to but excluding `stop`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Universe {
    start: f64,
    stop: f64,
    step: f64,
}

impl Universe {
    pub const fn new(start: f64, stop: f64, step: f64) -> Self {
        Self { start, stop, step }
    }

    pub fn len(&self) -> usize {
        ((self.stop - self.start) / self.step).round() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn point(&self, index: usize) -> f64 {
        self.start + index as f64 * self.step
    }

    pub fn points(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len()).map(|i| self.point(i))
    }

    /// Largest sample point
    pub fn last(&self) -> f64 {
        self.point(self.len().saturating_sub(1))
    }

    /// Clamp a crisp value onto the sampled range so that values outside the universe take
    /// the grade of the nearest end point.
    pub fn clamp(&self, x: f64) -> f64 {
        min_of_2(max_of_2(x, self.start), self.last())
    }

    fn sample(&self, set: &FuzzySet) -> Vec<f64> {
        self.points().map(|x| set.grade(x)).collect()
    }

    /// Linear interpolation of sampled values at `x` (which must already be clamped)
    fn interpolate(&self, samples: &[f64], x: f64) -> f64 {
        let position = (x - self.start) / self.step;
        let lower = position.floor();
        if lower.is_nan() {
            return f64::NAN;
        }
        let lower_idx = lower as usize;
        if lower_idx + 1 >= samples.len() {
            return samples[samples.len() - 1];
        }
        let frac = position - lower;
        samples[lower_idx] + frac * (samples[lower_idx + 1] - samples[lower_idx])
    }
}

/// A crisp input with three terms (low, medium, high)
#[derive(Clone, Debug, PartialEq)]
pub struct InputVariable {
    universe: Universe,
    samples: [Vec<f64>; 3],
}

impl InputVariable {
    pub fn new(universe: Universe, terms: [FuzzySet; 3]) -> Self {
        let samples = terms.map(|set| universe.sample(&set));
        Self { universe, samples }
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn fuzzify(&self, x: f64) -> Grades {
        let x = self.universe.clamp(x);
        [0, 1, 2].map(|term| self.universe.interpolate(&self.samples[term], x))
    }
}

/// How a fired rule shapes its consequent set
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
pub enum Implication {
    /// scale the consequent membership function by the firing strength
    #[default]
    Product,
    /// clip the consequent membership function at the firing strength
    Minimum,
}

impl Implication {
    fn apply(&self, strength: f64, grade: f64) -> f64 {
        match self {
            Self::Product => strength * grade,
            Self::Minimum => min_of_2(strength, grade),
        }
    }
}

/// The setpoint adjustment weight, with terms negative, zero and positive
#[derive(Clone, Debug, PartialEq)]
pub struct OutputVariable {
    universe: Universe,
    samples: [Vec<f64>; 3],
}

impl OutputVariable {
    pub fn new(universe: Universe, terms: [FuzzySet; 3]) -> Self {
        let samples = terms.map(|set| universe.sample(&set));
        Self { universe, samples }
    }

    /// Weight on [-1, 1) in steps of 0.01 with symmetric triangular terms
    pub fn adjustment_weight() -> Self {
        Self::new(
            Universe::new(-1., 1., 0.01),
            [
                MembershipFunction::Triangular(-1., -1., -0.5).into(),
                MembershipFunction::Triangular(-0.5, 0., 0.5).into(),
                MembershipFunction::Triangular(0.5, 1., 1.).into(),
            ],
        )
    }

    /// Aggregate the implied consequent sets by pointwise maximum and return the centroid.
    ///
    /// Returns None when no term carries any strength, since the centroid is then undefined.
    pub fn defuzzify(&self, strengths: Grades, implication: Implication) -> Option<f64> {
        let (moment, area) = self
            .universe
            .points()
            .enumerate()
            .map(|(i, x)| {
                let aggregated = (0..3)
                    .map(|term| implication.apply(strengths[term], self.samples[term][i]))
                    .fold(0., max_of_2);
                (x * aggregated, aggregated)
            })
            .fold((0., 0.), |(moment, area), (m, a)| (moment + m, area + a));

        if area.is_nan() || is_close!(area, 0., abs_tol = 1e-12) {
            None
        } else {
            Some(moment / area)
        }
    }
}

/// One row of a rule table: IF occupancy is X [AND price is Y] THEN weight is Z
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rule {
    pub occupancy: Tier,
    pub price: Option<Tier>,
    pub weight: WeightTerm,
}

impl Rule {
    pub const fn when_occupancy(occupancy: Tier, weight: WeightTerm) -> Self {
        Self {
            occupancy,
            price: None,
            weight,
        }
    }

    pub const fn when_occupancy_and_price(occupancy: Tier, price: Tier, weight: WeightTerm) -> Self {
        Self {
            occupancy,
            price: Some(price),
            weight,
        }
    }

    /// Firing strength: the minimum of the antecedent grades. A price antecedent is only
    /// evaluated when price grades are supplied.
    pub fn strength(&self, occupancy: &Grades, price: Option<&Grades>) -> f64 {
        let occupancy_grade = occupancy[self.occupancy as usize];
        match (self.price, price) {
            (Some(tier), Some(price)) => min_of_2(occupancy_grade, price[tier as usize]),
            _ => occupancy_grade,
        }
    }
}

/// Fire every rule and keep, per consequent term, the strongest activation
pub fn consequent_strengths(rules: &[Rule], occupancy: &Grades, price: Option<&Grades>) -> Grades {
    rules.iter().fold([0.; 3], |mut strengths, rule| {
        let term = rule.weight as usize;
        strengths[term] = max_of_2(strengths[term], rule.strength(occupancy, price));
        strengths
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(MembershipFunction::Triangular(0.01, 0.02, 0.03), 0.015, 0.5)]
    #[case(MembershipFunction::Triangular(0.01, 0.02, 0.03), 0.02, 1.)]
    #[case(MembershipFunction::Triangular(0.01, 0.02, 0.03), 0.035, 0.)]
    #[case(MembershipFunction::Trapezoidal(0., 0., 0.01, 0.02), 0., 1.)]
    #[case(MembershipFunction::Trapezoidal(0., 0., 0.01, 0.02), 0.015, 0.5)]
    #[case(MembershipFunction::Trapezoidal(7., 7., 11., 11.), 7., 1.)]
    #[case(MembershipFunction::Trapezoidal(7., 7., 11., 11.), 11., 1.)]
    #[case(MembershipFunction::Trapezoidal(7., 7., 11., 11.), 12., 0.)]
    #[case(MembershipFunction::Triangular(0.5, 1., 1.), 1., 1.)]
    fn should_grade_membership_functions(
        #[case] function: MembershipFunction,
        #[case] x: f64,
        #[case] expected: f64,
    ) {
        assert_relative_eq!(function.grade(x), expected, epsilon = 1e-12);
    }

    #[rstest]
    fn union_takes_the_larger_grade() {
        let off_peak = FuzzySet::new(vec![
            MembershipFunction::Trapezoidal(0., 0., 7., 7.),
            MembershipFunction::Trapezoidal(19., 19., 24., 24.),
        ]);
        assert_eq!(off_peak.grade(3.), 1.);
        assert_eq!(off_peak.grade(12.), 0.);
        assert_eq!(off_peak.grade(21.), 1.);
        assert_eq!(FuzzySet::new(vec![]).grade(3.), 0.);
    }

    #[rstest]
    fn universe_excludes_stop() {
        let universe = Universe::new(0., 24., 1.);
        assert_eq!(universe.len(), 24);
        assert_eq!(universe.last(), 23.);
        assert_eq!(Universe::new(-1., 1., 0.01).len(), 200);
        assert_eq!(universe.clamp(30.), 23.);
        assert_eq!(universe.clamp(-2.), 0.);
    }

    #[fixture]
    fn price() -> InputVariable {
        InputVariable::new(
            Universe::new(0., 24., 1.),
            [
                FuzzySet::new(vec![
                    MembershipFunction::Trapezoidal(0., 0., 7., 7.),
                    MembershipFunction::Trapezoidal(19., 19., 24., 24.),
                ]),
                MembershipFunction::Trapezoidal(11., 11., 17., 17.).into(),
                FuzzySet::new(vec![
                    MembershipFunction::Trapezoidal(7., 7., 11., 11.),
                    MembershipFunction::Trapezoidal(17., 17., 19., 19.),
                ]),
            ],
        )
    }

    #[rstest]
    fn should_fuzzify_by_interpolating_samples(price: InputVariable) {
        assert_eq!(price.fuzzify(2.), [1., 0., 0.]);
        assert_eq!(price.fuzzify(9.), [0., 0., 1.]);
        let half_past_eleven = price.fuzzify(11.5);
        assert_relative_eq!(half_past_eleven[1], 1.);
        assert_relative_eq!(half_past_eleven[2], 0.5);
    }

    #[rstest]
    fn should_clamp_out_of_range_inputs(price: InputVariable) {
        assert_eq!(price.fuzzify(30.), price.fuzzify(23.));
        assert_eq!(price.fuzzify(-5.), price.fuzzify(0.));
    }

    #[rstest]
    fn centroid_of_single_term_sits_on_its_side() {
        let weight = OutputVariable::adjustment_weight();
        let negative = weight.defuzzify([1., 0., 0.], Implication::Product).unwrap();
        let zero = weight.defuzzify([0., 1., 0.], Implication::Product).unwrap();
        let positive = weight.defuzzify([0., 0., 1.], Implication::Product).unwrap();

        assert!(negative < -0.7 && negative > -1.);
        assert_relative_eq!(zero, 0., epsilon = 1e-9);
        assert!(positive > 0.7 && positive < 1.);
    }

    #[rstest]
    fn centroid_is_undefined_without_activation() {
        let weight = OutputVariable::adjustment_weight();
        assert_eq!(weight.defuzzify([0.; 3], Implication::Product), None);
        assert_eq!(weight.defuzzify([f64::NAN, 0., 0.], Implication::Minimum), None);
    }

    #[rstest]
    fn scaling_and_clipping_agree_at_full_strength() {
        let weight = OutputVariable::adjustment_weight();
        assert_relative_eq!(
            weight.defuzzify([0., 0., 1.], Implication::Product).unwrap(),
            weight.defuzzify([0., 0., 1.], Implication::Minimum).unwrap(),
        );
    }

    #[rstest]
    fn should_fire_rules_with_min_and_aggregate_with_max() {
        let rules = [
            Rule::when_occupancy_and_price(Tier::Medium, Tier::Low, WeightTerm::Negative),
            Rule::when_occupancy_and_price(Tier::Medium, Tier::High, WeightTerm::Positive),
            Rule::when_occupancy_and_price(Tier::High, Tier::High, WeightTerm::Positive),
        ];
        let occupancy = [0., 0.6, 0.4];
        let price = [0.2, 0., 0.9];

        assert_eq!(
            consequent_strengths(&rules, &occupancy, Some(&price)),
            [0.2, 0., 0.6]
        );
    }
}
