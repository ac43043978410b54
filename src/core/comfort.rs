// Fanger (1970) thermal comfort indices PMV and PPD.

use crate::core::building::axes::Season;

/// W/m2 per met
const MET_TO_W_PER_M2: f64 = 58.15;
const DEFAULT_METABOLIC_RATE: f64 = 1.0;
const DEFAULT_AIR_SPEED: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThermalComfort {
    /// predicted mean vote, roughly -3 (cold) to +3 (hot)
    pub pmv: f64,
    /// predicted percentage dissatisfied, in %
    pub ppd: f64,
}

/// Occupant activity and clothing assumed by the comfort evaluation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OccupantConditions {
    /// metabolic rate, in met
    pub metabolic_rate: f64,
    /// clothing insulation, in clo
    pub clothing_insulation: f64,
    /// air speed around the occupant, in m/s
    pub air_speed: f64,
}

impl OccupantConditions {
    /// Light office activity in still air, dressed for the season (1.0 clo in winter,
    /// 0.5 clo in summer).
    pub fn for_season(season: Season) -> Self {
        Self {
            metabolic_rate: DEFAULT_METABOLIC_RATE,
            clothing_insulation: match season {
                Season::Winter => 1.0,
                Season::Summer => 0.5,
            },
            air_speed: DEFAULT_AIR_SPEED,
        }
    }
}

/// Calculate PMV and PPD
///
/// Arguments:
/// * `air_temperature` - in deg C
/// * `relative_humidity` - in %
/// * `occupant` - metabolic rate, clothing and air speed
/// * `mean_radiant_temperature` - in deg C
///
/// The clothing surface temperature is a single closed-form estimate rather than the
/// iterated solution of ISO 7730.
pub fn predicted_mean_vote(
    air_temperature: f64,
    relative_humidity: f64,
    occupant: OccupantConditions,
    mean_radiant_temperature: f64,
) -> ThermalComfort {
    let t_a = air_temperature;
    let t_r = mean_radiant_temperature;
    let v = occupant.air_speed;
    let clo = occupant.clothing_insulation;

    let m = occupant.metabolic_rate * MET_TO_W_PER_M2;
    let w = 0.; // external work
    let f_cl = 1.0 + 0.2 * clo;

    // water vapour pressure of the air
    let p_a = relative_humidity / 100. * 6.112 * (17.67 * t_a / (t_a + 243.5)).exp();

    let h_c_natural = 2.38 * (t_a - t_r).abs().powf(0.25);
    let h_c = if v > 0.1 {
        (12.1 * v.sqrt()).max(h_c_natural)
    } else {
        h_c_natural
    };

    let t_cl = 35.7 - 0.028 * (m - w) - h_c * (t_a - t_r);

    let thermal_load = (m - w)
        - 3.96e-8 * f_cl * ((t_cl + 273.).powi(4) - (t_r + 273.).powi(4))
        - f_cl * h_c * (t_cl - t_a)
        - 3.05e-3 * (5733. - 6.99 * (m - w) - p_a)
        - 0.42 * ((m - w) - MET_TO_W_PER_M2)
        - 1.7e-5 * m * (5867. - p_a)
        - 0.0014 * m * (34. - t_a);

    let pmv = (0.303 * (-0.036 * m).exp() + 0.028) * thermal_load;

    ThermalComfort {
        pmv,
        ppd: predicted_percentage_dissatisfied(pmv),
    }
}

pub fn predicted_percentage_dissatisfied(pmv: f64) -> f64 {
    100. - 95. * (-0.03353 * pmv.powi(4) - 0.2179 * pmv.powi(2)).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::*;

    fn occupant(clo: f64, met: f64, v: f64) -> OccupantConditions {
        OccupantConditions {
            metabolic_rate: met,
            clothing_insulation: clo,
            air_speed: v,
        }
    }

    #[rstest]
    #[case(22., 50., occupant(0.5, 1.0, 0.1), 22., -1.4523543617923753, 48.32011614200767)]
    #[case(22., 50., occupant(1.0, 1.0, 0.1), 20., -1.8673677640693414, 70.4425897686434)]
    #[case(26., 60., occupant(0.5, 1.2, 0.3), 25., 1.2203146308676711, 36.24609703015291)]
    fn should_calculate_pmv_and_ppd(
        #[case] t_a: f64,
        #[case] rh: f64,
        #[case] occupant: OccupantConditions,
        #[case] t_r: f64,
        #[case] expected_pmv: f64,
        #[case] expected_ppd: f64,
    ) {
        let comfort = predicted_mean_vote(t_a, rh, occupant, t_r);
        assert_relative_eq!(comfort.pmv, expected_pmv, max_relative = 1e-9);
        assert_relative_eq!(comfort.ppd, expected_ppd, max_relative = 1e-9);
    }

    #[rstest]
    fn ppd_has_a_floor_of_five_percent_at_neutral_vote() {
        assert_relative_eq!(predicted_percentage_dissatisfied(0.), 5.);
        assert!(predicted_percentage_dissatisfied(1.) > 5.);
        assert_relative_eq!(
            predicted_percentage_dissatisfied(-1.),
            predicted_percentage_dissatisfied(1.)
        );
    }

    #[rstest]
    fn should_choose_clothing_by_season() {
        assert_eq!(OccupantConditions::for_season(Season::Winter).clothing_insulation, 1.0);
        assert_eq!(OccupantConditions::for_season(Season::Summer).clothing_insulation, 0.5);
    }

    #[rstest]
    fn should_propagate_nan() {
        let comfort =
            predicted_mean_vote(f64::NAN, 50., OccupantConditions::for_season(Season::Summer), 22.);
        assert!(comfort.pmv.is_nan());
        assert!(comfort.ppd.is_nan());
    }
}
