use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use rstest::*;
use serde_json::{json, Value};
use smart_bem::core::building::axes::HvacMode;
use smart_bem::corpus::{run_cases_in_parallel, RunResults};
use smart_bem::errors::{ConfigurationError, SmartBemError};
use smart_bem::input::{ingest_for_processing, Input};
use smart_bem::output::{FileOutput, SinkOutput};
use smart_bem::run_project;
use std::fs;
use std::path::PathBuf;

const JANUARY: f64 = 0.;
const JULY: f64 = 4344.;

fn forcing(hour: usize, winter: bool) -> Value {
    let occupancy = [0.005, 0.015, 0.025, 0.04][hour % 4];
    let diurnal = (hour % 24) as f64 * 0.25;
    let (canyon_temperature, humidity_ratio, wall, irradiance) = if winter {
        (270. + diurnal, 0.002, 284., 0.)
    } else {
        (298. + diurnal, 0.013, 299., 250.)
    };

    json!({
        "occupancy": occupancy,
        "canyon": {
            "temperature": canyon_temperature,
            "humidity_ratio": humidity_ratio,
            "height": 15.0,
            "roof_width": 12.0
        },
        "meteorology": {"pressure": 100800.0, "water_temperature": 283.15},
        "irradiance": {"sunlit_wall": irradiance, "shaded_wall": irradiance / 3.0},
        "surfaces": {
            "sunlit_wall": wall + 1.0,
            "shaded_wall": wall - 1.0,
            "impervious_roof": wall,
            "vegetated_roof": wall - 2.0,
            "mass": if winter { 290.0 } else { 296.0 },
            "impervious_roof_fraction": 0.7,
            "vegetated_roof_fraction": 0.3
        },
        "loads": {"electricity": 4.0, "lighting": 1.5, "gas": 0.5, "solar_hot_water": 0.02}
    })
}

fn project(start: f64, hours: usize, winter: bool) -> Value {
    json!({
        "SimulationTime": {"start": start, "end": start + hours as f64, "step": 1.0},
        "Simulation": {"spin_up_days": 3},
        "Building": {
            "floor_height": 3.0,
            "internal_gain_day": 6.0,
            "internal_gain_night": 3.0,
            "internal_gain_radiant_fraction": 0.4,
            "internal_gain_latent_fraction": 0.15,
            "infiltration": 0.4,
            "ventilation": 0.0005,
            "glazing_ratio": 0.3,
            "window_u_value": 2.8,
            "window_shgc": 0.45,
            "condenser_type": "AIR",
            "cop": 3.2,
            "heating_efficiency": 0.85,
            "initial_indoor_temperature": 293.0,
            "initial_indoor_humidity": 0.007
        },
        "SmartControl": {
            "season": if winter { 0 } else { 1 },
            "thermostat": 1,
            "humidistat": 1,
            "fixed_setpoints": {
                "heating_day": 294.15,
                "heating_night": 290.15,
                "cooling_day": 297.15,
                "cooling_night": 299.15,
                "dehumidification_rh_day": 50.0,
                "dehumidification_rh_night": 60.0,
                "humidification_rh_day": 40.0,
                "humidification_rh_night": 30.0
            },
            "heating_band": {"low_low": 290.15, "low": 292.15, "high": 294.15, "high_high": 296.15},
            "cooling_band": {"low_low": 295.15, "low": 297.15, "high": 299.15, "high_high": 301.15},
            "humidity_band": {"low_low": 30.0, "low": 40.0, "high": 60.0, "high_high": 70.0}
        },
        "TimeOfUse": {
            "summer": {"low": [0.0, 7.0, 19.0, 24.0], "medium": [7.0, 11.0, 17.0, 19.0], "high": [11.0, 17.0]},
            "winter": {"low": [0.0, 7.0, 19.0, 24.0], "medium": [11.0, 17.0], "high": [7.0, 11.0, 17.0, 19.0]}
        },
        "Forcing": (0..hours).map(|hour| forcing(hour, winter)).collect::<Vec<_>>()
    })
}

fn ingest(value: &Value) -> Input {
    ingest_for_processing(value.to_string().as_bytes()).unwrap()
}

fn output_directory(name: &str) -> PathBuf {
    let directory = std::env::temp_dir().join(format!("smart-bem-{}-{name}", std::process::id()));
    fs::create_dir_all(&directory).unwrap();
    directory
}

fn read_csv(path: PathBuf) -> (Vec<String>, Vec<Vec<f64>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers = reader.headers().unwrap().iter().map(String::from).collect();
    let rows = reader
        .records()
        .map(|record| {
            record
                .unwrap()
                .iter()
                .map(|field| field.parse::<f64>().unwrap())
                .collect()
        })
        .collect();
    (headers, rows)
}

fn column(headers: &[String], name: &str) -> usize {
    headers.iter().position(|header| header == name).unwrap()
}

fn assert_invariants(results: &RunResults) {
    for record in &results.timesteps {
        let result = &record.result;
        assert!(!(result.sensible_cooling_demand > 0. && result.sensible_heating_demand > 0.));
        assert!(!(result.dehumidification_demand > 0. && result.humidification_demand > 0.));
        assert!(result.hvac.cooling_consumption() >= 0.);
        assert!(result.hvac.heating_consumption() >= 0.);
        assert!(result.hvac.sensible_waste() >= 0.);
        assert!(result.hvac.latent_waste() >= 0.);
        assert!(result.indoor_temperature.is_finite());
        assert!(result.indoor_humidity.is_finite());

        let thermostat = result.setpoints.thermostat.unwrap();
        assert!((-1. ..=1.).contains(&thermostat.heating_weight));
        assert!((-1. ..=1.).contains(&thermostat.cooling_weight));
        assert!(result.setpoints.heating >= thermostat.heating_band.low_low);
        assert!(result.setpoints.heating <= thermostat.heating_band.high_high);
        assert!(result.setpoints.cooling >= thermostat.cooling_band.low_low);
        assert!(result.setpoints.cooling <= thermostat.cooling_band.high_high);
    }
}

#[rstest]
fn winter_run_writes_results_summary_and_averages() {
    let directory = output_directory("winter");
    let output = FileOutput::new(directory.clone(), "winter_{}.csv".to_string());

    let results = run_project(project(JANUARY, 96, true).to_string().as_bytes(), &output).unwrap();

    assert_eq!(results.timesteps.len(), 96);
    assert!(results
        .timesteps
        .iter()
        .all(|record| record.result.hvac.mode() == HvacMode::Heating));

    let (headers, rows) = read_csv(directory.join("winter_results.csv"));
    assert_eq!(rows.len(), 96);
    assert_eq!(headers[0], "Time [h]");
    let mode = column(&headers, "HVAC mode [-]");
    let cooling_load = column(&headers, "Wall cooling load [W m-2]");
    for row in &rows {
        assert_eq!(row.len(), headers.len());
        assert_eq!(row[mode], -1.);
        assert!(row[cooling_load].is_nan());
    }

    let (headers, rows) = read_csv(directory.join("winter_summary.csv"));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][column(&headers, "Month [-]")], 1.);
    assert_eq!(rows[0][column(&headers, "Timesteps [-]")], 24.);
    assert!(rows[0][column(&headers, "Heating gas [m3 m-2]")] > 0.);
    assert_eq!(rows[0][column(&headers, "Cooling electricity [kWh m-2]")], 0.);

    let (headers, rows) = read_csv(directory.join("winter_averages.csv"));
    assert_eq!(rows.len(), 4);
    assert_eq!(headers[0], "Time [h]");
    assert_eq!(rows[0][column(&headers, "HVAC mode [-]")], -1.);
    assert!(rows[3][column(&headers, "Wall cooling load [W m-2]")].is_nan());
    let time = column(&headers, "Time [h]");
    assert_relative_eq!(rows[0][time], 11.5, max_relative = 1e-12);
    assert_relative_eq!(rows[3][time], 83.5, max_relative = 1e-12);

    fs::remove_dir_all(directory).unwrap();
}

#[rstest]
fn summer_run_cools_and_reports_smart_diagnostics() {
    let results = run_project(project(JULY, 48, false).to_string().as_bytes(), SinkOutput).unwrap();

    assert_invariants(&results);
    assert!(results
        .timesteps
        .iter()
        .any(|record| record.result.hvac.mode() == HvacMode::Cooling));
    for record in &results.timesteps {
        let humidistat = record.result.setpoints.humidistat.unwrap();
        assert!(record.result.setpoints.dehumidification >= humidistat.humidity_ratio_band.low_low);
        assert!(
            record.result.setpoints.dehumidification <= humidistat.humidity_ratio_band.high_high
        );
    }
}

#[rstest]
fn independent_cases_run_in_parallel() {
    let cases = vec![
        ("january", ingest(&project(JANUARY, 72, true))),
        ("july", ingest(&project(JULY, 72, false))),
    ];

    let results = run_cases_in_parallel(cases);

    assert_eq!(results.len(), 2);
    for results in results.values() {
        let results = results.as_ref().unwrap();
        assert_eq!(results.timesteps.len(), 72);
        assert_invariants(results);
    }
}

#[rstest]
fn contradictory_bands_fail_before_any_timestep() {
    let mut value = project(JANUARY, 4, true);
    value["SmartControl"]["cooling_band"]["high"] = json!(296.0);

    let error = run_project(value.to_string().as_bytes(), SinkOutput).unwrap_err();

    assert!(matches!(
        error,
        SmartBemError::InvalidConfiguration(ConfigurationError::SetpointBandOutOfOrder {
            band: "cooling",
            ..
        })
    ));
}
