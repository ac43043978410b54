mod compare_floats;
pub mod core;
pub mod corpus;
pub mod errors;
pub mod input;
pub mod output;
pub mod simulation_time;
pub mod statistics;

#[macro_use]
extern crate is_close;

pub use crate::corpus::RunResults;
use crate::core::building::results::ResultColumns;
use crate::corpus::Simulation;
use crate::errors::{PostprocessingError, SmartBemError};
use crate::input::ingest_for_processing;
use crate::output::Output;
use crate::statistics::monthly_summaries;
use csv::WriterBuilder;
use std::io::{Read, Write};
use tracing::info;

pub const RESULTS_OUTPUT_KEY: &str = "results";
pub const SUMMARY_OUTPUT_KEY: &str = "summary";
pub const AVERAGES_OUTPUT_KEY: &str = "averages";

/// Validate an input, simulate every timestep and write per-timestep results, monthly
/// summaries and per-window averages to `output`.
pub fn run_project(input: impl Read, output: impl Output) -> Result<RunResults, SmartBemError> {
    let input = ingest_for_processing(input)?;
    let results = Simulation::from_input(input)?.run();

    if !output.is_noop() {
        write_output_files(&output, &results).map_err(|err| {
            SmartBemError::ErrorInPostprocessing(PostprocessingError::new(err))
        })?;
    }

    Ok(results)
}

fn write_output_files(output: &impl Output, results: &RunResults) -> anyhow::Result<()> {
    info!("Writing {} timesteps of results", results.timesteps.len());
    write_columns(
        output.writer_for_location_key(RESULTS_OUTPUT_KEY)?,
        results.timesteps.iter().map(|record| record.columns()),
    )?;

    let summaries = monthly_summaries(results);
    info!("Writing {} monthly summaries", summaries.len());
    write_columns(
        output.writer_for_location_key(SUMMARY_OUTPUT_KEY)?,
        summaries.iter().map(|summary| summary.columns()),
    )?;

    let averages = results.window_averages();
    info!(
        "Writing {} windows of {} averaged timesteps",
        averages.len(),
        results.averaging_window_steps
    );
    write_columns(
        output.writer_for_location_key(AVERAGES_OUTPUT_KEY)?,
        averages,
    )
}

/// Write rows of named columns as CSV, with a header taken from the first row. Absent values
/// are written as `NaN`.
pub fn write_columns(
    writer: impl Write,
    rows: impl IntoIterator<Item = ResultColumns>,
) -> anyhow::Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    let mut rows = rows.into_iter().peekable();

    if let Some(first) = rows.peek() {
        writer.write_record(first.keys())?;
    }
    for row in rows {
        writer.write_record(row.values().map(|value| value.to_string()))?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::tests::input_json;
    use crate::output::SinkOutput;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn should_write_named_columns_as_csv() {
        let rows = [
            ResultColumns::from([("Time [h]", 0.), ("PMV [-]", 0.25)]),
            ResultColumns::from([("Time [h]", 1.), ("PMV [-]", f64::NAN)]),
        ];
        let mut buffer: Vec<u8> = vec![];

        write_columns(&mut buffer, rows).unwrap();

        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "Time [h],PMV [-]\n0,0.25\n1,NaN\n"
        );
    }

    #[rstest]
    fn should_write_nothing_for_no_rows() {
        let mut buffer: Vec<u8> = vec![];
        write_columns(&mut buffer, Vec::<ResultColumns>::new()).unwrap();
        assert!(buffer.is_empty());
    }

    #[rstest]
    fn should_run_a_project_to_a_sink() {
        let input = input_json(96).to_string();

        let results = run_project(input.as_bytes(), SinkOutput).unwrap();

        assert_eq!(results.timesteps.len(), 96);
        assert_eq!(results.spin_up_steps(), 72);
    }

    #[rstest]
    fn should_report_configuration_errors() {
        let result = run_project("{}".as_bytes(), SinkOutput);
        assert!(matches!(
            result,
            Err(SmartBemError::InvalidConfiguration(_))
        ));
    }
}
